/// Simulation time in days, advanced from wall-clock frame timestamps.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    time: f64,
    /// Simulated days per real second
    speed: f64,
    paused: bool,
    last_ms: Option<f64>,
}

impl SimulationClock {
    pub fn new(speed: f64) -> Self {
        SimulationClock {
            time: 0.0,
            speed,
            paused: false,
            last_ms: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Advance to the frame at `now_ms` and return the scaled simulation time.
    /// The first tick only records the timestamp.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        if let Some(last) = self.last_ms {
            let dt = ((now_ms - last) / 1000.0).max(0.0);
            if !self.paused {
                self.time += dt * self.speed;
            }
        }
        self.last_ms = Some(now_ms);
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_starts_at_zero() {
        let mut clock = SimulationClock::new(10.0);
        assert_eq!(clock.tick(5000.0), 0.0);
        assert_eq!(clock.tick(6000.0), 10.0);
        assert_eq!(clock.tick(6500.0), 15.0);
    }

    #[test]
    fn test_pause_and_speed() {
        let mut clock = SimulationClock::new(1.0);
        clock.tick(0.0);
        clock.toggle_pause();
        assert_eq!(clock.tick(2000.0), 0.0);
        clock.toggle_pause();
        clock.set_speed(4.0);
        assert_eq!(clock.tick(3000.0), 4.0);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut clock = SimulationClock::new(1.0);
        clock.tick(1000.0);
        assert_eq!(clock.tick(500.0), 0.0);
    }
}
