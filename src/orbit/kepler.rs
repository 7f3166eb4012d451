//! Kepler's equation and the time-dependent position of a body

use std::f64::consts::TAU;

use nalgebra::Point3;

use super::elements::OrbitalElements;
use super::error::{OrbitError, OrbitResult};

/// Location of a body at a given simulation time, in scene units.
pub type Position = Point3<f64>;

/// Stopping rules for the Newton-Raphson solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSettings {
    /// Largest accepted |E - e·sin(E) - M|
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for KeplerSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Solve M = E - e·sin(E) for the eccentric anomaly E.
///
/// Starts from E₀ = M (normalized to [0, 2π)) and iterates Newton steps.
/// The root always lies within e of M, so each step is clamped to that
/// bracket. Fails with [`OrbitError::Convergence`] once the iteration cap is
/// spent.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64, settings: &KeplerSettings) -> OrbitResult<f64> {
    if !mean_anomaly.is_finite() {
        return Err(OrbitError::invalid("mean anomaly is not finite"));
    }
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::invalid(format!(
            "eccentricity {} is outside [0, 1)",
            eccentricity
        )));
    }

    let m = mean_anomaly.rem_euclid(TAU);
    let e = eccentricity;
    let mut ea = m;

    let residual = |ea: f64| ea - e * ea.sin() - m;

    for _ in 0..settings.max_iterations {
        let f = residual(ea);
        if f.abs() < settings.tolerance {
            return Ok(ea);
        }
        let slope = 1.0 - e * ea.cos();
        ea = (ea - f / slope).clamp(m - e, m + e);
    }

    let f = residual(ea);
    if f.abs() < settings.tolerance {
        Ok(ea)
    } else {
        Err(OrbitError::Convergence {
            iterations: settings.max_iterations,
            residual: f.abs(),
        })
    }
}

/// True anomaly from eccentric anomaly, quadrant-safe.
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    let y = (1.0 + eccentricity).sqrt() * half.sin();
    let x = (1.0 - eccentricity).sqrt() * half.cos();
    2.0 * y.atan2(x)
}

/// Mean anomaly after `time` has elapsed, in radians.
///
/// `time` must already include any playback speed factor and share the unit
/// of `orbital_period`.
pub fn mean_anomaly_at(elements: &OrbitalElements, time: f64) -> OrbitResult<f64> {
    let period = elements
        .orbital_period
        .ok_or_else(|| OrbitError::invalid("orbital period is required for timed positions"))?;
    Ok(elements.mean_anomaly_at_epoch_rad() + TAU / period * time)
}

/// Position of the body at simulation `time`.
///
/// Uses the same rotation chain as [`super::sample`], so the result lies on
/// the sampled path for the same elements.
pub fn position_at(elements: &OrbitalElements, time: f64, settings: &KeplerSettings) -> OrbitResult<Position> {
    elements.validate()?;
    if !time.is_finite() {
        return Err(OrbitError::invalid("simulation time is not finite"));
    }

    let m = mean_anomaly_at(elements, time)?;
    let ea = solve_kepler(m, elements.eccentricity, settings)?;
    let nu = true_anomaly(ea, elements.eccentricity);

    Ok(elements.point_at_true_anomaly(nu, &elements.orientation()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::elements::radius_at;
    use crate::orbit::path::{sample, DEFAULT_POINT_COUNT};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn residual(ea: f64, e: f64, m: f64) -> f64 {
        (ea - e * ea.sin() - m).abs()
    }

    fn mercury() -> OrbitalElements {
        OrbitalElements::new(57_909.05, 0.2056, 7.005, 48.331, 29.124).with_period(87.969)
    }

    #[test]
    fn test_kepler_moderate_eccentricity() {
        let settings = KeplerSettings::default();
        let ea = solve_kepler(FRAC_PI_2, 0.1, &settings).unwrap();
        assert!(residual(ea, 0.1, FRAC_PI_2) < 1e-6);
    }

    #[test]
    fn test_kepler_high_eccentricity() {
        let settings = KeplerSettings::default();
        let ea = solve_kepler(0.01, 0.99, &settings).unwrap();
        assert!(residual(ea, 0.99, 0.01) < 1e-6);
    }

    #[test]
    fn test_kepler_circular_is_identity() {
        let settings = KeplerSettings::default();
        for m in [0.0, 0.5, 2.0, 5.9] {
            let ea = solve_kepler(m, 0.0, &settings).unwrap();
            assert!((ea - m).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kepler_converges_across_range() {
        let settings = KeplerSettings::default();
        for &e in &[0.0, 0.2, 0.5, 0.8, 0.95, 0.999] {
            for step in 0..64 {
                let m = step as f64 / 64.0 * TAU;
                let ea = solve_kepler(m, e, &settings)
                    .unwrap_or_else(|err| panic!("e={} M={}: {}", e, m, err));
                assert!(residual(ea, e, m) < settings.tolerance);
            }
        }
    }

    #[test]
    fn test_kepler_iteration_cap_reports_error() {
        let settings = KeplerSettings { tolerance: 1e-15, max_iterations: 1 };
        let first = solve_kepler(0.01, 0.99, &settings);
        let second = solve_kepler(0.01, 0.99, &settings);
        assert!(matches!(first, Err(OrbitError::Convergence { iterations: 1, .. })));
        assert_eq!(first, second);
    }

    #[test]
    fn test_kepler_rejects_open_orbit() {
        let settings = KeplerSettings::default();
        assert!(matches!(solve_kepler(1.0, 1.0, &settings), Err(OrbitError::InvalidOrbit(_))));
    }

    #[test]
    fn test_true_anomaly_apsides() {
        assert!(true_anomaly(0.0, 0.5).abs() < 1e-12);
        assert!((true_anomaly(PI, 0.5).abs() - PI).abs() < 1e-12);
        let nu = true_anomaly(FRAC_PI_2, 0.0);
        assert!((nu - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_position_at_zero_is_periapsis() {
        let elements = mercury();
        let settings = KeplerSettings::default();
        let pos = position_at(&elements, 0.0, &settings).unwrap();
        let path = sample(&elements, DEFAULT_POINT_COUNT).unwrap();

        let first = path.samples()[0];
        assert!((pos - first).norm() < 1e-9 * elements.semimajor_axis);
        assert!((pos.coords.norm() - elements.periapsis_distance()).abs() < 1e-9 * elements.semimajor_axis);
    }

    #[test]
    fn test_position_at_half_period_is_apoapsis() {
        let elements = mercury();
        let half = elements.orbital_period.unwrap() / 2.0;
        let pos = position_at(&elements, half, &KeplerSettings::default()).unwrap();
        let expected = elements.apoapsis_distance();
        assert!(((pos.coords.norm() - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn test_position_lies_on_orbit() {
        let elements = mercury();
        let settings = KeplerSettings { tolerance: 1e-12, max_iterations: 100 };
        let period = elements.orbital_period.unwrap();

        for step in 0..50 {
            let t = period * step as f64 / 50.0;
            let m = mean_anomaly_at(&elements, t).unwrap();
            let ea = solve_kepler(m, elements.eccentricity, &settings).unwrap();
            let nu = true_anomaly(ea, elements.eccentricity);

            let pos = position_at(&elements, t, &settings).unwrap();
            let expected = radius_at(&elements, nu);
            assert!(((pos.coords.norm() - expected) / expected).abs() < 1e-9, "t={}", t);
        }
    }

    #[test]
    fn test_position_stays_in_orbit_plane() {
        // Plane normal is the z axis carried through the same orientation
        let elements = mercury();
        let normal = elements.orientation() * nalgebra::Vector3::z();
        let period = elements.orbital_period.unwrap();
        for step in 0..20 {
            let pos = position_at(&elements, period * step as f64 / 20.0, &KeplerSettings::default()).unwrap();
            assert!(pos.coords.dot(&normal).abs() < 1e-9 * elements.semimajor_axis);
        }
    }

    #[test]
    fn test_position_is_periodic() {
        let elements = mercury();
        let settings = KeplerSettings::default();
        let period = elements.orbital_period.unwrap();
        let a = position_at(&elements, 10.0, &settings).unwrap();
        let b = position_at(&elements, 10.0 + 3.0 * period, &settings).unwrap();
        assert!((a - b).norm() < 1e-5 * elements.semimajor_axis);
    }

    #[test]
    fn test_mean_anomaly_at_epoch_offsets_start() {
        let settings = KeplerSettings::default();
        let elements = OrbitalElements::new(10.0, 0.0, 0.0, 0.0, 0.0)
            .with_period(100.0)
            .with_mean_anomaly_at_epoch(90.0);
        let pos = position_at(&elements, 0.0, &settings).unwrap();
        assert!(pos.x.abs() < 1e-6);
        assert!((pos.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_position_requires_period() {
        let elements = OrbitalElements::new(10.0, 0.1, 0.0, 0.0, 0.0);
        let result = position_at(&elements, 1.0, &KeplerSettings::default());
        assert!(matches!(result, Err(OrbitError::InvalidOrbit(_))));
    }

    #[test]
    fn test_position_rejects_open_orbit() {
        let elements = OrbitalElements::new(10.0, 1.0, 0.0, 0.0, 0.0).with_period(10.0);
        let result = position_at(&elements, 1.0, &KeplerSettings::default());
        assert!(matches!(result, Err(OrbitError::InvalidOrbit(_))));
    }
}
