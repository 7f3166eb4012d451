//! Classical orbital elements as received from the data provider

use nalgebra::{Point3, Rotation3, Vector3};

use super::error::{OrbitError, OrbitResult};

/// Keplerian elements of one body.
///
/// Angles are stored in degrees exactly as the provider sends them and are
/// converted to radians by the accessors. Distances are in whatever unit the
/// provider uses until [`OrbitalElements::scaled`] is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitalElements {
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    /// Inclination (degrees)
    pub inclination: f64,
    /// Longitude of ascending node (degrees)
    pub longitude_of_ascending_node: f64,
    /// Argument of periapsis (degrees)
    pub argument_of_periapsis: f64,
    /// Sidereal period, only needed for time-dependent positions
    pub orbital_period: Option<f64>,
    /// Mean anomaly at t = 0 (degrees)
    pub mean_anomaly_at_epoch: f64,
}

impl OrbitalElements {
    pub fn new(
        semimajor_axis: f64,
        eccentricity: f64,
        inclination: f64,
        longitude_of_ascending_node: f64,
        argument_of_periapsis: f64,
    ) -> Self {
        Self {
            semimajor_axis,
            eccentricity,
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
            orbital_period: None,
            mean_anomaly_at_epoch: 0.0,
        }
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.orbital_period = Some(period);
        self
    }

    pub fn with_mean_anomaly_at_epoch(mut self, degrees: f64) -> Self {
        self.mean_anomaly_at_epoch = degrees;
        self
    }

    /// Copy with the semi-major axis divided by `distance_scale`.
    pub fn scaled(&self, distance_scale: f64) -> Self {
        Self {
            semimajor_axis: self.semimajor_axis / distance_scale,
            ..self.clone()
        }
    }

    /// Reject anything that is not a closed, finite ellipse.
    pub fn validate(&self) -> OrbitResult<()> {
        let finite = [
            self.semimajor_axis,
            self.eccentricity,
            self.inclination,
            self.longitude_of_ascending_node,
            self.argument_of_periapsis,
            self.mean_anomaly_at_epoch,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(OrbitError::invalid("non-finite orbital element"));
        }
        if self.semimajor_axis <= 0.0 {
            return Err(OrbitError::invalid(format!(
                "semi-major axis must be positive, got {}",
                self.semimajor_axis
            )));
        }
        if self.eccentricity < 0.0 {
            return Err(OrbitError::invalid(format!(
                "eccentricity must not be negative, got {}",
                self.eccentricity
            )));
        }
        if self.eccentricity >= 1.0 {
            return Err(OrbitError::invalid(format!(
                "eccentricity {} describes an open orbit",
                self.eccentricity
            )));
        }
        if let Some(period) = self.orbital_period {
            if !period.is_finite() || period <= 0.0 {
                return Err(OrbitError::invalid(format!(
                    "orbital period must be positive, got {}",
                    period
                )));
            }
        }
        Ok(())
    }

    pub fn inclination_rad(&self) -> f64 {
        self.inclination.to_radians()
    }

    pub fn longitude_of_ascending_node_rad(&self) -> f64 {
        self.longitude_of_ascending_node.to_radians()
    }

    pub fn argument_of_periapsis_rad(&self) -> f64 {
        self.argument_of_periapsis.to_radians()
    }

    pub fn mean_anomaly_at_epoch_rad(&self) -> f64 {
        self.mean_anomaly_at_epoch.to_radians()
    }

    /// Semi-latus rectum a(1 - e²)
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semimajor_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    pub fn periapsis_distance(&self) -> f64 {
        self.semimajor_axis * (1.0 - self.eccentricity)
    }

    pub fn apoapsis_distance(&self) -> f64 {
        self.semimajor_axis * (1.0 + self.eccentricity)
    }

    /// Node rotation about z followed by inclination about x.
    pub fn orientation(&self) -> Rotation3<f64> {
        let node = Rotation3::from_axis_angle(&Vector3::z_axis(), self.longitude_of_ascending_node_rad());
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), self.inclination_rad());
        tilt * node
    }

    /// Point at `true_anomaly` (radians) in scene space.
    ///
    /// The periapsis offset is added in the orbital plane, then
    /// [`Self::orientation`] carries the point into 3D.
    pub(crate) fn point_at_true_anomaly(&self, true_anomaly: f64, orientation: &Rotation3<f64>) -> Point3<f64> {
        let r = radius_at(self, true_anomaly);
        let angle = true_anomaly + self.argument_of_periapsis_rad();
        orientation * Point3::new(r * angle.cos(), r * angle.sin(), 0.0)
    }
}

/// Conic equation r = a(1 - e²) / (1 + e·cos ν).
pub fn radius_at(elements: &OrbitalElements, true_anomaly: f64) -> f64 {
    elements.semi_latus_rectum() / (1.0 + elements.eccentricity * true_anomaly.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth() -> OrbitalElements {
        OrbitalElements::new(149_598_023.0, 0.0167, 0.0, -11.26064, 114.20783).with_period(365.256)
    }

    #[test]
    fn test_valid_elements_pass() {
        assert!(earth().validate().is_ok());
        assert!(OrbitalElements::new(1.0, 0.0, 0.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_open_orbit_rejected() {
        let parabolic = OrbitalElements::new(1.0, 1.0, 0.0, 0.0, 0.0);
        assert!(matches!(parabolic.validate(), Err(OrbitError::InvalidOrbit(_))));

        let hyperbolic = OrbitalElements::new(1.0, 1.3, 0.0, 0.0, 0.0);
        assert!(matches!(hyperbolic.validate(), Err(OrbitError::InvalidOrbit(_))));
    }

    #[test]
    fn test_bad_axis_and_period_rejected() {
        assert!(OrbitalElements::new(0.0, 0.1, 0.0, 0.0, 0.0).validate().is_err());
        assert!(OrbitalElements::new(-5.0, 0.1, 0.0, 0.0, 0.0).validate().is_err());
        assert!(earth().with_period(0.0).validate().is_err());
        assert!(earth().with_period(-1.0).validate().is_err());
        assert!(OrbitalElements::new(f64::NAN, 0.1, 0.0, 0.0, 0.0).validate().is_err());
        assert!(OrbitalElements::new(1.0, -0.1, 0.0, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_scaled_only_touches_distance() {
        let e = earth();
        let s = e.scaled(1000.0);
        assert!((s.semimajor_axis - 149_598.023).abs() < 1e-9);
        assert_eq!(s.eccentricity, e.eccentricity);
        assert_eq!(s.argument_of_periapsis, e.argument_of_periapsis);
        assert_eq!(s.orbital_period, e.orbital_period);
    }

    #[test]
    fn test_apsides() {
        let e = OrbitalElements::new(10.0, 0.5, 0.0, 0.0, 0.0);
        assert!((e.periapsis_distance() - 5.0).abs() < 1e-12);
        assert!((e.apoapsis_distance() - 15.0).abs() < 1e-12);
        assert!((radius_at(&e, 0.0) - 5.0).abs() < 1e-12);
        assert!((radius_at(&e, std::f64::consts::PI) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_orientation_applies_node_then_inclination() {
        let e = OrbitalElements::new(1.0, 0.0, 90.0, 90.0, 0.0);
        // x rotated by 90° about z lands on y, then 90° about x lifts it to z
        let p = e.orientation() * Point3::new(1.0, 0.0, 0.0);
        assert!(p.x.abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((p.z - 1.0).abs() < 1e-12);
    }
}
