//! Orbit-style camera and the fly-to animation used when a body is selected.
//!
//! Poses are kept in `f64`. Scene coordinates reach ~6e6 units while the
//! smallest bodies are ~0.1 units across, below `f32` resolution at that
//! range, so the GPU only ever receives camera-relative matrices.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Translation3, UnitQuaternion, Vector3};

const MIN_POLAR: f64 = 0.05;
const MAX_POLAR: f64 = PI - 0.05;

/// Position plus orientation. The camera looks down its local -z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl CameraPose {
    pub fn look_at(eye: Point3<f64>, target: Point3<f64>) -> Self {
        let view_rotation = UnitQuaternion::look_at_rh(&(target - eye), &Vector3::y());
        CameraPose {
            eye,
            orientation: view_rotation.inverse(),
        }
    }

    pub fn view(&self) -> Matrix4<f64> {
        Isometry3::from_parts(Translation3::from(self.eye.coords), self.orientation)
            .inverse()
            .to_homogeneous()
    }

    pub fn forward(&self) -> Vector3<f64> {
        self.orientation * -Vector3::z()
    }

    /// A world point in view space. The subtraction happens in `f64`.
    pub fn to_view(&self, point: &Point3<f64>) -> Point3<f32> {
        Point3::from(self.orientation.inverse_transform_vector(&(point - self.eye))).cast::<f32>()
    }

    /// Model-view matrix of an object at `position` uniformly scaled by
    /// `scale`, composed in `f64` relative to the eye.
    pub fn model_view(&self, position: &Point3<f64>, scale: f64) -> Matrix4<f32> {
        let relative = self.orientation.inverse_transform_vector(&(position - self.eye));
        let model_view = Matrix4::new_translation(&relative)
            * self.orientation.inverse().to_homogeneous()
            * Matrix4::new_scaling(scale);
        model_view.cast::<f32>()
    }
}

/// Camera circling a target point. Angles are in radians; the polar angle is
/// measured from +y and clamped away from the poles.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Point3<f64>,
    pub distance: f64,
    pub azimuth: f64,
    pub polar: f64,
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl OrbitCamera {
    pub fn new(distance: f64) -> Self {
        OrbitCamera {
            target: Point3::origin(),
            distance,
            azimuth: 0.0,
            polar: FRAC_PI_2,
            fov: 75.0_f64.to_radians(),
            near: 0.1,
            far: 10_000_000.0,
            min_distance: 0.1,
            max_distance: 10_000_000.0,
        }
    }

    pub fn eye(&self) -> Point3<f64> {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + Vector3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * self.distance
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::look_at(self.eye(), self.target)
    }

    pub fn projection(&self, aspect: f32) -> Matrix4<f32> {
        Perspective3::new(aspect, self.fov as f32, self.near as f32, self.far as f32).to_homogeneous()
    }

    pub fn rotate(&mut self, d_azimuth: f64, d_polar: f64) {
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(2.0 * PI);
        self.polar = (self.polar + d_polar).clamp(MIN_POLAR, MAX_POLAR);
    }

    /// Multiplicative zoom; positive `delta` moves away.
    pub fn zoom(&mut self, delta: f64) {
        let factor = (delta * 0.001).exp();
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Re-anchor on `target` keeping the eye at `eye`.
    pub fn set_from_eye(&mut self, eye: Point3<f64>, target: Point3<f64>) {
        let offset = eye - target;
        let distance = offset.norm();
        self.target = target;
        if distance <= f64::EPSILON {
            return;
        }
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos().clamp(MIN_POLAR, MAX_POLAR);
        self.azimuth = offset.x.atan2(offset.z).rem_euclid(2.0 * PI);
    }
}

/// Interpolates the camera from its current pose to a framing of a target.
#[derive(Clone, Debug)]
pub struct FlyTo {
    start: CameraPose,
    end: CameraPose,
    target: Point3<f64>,
    /// End eye relative to the target
    offset: Vector3<f64>,
    start_ms: f64,
    duration_ms: f64,
}

impl FlyTo {
    /// Fly to a point `5 × radius` in front of `target` along +z, looking at it.
    pub fn new(from: CameraPose, target: Point3<f64>, radius: f64, start_ms: f64, duration_ms: f64) -> Self {
        let offset = Vector3::new(0.0, 0.0, radius * 5.0);
        FlyTo {
            start: from,
            end: CameraPose::look_at(target + offset, target),
            target,
            offset,
            start_ms,
            duration_ms,
        }
    }

    /// Move the destination to a target that has moved since the flight began.
    pub fn retarget(&mut self, target: Point3<f64>) {
        self.target = target;
        self.end = CameraPose::look_at(target + self.offset, target);
    }

    pub fn target(&self) -> Point3<f64> {
        self.target
    }

    pub fn end(&self) -> CameraPose {
        self.end
    }

    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Lerp the eye, slerp the orientation.
    pub fn pose_at(&self, now_ms: f64) -> CameraPose {
        let t = self.progress(now_ms);
        let eye = self.start.eye + (self.end.eye - self.start.eye) * t;
        let orientation = self
            .start
            .orientation
            .try_slerp(&self.end.orientation, t, 1e-9)
            .unwrap_or(if t < 0.5 { self.start.orientation } else { self.end.orientation });
        CameraPose { eye, orientation }
    }
}
