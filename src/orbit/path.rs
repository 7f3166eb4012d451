//! Orbit path sampling

use std::f64::consts::TAU;

use nalgebra::Point3;

use super::elements::OrbitalElements;
use super::error::{OrbitError, OrbitResult};

/// Point count used when the caller has no preference. Yields 500 segments
/// with the last sample closing the loop.
pub const DEFAULT_POINT_COUNT: usize = 501;

/// One vertex of a discretized orbit, in scene units.
pub type Sample = Point3<f64>;

/// A closed polyline tracing one revolution. First and last samples coincide.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitPath {
    samples: Vec<Sample>,
}

impl OrbitPath {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True anomaly of sample `index`.
    pub fn anomaly_of(&self, index: usize) -> f64 {
        sweep_anomaly(index, self.samples.len())
    }

    /// Fill `out` with flattened xyz triples for a line-strip vertex buffer,
    /// each sample taken relative to `origin` before narrowing to `f32`.
    pub fn write_vertices(&self, origin: &Point3<f64>, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.samples.iter().flat_map(|p| {
            let v = p - origin;
            [v.x as f32, v.y as f32, v.z as f32]
        }));
    }
}

fn sweep_anomaly(index: usize, point_count: usize) -> f64 {
    index as f64 / (point_count - 1) as f64 * TAU
}

/// Trace the orbit described by `elements` with `point_count` samples.
///
/// True anomaly is swept uniformly over [0, 2π], so the spacing follows the
/// geometry rather than time.
pub fn sample(elements: &OrbitalElements, point_count: usize) -> OrbitResult<OrbitPath> {
    elements.validate()?;
    if point_count < 3 {
        return Err(OrbitError::invalid(format!(
            "an orbit path needs at least 3 points, got {}",
            point_count
        )));
    }

    let orientation = elements.orientation();
    let samples = (0..point_count)
        .map(|i| elements.point_at_true_anomaly(sweep_anomaly(i, point_count), &orientation))
        .collect();

    Ok(OrbitPath { samples })
}
