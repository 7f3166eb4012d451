//! Orbital mechanics core: orbit paths and body positions from Keplerian
//! elements. Everything here is a pure function of its inputs.

pub mod elements;
pub mod error;
pub mod kepler;
pub mod path;

pub use elements::{radius_at, OrbitalElements};
pub use error::{OrbitError, OrbitResult};
pub use kepler::{mean_anomaly_at, position_at, solve_kepler, true_anomaly, KeplerSettings, Position};
pub use path::{sample, OrbitPath, Sample, DEFAULT_POINT_COUNT};
