//! Error types for the orbit calculator

use thiserror::Error;

/// Result type for orbit computations
pub type OrbitResult<T> = Result<T, OrbitError>;

/// Errors raised by the orbit path sampler and position calculator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    #[error("Invalid orbit: {0}")]
    InvalidOrbit(String),

    #[error("Kepler solve did not converge after {iterations} iterations (residual {residual:e})")]
    Convergence { iterations: u32, residual: f64 },
}

impl OrbitError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OrbitError::InvalidOrbit(msg.into())
    }
}
