use powercurve_solve::equation::newton;
use thiserror::Error;

/// Errors raised by [`Atmosphere`](crate::Atmosphere) configuration and
/// altitude searches.
#[derive(Debug, Error)]
pub enum AtmosphereError {
    /// Sea-level pressure must be finite and positive.
    #[error("sea-level pressure must be finite and positive, got {0} Pa")]
    InvalidPressure(f64),

    /// Sea-level temperature must be finite and above absolute zero.
    #[error("sea-level temperature must be finite and positive, got {0} K")]
    InvalidTemperature(f64),

    /// Root-finding tolerance must be finite and positive.
    #[error("altitude search tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    #[error("target pressure is not finite: {0}")]
    NonFiniteTarget(f64),

    #[error(transparent)]
    Solver(#[from] newton::Error),
}
