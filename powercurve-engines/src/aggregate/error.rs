use powercurve_atmos::AtmosphereError;
use thiserror::Error;

/// Reasons an aircraft produces nothing to report.
///
/// None of these are fatal to a batch; [`aggregate_all`](super::aggregate_all)
/// logs them and moves on.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no power-capable propeller engines")]
    NoPowerEngines,

    #[error("no jet or rocket engines")]
    NoThrustEngines,

    /// The first piston engine has no finite `SpeedManifoldMultiplier`.
    #[error("invalid intake efficiency on {engine}")]
    InvalidIntakeEfficiency { engine: String },

    #[error("mass data not found")]
    MissingMass,

    #[error("no matrices for the selected modes")]
    NoMatrices,

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: &'static str },

    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}
