//! Power and thrust response surfaces for aircraft engines.
//!
//! The crate turns a parsed [`FlightModel`] into matrices of engine output
//! indexed by `[speed, altitude]`:
//!
//! - [`curve`] reconstructs a piecewise power curve in pressure space for
//!   every supercharger stage and throttle mode of a piston engine.
//! - [`sampler`] evaluates those curves over a grid of total intake
//!   pressures, taking the best stage at each cell.
//! - [`thrust`] interpolates tabulated thrust and torque coefficients for
//!   jets, rockets and turboprops.
//! - [`aggregate`] combines engines, normalizes by mass and converts units
//!   according to a [`Request`].

pub mod aggregate;
pub mod curve;
pub mod description;
pub mod interpolation;
pub mod sampler;
pub mod thrust;

mod mode;

pub use aggregate::{
    AggregateError, Aircraft, Comparison, Metric, Request, aggregate, aggregate_all, compare,
};
pub use curve::{Curve, CurveError, EngineCurves, PowerInterval};
pub use description::{DescriptionError, EngineDescription, EngineKind, FlightModel};
pub use mode::ThrottleMode;
pub use sampler::{Grid, ResponseMatrix, SpeedType};
pub use thrust::ThrustMaxTable;
