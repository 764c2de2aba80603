//! Core traits for the powercurve workspace.
//!
//! These abstractions sit between numeric solvers and the physical models
//! they drive:
//!
//! - [`Model`] maps a typed input to a typed output
//! - [`Snapshot`] captures one input/output pair from a model call
//! - [`EquationProblem`] turns solver variables into model inputs and model
//!   outputs into residuals
//! - [`Observer`] receives solver events and may steer the iteration

mod model;
mod observer;
mod problem;

pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use problem::EquationProblem;
