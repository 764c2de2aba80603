use ninterp::error::{InterpolateError, ValidateError};
use thiserror::Error;

/// Errors from building or evaluating a [`BilinearTable`](super::BilinearTable).
#[derive(Error, Debug)]
pub enum TableError {
    /// Grid and values are inconsistent, or a grid is not strictly
    /// increasing.
    #[error(transparent)]
    Validation(#[from] ValidateError),
    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
    /// Extrapolation needs an edge pair on both axes.
    #[error("extrapolating tables need two breakpoints per axis, got {x} x {y}")]
    TooFewBreakpoints { x: usize, y: usize },
}
