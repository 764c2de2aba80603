use thiserror::Error;

/// Errors raised when evaluating a [`Curve`](super::Curve).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CurveError {
    /// No pair of adjacent intervals brackets the pressure.
    ///
    /// Only happens for curves whose pressures are not monotonic, which
    /// points at inconsistent engine data.
    #[error("pressure {pressure} Pa is not bracketed by any interval")]
    Unbracketed { pressure: f64 },

    /// A curve needs at least two intervals to be evaluated.
    #[error("curve has {len} interval(s), at least two are required")]
    TooFewIntervals { len: usize },
}
