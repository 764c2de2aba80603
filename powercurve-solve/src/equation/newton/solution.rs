use powercurve_core::Snapshot;

use crate::equation::Evaluation;

/// How a Newton solve finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The last correction was smaller than the configured tolerance.
    Converged,
    /// The estimated derivative was too flat to take another step.
    FlatDerivative,
    /// Reached the iteration limit; the last estimate is reported.
    MaxIters,
    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a Newton solve.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Final solver status.
    pub status: Status,
    /// Final estimate of the root.
    pub x: f64,
    /// Residual at the reported estimate.
    pub residual: f64,
    /// Snapshot at the reported estimate.
    pub snapshot: Snapshot<I, O>,
    /// Iteration count when the solver finished.
    pub iters: usize,
}

impl<I, O> Solution<I, O> {
    pub(super) fn from_eval(eval: Evaluation<I, O>, status: Status, iters: usize) -> Self {
        Self {
            status,
            x: eval.x,
            residual: eval.residual,
            snapshot: eval.snapshot,
            iters,
        }
    }
}
