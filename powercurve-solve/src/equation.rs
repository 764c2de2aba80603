mod evaluate;

pub mod newton;

pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate, forward_slope};
pub use powercurve_core::{EquationProblem, Observer};
