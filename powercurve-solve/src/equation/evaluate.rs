use thiserror::Error;

use powercurve_core::{EquationProblem, Model, Snapshot};

/// A scalar equation evaluated at one point.
#[derive(Debug, Clone)]
pub struct Evaluation<I, O> {
    pub x: f64,
    pub residual: f64,
    pub snapshot: Snapshot<I, O>,
}

/// Why a point of a scalar equation could not be used.
#[derive(Debug, Error)]
pub enum EvalError<IE, ME, RE> {
    #[error("failed to compute input")]
    Input(#[source] IE),
    #[error("model call failed")]
    Model(#[source] ME),
    #[error("failed to compute residual")]
    Residual(#[source] RE),
    /// The residual is NaN or infinite, so no step can be taken from it.
    #[error("non-finite residual {residual} at x = {x}")]
    NonFinite { x: f64, residual: f64 },
}

/// Result of [`evaluate`] and [`forward_slope`] for a model and problem pair.
pub type EvaluateResult<T, M, P> = Result<
    T,
    EvalError<
        <P as EquationProblem<1>>::InputError,
        <M as Model>::Error,
        <P as EquationProblem<1>>::ResidualError,
    >,
>;

/// Evaluates a scalar equation at `x`.
///
/// # Errors
///
/// Fails if the problem cannot map `x` to an input, the model call fails,
/// the residual cannot be computed, or the residual is not finite.
pub fn evaluate<M, P>(
    model: &M,
    problem: &P,
    x: f64,
) -> EvaluateResult<Evaluation<M::Input, M::Output>, M, P>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    let input = problem.input(&[x]).map_err(EvalError::Input)?;
    let snapshot = model.record(input).map_err(EvalError::Model)?;
    let [residual] = problem
        .residuals(&snapshot.input, &snapshot.output)
        .map_err(EvalError::Residual)?;

    if !residual.is_finite() {
        return Err(EvalError::NonFinite { x, residual });
    }

    Ok(Evaluation { x, residual, snapshot })
}

/// Forward-difference slope of the residual at an evaluated point.
///
/// # Errors
///
/// Fails if the equation cannot be evaluated at `at.x + step`.
pub fn forward_slope<M, P>(
    model: &M,
    problem: &P,
    at: &Evaluation<M::Input, M::Output>,
    step: f64,
) -> EvaluateResult<f64, M, P>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    let ahead = evaluate(model, problem, at.x + step)?;
    Ok((ahead.residual - at.residual) / step)
}
