mod config;
mod error;
mod solution;

pub use config::Config;
pub use error::Error;
pub use solution::{Solution, Status};

use powercurve_core::Model;

use crate::equation::{EquationProblem, Evaluation, Observer, evaluate, forward_slope};

/// Control actions supported by the Newton solver.
pub enum Action {
    /// Stop and report the current estimate.
    StopEarly,
}

/// Iteration event emitted by the Newton solver.
pub struct Event<'a, I, O> {
    /// Iteration counter (1-based).
    pub iter: usize,
    /// Forward-difference derivative estimate at the current point.
    pub derivative: f64,
    /// Evaluation at the current point, before the Newton step is taken.
    pub eval: &'a Evaluation<I, O>,
}

/// Finds a root of a scalar equation with Newton's method.
///
/// The derivative is approximated by a forward difference of width
/// `config.derivative_step`. The solve ends as soon as one of these holds:
///
/// - the derivative magnitude falls below `config.derivative_floor`
///   ([`Status::FlatDerivative`], the current point is reported),
/// - a correction is smaller than `config.x_abs_tol`
///   ([`Status::Converged`], the corrected point is reported),
/// - `config.max_iters` steps have been taken ([`Status::MaxIters`]).
///
/// Running out of iterations is reported through the status rather than as
/// an error, so callers always receive a best-effort estimate.
///
/// # Errors
///
/// Returns an error if the config or starting point is invalid, if a residual
/// is not finite, or if the model or problem fails during evaluation.
pub fn solve<I, O, Obs>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<1, Input = I, Output = O>,
    start: f64,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<I, O>, Error>
where
    Obs: for<'a> Observer<Event<'a, I, O>, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    if !start.is_finite() {
        return Err(Error::NonFiniteStart { value: start });
    }

    let mut current = evaluate(model, problem, start)?;

    for iter in 1..=config.max_iters {
        let derivative = forward_slope(model, problem, &current, config.derivative_step)?;

        let event = Event {
            iter,
            derivative,
            eval: &current,
        };

        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::from_eval(current, Status::StoppedByObserver, iter));
        }

        if derivative.abs() < config.derivative_floor {
            return Ok(Solution::from_eval(current, Status::FlatDerivative, iter));
        }

        let correction = -current.residual / derivative;
        let next = evaluate(model, problem, current.x + correction)?;

        if correction.abs() < config.x_abs_tol {
            return Ok(Solution::from_eval(next, Status::Converged, iter));
        }

        current = next;
    }

    Ok(Solution::from_eval(
        current,
        Status::MaxIters,
        config.max_iters,
    ))
}

/// Runs Newton's method without observation.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<I, O>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<1, Input = I, Output = O>,
    start: f64,
    config: &Config,
) -> Result<Solution<I, O>, Error> {
    solve(model, problem, start, config, ())
}
