//! Newton inversion of the pressure polynomial.

use std::convert::Infallible;

use powercurve_core::{EquationProblem, Model};
use powercurve_solve::equation::newton::{self, Config, Solution};

use crate::atmosphere::{PRESSURE, poly};

/// Default convergence tolerance (m) for altitude inversion.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default Newton starting altitude (m).
pub const DEFAULT_START_ALTITUDE: f64 = 0.0;

/// Static pressure from the raw pressure polynomial.
///
/// The polynomial is evaluated without the ceiling clamp so that Newton's
/// method sees a smooth function on both sides of the fit ceiling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PressurePolynomial {
    pub(crate) sea_level_pressure: f64,
}

impl Model for PressurePolynomial {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn call(&self, altitude: &f64) -> Result<f64, Infallible> {
        Ok(self.sea_level_pressure * poly(&PRESSURE, *altitude))
    }
}

/// Residual `pressure(h) - target`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TargetPressure {
    pub(crate) target: f64,
}

impl EquationProblem<1> for TargetPressure {
    type Input = f64;
    type Output = f64;
    type InputError = Infallible;
    type ResidualError = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<f64, Infallible> {
        Ok(x[0])
    }

    fn residuals(&self, _altitude: &f64, pressure: &f64) -> Result<[f64; 1], Infallible> {
        Ok([pressure - self.target])
    }
}

/// Runs the bounded Newton search for the altitude at `target` pressure.
pub(crate) fn solve(
    sea_level_pressure: f64,
    target: f64,
    tolerance: f64,
    start: f64,
) -> Result<Solution<f64, f64>, newton::Error> {
    let model = PressurePolynomial { sea_level_pressure };
    let problem = TargetPressure { target };
    newton::solve_unobserved(&model, &problem, start, &Config::with_tolerance(tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use newton::Status;

    #[test]
    fn converges_for_mid_altitude() {
        let model = PressurePolynomial {
            sea_level_pressure: 101_300.0,
        };
        let target = model.call(&6000.0).unwrap();

        let solution = solve(101_300.0, target, DEFAULT_TOLERANCE, 0.0).unwrap();

        assert_eq!(solution.status, Status::Converged);
        assert!(solution.iters <= 10);
        assert_relative_eq!(solution.x, 6000.0, epsilon = 1e-3);
    }

    #[test]
    fn residual_is_pressure_minus_target() {
        let problem = TargetPressure { target: 80_000.0 };
        let [r] = problem.residuals(&1000.0, &89_000.0).unwrap();
        assert_relative_eq!(r, 9000.0);
    }
}
