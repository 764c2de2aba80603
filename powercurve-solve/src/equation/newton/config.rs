/// Configuration for the Newton solver.
///
/// The derivative is estimated with a forward difference of width
/// `derivative_step`. Iteration stops once a correction is smaller than
/// `x_abs_tol`, or as soon as the derivative magnitude drops below
/// `derivative_floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub max_iters: usize,
    pub derivative_step: f64,
    pub x_abs_tol: f64,
    pub derivative_floor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 10,
            derivative_step: 1e-4,
            x_abs_tol: 1e-4,
            derivative_floor: 1e-10,
        }
    }
}

impl Config {
    /// Uses `tolerance` both as the convergence threshold and as the
    /// finite-difference step.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            derivative_step: tolerance,
            x_abs_tol: tolerance,
            ..Self::default()
        }
    }

    /// Validates that the step is positive and the tolerances are usable.
    ///
    /// # Errors
    ///
    /// Returns a static reason if any field is out of range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.derivative_step.is_finite() || self.derivative_step <= 0.0 {
            return Err("derivative_step must be finite and positive");
        }
        if !self.x_abs_tol.is_finite() || self.x_abs_tol < 0.0 {
            return Err("x_abs_tol must be finite and non-negative");
        }
        if !self.derivative_floor.is_finite() || self.derivative_floor < 0.0 {
            return Err("derivative_floor must be finite and non-negative");
        }
        Ok(())
    }
}
