/// Describes an equation `r(x) = 0` posed over a [`Model`](crate::Model).
///
/// The solver owns the `N` unknowns `x`. The problem translates them into a
/// model input and, once the model has been called, reduces the input/output
/// pair to `N` residuals.
pub trait EquationProblem<const N: usize> {
    type Input;
    type Output;
    type InputError: std::error::Error + Send + Sync + 'static;
    type ResidualError: std::error::Error + Send + Sync + 'static;

    /// Builds the model input for the solver variables `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` cannot be mapped to a valid model input.
    fn input(&self, x: &[f64; N]) -> Result<Self::Input, Self::InputError>;

    /// Computes the residuals for a model call.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be computed.
    fn residuals(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; N], Self::ResidualError>;
}
