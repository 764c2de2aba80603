/// A fallible, deterministic function from a typed input to a typed output.
///
/// Solvers only ever see a model through this trait, so the same physical
/// model can be inverted, swept or evaluated directly.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the model at `input`.
    ///
    /// # Errors
    ///
    /// Returns the model's own error when `input` lies outside its domain.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;

    /// Evaluates the model and keeps the input alongside the output.
    ///
    /// # Errors
    ///
    /// See [`Model::call`].
    fn record(
        &self,
        input: Self::Input,
    ) -> Result<Snapshot<Self::Input, Self::Output>, Self::Error> {
        let output = self.call(&input)?;
        Ok(Snapshot { input, output })
    }
}

/// One recorded model evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    #[must_use]
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Splits the snapshot back into its input and output.
    pub fn into_parts(self) -> (I, O) {
        (self.input, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NegativeInput;

    impl std::fmt::Display for NegativeInput {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("input is negative")
        }
    }

    impl std::error::Error for NegativeInput {}

    /// Square root defined only for non-negative inputs.
    struct Sqrt;

    impl Model for Sqrt {
        type Input = f64;
        type Output = f64;
        type Error = NegativeInput;

        fn call(&self, input: &f64) -> Result<f64, NegativeInput> {
            if *input < 0.0 {
                Err(NegativeInput)
            } else {
                Ok(input.sqrt())
            }
        }
    }

    #[test]
    fn record_keeps_input_and_output() {
        let snapshot = Sqrt.record(16.0).unwrap();
        assert_eq!(snapshot, Snapshot::new(16.0, 4.0));
        assert_eq!(snapshot.into_parts(), (16.0, 4.0));
    }

    #[test]
    fn record_propagates_model_errors() {
        assert!(Sqrt.record(-1.0).is_err());
    }
}
