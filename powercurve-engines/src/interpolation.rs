//! Bilinear interpolation over rectilinear tables.

mod error;

pub use error::TableError;

use ndarray::{Array1, Array2};
use ninterp::{
    prelude::{Interp2DOwned, Interpolator},
    strategy::enums::Strategy2DEnum,
};

/// What a table does with a point outside its grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Extrapolate {
    /// Continue the edge cells linearly.
    Enable,
    /// Restrict the point to the grid limits.
    Clamp,
    /// Fail with an interpolation error.
    #[default]
    Error,
}

impl From<Extrapolate> for ninterp::interpolator::Extrapolate<f64> {
    fn from(value: Extrapolate) -> Self {
        match value {
            Extrapolate::Enable => ninterp::interpolator::Extrapolate::Enable,
            Extrapolate::Clamp => ninterp::interpolator::Extrapolate::Clamp,
            Extrapolate::Error => ninterp::interpolator::Extrapolate::Error,
        }
    }
}

/// A value tabulated over a rectilinear `(x, y)` grid.
pub struct BilinearTable(Interp2DOwned<f64, Strategy2DEnum>);

impl BilinearTable {
    /// Creates a table from grid coordinates and values.
    ///
    /// `f_xy` must have shape `(x.len(), y.len())`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Validation`] if the shapes disagree, if a grid
    /// is not strictly increasing, and [`TableError::TooFewBreakpoints`] if
    /// extrapolation is enabled on a grid with fewer than two points along
    /// an axis.
    pub fn new(
        x: Array1<f64>,
        y: Array1<f64>,
        f_xy: Array2<f64>,
        extrapolate: Extrapolate,
    ) -> Result<Self, TableError> {
        if extrapolate == Extrapolate::Enable && (x.len() < 2 || y.len() < 2) {
            return Err(TableError::TooFewBreakpoints {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self(Interp2DOwned::new(
            x,
            y,
            f_xy,
            ninterp::strategy::Linear.into(),
            extrapolate.into(),
        )?))
    }

    /// Value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Fails only for out-of-grid points under [`Extrapolate::Error`].
    pub fn evaluate(&self, x: f64, y: f64) -> Result<f64, TableError> {
        self.0.interpolate(&[x, y]).map_err(Into::into)
    }
}

impl std::fmt::Debug for BilinearTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BilinearTable").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn table(extrapolate: Extrapolate) -> BilinearTable {
        BilinearTable::new(
            array![0., 1., 2.],
            array![0., 1., 2.],
            array![[0.0, 0.4, 0.8], [0.2, 0.6, 1.0], [0.4, 0.8, 1.2]],
            extrapolate,
        )
        .unwrap()
    }

    #[test]
    fn interpolates_inside_the_grid() {
        assert_relative_eq!(table(Extrapolate::Error).evaluate(1.5, 1.5).unwrap(), 0.9);
    }

    #[test]
    fn extrapolation_modes() {
        assert_relative_eq!(table(Extrapolate::Enable).evaluate(3.0, 0.0).unwrap(), 0.6);
        assert_relative_eq!(table(Extrapolate::Clamp).evaluate(3.0, 0.0).unwrap(), 0.4);
        assert!(matches!(
            table(Extrapolate::Error).evaluate(3.0, 0.0),
            Err(TableError::Interpolation(_))
        ));
    }

    #[test]
    fn extrapolation_needs_edge_pairs() {
        let result = BilinearTable::new(
            array![0.],
            array![0., 1.],
            array![[0.0, 0.1]],
            Extrapolate::Enable,
        );
        assert!(matches!(
            result,
            Err(TableError::TooFewBreakpoints { x: 1, y: 2 })
        ));
    }

    #[test]
    fn rejects_unsorted_grid() {
        let result = BilinearTable::new(
            array![0., 2., 1.],
            array![0., 1.],
            array![[0.0, 0.1], [0.2, 0.3], [0.4, 0.5]],
            Extrapolate::Enable,
        );
        assert!(matches!(result, Err(TableError::Validation(_))));
    }
}
