//! Numerical solvers for the powercurve workspace.

pub mod equation;
