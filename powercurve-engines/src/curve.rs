//! Piecewise power curves in pressure space.
//!
//! A supercharged piston engine's rated power is described by a handful of
//! breakpoints per stage: deck power, critical altitude, an optional
//! constant-RPM bend and an optional ceiling. The builder walks those
//! breakpoints from below sea level upward and records each segment's lower
//! bound as a [`PowerInterval`]. The resulting [`Curve`] is evaluated by
//! total intake pressure, so ram effects are handled by the caller simply
//! passing a higher pressure.
//!
//! WEP curves reuse the same breakpoints, shifted to the altitudes where the
//! higher manifold pressure can still be held and scaled by the WEP power
//! multiplier.

mod builder;
mod error;
mod interval;
mod octane;
mod region;
mod stage;
mod wep;

pub use builder::{EngineCurves, build_curves, build_engine_curves};
pub use error::CurveError;
pub use interval::{Curve, PowerInterval};
