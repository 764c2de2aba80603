//! Polynomial standard atmosphere for engine power modeling.
//!
//! [`Atmosphere`] evaluates pressure, temperature and density as degree-4
//! polynomial fits of altitude, valid up to [`POLYNOMIAL_CEILING`]. Above
//! that altitude pressure and density decay as `ceiling / h`. The inverse
//! [`Atmosphere::altitude_from_pressure`] runs a bounded Newton iteration and
//! always returns a best-effort estimate.
//!
//! All altitudes are in metres, pressures in pascals, temperatures in
//! kelvin and densities in kg/m³. Speeds passed to the ram helpers are in
//! km/h.

mod airspeed;
mod atmosphere;
mod error;
mod inversion;

pub use airspeed::{kph_to_mps, mach_from_tas, mps_to_kph, tas_from_mach};
pub use atmosphere::{
    Atmosphere, GRAVITY, POLYNOMIAL_CEILING, SeaLevel, STANDARD_DENSITY, STANDARD_PRESSURE,
    STANDARD_TEMPERATURE,
};
pub use error::AtmosphereError;
pub use inversion::{DEFAULT_START_ALTITUDE, DEFAULT_TOLERANCE};
