//! Flight-model descriptions.
//!
//! A description is the JSON document the game ships for each aircraft.
//! Parsing pulls the engine-related parts of it into typed records:
//! numbered fields such as `Altitude0` or `PowerAtCeiling1` become
//! [`CompressorStage`] entries, and the per-engine sections become
//! [`EngineDescription`] values.

mod engine;
mod error;
mod fields;
mod model;

pub use engine::{
    CompressorStage, CompressorSection, EngineDescription, EngineKind, MainSection, ThrottleSetting,
    ThrustMaxSection, MAX_STAGES,
};
pub use error::DescriptionError;
pub use model::{EngineEntry, EngineSchema, FlightModel, FuelModifiers, MassData, OctaneModifier};
