use std::collections::BTreeMap;

use serde_json::Value;

use super::{
    DescriptionError, EngineDescription,
    fields::{Object, Section, indexed_keys},
};

/// How engines are keyed at the top level of a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSchema {
    /// `Engine{n}` holds one physical engine each.
    Engine,
    /// `EngineType{t}` holds one engine type; `Engine{n}.Type` references it.
    EngineType,
}

impl EngineSchema {
    fn prefix(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::EngineType => "EngineType",
        }
    }
}

/// A named engine of a flight model.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEntry {
    /// Top-level key, for example `Engine1`.
    pub key: String,
    /// Numeric suffix of the key.
    pub index: usize,
    pub engine: EngineDescription,
}

/// A named fuel modifier affecting manifold pressure and WEP boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaneModifier {
    pub invert_enable_logic: bool,
    pub afterburner_mult: f64,
    pub afterburner_compressor_mult: f64,
}

/// Fuel modifiers that change engine output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelModifiers {
    /// `150_octan_fuel`.
    pub octane_150: Option<OctaneModifier>,
    /// `100_octan_spitfire`.
    pub octane_100_spitfire: Option<OctaneModifier>,
    /// `ussr_fuel_b-95` or `ussr_fuel_b-100` adding 50 horsepower.
    pub soviet_high_octane: bool,
}

/// Masses used for power- and thrust-to-weight figures, in kg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassData {
    pub empty: f64,
    pub max_fuel: f64,
    pub max_nitro: f64,
    pub oil: f64,
    pub pilots: f64,
    pub ammo: f64,
}

impl MassData {
    /// Total mass with the tanks filled to `fuel_percent`.
    #[must_use]
    pub fn total(&self, fuel_percent: f64) -> f64 {
        self.empty
            + self.max_fuel * (fuel_percent / 100.0)
            + self.max_nitro
            + self.oil
            + self.pilots
            + self.ammo
    }
}

/// The engine-related content of an aircraft description.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightModel {
    pub schema: EngineSchema,
    pub engines: Vec<EngineEntry>,
    pub engines_are_same: bool,
    pub modifiers: FuelModifiers,
    pub mass: Option<MassData>,
    type_instances: BTreeMap<usize, usize>,
}

impl FlightModel {
    /// Parses a description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or see [`FlightModel::from_value`].
    pub fn from_json_str(text: &str) -> Result<Self, DescriptionError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Reads the engine-related parts of a description.
    ///
    /// # Errors
    ///
    /// Returns an error if the top level is not an object or a known field
    /// has the wrong JSON type.
    pub fn from_value(value: &Value) -> Result<Self, DescriptionError> {
        let map = value.as_object().ok_or(DescriptionError::NotAnObject)?;
        let root = Section::new("", map);

        let schema = if root.contains("EngineType0") {
            EngineSchema::EngineType
        } else {
            EngineSchema::Engine
        };

        let mut engines = Vec::new();
        for (index, key) in root.indexed_keys(schema.prefix()) {
            let Some(engine) = root.object(key)? else {
                continue;
            };
            engines.push(EngineEntry {
                key: key.to_owned(),
                index,
                engine: EngineDescription::parse_or_flat(Section::new(key, engine), root)?,
            });
        }

        let type_instances = match schema {
            EngineSchema::Engine => BTreeMap::new(),
            EngineSchema::EngineType => count_type_instances(map)?,
        };

        Ok(Self {
            schema,
            engines,
            engines_are_same: root.flag("engines_are_same")?.unwrap_or(false),
            modifiers: parse_modifiers(root)?,
            mass: parse_mass(root)?,
            type_instances,
        })
    }

    /// Looks up an engine by its top-level key.
    #[must_use]
    pub fn engine(&self, key: &str) -> Option<&EngineEntry> {
        self.engines.iter().find(|entry| entry.key == key)
    }

    /// Physical engines represented by an entry.
    ///
    /// One per key for the `Engine{n}` schema. For `EngineType{t}` this is
    /// the number of `Engine{n}` objects whose `Type` is `t`, at least one.
    #[must_use]
    pub fn instance_count(&self, entry: &EngineEntry) -> usize {
        match self.schema {
            EngineSchema::Engine => 1,
            EngineSchema::EngineType => self
                .type_instances
                .get(&entry.index)
                .copied()
                .unwrap_or(0)
                .max(1),
        }
    }

    /// Whether any engine is a booster that is built into the airframe.
    #[must_use]
    pub fn has_integrated_booster(&self) -> bool {
        self.engines.iter().any(|entry| {
            entry.engine.is_rocket_booster() && !entry.engine.is_takeoff_booster()
        })
    }
}

fn count_type_instances(map: &Object) -> Result<BTreeMap<usize, usize>, DescriptionError> {
    let root = Section::new("", map);
    let mut counts = BTreeMap::new();
    for (_, key) in indexed_keys(map, "Engine") {
        let Some(engine) = root.object(key)? else {
            continue;
        };
        let Some(type_index) = Section::new(key, engine).number("Type")? else {
            continue;
        };
        if type_index >= 0.0 && type_index.fract() == 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let type_index = type_index as usize;
            *counts.entry(type_index).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn parse_modifiers(root: Section<'_>) -> Result<FuelModifiers, DescriptionError> {
    let Some(modif) = root.object("Modif")? else {
        return Ok(FuelModifiers::default());
    };
    let modif = Section::new("Modif", modif);

    let octane = |key: &str| -> Result<Option<OctaneModifier>, DescriptionError> {
        let path = modif.child_path(key);
        let Some(map) = modif.object(key)? else {
            return Ok(None);
        };
        let section = Section::new(&path, map);
        let effects_path = section.child_path("effects");
        let empty = Object::new();
        let effects = Section::new(&effects_path, section.object("effects")?.unwrap_or(&empty));
        Ok(Some(OctaneModifier {
            invert_enable_logic: section.flag("invertEnableLogic")?.unwrap_or(false),
            afterburner_mult: effects.number("afterburnerMult")?.unwrap_or(1.0),
            afterburner_compressor_mult: effects
                .number("afterburnerCompressorMult")?
                .unwrap_or(1.0),
        }))
    };

    let adds_fifty_horsepower = |key: &str| -> Result<bool, DescriptionError> {
        let path = modif.child_path(key);
        let Some(map) = modif.object(key)? else {
            return Ok(false);
        };
        let section = Section::new(&path, map);
        let effects_path = section.child_path("effects");
        let Some(effects) = section.object("effects")? else {
            return Ok(false);
        };
        let added = Section::new(&effects_path, effects).number("addHorsePowers")?;
        Ok(added == Some(50.0))
    };

    Ok(FuelModifiers {
        octane_150: octane("150_octan_fuel")?,
        octane_100_spitfire: octane("100_octan_spitfire")?,
        soviet_high_octane: adds_fifty_horsepower("ussr_fuel_b-95")?
            || adds_fifty_horsepower("ussr_fuel_b-100")?,
    })
}

fn parse_mass(root: Section<'_>) -> Result<Option<MassData>, DescriptionError> {
    let Some(mass) = root.object("Mass")? else {
        return Ok(None);
    };
    let mass = Section::new("Mass", mass);
    let Some(empty) = mass.number("EmptyMass")? else {
        return Ok(None);
    };

    let max_fuel = match mass.number("MaxFuelMass")? {
        Some(fuel) => fuel,
        None => {
            let mut total = 0.0;
            for (_, key) in mass.indexed_keys("MaxFuelMass") {
                total += mass.number(key)?.unwrap_or(0.0);
            }
            total
        }
    };

    let ammo = match root.object("Guns")? {
        Some(guns) => Section::new("Guns", guns).number("all_ammo_mass")?.unwrap_or(0.0),
        None => 0.0,
    };

    Ok(Some(MassData {
        empty,
        max_fuel,
        max_nitro: mass.number("MaxNitro")?.unwrap_or(0.0),
        oil: mass.number("OilMass")?.unwrap_or(0.0),
        pilots: mass.number("pilots_mass")?.unwrap_or(0.0),
        ammo,
    }))
}
