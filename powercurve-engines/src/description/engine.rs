use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    DescriptionError,
    fields::{Object, Section},
};

/// Upper bound on supercharger stages read from a compressor section.
pub const MAX_STAGES: usize = 6;

/// How an engine produces its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    /// Inline piston engine.
    Inline,
    /// Radial piston engine.
    Radial,
    /// Turboprop, tabulated torque.
    TurboProp,
    /// Jet (or jet-like) engine, tabulated thrust.
    Jet,
    /// Rocket motor with constant thrust.
    Rocket,
    /// Anything else.
    Other,
}

impl EngineKind {
    fn from_type_name(name: Option<&str>) -> Self {
        match name {
            Some("Inline") => Self::Inline,
            Some("Radial") => Self::Radial,
            Some("TurboProp") => Self::TurboProp,
            Some("Rocket") => Self::Rocket,
            Some(other) if other.contains("Jet") || other.contains("Rocket") => Self::Jet,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn is_piston(self) -> bool {
        matches!(self, Self::Inline | Self::Radial)
    }

    #[must_use]
    pub fn is_thrust(self) -> bool {
        matches!(self, Self::Jet | Self::Rocket)
    }
}

/// One numbered supercharger stage of a compressor.
///
/// Every field is optional: presence matters to the curve builder, which
/// distinguishes, say, "no constant-RPM breakpoint" from a breakpoint at 0 m.
/// The deck values come from the engine's `Main` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressorStage {
    pub index: usize,
    pub altitude: Option<f64>,
    pub power: Option<f64>,
    pub deck_altitude: Option<f64>,
    pub deck_power: Option<f64>,
    pub old_altitude: Option<f64>,
    pub old_power_new_rpm: Option<f64>,
    pub const_rpm_altitude: Option<f64>,
    pub const_rpm_power: Option<f64>,
    pub const_rpm_curvature: Option<f64>,
    pub ceiling: Option<f64>,
    pub power_at_ceiling: Option<f64>,
    pub afterburner_pressure_boost: Option<f64>,
    pub afterburner_boost_mul: Option<f64>,
}

/// The `Compressor` section of an engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressorSection {
    pub exact_altitudes: bool,
    pub speed_manifold_multiplier: Option<f64>,
    pub stages: Vec<CompressorStage>,
}

/// A `Mode{n}` entry pairing a throttle position with a thrust multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleSetting {
    pub throttle: f64,
    pub thrust_mult: f64,
}

/// The sparse `ThrustMax` table of a jet or turboprop.
///
/// Breakpoints keep their field index; coefficients are keyed by
/// `(altitude index, velocity index)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThrustMaxSection {
    pub base: Option<f64>,
    pub altitudes: Vec<(usize, f64)>,
    pub velocities: Vec<(usize, f64)>,
    pub thrust_coeffs: BTreeMap<(usize, usize), f64>,
    pub torque_coeffs: BTreeMap<(usize, usize), f64>,
    pub afterburner_coeffs: BTreeMap<(usize, usize), f64>,
}

/// The engine-wide `Main` section.
///
/// Manifold-pressure and RPM fields accept both the spellings found in
/// published flight models (`Military_MP`, `WEP_RPM`, ...) and the
/// shorthand used by processed data (`Mil_mp`, `WEP_rpm`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MainSection {
    pub type_name: Option<String>,
    pub power: Option<f64>,
    /// `Power0`, the deck power of the first stage.
    pub deck_power: Option<f64>,
    pub thrust: Option<f64>,
    pub afterburner_boost: Option<f64>,
    pub throttle_boost: Option<f64>,
    pub military_manifold_pressure: Option<f64>,
    pub wep_manifold_pressure: Option<f64>,
    pub octane_manifold_pressure: Option<f64>,
    pub military_rpm: Option<f64>,
    pub wep_rpm: Option<f64>,
    pub wep_rpm_effect_on_supercharger: Option<f64>,
    pub thrust_max: Option<ThrustMaxSection>,
    pub modes: Vec<ThrottleSetting>,
}

/// One engine (or engine type) of an aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDescription {
    pub kind: EngineKind,
    pub main: MainSection,
    pub compressor: Option<CompressorSection>,
    pub afterburner_controllable: bool,
    pub booster: bool,
    pub external: bool,
}

impl EngineDescription {
    /// A rocket flagged as a booster.
    #[must_use]
    pub fn is_rocket_booster(&self) -> bool {
        self.booster && self.kind == EngineKind::Rocket
    }

    /// A rocket booster mounted externally for take-off assistance.
    #[must_use]
    pub fn is_takeoff_booster(&self) -> bool {
        self.is_rocket_booster() && self.external
    }

    pub(crate) fn parse(section: Section<'_>) -> Result<Self, DescriptionError> {
        let empty = Object::new();
        let main_path = section.child_path("Main");
        let main_section = Section::new(&main_path, section.object("Main")?.unwrap_or(&empty));
        let main = MainSection::parse(main_section)?;

        let compressor_path = section.child_path("Compressor");
        let compressor = section
            .object("Compressor")?
            .map(|map| CompressorSection::parse(Section::new(&compressor_path, map), main_section))
            .transpose()?;

        let afterburner_path = section.child_path("Afterburner");
        let afterburner_controllable = match section.object("Afterburner")? {
            Some(map) => Section::new(&afterburner_path, map)
                .flag("IsControllable")?
                .unwrap_or(false),
            None => false,
        };

        Ok(Self {
            kind: EngineKind::from_type_name(main.type_name.as_deref()),
            main,
            compressor,
            afterburner_controllable,
            booster: section.flag("Booster")?.unwrap_or(false),
            external: section.flag("External")?.unwrap_or(false),
        })
    }

    /// Parses an engine, reading its supercharger from the top level when
    /// it has no `Compressor` section of its own.
    ///
    /// Flat descriptions keep `Compressor` and `Main` fields directly on the
    /// aircraft. Such an engine has no controllable afterburner. Jets,
    /// rockets and turboprops never fall back.
    pub(crate) fn parse_or_flat(
        section: Section<'_>,
        root: Section<'_>,
    ) -> Result<Self, DescriptionError> {
        let own = Self::parse(section)?;
        if own.compressor.is_some() {
            return Ok(own);
        }

        let main = MainSection::parse(root)?;
        let kind = match own.kind {
            EngineKind::Other => EngineKind::from_type_name(main.type_name.as_deref()),
            kind => kind,
        };
        if !kind.is_piston() {
            return Ok(own);
        }

        Ok(Self {
            kind,
            compressor: Some(CompressorSection::parse(root, root)?),
            main,
            afterburner_controllable: false,
            ..own
        })
    }
}

impl MainSection {
    fn parse(main: Section<'_>) -> Result<Self, DescriptionError> {
        let thrust_max_path = main.child_path("ThrustMax");
        let thrust_max = main
            .object("ThrustMax")?
            .map(|map| ThrustMaxSection::parse(Section::new(&thrust_max_path, map)))
            .transpose()?;

        let mut modes = Vec::new();
        for (_, key) in main.indexed_keys("Mode") {
            let path = main.child_path(key);
            let Some(map) = main.object(key)? else {
                continue;
            };
            let entry = Section::new(&path, map);
            if let (Some(throttle), Some(thrust_mult)) =
                (entry.number("Throttle")?, entry.number("ThrustMult")?)
            {
                modes.push(ThrottleSetting {
                    throttle,
                    thrust_mult,
                });
            }
        }

        Ok(Self {
            type_name: main.text("Type")?.map(str::to_owned),
            power: main.number("Power")?,
            deck_power: main.number("Power0")?,
            thrust: main.number("Thrust")?,
            afterburner_boost: main.number("AfterburnerBoost")?,
            throttle_boost: main.number("ThrottleBoost")?,
            military_manifold_pressure: either(main, "Mil_mp", "Military_MP")?,
            wep_manifold_pressure: either(main, "WEP_mp", "WEP_MP")?,
            octane_manifold_pressure: either(main, "Octane_mp", "Octane_MP")?,
            military_rpm: either(main, "Mil_rpm", "military_RPM")?,
            wep_rpm: either(main, "WEP_rpm", "WEP_RPM")?,
            wep_rpm_effect_on_supercharger: either(
                main,
                "WEP_mil_RPM_EffectOnSupercharger",
                "WEP-mil_RPM_EffectOnSupercharger",
            )?,
            thrust_max,
            modes,
        })
    }
}

fn either(section: Section<'_>, key: &str, alias: &str) -> Result<Option<f64>, DescriptionError> {
    match section.number(key)? {
        Some(value) => Ok(Some(value)),
        None => section.number(alias),
    }
}

impl CompressorSection {
    fn parse(compressor: Section<'_>, main: Section<'_>) -> Result<Self, DescriptionError> {
        let stage_count = (0..MAX_STAGES)
            .filter(|s| compressor.contains(&format!("Power{s}")))
            .max()
            .map_or(1, |s| s + 1);

        let stages = (0..stage_count)
            .map(|s| -> Result<CompressorStage, DescriptionError> {
                Ok(CompressorStage {
                    index: s,
                    altitude: compressor.number(&format!("Altitude{s}"))?,
                    power: compressor.number(&format!("Power{s}"))?,
                    deck_altitude: main.number(&format!("Deck_Altitude{s}"))?,
                    deck_power: main.number(&format!("Power{s}"))?,
                    old_altitude: compressor.number(&format!("Old_Altitude{s}"))?,
                    old_power_new_rpm: compressor.number(&format!("Old_Power_new_RPM{s}"))?,
                    const_rpm_altitude: compressor.number(&format!("AltitudeConstRPM{s}"))?,
                    const_rpm_power: compressor.number(&format!("PowerConstRPM{s}"))?,
                    const_rpm_curvature: compressor
                        .number(&format!("PowerConstRPMCurvature{s}"))?,
                    ceiling: compressor.number(&format!("Ceiling{s}"))?,
                    power_at_ceiling: compressor.number(&format!("PowerAtCeiling{s}"))?,
                    afterburner_pressure_boost: compressor
                        .number(&format!("AfterburnerPressureBoost{s}"))?,
                    afterburner_boost_mul: compressor
                        .number(&format!("AfterburnerBoostMul{s}"))?,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            exact_altitudes: compressor.flag("ExactAltitudes")?.unwrap_or(false),
            speed_manifold_multiplier: compressor.number("SpeedManifoldMultiplier")?,
            stages,
        })
    }
}

impl ThrustMaxSection {
    fn parse(table: Section<'_>) -> Result<Self, DescriptionError> {
        let breakpoints = |prefix: &str| -> Result<Vec<(usize, f64)>, DescriptionError> {
            let mut points = Vec::new();
            for (index, key) in table.indexed_keys(prefix) {
                if let Some(value) = table.number(key)? {
                    points.push((index, value));
                }
            }
            Ok(points)
        };

        let mut section = Self {
            base: table.number("ThrustMax0")?,
            altitudes: breakpoints("Altitude_")?,
            velocities: breakpoints("Velocity_")?,
            ..Self::default()
        };

        for key in table.map.keys() {
            let (target, rest) = if let Some(rest) = key.strip_prefix("ThrustMaxCoeff_") {
                (&mut section.thrust_coeffs, rest)
            } else if let Some(rest) = key.strip_prefix("TorqueMaxCoeff_") {
                (&mut section.torque_coeffs, rest)
            } else if let Some(rest) = key.strip_prefix("ThrAftMaxCoeff_") {
                (&mut section.afterburner_coeffs, rest)
            } else {
                continue;
            };

            let Some(cell) = parse_cell(rest) else {
                continue;
            };
            if let Some(value) = table.number(key)? {
                target.insert(cell, value);
            }
        }

        Ok(section)
    }
}

fn parse_cell(suffix: &str) -> Option<(usize, usize)> {
    let (alt, vel) = suffix.split_once('_')?;
    Some((alt.parse().ok()?, vel.parse().ok()?))
}
