//! Tabulated thrust and torque of jets, rockets and turboprops.
//!
//! Jets scale `ThrustMax0` by a coefficient tabulated over altitude and
//! true airspeed; turboprops scale their rated power by the matching torque
//! coefficient. Rockets ignore the table and deliver constant thrust.

use ndarray::{Array1, Array2};
use powercurve_atmos::Atmosphere;
use tracing::{debug, warn};

use crate::{
    ThrottleMode,
    description::{EngineEntry, EngineKind, FlightModel, ThrottleSetting, ThrustMaxSection},
    interpolation::{BilinearTable, Extrapolate, TableError},
    sampler::{Grid, PowerMatrix, ResponseMatrix, ThrustMatrix},
};

/// Kilogram-force per newton.
pub const NEWTON_TO_KGF: f64 = 0.101_971_621_3;

/// Thrust, torque and afterburner coefficients over `(altitude, velocity)`.
///
/// Breakpoints are taken in field-index order and must increase strictly.
/// Points outside the table extrapolate from the nearest edge pair.
#[derive(Debug)]
pub struct ThrustMaxTable {
    thrust: BilinearTable,
    torque: BilinearTable,
    afterburner: BilinearTable,
}

impl ThrustMaxTable {
    /// Builds the table from a parsed `ThrustMax` section.
    ///
    /// Missing thrust coefficients read 0, missing torque coefficients fall
    /// back to the thrust coefficient and missing afterburner coefficients
    /// read 1.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis has fewer than two breakpoints or is
    /// not strictly increasing.
    pub fn new(section: &ThrustMaxSection) -> Result<Self, TableError> {
        let altitudes: Array1<f64> = section.altitudes.iter().map(|&(_, v)| v).collect();
        let velocities: Array1<f64> = section.velocities.iter().map(|&(_, v)| v).collect();
        let shape = (altitudes.len(), velocities.len());
        let cell = |(i, j): (usize, usize)| (section.altitudes[i].0, section.velocities[j].0);

        let thrust = Array2::from_shape_fn(shape, |ij| {
            section.thrust_coeffs.get(&cell(ij)).copied().unwrap_or(0.0)
        });
        let torque = Array2::from_shape_fn(shape, |ij| {
            section
                .torque_coeffs
                .get(&cell(ij))
                .copied()
                .unwrap_or(thrust[ij])
        });
        let afterburner = Array2::from_shape_fn(shape, |ij| {
            section.afterburner_coeffs.get(&cell(ij)).copied().unwrap_or(1.0)
        });

        let table = |values| {
            BilinearTable::new(altitudes.clone(), velocities.clone(), values, Extrapolate::Enable)
        };
        Ok(Self {
            thrust: table(thrust)?,
            torque: table(torque)?,
            afterburner: table(afterburner)?,
        })
    }

    /// Thrust coefficient at an altitude (m) and true airspeed (km/h).
    ///
    /// # Errors
    ///
    /// Propagates interpolation failures.
    pub fn thrust_coeff(&self, altitude: f64, tas_kph: f64) -> Result<f64, TableError> {
        self.thrust.evaluate(altitude, tas_kph)
    }

    /// Torque coefficient at an altitude (m) and true airspeed (km/h).
    ///
    /// # Errors
    ///
    /// Propagates interpolation failures.
    pub fn torque_coeff(&self, altitude: f64, tas_kph: f64) -> Result<f64, TableError> {
        self.torque.evaluate(altitude, tas_kph)
    }

    /// Afterburner coefficient at an altitude (m) and true airspeed (km/h).
    ///
    /// # Errors
    ///
    /// Propagates interpolation failures.
    pub fn afterburner_coeff(&self, altitude: f64, tas_kph: f64) -> Result<f64, TableError> {
        self.afterburner.evaluate(altitude, tas_kph)
    }
}

/// Thrust multipliers of the military and WEP throttle settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeMultipliers {
    pub military: f64,
    pub wep: Option<f64>,
}

impl ModeMultipliers {
    /// Military is the highest throttle not above 1 (the first such entry
    /// on ties); WEP is the largest multiplier among throttles above 1.
    #[must_use]
    pub fn from_settings(settings: &[ThrottleSetting]) -> Self {
        let mut military_throttle = f64::NEG_INFINITY;
        let mut military = 1.0;
        let mut wep: Option<f64> = None;

        for setting in settings {
            if setting.throttle <= 1.0 && setting.throttle > military_throttle {
                military_throttle = setting.throttle;
                military = setting.thrust_mult;
            }
            if setting.throttle > 1.0 && wep.is_none_or(|w| setting.thrust_mult > w) {
                wep = Some(setting.thrust_mult);
            }
        }

        if !military.is_finite() || military <= 0.0 {
            military = 1.0;
        }
        Self { military, wep }
    }
}

/// Thrust (kgf) of every jet and rocket over `grid`.
///
/// Engines are numbered by their position among the thrust engines.
/// Boosters are skipped unless `include_boosters` is set. A booster has no
/// WEP of its own: when WEP is requested it is reported under WEP if some
/// other engine has a WEP setting, and under military otherwise.
#[must_use]
pub fn thrust_matrices(
    model: &FlightModel,
    grid: &Grid,
    atmosphere: &Atmosphere,
    modes: &[ThrottleMode],
    include_boosters: bool,
) -> Vec<ThrustMatrix> {
    let engines: Vec<(&EngineEntry, ModeMultipliers)> = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind.is_thrust())
        .map(|entry| (entry, ModeMultipliers::from_settings(&entry.engine.main.modes)))
        .collect();

    let any_engine_wep = engines
        .iter()
        .any(|(entry, mults)| !entry.engine.is_rocket_booster() && mults.wep.is_some());

    let mut matrices = Vec::new();
    for (index, (entry, mults)) in engines.iter().enumerate() {
        let engine = &entry.engine;
        let booster = engine.is_rocket_booster();
        if booster && !include_boosters {
            debug!(engine = %entry.key, "booster thrust excluded");
            continue;
        }

        let afterburner_boost = engine
            .main
            .afterburner_boost
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(1.0);
        let emitted = emitted_modes(modes, *mults, booster, any_engine_wep);

        if engine.kind == EngineKind::Rocket {
            let Some(base) = engine
                .main
                .thrust
                .map(|newtons| newtons * NEWTON_TO_KGF)
                .filter(|b| b.is_finite() && *b > 0.0)
            else {
                debug!(engine = %entry.key, "rocket without thrust skipped");
                continue;
            };
            for (mode, mult) in emitted {
                let boost = if mode == ThrottleMode::Wep { afterburner_boost } else { 1.0 };
                let value = (base * mult * boost).max(0.0);
                matrices.push(matrix(index, mode, engine.kind, Array2::from_elem(grid.shape(), value)));
            }
            continue;
        }

        let Some((base, table)) = thrust_table(entry) else {
            continue;
        };
        for (mode, mult) in emitted {
            let values = sample(grid, atmosphere, |altitude, tas| {
                let coeff = table.thrust_coeff(altitude, tas)?;
                let afterburner = if mode == ThrottleMode::Wep {
                    table.afterburner_coeff(altitude, tas)? * afterburner_boost
                } else {
                    1.0
                };
                Ok((base * coeff * mult * afterburner).max(0.0))
            });
            match values {
                Ok(values) => matrices.push(matrix(index, mode, engine.kind, values)),
                Err(error) => warn!(engine = %entry.key, %mode, %error, "thrust sampling failed"),
            }
        }
    }
    matrices
}

/// Power of every turboprop over `grid`, from its torque coefficients.
///
/// The same matrix is reported for each requested mode (military when none
/// is requested).
#[must_use]
pub fn turboprop_power_matrices(
    model: &FlightModel,
    grid: &Grid,
    atmosphere: &Atmosphere,
    modes: &[ThrottleMode],
) -> Vec<PowerMatrix> {
    let mut emitted: Vec<ThrottleMode> = ThrottleMode::ALL
        .into_iter()
        .filter(|mode| modes.contains(mode))
        .collect();
    if emitted.is_empty() {
        emitted.push(ThrottleMode::Military);
    }

    let mut matrices = Vec::new();
    let turboprops = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind == EngineKind::TurboProp);

    for (index, entry) in turboprops.enumerate() {
        let main = &entry.engine.main;
        let Some(power) = main
            .power
            .or(main.deck_power)
            .filter(|p| p.is_finite() && *p > 0.0)
        else {
            debug!(engine = %entry.key, "turboprop without rated power skipped");
            continue;
        };
        let Some(section) = &main.thrust_max else {
            continue;
        };
        let table = match ThrustMaxTable::new(section) {
            Ok(table) => table,
            Err(error) => {
                warn!(engine = %entry.key, %error, "invalid ThrustMax table, engine skipped");
                continue;
            }
        };

        let values = sample(grid, atmosphere, |altitude, tas| {
            Ok((power * table.torque_coeff(altitude, tas)?).max(0.0))
        });
        match values {
            Ok(values) => {
                for &mode in &emitted {
                    matrices.push(matrix(index, mode, EngineKind::TurboProp, values.clone()));
                }
            }
            Err(error) => warn!(engine = %entry.key, %error, "torque sampling failed"),
        }
    }
    matrices
}

/// Modes to report for one thrust engine, with their multipliers.
fn emitted_modes(
    requested: &[ThrottleMode],
    mults: ModeMultipliers,
    booster: bool,
    any_engine_wep: bool,
) -> Vec<(ThrottleMode, f64)> {
    let wants_military = requested.contains(&ThrottleMode::Military);
    let wants_wep = requested.contains(&ThrottleMode::Wep);

    let mut emitted: Vec<(ThrottleMode, f64)> = Vec::with_capacity(2);
    let mut push = |mode: ThrottleMode, mult: f64| {
        if !emitted.iter().any(|&(m, _)| m == mode) {
            emitted.push((mode, mult));
        }
    };

    if wants_military || (wants_wep && mults.wep.is_none() && !booster) {
        push(ThrottleMode::Military, mults.military);
    }
    match mults.wep {
        Some(wep) if wants_wep => push(ThrottleMode::Wep, wep),
        None if wants_wep && booster => {
            let mode = if any_engine_wep {
                ThrottleMode::Wep
            } else {
                ThrottleMode::Military
            };
            push(mode, mults.military);
        }
        _ => {}
    }
    emitted
}

fn thrust_table(entry: &EngineEntry) -> Option<(f64, ThrustMaxTable)> {
    let section = entry.engine.main.thrust_max.as_ref()?;
    let base = section.base.filter(|b| b.is_finite() && *b > 0.0)?;
    match ThrustMaxTable::new(section) {
        Ok(table) => Some((base, table)),
        Err(error) => {
            warn!(engine = %entry.key, %error, "invalid ThrustMax table, engine skipped");
            None
        }
    }
}

fn sample(
    grid: &Grid,
    atmosphere: &Atmosphere,
    value_at: impl Fn(f64, f64) -> Result<f64, TableError>,
) -> Result<Array2<f64>, TableError> {
    let mut values = Array2::zeros(grid.shape());
    for ((row, column), value) in values.indexed_iter_mut() {
        let tas = grid.true_airspeed(atmosphere, row, column);
        *value = value_at(grid.altitude(column), tas)?;
    }
    Ok(values)
}

fn matrix(engine: usize, mode: ThrottleMode, kind: EngineKind, values: Array2<f64>) -> ResponseMatrix {
    ResponseMatrix {
        engine,
        mode,
        kind,
        temperature: None,
        values,
        unbracketed: 0,
    }
}
