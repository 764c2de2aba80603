//! Sampling engine output over a speed × altitude grid.
//!
//! Matrices are indexed `[[speed, altitude]]`: row `i` is the airspeed
//! `i * speed_step_kph`, column `j` the altitude `j * altitude_step_m`.

use ndarray::{Array1, Array2};
use powercurve_atmos::{Atmosphere, AtmosphereError, STANDARD_PRESSURE, SeaLevel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    ThrottleMode,
    curve::{Curve, CurveError, EngineCurves},
    description::EngineKind,
};

/// Sea-level temperatures (K) of the default temperature sweep.
pub const DEFAULT_SWEEP_TEMPERATURES: [f64; 3] = [273.0, 283.0, 293.0];

/// How the speed axis of a grid is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedType {
    /// True airspeed.
    #[default]
    #[serde(rename = "TAS")]
    Tas,
    /// Indicated airspeed, converted to true airspeed per altitude.
    #[serde(rename = "IAS")]
    Ias,
}

/// Speed and altitude axes of a sampled matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub altitude_count: usize,
    pub speed_count: usize,
    pub altitude_step_m: f64,
    pub speed_step_kph: f64,
    pub speed_type: SpeedType,
}

impl Default for Grid {
    fn default() -> Self {
        Self::for_ranges(10_000.0, 1000.0, SpeedType::Tas)
    }
}

impl Grid {
    /// Grid covering `0..=max_speed_kph` in 10 km/h steps and
    /// `0..max_altitude_m` in 20 m steps.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "negative or non-finite ranges saturate to an empty axis"
    )]
    pub fn for_ranges(max_altitude_m: f64, max_speed_kph: f64, speed_type: SpeedType) -> Self {
        let altitude_step_m = 20.0;
        let speed_step_kph = 10.0;
        Self {
            altitude_count: (max_altitude_m / altitude_step_m).round().max(0.0) as usize,
            speed_count: ((max_speed_kph / speed_step_kph).floor() + 1.0).max(0.0) as usize,
            altitude_step_m,
            speed_step_kph,
            speed_type,
        }
    }

    /// Checks that both steps are finite and positive.
    ///
    /// # Errors
    ///
    /// Returns a static reason naming the offending step.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.altitude_step_m.is_finite() || self.altitude_step_m <= 0.0 {
            return Err("altitude_step_m must be finite and positive");
        }
        if !self.speed_step_kph.is_finite() || self.speed_step_kph <= 0.0 {
            return Err("speed_step_kph must be finite and positive");
        }
        Ok(())
    }

    /// Matrix shape, `(speed_count, altitude_count)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.speed_count, self.altitude_count)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn altitude(&self, column: usize) -> f64 {
        column as f64 * self.altitude_step_m
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn speed(&self, row: usize) -> f64 {
        row as f64 * self.speed_step_kph
    }

    /// True airspeed (km/h) of a cell.
    #[must_use]
    pub fn true_airspeed(&self, atmosphere: &Atmosphere, row: usize, column: usize) -> f64 {
        let speed = self.speed(row);
        match self.speed_type {
            SpeedType::Tas => speed,
            SpeedType::Ias => atmosphere.tas_from_ias(speed, self.altitude(column)),
        }
    }

    /// Altitude axis as an array.
    #[must_use]
    pub fn altitudes(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.altitude_count, |column| self.altitude(column))
    }

    /// Speed axis as an array.
    #[must_use]
    pub fn speeds(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.speed_count, |row| self.speed(row))
    }
}

/// One engine's output over a grid in one throttle mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMatrix {
    /// Engine position within its group (pistons, turboprops or thrust
    /// engines).
    pub engine: usize,
    pub mode: ThrottleMode,
    pub kind: EngineKind,
    /// Sea-level temperature (K) of a temperature sweep entry.
    pub temperature: Option<f64>,
    /// Values indexed `[[speed, altitude]]`.
    pub values: Array2<f64>,
    /// Cells whose pressure no curve interval bracketed; they read 0.
    pub unbracketed: usize,
}

/// Power matrix of a piston or turboprop engine.
pub type PowerMatrix = ResponseMatrix;

/// Thrust matrix (kgf) of a jet or rocket.
pub type ThrustMatrix = ResponseMatrix;

/// Total intake pressure at every cell of `grid`.
///
/// Static pressure plus the dynamic pressure recovered by the intake,
/// `½·ρ(h)·v²·intake_efficiency`.
#[must_use]
pub fn pressure_matrix(atmosphere: &Atmosphere, grid: &Grid, intake_efficiency: f64) -> Array2<f64> {
    let statics: Vec<(f64, f64)> = (0..grid.altitude_count)
        .map(|column| {
            let h = grid.altitude(column);
            (atmosphere.pressure(h), atmosphere.density(h))
        })
        .collect();

    Array2::from_shape_fn(grid.shape(), |(row, column)| {
        let (pressure, density) = statics[column];
        let v = grid.true_airspeed(atmosphere, row, column) / 3.6;
        pressure + density * v * v / 2.0 * intake_efficiency
    })
}

/// Total intake pressure at one true airspeed, for `altitude_count`
/// altitudes 20 m apart.
#[must_use]
pub fn pressure_column(
    atmosphere: &Atmosphere,
    intake_efficiency: f64,
    speed_kph: f64,
    altitude_count: usize,
) -> Array1<f64> {
    let grid = Grid {
        altitude_count,
        ..Grid::default()
    };
    Array1::from_shape_fn(altitude_count, |column| {
        let h = grid.altitude(column);
        atmosphere.pressure(h) + atmosphere.ram_pressure(h, speed_kph, intake_efficiency)
    })
}

/// Samples every engine's curves over a pressure matrix.
///
/// Each cell takes the best stage, so a multi-speed supercharger shifts
/// gear automatically. One matrix is produced per engine and mode.
#[must_use]
pub fn power_matrices(engines: &[EngineCurves], pressures: &Array2<f64>) -> Vec<PowerMatrix> {
    engines
        .iter()
        .flat_map(|engine| {
            engine.modes.iter().map(move |&mode| {
                let curves: Vec<&Curve> = engine.curves(mode).filter(|c| c.len() >= 2).collect();
                let mut unbracketed = 0;
                let values = pressures.mapv(|pressure| {
                    curves.iter().fold(0.0_f64, |best, curve| {
                        match curve.power_for_pressure(pressure) {
                            Ok(power) => best.max(power),
                            Err(CurveError::Unbracketed { .. } | CurveError::TooFewIntervals { .. }) => {
                                unbracketed += 1;
                                best
                            }
                        }
                    })
                });

                if unbracketed > 0 {
                    warn!(
                        engine = %engine.key,
                        %mode,
                        cells = unbracketed,
                        "pressures outside every curve interval, sampled as 0"
                    );
                }

                ResponseMatrix {
                    engine: engine.index,
                    mode,
                    kind: engine.kind,
                    temperature: None,
                    values,
                    unbracketed,
                }
            })
        })
        .collect()
}

/// Samples the curves at several sea-level temperatures in parallel.
///
/// Every temperature gets its own standard-pressure atmosphere; each
/// resulting matrix is tagged with its temperature.
///
/// # Errors
///
/// Returns an error if a temperature is not finite and positive.
pub fn temperature_sweep(
    engines: &[EngineCurves],
    grid: &Grid,
    intake_efficiency: f64,
    temperatures: &[f64],
) -> Result<Vec<PowerMatrix>, AtmosphereError> {
    let sweep = temperatures
        .par_iter()
        .map(|&temperature| {
            let atmosphere = Atmosphere::from(SeaLevel::new(STANDARD_PRESSURE, temperature)?);
            let pressures = pressure_matrix(&atmosphere, grid, intake_efficiency);
            let mut matrices = power_matrices(engines, &pressures);
            for matrix in &mut matrices {
                matrix.temperature = Some(temperature);
            }
            debug!(temperature, matrices = matrices.len(), "sampled temperature");
            Ok(matrices)
        })
        .collect::<Result<Vec<_>, AtmosphereError>>()?;

    Ok(sweep.into_iter().flatten().collect())
}
