//! Per-aircraft results: engines combined, normalized and converted.
//!
//! [`aggregate`] picks the engines that can answer the requested
//! [`Metric`], samples them over the request's grid and expresses the result
//! in the request's units. Per-weight metrics divide by the aircraft's total
//! mass, scaling each curve by the number of physical engines it stands for.

mod error;
mod request;
mod units;

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use powercurve_atmos::Atmosphere;
use tracing::{debug, warn};

pub use error::AggregateError;
pub use request::{Metric, Request};
pub use units::{AltitudeUnit, PowerUnit, SpeedUnit, TemperatureUnit, ThrustUnit, WeightUnit};

use crate::{
    ThrottleMode,
    curve::build_curves,
    description::{EngineEntry, EngineKind, FlightModel},
    sampler::{ResponseMatrix, pressure_matrix, power_matrices},
    thrust::{thrust_matrices, turboprop_power_matrices},
};

/// Throttle preference used by [`compare`] when no modes are given.
const DEFAULT_COMPARE_MODES: [ThrottleMode; 2] = [ThrottleMode::Wep, ThrottleMode::Military];

/// The output of one aircraft for a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub name: String,
    pub metric: Metric,
    /// One matrix per engine and mode, in output units.
    ///
    /// When engines are summed for a per-weight metric, `engine` numbers
    /// the summed series in mode order instead.
    pub series: Vec<ResponseMatrix>,
    /// Whether `series` reports distinct engines separately.
    pub distinct_engines: bool,
    /// Speed axis in the request's speed unit.
    pub speeds: Array1<f64>,
    /// Altitude axis in the request's altitude unit.
    pub altitudes: Array1<f64>,
}

/// Difference between two aircraft, first minus second.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub first_mode: ThrottleMode,
    pub second_mode: ThrottleMode,
    /// Values over the shape both aircraft share.
    pub values: Array2<f64>,
}

/// Computes the output of one aircraft.
///
/// # Errors
///
/// Returns an error if the request is invalid or the aircraft has nothing
/// to report for its metric, see [`AggregateError`].
pub fn aggregate(
    name: impl Into<String>,
    model: &FlightModel,
    request: &Request,
) -> Result<Aircraft, AggregateError> {
    request.validate()?;
    let name = name.into();
    let atmosphere = Atmosphere::from(request.sea_level()?);

    let (matrices, engines) = if request.metric.is_thrust() {
        thrust_series(model, request, &atmosphere)?
    } else {
        power_series(model, request, &atmosphere)?
    };
    if matrices.is_empty() {
        return Err(AggregateError::NoMatrices);
    }

    let instances: Vec<usize> = engines.iter().map(|entry| model.instance_count(entry)).collect();
    let distinct_engines = !model.engines_are_same && engines.len() > 1;

    let series: Vec<_> = if request.metric.per_weight() {
        let mass = model
            .mass
            .map(|mass| mass.total(request.fuel_percent))
            .filter(|mass| mass.is_finite() && *mass > 0.0)
            .ok_or(AggregateError::MissingMass)?;
        let mass = request.weight_unit.from_kilograms(mass);
        let per_weight = |value: f64| request.output_value(value / mass);

        if distinct_engines {
            sum_by_mode(&matrices, &instances, request.metric.is_thrust())
                .into_iter()
                .map(|summed| scaled(summed, per_weight))
                .collect()
        } else {
            let total: usize = instances.iter().sum();
            matrices
                .into_iter()
                .map(|matrix| {
                    let count = if model.engines_are_same {
                        total
                    } else {
                        instances.get(matrix.engine).copied().unwrap_or(1)
                    };
                    #[allow(clippy::cast_precision_loss)]
                    let count = count.max(1) as f64;
                    scaled(matrix, |value| per_weight(value * count))
                })
                .collect()
        }
    } else {
        matrices
            .into_iter()
            .map(|matrix| scaled(matrix, |value| request.output_value(value)))
            .collect()
    };

    debug!(aircraft = %name, metric = ?request.metric, series = series.len(), "aggregated");

    Ok(Aircraft {
        name,
        metric: request.metric,
        distinct_engines: distinct_engines && !request.metric.per_weight(),
        series,
        speeds: request.speed_axis(),
        altitudes: request.altitude_axis(),
    })
}

/// Computes several aircraft, skipping those with nothing to report.
pub fn aggregate_all<'a, I>(aircraft: I, request: &Request) -> Vec<Aircraft>
where
    I: IntoIterator<Item = (&'a str, &'a FlightModel)>,
{
    aircraft
        .into_iter()
        .filter_map(|(name, model)| match aggregate(name, model, request) {
            Ok(result) => Some(result),
            Err(error) => {
                warn!(aircraft = name, %error, "aircraft skipped");
                None
            }
        })
        .collect()
}

/// Subtracts the first-engine series of `second` from that of `first`.
///
/// Each aircraft picks its series by mode preference: the first follows
/// `modes` (WEP then military when empty), the second swaps the first two
/// entries so that two requested modes compare against each other. The
/// difference covers the shape both matrices share.
#[must_use]
pub fn compare(first: &Aircraft, second: &Aircraft, modes: &[ThrottleMode]) -> Option<Comparison> {
    let first_preference: Vec<ThrottleMode> = if modes.is_empty() {
        DEFAULT_COMPARE_MODES.to_vec()
    } else {
        modes.to_vec()
    };
    let second_preference = if modes.len() > 1 {
        vec![modes[1], modes[0]]
    } else {
        first_preference.clone()
    };

    let a = first_engine_series(&first.series, &first_preference)?;
    let b = first_engine_series(&second.series, &second_preference)?;

    let (a_rows, a_columns) = a.values.dim();
    let (b_rows, b_columns) = b.values.dim();
    let shape = (a_rows.min(b_rows), a_columns.min(b_columns));

    Some(Comparison {
        first_mode: a.mode,
        second_mode: b.mode,
        values: Array2::from_shape_fn(shape, |cell| a.values[cell] - b.values[cell]),
    })
}

type Sampled<'a> = (Vec<ResponseMatrix>, Vec<&'a EngineEntry>);

/// Piston power from curves, or turboprop power when there are no pistons.
fn power_series<'a>(
    model: &'a FlightModel,
    request: &Request,
    atmosphere: &Atmosphere,
) -> Result<Sampled<'a>, AggregateError> {
    let grid = request.grid();
    let pistons: Vec<&EngineEntry> = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind.is_piston())
        .collect();
    let turboprops: Vec<&EngineEntry> = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind == EngineKind::TurboProp)
        .collect();

    let Some(first) = pistons.first() else {
        if turboprops.is_empty() {
            return Err(AggregateError::NoPowerEngines);
        }
        let matrices = turboprop_power_matrices(model, &grid, atmosphere, &request.modes);
        return Ok((matrices, turboprops));
    };

    let intake_efficiency = first
        .engine
        .compressor
        .as_ref()
        .and_then(|compressor| compressor.speed_manifold_multiplier)
        .filter(|eff| eff.is_finite())
        .ok_or_else(|| AggregateError::InvalidIntakeEfficiency {
            engine: first.key.clone(),
        })?;

    // Curves follow the standard day; only sampling sees the request's air.
    let curves = build_curves(model, &request.modes, request.octane, &Atmosphere::standard());
    let pressures = pressure_matrix(atmosphere, &grid, intake_efficiency);
    Ok((power_matrices(&curves, &pressures), pistons))
}

fn thrust_series<'a>(
    model: &'a FlightModel,
    request: &Request,
    atmosphere: &Atmosphere,
) -> Result<Sampled<'a>, AggregateError> {
    let engines: Vec<&EngineEntry> = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind.is_thrust())
        .collect();
    if engines.is_empty() {
        return Err(AggregateError::NoThrustEngines);
    }

    let include_boosters = request
        .include_boosters
        .unwrap_or_else(|| model.has_integrated_booster());
    let matrices = thrust_matrices(
        model,
        &request.grid(),
        atmosphere,
        &request.modes,
        include_boosters,
    );
    Ok((matrices, engines))
}

/// Sums instance-scaled matrices of all engines per mode.
///
/// Modes keep the order they first appear in. For thrust, an engine without
/// a WEP matrix contributes its military matrix to the WEP sum.
fn sum_by_mode(matrices: &[ResponseMatrix], instances: &[usize], thrust: bool) -> Vec<ResponseMatrix> {
    let Some(template) = matrices.first() else {
        return Vec::new();
    };

    let mut order: Vec<ThrottleMode> = Vec::new();
    let mut by_engine: BTreeMap<usize, BTreeMap<ThrottleMode, &ResponseMatrix>> = BTreeMap::new();
    for matrix in matrices {
        if !order.contains(&matrix.mode) {
            order.push(matrix.mode);
        }
        by_engine
            .entry(matrix.engine)
            .or_default()
            .insert(matrix.mode, matrix);
    }

    order
        .into_iter()
        .enumerate()
        .map(|(index, mode)| {
            let mut values: Array2<f64> = Array2::zeros(template.values.raw_dim());
            let mut unbracketed = 0;
            for (&engine, modes) in &by_engine {
                let source = match modes.get(&mode) {
                    Some(matrix) => matrix,
                    None if thrust && mode == ThrottleMode::Wep => {
                        match modes.get(&ThrottleMode::Military) {
                            Some(matrix) => matrix,
                            None => continue,
                        }
                    }
                    None => continue,
                };
                #[allow(clippy::cast_precision_loss)]
                let count = instances.get(engine).copied().unwrap_or(1).max(1) as f64;
                values.scaled_add(count, &source.values);
                unbracketed += source.unbracketed;
            }
            ResponseMatrix {
                engine: index,
                mode,
                kind: template.kind,
                temperature: None,
                values,
                unbracketed,
            }
        })
        .collect()
}

fn scaled(mut matrix: ResponseMatrix, convert: impl Fn(f64) -> f64) -> ResponseMatrix {
    matrix.values.mapv_inplace(convert);
    matrix
}

/// Engine 0 (or the lowest-numbered engine) in the first preferred mode
/// present, falling back to any mode.
fn first_engine_series<'a>(
    series: &'a [ResponseMatrix],
    preference: &[ThrottleMode],
) -> Option<&'a ResponseMatrix> {
    let lowest = |mode: Option<ThrottleMode>| {
        series
            .iter()
            .filter(|matrix| mode.is_none_or(|mode| matrix.mode == mode))
            .min_by_key(|matrix| matrix.engine)
    };
    preference
        .iter()
        .find_map(|&mode| lowest(Some(mode)))
        .or_else(|| lowest(None))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;
    use crate::sampler::SpeedType;

    fn inline_engine() -> serde_json::Value {
        json!({
            "Main": { "Type": "Inline", "Power0": 1280, "Deck_Altitude0": 0 },
            "Compressor": {
                "SpeedManifoldMultiplier": 0.9,
                "Altitude0": 5700, "Power0": 1260,
                "Ceiling0": 10000, "PowerAtCeiling0": 770
            },
            "Afterburner": { "IsControllable": false }
        })
    }

    fn twin_inline(engines_are_same: bool) -> FlightModel {
        FlightModel::from_value(&json!({
            "engines_are_same": engines_are_same,
            "Engine0": inline_engine(),
            "Engine1": inline_engine(),
            "Mass": { "EmptyMass": 3000, "MaxFuelMass": 400 }
        }))
        .unwrap()
    }

    fn jet(base: f64, modes: serde_json::Value) -> serde_json::Value {
        let mut main = json!({
            "Type": "Jet",
            "ThrustMax": {
                "ThrustMax0": base,
                "Altitude_0": 0, "Altitude_1": 20000,
                "Velocity_0": 0, "Velocity_1": 2000,
                "ThrustMaxCoeff_0_0": 1.0, "ThrustMaxCoeff_0_1": 1.0,
                "ThrustMaxCoeff_1_0": 1.0, "ThrustMaxCoeff_1_1": 1.0
            }
        });
        if let (Some(main), Some(modes)) = (main.as_object_mut(), modes.as_object()) {
            main.extend(modes.clone());
        }
        json!({ "Main": main })
    }

    fn small_request(metric: Metric) -> Request {
        Request {
            metric,
            max_altitude: 1000.0,
            ..Request::default()
        }
    }

    #[test]
    fn power_in_kilowatts() {
        let model = twin_inline(true);
        let hp = aggregate("twin", &model, &small_request(Metric::Power)).unwrap();
        let kw = aggregate(
            "twin",
            &model,
            &Request {
                power_unit: PowerUnit::Kilowatt,
                ..small_request(Metric::Power)
            },
        )
        .unwrap();

        assert_eq!(hp.series.len(), 1);
        assert_eq!(hp.series[0].mode, ThrottleMode::Military);
        assert!(!hp.distinct_engines);
        assert_eq!(hp.series[0].values.dim(), (101, 50));
        assert_relative_eq!(
            kw.series[0].values[[0, 0]],
            hp.series[0].values[[0, 0]] / 1.341_022,
            max_relative = 1e-5
        );
    }

    #[test]
    fn identical_engines_count_every_instance() {
        let model = twin_inline(true);
        let power = aggregate("twin", &model, &small_request(Metric::Power)).unwrap();
        let request = Request {
            fuel_percent: 50.0,
            ..small_request(Metric::PowerPerWeight)
        };
        let per_weight = aggregate("twin", &model, &request).unwrap();

        let raw = power.series[0].values[[10, 20]];
        assert!(raw > 1000.0);
        assert_relative_eq!(
            per_weight.series[0].values[[10, 20]],
            2.0 * raw / 3200.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn weight_unit_divides_by_converted_mass() {
        let model = twin_inline(true);
        let kg = aggregate("twin", &model, &small_request(Metric::PowerPerWeight)).unwrap();
        let lb = aggregate(
            "twin",
            &model,
            &Request {
                weight_unit: WeightUnit::Pound,
                ..small_request(Metric::PowerPerWeight)
            },
        )
        .unwrap();

        assert_relative_eq!(
            lb.series[0].values[[0, 0]],
            kg.series[0].values[[0, 0]] * 0.453_592_37,
            max_relative = 1e-6
        );
    }

    #[test]
    fn distinct_engines_stay_separate_for_power() {
        let model = twin_inline(false);
        let aircraft = aggregate("twin", &model, &small_request(Metric::Power)).unwrap();
        assert!(aircraft.distinct_engines);
        let engines: Vec<usize> = aircraft.series.iter().map(|m| m.engine).collect();
        assert_eq!(engines, vec![0, 1]);
    }

    #[test]
    fn distinct_thrust_engines_are_summed_per_mode() {
        let model = FlightModel::from_value(&json!({
            "Engine0": jet(1000.0, json!({ "Mode0": { "Throttle": 1.0, "ThrustMult": 1.0 } })),
            "Engine1": jet(2000.0, json!({
                "Mode0": { "Throttle": 1.0, "ThrustMult": 1.0 },
                "Mode1": { "Throttle": 1.1, "ThrustMult": 1.2 }
            })),
            "Mass": { "EmptyMass": 1000 }
        }))
        .unwrap();

        let aircraft = aggregate("jets", &model, &small_request(Metric::ThrustPerWeight)).unwrap();

        assert_eq!(aircraft.series.len(), 2);
        let military = &aircraft.series[0];
        assert_eq!((military.engine, military.mode), (0, ThrottleMode::Military));
        assert_relative_eq!(military.values[[0, 0]], 3.0, max_relative = 1e-12);

        // the first jet has no WEP and adds its military thrust
        let wep = &aircraft.series[1];
        assert_eq!((wep.engine, wep.mode), (1, ThrottleMode::Wep));
        assert_relative_eq!(wep.values[[0, 0]], 3.4, max_relative = 1e-12);
    }

    #[test]
    fn integrated_booster_is_included_by_default() {
        let model = FlightModel::from_value(&json!({
            "Engine0": jet(2000.0, json!({ "Mode0": { "Throttle": 1.0, "ThrustMult": 1.0 } })),
            "Engine1": { "Booster": true, "Main": { "Type": "Rocket", "Thrust": 9806.65 } }
        }))
        .unwrap();
        let request = Request {
            modes: vec![ThrottleMode::Military],
            ..small_request(Metric::Thrust)
        };

        let with = aggregate("jet", &model, &request).unwrap();
        assert_eq!(with.series.len(), 2);
        assert_relative_eq!(with.series[1].values[[0, 0]], 1000.0, max_relative = 1e-9);

        let without = aggregate(
            "jet",
            &model,
            &Request {
                include_boosters: Some(false),
                ..request
            },
        )
        .unwrap();
        assert_eq!(without.series.len(), 1);
    }

    #[test]
    fn thrust_in_newtons() {
        let model = FlightModel::from_value(&json!({
            "Engine0": jet(1000.0, json!({ "Mode0": { "Throttle": 1.0, "ThrustMult": 1.0 } }))
        }))
        .unwrap();
        let request = Request {
            thrust_unit: ThrustUnit::Newton,
            ..small_request(Metric::Thrust)
        };

        let aircraft = aggregate("jet", &model, &request).unwrap();
        assert_eq!(aircraft.series[0].values.dim(), (201, 50));
        assert_relative_eq!(aircraft.series[0].values[[0, 0]], 9806.65, max_relative = 1e-9);
    }

    #[test]
    fn reports_missing_data() {
        let model = twin_inline(true);
        assert!(matches!(
            aggregate("twin", &model, &small_request(Metric::Thrust)),
            Err(AggregateError::NoThrustEngines)
        ));

        let no_mass = FlightModel::from_value(&json!({ "Engine0": inline_engine() })).unwrap();
        assert!(matches!(
            aggregate("single", &no_mass, &small_request(Metric::PowerPerWeight)),
            Err(AggregateError::MissingMass)
        ));

        let no_intake = FlightModel::from_value(&json!({
            "Engine0": { "Main": { "Type": "Radial", "Power0": 900 }, "Compressor": { "Power0": 850 } }
        }))
        .unwrap();
        assert!(matches!(
            aggregate("radial", &no_intake, &small_request(Metric::Power)),
            Err(AggregateError::InvalidIntakeEfficiency { .. })
        ));

        let glider = FlightModel::from_value(&json!({})).unwrap();
        assert!(matches!(
            aggregate("glider", &glider, &small_request(Metric::Power)),
            Err(AggregateError::NoPowerEngines)
        ));
    }

    #[test]
    fn aggregate_all_skips_failures() {
        let twin = twin_inline(true);
        let glider = FlightModel::from_value(&json!({})).unwrap();
        let results = aggregate_all([("twin", &twin), ("glider", &glider)], &small_request(Metric::Power));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "twin");
    }

    #[test]
    fn axes_follow_units() {
        let model = twin_inline(true);
        let request = Request {
            speed_type: SpeedType::Ias,
            speed_unit: SpeedUnit::MeterPerSecond,
            ..small_request(Metric::Power)
        };
        let aircraft = aggregate("twin", &model, &request).unwrap();
        assert_eq!(aircraft.speeds.len(), 101);
        assert_relative_eq!(aircraft.speeds[36], 100.0, max_relative = 1e-12);
        assert_relative_eq!(aircraft.altitudes[49], 980.0);
    }

    fn series(engine: usize, mode: ThrottleMode, value: f64, shape: (usize, usize)) -> ResponseMatrix {
        ResponseMatrix {
            engine,
            mode,
            kind: EngineKind::Inline,
            temperature: None,
            values: Array2::from_elem(shape, value),
            unbracketed: 0,
        }
    }

    fn aircraft(name: &str, series: Vec<ResponseMatrix>) -> Aircraft {
        Aircraft {
            name: name.to_owned(),
            metric: Metric::Power,
            series,
            distinct_engines: false,
            speeds: Array1::zeros(0),
            altitudes: Array1::zeros(0),
        }
    }

    #[test]
    fn compare_prefers_wep_and_trims_shape() {
        let first = aircraft(
            "a",
            vec![
                series(0, ThrottleMode::Military, 1000.0, (3, 4)),
                series(0, ThrottleMode::Wep, 1200.0, (3, 4)),
            ],
        );
        let second = aircraft("b", vec![series(0, ThrottleMode::Wep, 1100.0, (2, 5))]);

        let diff = compare(&first, &second, &[]).unwrap();
        assert_eq!((diff.first_mode, diff.second_mode), (ThrottleMode::Wep, ThrottleMode::Wep));
        assert_eq!(diff.values.dim(), (2, 4));
        assert!(diff.values.iter().all(|&v| (v - 100.0).abs() < 1e-12));
    }

    #[test]
    fn compare_swaps_modes_for_the_second_aircraft() {
        let both = vec![
            series(1, ThrottleMode::Military, 500.0, (1, 1)),
            series(0, ThrottleMode::Military, 1000.0, (1, 1)),
            series(0, ThrottleMode::Wep, 1300.0, (1, 1)),
        ];
        let first = aircraft("a", both.clone());
        let second = aircraft("b", both);

        let diff = compare(&first, &second, &[ThrottleMode::Wep, ThrottleMode::Military]).unwrap();
        assert_eq!(diff.first_mode, ThrottleMode::Wep);
        assert_eq!(diff.second_mode, ThrottleMode::Military);
        assert_relative_eq!(diff.values[[0, 0]], 300.0);

        assert!(compare(&first, &aircraft("empty", Vec::new()), &[]).is_none());
    }
}
