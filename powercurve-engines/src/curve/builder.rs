use powercurve_atmos::Atmosphere;
use tracing::{debug, trace};

use crate::{
    ThrottleMode,
    description::{EngineEntry, EngineKind, FlightModel, FuelModifiers},
};

use super::{
    Curve, PowerInterval, octane,
    region::{Regions, Segment},
    stage::Stage,
    wep::{WepParams, WepSetup},
};

/// Altitude the first segment is looked up at, well below any deck.
const START_ALTITUDE: f64 = -4000.0;

/// Segments collected per curve before giving up on a repeated pressure.
const MAX_SEGMENTS: usize = 6;

/// Power curves of one engine, per supercharger stage and throttle mode.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCurves {
    pub key: String,
    /// Position among the aircraft's piston engines.
    pub index: usize,
    pub kind: EngineKind,
    /// Modes the curves were built for, in request order.
    pub modes: Vec<ThrottleMode>,
    stages: Vec<Vec<Curve>>,
}

impl EngineCurves {
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn curve(&self, stage: usize, mode: ThrottleMode) -> Option<&Curve> {
        let slot = self.modes.iter().position(|&m| m == mode)?;
        self.stages.get(stage)?.get(slot)
    }

    /// Curves of every stage for one mode, in stage order.
    pub fn curves(&self, mode: ThrottleMode) -> impl Iterator<Item = &Curve> {
        let slot = self.modes.iter().position(|&m| m == mode);
        self.stages
            .iter()
            .filter_map(move |curves| slot.and_then(|slot| curves.get(slot)))
    }
}

/// Builds curves for the piston engines of an aircraft.
///
/// Identical engines (or a single one) share one set of curves built from
/// the first engine; otherwise every engine gets its own.
#[must_use]
pub fn build_curves(
    model: &FlightModel,
    modes: &[ThrottleMode],
    octane: bool,
    atmosphere: &Atmosphere,
) -> Vec<EngineCurves> {
    let pistons: Vec<&EngineEntry> = model
        .engines
        .iter()
        .filter(|entry| entry.engine.kind.is_piston())
        .collect();

    let count = if model.engines_are_same || pistons.len() <= 1 {
        pistons.len().min(1)
    } else {
        pistons.len()
    };

    pistons
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(index, entry)| {
            let mut curves =
                build_engine_curves(entry, &model.modifiers, modes, octane, atmosphere);
            curves.index = index;
            curves
        })
        .collect()
}

/// Builds curves for one engine.
///
/// Engines without a controllable afterburner only get a military curve.
/// `octane` enables the octane manifold pressure and fuel modifiers.
#[must_use]
pub fn build_engine_curves(
    entry: &EngineEntry,
    modifiers: &FuelModifiers,
    modes: &[ThrottleMode],
    octane: bool,
    atmosphere: &Atmosphere,
) -> EngineCurves {
    let engine = &entry.engine;
    let modes = effective_modes(engine.afterburner_controllable, modes);

    let mut params = WepParams::from_main(&engine.main);
    octane::apply_british(&mut params, modifiers, octane);

    let stages = engine
        .compressor
        .as_ref()
        .map(|compressor| {
            compressor
                .stages
                .iter()
                .map(|raw| {
                    let stage = Stage::resolve(
                        raw,
                        compressor.exact_altitudes,
                        modifiers.soviet_high_octane,
                    );
                    let wep = modes
                        .contains(&ThrottleMode::Wep)
                        .then(|| WepSetup::new(&params, &stage, octane, atmosphere));
                    modes
                        .iter()
                        .map(|&mode| build_stage_curve(&stage, wep.as_ref(), mode, atmosphere))
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default();

    let curves = EngineCurves {
        key: entry.key.clone(),
        index: 0,
        kind: engine.kind,
        modes,
        stages,
    };
    debug!(
        engine = %curves.key,
        stages = curves.stage_count(),
        modes = ?curves.modes,
        "built power curves"
    );
    curves
}

fn effective_modes(afterburner_controllable: bool, requested: &[ThrottleMode]) -> Vec<ThrottleMode> {
    if !afterburner_controllable {
        return vec![ThrottleMode::Military];
    }
    let mut modes = Vec::with_capacity(requested.len());
    for &mode in requested {
        if !modes.contains(&mode) {
            modes.push(mode);
        }
    }
    modes
}

/// Walks the regions of a stage upward from below the deck.
///
/// Each step records the lower bound of the current segment and jumps just
/// past its upper bound. A step landing on the pressure it just recorded
/// means the top region repeats; its upper bound closes the curve with zero
/// curvature.
#[allow(clippy::float_cmp)]
fn build_stage_curve(
    stage: &Stage,
    wep: Option<&WepSetup>,
    mode: ThrottleMode,
    atmosphere: &Atmosphere,
) -> Curve {
    let regions = Regions::new(stage, atmosphere);
    let segment_at = |h: f64| -> Segment {
        match (mode, wep) {
            (ThrottleMode::Wep, Some(setup)) => regions.wep(setup, h),
            _ => regions.military(h),
        }
    };
    let rounded_pressure = |h: f64| atmosphere.pressure(h).round();

    let mut intervals = Vec::with_capacity(MAX_SEGMENTS + 1);
    let mut segment = segment_at(START_ALTITUDE);

    for _ in 0..MAX_SEGMENTS {
        let pressure = rounded_pressure(segment.lower_altitude);
        intervals.push(PowerInterval {
            pressure,
            power: segment.lower_power,
            curvature: segment.curvature,
        });

        segment = segment_at(segment.higher_altitude + 1.0);

        if rounded_pressure(segment.lower_altitude) == pressure {
            intervals.push(PowerInterval {
                pressure: rounded_pressure(segment.higher_altitude),
                power: segment.higher_power,
                curvature: 0.0,
            });
            trace!(%mode, intervals = intervals.len(), "curve closed on repeated pressure");
            return Curve::new(intervals, true);
        }
    }

    Curve::new(intervals, false)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::description::CompressorStage;

    fn single_stage() -> CompressorStage {
        CompressorStage {
            altitude: Some(5700.0),
            power: Some(1260.0),
            deck_altitude: Some(0.0),
            deck_power: Some(1280.0),
            ceiling: Some(10_000.0),
            power_at_ceiling: Some(770.0),
            ..CompressorStage::default()
        }
    }

    fn wep_setup(stage: &Stage, atmosphere: &Atmosphere) -> WepSetup {
        let params = WepParams {
            wep_manifold_pressure: 1.2,
            afterburner_boost: 1.2,
            ..WepParams::default()
        };
        WepSetup::new(&params, stage, false, atmosphere)
    }

    #[test]
    fn single_stage_military_curve() {
        let atmosphere = Atmosphere::default();
        let stage = Stage::resolve(&single_stage(), false, false);

        let curve = build_stage_curve(&stage, None, ThrottleMode::Military, &atmosphere);
        let intervals = curve.intervals();

        assert!(curve.terminated_early());
        assert_eq!(intervals.len(), 3);
        assert_eq!(
            intervals[0],
            PowerInterval {
                pressure: 101_300.0,
                power: 1280.0,
                curvature: 1.0
            }
        );
        assert_relative_eq!(intervals[1].pressure, atmosphere.pressure(5700.0).round());
        assert_relative_eq!(intervals[1].power, 1260.0);
        assert_relative_eq!(intervals[1].curvature, 1.0);
        assert_relative_eq!(intervals[2].pressure, atmosphere.pressure(10_000.0).round());
        assert_relative_eq!(intervals[2].power, 770.0);
        assert_relative_eq!(intervals[2].curvature, 0.0);

        let at = |h: f64| curve.power_for_pressure(atmosphere.pressure(h)).unwrap();
        assert_relative_eq!(at(0.0), 1280.0, epsilon = 0.5);
        assert_relative_eq!(at(5700.0), 1260.0, epsilon = 0.5);
        assert_relative_eq!(at(10_000.0), 770.0, epsilon = 0.5);
    }

    #[test]
    fn pressures_decrease_along_the_curve() {
        let atmosphere = Atmosphere::default();
        let raw = CompressorStage {
            const_rpm_altitude: Some(2500.0),
            const_rpm_power: Some(1320.0),
            const_rpm_curvature: Some(1.2),
            old_altitude: Some(6200.0),
            old_power_new_rpm: Some(1240.0),
            ..single_stage()
        };

        for exact in [false, true] {
            let stage = Stage::resolve(&raw, exact, false);
            let setup = wep_setup(&stage, &atmosphere);
            for mode in ThrottleMode::ALL {
                let curve = build_stage_curve(&stage, Some(&setup), mode, &atmosphere);
                let intervals = curve.intervals();
                assert!(intervals.len() >= 2);
                let last = if curve.terminated_early() {
                    intervals.len() - 1
                } else {
                    intervals.len()
                };
                for pair in intervals[..last].windows(2) {
                    assert!(
                        pair[0].pressure > pair[1].pressure,
                        "{mode} exact={exact}: {intervals:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn wep_is_not_weaker_than_military() {
        let atmosphere = Atmosphere::default();
        let stage = Stage::resolve(&single_stage(), false, false);
        let setup = wep_setup(&stage, &atmosphere);

        let military = build_stage_curve(&stage, Some(&setup), ThrottleMode::Military, &atmosphere);
        let wep = build_stage_curve(&stage, Some(&setup), ThrottleMode::Wep, &atmosphere);

        for h in (0..=10_000).step_by(250) {
            let p = atmosphere.pressure(f64::from(h));
            let military = military.power_for_pressure(p).unwrap();
            let wep = wep.power_for_pressure(p).unwrap();
            assert!(wep >= military - 1e-9, "h={h}: wep {wep} < military {military}");
        }
    }

    #[test]
    fn uncontrollable_afterburner_gets_military_only() {
        assert_eq!(
            effective_modes(false, &[ThrottleMode::Wep]),
            vec![ThrottleMode::Military]
        );
        assert_eq!(
            effective_modes(true, &[ThrottleMode::Wep, ThrottleMode::Military, ThrottleMode::Wep]),
            vec![ThrottleMode::Wep, ThrottleMode::Military]
        );
    }
}
