use powercurve_atmos::{Atmosphere, DEFAULT_START_ALTITUDE, DEFAULT_TOLERANCE};

use crate::description::MainSection;

use super::stage::Stage;

/// Engine-wide inputs to the WEP transform, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WepParams {
    pub military_manifold_pressure: f64,
    pub wep_manifold_pressure: f64,
    pub octane_manifold_pressure: f64,
    pub octane_afterburner_mult: f64,
    pub military_rpm: Option<f64>,
    pub wep_rpm: Option<f64>,
    pub rpm_effect: f64,
    pub afterburner_boost: f64,
    pub throttle_boost: f64,
}

impl Default for WepParams {
    fn default() -> Self {
        Self {
            military_manifold_pressure: 1.0,
            wep_manifold_pressure: 1.0,
            octane_manifold_pressure: 1.0,
            octane_afterburner_mult: 1.0,
            military_rpm: None,
            wep_rpm: None,
            rpm_effect: 1.0,
            afterburner_boost: 1.0,
            throttle_boost: 1.0,
        }
    }
}

impl WepParams {
    pub(crate) fn from_main(main: &MainSection) -> Self {
        let defaults = Self::default();
        Self {
            military_manifold_pressure: main
                .military_manifold_pressure
                .unwrap_or(defaults.military_manifold_pressure),
            wep_manifold_pressure: main
                .wep_manifold_pressure
                .unwrap_or(defaults.wep_manifold_pressure),
            octane_manifold_pressure: main
                .octane_manifold_pressure
                .unwrap_or(defaults.octane_manifold_pressure),
            military_rpm: main.military_rpm,
            wep_rpm: main.wep_rpm,
            rpm_effect: main
                .wep_rpm_effect_on_supercharger
                .unwrap_or(defaults.rpm_effect),
            afterburner_boost: main.afterburner_boost.unwrap_or(defaults.afterburner_boost),
            throttle_boost: main.throttle_boost.unwrap_or(defaults.throttle_boost),
            ..defaults
        }
    }
}

/// Where a stage's WEP curve starts, peaks and bends, and how much power
/// it adds over military.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WepSetup {
    pub deck_altitude: f64,
    pub crit_altitude: f64,
    /// Constant-RPM breakpoint under WEP, for stages without exact altitudes.
    pub const_rpm_altitude: Option<f64>,
    pub power_mult: f64,
}

impl WepSetup {
    /// Shifts the stage's breakpoints to the altitudes where the higher WEP
    /// manifold pressure is still reachable.
    ///
    /// Supercharger strength at an altitude is the military manifold
    /// pressure over the static pressure there, scaled by the RPM effect
    /// and the stage's pressure boost. A stage with a zero boost
    /// multiplier keeps its military breakpoints and gains no power.
    #[allow(clippy::float_cmp)]
    pub(crate) fn new(params: &WepParams, stage: &Stage, octane: bool, atmosphere: &Atmosphere) -> Self {
        if stage.afterburner_boost_mul == 0.0 {
            return Self {
                deck_altitude: 0.0,
                crit_altitude: stage.altitude,
                const_rpm_altitude: None,
                power_mult: 1.0,
            };
        }

        let sea_level = atmosphere.sea_level().pressure();
        let boost = params.rpm_effect * stage.afterburner_pressure_boost;
        let strength = |altitude: f64| {
            params.military_manifold_pressure * sea_level / atmosphere.pressure(altitude) * boost
        };

        let octane = octane && params.octane_manifold_pressure != 1.0;
        let manifold_pressure = if octane {
            params.octane_manifold_pressure
        } else {
            params.wep_manifold_pressure
        };
        let altitude_for = |strength: f64| {
            atmosphere.altitude_from_pressure(
                manifold_pressure * sea_level / strength,
                DEFAULT_TOLERANCE,
                DEFAULT_START_ALTITUDE,
            )
        };

        let const_rpm_altitude = if stage.exact_altitudes {
            None
        } else {
            stage
                .const_rpm
                .map(|const_rpm| altitude_for(strength(const_rpm.altitude)))
        };

        let afterburner_boost = 1.0 + (params.afterburner_boost - 1.0) * params.octane_afterburner_mult;

        Self {
            deck_altitude: altitude_for(strength(stage.deck_altitude)).round(),
            crit_altitude: altitude_for(strength(stage.altitude)).round(),
            const_rpm_altitude,
            power_mult: afterburner_boost
                * params.throttle_boost
                * stage.afterburner_boost_mul
                * torque_ratio(params.military_rpm, params.wep_rpm),
        }
    }
}

/// Relative torque at `wep_rpm` over `military_rpm`.
///
/// Uses a parabolic torque model peaking at three quarters of the higher
/// RPM. Returns 1 when either RPM is missing or the ratio is not a finite
/// positive number.
pub(crate) fn torque_ratio(military_rpm: Option<f64>, wep_rpm: Option<f64>) -> f64 {
    let (Some(low), Some(high)) = (military_rpm, wep_rpm) else {
        return 1.0;
    };
    if low <= 0.0 || high <= 0.0 {
        return 1.0;
    }

    let peak = 0.75 * high;
    let output = |rpm: f64| rpm * (2.0 * peak * rpm - rpm * rpm);
    let ratio = output(high) / output(low);

    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::description::CompressorStage;

    fn stage() -> Stage {
        Stage::resolve(
            &CompressorStage {
                altitude: Some(5700.0),
                power: Some(1260.0),
                deck_altitude: Some(0.0),
                deck_power: Some(1280.0),
                ceiling: Some(10_000.0),
                power_at_ceiling: Some(770.0),
                ..CompressorStage::default()
            },
            false,
            false,
        )
    }

    #[test]
    fn torque_ratio_defaults_to_one() {
        assert_relative_eq!(torque_ratio(None, Some(2700.0)), 1.0);
        assert_relative_eq!(torque_ratio(Some(0.0), Some(2700.0)), 1.0);
        assert_relative_eq!(torque_ratio(Some(2700.0), Some(2700.0)), 1.0);
    }

    #[test]
    fn higher_wep_rpm_adds_torque() {
        let ratio = torque_ratio(Some(2600.0), Some(3000.0));
        // 3000 * (4500 * 3000 - 3000^2) / (2600 * (4500 * 2600 - 2600^2))
        assert_relative_eq!(ratio, 13.5e9 / 12.844e9, max_relative = 1e-9);
        assert!(ratio > 1.0);
    }

    #[test]
    fn higher_manifold_pressure_lowers_critical_altitude() {
        let params = WepParams {
            military_manifold_pressure: 1.0,
            wep_manifold_pressure: 1.2,
            afterburner_boost: 1.1,
            ..WepParams::default()
        };
        let setup = WepSetup::new(&params, &stage(), true, &Atmosphere::default());

        assert!(setup.crit_altitude < 5700.0);
        assert!(setup.deck_altitude < 0.0);
        assert_relative_eq!(setup.power_mult, 1.1);
        assert_relative_eq!(setup.crit_altitude, setup.crit_altitude.round());
        assert!(setup.const_rpm_altitude.is_none());
    }

    #[test]
    fn equal_manifold_pressures_keep_breakpoints() {
        let setup = WepSetup::new(&WepParams::default(), &stage(), false, &Atmosphere::default());

        assert_relative_eq!(setup.crit_altitude, 5700.0);
        assert_relative_eq!(setup.deck_altitude, 0.0);
        assert_relative_eq!(setup.power_mult, 1.0);
    }

    #[test]
    fn zero_boost_multiplier_disables_wep() {
        let mut stage = stage();
        stage.afterburner_boost_mul = 0.0;
        let params = WepParams {
            wep_manifold_pressure: 1.3,
            afterburner_boost: 1.2,
            ..WepParams::default()
        };

        let setup = WepSetup::new(&params, &stage, false, &Atmosphere::default());
        assert_relative_eq!(setup.crit_altitude, 5700.0);
        assert_relative_eq!(setup.deck_altitude, 0.0);
        assert_relative_eq!(setup.power_mult, 1.0);
    }
}
