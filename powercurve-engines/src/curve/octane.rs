use crate::description::{FuelModifiers, OctaneModifier};

use super::wep::WepParams;

/// Power gain from Soviet high-octane fuel.
pub(crate) const SOVIET_POWER_FACTOR: f64 = 1.018;

/// Applies British fuel modifiers to the WEP parameters.
///
/// 150-octane fuel raises the octane manifold pressure (or, with inverted
/// enable logic, the WEP manifold pressure itself) by the modifier's
/// compressor multiplier and scales the afterburner boost. 100-octane
/// Spitfire fuel only matters with inverted logic.
pub(crate) fn apply_british(params: &mut WepParams, modifiers: &FuelModifiers, octane: bool) {
    params.octane_afterburner_mult = 1.0;

    match (&modifiers.octane_150, &modifiers.octane_100_spitfire) {
        (Some(modifier), _) if !modifier.invert_enable_logic => {
            if octane {
                params.octane_afterburner_mult = modifier.afterburner_mult;
                params.octane_manifold_pressure = boosted_manifold_pressure(params, modifier);
            }
        }
        (Some(modifier), _) => apply_inverted(params, modifier, octane),
        (None, Some(modifier)) if modifier.invert_enable_logic => {
            apply_inverted(params, modifier, octane);
        }
        _ => {}
    }
}

fn apply_inverted(params: &mut WepParams, modifier: &OctaneModifier, octane: bool) {
    params.wep_manifold_pressure = boosted_manifold_pressure(params, modifier);
    params.octane_manifold_pressure = params.wep_manifold_pressure;
    if !octane {
        params.octane_afterburner_mult = modifier.afterburner_mult;
    }
}

fn boosted_manifold_pressure(params: &WepParams, modifier: &OctaneModifier) -> f64 {
    params.military_manifold_pressure
        + (params.wep_manifold_pressure - params.military_manifold_pressure)
            * modifier.afterburner_compressor_mult
}
