use crate::description::CompressorStage;

use super::octane::SOVIET_POWER_FACTOR;

/// Breakpoint where the engine stops gaining RPM with altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConstRpm {
    pub altitude: f64,
    pub power: f64,
    pub curvature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ceiling {
    pub altitude: f64,
    pub power: f64,
}

/// A compressor stage with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stage {
    pub altitude: f64,
    pub power: f64,
    pub deck_altitude: f64,
    pub deck_power: f64,
    pub old_altitude: f64,
    pub old_power_new_rpm: f64,
    pub const_rpm: Option<ConstRpm>,
    pub ceiling: Option<Ceiling>,
    pub exact_altitudes: bool,
    pub afterburner_pressure_boost: f64,
    pub afterburner_boost_mul: f64,
}

impl Stage {
    /// Resolves a raw stage.
    ///
    /// With `soviet_fuel` the critical, constant-RPM and (useful) ceiling
    /// powers gain 1.8 %. Defaults that copy the critical power see the
    /// boosted value; an explicit deck power is left alone.
    pub(crate) fn resolve(raw: &CompressorStage, exact_altitudes: bool, soviet_fuel: bool) -> Self {
        let boost = if soviet_fuel { SOVIET_POWER_FACTOR } else { 1.0 };

        let altitude = raw.altitude.unwrap_or(0.0);
        let power = raw.power.unwrap_or(0.0) * boost;

        let const_rpm = match (raw.const_rpm_altitude, raw.const_rpm_power) {
            (Some(altitude), Some(power)) => Some(ConstRpm {
                altitude,
                power: power * boost,
                curvature: raw.const_rpm_curvature.unwrap_or(1.0),
            }),
            _ => None,
        };

        let ceiling = match (raw.ceiling, raw.power_at_ceiling) {
            (Some(ceiling_altitude), Some(ceiling_power)) => {
                let useful = is_useful_ceiling(ceiling_altitude, ceiling_power, altitude, power);
                Some(Ceiling {
                    altitude: ceiling_altitude,
                    power: if useful { ceiling_power * boost } else { ceiling_power },
                })
            }
            _ => None,
        };

        Self {
            altitude,
            power,
            deck_altitude: raw.deck_altitude.unwrap_or(0.0),
            deck_power: raw.deck_power.unwrap_or(power),
            old_altitude: raw.old_altitude.unwrap_or(altitude),
            old_power_new_rpm: raw.old_power_new_rpm.unwrap_or(power),
            const_rpm,
            ceiling,
            exact_altitudes,
            afterburner_pressure_boost: raw.afterburner_pressure_boost.unwrap_or(1.0),
            afterburner_boost_mul: raw.afterburner_boost_mul.unwrap_or(1.0),
        }
    }

    /// The ceiling, if it lies far enough above and below the critical point
    /// to shape the curve.
    pub(crate) fn useful_ceiling(&self) -> Option<Ceiling> {
        self.ceiling
            .filter(|c| is_useful_ceiling(c.altitude, c.power, self.altitude, self.power))
    }

    /// Critical altitude coincides with the deck: power only falls off above it.
    #[allow(clippy::float_cmp)]
    pub(crate) fn power_is_deck_power(&self) -> bool {
        self.altitude == self.deck_altitude
    }

    /// The constant-RPM breakpoint sits more than 1 m below `altitude`.
    pub(crate) fn bends_below(&self, altitude: f64) -> bool {
        self.const_rpm.is_some_and(|c| c.altitude - altitude < -1.0)
    }

    pub(crate) fn bends_below_crit(&self) -> bool {
        self.bends_below(self.altitude)
    }

    /// The curve bends between the critical altitude and the ceiling.
    #[allow(clippy::float_cmp)]
    pub(crate) fn bends_above_crit(&self) -> bool {
        self.const_rpm.is_some_and(|c| {
            c.altitude == self.altitude
                && self.ceiling.is_none_or(|ceiling| self.power - ceiling.power > 1.0)
                && c.curvature > 1.0
        })
    }

    /// WEP lowers the critical altitude past the constant-RPM breakpoint.
    pub(crate) fn ignores_const_rpm_on_wep(&self, wep_crit_altitude: f64) -> bool {
        self.const_rpm
            .is_some_and(|c| self.altitude > c.altitude && wep_crit_altitude < c.altitude)
    }
}

fn is_useful_ceiling(ceiling: f64, ceiling_power: f64, altitude: f64, power: f64) -> bool {
    ceiling - altitude >= 2.0 && power - ceiling_power >= 2.0
}
