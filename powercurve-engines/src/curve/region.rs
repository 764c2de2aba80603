use powercurve_atmos::{Atmosphere, DEFAULT_START_ALTITUDE, DEFAULT_TOLERANCE};

use super::{
    interval::interpolate,
    stage::{Ceiling, Stage},
    wep::WepSetup,
};

/// An `(altitude, power)` breakpoint.
type Point = (f64, f64);

/// Altitude span used to extrapolate past the last known breakpoint.
const EXTRAPOLATION_SPAN: f64 = 1000.0;

/// The piece of a stage's curve that covers one altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub lower_altitude: f64,
    pub lower_power: f64,
    pub higher_altitude: f64,
    pub higher_power: f64,
    pub curvature: f64,
}

impl Segment {
    fn new(lower: Point, higher: Point, curvature: f64) -> Self {
        Self {
            lower_altitude: lower.0,
            lower_power: lower.1,
            higher_altitude: higher.0,
            higher_power: higher.1,
            curvature,
        }
    }
}

/// Selects the segment that applies at an altitude.
///
/// Altitudes split into regions around the critical altitude of the stage
/// and the altitude where the old RPM regime ends. WEP shifts the critical
/// altitude down and scales every power by the WEP multiplier.
pub(crate) struct Regions<'a> {
    stage: &'a Stage,
    atmosphere: &'a Atmosphere,
}

impl<'a> Regions<'a> {
    pub(crate) fn new(stage: &'a Stage, atmosphere: &'a Atmosphere) -> Self {
        Self { stage, atmosphere }
    }

    pub(crate) fn military(&self, h: f64) -> Segment {
        let s = self.stage;
        if h <= s.altitude {
            self.military_below_crit(h)
        } else if h <= s.old_altitude {
            self.military_rpm_transition()
        } else {
            self.military_above_transition()
        }
    }

    fn military_below_crit(&self, h: f64) -> Segment {
        let s = self.stage;
        let crit = (s.altitude, s.power);
        let deck = (s.deck_altitude, s.deck_power);

        if let Some(c) = s.const_rpm.filter(|c| c.altitude <= 0.0 && h < c.altitude) {
            return Segment::new((c.altitude, c.power), crit, 1.0);
        }

        match s.const_rpm.filter(|_| s.bends_below_crit()) {
            Some(c) if h < c.altitude => Segment::new(deck, (c.altitude, c.power), 1.0),
            Some(c) => Segment::new((c.altitude, c.power), crit, c.curvature),
            None if !s.power_is_deck_power() => Segment::new(deck, crit, 1.0),
            None => Segment::new(crit, self.ceiling_or_extrapolated(crit), 1.0),
        }
    }

    fn military_rpm_transition(&self) -> Segment {
        let s = self.stage;
        let crit = (s.altitude, s.power);

        let Some(ceiling) = s.useful_ceiling() else {
            let power = s.old_power_new_rpm * self.pressure_ratio(s.old_altitude, s.altitude);
            return Segment::new(crit, (s.old_altitude, power), 1.0);
        };

        let curvature = self.above_crit_curvature(false);
        let higher = if s.exact_altitudes {
            (s.old_altitude, self.power_toward_ceiling(ceiling, s.old_altitude, curvature))
        } else {
            (ceiling.altitude, ceiling.power)
        };
        Segment::new(crit, higher, curvature)
    }

    fn military_above_transition(&self) -> Segment {
        let s = self.stage;

        let Some(ceiling) = s.useful_ceiling() else {
            let power = s.old_power_new_rpm * self.pressure_ratio(s.old_altitude, s.altitude);
            let lower = (s.old_altitude, power);
            return Segment::new(lower, self.extrapolate(lower), 1.0);
        };

        let curvature = self.above_crit_curvature(false);
        let lower_power = if s.exact_altitudes {
            self.power_toward_ceiling(ceiling, s.old_altitude, curvature)
        } else {
            s.power
        };
        Segment::new(
            (s.old_altitude, lower_power),
            (ceiling.altitude, ceiling.power),
            curvature,
        )
    }

    pub(crate) fn wep(&self, setup: &WepSetup, h: f64) -> Segment {
        let s = self.stage;
        let crit = setup.crit_altitude;
        match (h <= crit, h <= s.old_altitude) {
            (true, true) => self.wep_below_crit(setup, h),
            (true, false) => self.wep_rpm_transition(setup),
            (false, true) => self.wep_between(setup),
            (false, false) => self.wep_above(setup),
        }
    }

    fn wep_below_crit(&self, setup: &WepSetup, h: f64) -> Segment {
        let s = self.stage;
        let m = setup.power_mult;
        let ignore = s.ignores_const_rpm_on_wep(setup.crit_altitude);
        let lowest = setup.crit_altitude.min(s.old_altitude);
        let deck = (s.deck_altitude, s.deck_power * m);
        let crit = (s.altitude, s.power * m);
        let const_rpm = s.const_rpm.filter(|_| !ignore);

        if let Some(c) = const_rpm.filter(|c| c.altitude <= 0.0 && h < c.altitude) {
            return Segment::new((c.altitude, c.power * m), (lowest, s.power * m), 1.0);
        }

        let bends = !ignore && s.bends_below_crit();
        if !bends && !s.power_is_deck_power() {
            return if s.exact_altitudes {
                Segment::new(
                    (setup.deck_altitude, self.on_altitude(deck, crit, setup.deck_altitude, 1.0)),
                    (lowest, self.on_altitude(deck, crit, lowest, 1.0)),
                    1.0,
                )
            } else {
                Segment::new(deck, (lowest, s.power * m), 1.0)
            };
        }

        if let Some(c) = const_rpm {
            if s.exact_altitudes {
                let bend = (c.altitude, c.power * m);
                return if h < c.altitude {
                    Segment::new(deck, bend, 1.0)
                } else {
                    let power = self.on_altitude(bend, crit, lowest, c.curvature);
                    Segment::new(bend, (lowest, power), c.curvature)
                };
            }
            if let Some(altitude) = setup.const_rpm_altitude {
                let bend = (altitude, c.power * m);
                return if h < altitude {
                    Segment::new(deck, bend, 1.0)
                } else {
                    Segment::new(bend, (lowest, s.power * m), c.curvature)
                };
            }
        }

        self.wep_from_deck_power(setup)
    }

    /// The critical altitude is the deck: WEP power only falls off with
    /// altitude.
    fn wep_from_deck_power(&self, setup: &WepSetup) -> Segment {
        let s = self.stage;
        let m = setup.power_mult;
        let start = (setup.crit_altitude, s.power * m);

        let higher = match s.ceiling {
            Some(ceiling) if s.exact_altitudes => {
                let shifted = (self.shifted_ceiling(setup, ceiling), ceiling.power * m);
                let power = self.on_altitude(start, shifted, ceiling.altitude, 1.0);
                (ceiling.altitude, power)
            }
            Some(ceiling) => (ceiling.altitude, ceiling.power),
            None => self.extrapolate(start),
        };
        Segment::new(start, higher, 1.0)
    }

    fn wep_rpm_transition(&self, setup: &WepSetup) -> Segment {
        let s = self.stage;
        let power = self.on_altitude(
            (s.deck_altitude, s.deck_power * setup.power_mult),
            (s.altitude, s.power * setup.power_mult),
            s.old_altitude,
            1.0,
        );
        Segment::new((s.old_altitude, power), (setup.crit_altitude, power), 1.0)
    }

    fn wep_between(&self, setup: &WepSetup) -> Segment {
        let s = self.stage;
        let m = setup.power_mult;
        let wep_crit = setup.crit_altitude;
        let ignore = s.ignores_const_rpm_on_wep(wep_crit);
        let deck = (s.deck_altitude, s.deck_power * m);
        let crit = (s.altitude, s.power * m);

        let bend = s.const_rpm.filter(|_| !ignore && s.bends_below(wep_crit));
        let lower_power = match bend {
            _ if !s.exact_altitudes => s.power * m,
            Some(c) => self.on_altitude((c.altitude, c.power * m), crit, wep_crit, c.curvature),
            None => self.on_altitude(deck, crit, wep_crit, 1.0),
        };
        let lower = (wep_crit, lower_power);

        let Some(ceiling) = s.useful_ceiling() else {
            let power = self.on_altitude(deck, crit, s.old_altitude, 1.0)
                * self.pressure_ratio(s.old_altitude, wep_crit);
            return Segment::new(lower, (s.old_altitude, power), 1.0);
        };

        let curvature = self.above_crit_curvature(ignore);
        let higher = if s.exact_altitudes {
            let power = self.on_altitude(
                (wep_crit, s.old_power_new_rpm * m),
                (self.shifted_ceiling(setup, ceiling), ceiling.power * m),
                s.old_altitude,
                curvature,
            );
            (s.old_altitude, power)
        } else {
            (ceiling.altitude, ceiling.power)
        };
        Segment::new(lower, higher, curvature)
    }

    fn wep_above(&self, setup: &WepSetup) -> Segment {
        let s = self.stage;
        let m = setup.power_mult;
        let wep_crit = setup.crit_altitude;
        let ignore = s.ignores_const_rpm_on_wep(wep_crit);
        let deck = (s.deck_altitude, s.deck_power * m);
        let crit = (s.altitude, s.power * m);

        let lower = if wep_crit < s.altitude {
            match s.useful_ceiling() {
                None => {
                    let power = self.on_altitude(deck, crit, s.old_altitude, 1.0)
                        * self.pressure_ratio(s.old_altitude, wep_crit);
                    (s.old_altitude, power)
                }
                Some(ceiling) if s.exact_altitudes => {
                    let power = self.on_altitude(
                        (wep_crit, s.old_power_new_rpm * m),
                        (self.shifted_ceiling(setup, ceiling), ceiling.power * m),
                        s.old_altitude,
                        1.0,
                    );
                    (s.old_altitude, power)
                }
                Some(_) => (wep_crit, s.power * m),
            }
        } else {
            let bend = s.const_rpm.filter(|_| !ignore && s.bends_below_crit());
            let power = match bend {
                Some(c) => self.on_altitude((c.altitude, c.power * m), crit, wep_crit, 1.0),
                None if s.exact_altitudes => self.on_altitude(deck, crit, s.old_altitude, 1.0),
                None => s.power * m,
            };
            (wep_crit, power)
        };

        let (higher, curvature) = match s.useful_ceiling() {
            None => (self.extrapolate(lower), 1.0),
            Some(ceiling) => {
                let curvature = self.above_crit_curvature(ignore);
                let higher = if s.exact_altitudes {
                    (self.shifted_ceiling(setup, ceiling), ceiling.power * m)
                } else {
                    (ceiling.altitude, ceiling.power)
                };
                (higher, curvature)
            }
        };

        if higher.0 < lower.0 && higher.1 > lower.1 {
            Segment::new(higher, lower, curvature)
        } else {
            Segment::new(lower, higher, curvature)
        }
    }

    /// Curvature above the critical altitude: the constant-RPM curvature when
    /// the curve bends there, 1 otherwise.
    fn above_crit_curvature(&self, ignore_const_rpm: bool) -> f64 {
        match self.stage.const_rpm {
            Some(c) if !ignore_const_rpm && self.stage.bends_above_crit() => c.curvature,
            _ => 1.0,
        }
    }

    /// Power between the critical point (on the new RPM) and the ceiling.
    fn power_toward_ceiling(&self, ceiling: Ceiling, h: f64, curvature: f64) -> f64 {
        let s = self.stage;
        self.on_altitude(
            (s.altitude, s.old_power_new_rpm),
            (ceiling.altitude, ceiling.power),
            h,
            curvature,
        )
    }

    /// Ceiling moved by the same pressure ratio as the WEP critical altitude.
    fn shifted_ceiling(&self, setup: &WepSetup, ceiling: Ceiling) -> f64 {
        let ratio = self.pressure_ratio(setup.crit_altitude, self.stage.altitude);
        self.atmosphere.altitude_from_pressure(
            self.atmosphere.pressure(ceiling.altitude) * ratio,
            DEFAULT_TOLERANCE,
            DEFAULT_START_ALTITUDE,
        )
    }

    fn ceiling_or_extrapolated(&self, from: Point) -> Point {
        match self.stage.ceiling {
            Some(ceiling) => (ceiling.altitude, ceiling.power),
            None => self.extrapolate(from),
        }
    }

    /// Continues a breakpoint upward with power proportional to pressure.
    fn extrapolate(&self, (altitude, power): Point) -> Point {
        let higher = altitude + EXTRAPOLATION_SPAN;
        (higher, power * self.pressure_ratio(higher, altitude))
    }

    fn pressure_ratio(&self, numerator: f64, denominator: f64) -> f64 {
        self.atmosphere.pressure(numerator) / self.atmosphere.pressure(denominator)
    }

    /// Interpolates power between two breakpoints in pressure space.
    fn on_altitude(&self, lower: Point, higher: Point, h: f64, curvature: f64) -> f64 {
        let p = |altitude| self.atmosphere.pressure(altitude);
        interpolate(p(lower.0), lower.1, p(higher.0), higher.1, p(h), curvature)
    }
}
