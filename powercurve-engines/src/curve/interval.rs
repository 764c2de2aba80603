use super::CurveError;

/// Lower bound of one piece of a [`Curve`].
///
/// Power between this interval and the next follows
/// `power + (next.power - power) * t^curvature`, where `t` is the
/// fractional position of the pressure between the two bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerInterval {
    /// Static pressure at the lower altitude bound, rounded to 1 Pa.
    pub pressure: f64,
    pub power: f64,
    pub curvature: f64,
}

/// Piecewise power response of one stage in one throttle mode.
///
/// Intervals are ordered from high to low pressure. Pressures outside the
/// covered range are extrapolated from the first or last pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    intervals: Vec<PowerInterval>,
    terminated_early: bool,
}

impl Curve {
    #[must_use]
    pub fn new(intervals: Vec<PowerInterval>, terminated_early: bool) -> Self {
        Self {
            intervals,
            terminated_early,
        }
    }

    #[must_use]
    pub fn intervals(&self) -> &[PowerInterval] {
        &self.intervals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether construction stopped on a repeated pressure.
    ///
    /// The last interval is then a sentinel with zero curvature.
    #[must_use]
    pub fn terminated_early(&self) -> bool {
        self.terminated_early
    }

    /// Power at a total intake pressure.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::TooFewIntervals`] for curves shorter than two
    /// intervals and [`CurveError::Unbracketed`] if neither a binary search
    /// nor a linear scan finds a bracketing pair.
    pub fn power_for_pressure(&self, pressure: f64) -> Result<f64, CurveError> {
        let intervals = &self.intervals;
        let len = intervals.len();
        if len < 2 {
            return Err(CurveError::TooFewIntervals { len });
        }

        if pressure >= intervals[0].pressure {
            return Ok(interpolate_pair(&intervals[0], &intervals[1], pressure));
        }
        if pressure <= intervals[len - 1].pressure {
            return Ok(interpolate_pair(
                &intervals[len - 2],
                &intervals[len - 1],
                pressure,
            ));
        }

        let brackets = |i: usize| {
            pressure <= intervals[i].pressure && pressure > intervals[i + 1].pressure
        };

        let (mut left, mut right) = (0, len - 1);
        while left < right {
            let mid = left + (right - left) / 2;
            if brackets(mid) {
                return Ok(interpolate_pair(&intervals[mid], &intervals[mid + 1], pressure));
            }
            if pressure > intervals[mid].pressure {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (0..len - 1)
            .find(|&i| brackets(i))
            .map(|i| interpolate_pair(&intervals[i], &intervals[i + 1], pressure))
            .ok_or(CurveError::Unbracketed { pressure })
    }
}

fn interpolate_pair(lower: &PowerInterval, higher: &PowerInterval, pressure: f64) -> f64 {
    interpolate(
        lower.pressure,
        lower.power,
        higher.pressure,
        higher.power,
        pressure,
        lower.curvature,
    )
}

/// Curved interpolation between two `(x, power)` points.
///
/// The fractional position is raised to `curvature` preserving its sign,
/// so that extrapolation beyond the lower point stays finite.
pub(crate) fn interpolate(
    lower_x: f64,
    lower_power: f64,
    higher_x: f64,
    higher_power: f64,
    x: f64,
    curvature: f64,
) -> f64 {
    let span = higher_x - lower_x;
    if span == 0.0 {
        return lower_power;
    }
    let t = (x - lower_x) / span;
    lower_power + (higher_power - lower_power) * t.signum() * t.abs().powf(curvature)
}
