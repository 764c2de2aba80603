use ndarray::Array1;
use powercurve_atmos::{STANDARD_PRESSURE, SeaLevel};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Pressure, pressure::pascal};

use crate::{
    ThrottleMode,
    sampler::{Grid, SpeedType},
};

use super::{
    AggregateError,
    units::{AltitudeUnit, PowerUnit, SpeedUnit, TemperatureUnit, ThrustUnit, WeightUnit},
};

/// Highest airspeed sampled for power metrics, km/h.
const MAX_POWER_SPEED_KPH: f64 = 1000.0;

/// Highest airspeed sampled for thrust metrics, km/h.
const MAX_THRUST_SPEED_KPH: f64 = 2000.0;

/// Quantity reported per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Power,
    PowerPerWeight,
    Thrust,
    ThrustPerWeight,
}

impl Metric {
    #[must_use]
    pub fn is_thrust(self) -> bool {
        matches!(self, Metric::Thrust | Metric::ThrustPerWeight)
    }

    #[must_use]
    pub fn per_weight(self) -> bool {
        matches!(self, Metric::PowerPerWeight | Metric::ThrustPerWeight)
    }
}

/// What to compute for an aircraft and how to express it.
///
/// Deserializes from TOML or JSON; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub metric: Metric,
    pub modes: Vec<ThrottleMode>,
    pub speed_type: SpeedType,
    /// Sea-level air temperature, in `temperature_unit`.
    pub air_temperature: f64,
    pub temperature_unit: TemperatureUnit,
    /// Top of the altitude axis, in `altitude_unit`.
    pub max_altitude: f64,
    pub altitude_unit: AltitudeUnit,
    pub speed_unit: SpeedUnit,
    pub power_unit: PowerUnit,
    pub thrust_unit: ThrustUnit,
    pub weight_unit: WeightUnit,
    /// Fuel load for per-weight metrics, percent of capacity.
    pub fuel_percent: f64,
    /// Overrides whether rocket boosters add thrust. By default they do
    /// only when built into the airframe.
    pub include_boosters: Option<bool>,
    /// Whether high-octane fuel modifiers apply.
    pub octane: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            metric: Metric::Power,
            modes: vec![ThrottleMode::Military, ThrottleMode::Wep],
            speed_type: SpeedType::Tas,
            air_temperature: 15.0,
            temperature_unit: TemperatureUnit::Celsius,
            max_altitude: 10_000.0,
            altitude_unit: AltitudeUnit::Meter,
            speed_unit: SpeedUnit::KilometerPerHour,
            power_unit: PowerUnit::Horsepower,
            thrust_unit: ThrustUnit::KilogramForce,
            weight_unit: WeightUnit::Kilogram,
            fuel_percent: 100.0,
            include_boosters: None,
            octane: true,
        }
    }
}

impl Request {
    /// Checks the request before any engine work is done.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::InvalidRequest`] with the failing field.
    pub fn validate(&self) -> Result<(), AggregateError> {
        let invalid = |reason: &'static str| -> Result<(), AggregateError> {
            Err(AggregateError::InvalidRequest { reason })
        };

        if self.modes.is_empty() {
            return invalid("at least one throttle mode is required");
        }
        if !(0.0..=100.0).contains(&self.fuel_percent) {
            return invalid("fuel_percent must be between 0 and 100");
        }
        if !self.max_altitude.is_finite() || self.max_altitude < 0.0 {
            return invalid("max_altitude must be finite and not negative");
        }
        let kelvin = self.temperature_unit.to_kelvin(self.air_temperature);
        if !kelvin.is_finite() || kelvin <= 0.0 {
            return invalid("air_temperature must be above absolute zero");
        }
        Ok(())
    }

    /// Standard sea-level pressure at the requested air temperature.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is not above absolute zero.
    pub fn sea_level(&self) -> Result<SeaLevel, AggregateError> {
        let pressure = Pressure::new::<pascal>(STANDARD_PRESSURE);
        let temperature = self.temperature_unit.quantity(self.air_temperature);
        Ok(SeaLevel::from_quantities(pressure, temperature)?)
    }

    /// Maximum altitude in meters, rounded to whole meters.
    #[must_use]
    pub fn max_altitude_m(&self) -> f64 {
        self.altitude_unit.to_meters(self.max_altitude).round()
    }

    /// Sampling grid: 20 m altitude steps up to the maximum altitude, and
    /// 10 km/h speed steps up to 2000 km/h for thrust or 1000 km/h for power.
    #[must_use]
    pub fn grid(&self) -> Grid {
        let max_speed = if self.metric.is_thrust() {
            MAX_THRUST_SPEED_KPH
        } else {
            MAX_POWER_SPEED_KPH
        };
        Grid::for_ranges(self.max_altitude_m(), max_speed, self.speed_type)
    }

    /// Speed axis of [`Request::grid`] in `speed_unit`.
    #[must_use]
    pub fn speed_axis(&self) -> Array1<f64> {
        self.grid().speeds().mapv(|kph| self.speed_unit.from_kph(kph))
    }

    /// Altitude axis of [`Request::grid`] in `altitude_unit`.
    #[must_use]
    pub fn altitude_axis(&self) -> Array1<f64> {
        self.grid().altitudes().mapv(|m| self.altitude_unit.from_meters(m))
    }

    /// Converts a raw cell value (hp or kgf) to the requested output unit.
    pub(crate) fn output_value(&self, value: f64) -> f64 {
        if self.metric.is_thrust() {
            self.thrust_unit.from_kilogram_force(value)
        } else {
            self.power_unit.from_horsepower(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults() {
        let request = Request::default();
        assert!(request.validate().is_ok());
        assert_eq!(request.modes, vec![ThrottleMode::Military, ThrottleMode::Wep]);
        assert_relative_eq!(request.sea_level().unwrap().temperature(), 288.15, max_relative = 1e-12);
        assert_eq!(request.grid().shape(), (101, 500));
    }

    #[test]
    fn thrust_metrics_sample_faster_speeds() {
        let request = Request {
            metric: Metric::ThrustPerWeight,
            ..Request::default()
        };
        assert_eq!(request.grid().speed_count, 201);
        assert!(request.metric.per_weight());
    }

    #[test]
    fn altitude_in_feet() {
        let request = Request {
            max_altitude: 30_000.0,
            altitude_unit: AltitudeUnit::Foot,
            ..Request::default()
        };
        assert_relative_eq!(request.max_altitude_m(), 9144.0);
        assert_eq!(request.grid().altitude_count, 457);

        let axis = request.altitude_axis();
        assert_relative_eq!(axis[1], 20.0 / 0.3048, max_relative = 1e-12);
    }

    #[test]
    fn speed_axis_in_knots() {
        let request = Request {
            speed_unit: SpeedUnit::Knot,
            ..Request::default()
        };
        let axis = request.speed_axis();
        assert_relative_eq!(axis[100], 1000.0 / 1.852, max_relative = 1e-9);
    }

    #[test]
    fn rejects_bad_requests() {
        let no_modes = Request {
            modes: Vec::new(),
            ..Request::default()
        };
        assert!(matches!(no_modes.validate(), Err(AggregateError::InvalidRequest { .. })));

        let overfull = Request {
            fuel_percent: 120.0,
            ..Request::default()
        };
        assert!(overfull.validate().is_err());

        let frozen = Request {
            air_temperature: -300.0,
            ..Request::default()
        };
        assert!(frozen.validate().is_err());
        assert!(frozen.sea_level().is_err());
    }

    #[test]
    fn deserializes_partial_toml_like_json() {
        let request: Request = serde_json::from_str(
            r#"{ "metric": "power_per_weight", "modes": ["WEP"], "weight_unit": "lb" }"#,
        )
        .unwrap();
        assert_eq!(request.metric, Metric::PowerPerWeight);
        assert_eq!(request.modes, vec![ThrottleMode::Wep]);
        assert_eq!(request.weight_unit, WeightUnit::Pound);
        assert_relative_eq!(request.fuel_percent, 100.0);
        assert!(request.octane);
    }
}
