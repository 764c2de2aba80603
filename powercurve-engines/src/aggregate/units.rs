use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Force, Length, Mass, Power, ThermodynamicTemperature, Velocity},
    force::{kilogram_force, newton, pound_force},
    length::{foot, meter, mile, yard},
    mass::{kilogram, ounce, pound},
    power::{horsepower, kilowatt},
    thermodynamic_temperature::{degree_celsius, degree_fahrenheit, kelvin},
    velocity::{kilometer_per_hour, knot, meter_per_second, mile_per_hour},
};

/// Horsepower in one kilocalorie per second.
const HORSEPOWER_PER_KCAL_S: f64 = 5.610_835_376;

/// Unit of reported power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUnit {
    /// Mechanical horsepower, the unit curves are built in.
    #[default]
    #[serde(rename = "hp")]
    Horsepower,
    #[serde(rename = "kW")]
    Kilowatt,
    #[serde(rename = "kcal/s")]
    KilocaloriePerSecond,
}

impl PowerUnit {
    /// Converts a power in horsepower to this unit.
    #[must_use]
    pub fn from_horsepower(self, value: f64) -> f64 {
        match self {
            PowerUnit::Horsepower => value,
            PowerUnit::Kilowatt => Power::new::<horsepower>(value).get::<kilowatt>(),
            PowerUnit::KilocaloriePerSecond => value / HORSEPOWER_PER_KCAL_S,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            PowerUnit::Horsepower => "hp",
            PowerUnit::Kilowatt => "kW",
            PowerUnit::KilocaloriePerSecond => "kcal/s",
        }
    }
}

/// Unit of reported thrust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThrustUnit {
    #[default]
    #[serde(rename = "kgf")]
    KilogramForce,
    #[serde(rename = "N")]
    Newton,
    #[serde(rename = "lbf")]
    PoundForce,
}

impl ThrustUnit {
    /// Converts a thrust in kilogram-force to this unit.
    #[must_use]
    pub fn from_kilogram_force(self, value: f64) -> f64 {
        let force = Force::new::<kilogram_force>(value);
        match self {
            ThrustUnit::KilogramForce => value,
            ThrustUnit::Newton => force.get::<newton>(),
            ThrustUnit::PoundForce => force.get::<pound_force>(),
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            ThrustUnit::KilogramForce => "kgf",
            ThrustUnit::Newton => "N",
            ThrustUnit::PoundForce => "lbf",
        }
    }
}

/// Unit of the mass in per-weight metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "oz")]
    Ounce,
}

impl WeightUnit {
    /// Converts a mass in kilograms to this unit.
    #[must_use]
    pub fn from_kilograms(self, value: f64) -> f64 {
        let mass = Mass::new::<kilogram>(value);
        match self {
            WeightUnit::Kilogram => value,
            WeightUnit::Pound => mass.get::<pound>(),
            WeightUnit::Ounce => mass.get::<ounce>(),
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "lb",
            WeightUnit::Ounce => "oz",
        }
    }
}

/// Unit of the speed axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[default]
    #[serde(rename = "km/h")]
    KilometerPerHour,
    #[serde(rename = "mph")]
    MilePerHour,
    #[serde(rename = "kt")]
    Knot,
    #[serde(rename = "m/s")]
    MeterPerSecond,
}

impl SpeedUnit {
    /// Converts a speed in km/h to this unit.
    #[must_use]
    pub fn from_kph(self, value: f64) -> f64 {
        let speed = Velocity::new::<kilometer_per_hour>(value);
        match self {
            SpeedUnit::KilometerPerHour => value,
            SpeedUnit::MilePerHour => speed.get::<mile_per_hour>(),
            SpeedUnit::Knot => speed.get::<knot>(),
            SpeedUnit::MeterPerSecond => speed.get::<meter_per_second>(),
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::KilometerPerHour => "km/h",
            SpeedUnit::MilePerHour => "mph",
            SpeedUnit::Knot => "kt",
            SpeedUnit::MeterPerSecond => "m/s",
        }
    }
}

/// Unit of the altitude axis and of the requested maximum altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AltitudeUnit {
    #[default]
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "mile")]
    Mile,
    #[serde(rename = "yard")]
    Yard,
}

impl AltitudeUnit {
    #[must_use]
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            AltitudeUnit::Meter => value,
            AltitudeUnit::Foot => Length::new::<foot>(value).get::<meter>(),
            AltitudeUnit::Mile => Length::new::<mile>(value).get::<meter>(),
            AltitudeUnit::Yard => Length::new::<yard>(value).get::<meter>(),
        }
    }

    #[must_use]
    pub fn from_meters(self, value: f64) -> f64 {
        let length = Length::new::<meter>(value);
        match self {
            AltitudeUnit::Meter => value,
            AltitudeUnit::Foot => length.get::<foot>(),
            AltitudeUnit::Mile => length.get::<mile>(),
            AltitudeUnit::Yard => length.get::<yard>(),
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            AltitudeUnit::Meter => "m",
            AltitudeUnit::Foot => "ft",
            AltitudeUnit::Mile => "mile",
            AltitudeUnit::Yard => "yard",
        }
    }
}

/// Unit of the sea-level air temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "°C", alias = "C")]
    Celsius,
    #[serde(rename = "°F", alias = "F")]
    Fahrenheit,
    #[serde(rename = "K")]
    Kelvin,
}

impl TemperatureUnit {
    #[must_use]
    pub fn quantity(self, value: f64) -> ThermodynamicTemperature {
        match self {
            TemperatureUnit::Celsius => ThermodynamicTemperature::new::<degree_celsius>(value),
            TemperatureUnit::Fahrenheit => ThermodynamicTemperature::new::<degree_fahrenheit>(value),
            TemperatureUnit::Kelvin => ThermodynamicTemperature::new::<kelvin>(value),
        }
    }

    #[must_use]
    pub fn to_kelvin(self, value: f64) -> f64 {
        self.quantity(value).get::<kelvin>()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn power_units() {
        assert_relative_eq!(PowerUnit::Horsepower.from_horsepower(1000.0), 1000.0);
        assert_relative_eq!(
            PowerUnit::Kilowatt.from_horsepower(1341.021_859),
            1000.0,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            PowerUnit::KilocaloriePerSecond.from_horsepower(5.610_835_376),
            1.0
        );
    }

    #[test]
    fn thrust_units() {
        assert_relative_eq!(
            ThrustUnit::Newton.from_kilogram_force(1.0),
            9.806_65,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            ThrustUnit::PoundForce.from_kilogram_force(0.453_592_37),
            1.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn weight_units() {
        assert_relative_eq!(WeightUnit::Pound.from_kilograms(0.453_592_37), 1.0, max_relative = 1e-6);
        assert_relative_eq!(WeightUnit::Ounce.from_kilograms(1.0), 35.273_96, max_relative = 1e-6);
    }

    #[test]
    fn speed_units() {
        assert_relative_eq!(SpeedUnit::MeterPerSecond.from_kph(360.0), 100.0, max_relative = 1e-12);
        assert_relative_eq!(SpeedUnit::Knot.from_kph(1.852), 1.0, max_relative = 1e-9);
        assert_relative_eq!(SpeedUnit::MilePerHour.from_kph(1.609_344), 1.0, max_relative = 1e-9);
    }

    #[test]
    fn altitude_units() {
        assert_relative_eq!(AltitudeUnit::Foot.to_meters(1000.0), 304.8, max_relative = 1e-12);
        assert_relative_eq!(AltitudeUnit::Yard.to_meters(1.0), 0.9144, max_relative = 1e-12);
        assert_relative_eq!(AltitudeUnit::Mile.from_meters(1609.344), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn temperature_units() {
        assert_relative_eq!(TemperatureUnit::Celsius.to_kelvin(15.0), 288.15, max_relative = 1e-12);
        assert_relative_eq!(TemperatureUnit::Fahrenheit.to_kelvin(59.0), 288.15, max_relative = 1e-9);
        assert_relative_eq!(TemperatureUnit::Kelvin.to_kelvin(273.0), 273.0);
    }

    #[test]
    fn units_deserialize_from_symbols() {
        let unit: TemperatureUnit = serde_json::from_str("\"°F\"").unwrap();
        assert_eq!(unit, TemperatureUnit::Fahrenheit);
        let unit: PowerUnit = serde_json::from_str("\"kcal/s\"").unwrap();
        assert_eq!(unit, PowerUnit::KilocaloriePerSecond);
        let unit: SpeedUnit = serde_json::from_str("\"kt\"").unwrap();
        assert_eq!(unit, SpeedUnit::Knot);
    }
}
