use serde::{Deserialize, Serialize};
use tracing::warn;
use uom::si::{
    f64::{Length, MassDensity, Pressure, ThermodynamicTemperature, Velocity},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
    velocity::meter_per_second,
};

use crate::{AtmosphereError, inversion};

/// Standard sea-level pressure, Pa.
pub const STANDARD_PRESSURE: f64 = 101_300.0;

/// Standard sea-level temperature, K.
pub const STANDARD_TEMPERATURE: f64 = 288.16;

/// Standard sea-level density, kg/m³.
pub const STANDARD_DENSITY: f64 = 1.225;

/// Altitude (m) above which the polynomial fits are not evaluated.
pub const POLYNOMIAL_CEILING: f64 = 18_300.0;

/// Gravitational acceleration, m/s².
pub const GRAVITY: f64 = 9.81;

const STANDARD_VISCOSITY: f64 = 1.825e-6;
const PRESSURE_FLOOR: f64 = 1.0e-5;

pub(crate) const PRESSURE: [f64; 5] = [1.0, -0.000_118_441, 5.6763e-9, -1.3738e-13, 1.60373e-18];
const DENSITY: [f64; 5] = [1.0, -9.59387e-5, 3.53118e-9, -5.83556e-14, 2.28719e-19];
const TEMPERATURE: [f64; 5] = [1.0, -2.27712e-5, 2.18069e-10, -5.71104e-14, 3.97306e-18];

/// Evaluates a degree-4 polynomial in Horner form.
pub(crate) fn poly(coeffs: &[f64; 5], v: f64) -> f64 {
    (((coeffs[4] * v + coeffs[3]) * v + coeffs[2]) * v + coeffs[1]) * v + coeffs[0]
}

/// Sea-level conditions that anchor an [`Atmosphere`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeaLevel {
    pressure: f64,
    temperature: f64,
}

impl SeaLevel {
    /// Creates sea-level conditions from a pressure (Pa) and temperature (K).
    ///
    /// # Errors
    ///
    /// Returns an error if either value is non-finite or not positive.
    pub fn new(pressure: f64, temperature: f64) -> Result<Self, AtmosphereError> {
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(AtmosphereError::InvalidPressure(pressure));
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(AtmosphereError::InvalidTemperature(temperature));
        }
        Ok(Self {
            pressure,
            temperature,
        })
    }

    /// Creates sea-level conditions from typed quantities.
    ///
    /// # Errors
    ///
    /// See [`SeaLevel::new`].
    pub fn from_quantities(
        pressure: Pressure,
        temperature: ThermodynamicTemperature,
    ) -> Result<Self, AtmosphereError> {
        Self::new(pressure.get::<pascal>(), temperature.get::<kelvin>())
    }

    /// Standard pressure with a non-standard temperature.
    ///
    /// # Errors
    ///
    /// Returns an error if `temperature` is non-finite or not positive.
    pub fn with_temperature(temperature: f64) -> Result<Self, AtmosphereError> {
        Self::new(STANDARD_PRESSURE, temperature)
    }

    #[must_use]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Density implied by the ideal-gas law relative to standard conditions.
    #[must_use]
    pub fn density(&self) -> f64 {
        STANDARD_DENSITY * (self.pressure / STANDARD_PRESSURE)
            * (STANDARD_TEMPERATURE / self.temperature)
    }
}

impl Default for SeaLevel {
    fn default() -> Self {
        Self {
            pressure: STANDARD_PRESSURE,
            temperature: STANDARD_TEMPERATURE,
        }
    }
}

/// Polynomial standard atmosphere anchored at configurable sea-level
/// conditions.
///
/// Each sampling task owns its own instance; nothing here is shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pressure0: f64,
    temperature0: f64,
    density0: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            pressure0: STANDARD_PRESSURE,
            temperature0: STANDARD_TEMPERATURE,
            density0: STANDARD_DENSITY,
        }
    }
}

impl From<SeaLevel> for Atmosphere {
    fn from(sea_level: SeaLevel) -> Self {
        let mut atm = Self::default();
        atm.set_sea_level(sea_level);
        atm
    }
}

impl Atmosphere {
    /// Standard-day atmosphere.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Re-anchors the atmosphere at new sea-level conditions.
    ///
    /// Sea-level density is recomputed from the ideal-gas ratio, so
    /// `pressure(0)` and `density(0)` match the new conditions exactly.
    pub fn set_sea_level(&mut self, sea_level: SeaLevel) {
        self.pressure0 = sea_level.pressure();
        self.temperature0 = sea_level.temperature();
        self.density0 = sea_level.density();
    }

    /// Restores standard sea-level conditions.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn sea_level(&self) -> SeaLevel {
        SeaLevel {
            pressure: self.pressure0,
            temperature: self.temperature0,
        }
    }

    /// Static pressure (Pa) at altitude `h` (m).
    ///
    /// Above the polynomial ceiling the pressure decays as `ceiling / h`.
    #[must_use]
    pub fn pressure(&self, h: f64) -> f64 {
        self.pressure0 * poly(&PRESSURE, h.min(POLYNOMIAL_CEILING)) * beyond_ceiling(h)
    }

    /// Static temperature (K) at altitude `h` (m).
    ///
    /// The temperature is held constant above the polynomial ceiling.
    #[must_use]
    pub fn temperature(&self, h: f64) -> f64 {
        self.temperature0 * poly(&TEMPERATURE, h.min(POLYNOMIAL_CEILING))
    }

    /// Air density (kg/m³) at altitude `h` (m).
    #[must_use]
    pub fn density(&self, h: f64) -> f64 {
        self.density0 * poly(&DENSITY, h.min(POLYNOMIAL_CEILING)) * beyond_ceiling(h)
    }

    /// Speed of sound (m/s) at altitude `h` (m).
    #[must_use]
    pub fn sonic_speed(&self, h: f64) -> f64 {
        20.1 * self.temperature(h).sqrt()
    }

    /// Dynamic viscosity (Pa·s) at altitude `h` (m).
    #[must_use]
    pub fn viscosity(&self, h: f64) -> f64 {
        STANDARD_VISCOSITY * (self.temperature(h) / self.temperature0).powf(0.76)
    }

    /// Kinematic viscosity (m²/s) at altitude `h` (m).
    #[must_use]
    pub fn kinematic_viscosity(&self, h: f64) -> f64 {
        self.viscosity(h) / self.density(h)
    }

    /// Converts an indicated airspeed to true airspeed at altitude `h`.
    ///
    /// Units of the result match the units of `ias`.
    #[must_use]
    pub fn tas_from_ias(&self, ias: f64, h: f64) -> f64 {
        ias * (STANDARD_DENSITY / self.density(h)).sqrt()
    }

    /// Dynamic pressure (Pa) recovered by an intake at `tas_kph` km/h.
    #[must_use]
    pub fn ram_pressure(&self, h: f64, tas_kph: f64, intake_efficiency: f64) -> f64 {
        let v = tas_kph / 3.6;
        self.density(h) * v * v / 2.0 * intake_efficiency
    }

    /// Altitude with no ram boost whose static pressure equals the total
    /// intake pressure at `h` and `tas_kph`, rounded to the nearest metre.
    #[must_use]
    pub fn ram_altitude(&self, h: f64, tas_kph: f64, intake_efficiency: f64) -> f64 {
        let total = self.pressure(h) + self.ram_pressure(h, tas_kph, intake_efficiency);
        self.altitude_from_pressure(total, 0.1, h).round()
    }

    /// Inverse of [`Atmosphere::pressure`], returning a best-effort altitude.
    ///
    /// Pressures below the ceiling pressure are inverted algebraically.
    /// Otherwise Newton's method runs for at most ten steps, using
    /// `tolerance` both as the derivative step and the convergence
    /// threshold. The last estimate is returned whether or not it converged.
    /// If the search cannot run at all, `start` is returned and a warning
    /// is logged.
    #[must_use]
    pub fn altitude_from_pressure(&self, target: f64, tolerance: f64, start: f64) -> f64 {
        match self.try_altitude_from_pressure(target, tolerance, start) {
            Ok(h) => h,
            Err(error) => {
                warn!(pressure = target, tolerance, start, %error, "altitude search failed");
                start
            }
        }
    }

    /// Like [`Atmosphere::altitude_from_pressure`] but reports why a search
    /// could not run.
    ///
    /// # Errors
    ///
    /// Returns an error if `tolerance` is not finite and positive, if
    /// `target` is not finite, or if the solver rejects its inputs.
    pub fn try_altitude_from_pressure(
        &self,
        target: f64,
        tolerance: f64,
        start: f64,
    ) -> Result<f64, AtmosphereError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(AtmosphereError::InvalidTolerance(tolerance));
        }
        if !target.is_finite() {
            return Err(AtmosphereError::NonFiniteTarget(target));
        }

        let ceiling_pressure = self.pressure0 * poly(&PRESSURE, POLYNOMIAL_CEILING);
        if target < ceiling_pressure {
            return Ok(ceiling_pressure * POLYNOMIAL_CEILING / target.max(PRESSURE_FLOOR));
        }

        let solution = inversion::solve(self.pressure0, target, tolerance, start)?;
        Ok(solution.x)
    }

    /// Typed static pressure.
    #[must_use]
    pub fn pressure_at(&self, altitude: Length) -> Pressure {
        Pressure::new::<pascal>(self.pressure(altitude.get::<meter>()))
    }

    /// Typed static temperature.
    #[must_use]
    pub fn temperature_at(&self, altitude: Length) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<kelvin>(self.temperature(altitude.get::<meter>()))
    }

    /// Typed air density.
    #[must_use]
    pub fn density_at(&self, altitude: Length) -> MassDensity {
        MassDensity::new::<kilogram_per_cubic_meter>(self.density(altitude.get::<meter>()))
    }

    /// Typed speed of sound.
    #[must_use]
    pub fn sonic_speed_at(&self, altitude: Length) -> Velocity {
        Velocity::new::<meter_per_second>(self.sonic_speed(altitude.get::<meter>()))
    }

    /// Typed inverse of [`Atmosphere::pressure_at`] with default search
    /// parameters.
    #[must_use]
    pub fn altitude_at(&self, pressure: Pressure) -> Length {
        Length::new::<meter>(self.altitude_from_pressure(
            pressure.get::<pascal>(),
            inversion::DEFAULT_TOLERANCE,
            inversion::DEFAULT_START_ALTITUDE,
        ))
    }
}

fn beyond_ceiling(h: f64) -> f64 {
    POLYNOMIAL_CEILING / POLYNOMIAL_CEILING.max(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        length::kilometer, pressure::kilopascal, thermodynamic_temperature::degree_celsius,
    };

    use crate::DEFAULT_TOLERANCE;

    #[test]
    fn sea_level_values_are_exact() {
        let atm = Atmosphere::standard();
        assert_eq!(atm.pressure(0.0), STANDARD_PRESSURE);
        assert_eq!(atm.density(0.0), STANDARD_DENSITY);
        assert_eq!(atm.temperature(0.0), STANDARD_TEMPERATURE);
    }

    #[test]
    fn set_sea_level_anchors_the_profile() {
        let mut atm = Atmosphere::standard();
        let sea_level = SeaLevel::new(99_000.0, 300.0).unwrap();
        atm.set_sea_level(sea_level);

        assert_eq!(atm.pressure(0.0), 99_000.0);
        assert_eq!(atm.temperature(0.0), 300.0);
        assert_eq!(atm.density(0.0), sea_level.density());
        assert_relative_eq!(
            atm.density(0.0),
            1.225 * (99_000.0 / 101_300.0) * (288.16 / 300.0)
        );
    }

    #[test]
    fn reset_restores_standard_day() {
        let mut atm = Atmosphere::from(SeaLevel::with_temperature(273.0).unwrap());
        assert!(atm.density(0.0) > STANDARD_DENSITY);

        atm.reset();
        assert_eq!(atm, Atmosphere::standard());
    }

    #[test]
    fn profiles_decrease_with_altitude() {
        let atm = Atmosphere::standard();
        let mut previous = (atm.pressure(-4000.0), atm.density(-4000.0));
        for step in 1..=300 {
            let h = -4000.0 + f64::from(step) * 100.0;
            let current = (atm.pressure(h), atm.density(h));
            assert!(current.0 < previous.0, "pressure not decreasing at {h}");
            assert!(current.1 < previous.1, "density not decreasing at {h}");
            previous = current;
        }
    }

    #[test]
    fn temperature_falls_through_the_troposphere_and_holds_above_ceiling() {
        let atm = Atmosphere::standard();
        let mut previous = atm.temperature(-4000.0);
        for step in 1..=190 {
            let h = -4000.0 + f64::from(step) * 100.0;
            let current = atm.temperature(h);
            assert!(current < previous, "temperature not decreasing at {h}");
            previous = current;
        }

        // The fit flattens into the tropopause between 15 km and the ceiling.
        for step in 0..=33 {
            let h = 15_000.0 + f64::from(step) * 100.0;
            let t = atm.temperature(h);
            assert!((206.0..=219.0).contains(&t), "{t} K at {h}");
        }

        let at_ceiling = atm.temperature(POLYNOMIAL_CEILING);
        assert_relative_eq!(at_ceiling, 216.67, epsilon = 0.01);
        for h in [18_301.0, 20_000.0, 30_000.0, 60_000.0] {
            assert_eq!(atm.temperature(h), at_ceiling);
        }
    }

    #[test]
    fn pressure_decays_above_ceiling() {
        let atm = Atmosphere::standard();
        let at_ceiling = atm.pressure(POLYNOMIAL_CEILING);
        assert_relative_eq!(atm.pressure(2.0 * POLYNOMIAL_CEILING), at_ceiling / 2.0);
        assert_relative_eq!(
            atm.temperature(25_000.0),
            atm.temperature(POLYNOMIAL_CEILING)
        );
    }

    #[test]
    fn standard_values_near_isa() {
        let atm = Atmosphere::standard();
        // ISA: 54.0 kPa and 255.7 K at 5 km.
        assert_relative_eq!(atm.pressure(5000.0), 54_000.0, max_relative = 0.01);
        assert_relative_eq!(atm.temperature(5000.0), 255.7, max_relative = 0.01);
        assert_relative_eq!(atm.sonic_speed(0.0), 341.2, epsilon = 0.1);
    }

    #[test]
    fn altitude_round_trips_inside_fit() {
        let atm = Atmosphere::standard();
        for h in [250.0, 1000.0, 3000.0, 5700.0, 8000.0, 11_000.0] {
            let p = atm.pressure(h);
            let found = atm.altitude_from_pressure(p, DEFAULT_TOLERANCE, 0.0);
            assert_relative_eq!(found, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn altitude_round_trips_near_ceiling_from_nearby_start() {
        let atm = Atmosphere::standard();
        let p = atm.pressure(17_000.0);
        let found = atm.altitude_from_pressure(p, DEFAULT_TOLERANCE, 16_000.0);
        assert_relative_eq!(found, 17_000.0, epsilon = 1e-3);
    }

    #[test]
    fn low_pressure_uses_ceiling_extrapolation() {
        let atm = Atmosphere::standard();
        let h = 30_000.0;
        let found = atm.altitude_from_pressure(atm.pressure(h), DEFAULT_TOLERANCE, 0.0);
        assert_relative_eq!(found, h, max_relative = 1e-9);

        let huge = atm.altitude_from_pressure(0.0, DEFAULT_TOLERANCE, 0.0);
        assert!(huge > 1.0e9);
    }

    #[test]
    fn invalid_tolerance_falls_back_to_start() {
        let atm = Atmosphere::standard();
        assert_eq!(atm.altitude_from_pressure(80_000.0, 0.0, 123.0), 123.0);
        assert!(matches!(
            atm.try_altitude_from_pressure(80_000.0, -1.0, 0.0),
            Err(AtmosphereError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn ram_raises_equivalent_altitude_pressure() {
        let atm = Atmosphere::standard();
        assert_eq!(atm.ram_altitude(3000.0, 0.0, 1.0), 3000.0);

        let rammed = atm.ram_altitude(3000.0, 600.0, 1.0);
        assert!(rammed < 3000.0);
        assert_eq!(rammed, rammed.round());

        let total = atm.pressure(3000.0) + atm.ram_pressure(3000.0, 600.0, 1.0);
        assert_relative_eq!(atm.pressure(rammed), total, max_relative = 1e-3);
    }

    #[test]
    fn ias_equals_tas_at_standard_sea_level() {
        let atm = Atmosphere::standard();
        assert_relative_eq!(atm.tas_from_ias(400.0, 0.0), 400.0);
        assert!(atm.tas_from_ias(400.0, 6000.0) > 400.0);
    }

    #[test]
    fn viscosity_scales_with_temperature() {
        let atm = Atmosphere::standard();
        assert_relative_eq!(atm.viscosity(0.0), STANDARD_VISCOSITY);
        assert!(atm.viscosity(8000.0) < atm.viscosity(0.0));
        assert_relative_eq!(
            atm.kinematic_viscosity(0.0),
            STANDARD_VISCOSITY / STANDARD_DENSITY
        );
    }

    #[test]
    fn typed_accessors_agree_with_raw_values() {
        let atm = Atmosphere::standard();
        let h = Length::new::<kilometer>(4.0);

        assert_relative_eq!(atm.pressure_at(h).get::<pascal>(), atm.pressure(4000.0));
        assert_relative_eq!(atm.temperature_at(h).get::<kelvin>(), atm.temperature(4000.0));
        assert_relative_eq!(
            atm.altitude_at(atm.pressure_at(h)).get::<meter>(),
            4000.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn sea_level_from_quantities() {
        let sea_level = SeaLevel::from_quantities(
            Pressure::new::<kilopascal>(101.3),
            ThermodynamicTemperature::new::<degree_celsius>(20.0),
        )
        .unwrap();
        assert_relative_eq!(sea_level.pressure(), 101_300.0, epsilon = 1e-9);
        assert_relative_eq!(sea_level.temperature(), 293.15, epsilon = 1e-9);

        assert!(SeaLevel::new(f64::NAN, 288.0).is_err());
        assert!(matches!(
            SeaLevel::new(101_300.0, 0.0),
            Err(AtmosphereError::InvalidTemperature(_))
        ));
    }
}
