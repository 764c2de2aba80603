//! Airspeed conversions that do not depend on altitude.

const HEAT_CAPACITY_RATIO: f64 = 1.4;
const GAS_CONSTANT: f64 = 287.053;

/// Converts km/h to m/s.
#[must_use]
pub fn kph_to_mps(speed_kph: f64) -> f64 {
    speed_kph / 3.6
}

/// Converts m/s to km/h.
#[must_use]
pub fn mps_to_kph(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

/// Mach number for a true airspeed (m/s) at a static temperature (K).
#[must_use]
pub fn mach_from_tas(tas_mps: f64, temperature: f64) -> f64 {
    tas_mps / (HEAT_CAPACITY_RATIO * GAS_CONSTANT * temperature).sqrt()
}

/// True airspeed (m/s) for a Mach number at a static temperature (K).
#[must_use]
pub fn tas_from_mach(mach: f64, temperature: f64) -> f64 {
    mach * (HEAT_CAPACITY_RATIO * GAS_CONSTANT * temperature).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn speed_of_sound_at_standard_temperature() {
        assert_relative_eq!(tas_from_mach(1.0, 288.15), 340.29, epsilon = 0.01);
    }

    #[test]
    fn mach_and_tas_are_inverse() {
        let tas = tas_from_mach(0.8, 230.0);
        assert_relative_eq!(mach_from_tas(tas, 230.0), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn kph_mps_conversion() {
        assert_relative_eq!(kph_to_mps(360.0), 100.0);
        assert_relative_eq!(mps_to_kph(10.0), 36.0);
    }
}
