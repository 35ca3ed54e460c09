//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in meters (per IAU 2012 Resolution B2)
pub const AU_M: f64 = 149_597_870_700.0;
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// B1950 epoch as Julian date
pub const B1950: f64 = 2_433_282.4;
/// Julian date of the unix epoch (1970-01-01 00:00 UTC)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Days in a Julian century
pub const JULIAN_CENTURY: f64 = 36_525.0;

// Angles
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Mean obliquity of the ecliptic at J2000, in degrees
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_279_444_4;

// Physics
/// Speed of light in m/s
pub const C: f64 = 299_792_458.0;
/// Heliocentric gravitational constant in m^3/s^2
pub const GM_SUN: f64 = 1.327_124_400_412_794_19e20;
/// Gaussian gravitational constant (AU^1.5 / day)
pub const GAUSSIAN_K: f64 = 0.017_202_098_95;

// Earth-Moon system (DE405 GM values relative to the Sun)
/// Mass of the Earth in solar masses
pub const EARTH_MASS: f64 = 0.888_769_239_011_350_9e-9;
/// Mass of the Moon in solar masses
pub const MOON_MASS: f64 = 0.109_318_956_598_989_8e-10;

// Earth figure
/// WGS84 equatorial radius in meters
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 polar radius in meters
pub const WGS84_B: f64 = 6_356_752.314_245;

// Derived constants
/// Speed of light in AU/day
pub const C_AUDAY: f64 = C * DAY_S / AU_M;
/// Fraction of the Earth-Moon barycentre offset carried by the Moon
pub const MOON_MASS_FRACTION: f64 = MOON_MASS / (MOON_MASS + EARTH_MASS);

// Calendar constants
/// First day of Gregorian calendar in England (1752-09-14), as a Julian date
pub const GREGORIAN_START_ENGLAND: f64 = 2_361_222.0;
/// Last Julian calendar date in England, encoded as YYYYMMDD
pub const LAST_JULIAN_DATE: f64 = 17_520_902.0;
/// First Gregorian calendar date in England, encoded as YYYYMMDD
pub const FIRST_GREGORIAN_DATE: f64 = 17_520_914.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moon_mass_fraction() {
        assert_relative_eq!(MOON_MASS_FRACTION, 0.012_150_58, epsilon = 1e-7);
        assert_relative_eq!(MOON_MASS / EARTH_MASS, 0.012_300_02, epsilon = 1e-7);
    }

    #[test]
    fn test_light_speed_au_per_day() {
        assert_relative_eq!(C_AUDAY, 173.144_632_674, epsilon = 1e-6);
    }
}
