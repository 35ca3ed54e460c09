//! Local horizontal (altitude / azimuth) coordinates
//!
//! Latitudes and longitudes are in degrees (east positive); everything else
//! in radians. Azimuth is measured from north through east. Positions are
//! taken to be referred to the equinox of date.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::constants::DEG2RAD;
use crate::spherical::{inv_make_zenithal, make_zenithal, normalize_angle};
use crate::time::sidereal_time;

/// (ra, dec) of the observer's zenith at Julian date `jd`
pub fn get_zenith_position(latitude: f64, longitude: f64, jd: f64) -> (f64, f64) {
    let st = sidereal_time(jd) * PI / 12.0;
    let ra = normalize_angle(longitude * DEG2RAD + st);
    let dec = latitude * DEG2RAD;
    (ra, dec)
}

/// Altitude and azimuth of (ra, dec) for an observer at (latitude, longitude)
pub fn alt_az(ra: f64, dec: f64, jd: f64, latitude: f64, longitude: f64) -> (f64, f64) {
    let (ra_z, dec_z) = get_zenith_position(latitude, longitude, jd);
    let (zenith_angle, azimuth) = make_zenithal(ra, dec, ra_z, dec_z);
    (FRAC_PI_2 - zenith_angle, normalize_angle(PI - azimuth))
}

/// Inverse of [`alt_az`]
pub fn inv_alt_az(alt: f64, az: f64, jd: f64, latitude: f64, longitude: f64) -> (f64, f64) {
    let (ra_z, dec_z) = get_zenith_position(latitude, longitude, jd);
    inv_make_zenithal(FRAC_PI_2 - alt, PI - az, ra_z, dec_z)
}
