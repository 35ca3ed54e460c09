//! Low-precision solar position (Meeus, Astronomical Algorithms, ch. 25)

use crate::constants::{DEG2RAD, J2000, JULIAN_CENTURY};
use crate::framelib::ra_dec_to_j2000;

/// Apparent geocentric (ra, dec) of the Sun at `jd`, referred to J2000, in radians
///
/// Accurate to about 0.01 degree, which is enough for twilight shading and
/// for sanity-checking the full ephemeris.
pub fn sun_pos(jd: f64) -> (f64, f64) {
    let t = (jd - J2000) / JULIAN_CENTURY;
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t) * DEG2RAD;

    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let true_longitude = (l0 + c) * DEG2RAD;

    let epsilon = (23.0 + 26.0 / 60.0 + 21.448 / 3600.0 - 46.8150 / 3600.0 * t
        - 0.00059 / 3600.0 * t * t
        + 0.001813 / 3600.0 * t * t * t)
        * DEG2RAD;

    let ra_epoch = (epsilon.cos() * true_longitude.sin()).atan2(true_longitude.cos());
    let dec_epoch = (epsilon.sin() * true_longitude.sin()).asin();

    ra_dec_to_j2000(ra_epoch, dec_epoch, jd)
}
