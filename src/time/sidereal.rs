//! Greenwich mean sidereal time (Meeus, Astronomical Algorithms, eq. 12.4)

use crate::constants::{J2000, JULIAN_CENTURY};

use super::jd_from_unix;

/// Greenwich mean sidereal time, in hours, at unix time `unix`
///
/// This is the right ascension on the Greenwich meridian.
pub fn sidereal_time_unix(unix: f64) -> f64 {
    sidereal_time(jd_from_unix(unix))
}

/// Greenwich mean sidereal time, in hours [0, 24), at Julian date `jd`
pub fn sidereal_time(jd: f64) -> f64 {
    let d = jd - J2000;
    let t = d / JULIAN_CENTURY;
    let st = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    st.rem_euclid(360.0) * 12.0 / 180.0
}
