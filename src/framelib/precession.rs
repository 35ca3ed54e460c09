//! Precession of equatorial coordinates
//!
//! Uses the rigorous-enough approximation from Meeus (eq. 21.1) with the
//! annual rates m and n evaluated at the mid-point of the interval. Good to
//! a few arcseconds within a few centuries of J2000.

use crate::constants::{B1950, DEG2RAD, J2000, JULIAN_CENTURY};
use crate::spherical::normalize_angle;

/// Accumulated precession angles (m, n) in radians between J2000 and `jd`
fn precession_angles(jd: f64) -> (f64, f64) {
    let t = (jd - J2000) / JULIAN_CENTURY;
    let m = (1.281_232 * t + 0.000_388 * t * t) * DEG2RAD;
    let n = (0.556_753 * t + 0.000_119 * t * t) * DEG2RAD;
    (m, n)
}

/// Precess J2000 (ra, dec) to the equinox of `jd_new`
pub fn ra_dec_from_j2000(ra: f64, dec: f64, jd_new: f64) -> (f64, f64) {
    let (m, n) = precession_angles(jd_new);
    let ra_m = ra + 0.5 * (m + n * ra.sin() * dec.tan());
    let dec_m = dec + 0.5 * n * ra_m.cos();
    (
        normalize_angle(ra + m + n * ra_m.sin() * dec_m.tan()),
        dec + n * ra_m.cos(),
    )
}

/// Precess (ra, dec) referred to the equinox of `jd_old` back to J2000
pub fn ra_dec_to_j2000(ra: f64, dec: f64, jd_old: f64) -> (f64, f64) {
    let (m, n) = precession_angles(jd_old);
    let ra_m = ra - 0.5 * (m + n * ra.sin() * dec.tan());
    let dec_m = dec - 0.5 * n * ra_m.cos();
    (
        normalize_angle(ra - m - n * ra_m.sin() * dec_m.tan()),
        dec - n * ra_m.cos(),
    )
}

/// Move (ra, dec) from the equinox of `jd_in` to that of `jd_out`, via J2000
pub fn ra_dec_switch_epoch(ra: f64, dec: f64, jd_in: f64, jd_out: f64) -> (f64, f64) {
    let (ra, dec) = ra_dec_to_j2000(ra, dec, jd_in);
    ra_dec_from_j2000(ra, dec, jd_out)
}

/// Convert B1950 (ra, dec) to J2000
pub fn ra_dec_j2000_from_b1950(ra: f64, dec: f64) -> (f64, f64) {
    ra_dec_to_j2000(ra, dec, B1950)
}

/// Convert J2000 (ra, dec) to B1950
pub fn ra_dec_b1950_from_j2000(ra: f64, dec: f64) -> (f64, f64) {
    ra_dec_from_j2000(ra, dec, B1950)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ASEC2RAD, DEG2RAD};
    use crate::spherical::wrap_pi;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_at_j2000() {
        let (ra, dec) = ra_dec_from_j2000(1.0, 0.5, J2000);
        assert_abs_diff_eq!(ra, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(dec, 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_round_trip_over_a_century() {
        let jd = J2000 + 36_525.0;
        let (ra_e, dec_e) = ra_dec_from_j2000(2.2, -0.3, jd);
        let (ra, dec) = ra_dec_to_j2000(ra_e, dec_e, jd);
        // The half-step scheme is not an exact inverse, but it agrees to within an arcsecond or two
        assert_abs_diff_eq!(ra, 2.2, epsilon = 2.0 * ASEC2RAD);
        assert_abs_diff_eq!(dec, -0.3, epsilon = 2.0 * ASEC2RAD);
    }

    #[test]
    fn test_equinox_drifts_east() {
        // A point on the equator at RA 0 picks up m in RA after one century
        let (ra, _) = ra_dec_from_j2000(0.0, 0.0, J2000 + 36_525.0);
        assert_abs_diff_eq!(ra, 1.281_62 * DEG2RAD, epsilon = 1e-3 * DEG2RAD);
    }

    #[test]
    fn test_b1950_conversion() {
        // Precession from B1950 to J2000 is about 0.7 degrees in longitude
        let (ra, dec) = ra_dec_j2000_from_b1950(0.0, 0.0);
        assert!(ra > 0.6 * DEG2RAD && ra < 0.7 * DEG2RAD);
        assert!(dec > 0.25 * DEG2RAD && dec < 0.3 * DEG2RAD);

        let (ra_b, dec_b) = ra_dec_b1950_from_j2000(ra, dec);
        assert_abs_diff_eq!(wrap_pi(ra_b), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dec_b, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_switch_epoch_through_j2000() {
        let jd_a = J2000 - 10_000.0;
        let jd_b = J2000 + 5_000.0;
        let (ra_a, dec_a) = ra_dec_from_j2000(3.0, 0.8, jd_a);
        let (ra_b, dec_b) = ra_dec_switch_epoch(ra_a, dec_a, jd_a, jd_b);
        let (ra_direct, dec_direct) = ra_dec_from_j2000(3.0, 0.8, jd_b);
        assert_abs_diff_eq!(ra_b, ra_direct, epsilon = 1e-6);
        assert_abs_diff_eq!(dec_b, dec_direct, epsilon = 1e-6);
    }
}
