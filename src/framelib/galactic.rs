//! Equatorial to galactic coordinates (Binney & Merrifield, pp. 30-31)

use crate::constants::DEG2RAD;
use crate::spherical::normalize_angle;

/// Galactic longitude of the north celestial pole
const L_CP: f64 = 123.932 * DEG2RAD;
/// Right ascension of the north galactic pole
const RA_GP: f64 = 192.859_48 * DEG2RAD;
/// Declination of the north galactic pole
const DEC_GP: f64 = 27.128_25 * DEG2RAD;

/// Convert (ra, dec) into galactic (l, b), with l in [0, 2pi)
pub fn galactic_project(ra: f64, dec: f64) -> (f64, f64) {
    let b = (dec.sin() * DEC_GP.sin() + DEC_GP.cos() * dec.cos() * (ra - RA_GP).cos())
        .clamp(-1.0, 1.0)
        .asin();
    let l_sin = dec.cos() * (ra - RA_GP).sin();
    let l_cos = DEC_GP.cos() * dec.sin() - DEC_GP.sin() * dec.cos() * (ra - RA_GP).cos();
    let l = L_CP - l_sin.atan2(l_cos);
    (normalize_angle(l), b)
}

/// Convert galactic (l, b) back into (ra, dec), with ra in [0, 2pi)
pub fn inv_galactic_project(l: f64, b: f64) -> (f64, f64) {
    let dec = (b.sin() * DEC_GP.sin() + DEC_GP.cos() * b.cos() * (L_CP - l).cos())
        .clamp(-1.0, 1.0)
        .asin();
    let r_sin = b.cos() * (L_CP - l).sin();
    let r_cos = DEC_GP.cos() * b.sin() - DEC_GP.sin() * b.cos() * (L_CP - l).cos();
    let ra = RA_GP + r_sin.atan2(r_cos);
    (normalize_angle(ra), dec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_galactic_pole() {
        let (_, b) = galactic_project(RA_GP, DEC_GP);
        assert_abs_diff_eq!(b, FRAC_PI_2, epsilon = 1e-7);
    }

    #[test]
    fn test_celestial_pole_longitude() {
        let (l, _) = galactic_project(0.0, FRAC_PI_2);
        assert_abs_diff_eq!(l, L_CP, epsilon = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let ra = rng.gen_range(0.0..crate::constants::TAU);
            let dec = rng.gen_range(-1.5..1.5);
            let (l, b) = galactic_project(ra, dec);
            let (ra_back, dec_back) = inv_galactic_project(l, b);
            assert_abs_diff_eq!(crate::spherical::wrap_pi(ra_back - ra), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(dec_back, dec, epsilon = 1e-9);
        }
    }
}
