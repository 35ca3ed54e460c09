//! Spherical trigonometry on the celestial sphere
//!
//! All angles are in radians. Positions are (RA, Dec) pairs or unit vectors in
//! the frame where +x points at RA 0, +z at the north pole.

use nalgebra::Vector3;

use crate::constants::TAU;

/// Unit vector for a point at the given right ascension and declination
pub fn radec_to_vector(ra: f64, dec: f64) -> Vector3<f64> {
    Vector3::new(ra.cos() * dec.cos(), ra.sin() * dec.cos(), dec.sin())
}

/// Right ascension (in [0, 2pi)) and declination of a vector of any length
pub fn vector_to_radec(v: &Vector3<f64>) -> (f64, f64) {
    let ra = normalize_angle(v.y.atan2(v.x));
    let dec = v.z.atan2(v.x.hypot(v.y));
    (ra, dec)
}

/// Wrap an angle into [0, 2pi)
pub fn normalize_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle into [-pi, pi)
pub fn wrap_pi(theta: f64) -> f64 {
    normalize_angle(theta + std::f64::consts::PI) - std::f64::consts::PI
}

/// Angle ABC subtended at vertex `b` by the points `a` and `c`
///
/// Uses the law of cosines on the three side lengths, so the vectors need not
/// be normalised.
pub fn ang_dist_abc(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let ab = (a - b).norm();
    let bc = (c - b).norm();
    let ac = (a - c).norm();
    if ab == 0.0 || bc == 0.0 {
        return f64::NAN;
    }
    let cos_b = ((ab * ab + bc * bc - ac * ac) / (2.0 * ab * bc)).clamp(-1.0, 1.0);
    cos_b.acos()
}

/// Great-circle separation of two points on the sphere
///
/// Computed from the chord length, which stays accurate for tiny separations.
pub fn ang_dist_radec(ra0: f64, dec0: f64, ra1: f64, dec1: f64) -> f64 {
    let chord = (radec_to_vector(ra0, dec0) - radec_to_vector(ra1, dec1)).norm();
    2.0 * (chord / 2.0).min(1.0).asin()
}

/// Rotate a vector about the z axis by `theta`
pub fn rotate_xy(v: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    let (s, c) = theta.sin_cos();
    Vector3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Rotate a vector about the y axis by `theta`, moving +x towards +z
pub fn rotate_xz(v: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    let (s, c) = theta.sin_cos();
    Vector3::new(v.x * c - v.z * s, v.y, v.x * s + v.z * c)
}

/// Position angle of point 2 as seen from point 1, measured from north through east
pub fn position_angle(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let a = radec_to_vector(ra2, dec2);
    let a = rotate_xy(&a, -ra1);
    let a = rotate_xz(&a, std::f64::consts::FRAC_PI_2 - dec1);
    a.y.atan2(-a.x)
}

/// Point at angular distance `dist` from (ra1, dec1) along position angle `pa`
pub fn inv_position_angle(ra1: f64, dec1: f64, pa: f64, dist: f64) -> (f64, f64) {
    let a = Vector3::new(-pa.cos() * dist.sin(), pa.sin() * dist.sin(), dist.cos());
    let a = rotate_xz(&a, dec1 - std::f64::consts::FRAC_PI_2);
    let a = rotate_xy(&a, ra1);
    vector_to_radec(&a)
}

/// Zenith angle and azimuth of (ra, dec) in a frame whose pole is (ra0, dec0)
///
/// The azimuth is measured so that rotating the chart by a position angle is a
/// plain subtraction. At the pole itself the azimuth is zero.
pub fn make_zenithal(ra: f64, dec: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    let a = radec_to_vector(ra, dec);
    let a = rotate_xy(&a, -ra0);
    let a = rotate_xz(&a, std::f64::consts::FRAC_PI_2 - dec0);
    let horizontal = a.x.hypot(a.y);
    let zenith_angle = horizontal.atan2(a.z);
    let azimuth = if horizontal == 0.0 { 0.0 } else { a.y.atan2(a.x) };
    (zenith_angle, azimuth)
}

/// Inverse of [`make_zenithal`]
pub fn inv_make_zenithal(zenith_angle: f64, azimuth: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    let a = Vector3::new(
        zenith_angle.sin() * azimuth.cos(),
        zenith_angle.sin() * azimuth.sin(),
        zenith_angle.cos(),
    );
    let a = rotate_xz(&a, dec0 - std::f64::consts::FRAC_PI_2);
    let a = rotate_xy(&a, ra0);
    vector_to_radec(&a)
}

/// Mean position of a set of (ra, dec) points, taken as the direction of their vector sum
///
/// Returns `None` for an empty set or points that cancel out exactly.
pub fn find_mean_position(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let sum = points
        .iter()
        .filter(|(ra, dec)| ra.is_finite() && dec.is_finite())
        .fold(Vector3::zeros(), |acc, &(ra, dec)| acc + radec_to_vector(ra, dec));
    if sum.norm() == 0.0 {
        return None;
    }
    Some(vector_to_radec(&sum))
}
