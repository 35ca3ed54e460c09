//! Fixed rotation between the J2000 equator and the J2000 ecliptic

use lazy_static::lazy_static;
use nalgebra::{Rotation3, Vector3};

use crate::constants::{DEG2RAD, OBLIQUITY_J2000_DEG};

lazy_static! {
    /// Rotation taking ecliptic vectors into the equatorial frame
    static ref EC_TO_EQ: Rotation3<f64> =
        Rotation3::from_axis_angle(&Vector3::x_axis(), OBLIQUITY_J2000_DEG * DEG2RAD);

    /// Rotation taking equatorial vectors into the ecliptic frame
    static ref EQ_TO_EC: Rotation3<f64> = EC_TO_EQ.inverse();
}

/// Rotate a J2000 ecliptic vector into J2000 equatorial coordinates
pub fn ecliptic_to_equatorial(v: &Vector3<f64>) -> Vector3<f64> {
    *EC_TO_EQ * v
}

/// Rotate a J2000 equatorial vector into J2000 ecliptic coordinates
pub fn equatorial_to_ecliptic(v: &Vector3<f64>) -> Vector3<f64> {
    *EQ_TO_EC * v
}
