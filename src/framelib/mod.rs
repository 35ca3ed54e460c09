//! Reference frame conversions
//!
//! - `precession`: J2000 / epoch-of-date / B1950 equatorial coordinates
//! - `galactic`: equatorial to galactic (l, b) and back
//! - `horizontal`: equatorial to local altitude/azimuth and back
//! - `ecliptic`: fixed J2000 equator/ecliptic rotation

pub mod ecliptic;
pub mod galactic;
pub mod horizontal;
pub mod precession;

pub use ecliptic::{ecliptic_to_equatorial, equatorial_to_ecliptic};
pub use galactic::{galactic_project, inv_galactic_project};
pub use horizontal::{alt_az, get_zenith_position, inv_alt_az};
pub use precession::{
    ra_dec_b1950_from_j2000, ra_dec_from_j2000, ra_dec_j2000_from_b1950, ra_dec_switch_epoch,
    ra_dec_to_j2000,
};
