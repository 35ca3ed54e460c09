//! Brightness, phase, angular size and viewing geometry of a body
//!
//! Inputs are barycentric J2000 equatorial positions in AU of the body, the
//! Earth and the Sun. Planets use empirical magnitude laws where published
//! (Hilton 2005 for Mercury and Venus, Meeus for Mars and Saturn) and a
//! reflected-sunlight estimate otherwise. Asteroids and comets use their
//! catalogued absolute magnitude and slope parameters.

use nalgebra::Vector3;

use crate::constants::{AU_M, DEG2RAD, J2000, RAD2DEG, WGS84_A, WGS84_B};
use crate::elements::OrbitalElements;
use crate::framelib::{equatorial_to_ecliptic, ra_dec_from_j2000, ra_dec_to_j2000};
use crate::planetlib::{BodyId, Planet};
use crate::spherical::{ang_dist_abc, vector_to_radec, wrap_pi};
use crate::time::sidereal_time;
use std::f64::consts::PI;

/// Absolute magnitude of the Sun
const SUN_ABSOLUTE_MAG: f64 = 4.83;
/// One AU expressed in units of 10 parsecs
const TEN_PARSECS_IN_AU: f64 = 2_062_650.0;
/// North pole of Saturn's rings, J2000 equatorial unit vector
const SATURN_POLE: [f64; 3] = [0.085_625_284_413_930_1, 0.073_300_635_717_729_2, 0.993_627_358_456_081_5];

/// Everything derived from the three positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Radians, referred to the requested epoch
    pub ra: f64,
    pub dec: f64,
    pub magnitude: f64,
    /// Illuminated fraction, 0 to 1
    pub phase: f64,
    /// Angular diameter, arcseconds
    pub angular_size: f64,
    /// Diameter, metres
    pub physical_size: f64,
    pub albedo: f64,
    /// AU
    pub sun_distance: f64,
    /// AU
    pub earth_distance: f64,
    /// Elongation: angle Object-Earth-Sun, radians
    pub sun_angular_distance: f64,
    /// Angle Earth-Sun-Object, radians, negative when the object trails the Sun in ecliptic longitude
    pub theta_eso: f64,
    pub ecliptic_longitude: f64,
    pub ecliptic_latitude: f64,
    /// Ecliptic longitude of the object minus that of the Sun, wrapped to ±π
    pub ecliptic_distance: f64,
}

/// Offset in AU from the Earth's centre to a point on the WGS84 surface, J2000 equatorial
///
/// `latitude` and `longitude` are geodetic, in degrees.
pub fn topocentric_offset(latitude: f64, longitude: f64, jd: f64) -> Vector3<f64> {
    let sidereal_deg = sidereal_time(jd) * 15.0;
    let lat = latitude * DEG2RAD;
    let lng = (longitude + sidereal_deg) * DEG2RAD;

    let n = WGS84_A * WGS84_A / ((WGS84_A * lat.cos()).powi(2) + (WGS84_B * lat.sin()).powi(2)).sqrt();
    let surface = Vector3::new(
        n * lng.cos() * lat.cos(),
        n * lng.sin() * lat.cos(),
        (WGS84_B / WGS84_A).powi(2) * n * lat.sin(),
    );
    let radius = surface.norm();
    let (ra_of_date, dec_of_date) = vector_to_radec(&surface);
    let (ra, dec) = ra_dec_to_j2000(ra_of_date, dec_of_date, jd);
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()) * (radius / AU_M)
}

/// Magnitude of a body shining by reflected sunlight, from its size and albedo
///
/// Distances are in AU and the radius in metres.
pub fn reflected_light_magnitude(sun_distance: f64, earth_distance: f64, radius: f64, albedo: f64, phase: f64) -> f64 {
    let radius_au = radius / AU_M;
    SUN_ABSOLUTE_MAG
        + 5.0
            * (sun_distance * earth_distance / radius_au / albedo.sqrt() / phase.sqrt() / TEN_PARSECS_IN_AU)
                .log10()
}

/// Magnitude of an asteroid or comet from its absolute magnitude and slope parameters
///
/// `theta` is the phase angle Earth-Object-Sun in radians. The H,G phase law
/// is applied when `slope_g` is known (above -100); otherwise the brightness
/// scales with the illuminated fraction.
pub fn minor_body_magnitude(elements: &OrbitalElements, sun_distance: f64, earth_distance: f64, theta: f64, phase: f64) -> f64 {
    let mut magnitude = elements.absolute_mag
        + 5.0 * earth_distance.log10()
        + 2.5 * elements.slope_n * sun_distance.log10();
    if elements.slope_g > -100.0 {
        let g = elements.slope_g;
        let half_tan = (theta / 2.0).tan();
        let phi_1 = (-3.33 * half_tan.powf(0.63)).exp();
        let phi_2 = (-1.87 * half_tan.powf(1.22)).exp();
        magnitude -= 2.5 * ((1.0 - g) * phi_1 + g * phi_2).log10();
    } else {
        magnitude -= 2.5 * phase.log10();
    }
    magnitude
}

fn planet_magnitude(planet: Planet, geometry: &Geometry, theta: f64, phase: f64, radius: f64, albedo: f64) -> f64 {
    let theta_deg = theta * RAD2DEG;
    let distance_term = 5.0 * (geometry.sun_distance * geometry.earth_distance).log10();
    let x = theta_deg / 100.0;
    match planet {
        Planet::Mercury => distance_term - 0.60 + 4.98 * x - 4.88 * x * x + 3.02 * x * x * x,
        Planet::Venus => distance_term - 4.4 + 0.09 * x + 2.39 * x * x - 0.65 * x * x * x,
        Planet::Mars => -1.52 + distance_term + 0.016 * theta_deg,
        Planet::Saturn => {
            // Ring tilt as seen from the Earth
            let pole = Vector3::from(SATURN_POLE);
            let from_earth = geometry.object - geometry.earth_geocentre;
            let b = (PI / 2.0 - (from_earth.dot(&pole) / from_earth.norm()).acos()).abs();
            -8.88 + distance_term + 0.0044 * theta_deg.abs() - 2.60 * b.sin() + 1.25 * b.sin().powi(2)
        }
        _ => reflected_light_magnitude(geometry.sun_distance, geometry.earth_distance, radius, albedo, phase),
    }
}

struct Geometry {
    object: Vector3<f64>,
    earth_geocentre: Vector3<f64>,
    sun_distance: f64,
    earth_distance: f64,
}

/// Observer placement and output frame for [`estimate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Julian date of the observation
    pub jd: f64,
    /// Epoch of the output RA/Dec; J2000 leaves them unprecessed
    pub ra_dec_epoch: f64,
    /// Geodetic (latitude, longitude) in degrees for a topocentric view
    pub observer: Option<(f64, f64)>,
}

/// Derive magnitude, phase, size and viewing angles of a body
///
/// `object`, `earth` and `sun` are barycentric J2000 equatorial positions in AU.
/// `elements` supplies the photometric parameters of asteroids and comets.
pub fn estimate(
    body: BodyId,
    elements: Option<&OrbitalElements>,
    object: &Vector3<f64>,
    earth: &Vector3<f64>,
    sun: &Vector3<f64>,
    view: &ViewOptions,
) -> Appearance {
    let observer = match view.observer {
        Some((latitude, longitude)) => earth + topocentric_offset(latitude, longitude, view.jd),
        None => *earth,
    };

    let sun_distance = (sun - object).norm();
    let earth_distance = (observer - object).norm();
    let theta = ang_dist_abc(&observer, object, sun);
    let mut phase = if body.is_comet() {
        1.0
    } else {
        (1.0 + theta.cos()) / 2.0
    };

    let geometry = Geometry {
        object: *object,
        earth_geocentre: *earth,
        sun_distance,
        earth_distance,
    };

    let (mut magnitude, radius, albedo) = match (body.physical_properties(), body) {
        (Some(props), BodyId::Planet(planet)) => (
            planet_magnitude(planet, &geometry, theta, phase, props.radius, props.albedo),
            props.radius,
            props.albedo,
        ),
        (Some(props), _) => (
            reflected_light_magnitude(sun_distance, earth_distance, props.radius, props.albedo, phase),
            props.radius,
            props.albedo,
        ),
        (None, _) => {
            let magnitude = match elements {
                Some(elements) => minor_body_magnitude(elements, sun_distance, earth_distance, theta, phase),
                None => f64::NAN,
            };
            (magnitude, f64::NAN, f64::NAN)
        }
    };

    let radius_au = radius / AU_M;
    let mut angular_size = 2.0 * (radius_au / earth_distance).atan() * RAD2DEG * 3600.0;
    let sun_angular_distance = ang_dist_abc(object, &observer, sun);
    let mut theta_eso = ang_dist_abc(&observer, sun, object);

    match body {
        BodyId::Sun => {
            phase = 1.0;
            magnitude = SUN_ABSOLUTE_MAG + 5.0 * (earth_distance / TEN_PARSECS_IN_AU).log10();
        }
        BodyId::Earth => {
            phase = 1.0;
            angular_size = 180.0 * 3600.0;
            magnitude = f64::NAN;
        }
        _ => {}
    }

    let relative = object - observer;
    let (mut ra, mut dec) = vector_to_radec(&relative);

    let object_ecliptic = equatorial_to_ecliptic(&relative);
    let sun_ecliptic = equatorial_to_ecliptic(&(sun - observer));
    let ecliptic_longitude = object_ecliptic.y.atan2(object_ecliptic.x);
    let ecliptic_latitude = (object_ecliptic.z / object_ecliptic.norm()).asin();
    let ecliptic_distance = wrap_pi(ecliptic_longitude - sun_ecliptic.y.atan2(sun_ecliptic.x));
    if ecliptic_distance < 0.0 {
        theta_eso = -theta_eso;
    }

    if view.ra_dec_epoch != J2000 {
        let (ra_epoch, dec_epoch) = ra_dec_from_j2000(ra, dec, view.ra_dec_epoch);
        ra = ra_epoch;
        dec = dec_epoch;
    }

    Appearance {
        ra,
        dec,
        magnitude,
        phase,
        angular_size,
        physical_size: 2.0 * radius,
        albedo,
        sun_distance,
        earth_distance,
        sun_angular_distance,
        theta_eso,
        ecliptic_longitude,
        ecliptic_latitude,
        ecliptic_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn geocentric_view() -> ViewOptions {
        ViewOptions {
            jd: J2000,
            ra_dec_epoch: J2000,
            observer: None,
        }
    }

    fn asteroid() -> OrbitalElements {
        OrbitalElements {
            absolute_mag: 3.34,
            slope_g: 0.12,
            ..OrbitalElements::default()
        }
    }

    #[test]
    fn test_sun_at_one_au() {
        let appearance = estimate(
            BodyId::Sun,
            None,
            &Vector3::zeros(),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::zeros(),
            &geocentric_view(),
        );
        assert_abs_diff_eq!(appearance.magnitude, -26.74, epsilon = 0.01);
        assert_eq!(appearance.phase, 1.0);
        // 2 atan(R/1 AU) for R = 696000 km
        assert_abs_diff_eq!(appearance.angular_size, 1919.3, epsilon = 0.2);
        assert_abs_diff_eq!(appearance.ra, PI, epsilon = 1e-12);
    }

    #[test]
    fn test_opposition_geometry() {
        // Sun, Earth and object in a line along +y
        let appearance = estimate(
            BodyId::Planet(Planet::Jupiter),
            None,
            &Vector3::new(0.0, 5.2, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
            &Vector3::zeros(),
            &geocentric_view(),
        );
        assert_abs_diff_eq!(appearance.phase, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(appearance.sun_angular_distance, PI, epsilon = 1e-6);
        assert_abs_diff_eq!(appearance.ra, PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(appearance.dec, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(appearance.earth_distance, 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(appearance.physical_size, 2.0 * 6.9911e7, epsilon = 1.0);
        assert!(appearance.magnitude < -2.0 && appearance.magnitude > -3.5);
    }

    #[rstest]
    #[case(1.0, 2.0)]
    #[case(2.0, 4.0)]
    #[case(0.5, 0.6)]
    fn test_fainter_when_further(#[case] near: f64, #[case] far: f64) {
        let bright = reflected_light_magnitude(5.2, near, 6.9911e7, 0.52, 1.0);
        let faint = reflected_light_magnitude(5.2, far, 6.9911e7, 0.52, 1.0);
        assert!(faint > bright);

        let elements = asteroid();
        assert!(minor_body_magnitude(&elements, 2.7, far, 0.2, 0.99) > minor_body_magnitude(&elements, 2.7, near, 0.2, 0.99));
    }

    #[test]
    fn test_brighter_with_albedo() {
        let dull = reflected_light_magnitude(1.5, 0.8, 1.0e6, 0.1, 0.9);
        let shiny = reflected_light_magnitude(1.5, 0.8, 1.0e6, 0.4, 0.9);
        // Four times the albedo is 2.5 log10(4) magnitudes brighter
        assert_abs_diff_eq!(dull - shiny, 2.5 * 4f64.log10(), epsilon = 1e-12);
    }

    #[test]
    fn test_minor_body_phase_laws() {
        let elements = asteroid();
        // At zero phase angle the H,G law adds nothing
        let full = minor_body_magnitude(&elements, 2.0, 1.0, 0.0, 1.0);
        assert_abs_diff_eq!(full, 3.34 + 2.5 * 2.0 * 2f64.log10(), epsilon = 1e-12);
        assert!(minor_body_magnitude(&elements, 2.0, 1.0, 0.5, 0.94) > full);

        let no_g = OrbitalElements {
            slope_g: -999.0,
            ..elements
        };
        assert_abs_diff_eq!(
            minor_body_magnitude(&no_g, 2.0, 1.0, 0.5, 0.5),
            full + 2.5 * 2f64.log10(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_comet_full_phase_and_no_size() {
        let appearance = estimate(
            BodyId::Comet(0),
            Some(&asteroid()),
            &Vector3::new(1.0, 1.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::zeros(),
            &geocentric_view(),
        );
        assert_eq!(appearance.phase, 1.0);
        assert!(appearance.angular_size.is_nan());
        assert!(appearance.magnitude.is_finite());
    }

    #[test]
    fn test_earth_special_case() {
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let appearance = estimate(BodyId::Earth, None, &earth, &earth, &Vector3::zeros(), &geocentric_view());
        assert!(appearance.magnitude.is_nan());
        assert_eq!(appearance.angular_size, 648_000.0);
        assert_eq!(appearance.phase, 1.0);
    }

    #[test]
    fn test_theta_eso_sign_follows_ecliptic_side() {
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let sun = Vector3::zeros();
        let leading = estimate(BodyId::Asteroid(0), Some(&asteroid()), &Vector3::new(0.0, 1.5, 0.0), &earth, &sun, &geocentric_view());
        let trailing = estimate(BodyId::Asteroid(0), Some(&asteroid()), &Vector3::new(0.0, -1.5, 0.0), &earth, &sun, &geocentric_view());
        assert!(leading.ecliptic_distance.abs() <= PI);
        assert_eq!(leading.theta_eso.signum(), leading.ecliptic_distance.signum());
        assert_eq!(trailing.theta_eso.signum(), trailing.ecliptic_distance.signum());
        assert_abs_diff_eq!(leading.theta_eso.abs(), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_topocentric_offset() {
        let equator = topocentric_offset(0.0, 0.0, J2000);
        assert_abs_diff_eq!(equator.norm() * AU_M, WGS84_A, epsilon = 1.0);
        let pole = topocentric_offset(90.0, 0.0, J2000);
        assert_abs_diff_eq!(pole.norm() * AU_M, WGS84_B, epsilon = 1.0);
        assert!(pole.z > 0.99 * pole.norm());
    }

    #[test]
    fn test_requested_epoch_precesses() {
        let view = ViewOptions {
            ra_dec_epoch: J2000 + 36_525.0,
            ..geocentric_view()
        };
        let j2000 = estimate(BodyId::Asteroid(0), Some(&asteroid()), &Vector3::new(0.3, 2.0, 0.4), &Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros(), &geocentric_view());
        let later = estimate(BodyId::Asteroid(0), Some(&asteroid()), &Vector3::new(0.3, 2.0, 0.4), &Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros(), &view);
        // A century of precession moves RA by roughly a degree and a half
        assert!((later.ra - j2000.ra).abs() > 0.01);
        assert_abs_diff_eq!(later.earth_distance, j2000.earth_distance, epsilon = 1e-15);
    }
}
