//! Sources of Earth, Moon and Sun positions
//!
//! The ephemeris engine asks an oracle for the barycentric Earth-Moon
//! barycentre, the geocentric Moon and the barycentric Sun. [`SpkOracle`]
//! reads them from a JPL DE kernel; [`MeanElementOracle`] computes them
//! analytically when no kernel is available.

use nalgebra::Vector3;
use std::path::Path;

use super::spk::SPK;
use crate::constants::{AU_KM, DEG2RAD, J2000, JULIAN_CENTURY};
use crate::framelib::ecliptic_to_equatorial;
use crate::kepler::solve_elliptic;
use crate::Result;

/// NAIF ids used by DE kernels
const SSB: i32 = 0;
const EMB: i32 = 3;
const SUN: i32 = 10;
const MOON: i32 = 301;
const EARTH: i32 = 399;

/// Positions of the Earth-Moon system and the Sun, in AU, J2000 equatorial
pub trait BodyOracle: Send + Sync {
    /// Earth-Moon barycentre relative to the solar-system barycentre
    fn emb(&self, jd: f64) -> Result<Vector3<f64>>;

    /// Moon relative to the Earth's centre
    fn moon_geocentric(&self, jd: f64) -> Result<Vector3<f64>>;

    /// Sun relative to the solar-system barycentre
    fn sun_barycentric(&self, jd: f64) -> Result<Vector3<f64>>;

    /// Short description for log messages
    fn describe(&self) -> String;
}

/// Oracle backed by a JPL SPK kernel such as DE421 or DE440
pub struct SpkOracle {
    spk: SPK,
    description: String,
}

impl SpkOracle {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let spk = SPK::open(path)?;
        let description = format!("JPL kernel {} ({} segments)", path.display(), spk.segments.len());
        Ok(Self { spk, description })
    }

    fn position_au(&self, center: i32, target: i32, jd: f64) -> Result<Vector3<f64>> {
        Ok(self.spk.position(center, target, jd)? / AU_KM)
    }
}

impl BodyOracle for SpkOracle {
    fn emb(&self, jd: f64) -> Result<Vector3<f64>> {
        self.position_au(SSB, EMB, jd)
    }

    fn moon_geocentric(&self, jd: f64) -> Result<Vector3<f64>> {
        Ok(self.position_au(EMB, MOON, jd)? - self.position_au(EMB, EARTH, jd)?)
    }

    fn sun_barycentric(&self, jd: f64) -> Result<Vector3<f64>> {
        self.position_au(SSB, SUN, jd)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Analytic oracle used when no kernel is configured
///
/// The Earth-Moon barycentre follows Standish's J2000 mean elements (valid
/// 1800-2050, errors of order 20"), the Moon follows the leading terms of
/// Meeus chapter 47, and the Sun sits at the barycentre.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanElementOracle;

impl MeanElementOracle {
    pub fn new() -> Self {
        MeanElementOracle
    }
}

impl BodyOracle for MeanElementOracle {
    fn emb(&self, jd: f64) -> Result<Vector3<f64>> {
        Ok(emb_mean_elements(jd))
    }

    fn moon_geocentric(&self, jd: f64) -> Result<Vector3<f64>> {
        let (longitude, latitude, distance_km) = moon_ecliptic_of_date(jd);
        // Refer the longitude back to the J2000 equinox
        let t = (jd - J2000) / JULIAN_CENTURY;
        let longitude = longitude - 1.396_971_3 * DEG2RAD * t;
        let r = distance_km / AU_KM;
        let ecliptic = Vector3::new(
            r * latitude.cos() * longitude.cos(),
            r * latitude.cos() * longitude.sin(),
            r * latitude.sin(),
        );
        Ok(ecliptic_to_equatorial(&ecliptic))
    }

    fn sun_barycentric(&self, _jd: f64) -> Result<Vector3<f64>> {
        Ok(Vector3::zeros())
    }

    fn describe(&self) -> String {
        "analytic mean elements".to_string()
    }
}

/// Heliocentric J2000 equatorial position of the Earth-Moon barycentre, AU
fn emb_mean_elements(jd: f64) -> Vector3<f64> {
    let t = (jd - J2000) / JULIAN_CENTURY;
    let a = 1.000_002_61 + 0.000_005_62 * t;
    let e = 0.016_711_23 - 0.000_043_92 * t;
    let inclination = (-0.000_015_31 - 0.012_946_68 * t) * DEG2RAD;
    let mean_longitude = (100.464_571_66 + 35_999.372_449_81 * t) * DEG2RAD;
    let long_perihelion = (102.937_681_93 + 0.323_273_64 * t) * DEG2RAD;
    let long_node = 0.0f64;

    let mean_anomaly = mean_longitude - long_perihelion;
    let solution = solve_elliptic(mean_anomaly, e, a);
    let u = solution.true_anomaly + long_perihelion - long_node;
    let r = solution.radius;
    let (sin_node, cos_node) = long_node.sin_cos();
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    let ecliptic = Vector3::new(
        r * (cos_node * cos_u - sin_node * sin_u * cos_i),
        r * (sin_node * cos_u + cos_node * sin_u * cos_i),
        r * sin_u * sin_i,
    );
    ecliptic_to_equatorial(&ecliptic)
}

/// Multiples of (D, M, M', F), longitude coefficient (1e-6 deg) and distance coefficient (1e-3 km)
const MOON_LR: [(i8, i8, i8, i8, f64, f64); 32] = [
    (0, 0, 1, 0, 6_288_774.0, -20_905_355.0),
    (2, 0, -1, 0, 1_274_027.0, -3_699_111.0),
    (2, 0, 0, 0, 658_314.0, -2_955_968.0),
    (0, 0, 2, 0, 213_618.0, -569_925.0),
    (0, 1, 0, 0, -185_116.0, 48_888.0),
    (0, 0, 0, 2, -114_332.0, -3_149.0),
    (2, 0, -2, 0, 58_793.0, 246_158.0),
    (2, -1, -1, 0, 57_066.0, -152_138.0),
    (2, 0, 1, 0, 53_322.0, -170_733.0),
    (2, -1, 0, 0, 45_758.0, -204_586.0),
    (0, 1, -1, 0, -40_923.0, -129_620.0),
    (1, 0, 0, 0, -34_720.0, 108_743.0),
    (0, 1, 1, 0, -30_383.0, 104_755.0),
    (2, 0, 0, -2, 15_327.0, 10_321.0),
    (0, 0, 1, 2, -12_528.0, 0.0),
    (0, 0, 1, -2, 10_980.0, 79_661.0),
    (4, 0, -1, 0, 10_675.0, -34_782.0),
    (0, 0, 3, 0, 10_034.0, -23_210.0),
    (4, 0, -2, 0, 8_548.0, -21_636.0),
    (2, 1, -1, 0, -7_888.0, 24_208.0),
    (2, 1, 0, 0, -6_766.0, 30_824.0),
    (1, 0, -1, 0, -5_163.0, -8_379.0),
    (1, 1, 0, 0, 4_987.0, -16_675.0),
    (2, -1, 1, 0, 4_036.0, -12_831.0),
    (2, 0, 2, 0, 3_994.0, -10_445.0),
    (4, 0, 0, 0, 3_861.0, -11_650.0),
    (2, 0, -3, 0, 3_665.0, 14_403.0),
    (0, 1, -2, 0, -2_689.0, -7_003.0),
    (2, 0, -1, 2, -2_602.0, 0.0),
    (2, -1, -2, 0, 2_390.0, 10_056.0),
    (1, 0, 1, 0, -2_348.0, 6_322.0),
    (2, -2, 0, 0, 2_236.0, -9_884.0),
];

/// Multiples of (D, M, M', F) and latitude coefficient (1e-6 deg)
const MOON_B: [(i8, i8, i8, i8, f64); 13] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
];

/// Geocentric ecliptic longitude and latitude (radians, mean equinox of date) and distance (km) of the Moon
pub fn moon_ecliptic_of_date(jd: f64) -> (f64, f64, f64) {
    let t = (jd - J2000) / JULIAN_CENTURY;
    let l_prime = (218.316_447_7 + 481_267.881_234_21 * t) * DEG2RAD;
    let d = (297.850_192_1 + 445_267.111_403_4 * t) * DEG2RAD;
    let m = (357.529_109_2 + 35_999.050_290_9 * t) * DEG2RAD;
    let m_prime = (134.963_396_4 + 477_198.867_505_5 * t) * DEG2RAD;
    let f = (93.272_095_0 + 483_202.017_523_3 * t) * DEG2RAD;
    let e = 1.0 - 0.002_516 * t;
    let a1 = (119.75 + 131.849 * t) * DEG2RAD;
    let a2 = (53.09 + 479_264.290 * t) * DEG2RAD;
    let a3 = (313.45 + 481_266.484 * t) * DEG2RAD;

    let argument = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        cd as f64 * d + cm as f64 * m + cmp as f64 * m_prime + cf as f64 * f
    };
    let eccentricity_factor = |cm: i8| e.powi(cm.unsigned_abs() as i32);

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(cd, cm, cmp, cf, l, r) in MOON_LR.iter() {
        let arg = argument(cd, cm, cmp, cf);
        let factor = eccentricity_factor(cm);
        sum_l += l * factor * arg.sin();
        sum_r += r * factor * arg.cos();
    }
    let mut sum_b = 0.0;
    for &(cd, cm, cmp, cf, b) in MOON_B.iter() {
        sum_b += b * eccentricity_factor(cm) * argument(cd, cm, cmp, cf).sin();
    }

    sum_l += 3958.0 * a1.sin() + 1962.0 * (l_prime - f).sin() + 318.0 * a2.sin();
    sum_b += -2235.0 * l_prime.sin()
        + 382.0 * a3.sin()
        + 175.0 * (a1 - f).sin()
        + 175.0 * (a1 + f).sin()
        + 127.0 * (l_prime - m_prime).sin()
        - 115.0 * (l_prime + m_prime).sin();

    let longitude = l_prime + sum_l * 1e-6 * DEG2RAD;
    let latitude = sum_b * 1e-6 * DEG2RAD;
    let distance = 385_000.56 + sum_r / 1000.0;
    (longitude, latitude, distance)
}
