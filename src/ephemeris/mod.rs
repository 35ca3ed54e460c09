//! Geocentric apparent ephemerides of solar-system bodies
//!
//! [`EphemerisEngine`] combines the element catalogues with a [`BodyOracle`]
//! for the Earth-Moon system and the Sun. Positions are barycentric J2000
//! equatorial, in AU, corrected once for light travel time and then for the
//! annual aberration of the Earth's motion.
//!
//! - `track`: sampled ephemerides over a date range
//! - `autoscale`: fitting a chart around a set of tracks
//! - `labels`: date labels along a track
//! - `ticks`: tick marks and label anchor points for labelled track points

mod autoscale;
mod labels;
mod ticks;
mod track;

pub use autoscale::autoscale_chart;
pub use labels::add_text_labels;
pub use ticks::{track_ticks, LabelCandidate, TickMark};
pub use track::{Ephemeris, EphemerisPoint, TrackDefinition};

use log::{debug, info};
use nalgebra::Vector3;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::constants::{C_AUDAY, J2000, MOON_MASS_FRACTION};
use crate::elements::{CatalogueStore, OrbitalElements};
use crate::jplephem::{BodyOracle, MeanElementOracle, SpkOracle};
use crate::magnitude::{self, Appearance, ViewOptions};
use crate::planetlib::BodyId;
use crate::Result;

/// Time step used to difference the Earth's velocity, days
const VELOCITY_STEP: f64 = 1e-6;

/// Where the observer stands and which epoch RA/Dec are referred to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservingOptions {
    /// Julian date of the equinox for the output RA/Dec
    pub ra_dec_epoch: f64,
    /// Geodetic (latitude, longitude) in degrees; `None` observes from the Earth's centre
    pub topocentric: Option<(f64, f64)>,
}

impl Default for ObservingOptions {
    fn default() -> Self {
        Self {
            ra_dec_epoch: J2000,
            topocentric: None,
        }
    }
}

impl ObservingOptions {
    pub fn with_ra_dec_epoch(mut self, jd: f64) -> Self {
        self.ra_dec_epoch = jd;
        self
    }

    pub fn with_observer(mut self, latitude: f64, longitude: f64) -> Self {
        self.topocentric = Some((latitude, longitude));
        self
    }
}

/// Position and appearance of one body at one instant
///
/// `x`, `y`, `z` are barycentric J2000 equatorial coordinates in AU. Angles are
/// radians, distances AU, angular size arcseconds and physical size metres.
/// Every field is NaN when the body has no orbital elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyEphemeris {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub ra: f64,
    pub dec: f64,
    pub magnitude: f64,
    pub phase: f64,
    pub angular_size: f64,
    pub physical_size: f64,
    pub albedo: f64,
    pub sun_distance: f64,
    pub earth_distance: f64,
    pub sun_angular_distance: f64,
    pub theta_eso: f64,
    pub ecliptic_longitude: f64,
    pub ecliptic_latitude: f64,
    pub ecliptic_distance: f64,
}

impl BodyEphemeris {
    /// The all-NaN result for a body without elements
    pub fn unknown() -> Self {
        let nan = f64::NAN;
        Self {
            x: nan,
            y: nan,
            z: nan,
            ra: nan,
            dec: nan,
            magnitude: nan,
            phase: nan,
            angular_size: nan,
            physical_size: nan,
            albedo: nan,
            sun_distance: nan,
            earth_distance: nan,
            sun_angular_distance: nan,
            theta_eso: nan,
            ecliptic_longitude: nan,
            ecliptic_latitude: nan,
            ecliptic_distance: nan,
        }
    }

    fn from_parts(position: &Vector3<f64>, appearance: &Appearance) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            ra: appearance.ra,
            dec: appearance.dec,
            magnitude: appearance.magnitude,
            phase: appearance.phase,
            angular_size: appearance.angular_size,
            physical_size: appearance.physical_size,
            albedo: appearance.albedo,
            sun_distance: appearance.sun_distance,
            earth_distance: appearance.earth_distance,
            sun_angular_distance: appearance.sun_angular_distance,
            theta_eso: appearance.theta_eso,
            ecliptic_longitude: appearance.ecliptic_longitude,
            ecliptic_latitude: appearance.ecliptic_latitude,
            ecliptic_distance: appearance.ecliptic_distance,
        }
    }

    /// Barycentric position vector
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Whether the body could be located
    pub fn is_known(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite()
    }
}

/// Light travel time in days over a distance in AU
fn light_time(distance: f64) -> f64 {
    distance / C_AUDAY
}

/// Computes ephemerides from element catalogues and an Earth/Moon/Sun oracle
pub struct EphemerisEngine {
    store: Arc<CatalogueStore>,
    oracle: Box<dyn BodyOracle>,
}

impl EphemerisEngine {
    pub fn new(store: Arc<CatalogueStore>, oracle: Box<dyn BodyOracle>) -> Self {
        Self { store, oracle }
    }

    /// Engine for a configuration, using its JPL kernel if one is named
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let oracle: Box<dyn BodyOracle> = match &config.jpl_kernel {
            Some(path) => Box::new(SpkOracle::open(path)?),
            None => Box::new(MeanElementOracle::new()),
        };
        info!("Ephemeris engine using {}", oracle.describe());
        Ok(Self::new(Arc::new(CatalogueStore::new(config)), oracle))
    }

    pub fn store(&self) -> &CatalogueStore {
        &self.store
    }

    pub fn oracle(&self) -> &dyn BodyOracle {
        self.oracle.as_ref()
    }

    /// Resolve a body name or identifier string
    pub fn resolve(&self, name: &str) -> Result<BodyId> {
        BodyId::resolve(name, &self.store)
    }

    /// Barycentric position of the Earth's centre
    pub fn earth_position(&self, jd: f64) -> Result<Vector3<f64>> {
        let emb = self.oracle.emb(jd)?;
        let moon = self.oracle.moon_geocentric(jd)?;
        Ok(emb - moon * MOON_MASS_FRACTION)
    }

    /// Heliocentric position of a catalogued body and the elements that placed it
    ///
    /// `None` when the body's class has no catalogue or the body has no elements.
    pub fn heliocentric_position(&self, body: BodyId, jd: f64) -> Result<Option<(Vector3<f64>, OrbitalElements)>> {
        let class = match body.catalogue_class() {
            Some(class) => class,
            None => return Ok(None),
        };
        if !self.store.is_available(class) {
            debug!("No {} catalogue available for {:?}", class.label(), body);
            return Ok(None);
        }
        let index = match body {
            BodyId::Planet(planet) => match self.store.find_by_number(class, planet.code() as i32)? {
                Some(index) => index,
                None => return Ok(None),
            },
            BodyId::Asteroid(index) | BodyId::Comet(index) => index as usize,
            BodyId::Earth | BodyId::Moon | BodyId::Sun => return Ok(None),
        };
        Ok(self
            .store
            .fetch(class, index, jd)?
            .map(|fetch| (fetch.position(jd), *fetch.dominant())))
    }

    /// Position and appearance of `body` as seen from the Earth at `jd`
    pub fn compute(&self, body: BodyId, jd: f64, options: &ObservingOptions) -> Result<BodyEphemeris> {
        let earth = self.earth_position(jd)?;

        let sun_now = self.oracle.sun_barycentric(jd)?;
        let sun = self.oracle.sun_barycentric(jd - light_time((sun_now - earth).norm()))?;

        let mut elements = None;
        let position = match body {
            BodyId::Earth => earth,
            BodyId::Sun => sun,
            BodyId::Moon => self.oracle.moon_geocentric(jd)? + earth,
            _ => {
                let first = match self.heliocentric_position(body, jd)? {
                    Some((position, _)) => position + sun,
                    None => return Ok(BodyEphemeris::unknown()),
                };
                let emitted = jd - light_time((first - earth).norm());
                match self.heliocentric_position(body, emitted)? {
                    Some((position, used)) => {
                        elements = Some(used);
                        position + sun
                    }
                    None => return Ok(BodyEphemeris::unknown()),
                }
            }
        };

        let position = if body == BodyId::Earth {
            position
        } else {
            let velocity = self.earth_position(jd + VELOCITY_STEP)? - earth;
            aberrate(&position, &earth, &velocity)
        };

        let view = ViewOptions {
            jd,
            ra_dec_epoch: options.ra_dec_epoch,
            observer: options.topocentric,
        };
        let appearance = magnitude::estimate(body, elements.as_ref(), &position, &earth, &sun, &view);
        Ok(BodyEphemeris::from_parts(&position, &appearance))
    }
}

/// Apply annual aberration to `position` as seen from `earth`
///
/// `displacement` is the Earth's motion over [`VELOCITY_STEP`] days
/// (Explanatory Supplement eq. 7.118).
fn aberrate(position: &Vector3<f64>, earth: &Vector3<f64>, displacement: &Vector3<f64>) -> Vector3<f64> {
    let u1 = position - earth;
    let distance = u1.norm();
    let u = u1 / distance;
    let v = displacement / (C_AUDAY * VELOCITY_STEP);
    let beta = (1.0 - v.norm_squared()).sqrt();
    let f1 = u.dot(&v);
    let f2 = 1.0 + f1 / (1.0 + beta);
    earth + (u1 * beta + v * (f2 * distance)) / (1.0 + f1)
}

#[cfg(test)]
pub(crate) mod test_oracle {
    use super::*;

    /// Oracle with the Earth on a circular 1 AU orbit and the Sun fixed at the origin
    pub struct CircularOracle;

    impl BodyOracle for CircularOracle {
        fn emb(&self, jd: f64) -> Result<Vector3<f64>> {
            let angle = (jd - J2000) / 365.25 * std::f64::consts::TAU;
            Ok(Vector3::new(angle.cos(), angle.sin(), 0.0))
        }

        fn moon_geocentric(&self, _jd: f64) -> Result<Vector3<f64>> {
            Ok(Vector3::new(0.0, 0.0, 0.00257))
        }

        fn sun_barycentric(&self, _jd: f64) -> Result<Vector3<f64>> {
            Ok(Vector3::zeros())
        }

        fn describe(&self) -> String {
            "circular test orbit".to_string()
        }
    }
}
