//! Solar-system bodies: identifiers, physical data and name lookup

mod names;
mod sun;

pub use names::{resolve_body, titlecase};
pub use sun::sun_pos;

use crate::elements::{CatalogueStore, ObjectClass};
use crate::{Result, SkychartError};

/// Offset added to an asteroid catalogue index to form its numeric body code
pub const ASTEROID_CODE_BASE: i64 = 10_000_000;
/// Offset added to a comet catalogue index to form its numeric body code
pub const COMET_CODE_BASE: i64 = 20_000_000;
/// Numeric code of the Earth itself
pub const EARTH_CODE: i64 = 19;
/// Numeric code of the Earth-Moon barycentre, accepted as an alias for the Earth
pub const EMB_CODE: i64 = 2;

/// Major planets other than the Earth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Planet {
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    /// All planets in order of distance from the Sun
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    /// Numeric body code, which is also the planet's number in the planet catalogue
    pub fn code(&self) -> i64 {
        match self {
            Planet::Mercury => 0,
            Planet::Venus => 1,
            Planet::Mars => 3,
            Planet::Jupiter => 4,
            Planet::Saturn => 5,
            Planet::Uranus => 6,
            Planet::Neptune => 7,
            Planet::Pluto => 8,
        }
    }

    /// Get the planet's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }
}

/// Identifier of any body the ephemeris engine can compute
///
/// Asteroids and comets are identified by their index in the corresponding
/// element catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyId {
    Planet(Planet),
    Earth,
    Moon,
    Sun,
    Asteroid(u32),
    Comet(u32),
}

impl BodyId {
    /// Resolve a user-supplied name or identifier; see [`resolve_body`]
    pub fn resolve(name: &str, store: &CatalogueStore) -> Result<Self> {
        resolve_body(name, store)
    }

    /// Decode a numeric body code
    pub fn from_code(code: i64) -> Result<Self> {
        let body = match code {
            EARTH_CODE | EMB_CODE => BodyId::Earth,
            9 => BodyId::Moon,
            10 => BodyId::Sun,
            c if (0..=8).contains(&c) => {
                let planet = Planet::ALL
                    .iter()
                    .find(|p| p.code() == c)
                    .copied()
                    .ok_or_else(|| SkychartError::ObjectNotFound(format!("body code {}", c)))?;
                BodyId::Planet(planet)
            }
            c if (ASTEROID_CODE_BASE..COMET_CODE_BASE).contains(&c) => {
                BodyId::Asteroid((c - ASTEROID_CODE_BASE) as u32)
            }
            c if (COMET_CODE_BASE..COMET_CODE_BASE + 10_000_000).contains(&c) => {
                BodyId::Comet((c - COMET_CODE_BASE) as u32)
            }
            c => {
                return Err(SkychartError::ObjectNotFound(format!(
                    "no body with code {}",
                    c
                )))
            }
        };
        Ok(body)
    }

    /// Numeric body code. The Earth always encodes as 19.
    pub fn code(&self) -> i64 {
        match self {
            BodyId::Planet(p) => p.code(),
            BodyId::Earth => EARTH_CODE,
            BodyId::Moon => 9,
            BodyId::Sun => 10,
            BodyId::Asteroid(i) => ASTEROID_CODE_BASE + *i as i64,
            BodyId::Comet(i) => COMET_CODE_BASE + *i as i64,
        }
    }

    /// Element catalogue holding this body's orbit, if it has one
    pub fn catalogue_class(&self) -> Option<ObjectClass> {
        match self {
            BodyId::Planet(_) => Some(ObjectClass::Planet),
            BodyId::Asteroid(_) => Some(ObjectClass::Asteroid),
            BodyId::Comet(_) => Some(ObjectClass::Comet),
            BodyId::Earth | BodyId::Moon | BodyId::Sun => None,
        }
    }

    /// Whether the body is a comet (comets are always drawn at full phase)
    pub fn is_comet(&self) -> bool {
        matches!(self, BodyId::Comet(_))
    }

    /// Radius and geometric albedo for bodies with tabulated physical data
    pub fn physical_properties(&self) -> Option<PhysicalProperties> {
        let (radius, albedo) = match self {
            BodyId::Planet(Planet::Mercury) => (2.4397e6, 0.138),
            BodyId::Planet(Planet::Venus) => (6.0518e6, 0.67),
            BodyId::Earth => (6.3710e6, 0.367),
            BodyId::Planet(Planet::Mars) => (3.3962e6, 0.15),
            BodyId::Planet(Planet::Jupiter) => (6.9911e7, 0.52),
            BodyId::Planet(Planet::Saturn) => (6.0268e7, 0.47),
            BodyId::Planet(Planet::Uranus) => (2.5559e7, 0.51),
            BodyId::Planet(Planet::Neptune) => (2.4764e7, 0.41),
            BodyId::Planet(Planet::Pluto) => (1.1570e6, 0.575),
            BodyId::Moon => (1.7371e6, 0.113),
            BodyId::Sun => (6.96e8, 1.0),
            BodyId::Asteroid(_) | BodyId::Comet(_) => return None,
        };
        Some(PhysicalProperties { radius, albedo })
    }

    /// Human-readable name for bodies with fixed names
    pub fn fixed_name(&self) -> Option<&'static str> {
        match self {
            BodyId::Planet(p) => Some(p.name()),
            BodyId::Earth => Some("Earth"),
            BodyId::Moon => Some("Moon"),
            BodyId::Sun => Some("Sun"),
            BodyId::Asteroid(_) | BodyId::Comet(_) => None,
        }
    }
}

/// Physical size and reflectivity of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalProperties {
    /// Mean radius in meters
    pub radius: f64,
    /// Geometric albedo
    pub albedo: f64,
}
