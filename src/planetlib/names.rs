//! Body names and identifier strings
//!
//! Accepted forms, tried in order:
//! - a major body name ("jupiter", "Moon", "sun", "earth")
//! - "P<n>" for a planet code, "A<n>" for a numbered asteroid, "C<n>" for a comet index
//! - a bare numeric body code
//! - free text, looked up among comet names then asteroid names

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::{BodyId, Planet};
use crate::elements::{CatalogueStore, ObjectClass};
use crate::{Result, SkychartError};

lazy_static! {
    /// Map from lowercase major-body names to identifiers
    static ref MAJOR_BODIES: HashMap<&'static str, BodyId> = {
        let mut m = HashMap::new();
        for planet in Planet::ALL.iter() {
            m.insert(planet.name(), BodyId::Planet(*planet));
        }
        m.insert("Earth", BodyId::Earth);
        m.insert("Moon", BodyId::Moon);
        m.insert("Sun", BodyId::Sun);
        m
    };

    static ref LOWERCASE_NAMES: HashMap<String, BodyId> = MAJOR_BODIES
        .iter()
        .map(|(name, id)| (name.to_lowercase(), *id))
        .collect();

    static ref PREFIXED_ID: Regex = Regex::new(r"^([PpAaCc])(\d+)$").expect("valid regex");
}

/// Resolve a user-supplied object identifier into a body
pub fn resolve_body(name: &str, store: &CatalogueStore) -> Result<BodyId> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SkychartError::ObjectNotFound(
            "empty object name".to_string(),
        ));
    }

    if let Some(body) = LOWERCASE_NAMES.get(&trimmed.to_lowercase()) {
        return Ok(*body);
    }

    if let Some(caps) = PREFIXED_ID.captures(trimmed) {
        let number: i64 = caps[2]
            .parse()
            .map_err(|_| SkychartError::ObjectNotFound(trimmed.to_string()))?;
        return match &caps[1] {
            "P" | "p" => BodyId::from_code(number),
            "A" | "a" => {
                let not_found = || SkychartError::ObjectNotFound(format!("asteroid {}", number));
                let asteroid_number = i32::try_from(number).map_err(|_| not_found())?;
                store
                    .find_by_number(ObjectClass::Asteroid, asteroid_number)?
                    .map(|index| BodyId::Asteroid(index as u32))
                    .ok_or_else(not_found)
            }
            _ => {
                let count = store.object_count(ObjectClass::Comet)?;
                match u32::try_from(number) {
                    Ok(index) if (index as usize) < count => Ok(BodyId::Comet(index)),
                    _ => Err(SkychartError::ObjectNotFound(format!("comet {}", number))),
                }
            }
        };
    }

    if let Ok(code) = trimmed.parse::<i64>() {
        return BodyId::from_code(code);
    }

    for class in [ObjectClass::Comet, ObjectClass::Asteroid] {
        if !store.is_available(class) {
            continue;
        }
        if let Some(index) = store.search_by_name(class, trimmed)? {
            return Ok(match class {
                ObjectClass::Comet => BodyId::Comet(index as u32),
                _ => BodyId::Asteroid(index as u32),
            });
        }
    }

    Err(SkychartError::ObjectNotFound(trimmed.to_string()))
}

/// Title-case a catalogue name unless it looks like a designation
pub fn titlecase(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) || name.contains('/') {
        name.to_string()
    } else {
        name.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(c) => c
                        .to_uppercase()
                        .chain(chars.flat_map(|c| c.to_lowercase()))
                        .collect(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}
