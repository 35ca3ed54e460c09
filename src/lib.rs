//! Skychart: solar-system ephemerides and celestial chart projections
//!
//! This crate computes positions, brightnesses and apparent motion of planets,
//! the Moon, the Sun, asteroids and comets from catalogues of osculating orbital
//! elements, and projects celestial coordinates onto a flat chart surface.

use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod constants;
pub mod data;
pub mod elements;
pub mod ephemeris;
pub mod framelib;
pub mod jplephem;
pub mod kepler;
pub mod magnitude;
pub mod planetlib;
pub mod projection;
pub mod spherical;
pub mod time;

// Re-export commonly used types
pub use config::EngineConfig;
pub use elements::{CatalogueStore, ElementFetch, ObjectClass, OrbitalElements};
pub use ephemeris::{BodyEphemeris, Ephemeris, EphemerisEngine, EphemerisPoint, ObservingOptions};
pub use planetlib::{BodyId, Planet};
pub use projection::{ChartConfig, Coords, Projection};
pub use time::CalendarDate;

/// Main error type for the skychart library
#[derive(Debug, Error)]
pub enum SkychartError {
    #[error("Time error: {0}")]
    TimeError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Catalogue {path:?} unusable: {reason}")]
    CatalogueError { path: PathBuf, reason: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for skychart operations
pub type Result<T> = std::result::Result<T, SkychartError>;
