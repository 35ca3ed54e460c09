//! Orbital element catalogues
//!
//! Osculating elements for planets, asteroids and comets are ingested from
//! their ASCII source files once, written to a fixed-layout little-endian
//! binary catalogue, and served from there on later runs.
//!
//! - `layout`: header and table offsets of the binary file
//! - `readers`: column-based parsers for the ASCII source formats
//! - `ingest`: merges parsed records into per-object epoch lists and writes the binary file
//! - `catalogue`: validated read access to one binary file
//! - `store`: lazily opened (or rebuilt) catalogues, one per object class

mod catalogue;
mod ingest;
mod layout;
mod readers;
mod store;

pub use catalogue::ElementCatalogue;
pub use ingest::{CatalogueBuilder, IngestStats};
pub use layout::{CatalogueHeader, CatalogueLayout, HEADER_SIZE, NAME_LENGTH};
pub use readers::{ElementReader, ParsedRecord, RecordKey};
pub use store::CatalogueStore;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// The three kinds of element catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Planet,
    Asteroid,
    Comet,
}

impl ObjectClass {
    /// All classes, in storage-slot order
    pub const ALL: [ObjectClass; 3] = [ObjectClass::Planet, ObjectClass::Asteroid, ObjectClass::Comet];

    /// Slot index of this class
    pub fn index(&self) -> usize {
        match self {
            ObjectClass::Planet => 0,
            ObjectClass::Asteroid => 1,
            ObjectClass::Comet => 2,
        }
    }

    /// Largest number of objects a catalogue of this class may hold
    pub fn max_objects(&self) -> usize {
        match self {
            ObjectClass::Planet => 50,
            ObjectClass::Asteroid => 1_500_000,
            ObjectClass::Comet => 200_000,
        }
    }

    /// Lowercase label used in log messages and file names
    pub fn label(&self) -> &'static str {
        match self {
            ObjectClass::Planet => "planet",
            ObjectClass::Asteroid => "asteroid",
            ObjectClass::Comet => "comet",
        }
    }
}

/// One set of osculating orbital elements for one body at one epoch
///
/// Angles are in radians, rates per day, distances in AU and epochs are
/// Julian dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Catalogue number, or -1 if the body is unnumbered
    pub number: i32,
    pub secure_orbit: bool,
    pub epoch_osculation: f64,
    /// Time of perihelion passage (comets only; NaN otherwise)
    pub epoch_perihelion: f64,
    pub absolute_mag: f64,
    pub mean_anomaly: f64,
    pub argument_perihelion: f64,
    pub argument_perihelion_dot: f64,
    pub long_asc_node: f64,
    pub long_asc_node_dot: f64,
    pub inclination: f64,
    pub inclination_dot: f64,
    pub eccentricity: f64,
    pub eccentricity_dot: f64,
    pub semi_major_axis: f64,
    pub semi_major_axis_dot: f64,
    /// Comet magnitude slope parameter n
    pub slope_n: f64,
    /// Asteroid phase slope parameter G; -999 means "not known"
    pub slope_g: f64,
}

impl Default for OrbitalElements {
    fn default() -> Self {
        Self {
            number: -1,
            secure_orbit: false,
            epoch_osculation: f64::NAN,
            epoch_perihelion: f64::NAN,
            absolute_mag: f64::NAN,
            mean_anomaly: f64::NAN,
            argument_perihelion: f64::NAN,
            argument_perihelion_dot: 0.0,
            long_asc_node: f64::NAN,
            long_asc_node_dot: 0.0,
            inclination: f64::NAN,
            inclination_dot: 0.0,
            eccentricity: f64::NAN,
            eccentricity_dot: 0.0,
            semi_major_axis: f64::NAN,
            semi_major_axis_dot: 0.0,
            slope_n: 2.0,
            slope_g: -999.0,
        }
    }
}

impl OrbitalElements {
    /// Size of a single element record in bytes
    pub const fn size_bytes() -> usize {
        // i32 + i32 + 16 * f64 = 4 + 4 + 128 = 136 bytes
        136
    }

    /// Write the record in catalogue binary format
    pub fn write_binary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.number)?;
        writer.write_i32::<LittleEndian>(self.secure_orbit as i32)?;
        for value in [
            self.epoch_osculation,
            self.epoch_perihelion,
            self.absolute_mag,
            self.mean_anomaly,
            self.argument_perihelion,
            self.argument_perihelion_dot,
            self.long_asc_node,
            self.long_asc_node_dot,
            self.inclination,
            self.inclination_dot,
            self.eccentricity,
            self.eccentricity_dot,
            self.semi_major_axis,
            self.semi_major_axis_dot,
            self.slope_n,
            self.slope_g,
        ] {
            writer.write_f64::<LittleEndian>(value)?;
        }
        Ok(())
    }

    /// Read a record in catalogue binary format
    pub fn read_binary<R: Read>(reader: &mut R) -> io::Result<Self> {
        let number = reader.read_i32::<LittleEndian>()?;
        let secure_orbit = reader.read_i32::<LittleEndian>()? != 0;
        let mut values = [0.0f64; 16];
        for value in values.iter_mut() {
            *value = reader.read_f64::<LittleEndian>()?;
        }
        Ok(Self {
            number,
            secure_orbit,
            epoch_osculation: values[0],
            epoch_perihelion: values[1],
            absolute_mag: values[2],
            mean_anomaly: values[3],
            argument_perihelion: values[4],
            argument_perihelion_dot: values[5],
            long_asc_node: values[6],
            long_asc_node_dot: values[7],
            inclination: values[8],
            inclination_dot: values[9],
            eccentricity: values[10],
            eccentricity_dot: values[11],
            semi_major_axis: values[12],
            semi_major_axis_dot: values[13],
            slope_n: values[14],
            slope_g: values[15],
        })
    }
}

/// Element set(s) to use for one body at one requested epoch
#[derive(Debug, Clone, PartialEq)]
pub enum ElementFetch {
    /// A single set with weight 1 (requested epoch on or outside the catalogued range)
    Single(OrbitalElements),
    /// The two sets bracketing the requested epoch, with interpolation weights summing to 1
    Bracketed {
        first: OrbitalElements,
        w1: f64,
        second: OrbitalElements,
        w2: f64,
    },
}

impl ElementFetch {
    /// The set carrying the larger weight
    pub fn dominant(&self) -> &OrbitalElements {
        match self {
            ElementFetch::Single(e) => e,
            ElementFetch::Bracketed {
                first,
                w1,
                second,
                w2,
            } => {
                if w1 >= w2 {
                    first
                } else {
                    second
                }
            }
        }
    }

    /// Interpolation weights (w1, w2); w2 is zero for a single set
    pub fn weights(&self) -> (f64, f64) {
        match self {
            ElementFetch::Single(_) => (1.0, 0.0),
            ElementFetch::Bracketed { w1, w2, .. } => (*w1, *w2),
        }
    }
}
