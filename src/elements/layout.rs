//! Binary catalogue layout
//!
//! ```text
//! offset  field
//!      0  ready flag            i32 (1 once the file is complete)
//!      4  creation epoch        f64 (Julian date)
//!     12  software version      24 bytes, NUL padded
//!     36  hostname              64 bytes, NUL padded
//!    100  max_objects           i32
//!    104  object_count          i32
//!    108  secure_count          i32
//!    112  epoch_max_count       i32
//!    116  names                 max_objects x 2 x 24 bytes
//!         secure flags          max_objects x i32
//!         epoch counts          max_objects x i32
//!         element records       max_objects x epoch_max_count x 136 bytes
//! ```
//!
//! All values are little-endian with no padding.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use super::OrbitalElements;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 116;
/// Size of one name field (23 characters plus terminating NUL)
pub const NAME_LENGTH: usize = 24;
/// Size of the software version field
pub const VERSION_LENGTH: usize = 24;
/// Size of the hostname field
pub const HOSTNAME_LENGTH: usize = 64;

/// Fixed-size header at the start of every binary catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueHeader {
    pub ready: bool,
    pub creation_epoch: f64,
    pub version: String,
    pub hostname: String,
    pub max_objects: u32,
    pub object_count: u32,
    pub secure_count: u32,
    pub epoch_max_count: u32,
}

impl CatalogueHeader {
    /// Table geometry implied by this header
    pub fn layout(&self) -> CatalogueLayout {
        CatalogueLayout::new(self.max_objects as usize, self.epoch_max_count as usize)
    }

    /// Write the header
    pub fn write_binary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ready as i32)?;
        writer.write_f64::<LittleEndian>(self.creation_epoch)?;
        write_fixed_string(writer, &self.version, VERSION_LENGTH)?;
        write_fixed_string(writer, &self.hostname, HOSTNAME_LENGTH)?;
        writer.write_i32::<LittleEndian>(self.max_objects as i32)?;
        writer.write_i32::<LittleEndian>(self.object_count as i32)?;
        writer.write_i32::<LittleEndian>(self.secure_count as i32)?;
        writer.write_i32::<LittleEndian>(self.epoch_max_count as i32)?;
        Ok(())
    }

    /// Read the header; negative counts are reported as `InvalidData`
    pub fn read_binary<R: Read>(reader: &mut R) -> io::Result<Self> {
        let ready = reader.read_i32::<LittleEndian>()? == 1;
        let creation_epoch = reader.read_f64::<LittleEndian>()?;
        let version = read_fixed_string(reader, VERSION_LENGTH)?;
        let hostname = read_fixed_string(reader, HOSTNAME_LENGTH)?;
        let mut counts = [0u32; 4];
        for count in counts.iter_mut() {
            let value = reader.read_i32::<LittleEndian>()?;
            *count = u32::try_from(value).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("negative count {} in catalogue header", value),
                )
            })?;
        }
        Ok(Self {
            ready,
            creation_epoch,
            version,
            hostname,
            max_objects: counts[0],
            object_count: counts[1],
            secure_count: counts[2],
            epoch_max_count: counts[3],
        })
    }
}

/// Byte offsets of the tables in a catalogue with the given capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueLayout {
    pub max_objects: usize,
    pub epoch_max_count: usize,
}

impl CatalogueLayout {
    pub fn new(max_objects: usize, epoch_max_count: usize) -> Self {
        Self {
            max_objects,
            epoch_max_count,
        }
    }

    pub fn names_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }

    pub fn secure_offset(&self) -> u64 {
        self.names_offset() + (self.max_objects * 2 * NAME_LENGTH) as u64
    }

    pub fn epoch_count_offset(&self) -> u64 {
        self.secure_offset() + (self.max_objects * 4) as u64
    }

    pub fn elements_offset(&self) -> u64 {
        self.epoch_count_offset() + (self.max_objects * 4) as u64
    }

    /// Offset of element record `epoch` of object `object`
    pub fn record_offset(&self, object: usize, epoch: usize) -> u64 {
        self.elements_offset()
            + ((object * self.epoch_max_count + epoch) * OrbitalElements::size_bytes()) as u64
    }

    /// Total size in bytes that a complete catalogue must have
    pub fn file_length(&self) -> u64 {
        self.record_offset(self.max_objects, 0)
    }
}

/// Write `value` into a NUL-padded field of `length` bytes, truncating to leave a terminator
pub fn write_fixed_string<W: Write>(writer: &mut W, value: &str, length: usize) -> io::Result<()> {
    let mut bytes = vec![0u8; length];
    let src = value.as_bytes();
    let copy_len = src.len().min(length - 1);
    bytes[..copy_len].copy_from_slice(&src[..copy_len]);
    writer.write_all(&bytes)
}

/// Read a NUL-padded field of `length` bytes
pub fn read_fixed_string<R: Read>(reader: &mut R, length: usize) -> io::Result<String> {
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes)?;
    let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(length);
    Ok(String::from_utf8_lossy(&bytes[..null_pos]).to_string())
}
