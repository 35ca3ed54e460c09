//! Error types for the JPL kernel reader

use std::path::PathBuf;
use thiserror::Error;

use crate::SkychartError;

/// Errors raised while reading a JPL SPK kernel
#[derive(Error, Debug)]
pub enum JplephemError {
    /// Error when a file I/O operation fails
    #[error("File I/O error on {path:?}: {source}")]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Error when a date is outside the range covered by the kernel
    #[error("Date {jd} is outside ephemeris range ({start_jd}..{end_jd})")]
    OutOfRangeError { jd: f64, start_jd: f64, end_jd: f64 },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// Error when no segment links the requested pair of bodies
    #[error("Body not found: center={center}, target={target}")]
    BodyNotFound { center: i32, target: i32 },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(i32),
}

pub type Result<T> = std::result::Result<T, JplephemError>;

/// Helper function to convert a std::io::Error to JplephemError
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> JplephemError {
    JplephemError::FileError {
        path: path.into(),
        source: err,
    }
}

impl From<JplephemError> for SkychartError {
    fn from(err: JplephemError) -> Self {
        match err {
            JplephemError::FileError { source, .. } => SkychartError::IoError(source),
            JplephemError::OutOfRangeError { .. } => SkychartError::CalculationError(err.to_string()),
            other => SkychartError::DataError(other.to_string()),
        }
    }
}
