//! JPL ephemeris kernels and the Earth/Moon/Sun oracles built on them
//!
//! JPL Development Ephemerides are distributed as binary SPK files in the
//! SPICE DAF container. Only the Chebyshev segment types used by the DE
//! series (2 and 3) are supported.
//!
//! - `daf`: Double Array File container reader
//! - `spk`: SPK segment lookup and evaluation
//! - `chebyshev`: series evaluation
//! - `oracle`: the [`BodyOracle`] trait and its kernel-backed and analytic implementations

pub mod chebyshev;
pub mod daf;
pub mod errors;
pub mod oracle;
pub mod spk;

pub use self::errors::JplephemError;
pub use self::oracle::{BodyOracle, MeanElementOracle, SpkOracle};
pub use self::spk::SPK;
