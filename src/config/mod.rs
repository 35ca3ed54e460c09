//! Engine configuration
//!
//! Tells the catalogue store where the ASCII element sources and the binary
//! catalogues live, and which oracle backs the Earth, Moon and Sun.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::elements::ObjectClass;
use crate::{Result, SkychartError};

/// Default directory for element sources and binary catalogues
pub fn default_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".cache").join("skychart")
}

/// File names used for one object class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFiles {
    /// List of ASCII source files, one path per line, relative to the data directory
    pub sources: String,
    /// Binary catalogue file name, relative to the cache directory
    pub binary: String,
}

/// Configuration of the ephemeris engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Where binary catalogues are written; `None` means `data_dir`
    pub cache_dir: Option<PathBuf>,
    pub planets: ClassFiles,
    pub asteroids: ClassFiles,
    pub comets: ClassFiles,
    /// Load every element record into memory on first use
    pub cache_in_memory: bool,
    /// Ignore existing binary catalogues and rebuild from source
    pub force_rebuild: bool,
    /// JPL SPK kernel for the Earth, Moon and Sun; the analytic fallback is used without one
    pub jpl_kernel: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: None,
            planets: ClassFiles {
                sources: "planets.sources".to_string(),
                binary: "dcfbinary.plt".to_string(),
            },
            asteroids: ClassFiles {
                sources: "asteroids.sources".to_string(),
                binary: "dcfbinary.ast".to_string(),
            },
            comets: ClassFiles {
                sources: "comets.sources".to_string(),
                binary: "dcfbinary.cmt".to_string(),
            },
            cache_in_memory: false,
            force_rebuild: false,
            jpl_kernel: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| SkychartError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Set the data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set a separate directory for binary catalogues
    pub fn with_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_jpl_kernel<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.jpl_kernel = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_cache_in_memory(mut self, cache: bool) -> Self {
        self.cache_in_memory = cache;
        self
    }

    pub fn with_force_rebuild(mut self, force: bool) -> Self {
        self.force_rebuild = force;
        self
    }

    /// Directory holding the binary catalogues
    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.as_deref().unwrap_or(&self.data_dir)
    }

    fn files(&self, class: ObjectClass) -> &ClassFiles {
        match class {
            ObjectClass::Planet => &self.planets,
            ObjectClass::Asteroid => &self.asteroids,
            ObjectClass::Comet => &self.comets,
        }
    }

    /// Path of the source-list file for a class
    pub fn source_list_path(&self, class: ObjectClass) -> PathBuf {
        self.data_dir.join(&self.files(class).sources)
    }

    /// Path of the binary catalogue for a class
    pub fn binary_path(&self, class: ObjectClass) -> PathBuf {
        self.cache_dir().join(&self.files(class).binary)
    }
}
