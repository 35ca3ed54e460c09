//! Lazily opened element catalogues, one per object class

use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

use super::ingest::CatalogueBuilder;
use super::{ElementCatalogue, ElementFetch, ObjectClass};
use crate::config::EngineConfig;
use crate::{Result, SkychartError};

type Slot = Mutex<Option<Arc<ElementCatalogue>>>;

/// Owner of the planet, asteroid and comet catalogues
///
/// Each class is opened on first use. A missing or unusable binary catalogue is
/// rebuilt from the ASCII files named in the class's source list. Only one
/// thread builds a given class; different classes initialise independently.
#[derive(Debug)]
pub struct CatalogueStore {
    config: EngineConfig,
    slots: [Slot; 3],
}

impl CatalogueStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            slots: [Mutex::new(None), Mutex::new(None), Mutex::new(None)],
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a source list exists for the class
    pub fn has_source(&self, class: ObjectClass) -> bool {
        self.config.source_list_path(class).is_file()
    }

    /// Whether the class can be opened at all, from a binary catalogue or its sources
    pub fn is_available(&self, class: ObjectClass) -> bool {
        self.has_source(class) || self.config.binary_path(class).is_file()
    }

    /// The catalogue for a class, opening or building it on first use
    pub fn get_or_init(&self, class: ObjectClass) -> Result<Arc<ElementCatalogue>> {
        let mut slot = self.lock_slot(class)?;
        if let Some(catalogue) = slot.as_ref() {
            return Ok(Arc::clone(catalogue));
        }
        let catalogue = Arc::new(self.load(class)?);
        *slot = Some(Arc::clone(&catalogue));
        Ok(catalogue)
    }

    /// Rebuild a class from its sources, replacing any catalogue already open
    pub fn rebuild(&self, class: ObjectClass) -> Result<Arc<ElementCatalogue>> {
        let mut slot = self.lock_slot(class)?;
        let catalogue = Arc::new(self.build(class)?);
        *slot = Some(Arc::clone(&catalogue));
        Ok(catalogue)
    }

    /// Element set(s) for object `index` of `class` at `jd`
    pub fn fetch(&self, class: ObjectClass, index: usize, jd: f64) -> Result<Option<ElementFetch>> {
        self.get_or_init(class)?.fetch(index, jd)
    }

    pub fn search_by_name(&self, class: ObjectClass, name: &str) -> Result<Option<usize>> {
        Ok(self.get_or_init(class)?.search_by_name(name))
    }

    pub fn find_by_number(&self, class: ObjectClass, number: i32) -> Result<Option<usize>> {
        Ok(self.get_or_init(class)?.find_by_number(number))
    }

    pub fn object_count(&self, class: ObjectClass) -> Result<usize> {
        Ok(self.get_or_init(class)?.len())
    }

    /// Primary name of an object
    pub fn object_name(&self, class: ObjectClass, index: usize) -> Result<Option<String>> {
        Ok(self
            .get_or_init(class)?
            .names(index)
            .map(|names| names[0].clone()))
    }

    fn lock_slot(&self, class: ObjectClass) -> Result<MutexGuard<'_, Option<Arc<ElementCatalogue>>>> {
        self.slots[class.index()].lock().map_err(|_| {
            SkychartError::DataError(format!("{} catalogue lock poisoned", class.label()))
        })
    }

    fn load(&self, class: ObjectClass) -> Result<ElementCatalogue> {
        let binary = self.config.binary_path(class);
        if self.config.force_rebuild || !binary.is_file() {
            return self.build(class);
        }

        match ElementCatalogue::open(&binary, class) {
            Ok(catalogue) => {
                self.prepare(&catalogue)?;
                Ok(catalogue)
            }
            Err(e) if self.has_source(class) => {
                warn!("{}; rebuilding from sources", e);
                self.build(class)
            }
            Err(e) => Err(e),
        }
    }

    fn build(&self, class: ObjectClass) -> Result<ElementCatalogue> {
        let list = self.config.source_list_path(class);
        if !list.is_file() {
            return Err(SkychartError::CatalogueError {
                path: list,
                reason: format!("no {} source list", class.label()),
            });
        }

        info!("Building {} catalogue from {}", class.label(), list.display());
        let mut builder = CatalogueBuilder::new(class);
        let files = builder.ingest_source_list(&list, &self.config.data_dir)?;
        if files == 0 {
            return Err(SkychartError::CatalogueError {
                path: list,
                reason: "no readable source files".to_string(),
            });
        }
        let stats = builder.stats();
        info!(
            "Ingested {} {} records from {} files ({} rejected lines)",
            stats.records,
            class.label(),
            stats.files,
            stats.rejected
        );

        let binary = self.config.binary_path(class);
        builder.write(&binary)?;
        let catalogue = ElementCatalogue::open(&binary, class)?;
        self.prepare(&catalogue)?;
        Ok(catalogue)
    }

    fn prepare(&self, catalogue: &ElementCatalogue) -> Result<()> {
        if self.config.cache_in_memory {
            catalogue.cache_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_catalogues::write_comet_sources;
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_builds_on_first_use() {
        let dir = tempdir().unwrap();
        write_comet_sources(dir.path());
        let store = CatalogueStore::new(EngineConfig::default().with_data_dir(dir.path()));

        assert_eq!(store.object_count(ObjectClass::Comet).unwrap(), 2);
        assert!(dir.path().join("dcfbinary.cmt").is_file());
        assert_eq!(store.search_by_name(ObjectClass::Comet, "2p/encke").unwrap(), Some(1));
        assert_eq!(store.search_by_name(ObjectClass::Comet, "0001P").unwrap(), Some(0));
        assert_eq!(
            store.object_name(ObjectClass::Comet, 1).unwrap().as_deref(),
            Some("2P/Encke")
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dir = tempdir().unwrap();
        write_comet_sources(dir.path());
        let store = CatalogueStore::new(EngineConfig::default().with_data_dir(dir.path()));
        let binary = dir.path().join("dcfbinary.cmt");

        store.rebuild(ObjectClass::Comet).unwrap();
        let first = fs::read(&binary).unwrap();
        store.rebuild(ObjectClass::Comet).unwrap();
        let second = fs::read(&binary).unwrap();

        // Everything but the creation epoch is identical
        assert_eq!(first.len(), second.len());
        assert_eq!(first[..4], second[..4]);
        assert_eq!(first[12..], second[12..]);
    }

    #[test]
    fn test_corrupt_binary_rebuilt() {
        let dir = tempdir().unwrap();
        write_comet_sources(dir.path());
        let binary = dir.path().join("dcfbinary.cmt");
        fs::write(&binary, vec![7u8; 300]).unwrap();

        let store = CatalogueStore::new(EngineConfig::default().with_data_dir(dir.path()));
        assert_eq!(store.object_count(ObjectClass::Comet).unwrap(), 2);
    }

    #[test]
    fn test_missing_sources_is_catalogue_error() {
        let dir = tempdir().unwrap();
        let store = CatalogueStore::new(EngineConfig::default().with_data_dir(dir.path()));
        assert!(!store.is_available(ObjectClass::Asteroid));
        assert!(matches!(
            store.get_or_init(ObjectClass::Asteroid),
            Err(SkychartError::CatalogueError { .. })
        ));
    }

    #[test]
    fn test_concurrent_init_shares_one_catalogue() {
        let dir = tempdir().unwrap();
        write_comet_sources(dir.path());
        let store = Arc::new(CatalogueStore::new(
            EngineConfig::default()
                .with_data_dir(dir.path())
                .with_cache_in_memory(true),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get_or_init(ObjectClass::Comet).unwrap())
            })
            .collect();
        let catalogues: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for catalogue in &catalogues[1..] {
            assert!(Arc::ptr_eq(&catalogues[0], catalogue));
        }
        assert!(catalogues[0].is_cached());
    }
}
