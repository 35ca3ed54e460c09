//! Read access to one binary element catalogue

use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use byteorder::{LittleEndian, ReadBytesExt};

use super::layout::{read_fixed_string, CatalogueHeader, CatalogueLayout, HEADER_SIZE, NAME_LENGTH};
use super::{ElementFetch, ObjectClass, OrbitalElements};
use crate::{Result, SkychartError};

/// An opened, validated binary catalogue
///
/// Names, secure flags and epoch counts are held in memory. Element records
/// are read from disk on demand unless [`ElementCatalogue::cache_all`] has
/// been called, after which reads take no lock.
#[derive(Debug)]
pub struct ElementCatalogue {
    path: PathBuf,
    class: ObjectClass,
    header: CatalogueHeader,
    layout: CatalogueLayout,
    names: Vec<[String; 2]>,
    secure: Vec<bool>,
    epoch_counts: Vec<usize>,
    by_number: HashMap<i32, usize>,
    file: Mutex<File>,
    cache: OnceLock<Vec<OrbitalElements>>,
}

impl ElementCatalogue {
    /// Open and validate a catalogue
    ///
    /// Fails with [`SkychartError::CatalogueError`] when the file is not marked
    /// ready, its header counts are inconsistent, or its length differs from the
    /// length implied by the header.
    pub fn open<P: AsRef<Path>>(path: P, class: ObjectClass) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let invalid = |reason: String| SkychartError::CatalogueError {
            path: path.clone(),
            reason,
        };

        let file = File::open(&path)?;
        let actual_length = file.metadata()?.len();
        if actual_length < HEADER_SIZE as u64 {
            return Err(invalid(format!(
                "length {} is shorter than the header",
                actual_length
            )));
        }

        let mut reader = BufReader::new(file);
        let header = CatalogueHeader::read_binary(&mut reader)?;
        if !header.ready {
            return Err(invalid("not marked ready".to_string()));
        }
        if header.object_count > header.max_objects
            || header.secure_count > header.object_count
            || header.max_objects as usize > class.max_objects()
            || header.epoch_max_count == 0
        {
            return Err(invalid(format!(
                "inconsistent header counts (max {}, objects {}, secure {}, epochs {})",
                header.max_objects, header.object_count, header.secure_count, header.epoch_max_count
            )));
        }

        let layout = header.layout();
        if actual_length != layout.file_length() {
            warn!(
                "{} catalogue {} has length {} but its header implies {}",
                class.label(),
                path.display(),
                actual_length,
                layout.file_length()
            );
            return Err(invalid(format!(
                "length {} does not match expected {}",
                actual_length,
                layout.file_length()
            )));
        }

        let count = header.object_count as usize;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            let first = read_fixed_string(&mut reader, NAME_LENGTH)?;
            let second = read_fixed_string(&mut reader, NAME_LENGTH)?;
            names.push([first, second]);
        }

        reader.seek(SeekFrom::Start(layout.secure_offset()))?;
        let mut secure = Vec::with_capacity(count);
        for index in 0..count {
            let flag = reader.read_i32::<LittleEndian>()?;
            if flag != 0 && flag != 1 {
                warn!("Object {} in {} has secure flag {}; treating as secure", index, path.display(), flag);
            }
            secure.push(flag != 0);
        }

        reader.seek(SeekFrom::Start(layout.epoch_count_offset()))?;
        let mut epoch_counts = Vec::with_capacity(count);
        for index in 0..count {
            let n = reader.read_i32::<LittleEndian>()?;
            let clamped = n.clamp(0, header.epoch_max_count as i32) as usize;
            if clamped as i32 != n {
                warn!(
                    "Object {} in {} claims {} epochs (maximum {}); clamping",
                    index,
                    path.display(),
                    n,
                    header.epoch_max_count
                );
            }
            epoch_counts.push(clamped);
        }

        let mut by_number = HashMap::new();
        if class != ObjectClass::Comet {
            for (index, [_, number]) in names.iter().enumerate() {
                if let Ok(n) = number.trim().parse::<i32>() {
                    by_number.entry(n).or_insert(index);
                }
            }
        }

        debug!(
            "Opened {} catalogue {} with {} objects",
            class.label(),
            path.display(),
            count
        );

        Ok(Self {
            path,
            class,
            header,
            layout,
            names,
            secure,
            epoch_counts,
            by_number,
            file: Mutex::new(reader.into_inner()),
            cache: OnceLock::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    pub fn header(&self) -> &CatalogueHeader {
        &self.header
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Both aliases of an object
    pub fn names(&self, index: usize) -> Option<&[String; 2]> {
        self.names.get(index)
    }

    pub fn is_secure(&self, index: usize) -> Option<bool> {
        self.secure.get(index).copied()
    }

    pub fn epoch_count(&self, index: usize) -> Option<usize> {
        self.epoch_counts.get(index).copied()
    }

    /// Whether every record has been loaded into memory
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// All element sets of one object in ascending epoch order
    pub fn elements(&self, index: usize) -> Result<Vec<OrbitalElements>> {
        let count = match self.epoch_counts.get(index) {
            Some(&count) => count,
            None => return Ok(Vec::new()),
        };
        let first_slot = index * self.layout.epoch_max_count;

        if let Some(cache) = self.cache.get() {
            return Ok(cache[first_slot..first_slot + count].to_vec());
        }

        let mut file = self.lock_file()?;
        file.seek(SeekFrom::Start(self.layout.record_offset(index, 0)))?;
        let mut buffer = vec![0u8; count * OrbitalElements::size_bytes()];
        file.read_exact(&mut buffer)?;
        let mut cursor = buffer.as_slice();
        (0..count)
            .map(|_| OrbitalElements::read_binary(&mut cursor).map_err(SkychartError::from))
            .collect()
    }

    /// Element set(s) to use for object `index` at Julian date `jd`
    ///
    /// Returns `None` when the index is out of range or the object has no epochs.
    /// Outside the catalogued span the nearest endpoint is returned on its own; on
    /// a stored epoch that set alone is returned; otherwise the two bracketing sets
    /// are returned with weights that sum to one.
    pub fn fetch(&self, index: usize, jd: f64) -> Result<Option<ElementFetch>> {
        let epochs = self.elements(index)?;
        let (first, last) = match (epochs.first(), epochs.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Ok(None),
        };

        if jd.is_nan() || jd <= first.epoch_osculation {
            return Ok(Some(ElementFetch::Single(first)));
        }
        if jd >= last.epoch_osculation {
            return Ok(Some(ElementFetch::Single(last)));
        }

        // First set strictly after jd; always in 1..len here
        let after = epochs.partition_point(|e| e.epoch_osculation <= jd);
        let before = epochs[after - 1];
        if before.epoch_osculation == jd {
            return Ok(Some(ElementFetch::Single(before)));
        }
        let second = epochs[after];
        let t0 = before.epoch_osculation;
        let t1 = second.epoch_osculation;
        Ok(Some(ElementFetch::Bracketed {
            first: before,
            w1: (t1 - jd).abs() / (t1 - t0),
            second,
            w2: (t0 - jd).abs() / (t1 - t0),
        }))
    }

    /// Index of the object with either alias equal to `name`, ignoring case and surrounding blanks
    pub fn search_by_name(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }
        self.names.iter().position(|aliases| {
            aliases
                .iter()
                .any(|alias| alias.trim().eq_ignore_ascii_case(wanted))
        })
    }

    /// Index of the object with catalogue number `number`
    pub fn find_by_number(&self, number: i32) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    /// Load every element record into memory
    pub fn cache_all(&self) -> Result<()> {
        if self.cache.get().is_some() {
            return Ok(());
        }
        let slots = self.len() * self.layout.epoch_max_count;
        let records = {
            let mut file = self.lock_file()?;
            file.seek(SeekFrom::Start(self.layout.elements_offset()))?;
            let mut reader = BufReader::new(&mut *file);
            let mut records = Vec::with_capacity(slots);
            for _ in 0..slots {
                records.push(OrbitalElements::read_binary(&mut reader)?);
            }
            records
        };
        debug!("Cached {} element records from {}", slots, self.path.display());
        // Another thread may have won the race; its copy is identical
        let _ = self.cache.set(records);
        Ok(())
    }

    fn lock_file(&self) -> Result<std::sync::MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| SkychartError::DataError(format!("catalogue {} lock poisoned", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::super::ingest::CatalogueBuilder;
    use super::super::readers::test_lines::*;
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;
    use std::fs::{self, OpenOptions};
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, TempDir};

    const JD_2022: f64 = 2_459_580.5;
    const JD_2024: f64 = 2_460_310.5;

    fn build_asteroids() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dcfbinary.ast");
        let lines = [
            asteroid_line(Some(1), "Ceres", "20240101", 10.0, 73.6, 80.3, 10.6, 0.0785, 2.766),
            asteroid_line(Some(4), "Vesta", "20240101", 20.0, 151.0, 103.8, 7.1, 0.0887, 2.362),
            asteroid_line(None, "2003 AB12", "20240101", 1.0, 2.0, 3.0, 4.0, 0.1, 2.5),
        ];
        let mut builder = CatalogueBuilder::new(ObjectClass::Asteroid);
        builder.ingest_reader(Cursor::new(lines.join("\n"))).unwrap();
        let older = asteroid_line(Some(1), "Ceres", "20220101", 0.0, 73.6, 80.3, 10.6, 0.0785, 2.766);
        builder.ingest_reader(Cursor::new(older)).unwrap();
        builder.write(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn test_open_reads_tables() {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.names(0).unwrap()[0], "Ceres");
        assert_eq!(catalogue.epoch_count(0), Some(2));
        assert_eq!(catalogue.epoch_count(1), Some(1));
        assert_eq!(catalogue.is_secure(2), Some(true));
        assert!(catalogue.names(3).is_none());
    }

    #[test]
    fn test_search_by_name() {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();
        assert_eq!(catalogue.search_by_name("  vesta "), Some(1));
        assert_eq!(catalogue.search_by_name("4"), Some(1));
        assert_eq!(catalogue.search_by_name("2003 ab12"), Some(2));
        assert_eq!(catalogue.search_by_name("Pallas"), None);
        assert_eq!(catalogue.search_by_name(""), None);
        assert_eq!(catalogue.find_by_number(4), Some(1));
        assert_eq!(catalogue.find_by_number(2), None);
    }

    #[test]
    fn test_fetch_endpoints_have_unit_weight() {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();

        let early = catalogue.fetch(0, JD_2022 - 1000.0).unwrap().unwrap();
        assert_eq!(early.weights(), (1.0, 0.0));
        assert_eq!(early.dominant().epoch_osculation, JD_2022);

        let late = catalogue.fetch(0, JD_2024 + 1000.0).unwrap().unwrap();
        assert_eq!(late.dominant().epoch_osculation, JD_2024);

        let exact = catalogue.fetch(0, JD_2024).unwrap().unwrap();
        assert!(matches!(exact, ElementFetch::Single(_)));

        assert!(catalogue.fetch(7, JD_2024).unwrap().is_none());
    }

    #[rstest]
    #[case(0.1)]
    #[case(0.5)]
    #[case(0.9)]
    fn test_fetch_bracketing_weights(#[case] fraction: f64) {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();
        let jd = JD_2022 + fraction * (JD_2024 - JD_2022);
        let fetch = catalogue.fetch(0, jd).unwrap().unwrap();
        let (w1, w2) = fetch.weights();
        assert_abs_diff_eq!(w1 + w2, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w2, fraction, epsilon = 1e-9);
    }

    #[test]
    fn test_weights_monotonic_between_epochs() {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();
        let mut previous = 0.0;
        for step in 1..20 {
            let jd = JD_2022 + step as f64 * (JD_2024 - JD_2022) / 20.0;
            let (_, w2) = catalogue.fetch(0, jd).unwrap().unwrap().weights();
            assert!(w2 > previous);
            previous = w2;
        }
    }

    #[test]
    fn test_cache_matches_disk() {
        let (_dir, path) = build_asteroids();
        let catalogue = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap();
        let from_disk = catalogue.elements(0).unwrap();
        catalogue.cache_all().unwrap();
        assert!(catalogue.is_cached());
        assert_eq!(catalogue.elements(0).unwrap(), from_disk);
        assert_eq!(catalogue.elements(1).unwrap().len(), 1);
    }

    #[test]
    fn test_unready_file_rejected() {
        let (_dir, path) = build_asteroids();
        let mut bytes = fs::read(&path).unwrap();
        bytes[0..4].copy_from_slice(&0i32.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap_err();
        assert!(matches!(err, SkychartError::CatalogueError { ref reason, .. } if reason.contains("ready")));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (_dir, path) = build_asteroids();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0u8; 17]).unwrap();
        drop(file);

        let err = ElementCatalogue::open(&path, ObjectClass::Asteroid).unwrap_err();
        assert!(matches!(err, SkychartError::CatalogueError { ref reason, .. } if reason.contains("length")));
    }

    #[test]
    fn test_class_limit_checked() {
        let (_dir, path) = build_asteroids();
        let mut bytes = fs::read(&path).unwrap();
        // Claim more objects than a planet catalogue may hold
        bytes[100..104].copy_from_slice(&60i32.to_le_bytes());
        fs::write(&path, bytes).unwrap();
        assert!(ElementCatalogue::open(&path, ObjectClass::Planet).is_err());
    }
}
