//! Building binary catalogues from ASCII element files

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

use super::layout::{write_fixed_string, CatalogueHeader, NAME_LENGTH};
use super::readers::{ElementReader, RecordKey};
use super::{ObjectClass, OrbitalElements};
use crate::time::jd_now;
use crate::{Result, SkychartError};

/// Counters collected while ingesting source files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files: usize,
    pub lines: usize,
    /// Lines that parsed into a record
    pub records: usize,
    /// Non-comment lines that could not be parsed
    pub rejected: usize,
    /// Records skipped because their name already appeared in the same file
    pub duplicate_names: usize,
    /// Records skipped because the object already had an element set at that epoch
    pub duplicate_epochs: usize,
    /// Records dropped because the class limit was reached
    pub over_limit: usize,
}

#[derive(Debug)]
struct PendingObject {
    names: [String; 2],
    secure: bool,
    epochs: Vec<OrbitalElements>,
}

/// Accumulates element sets for one object class and writes them out as a binary catalogue
///
/// Objects are kept in order of first appearance. Records for the same object
/// from different files are merged into one epoch list.
#[derive(Debug)]
pub struct CatalogueBuilder {
    class: ObjectClass,
    reader: ElementReader,
    objects: Vec<PendingObject>,
    index: HashMap<RecordKey, usize>,
    stats: IngestStats,
}

impl CatalogueBuilder {
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            reader: ElementReader::for_class(class),
            objects: Vec::new(),
            index: HashMap::new(),
            stats: IngestStats::default(),
        }
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Number of distinct objects ingested so far
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Ingest every file named in a source list
    ///
    /// The list holds one path per line; blank lines and lines starting with `#`
    /// are ignored and relative paths are resolved against `base_dir`. Files that
    /// cannot be opened are skipped with a warning. Returns the number of files read.
    pub fn ingest_source_list<P: AsRef<Path>>(&mut self, list_path: P, base_dir: &Path) -> Result<usize> {
        let list_path = list_path.as_ref();
        let text = fs::read_to_string(list_path)?;
        let mut count = 0;
        for entry in source_entries(&text) {
            let path = base_dir.join(entry);
            match self.ingest_file(&path) {
                Ok(()) => count += 1,
                Err(SkychartError::IoError(e)) => {
                    warn!("Skipping {} source {}: {}", self.class.label(), path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }

    /// Ingest one ASCII element file
    pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Reading {} elements from {}", self.class.label(), path.display());
        let file = File::open(path)?;
        self.ingest_reader(BufReader::new(file))
    }

    /// Ingest records from any buffered reader, treated as a single source file
    ///
    /// Lines that are not valid UTF-8 are rejected individually.
    pub fn ingest_reader<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut seen_in_file: HashSet<RecordKey> = HashSet::new();
        self.stats.files += 1;

        let mut buffer = Vec::new();
        let mut line_number = 0;
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_number += 1;
            self.stats.lines += 1;
            while matches!(buffer.last(), Some(b'\n' | b'\r')) {
                buffer.pop();
            }
            let line = match std::str::from_utf8(&buffer) {
                Ok(line) => line,
                Err(_) => {
                    debug!("Line {} is not valid UTF-8; rejected", line_number);
                    self.stats.rejected += 1;
                    continue;
                }
            };
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let record = match self.reader.parse_line(line) {
                Some(record) => record,
                None => {
                    debug!("Line {} rejected by {:?} reader", line_number, self.reader);
                    self.stats.rejected += 1;
                    continue;
                }
            };
            self.stats.records += 1;

            if !seen_in_file.insert(record.key.clone()) {
                debug!("Duplicate object <{}> on line {}; skipping", record.names[0], line_number);
                self.stats.duplicate_names += 1;
                continue;
            }

            let index = match self.index.get(&record.key) {
                Some(&index) => index,
                None => {
                    if self.objects.len() >= self.class.max_objects() {
                        if self.stats.over_limit == 0 {
                            warn!(
                                "Too many {} objects; limit is {}",
                                self.class.label(),
                                self.class.max_objects()
                            );
                        }
                        self.stats.over_limit += 1;
                        continue;
                    }
                    self.objects.push(PendingObject {
                        names: record.names.clone(),
                        secure: false,
                        epochs: Vec::new(),
                    });
                    self.index.insert(record.key.clone(), self.objects.len() - 1);
                    self.objects.len() - 1
                }
            };

            let object = &mut self.objects[index];
            let epoch = record.elements.epoch_osculation;
            if object.epochs.iter().any(|e| e.epoch_osculation == epoch) {
                self.stats.duplicate_epochs += 1;
                continue;
            }
            object.secure |= record.elements.secure_orbit;
            object.epochs.push(record.elements);
        }
        Ok(())
    }

    /// Sort epochs and write the catalogue to `path`
    ///
    /// The file is written under a temporary name with its ready flag clear,
    /// marked ready once complete, then renamed into place.
    pub fn write<P: AsRef<Path>>(mut self, path: P) -> Result<CatalogueHeader> {
        let path = path.as_ref();
        for object in self.objects.iter_mut() {
            object
                .epochs
                .sort_by(|a, b| a.epoch_osculation.total_cmp(&b.epoch_osculation));
        }

        let epoch_max_count = self
            .objects
            .iter()
            .map(|o| o.epochs.len())
            .max()
            .unwrap_or(0)
            .max(1);
        let mut header = CatalogueHeader {
            ready: false,
            creation_epoch: jd_now(),
            version: concat!("skychart ", env!("CARGO_PKG_VERSION")).to_string(),
            hostname: env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string()),
            max_objects: self.objects.len() as u32,
            object_count: self.objects.len() as u32,
            secure_count: self.objects.iter().filter(|o| o.secure).count() as u32,
            epoch_max_count: epoch_max_count as u32,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = temporary_path(path);
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);

        header.write_binary(&mut writer)?;
        for object in &self.objects {
            for name in &object.names {
                write_fixed_string(&mut writer, name, NAME_LENGTH)?;
            }
        }
        for object in &self.objects {
            writer.write_i32::<LittleEndian>(object.secure as i32)?;
        }
        for object in &self.objects {
            writer.write_i32::<LittleEndian>(object.epochs.len() as i32)?;
        }
        let blank = OrbitalElements::default();
        for object in &self.objects {
            for slot in 0..epoch_max_count {
                object.epochs.get(slot).unwrap_or(&blank).write_binary(&mut writer)?;
            }
        }

        writer.seek(SeekFrom::Start(0))?;
        writer.write_i32::<LittleEndian>(1)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)?;
        header.ready = true;

        info!(
            "Wrote {} {} objects ({} secure, up to {} epochs) to {} ({} bytes)",
            header.object_count,
            self.class.label(),
            header.secure_count,
            header.epoch_max_count,
            path.display(),
            header.layout().file_length()
        );
        Ok(header)
    }
}

/// Non-comment entries of a source-list file
pub(crate) fn source_entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
