//! NAIF Double Array File (DAF) reader
//!
//! A DAF is a sequence of 1024-byte records. Record 1 is the file record;
//! summary records form a doubly linked list starting at `fward`, each
//! followed by a record of segment names. Array data is addressed in
//! 1-based double-precision words.

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

use super::errors::{io_err, JplephemError, Result};

/// Size of a DAF record (bytes)
const RECORD_SIZE: usize = 1024;
/// Size of a double-precision word (bytes)
const WORD_SIZE: usize = 8;
/// Upper bound on summary records followed, guarding against cycles
const MAX_SUMMARY_RECORDS: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// One array descriptor from a summary record
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub name: String,
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

/// A memory-mapped DAF file
pub struct Daf {
    pub path: PathBuf,
    /// File identification word, e.g. "DAF/SPK"
    pub locidw: String,
    pub nd: usize,
    pub ni: usize,
    /// Internal file name
    pub ifname: String,
    pub fward: usize,
    pub endian: Endian,
    map: Mmap,
}

impl Daf {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| io_err(&path, e))?;
        // SAFETY: the kernel is opened read-only and is not expected to change while mapped
        let map = unsafe { Mmap::map(&file) }.map_err(|e| io_err(&path, e))?;
        if map.len() < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is shorter than one DAF record",
                path.display()
            )));
        }

        let locidw = String::from_utf8_lossy(&map[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && !locidw.starts_with("NAIF/DAF") {
            return Err(JplephemError::InvalidFormat(format!(
                "unrecognised file identifier {:?}",
                locidw
            )));
        }
        let endian = match &map[88..96] {
            b"BIG-IEEE" => Endian::Big,
            b"LTL-IEEE" => Endian::Little,
            other => {
                return Err(JplephemError::InvalidFormat(format!(
                    "unsupported numeric format {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let mut daf = Daf {
            path,
            locidw,
            nd: 0,
            ni: 0,
            ifname: String::from_utf8_lossy(&map[16..76]).trim_end().to_string(),
            fward: 0,
            endian,
            map,
        };
        let nd = daf.read_i32(8);
        let ni = daf.read_i32(12);
        let fward = daf.read_i32(76);
        if !(1..=124).contains(&nd) || !(2..=250).contains(&ni) || fward < 2 {
            return Err(JplephemError::InvalidFormat(format!(
                "invalid DAF header: nd={}, ni={}, fward={}",
                nd, ni, fward
            )));
        }
        daf.nd = nd as usize;
        daf.ni = ni as usize;
        daf.fward = fward as usize;
        Ok(daf)
    }

    fn read_i32(&self, offset: usize) -> i32 {
        let bytes = &self.map[offset..offset + 4];
        match self.endian {
            Endian::Big => BigEndian::read_i32(bytes),
            Endian::Little => LittleEndian::read_i32(bytes),
        }
    }

    fn read_f64(&self, offset: usize) -> f64 {
        let bytes = &self.map[offset..offset + 8];
        match self.endian {
            Endian::Big => BigEndian::read_f64(bytes),
            Endian::Little => LittleEndian::read_f64(bytes),
        }
    }

    fn record(&self, record_number: usize) -> Result<usize> {
        let offset = record_number.saturating_sub(1) * RECORD_SIZE;
        if record_number == 0 || offset + RECORD_SIZE > self.map.len() {
            return Err(JplephemError::InvalidFormat(format!(
                "record {} lies beyond the end of {}",
                record_number,
                self.path.display()
            )));
        }
        Ok(offset)
    }

    /// Size of one summary in words
    fn summary_words(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    /// All array summaries, in file order
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let mut result = Vec::new();
        let mut record_number = self.fward;
        let mut visited = 0;
        let per_record = (RECORD_SIZE / WORD_SIZE - 3) / self.summary_words();
        let name_length = self.summary_words() * WORD_SIZE;

        while record_number > 0 && visited < MAX_SUMMARY_RECORDS {
            let summary_offset = self.record(record_number)?;
            let name_offset = self.record(record_number + 1)?;
            let next = self.read_f64(summary_offset) as usize;
            let count = (self.read_f64(summary_offset + 16) as usize).min(per_record);

            for i in 0..count {
                let start = summary_offset + 24 + i * self.summary_words() * WORD_SIZE;
                let doubles = (0..self.nd)
                    .map(|j| self.read_f64(start + j * WORD_SIZE))
                    .collect();
                let int_start = start + self.nd * WORD_SIZE;
                let ints = (0..self.ni).map(|j| self.read_i32(int_start + j * 4)).collect();
                let name_bytes = &self.map[name_offset + i * name_length..name_offset + (i + 1) * name_length];
                let name = String::from_utf8_lossy(name_bytes)
                    .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string();
                result.push(Summary { name, doubles, ints });
            }

            record_number = next;
            visited += 1;
        }
        Ok(result)
    }

    /// Words `start..=end` (1-based addresses)
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start == 0 || end < start || end * WORD_SIZE > self.map.len() {
            return Err(JplephemError::InvalidFormat(format!(
                "array {}..{} outside {}",
                start,
                end,
                self.path.display()
            )));
        }
        Ok((start..=end)
            .map(|word| self.read_f64((word - 1) * WORD_SIZE))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod test_kernel {
    //! Writer for small synthetic little-endian SPK kernels

    use byteorder::{LittleEndian, WriteBytesExt};
    use std::fs;
    use std::path::Path;

    /// A type 2 segment with one Chebyshev record per interval
    pub struct TestSegment {
        pub target: i32,
        pub center: i32,
        pub init: f64,
        pub intlen: f64,
        /// Per record: [x coefficients, y coefficients, z coefficients]
        pub records: Vec<[Vec<f64>; 3]>,
    }

    pub fn write_kernel(path: &Path, segments: &[TestSegment]) {
        let mut data: Vec<f64> = Vec::new();
        let mut descriptors = Vec::new();
        let first_data_word = 3 * 128 + 1;

        for segment in segments {
            let degree_plus_one = segment.records[0][0].len();
            let rsize = 2 + 3 * degree_plus_one;
            let start = first_data_word + data.len();
            for (k, record) in segment.records.iter().enumerate() {
                data.push(segment.init + segment.intlen * (k as f64 + 0.5));
                data.push(segment.intlen / 2.0);
                for component in record {
                    data.extend_from_slice(component);
                }
            }
            data.extend_from_slice(&[segment.init, segment.intlen, rsize as f64, segment.records.len() as f64]);
            let end = first_data_word + data.len() - 1;
            let end_et = segment.init + segment.intlen * segment.records.len() as f64;
            descriptors.push((segment.init, end_et, segment.target, segment.center, start, end));
        }

        let mut bytes = Vec::new();
        // File record
        bytes.extend_from_slice(b"DAF/SPK ");
        bytes.write_i32::<LittleEndian>(2).unwrap();
        bytes.write_i32::<LittleEndian>(6).unwrap();
        bytes.extend_from_slice(&[b' '; 60]);
        bytes.write_i32::<LittleEndian>(2).unwrap();
        bytes.write_i32::<LittleEndian>(2).unwrap();
        bytes.write_i32::<LittleEndian>((first_data_word + data.len()) as i32).unwrap();
        bytes.extend_from_slice(b"LTL-IEEE");
        bytes.resize(1024, 0);

        // Summary record
        bytes.write_f64::<LittleEndian>(0.0).unwrap();
        bytes.write_f64::<LittleEndian>(0.0).unwrap();
        bytes.write_f64::<LittleEndian>(descriptors.len() as f64).unwrap();
        for (start_et, end_et, target, center, start, end) in &descriptors {
            bytes.write_f64::<LittleEndian>(*start_et).unwrap();
            bytes.write_f64::<LittleEndian>(*end_et).unwrap();
            for value in [*target, *center, 1, 2, *start as i32, *end as i32] {
                bytes.write_i32::<LittleEndian>(value).unwrap();
            }
        }
        bytes.resize(2048, 0);

        // Name record
        for (i, _) in descriptors.iter().enumerate() {
            let mut name = format!("TEST SEGMENT {}", i).into_bytes();
            name.resize(40, b' ');
            bytes.extend_from_slice(&name);
        }
        bytes.resize(3072, 0);

        for value in data {
            bytes.write_f64::<LittleEndian>(value).unwrap();
        }
        fs::write(path, bytes).unwrap();
    }
}
