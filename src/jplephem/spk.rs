//! Spacecraft and Planet Kernel (SPK) reader for Chebyshev segment types 2 and 3
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html

use nalgebra::Vector3;
use std::path::Path;

use super::chebyshev::{normalize_time, ChebyshevPolynomial};
use super::daf::{Daf, Summary};
use super::errors::{JplephemError, Result};
use crate::constants::{DAY_S, J2000};

/// Convert seconds past J2000 (TDB) to a Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}

/// Convert a Julian date to seconds past J2000 (TDB)
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// One segment: a Chebyshev representation of `target` relative to `center`
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub target: i32,
    pub center: i32,
    pub frame: i32,
    pub data_type: i32,
    pub start_jd: f64,
    pub end_jd: f64,
    start_word: usize,
    /// Epoch of the start of the first record, seconds past J2000
    init: f64,
    /// Length of each record's interval, seconds
    intlen: f64,
    /// Record size in words
    rsize: usize,
    n_records: usize,
}

impl Segment {
    /// First and last word of the segment's array
    fn words(summary: &Summary) -> Result<(usize, usize)> {
        let (start, end) = (summary.ints[4], summary.ints[5]);
        if start < 1 || i64::from(end) < i64::from(start) + 3 {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {} spans words {}..{}",
                summary.name, start, end
            )));
        }
        Ok((start as usize, end as usize))
    }

    /// Build a segment from its summary and the four-word trailer `[init, intlen, rsize, n]`
    fn from_summary(summary: Summary, trailer: [f64; 4]) -> Result<Self> {
        let (start_word, _) = Self::words(&summary)?;
        let [init, intlen, rsize, n_records] = trailer;
        if !(rsize >= 3.0 && n_records >= 1.0 && intlen > 0.0 && init.is_finite()) {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {} has record size {}, {} records of {} s",
                summary.name, rsize, n_records, intlen
            )));
        }
        Ok(Self {
            target: summary.ints[0],
            center: summary.ints[1],
            frame: summary.ints[2],
            data_type: summary.ints[3],
            start_jd: seconds_to_jd(summary.doubles[0]),
            end_jd: seconds_to_jd(summary.doubles[1]),
            name: summary.name,
            start_word,
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        })
    }

    pub fn covers(&self, jd: f64) -> bool {
        jd >= self.start_jd && jd <= self.end_jd
    }

    /// Position of the target relative to the centre at `jd`, in km
    pub fn position(&self, daf: &Daf, jd: f64) -> Result<Vector3<f64>> {
        if !self.covers(jd) {
            return Err(JplephemError::OutOfRangeError {
                jd,
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }
        let components = match self.data_type {
            2 => 3,
            3 => 6,
            other => return Err(JplephemError::UnsupportedDataType(other)),
        };
        let n_coefficients = (self.rsize - 2) / components;

        let et = jd_to_seconds(jd);
        let index = (((et - self.init) / self.intlen).floor().max(0.0) as usize).min(self.n_records - 1);
        let first = self.start_word + index * self.rsize;
        let record = daf.read_array(first, first + self.rsize - 1)?;

        let s = normalize_time(et, record[0], record[1]).clamp(-1.0, 1.0);
        let coefficient = |axis: usize| {
            let start = 2 + axis * n_coefficients;
            ChebyshevPolynomial::new(&record[start..start + n_coefficients]).evaluate(s)
        };
        Ok(Vector3::new(coefficient(0), coefficient(1), coefficient(2)))
    }
}

/// An opened SPK kernel
pub struct SPK {
    pub daf: Daf,
    pub segments: Vec<Segment>,
}

impl SPK {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = Daf::open(path)?;
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries need nd=2, ni=6; found nd={}, ni={}",
                daf.nd, daf.ni
            )));
        }

        let mut segments = Vec::new();
        for summary in daf.summaries()? {
            let (_, end) = Segment::words(&summary)?;
            let trailer = daf.read_array(end - 3, end)?;
            segments.push(Segment::from_summary(summary, [trailer[0], trailer[1], trailer[2], trailer[3]])?);
        }
        Ok(Self { daf, segments })
    }

    /// Position of `target` relative to `center` at `jd`, in km
    ///
    /// Later segments take priority over earlier ones covering the same date.
    pub fn position(&self, center: i32, target: i32, jd: f64) -> Result<Vector3<f64>> {
        let mut candidates = self
            .segments
            .iter()
            .filter(|s| s.center == center && s.target == target)
            .peekable();
        let first = match candidates.peek() {
            Some(segment) => (*segment).clone(),
            None => return Err(JplephemError::BodyNotFound { center, target }),
        };
        match candidates.filter(|s| s.covers(jd)).last() {
            Some(segment) => segment.position(&self.daf, jd),
            None => Err(JplephemError::OutOfRangeError {
                jd,
                start_jd: first.start_jd,
                end_jd: first.end_jd,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::daf::test_kernel::*;
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;
    use tempfile::{tempdir, TempDir};

    fn kernel() -> (TempDir, SPK) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bsp");
        write_kernel(
            &path,
            &[
                TestSegment {
                    target: 3,
                    center: 0,
                    init: 0.0,
                    intlen: 4.0 * DAY_S,
                    records: vec![
                        [vec![1.0, 2.0], vec![0.0, 0.0], vec![-1.0, 0.0]],
                        [vec![10.0, 0.0], vec![5.0, 1.0], vec![0.0, 0.0]],
                    ],
                },
                TestSegment {
                    target: 301,
                    center: 3,
                    init: 0.0,
                    intlen: 8.0 * DAY_S,
                    records: vec![[vec![0.0, 0.0, 1.0], vec![7.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]]],
                },
            ],
        );
        let spk = SPK::open(&path).unwrap();
        (dir, spk)
    }

    #[test]
    fn test_segments_listed() {
        let (_dir, spk) = kernel();
        assert_eq!(spk.segments.len(), 2);
        assert_eq!(spk.segments[0].target, 3);
        assert_eq!(spk.segments[0].data_type, 2);
        assert_abs_diff_eq!(spk.segments[0].end_jd, J2000 + 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_position_from_records() {
        let (_dir, spk) = kernel();
        // Three quarters through the first record: s = 0.5
        let p = spk.position(0, 3, J2000 + 3.0).unwrap();
        assert_abs_diff_eq!(p, Vector3::new(2.0, 0.0, -1.0), epsilon = 1e-12);

        // A quarter into the second record: s = -0.5
        let p = spk.position(0, 3, J2000 + 5.0).unwrap();
        assert_abs_diff_eq!(p, Vector3::new(10.0, 4.5, 0.0), epsilon = 1e-12);

        // T2(0.5) = -0.5
        let moon = spk.position(3, 301, J2000 + 6.0).unwrap();
        assert_abs_diff_eq!(moon.x, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(moon.y, 7.0, epsilon = 1e-12);
    }

    fn summary(start: i32, end: i32) -> Summary {
        Summary {
            name: "BROKEN".to_string(),
            doubles: vec![0.0, DAY_S],
            ints: vec![3, 0, 1, 2, start, end],
        }
    }

    #[rstest]
    #[case(0, 20)]
    #[case(10, 12)]
    #[case(10, 2)]
    #[case(i32::MAX - 1, i32::MAX)]
    fn test_bad_word_range_rejected(#[case] start: i32, #[case] end: i32) {
        let result = Segment::from_summary(summary(start, end), [0.0, DAY_S, 11.0, 1.0]);
        assert!(matches!(result, Err(JplephemError::InvalidFormat(_))));
    }

    #[rstest]
    #[case([0.0, DAY_S, 11.0, 0.0])]
    #[case([0.0, DAY_S, 2.0, 1.0])]
    #[case([0.0, DAY_S, f64::NAN, 1.0])]
    #[case([0.0, DAY_S, 11.0, f64::NAN])]
    #[case([0.0, 0.0, 11.0, 1.0])]
    #[case([f64::INFINITY, DAY_S, 11.0, 1.0])]
    fn test_bad_trailer_rejected(#[case] trailer: [f64; 4]) {
        let result = Segment::from_summary(summary(1, 15), trailer);
        assert!(matches!(result, Err(JplephemError::InvalidFormat(_))));
    }

    #[test]
    fn test_trailer_fields_kept() {
        let segment = Segment::from_summary(summary(1, 15), [-DAY_S, DAY_S, 11.0, 1.0]).unwrap();
        assert_eq!((segment.target, segment.center, segment.data_type), (3, 0, 2));
        assert_eq!((segment.start_word, segment.rsize, segment.n_records), (1, 11, 1));
        assert_abs_diff_eq!(segment.end_jd, J2000 + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lookup_errors() {
        let (_dir, spk) = kernel();
        assert!(matches!(
            spk.position(0, 10, J2000),
            Err(JplephemError::BodyNotFound { center: 0, target: 10 })
        ));
        assert!(matches!(
            spk.position(0, 3, J2000 + 100.0),
            Err(JplephemError::OutOfRangeError { .. })
        ));
    }
}
