//! Parsers for the ASCII orbital element formats
//!
//! Each format is fixed-column. A field is read as the leading number found
//! after skipping blanks from its starting column (0-based).
//!
//! - planets: JPL approximate Keplerian elements, one line per planet
//! - asteroids: Lowell Observatory `astorb.dat`
//! - comets: Minor Planet Center `Soft00Cmt.txt`

use lazy_static::lazy_static;
use regex::Regex;

use super::{ObjectClass, OrbitalElements};
use crate::constants::{AU_M, DAY_S, DEG2RAD, GM_SUN, JULIAN_CENTURY, TAU};
use crate::time::{jd_from_unix, julian_day};

lazy_static! {
    static ref LEADING_FLOAT: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eEdD][+-]?\d+)?").expect("valid regex");
}

/// Arcseconds per century to radians per day
const ASEC_PER_CENTURY: f64 = DEG2RAD / 3600.0 / JULIAN_CENTURY;

/// How a record identifies its object when merging epochs from several files
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Number(i32),
    /// Lowercased primary name
    Name(String),
}

/// One successfully parsed line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub key: RecordKey,
    pub names: [String; 2],
    pub elements: OrbitalElements,
}

/// Line parser for one source format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementReader {
    Planet,
    Asteroid,
    Comet,
}

impl ElementReader {
    /// Reader for the source format of an object class
    pub fn for_class(class: ObjectClass) -> Self {
        match class {
            ObjectClass::Planet => ElementReader::Planet,
            ObjectClass::Asteroid => ElementReader::Asteroid,
            ObjectClass::Comet => ElementReader::Comet,
        }
    }

    /// Shortest line that can hold a complete record
    pub fn min_line_length(&self) -> usize {
        match self {
            ElementReader::Planet => 100,
            ElementReader::Asteroid => 250,
            ElementReader::Comet => 100,
        }
    }

    /// Parse one line, returning `None` for comments, short lines and unparseable records
    pub fn parse_line(&self, line: &str) -> Option<ParsedRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() || line.starts_with('#') || line.len() < self.min_line_length() {
            return None;
        }
        if !line.is_ascii() {
            return None;
        }
        match self {
            ElementReader::Planet => parse_planet(line),
            ElementReader::Asteroid => parse_asteroid(line),
            ElementReader::Comet => parse_comet(line),
        }
    }
}

/// Leading number in `line` after skipping blanks from column `col`
fn float_at(line: &str, col: usize) -> Option<f64> {
    let rest = line.get(col..)?.trim_start();
    let m = LEADING_FLOAT.find(rest)?;
    m.as_str().replace(['d', 'D'], "e").parse().ok()
}

/// Text from `col` up to the next blank
fn word_at(line: &str, col: usize) -> Option<&str> {
    let rest = line.get(col..)?;
    let word = rest.split(|c: char| c <= ' ').next()?;
    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Julian date (midnight) of a YYYYMMDD stamp
fn jd_from_stamp(stamp: f64) -> Option<f64> {
    if !stamp.is_finite() || stamp <= 0.0 {
        return None;
    }
    let stamp = stamp.floor() as i64;
    julian_day(
        (stamp / 10_000) as i32,
        ((stamp / 100) % 100) as i32,
        (stamp % 100) as i32,
        0,
        0,
        0,
    )
    .ok()
}

fn parse_planet(line: &str) -> Option<ParsedRecord> {
    let body_id = float_at(line, 0)? as i32;
    let name = word_at(line, 141)?.to_string();

    let long_asc_node = float_at(line, 65)? * DEG2RAD;
    let long_asc_node_dot = float_at(line, 75)? * ASEC_PER_CENTURY;
    let longitude_perihelion = float_at(line, 101)? * DEG2RAD;
    let longitude_perihelion_dot = float_at(line, 111)? * ASEC_PER_CENTURY;
    let mean_longitude = float_at(line, 120)? * DEG2RAD;

    let elements = OrbitalElements {
        number: body_id,
        secure_orbit: true,
        epoch_osculation: jd_from_unix(float_at(line, 130)?),
        absolute_mag: 999.0,
        slope_g: 2.0,
        semi_major_axis: float_at(line, 18)?,
        semi_major_axis_dot: float_at(line, 30)? / JULIAN_CENTURY,
        eccentricity: float_at(line, 42)?,
        eccentricity_dot: float_at(line, 53)? / JULIAN_CENTURY,
        long_asc_node,
        long_asc_node_dot,
        inclination: float_at(line, 85)? * DEG2RAD,
        inclination_dot: float_at(line, 94)? * ASEC_PER_CENTURY,
        mean_anomaly: mean_longitude - longitude_perihelion,
        argument_perihelion: longitude_perihelion - long_asc_node,
        argument_perihelion_dot: longitude_perihelion_dot - long_asc_node_dot,
        ..OrbitalElements::default()
    };

    Some(ParsedRecord {
        key: RecordKey::Number(body_id),
        names: [name, body_id.to_string()],
        elements,
    })
}

fn parse_asteroid(line: &str) -> Option<ParsedRecord> {
    let leading_blanks = line.len() - line.trim_start().len();
    let number = if leading_blanks >= 6 {
        None
    } else {
        Some(float_at(line, 0)? as i32)
    };

    let name = line.get(7..26)?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    // The observation span is a 6-character field which may run into the next column
    let day_obs_span = line.get(94..100).and_then(|field| float_at(field, 0)).unwrap_or(0.0);
    let obs_count = float_at(line, 100).unwrap_or(0.0);

    let elements = OrbitalElements {
        number: number.unwrap_or(-1),
        secure_orbit: day_obs_span > 3650.0 && obs_count > 500.0,
        epoch_osculation: jd_from_stamp(float_at(line, 106)?)?,
        absolute_mag: float_at(line, 42)?,
        slope_g: float_at(line, 48)?,
        mean_anomaly: float_at(line, 115)? * DEG2RAD,
        argument_perihelion: float_at(line, 126)? * DEG2RAD,
        long_asc_node: float_at(line, 137)? * DEG2RAD,
        inclination: float_at(line, 147)? * DEG2RAD,
        eccentricity: float_at(line, 157)?,
        semi_major_axis: float_at(line, 168)?,
        ..OrbitalElements::default()
    };

    let (key, names) = match number {
        Some(n) => (RecordKey::Number(n), [name, n.to_string()]),
        None => (RecordKey::Name(name.to_lowercase()), [name.clone(), name]),
    };
    Some(ParsedRecord {
        key,
        names,
        elements,
    })
}

fn parse_comet(line: &str) -> Option<ParsedRecord> {
    let name: String = line
        .get(102..)?
        .chars()
        .take_while(|&c| c != '(')
        .take(23)
        .collect::<String>()
        .trim_end()
        .to_string();
    let designation: String = line.trim_start().chars().take_while(|&c| c > ' ').take(23).collect();
    if name.is_empty() || designation.is_empty() {
        return None;
    }

    let perihelion_distance = float_at(line, 31)?;
    let perihelion_year = float_at(line, 14)? as i32;
    let perihelion_month = float_at(line, 19)? as i32;
    let perihelion_day = float_at(line, 22)?;
    let perihelion_date = julian_day(
        perihelion_year,
        perihelion_month,
        perihelion_day.floor() as i32,
        ((perihelion_day * 24.0).floor() as i64 % 24) as i32,
        ((perihelion_day * 1440.0).floor() as i64 % 60) as i32,
        ((perihelion_day * 86_400.0).floor() as i64 % 60) as i32,
    )
    .ok()?;

    let eccentricity = float_at(line, 41)?;
    let epoch = float_at(line, 81)
        .and_then(jd_from_stamp)
        .unwrap_or(perihelion_date);

    let semi_major_axis = perihelion_distance / (1.0 - eccentricity);
    let mean_motion = (GM_SUN / (semi_major_axis.abs() * AU_M).powi(3)).sqrt();
    let mean_anomaly =
        (mean_motion * (epoch - perihelion_date) * DAY_S + 100.0 * std::f64::consts::PI) % TAU;

    let elements = OrbitalElements {
        number: -1,
        secure_orbit: true,
        epoch_osculation: epoch,
        epoch_perihelion: perihelion_date,
        absolute_mag: float_at(line, 90).unwrap_or(f64::NAN),
        slope_n: float_at(line, 96).unwrap_or(2.0),
        mean_anomaly,
        argument_perihelion: float_at(line, 51)? * DEG2RAD,
        long_asc_node: float_at(line, 61)? * DEG2RAD,
        inclination: float_at(line, 71)? * DEG2RAD,
        eccentricity,
        semi_major_axis,
        ..OrbitalElements::default()
    };

    Some(ParsedRecord {
        key: RecordKey::Name(name.to_lowercase()),
        names: [name, designation],
        elements,
    })
}


#[cfg(test)]
mod tests {
    use super::test_lines::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_float_at_skips_blanks() {
        assert_eq!(float_at("    12.5abc", 0), Some(12.5));
        assert_eq!(float_at("xx  -3e2", 2), Some(-300.0));
        assert_eq!(float_at("xx  1.5D-3", 2), Some(0.0015));
        assert_eq!(float_at("     ", 0), None);
        assert_eq!(float_at("abc", 10), None);
    }

    #[test]
    fn test_comment_and_short_lines_ignored() {
        assert!(ElementReader::Planet.parse_line("# comment").is_none());
        assert!(ElementReader::Planet.parse_line("").is_none());
        assert!(ElementReader::Asteroid.parse_line(&"1".repeat(120)).is_none());
    }

    #[test]
    fn test_planet_line() {
        let line = planet_line(4, "Jupiter", 5.2, 0.048, 100.5, 1.3, 14.7, 34.4, 946_728_000.0);
        let record = ElementReader::Planet.parse_line(&line).unwrap();
        assert_eq!(record.key, RecordKey::Number(4));
        assert_eq!(record.names, ["Jupiter".to_string(), "4".to_string()]);

        let e = record.elements;
        assert_eq!(e.number, 4);
        assert!(e.secure_orbit);
        assert_abs_diff_eq!(e.epoch_osculation, 2_451_545.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.semi_major_axis, 5.2, epsilon = 1e-12);
        assert_abs_diff_eq!(e.mean_anomaly, (34.4 - 14.7) * DEG2RAD, epsilon = 1e-12);
        assert_abs_diff_eq!(e.argument_perihelion, (14.7 - 100.5) * DEG2RAD, epsilon = 1e-12);
        assert_eq!(e.absolute_mag, 999.0);
    }

    #[test]
    fn test_planet_rates_converted_per_day() {
        let mut line = planet_line(3, "Mars", 1.52, 0.093, 49.5, 1.85, 336.0, 355.4, 946_728_000.0);
        line.replace_range(75..84, "-1000.0  ");
        let record = ElementReader::Planet.parse_line(&line).unwrap();
        assert_abs_diff_eq!(
            record.elements.long_asc_node_dot,
            -1000.0 / 3600.0 * DEG2RAD / 36_525.0,
            epsilon = 1e-18
        );
        assert_abs_diff_eq!(
            record.elements.argument_perihelion_dot,
            1000.0 / 3600.0 * DEG2RAD / 36_525.0,
            epsilon = 1e-18
        );
    }

    #[test]
    fn test_numbered_asteroid_line() {
        let line = asteroid_line(
            Some(433),
            "Eros",
            "20230913",
            110.8,
            178.9,
            304.3,
            10.8,
            0.2228,
            1.4583,
        );
        let record = ElementReader::Asteroid.parse_line(&line).unwrap();
        assert_eq!(record.key, RecordKey::Number(433));
        assert_eq!(record.names, ["Eros".to_string(), "433".to_string()]);
        let e = record.elements;
        assert!(e.secure_orbit);
        assert_abs_diff_eq!(e.epoch_osculation, 2_460_200.5, epsilon = 1e-9);
        assert_abs_diff_eq!(e.inclination, 10.8 * DEG2RAD, epsilon = 1e-12);
        assert_abs_diff_eq!(e.slope_g, 0.12, epsilon = 1e-12);
    }

    #[test]
    fn test_unnumbered_asteroid_keyed_by_name() {
        let line = asteroid_line(None, "2003 AB12", "20230913", 1.0, 2.0, 3.0, 4.0, 0.1, 2.5);
        let record = ElementReader::Asteroid.parse_line(&line).unwrap();
        assert_eq!(record.key, RecordKey::Name("2003 ab12".to_string()));
        assert_eq!(record.names[0], record.names[1]);
        assert_eq!(record.elements.number, -1);
    }

    #[test]
    fn test_comet_line() {
        let line = comet_line(
            "0001P",
            "1P/Halley",
            (1986, 2, 9.4589),
            0.5871,
            0.9671,
            111.33,
            58.42,
            162.26,
            "19860205",
        );
        let record = ElementReader::Comet.parse_line(&line).unwrap();
        assert_eq!(record.names, ["1P/Halley".to_string(), "0001P".to_string()]);
        assert_eq!(record.key, RecordKey::Name("1p/halley".to_string()));

        let e = record.elements;
        let tp = julian_day(1986, 2, 9, 11, 0, 48).unwrap();
        assert_abs_diff_eq!(e.epoch_perihelion, tp, epsilon = 1e-6);
        assert_abs_diff_eq!(e.semi_major_axis, 0.5871 / (1.0 - 0.9671), epsilon = 1e-9);
        assert_abs_diff_eq!(e.absolute_mag, 5.5, epsilon = 1e-12);
        assert_abs_diff_eq!(e.slope_n, 4.0, epsilon = 1e-12);
        assert!(e.mean_anomaly >= 0.0 && e.mean_anomaly < TAU);
    }

    #[test]
    fn test_comet_without_epoch_uses_perihelion() {
        let line = comet_line(
            "C/2020 F3",
            "NEOWISE",
            (2020, 7, 3.6767),
            0.2947,
            0.9992,
            37.28,
            61.01,
            128.94,
            "        ",
        );
        let record = ElementReader::Comet.parse_line(&line).unwrap();
        let e = record.elements;
        assert_eq!(e.epoch_osculation, e.epoch_perihelion);
        // 100 pi is a whole number of turns, so M wraps to zero at perihelion
        assert_abs_diff_eq!(e.mean_anomaly, 0.0, epsilon = 1e-9);
        assert_eq!(record.names[1], "C/2020");
    }
}
