//! Calendar and Julian date conversions
//!
//! Dates follow the British calendar: the Julian calendar up to 1752-09-02,
//! then the Gregorian calendar from 1752-09-14. The eleven days between never
//! happened and are rejected.

mod sidereal;

pub use sidereal::{sidereal_time, sidereal_time_unix};

use chrono::{DateTime, Utc};

use crate::constants::{
    DAY_S, FIRST_GREGORIAN_DATE, GREGORIAN_START_ENGLAND, LAST_JULIAN_DATE, UNIX_EPOCH_JD,
};
use crate::{Result, SkychartError};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEK_DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A broken-down calendar date and time of day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarDate {
    /// Name of this date's month
    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Three-letter abbreviation of the month name
    pub fn month_abbrev(&self) -> &'static str {
        &month_name(self.month)[..3]
    }
}

/// Julian date of the first Gregorian day in England
pub fn switch_over_jd() -> f64 {
    GREGORIAN_START_ENGLAND
}

/// Last Julian and first Gregorian calendar dates, each encoded as YYYYMMDD
pub fn switch_over_calendar_date() -> (f64, f64) {
    (LAST_JULIAN_DATE, FIRST_GREGORIAN_DATE)
}

/// Full English name of month `i` (1-12), or "???" out of range
pub fn month_name(i: u32) -> &'static str {
    match i {
        1..=12 => MONTH_NAMES[(i - 1) as usize],
        _ => "???",
    }
}

/// Name of weekday `i`, where 0 is Monday and 6 is Sunday
pub fn week_day_name(i: u32) -> &'static str {
    WEEK_DAY_NAMES.get(i as usize).copied().unwrap_or("???")
}

/// Convert a calendar date and time into a Julian date
pub fn julian_day(
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
    second: i32,
) -> Result<f64> {
    if !(-1_000_000..=1_000_000).contains(&year) {
        return Err(SkychartError::TimeError(
            "Supplied year is too big.".to_string(),
        ));
    }
    if !(1..=31).contains(&day) {
        return Err(SkychartError::TimeError(
            "Supplied day number should be in the range 1-31.".to_string(),
        ));
    }
    if !(0..=23).contains(&hour) {
        return Err(SkychartError::TimeError(
            "Supplied hour number should be in the range 0-23.".to_string(),
        ));
    }
    if !(0..=59).contains(&minute) {
        return Err(SkychartError::TimeError(
            "Supplied minute number should be in the range 0-59.".to_string(),
        ));
    }
    if !(0..=59).contains(&second) {
        return Err(SkychartError::TimeError(
            "Supplied second number should be in the range 0-59.".to_string(),
        ));
    }
    if !(1..=12).contains(&month) {
        return Err(SkychartError::TimeError(
            "Supplied month number should be in the range 1-12.".to_string(),
        ));
    }

    let (last_julian, first_gregorian) = switch_over_calendar_date();
    let required_date = 10_000.0 * year as f64 + 100.0 * month as f64 + day as f64;

    let (year, month) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };

    // Integer divisions truncate towards zero
    let b = if required_date <= last_julian {
        -2 + ((year + 4716) / 4) - 1179
    } else if required_date >= first_gregorian {
        (year / 400) - (year / 100) + (year / 4)
    } else {
        return Err(SkychartError::TimeError(
            "The requested date never happened in the British calendar: \
             it was lost in the transition from the Julian to the Gregorian calendar."
                .to_string(),
        ));
    };

    let jd = 365.0 * year as f64 - 679_004.0
        + 2_400_000.5
        + b as f64
        + (30.6001 * (month + 1) as f64).floor()
        + day as f64;
    let day_fraction = (hour as f64 + minute as f64 / 60.0 + second as f64 / 3600.0) / 24.0;

    Ok(jd + day_fraction)
}

/// Convert a Julian date back into a calendar date and time
pub fn inv_julian_day(jd: f64) -> Result<CalendarDate> {
    if !jd.is_finite() || !(-1e8..=1e8).contains(&jd) {
        return Err(SkychartError::TimeError(
            "Supplied Julian Day number is too big.".to_string(),
        ));
    }

    let day_fraction = (jd + 0.5) - (jd + 0.5).floor();
    let hour = (24.0 * day_fraction).floor() as u32;
    let minute = (1440.0 * day_fraction).rem_euclid(60.0).floor() as u32;
    let second = (86_400.0 * day_fraction).rem_euclid(60.0);

    // a: whole Julian days; b: centuries since the Council of Nicaea;
    // c: day number as if century leap years happened
    let a = (jd + 0.5).trunc() as i64;
    let c = if (a as f64) < switch_over_jd() {
        a + 1524
    } else {
        let b = ((a as f64 - 1_867_216.25) / 36_524.25).trunc() as i64;
        a + b - (b / 4) + 1525
    };

    // Periods of 365.25 days, with years starting at the end of February
    let d = ((c as f64 - 122.1) / 365.25).trunc() as i64;
    let e = 365 * d + d / 4;
    let f = ((c - e) as f64 / 30.6001).trunc() as i64;

    let day = c - e - (30.6001 * f as f64).trunc() as i64;
    let month = f - 1 - if f >= 14 { 12 } else { 0 };
    let year = d - 4715 - if month >= 3 { 1 } else { 0 };

    Ok(CalendarDate {
        year: year as i32,
        month: month as u32,
        day: day as u32,
        hour,
        minute,
        second,
    })
}

/// Convert a unix timestamp (seconds) into a Julian date
pub fn jd_from_unix(unix: f64) -> f64 {
    unix / DAY_S + UNIX_EPOCH_JD
}

/// Convert a Julian date into a unix timestamp (seconds)
pub fn unix_from_jd(jd: f64) -> f64 {
    (jd - UNIX_EPOCH_JD) * DAY_S
}

/// Julian date of a UTC instant
pub fn jd_from_datetime(datetime: &DateTime<Utc>) -> f64 {
    let unix = datetime.timestamp() as f64 + datetime.timestamp_subsec_nanos() as f64 * 1e-9;
    jd_from_unix(unix)
}

/// Julian date of the current instant
pub fn jd_now() -> f64 {
    jd_from_datetime(&Utc::now())
}

/// Format a Julian date as "YYYY-MM-DD HH:MM:SS"
pub fn format_date(jd: f64) -> Result<String> {
    let date = inv_julian_day(jd)?;
    Ok(format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        date.year,
        date.month,
        date.day,
        date.hour,
        date.minute,
        date.second.floor() as u32
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_j2000_epoch() {
        let jd = julian_day(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(jd, 2_451_545.0);

        let date = inv_julian_day(jd).unwrap();
        assert_eq!(date.year, 2000);
        assert_eq!(date.month, 1);
        assert_eq!(date.day, 1);
        assert_eq!(date.hour, 12);
        assert_eq!(date.minute, 0);
        assert_abs_diff_eq!(date.second, 0.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case(1752, 9, 2, 2_361_220.5)]
    #[case(1752, 9, 14, 2_361_221.5)]
    #[case(1066, 10, 14, 2_110_700.5)]
    #[case(1970, 1, 1, 2_440_587.5)]
    #[case(2024, 2, 29, 2_460_369.5)]
    fn test_known_dates(#[case] y: i32, #[case] m: i32, #[case] d: i32, #[case] expected: f64) {
        let jd = julian_day(y, m, d, 0, 0, 0).unwrap();
        assert_abs_diff_eq!(jd, expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case(1752, 9, 2)]
    #[case(1600, 3, 1)]
    #[case(2031, 12, 31)]
    #[case(-500, 6, 15)]
    fn test_calendar_round_trip(#[case] y: i32, #[case] m: i32, #[case] d: i32) {
        let jd = julian_day(y, m, d, 18, 30, 15).unwrap();
        let date = inv_julian_day(jd).unwrap();
        assert_eq!((date.year, date.month as i32, date.day as i32), (y, m, d));
        assert_eq!((date.hour, date.minute), (18, 30));
        assert_abs_diff_eq!(date.second, 15.0, epsilon = 1e-3);
    }

    #[test]
    fn test_lost_days_rejected() {
        let result = julian_day(1752, 9, 8, 0, 0, 0);
        if let Err(SkychartError::TimeError(msg)) = result {
            assert!(msg.contains("never happened"));
        } else {
            panic!("Expected TimeError for a date lost in the calendar transition");
        }
    }

    #[rstest]
    #[case(2000, 13, 1, 0, 0, 0)]
    #[case(2000, 1, 0, 0, 0, 0)]
    #[case(2000, 1, 1, 24, 0, 0)]
    #[case(2000, 1, 1, 0, 60, 0)]
    #[case(2000, 1, 1, 0, 0, 60)]
    #[case(2_000_000, 1, 1, 0, 0, 0)]
    fn test_out_of_range_fields(
        #[case] y: i32,
        #[case] mo: i32,
        #[case] d: i32,
        #[case] h: i32,
        #[case] mi: i32,
        #[case] s: i32,
    ) {
        assert!(julian_day(y, mo, d, h, mi, s).is_err());
    }

    #[test]
    fn test_inverse_rejects_huge_values() {
        assert!(inv_julian_day(2e8).is_err());
        assert!(inv_julian_day(f64::NAN).is_err());
    }

    #[test]
    fn test_unix_conversions() {
        assert_eq!(jd_from_unix(0.0), 2_440_587.5);
        assert_abs_diff_eq!(unix_from_jd(2_451_545.0), 946_728_000.0, epsilon = 1e-6);

        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_abs_diff_eq!(jd_from_datetime(&instant), 2_451_545.0, epsilon = 1e-9);
    }

    #[test]
    fn test_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(13), "???");
        assert_eq!(week_day_name(6), "Sunday");
        assert_eq!(week_day_name(7), "???");
        assert_eq!(
            format_date(2_451_545.25).unwrap(),
            "2000-01-01 18:00:00".to_string()
        );
    }
}
