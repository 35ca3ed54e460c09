//! Date labels along ephemeris tracks

use super::Ephemeris;
use crate::projection::ChartConfig;
use crate::spherical::ang_dist_radec;
use crate::time::inv_julian_day;
use crate::Result;

/// Track speed above which every day is labelled, cm per day
const DAILY_SPEED: f64 = 0.025;
/// Tracks shorter than this label every day, days
const DAILY_SPAN: f64 = 15.0;
/// Tracks shorter than this label every week, days
const WEEKLY_SPAN: f64 = 70.0;

/// Attach date labels to the points of a track
///
/// The first label carries the full date. After that, each new month is
/// labelled with its name (and the year in January). Slow tracks get a label
/// every week, and fast or short ones every day. A label is only kept when its
/// first three characters differ from the previous label shown.
pub fn add_text_labels(ephemeris: &mut Ephemeris, config: &ChartConfig) -> Result<()> {
    let duration = ephemeris.duration();
    let cm_per_radian = config.width / config.angular_width;
    let step = ephemeris.jd_step;

    let mut previous_label = String::new();
    let mut previous_day = None;
    let mut previous_position: Option<(f64, f64)> = None;

    for point in ephemeris.points.iter_mut() {
        // Radians per day
        let angular_speed = match previous_position {
            Some((ra, dec)) => ang_dist_radec(ra, dec, point.ra, point.dec) / step,
            None => 1e6,
        };
        previous_position = Some((point.ra, point.dec));
        let speed_cm_per_day = angular_speed * cm_per_radian;

        let date = inv_julian_day(point.jd)?;
        let mut label = None;
        let mut sub_month = false;

        if previous_day != Some(date.day) {
            if previous_label.is_empty() {
                // A year-long track starting on 31 December would otherwise open with the old year
                if date.day != 31 {
                    label = Some(format!("{} {} {}", date.day, date.month_abbrev(), date.year));
                }
            } else if date.day > 1 {
                if duration < DAILY_SPAN || speed_cm_per_day > DAILY_SPEED {
                    label = Some(date.day.to_string());
                    sub_month = true;
                } else if date.day % 7 == 0 && (duration < WEEKLY_SPAN || speed_cm_per_day > DAILY_SPEED / 7.0) {
                    label = Some(date.day.to_string());
                    sub_month = true;
                }
            } else if date.month == 1 {
                label = Some(format!("{} {}", date.month_abbrev(), date.year));
            } else {
                label = Some(date.month_abbrev().to_string());
            }
        }

        if let Some(label) = label {
            if !same_prefix(&label, &previous_label) {
                point.text_label = Some(label.clone());
                point.sub_month_label = sub_month;
                previous_label = label;
            }
        }
        previous_day = Some(date.day);
    }
    Ok(())
}

fn same_prefix(a: &str, b: &str) -> bool {
    a.chars().take(3).eq(b.chars().take(3))
}
