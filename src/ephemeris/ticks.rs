//! Tick marks across ephemeris tracks at labelled dates
//!
//! Positions are in chart-plane units; the physical tick lengths are
//! converted using the chart's plane width and its width in cm.

use super::Ephemeris;
use crate::projection::ChartConfig;

/// Tick length for month and first labels, cm
const MAJOR_TICK_CM: f64 = 0.2;
/// Tick length for day-of-month labels, cm
const MINOR_TICK_CM: f64 = 0.12;
/// Label offsets from the track, in tick lengths
const NEAR_GAP: f64 = 1.5;
const FAR_GAP: f64 = 1.85;

/// A place the renderer may put a tick's text
///
/// Alignments are -1 (left / top), 0 (centre / middle) or 1 (right / bottom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelCandidate {
    pub x: f64,
    pub y: f64,
    pub h_align: i8,
    pub v_align: i8,
}

/// A tick drawn perpendicular to a track at a labelled point
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub x: f64,
    pub y: f64,
    /// Direction of travel along the track, radians from +x; 0 when it could not be determined
    pub theta: f64,
    /// Half-length of the tick in plane units
    pub length: f64,
    pub label: String,
    pub sub_month: bool,
    pub h_align: i8,
    pub v_align: i8,
    /// Placement priority; lower values are placed first and -1 means always show
    pub priority: f64,
    /// Four text positions, either side of the tick at two distances
    pub candidates: [LabelCandidate; 4],
}

/// Text alignment for a track heading `theta_deg`, from eight 45 degree sectors
fn alignment(theta_deg: f64) -> (i8, i8) {
    if theta_deg < -157.5 {
        (0, -1)
    } else if theta_deg < -112.5 {
        (1, -1)
    } else if theta_deg < -67.5 {
        (1, 0)
    } else if theta_deg < -22.5 {
        (1, 1)
    } else if theta_deg < 22.5 {
        (0, 1)
    } else if theta_deg < 67.5 {
        (-1, 1)
    } else if theta_deg < 112.5 {
        (-1, 0)
    } else if theta_deg < 157.5 {
        (-1, -1)
    } else {
        (0, -1)
    }
}

/// Tick marks for every labelled point of `ephemeris` that falls inside the chart
pub fn track_ticks(ephemeris: &Ephemeris, config: &ChartConfig) -> Vec<TickMark> {
    let projected: Vec<(f64, f64)> = ephemeris
        .points
        .iter()
        .map(|p| config.project(p.ra, p.dec, false))
        .collect();

    // Direction at the start of the track, from the first in-frame points
    let mut initial_theta = 0.0;
    let mut last = (0.0, 0.0);
    for (i, &(x, y)) in projected.iter().enumerate() {
        if !config.in_frame(x, y) {
            continue;
        }
        if i == 2 {
            initial_theta = (y - last.1).atan2(x - last.0);
        }
        last = (x, y);
    }

    let mut ticks = Vec::new();
    let mut first_label = true;
    for (i, (point, &(x, y))) in ephemeris.points.iter().zip(projected.iter()).enumerate() {
        let theta = if i < 2 {
            initial_theta
        } else {
            (y - last.1).atan2(x - last.0)
        };
        last = (x, y);

        let label = match &point.text_label {
            Some(label) if config.in_frame(x, y) => label,
            _ => continue,
        };
        let theta = if theta.is_finite() { theta } else { 0.0 };

        let tick_cm = if point.sub_month_label { MINOR_TICK_CM } else { MAJOR_TICK_CM };
        let length = tick_cm * config.plane_width() / config.width;
        let (h_align, v_align) = alignment(theta.to_degrees());
        let (sin, cos) = theta.sin_cos();
        let offset = |gap: f64, side: f64, h: i8, v: i8| LabelCandidate {
            x: x + side * gap * length * sin,
            y: y - side * gap * length * cos,
            h_align: h,
            v_align: v,
        };
        let candidates = [
            offset(NEAR_GAP, 1.0, h_align, v_align),
            offset(NEAR_GAP, -1.0, -h_align, -v_align),
            offset(FAR_GAP, 1.0, h_align, v_align),
            offset(FAR_GAP, -1.0, -h_align, -v_align),
        ];

        let priority = if first_label {
            -1.0
        } else {
            0.0123 + 1e-12 * i as f64 - if point.sub_month_label { 0.0 } else { 4e-6 }
        };
        first_label = false;

        ticks.push(TickMark {
            x,
            y,
            theta,
            length,
            label: label.clone(),
            sub_month: point.sub_month_label,
            h_align,
            v_align,
            priority,
            candidates,
        });
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::super::track::{EphemerisPoint, TrackDefinition};
    use super::*;
    use crate::constants::DEG2RAD;
    use crate::planetlib::BodyId;
    use crate::projection::Projection;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn labelled_track(points: &[(f64, f64, Option<&str>)]) -> Ephemeris {
        let definition = TrackDefinition::parse("test,0,10").unwrap();
        let mut ephemeris = Ephemeris::new(&definition, BodyId::Sun);
        for (i, &(ra, dec, label)) in points.iter().enumerate() {
            ephemeris.push(EphemerisPoint {
                jd: i as f64,
                ra,
                dec,
                magnitude: 0.0,
                phase: 1.0,
                angular_size: 0.0,
                text_label: label.map(str::to_string),
                sub_month_label: label.map_or(false, |l| l.len() <= 2),
            });
        }
        ephemeris
    }

    fn chart() -> ChartConfig {
        ChartConfig {
            width: 20.0,
            ..ChartConfig::new(Projection::Gnomonic, 1.0, 0.0, 30.0 * DEG2RAD)
        }
    }

    #[rstest]
    #[case(-170.0, (0, -1))]
    #[case(-135.0, (1, -1))]
    #[case(-90.0, (1, 0))]
    #[case(-45.0, (1, 1))]
    #[case(0.0, (0, 1))]
    #[case(45.0, (-1, 1))]
    #[case(90.0, (-1, 0))]
    #[case(135.0, (-1, -1))]
    #[case(170.0, (0, -1))]
    fn test_alignment_sectors(#[case] theta: f64, #[case] expected: (i8, i8)) {
        assert_eq!(alignment(theta), expected);
    }

    #[test]
    fn test_ticks_along_eastward_track() {
        // Moving east along the equator runs towards -x
        let ephemeris = labelled_track(&[
            (1.00, 0.0, Some("1 Jan 2024")),
            (1.01, 0.0, None),
            (1.02, 0.0, Some("3")),
            (1.03, 0.0, Some("4")),
            (3.00, 0.0, Some("Feb")),
        ]);
        let config = chart();
        let ticks = track_ticks(&ephemeris, &config);

        // The last point is off the chart
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].label, "1 Jan 2024");
        assert_eq!(ticks[0].priority, -1.0);
        assert!(ticks[1].priority > 0.0);
        assert_abs_diff_eq!(ticks[0].theta.abs(), std::f64::consts::PI, epsilon = 1e-9);
        assert_abs_diff_eq!(ticks[2].theta.abs(), std::f64::consts::PI, epsilon = 1e-9);

        let plane_cm = config.plane_width() / config.width;
        assert_abs_diff_eq!(ticks[0].length, 0.2 * plane_cm, epsilon = 1e-12);
        assert_abs_diff_eq!(ticks[1].length, 0.12 * plane_cm, epsilon = 1e-12);

        let candidates = ticks[1].candidates;
        // Perpendicular to the track, 1.5 and 1.85 tick lengths away
        assert_abs_diff_eq!((candidates[0].y - ticks[1].y).abs(), 1.5 * ticks[1].length, epsilon = 1e-12);
        assert_abs_diff_eq!((candidates[3].y - ticks[1].y).abs(), 1.85 * ticks[1].length, epsilon = 1e-12);
        assert_eq!(candidates[1].h_align, -candidates[0].h_align);
        assert_eq!(candidates[1].v_align, -candidates[0].v_align);
    }

    #[test]
    fn test_stationary_track_points_along_x() {
        let ephemeris = labelled_track(&[(1.0, 0.0, Some("1 Jan 2024")), (1.0, 0.0, Some("2")), (1.0, 0.0, Some("3"))]);
        let ticks = track_ticks(&ephemeris, &chart());
        assert_eq!(ticks.len(), 3);
        // atan2(0, 0) is 0
        assert!(ticks.iter().all(|t| t.theta == 0.0));
    }

    #[test]
    fn test_unprojectable_neighbour_still_offers_label_positions() {
        let ephemeris = labelled_track(&[
            (1.00, 0.0, Some("1 Jan 2024")),
            (1.01, 0.0, None),
            (f64::NAN, 0.0, None),
            (1.03, 0.0, Some("4")),
        ]);
        let ticks = track_ticks(&ephemeris, &chart());
        assert_eq!(ticks.len(), 2);

        let tick = &ticks[1];
        assert_eq!(tick.label, "4");
        assert_eq!(tick.theta, 0.0);
        assert_eq!((tick.h_align, tick.v_align), (0, 1));
        // With theta = 0 the candidates sit straight above and below the tick
        let offsets = [1.5, -1.5, 1.85, -1.85];
        for (candidate, offset) in tick.candidates.iter().zip(offsets) {
            assert_abs_diff_eq!(candidate.x, tick.x, epsilon = 1e-12);
            assert_abs_diff_eq!(candidate.y, tick.y - offset * tick.length, epsilon = 1e-12);
        }
        assert_eq!(tick.candidates[1].v_align, -1);
    }
}
