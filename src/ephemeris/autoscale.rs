//! Choose a chart centre, size and projection that contain a set of tracks

use log::{debug, warn};

use super::Ephemeris;
use crate::constants::{DEG2RAD, TAU};
use crate::projection::{ChartConfig, Projection};
use crate::spherical::find_mean_position;
use std::f64::consts::{FRAC_PI_2, PI};

/// RA coverage grid: 16 bins per hour
const RA_BINS: usize = 24 * 16;
/// Dec coverage grid: 16 bins per 10 degrees
const DEC_BINS: usize = 18 * 16;
/// Widest chart that still uses a gnomonic projection, degrees
const GNOMONIC_LIMIT_DEG: f64 = 110.0;

fn ra_bin(ra: f64) -> usize {
    ((ra.rem_euclid(TAU) / TAU * RA_BINS as f64) as usize).min(RA_BINS - 1)
}

fn dec_bin(dec: f64) -> usize {
    (((dec + FRAC_PI_2) / PI * DEC_BINS as f64).max(0.0) as usize).min(DEC_BINS - 1)
}

/// Occupied RA span as (first bin, last bin), peeling east and west from the anti-centre
fn ra_span(usage: &[bool], centre_bin: usize) -> Option<(usize, usize)> {
    let anti_centre = (centre_bin + RA_BINS / 2) % RA_BINS;

    let mut min = (anti_centre + 1) % RA_BINS;
    while !usage[min] {
        if min == centre_bin {
            return None;
        }
        min = (min + 1) % RA_BINS;
    }

    let mut max = anti_centre;
    while !usage[max] {
        if max == centre_bin {
            return None;
        }
        max = (max + RA_BINS - 1) % RA_BINS;
    }
    Some((min, max))
}

fn dec_span(usage: &[bool]) -> Option<(usize, usize)> {
    let min = usage.iter().position(|&used| used)?;
    let max = usage.iter().rposition(|&used| used)?;
    Some((min, max))
}

/// Fit the chart around every point of `ephemerides`
///
/// Does nothing unless `config.ephemeris_autoscale` is set. Sets the centre,
/// angular width, aspect ratio and projection, then recomputes the field of
/// view. If no span can be found, autoscaling is switched off and the chart is
/// left as it was.
pub fn autoscale_chart(config: &mut ChartConfig, ephemerides: &[Ephemeris]) {
    if !config.ephemeris_autoscale {
        return;
    }

    let mut ra_usage = vec![false; RA_BINS];
    let mut dec_usage = vec![false; DEC_BINS];
    let mut points = Vec::new();
    let mut skipped = 0;
    for point in ephemerides.iter().flat_map(|e| e.points.iter()) {
        if !point.ra.is_finite() || !point.dec.is_finite() {
            skipped += 1;
            continue;
        }
        ra_usage[ra_bin(point.ra)] = true;
        dec_usage[dec_bin(point.dec)] = true;
        points.push((point.ra, point.dec));
    }
    if skipped > 0 {
        warn!("Skipped {} non-finite ephemeris points while autoscaling", skipped);
    }

    let spans = find_mean_position(&points).and_then(|(ra_centroid, _)| {
        let (ra_min_bin, ra_max_bin) = ra_span(&ra_usage, ra_bin(ra_centroid))?;
        let (dec_min_bin, dec_max_bin) = dec_span(&dec_usage)?;
        Some((ra_min_bin, ra_max_bin, dec_min_bin, dec_max_bin))
    });
    let (ra_min_bin, ra_max_bin, dec_min_bin, dec_max_bin) = match spans {
        Some(spans) => spans,
        None => {
            warn!("Could not find the sky area covered by the ephemerides; autoscale disabled");
            config.ephemeris_autoscale = false;
            return;
        }
    };

    // Hours and degrees
    let ra_min = ra_min_bin as f64 * 24.0 / RA_BINS as f64;
    let mut ra_max = (ra_max_bin + 1) as f64 * 24.0 / RA_BINS as f64;
    let dec_min = dec_min_bin as f64 * 180.0 / DEC_BINS as f64 - 90.0;
    let dec_max = (dec_max_bin + 1) as f64 * 180.0 / DEC_BINS as f64 - 90.0;
    while ra_max <= ra_min {
        ra_max += 24.0;
    }
    while ra_max > ra_min + 24.0 {
        ra_max -= 24.0;
    }

    let ra_span_deg = (ra_max - ra_min) * 15.0;
    let dec_span_deg = dec_max - dec_min;
    let mut width = ra_span_deg.max(dec_span_deg) * 1.15;
    if width > 350.0 {
        width = 360.0;
    }
    debug!(
        "Ephemerides cover RA {:.1}h to {:.1}h, Dec {:.1} to {:.1} deg; width {:.1} deg",
        ra_min, ra_max, dec_min, dec_max, width
    );

    let mut dec0 = (dec_min + dec_max) / 2.0;
    let ratio = dec_span_deg / ra_span_deg;
    if width > GNOMONIC_LIMIT_DEG {
        config.projection = Projection::Flat;
        config.aspect = if ratio > 0.5 { 1.0 } else { (ratio * 1.8).min(0.5) };
        let height = width * config.aspect;
        dec0 = dec0.max(-89.0 + height / 2.0);
        dec0 = dec0.min(89.0 - height / 2.0);
    } else {
        config.projection = Projection::Gnomonic;
        config.aspect = ((ratio * 10.0).ceil() / 10.0).clamp(0.6, 1.5);
        width = ra_span_deg.max(dec_span_deg / config.aspect) * 1.1;
        if width > 350.0 {
            width = 360.0;
        }
    }

    config.ra0 = ((ra_min + ra_max) / 2.0).rem_euclid(24.0) * 15.0 * DEG2RAD;
    config.dec0 = dec0 * DEG2RAD;
    config.angular_width = width * DEG2RAD;
    config.update_field_of_view();
}
