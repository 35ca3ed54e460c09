//! Ephemeris tracks sampled over a range of dates

use log::debug;

use super::{EphemerisEngine, ObservingOptions};
use crate::planetlib::BodyId;
use crate::{Result, SkychartError};

/// Sampling interval used when a definition gives none, days
pub const DEFAULT_STEP: f64 = 0.5;

/// A parsed `id,jdMin,jdMax[,step]` request
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDefinition {
    pub object_id: String,
    pub jd_start: f64,
    pub jd_end: f64,
    pub jd_step: f64,
}

impl TrackDefinition {
    /// Parse `id,jdMin,jdMax[,step]`
    pub fn parse(definition: &str) -> Result<Self> {
        let fields: Vec<&str> = definition.split(',').map(str::trim).collect();
        if !(3..=4).contains(&fields.len()) || fields[0].is_empty() {
            return Err(SkychartError::ParseError(format!(
                "expected id,jdMin,jdMax[,step]; got {:?}",
                definition
            )));
        }
        let number = |text: &str, what: &str| -> Result<f64> {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SkychartError::ParseError(format!("bad {} {:?} in {:?}", what, text, definition)))
        };

        let jd_start = number(fields[1], "jdMin")?;
        let jd_end = number(fields[2], "jdMax")?;
        let jd_step = match fields.get(3) {
            Some(text) => number(text, "step")?,
            None => DEFAULT_STEP,
        };
        if jd_step <= 0.0 {
            return Err(SkychartError::ParseError(format!("step must be positive in {:?}", definition)));
        }
        if jd_end < jd_start {
            return Err(SkychartError::ParseError(format!("jdMax precedes jdMin in {:?}", definition)));
        }

        Ok(Self {
            object_id: fields[0].to_string(),
            jd_start,
            jd_end,
            jd_step,
        })
    }

    /// Sample dates from `jd_start` to `jd_end` inclusive
    pub fn sample_dates(&self) -> impl Iterator<Item = f64> + '_ {
        let steps = ((self.jd_end - self.jd_start) / self.jd_step + 1e-9).floor() as usize;
        (0..=steps).map(move |i| self.jd_start + i as f64 * self.jd_step)
    }
}

/// One sample along a track
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisPoint {
    pub jd: f64,
    /// Radians
    pub ra: f64,
    pub dec: f64,
    pub magnitude: f64,
    pub phase: f64,
    /// Arcseconds
    pub angular_size: f64,
    pub text_label: Option<String>,
    /// True for day-of-month labels, which are drawn smaller
    pub sub_month_label: bool,
}

/// A body's path across the sky between two dates
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub object_id: String,
    pub body: BodyId,
    pub jd_start: f64,
    pub jd_end: f64,
    pub jd_step: f64,
    pub maximum_angular_size: f64,
    pub minimum_phase: f64,
    pub brightest_magnitude: f64,
    pub points: Vec<EphemerisPoint>,
}

impl Ephemeris {
    /// An empty track for `body`, with the running extremes at their starting values
    pub fn new(definition: &TrackDefinition, body: BodyId) -> Self {
        Self {
            object_id: definition.object_id.clone(),
            body,
            jd_start: definition.jd_start,
            jd_end: definition.jd_end,
            jd_step: definition.jd_step,
            maximum_angular_size: 0.0,
            minimum_phase: 1.0,
            brightest_magnitude: 999.0,
            points: Vec::new(),
        }
    }

    /// Parse `id,jdMin,jdMax[,step]`
    pub fn parse_definition(definition: &str) -> Result<TrackDefinition> {
        TrackDefinition::parse(definition)
    }

    /// Append a sample and update the running extremes
    pub fn push(&mut self, point: EphemerisPoint) {
        if point.magnitude < self.brightest_magnitude {
            self.brightest_magnitude = point.magnitude;
        }
        if point.phase < self.minimum_phase {
            self.minimum_phase = point.phase;
        }
        if point.angular_size > self.maximum_angular_size {
            self.maximum_angular_size = point.angular_size;
        }
        self.points.push(point);
    }

    /// Days covered by the requested range
    pub fn duration(&self) -> f64 {
        self.jd_end - self.jd_start
    }
}

impl EphemerisEngine {
    /// Compute the track described by `id,jdMin,jdMax[,step]`
    ///
    /// Samples whose position cannot be computed are left out. A track with no
    /// samples at all is an error.
    pub fn track(&self, definition: &str, options: &ObservingOptions) -> Result<Ephemeris> {
        let definition = TrackDefinition::parse(definition)?;
        let body = self.resolve(&definition.object_id)?;
        let mut ephemeris = Ephemeris::new(&definition, body);

        for jd in definition.sample_dates() {
            let result = self.compute(body, jd, options)?;
            if !result.is_known() {
                debug!("No position for {} at JD {:.3}", definition.object_id, jd);
                continue;
            }
            ephemeris.push(EphemerisPoint {
                jd,
                ra: result.ra,
                dec: result.dec,
                magnitude: result.magnitude,
                phase: result.phase,
                angular_size: result.angular_size,
                text_label: None,
                sub_month_label: false,
            });
        }

        if ephemeris.points.is_empty() {
            return Err(SkychartError::CalculationError(format!(
                "no ephemeris data for {} between JD {} and {}",
                definition.object_id, definition.jd_start, definition.jd_end
            )));
        }
        debug!(
            "Track of {} has {} points, brightest magnitude {:.2}",
            ephemeris.object_id,
            ephemeris.points.len(),
            ephemeris.brightest_magnitude
        );
        Ok(ephemeris)
    }
}
