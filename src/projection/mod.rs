//! Celestial sphere to chart plane projections
//!
//! A [`ChartConfig`] fixes the chart centre, orientation, coordinate frame and
//! projection family. [`ChartConfig::project`] maps (ra, dec) onto tangent-plane
//! coordinates and [`ChartConfig::inverse_project`] maps them back. The plane
//! is measured in the projection's natural units (radians of arc for the
//! cylindrical families, the zenithal radius function otherwise), with +y
//! pointing away from north.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::constants::{DEG2RAD, J2000};
use crate::framelib::{alt_az, galactic_project, inv_alt_az, inv_galactic_project};
use crate::spherical::{inv_make_zenithal, make_zenithal, normalize_angle, wrap_pi};

/// Margin left around whole-hemisphere charts
const HEMISPHERE_MARGIN: f64 = 1.12;

/// Sphere-to-plane projection families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Plain longitude/latitude offsets from the centre
    Flat,
    /// Central projection onto the tangent plane; great circles map to straight lines
    Gnomonic,
    /// Conformal zenithal projection
    Stereographic,
    /// Orthographic view of a hemisphere
    Spherical,
    /// Zenithal equidistant; the full sphere fits inside radius 2
    AltAz,
    /// Equal-area cylindrical
    Peters,
    /// Horizon panorama with true scale along every parallel
    MultiLatitude,
}

impl Projection {
    fn is_zenithal(&self) -> bool {
        matches!(
            self,
            Projection::Gnomonic | Projection::Stereographic | Projection::Spherical | Projection::AltAz
        )
    }

    /// Plane radius at zenith angle `za`, or NaN where the projection is undefined
    fn radius(&self, za: f64) -> f64 {
        match self {
            Projection::Gnomonic if za < FRAC_PI_2 => za.tan(),
            Projection::Stereographic if za < PI => (za / 2.0).tan(),
            Projection::Spherical if za <= FRAC_PI_2 => za.sin(),
            Projection::AltAz if za <= PI => za / FRAC_PI_2,
            _ => f64::NAN,
        }
    }

    /// Zenith angle at plane radius `r`, or NaN outside the image of the sphere
    fn zenith_angle(&self, r: f64) -> f64 {
        match self {
            Projection::Gnomonic => r.atan(),
            Projection::Stereographic => 2.0 * r.atan(),
            Projection::Spherical if r <= 1.0 => r.asin(),
            Projection::AltAz if r <= 2.0 => r * FRAC_PI_2,
            _ => f64::NAN,
        }
    }
}

/// Coordinate frame the chart is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coords {
    RaDec,
    Galactic,
    /// Local altitude and azimuth, using the chart's date and observing site
    AltAz,
}

/// Projection state of one chart
///
/// Angles are radians except `latitude`/`longitude`, which are degrees.
/// `width` is the physical chart width in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub julian_date: f64,
    pub projection: Projection,
    pub coords: Coords,
    pub latitude: f64,
    pub longitude: f64,
    /// Chart centre
    pub ra0: f64,
    pub dec0: f64,
    pub position_angle: f64,
    pub angular_width: f64,
    /// Height over width
    pub aspect: f64,
    pub width: f64,
    /// Discard points below the local horizon
    pub horizon_clip: bool,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Let [`crate::ephemeris::autoscale_chart`] choose the centre, size and projection
    pub ephemeris_autoscale: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let mut config = Self {
            julian_date: J2000,
            projection: Projection::Stereographic,
            coords: Coords::RaDec,
            latitude: 0.0,
            longitude: 0.0,
            ra0: 0.0,
            dec0: 0.0,
            position_angle: 0.0,
            angular_width: 25.0 * DEG2RAD,
            aspect: std::f64::consts::SQRT_2,
            width: 16.5,
            horizon_clip: false,
            x_min: 0.0,
            x_max: 0.0,
            y_min: 0.0,
            y_max: 0.0,
            ephemeris_autoscale: false,
        };
        config.update_field_of_view();
        config
    }
}

impl ChartConfig {
    /// Chart centred on (ra0, dec0) with the given projection and angular width
    pub fn new(projection: Projection, ra0: f64, dec0: f64, angular_width: f64) -> Self {
        let mut config = Self {
            projection,
            ra0,
            dec0,
            angular_width,
            ..Self::default()
        };
        config.update_field_of_view();
        config
    }

    /// Width of the field of view in plane units
    pub fn plane_width(&self) -> f64 {
        let half = self.angular_width / 2.0;
        match self.projection {
            Projection::Flat | Projection::Peters | Projection::MultiLatitude => self.angular_width,
            Projection::Gnomonic => 2.0 * half.tan(),
            Projection::Stereographic => 2.0 * (half / 2.0).tan(),
            Projection::Spherical => 2.0 * half.sin() * HEMISPHERE_MARGIN,
            Projection::AltAz => 2.0 * HEMISPHERE_MARGIN,
        }
    }

    /// Recompute the field-of-view box from the angular width and aspect ratio
    pub fn update_field_of_view(&mut self) {
        let half = self.plane_width() / 2.0;
        self.x_min = -half;
        self.x_max = half;
        self.y_min = -half * self.aspect;
        self.y_max = half * self.aspect;
    }

    /// Whether a plane point lies within the field-of-view box
    pub fn in_frame(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    fn to_frame(&self, ra: f64, dec: f64) -> (f64, f64) {
        match self.coords {
            Coords::RaDec => (ra, dec),
            Coords::Galactic => galactic_project(ra, dec),
            Coords::AltAz => {
                let (alt, az) = alt_az(ra, dec, self.julian_date, self.latitude, self.longitude);
                (az, alt)
            }
        }
    }

    fn from_frame(&self, lng: f64, lat: f64) -> (f64, f64) {
        match self.coords {
            Coords::RaDec => (lng, lat),
            Coords::Galactic => inv_galactic_project(lng, lat),
            Coords::AltAz => inv_alt_az(lat, lng, self.julian_date, self.latitude, self.longitude),
        }
    }

    /// Project (ra, dec) onto the chart plane
    ///
    /// Returns NaN coordinates for points the projection cannot show, and for
    /// points below the horizon when `horizon_clip` is set, unless
    /// `allow_below_horizon` is true.
    pub fn project(&self, ra: f64, dec: f64, allow_below_horizon: bool) -> (f64, f64) {
        if self.horizon_clip && !allow_below_horizon {
            let (alt, _) = alt_az(ra, dec, self.julian_date, self.latitude, self.longitude);
            if alt < 0.0 {
                return (f64::NAN, f64::NAN);
            }
        }

        let (lng, lat) = self.to_frame(ra, dec);
        let (lng0, lat0) = self.to_frame(self.ra0, self.dec0);

        if self.projection.is_zenithal() {
            let (za, azimuth) = make_zenithal(lng, lat, lng0, lat0);
            let azimuth = azimuth - self.position_angle;
            let r = self.projection.radius(za);
            return (-r * azimuth.sin(), r * azimuth.cos());
        }

        let d_lng = wrap_pi(lng0 - lng);
        let (x, y) = match self.projection {
            Projection::Peters => (d_lng, 2.0 * (lat0.sin() - lat.sin())),
            Projection::MultiLatitude => (d_lng * lat.cos(), lat0 - lat),
            _ => (d_lng, lat0 - lat),
        };
        let (s, c) = self.position_angle.sin_cos();
        (x * c + y * s, -x * s + y * c)
    }

    /// Invert [`ChartConfig::project`]; NaN for points outside the projection's image
    pub fn inverse_project(&self, x: f64, y: f64) -> (f64, f64) {
        let (lng0, lat0) = self.to_frame(self.ra0, self.dec0);

        let (lng, lat) = if self.projection.is_zenithal() {
            let za = self.projection.zenith_angle(x.hypot(y));
            if za.is_nan() {
                return (f64::NAN, f64::NAN);
            }
            let azimuth = (-x).atan2(y) + self.position_angle;
            inv_make_zenithal(za, azimuth, lng0, lat0)
        } else {
            let (s, c) = self.position_angle.sin_cos();
            let (xp, yp) = (x * c - y * s, x * s + y * c);
            match self.projection {
                Projection::Peters => {
                    let sin_lat = (2.0 * lat0.sin() - yp) / 2.0;
                    if sin_lat.abs() > 1.0 {
                        return (f64::NAN, f64::NAN);
                    }
                    (lng0 - xp, sin_lat.asin())
                }
                Projection::MultiLatitude => {
                    let lat = lat0 - yp;
                    if lat.abs() > FRAC_PI_2 {
                        return (f64::NAN, f64::NAN);
                    }
                    let d_lng = xp / lat.cos();
                    if d_lng.abs() > PI {
                        return (f64::NAN, f64::NAN);
                    }
                    (lng0 - d_lng, lat)
                }
                _ => {
                    let lat = lat0 - yp;
                    if lat.abs() > FRAC_PI_2 {
                        return (f64::NAN, f64::NAN);
                    }
                    (lng0 - xp, lat)
                }
            }
        };

        let (ra, dec) = self.from_frame(lng, lat);
        (normalize_angle(ra), dec)
    }
}
