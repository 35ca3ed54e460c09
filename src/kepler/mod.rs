//! Two-body orbit propagation
//!
//! Positions are computed from a single osculating element set whose angles
//! and shape are extrapolated linearly by their rates. Three solvers cover
//! the range of eccentricities:
//!
//! - `e < 0.98`: Newton iteration on Kepler's equation
//! - `e > 1.02`: Newton iteration on the hyperbolic equation
//! - otherwise: the near-parabolic series from Paul Schlyter's
//!   "How to compute planetary positions", section 19
//!
//! Results are heliocentric, in AU, aligned with the J2000 equator (ICRF).

use nalgebra::Vector3;

use crate::constants::{AU_M, DAY_S, GAUSSIAN_K, GM_SUN};
use crate::elements::{ElementFetch, OrbitalElements};
use crate::framelib::ecliptic_to_equatorial;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-12;

/// Result of solving for the position of a body within its orbital plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (elliptic), hyperbolic anomaly F, or the parabolic parameter w
    pub anomaly: f64,
    /// True anomaly, radians
    pub true_anomaly: f64,
    /// Distance from the Sun, AU
    pub radius: f64,
    pub iterations: usize,
}

/// Element values extrapolated to a requested epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub long_asc_node: f64,
    pub inclination: f64,
    pub argument_perihelion: f64,
    /// Mean anomaly at the requested epoch
    pub mean_anomaly: f64,
    /// Mean motion, radians per second
    pub mean_motion: f64,
}

/// Mean motion in radians per second for semi-major axis `a` in AU
pub fn mean_motion(a: f64) -> f64 {
    (GM_SUN / (a.abs() * AU_M).powi(3)).sqrt()
}

/// Extrapolate an element set to Julian date `jd`
pub fn extrapolate(elements: &OrbitalElements, jd: f64) -> OrbitState {
    let dt = jd - elements.epoch_osculation;
    let semi_major_axis = elements.semi_major_axis + elements.semi_major_axis_dot * dt;
    let n = mean_motion(semi_major_axis);
    OrbitState {
        semi_major_axis,
        eccentricity: elements.eccentricity + elements.eccentricity_dot * dt,
        long_asc_node: elements.long_asc_node + elements.long_asc_node_dot * dt,
        inclination: elements.inclination + elements.inclination_dot * dt,
        argument_perihelion: elements.argument_perihelion + elements.argument_perihelion_dot * dt,
        mean_anomaly: elements.mean_anomaly + dt * n * DAY_S,
        mean_motion: n,
    }
}

/// Solve Kepler's equation `M = E - e sin E` for an elliptic orbit
pub fn solve_elliptic(mean_anomaly: f64, e: f64, a: f64) -> KeplerSolution {
    let mut ecc_anomaly = mean_anomaly + e * mean_anomaly.sin();
    let mut delta = 1.0f64;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS && delta.abs() > TOLERANCE {
        let residual = mean_anomaly - (ecc_anomaly - e * ecc_anomaly.sin());
        delta = residual / (1.0 - e * ecc_anomaly.cos());
        ecc_anomaly += delta;
        iterations += 1;
    }

    let xv = a * (ecc_anomaly.cos() - e);
    let yv = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();
    KeplerSolution {
        anomaly: ecc_anomaly,
        true_anomaly: yv.atan2(xv),
        radius: xv.hypot(yv),
        iterations,
    }
}

/// Solve `M = e sinh F - F` for a hyperbolic orbit (`a` negative)
pub fn solve_hyperbolic(mean_anomaly: f64, e: f64, a: f64) -> KeplerSolution {
    let mut f = mean_anomaly;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let residual = e * f.sinh() - f - mean_anomaly;
        let step = (residual / (e * f.cosh() - 1.0)).clamp(-1.0, 1.0);
        f -= step;
        iterations += 1;
        if !(step.abs() > TOLERANCE * f.abs().max(1.0)) {
            break;
        }
    }

    let true_anomaly = 2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (f / 2.0).tanh()).atan();
    KeplerSolution {
        anomaly: f,
        true_anomaly,
        radius: a * (1.0 - e * e) / (1.0 + e * true_anomaly.cos()),
        iterations,
    }
}

/// Position in a near-parabolic orbit `days` after perihelion, with perihelion distance `q` in AU
pub fn near_parabolic(days: f64, q: f64, e: f64) -> KeplerSolution {
    let a = 0.75 * days * GAUSSIAN_K * ((1.0 + e) / q.powi(3)).sqrt();
    let b = (1.0 + a * a).sqrt();
    let w = (b + a).cbrt() - (b - a).cbrt();
    let w2 = w * w;
    let f = (1.0 - e) / (1.0 + e);

    let a1 = 2.0 / 3.0 + 2.0 / 5.0 * w2;
    let a2 = 7.0 / 5.0 + 33.0 / 35.0 * w2 + 37.0 / 175.0 * w2 * w2;
    let a3 = w2 * (432.0 / 175.0 + 956.0 / 1125.0 * w2 + 84.0 / 1575.0 * w2 * w2);
    let c = w2 / (1.0 + w2);
    let g = f * c * c;
    let w = w * (1.0 + f * c * (a1 + a2 * g + a3 * g * g));

    KeplerSolution {
        anomaly: w,
        true_anomaly: 2.0 * w.atan(),
        radius: q * (1.0 + w * w) / (1.0 + w * w * f),
        iterations: 0,
    }
}

/// Solve the orbit described by `state`, choosing the solver by eccentricity
///
/// `epoch_perihelion` is used by the hyperbolic and near-parabolic solvers when
/// it is known; otherwise the mean anomaly stands in for it.
pub fn solve(state: &OrbitState, jd: f64, epoch_perihelion: f64) -> KeplerSolution {
    let e = state.eccentricity;
    let a = state.semi_major_axis;
    let since_perihelion = if epoch_perihelion.is_finite() {
        jd - epoch_perihelion
    } else {
        state.mean_anomaly / (state.mean_motion * DAY_S)
    };

    if e > 1.02 {
        let mean_anomaly = if epoch_perihelion.is_finite() {
            since_perihelion * state.mean_motion * DAY_S
        } else {
            state.mean_anomaly
        };
        solve_hyperbolic(mean_anomaly, e, a)
    } else if e < 0.98 {
        solve_elliptic(state.mean_anomaly, e, a)
    } else {
        near_parabolic(since_perihelion, a * (1.0 - e), e)
    }
}

/// Heliocentric J2000 equatorial position in AU of the body described by `elements` at `jd`
///
/// Returns NaN components when the elements are incomplete.
pub fn heliocentric_xyz(elements: &OrbitalElements, jd: f64) -> Vector3<f64> {
    let state = extrapolate(elements, jd);
    let solution = solve(&state, jd, elements.epoch_perihelion);
    orbit_to_equatorial(&state, &solution)
}

fn orbit_to_equatorial(state: &OrbitState, solution: &KeplerSolution) -> Vector3<f64> {
    let r = solution.radius;
    let u = solution.true_anomaly + state.argument_perihelion;
    let (sin_node, cos_node) = state.long_asc_node.sin_cos();
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_i, cos_i) = state.inclination.sin_cos();

    let ecliptic = Vector3::new(
        r * (cos_node * cos_u - sin_node * sin_u * cos_i),
        r * (sin_node * cos_u + cos_node * sin_u * cos_i),
        r * sin_u * sin_i,
    );
    ecliptic_to_equatorial(&ecliptic)
}

impl ElementFetch {
    /// Heliocentric position at `jd`, blending bracketing element sets by their weights
    pub fn position(&self, jd: f64) -> Vector3<f64> {
        match self {
            ElementFetch::Single(elements) => heliocentric_xyz(elements, jd),
            ElementFetch::Bracketed {
                first,
                w1,
                second,
                w2,
            } => heliocentric_xyz(first, jd) * *w1 + heliocentric_xyz(second, jd) * *w2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEG2RAD, OBLIQUITY_J2000_DEG, TAU};
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn circular_orbit() -> OrbitalElements {
        OrbitalElements {
            epoch_osculation: 2_451_545.0,
            mean_anomaly: 0.0,
            argument_perihelion: 0.0,
            long_asc_node: 0.0,
            inclination: 0.0,
            eccentricity: 0.0,
            semi_major_axis: 1.0,
            ..OrbitalElements::default()
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.1)]
    #[case(0.5)]
    #[case(0.9)]
    #[case(0.975)]
    fn test_elliptic_residual(#[case] e: f64) {
        for step in 0..36 {
            let m = step as f64 * TAU / 36.0 - 0.3;
            let solution = solve_elliptic(m, e, 2.0);
            let residual = m - (solution.anomaly - e * solution.anomaly.sin());
            assert!(residual.abs() <= 1e-10, "e={} M={} residual={}", e, m, residual);
            assert!(solution.iterations <= MAX_ITERATIONS);
        }
    }

    #[rstest]
    #[case(1.05, 0.2)]
    #[case(1.5, 3.0)]
    #[case(3.0, -10.0)]
    #[case(1.1, 50.0)]
    fn test_hyperbolic_residual(#[case] e: f64, #[case] m: f64) {
        let solution = solve_hyperbolic(m, e, -1.5);
        let f = solution.anomaly;
        assert_abs_diff_eq!(e * f.sinh() - f, m, epsilon = 1e-9 * m.abs().max(1.0));
        assert!(solution.radius > 0.0);
    }

    #[test]
    fn test_near_parabolic_symmetry() {
        let at_perihelion = near_parabolic(0.0, 0.5, 1.0);
        assert_abs_diff_eq!(at_perihelion.radius, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(at_perihelion.true_anomaly, 0.0, epsilon = 1e-12);

        let before = near_parabolic(-30.0, 0.5, 0.99);
        let after = near_parabolic(30.0, 0.5, 0.99);
        assert_abs_diff_eq!(before.radius, after.radius, epsilon = 1e-12);
        assert_abs_diff_eq!(before.true_anomaly, -after.true_anomaly, epsilon = 1e-12);
        assert!(after.radius > 0.5);
    }

    #[test]
    fn test_parabolic_matches_barker() {
        // For e = 1 the series reduces to Barker's equation
        let q = 1.0;
        let days = 40.0;
        let solution = near_parabolic(days, q, 1.0);
        let s = (solution.true_anomaly / 2.0).tan();
        let lhs = s + s.powi(3) / 3.0;
        let rhs = GAUSSIAN_K * days / (2.0 * q.powi(3)).sqrt();
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-9);
    }

    #[test]
    fn test_circular_orbit_quarter_period() {
        let elements = circular_orbit();
        let start = heliocentric_xyz(&elements, elements.epoch_osculation);
        assert_abs_diff_eq!(start, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let period_days = TAU / mean_motion(1.0) / DAY_S;
        assert_abs_diff_eq!(period_days, 365.2569, epsilon = 1e-3);

        let quarter = heliocentric_xyz(&elements, elements.epoch_osculation + period_days / 4.0);
        let eps = OBLIQUITY_J2000_DEG * DEG2RAD;
        assert_abs_diff_eq!(quarter, Vector3::new(0.0, eps.cos(), eps.sin()), epsilon = 1e-9);
        assert_abs_diff_eq!(quarter.norm(), 1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.7)]
    #[case(2.4)]
    #[case(5.9)]
    fn test_circular_orbit_half_turn_is_antipodal(#[case] mean_anomaly: f64) {
        let tilted = OrbitalElements {
            long_asc_node: 1.1,
            inclination: 0.4,
            argument_perihelion: 2.3,
            mean_anomaly,
            ..circular_orbit()
        };
        let opposite = OrbitalElements {
            mean_anomaly: mean_anomaly + std::f64::consts::PI,
            ..tilted
        };
        let here = heliocentric_xyz(&tilted, tilted.epoch_osculation);
        let there = heliocentric_xyz(&opposite, opposite.epoch_osculation);
        assert_abs_diff_eq!(here.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(there.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(there, -here, epsilon = 1e-12);
    }

    #[test]
    fn test_rates_extrapolate_linearly() {
        let elements = OrbitalElements {
            long_asc_node_dot: 1e-3,
            semi_major_axis_dot: 1e-4,
            ..circular_orbit()
        };
        let state = extrapolate(&elements, elements.epoch_osculation + 100.0);
        assert_abs_diff_eq!(state.long_asc_node, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(state.semi_major_axis, 1.01, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_elements_give_nan() {
        let position = heliocentric_xyz(&OrbitalElements::default(), 2_451_545.0);
        assert!(position.iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_blended_position() {
        let elements = circular_orbit();
        let later = OrbitalElements {
            epoch_osculation: elements.epoch_osculation + 10.0,
            ..elements
        };
        let jd = elements.epoch_osculation + 5.0;
        let fetch = ElementFetch::Bracketed {
            first: elements,
            w1: 0.25,
            second: later,
            w2: 0.75,
        };
        let expected = heliocentric_xyz(&elements, jd) * 0.25 + heliocentric_xyz(&later, jd) * 0.75;
        assert_abs_diff_eq!(fetch.position(jd), expected, epsilon = 1e-15);
        assert_abs_diff_eq!(
            ElementFetch::Single(elements).position(jd),
            heliocentric_xyz(&elements, jd),
            epsilon = 1e-15
        );
    }
}
