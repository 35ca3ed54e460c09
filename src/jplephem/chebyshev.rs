//! Chebyshev series evaluation for SPK interpolation

/// A Chebyshev series `c0 T0(x) + c1 T1(x) + ... + cn Tn(x)`
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    /// Coefficients ordered from lowest to highest degree
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Value at `x` in [-1, 1] by Clenshaw's recurrence; NaN outside that range
    pub fn evaluate(&self, x: f64) -> f64 {
        if !(-1.0..=1.0).contains(&x) {
            return f64::NAN;
        }
        let (mut b1, mut b2) = (0.0, 0.0);
        for &c in self.coefficients.iter().skip(1).rev() {
            let b0 = 2.0 * x * b1 - b2 + c;
            b2 = b1;
            b1 = b0;
        }
        match self.coefficients.first() {
            Some(&c0) => x * b1 - b2 + c0,
            None => 0.0,
        }
    }
}

/// Map `t` into [-1, 1] for an interval of half-width `radius` about `mid`
pub fn normalize_time(t: f64, mid: f64, radius: f64) -> f64 {
    (t - mid) / radius
}
