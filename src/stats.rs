//! Online statistics primitives
//!
//! Numerically stable running moments (Welford's method) and the inverse
//! standard normal CDF used to turn exceedance probabilities into z-scores.

use serde::{Deserialize, Serialize};

/// Running mean/variance/count over a stream of scalar observations.
///
/// Uses Welford's incremental update so floating-point error does not grow
/// with sample count. Variance is the Bessel-corrected sample variance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnlineMoments {
    count: u64,
    mean: f64,
    /// Running sum of squared deviations from the mean
    m2: f64,
}

impl OnlineMoments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one observation
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        if self.count == 1 {
            self.mean = x;
            self.m2 = 0.0;
        } else {
            let new_mean = self.mean + (x - self.mean) / self.count as f64;
            self.m2 += (x - self.mean) * (x - new_mean);
            self.mean = new_mean;
        }
    }

    /// Current mean, or 0 with no observations
    pub fn mean(&self) -> f64 {
        if self.count > 0 {
            self.mean
        } else {
            0.0
        }
    }

    /// Sample variance, or 0 with fewer than two observations
    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    /// Sample standard deviation
    pub fn stdev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Number of observations incorporated so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Approximate inverse CDF of a standard normal random variable.
///
/// Abramowitz & Stegun formula 26.2.23, accurate to about 1.7e-3 absolute
/// error. Adequate here because callers only need a threshold, not
/// distributional exactness. Returns 0 for `p <= 0` or `p >= 1`; callers
/// must avoid those inputs for meaningful results.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }

    let tail = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * tail.ln()).sqrt();

    let rational = t
        - ((0.010328 * t + 0.802853) * t + 2.515517)
            / (((0.001308 * t + 0.189269) * t + 1.432788) * t + 1.0);

    if p < 0.5 {
        -rational
    } else {
        rational
    }
}
