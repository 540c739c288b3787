//! Return-period threshold derivation
//!
//! Converts "one notification roughly every N hours" into a trigger
//! threshold: the desired return period and the observed episode rate imply
//! a per-episode exceedance probability, whose z-score scales the expected
//! standard deviation above the expected mean.

use crate::stats::inverse_normal_cdf;
use crate::types::ExpectedActivity;

/// Clamp bound keeping the exceedance probability strictly inside (0, 1)
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// Derives trigger thresholds from a desired notification return period
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    return_period_hours: f64,
}

impl ThresholdPolicy {
    pub fn new(return_period_hours: f64) -> Self {
        Self {
            return_period_hours,
        }
    }

    pub fn return_period_hours(&self) -> f64 {
        self.return_period_hours
    }

    /// Trigger threshold for the current expected activity and episode
    /// rate.
    ///
    /// `events_per_hour` must be positive and finite; callers guard a zero
    /// or degenerate rate before calling (treat it like cold start).
    pub fn threshold(&self, expected: &ExpectedActivity, events_per_hour: f64) -> f64 {
        let p = 1.0 / (events_per_hour * self.return_period_hours);
        let q = (1.0 - p).clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
        expected.mean + inverse_normal_cdf(q) * expected.stdev
    }
}
