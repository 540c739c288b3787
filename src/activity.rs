//! Exponentially-decayed activity level
//!
//! A single scalar summarizing how busy the recent past was, updated once
//! per finished episode from the episode's idle and active durations.

use serde::{Deserialize, Serialize};

/// Duty-cycle activity estimator.
///
/// The level relaxes toward 0 during idle seconds and toward 1 during
/// active seconds, one second at a time: `level -= level * decay` while
/// idle, `level += (1 - level) * decay` while active. Both recurrences are
/// geometric, so they are evaluated in closed form rather than looping:
///
/// - idle:   `level * (1 - decay)^idle_seconds`
/// - active: `1 - (1 - level) * (1 - decay)^active_seconds`
///
/// With `decay` in `(0, 1)` the level stays in `[0, 1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEstimator {
    level: f64,
    decay: f64,
}

impl ActivityEstimator {
    /// Create an estimator at rest (level 0) with the given per-second
    /// decay constant
    pub fn new(decay: f64) -> Self {
        Self { level: 0.0, decay }
    }

    /// Restore an estimator from a persisted level
    pub fn with_level(decay: f64, level: f64) -> Self {
        Self { level, decay }
    }

    /// Incorporate one finished episode and return the new level.
    ///
    /// Idle seconds relax the level first, then active seconds pull it up,
    /// matching the idle-then-active shape of an episode. Negative
    /// durations leave the level unchanged.
    pub fn update(&mut self, idle_seconds: i64, active_seconds: i64) -> f64 {
        if idle_seconds < 0 || active_seconds < 0 {
            return self.level;
        }

        let retain = 1.0 - self.decay;
        self.level *= retain.powf(idle_seconds as f64);
        self.level = 1.0 - (1.0 - self.level) * retain.powf(active_seconds as f64);
        self.level
    }

    /// Current activity level
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Per-second decay constant
    pub fn decay(&self) -> f64 {
        self.decay
    }
}
