//! Engine configuration
//!
//! Tuning knobs for the trigger engine. Defaults match a deployment that
//! notifies roughly once a week with a ten-minute activity memory.

use crate::error::EngineError;
use crate::smoother::SmoothingStrategy;
use serde::{Deserialize, Serialize};

/// Default desired average time between notifications (hours): one week
pub const DEFAULT_RETURN_PERIOD_HOURS: f64 = 24.0 * 7.0;

/// Default exponential decay constant: a ~600 second activity memory
pub const DEFAULT_DECAY: f64 = 1.0 / 600.0;

/// Configuration for a [`VigilProcessor`](crate::pipeline::VigilProcessor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Desired average hours between notifications
    pub return_period_hours: f64,
    /// Per-second exponential decay constant of the activity level
    pub decay: f64,
    /// IANA timezone used to place episodes on the local clock
    /// (e.g., "America/New_York")
    pub timezone: String,
    /// Denoising strategy for the seasonal baseline curve
    pub smoothing: SmoothingStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            return_period_hours: DEFAULT_RETURN_PERIOD_HOURS,
            decay: DEFAULT_DECAY,
            timezone: "UTC".to_string(),
            smoothing: SmoothingStrategy::Fourier,
        }
    }
}

impl EngineConfig {
    /// Check numeric bounds and resolve the timezone.
    ///
    /// Called at processor construction so per-episode processing stays
    /// infallible.
    pub fn validate(&self) -> Result<chrono_tz::Tz, EngineError> {
        if !self.return_period_hours.is_finite() || self.return_period_hours <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "return_period_hours must be positive, got {}",
                self.return_period_hours
            )));
        }
        if !self.decay.is_finite() || self.decay <= 0.0 || self.decay >= 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "decay must be in (0, 1), got {}",
                self.decay
            )));
        }
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| EngineError::InvalidTimezone(self.timezone.clone()))
    }
}
