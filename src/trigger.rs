//! Hysteresis trigger state machine
//!
//! Two states, no terminal state: `Idle` arms the return-period threshold,
//! `Triggered` suppresses further notifications until activity falls back
//! inside one standard deviation of the expectation. The wider exit band
//! keeps the machine from chattering around the trigger threshold.

use crate::threshold::ThresholdPolicy;
use crate::types::{ExpectedActivity, TriggerState};

/// Outcome of evaluating one episode against the baseline
#[derive(Debug, Clone, Copy)]
pub struct TriggerDecision {
    /// State after the evaluation
    pub state: TriggerState,
    /// True exactly on an Idle -> Triggered edge
    pub fired: bool,
    /// The threshold that was evaluated, when one was
    pub threshold: Option<f64>,
}

/// The per-process trigger state machine
#[derive(Debug, Clone)]
pub struct TriggerEngine {
    state: TriggerState,
}

impl Default for TriggerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self {
            state: TriggerState::Idle,
        }
    }

    /// Restore the machine to a persisted state
    pub fn with_state(state: TriggerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Evaluate the current activity level and advance the machine.
    ///
    /// A notification is signaled only on the Idle -> Triggered transition
    /// edge. A non-positive or non-finite episode rate is treated like cold
    /// start: the machine stays idle and nothing fires.
    pub fn evaluate(
        &mut self,
        activity_level: f64,
        expected: &ExpectedActivity,
        policy: &ThresholdPolicy,
        events_per_hour: f64,
    ) -> TriggerDecision {
        match self.state {
            TriggerState::Idle => {
                if !events_per_hour.is_finite() || events_per_hour <= 0.0 {
                    return TriggerDecision {
                        state: self.state,
                        fired: false,
                        threshold: None,
                    };
                }

                let threshold = policy.threshold(expected, events_per_hour);
                if activity_level > threshold {
                    self.state = TriggerState::Triggered;
                    tracing::info!(
                        activity_level,
                        threshold,
                        expected_mean = expected.mean,
                        expected_stdev = expected.stdev,
                        "activity above threshold, triggering"
                    );
                }

                TriggerDecision {
                    state: self.state,
                    fired: self.state == TriggerState::Triggered,
                    threshold: Some(threshold),
                }
            }
            TriggerState::Triggered => {
                let release = expected.mean + expected.stdev;
                if activity_level < release {
                    self.state = TriggerState::Idle;
                    tracing::info!(
                        activity_level,
                        release,
                        "activity subsided, releasing trigger"
                    );
                }

                TriggerDecision {
                    state: self.state,
                    fired: false,
                    threshold: None,
                }
            }
        }
    }
}
