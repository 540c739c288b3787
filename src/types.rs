//! Core types for the Synheart Vigil pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: episodes, bucket addressing, expected-activity estimates,
//! trigger state, and per-episode outcomes.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One finished idle+active interval pair, the engine's unit of input.
///
/// Produced exactly once per recorder cycle by the capture collaborator,
/// after the underlying recording artifact has been finalized and its start
/// timestamp is known. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Unique episode identifier, carried by notifications
    pub id: Uuid,
    /// Episode start time (UTC)
    pub start_time: DateTime<Utc>,
    /// Idle duration immediately before the episode (seconds)
    pub idle_seconds: i64,
    /// Active duration of the episode (seconds)
    pub active_seconds: i64,
}

impl Episode {
    /// Create an episode with a fresh identifier
    pub fn new(start_time: DateTime<Utc>, idle_seconds: i64, active_seconds: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            idle_seconds,
            active_seconds,
        }
    }

    /// Create an episode with a caller-supplied identifier (e.g., from a
    /// persisted event log)
    pub fn with_id(
        id: Uuid,
        start_time: DateTime<Utc>,
        idle_seconds: i64,
        active_seconds: i64,
    ) -> Self {
        Self {
            id,
            start_time,
            idle_seconds,
            active_seconds,
        }
    }

    /// Whether both durations are non-negative
    pub fn is_well_formed(&self) -> bool {
        self.idle_seconds >= 0 && self.active_seconds >= 0
    }

    /// Total observed duration of this episode (seconds)
    pub fn total_seconds(&self) -> i64 {
        self.idle_seconds + self.active_seconds
    }
}

/// Weekday/weekend classification of a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Weekday,
    Weekend,
}

impl DayClass {
    /// Classify a weekday; Saturday and Sunday are weekend
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat | Weekday::Sun => DayClass::Weekend,
            _ => DayClass::Weekday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayClass::Weekday => "weekday",
            DayClass::Weekend => "weekend",
        }
    }
}

/// Address of one hourly bucket in the seasonal baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketKey {
    pub class: DayClass,
    /// Hour of day, 0..=23
    pub hour: u32,
}

/// Local calendar position of an episode start, derived from its UTC
/// timestamp and the configured timezone
#[derive(Debug, Clone, Copy)]
pub struct LocalStamp {
    pub weekday: Weekday,
    /// Hour of day, 0..=23
    pub hour: u32,
    /// Minute of hour, 0..=59
    pub minute: u32,
}

impl LocalStamp {
    /// Extract the local calendar position from a timezone-aware datetime
    pub fn of<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        Self {
            weekday: datetime.weekday(),
            hour: datetime.hour(),
            minute: datetime.minute(),
        }
    }

    /// Weekday/weekend class of this stamp's day
    pub fn day_class(&self) -> DayClass {
        DayClass::from_weekday(self.weekday)
    }

    /// Fractional hour of day in `[0, 24)`
    pub fn fractional_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }
}

/// Which tier of the fallback chain produced an expected-activity estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedSource {
    /// Denoised per-class hourly curve
    Seasonal,
    /// Process-wide overall accumulator
    Overall,
    /// Sentinel values suppressing notifications until enough history exists
    ColdStart,
}

/// Expected activity at a point in local time: the baseline the current
/// level is judged against
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpectedActivity {
    pub mean: f64,
    pub stdev: f64,
    pub source: ExpectedSource,
}

/// Hysteresis state of the trigger engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerState {
    Idle,
    Triggered,
}

/// Payload handed to the notification collaborator on an Idle -> Triggered
/// transition. The engine never spawns processes; the host owns delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub episode_id: Uuid,
    pub episode_start_time: DateTime<Utc>,
}

/// Everything the engine decided about one episode, for host-side logging
/// and the notification collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub episode_id: Uuid,
    /// Activity level after incorporating this episode
    pub activity_level: f64,
    /// Baseline expectation the level was judged against
    pub expected: ExpectedActivity,
    /// Trigger threshold, present only when it was evaluated (Idle state
    /// with a usable event rate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Episode rate used for the return-period probability
    pub events_per_hour: f64,
    /// Trigger state after evaluating this episode
    pub state: TriggerState,
    /// Present exactly when this episode caused an Idle -> Triggered edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_class_boundaries() {
        assert_eq!(DayClass::from_weekday(Weekday::Sat), DayClass::Weekend);
        assert_eq!(DayClass::from_weekday(Weekday::Sun), DayClass::Weekend);
        assert_eq!(DayClass::from_weekday(Weekday::Mon), DayClass::Weekday);
        assert_eq!(DayClass::from_weekday(Weekday::Fri), DayClass::Weekday);
    }

    #[test]
    fn test_local_stamp_extraction() {
        // 2024-01-14 is a Sunday
        let dt = Utc.with_ymd_and_hms(2024, 1, 14, 13, 45, 0).unwrap();
        let stamp = LocalStamp::of(&dt);

        assert_eq!(stamp.weekday, Weekday::Sun);
        assert_eq!(stamp.hour, 13);
        assert_eq!(stamp.minute, 45);
        assert_eq!(stamp.day_class(), DayClass::Weekend);
        assert!((stamp.fractional_hour() - 13.75).abs() < 1e-12);
    }

    #[test]
    fn test_episode_well_formedness() {
        let t = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();

        let ok = Episode::new(t, 600, 30);
        assert!(ok.is_well_formed());
        assert_eq!(ok.total_seconds(), 630);

        let bad = Episode::new(t, -1, 30);
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn test_episode_ids_are_unique() {
        let t = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let a = Episode::new(t, 10, 10);
        let b = Episode::new(t, 10, 10);
        assert_ne!(a.id, b.id);
    }
}
