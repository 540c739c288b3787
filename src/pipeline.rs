//! Pipeline orchestration
//!
//! This module provides the public entry point for episode processing. It
//! wires the stages together: activity update -> baseline record ->
//! seasonal denoising -> threshold -> trigger evaluation, one finished
//! episode at a time, in arrival order.

use crate::activity::ActivityEstimator;
use crate::baseline::{BaselineSnapshot, SeasonalBaseline};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::smoother::SeasonalSmoother;
use crate::threshold::ThresholdPolicy;
use crate::trigger::TriggerEngine;
use crate::types::{Episode, EpisodeOutcome, LocalStamp, Notification, TriggerState};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Stateful processor for a stream of activity episodes.
///
/// Single-threaded and synchronous: one episode is fully processed before
/// the next is accepted, and nothing here blocks or performs I/O. A
/// multi-threaded host must serialize calls behind its own lock.
#[derive(Debug)]
pub struct VigilProcessor {
    config: EngineConfig,
    timezone: Tz,
    estimator: ActivityEstimator,
    baseline: SeasonalBaseline,
    smoother: SeasonalSmoother,
    policy: ThresholdPolicy,
    trigger: TriggerEngine,
    episode_count: u64,
    observed_seconds: f64,
}

/// Persistable engine state, for hosts that snapshot instead of replaying
/// the full episode log
#[derive(Debug, Serialize, Deserialize)]
struct EngineState {
    baseline: SeasonalBaseline,
    activity_level: f64,
    episode_count: u64,
    observed_seconds: f64,
    trigger_state: TriggerState,
}

impl VigilProcessor {
    /// Create a processor with default settings (weekly return period,
    /// ten-minute decay, UTC, Fourier smoothing)
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(EngineConfig::default())
    }

    /// Create a processor with the given configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        let timezone = config.validate()?;

        Ok(Self {
            estimator: ActivityEstimator::new(config.decay),
            baseline: SeasonalBaseline::new(),
            smoother: SeasonalSmoother::new(config.smoothing),
            policy: ThresholdPolicy::new(config.return_period_hours),
            trigger: TriggerEngine::new(),
            episode_count: 0,
            observed_seconds: 0.0,
            timezone,
            config,
        })
    }

    /// Process one finished episode and decide whether to notify.
    ///
    /// Must be called exactly once per episode, in chronological order.
    /// Malformed episodes (negative durations) leave every accumulator
    /// untouched and never notify.
    pub fn on_episode_finished(&mut self, episode: &Episode) -> EpisodeOutcome {
        let stamp = LocalStamp::of(&episode.start_time.with_timezone(&self.timezone));

        if !episode.is_well_formed() {
            tracing::debug!(
                episode_id = %episode.id,
                idle_seconds = episode.idle_seconds,
                active_seconds = episode.active_seconds,
                "malformed episode durations, skipping update"
            );
            let expected = self
                .smoother
                .expected(&self.baseline, &stamp, self.observed_seconds);
            return EpisodeOutcome {
                episode_id: episode.id,
                activity_level: self.estimator.level(),
                expected,
                threshold: None,
                events_per_hour: self.events_per_hour(),
                state: self.trigger.state(),
                notification: None,
            };
        }

        let activity_level = self
            .estimator
            .update(episode.idle_seconds, episode.active_seconds);
        self.baseline.record(activity_level, stamp.weekday, stamp.hour);

        // The rate includes the episode being judged: counters advance
        // before its threshold is computed.
        self.episode_count += 1;
        self.observed_seconds += episode.total_seconds() as f64;

        let expected = self
            .smoother
            .expected(&self.baseline, &stamp, self.observed_seconds);
        let events_per_hour = self.events_per_hour();
        let decision = self
            .trigger
            .evaluate(activity_level, &expected, &self.policy, events_per_hour);

        let notification = if decision.fired {
            Some(Notification {
                episode_id: episode.id,
                episode_start_time: episode.start_time,
            })
        } else {
            None
        };

        EpisodeOutcome {
            episode_id: episode.id,
            activity_level,
            expected,
            threshold: decision.threshold,
            events_per_hour,
            state: decision.state,
            notification,
        }
    }

    /// Rebuild in-memory state from an ordered historical episode log.
    ///
    /// Feeds every episode through [`Self::on_episode_finished`] and
    /// discards the outcomes: notifications raised against history must not
    /// reach the notification collaborator. Returns the number of episodes
    /// replayed.
    pub fn replay_history(&mut self, episodes: &[Episode]) -> usize {
        for episode in episodes {
            self.on_episode_finished(episode);
        }
        tracing::debug!(replayed = episodes.len(), "historical episodes replayed");
        episodes.len()
    }

    /// Incrementally maintained episode rate: episodes per hour of observed
    /// time, 0 before any time has been observed
    pub fn events_per_hour(&self) -> f64 {
        if self.observed_seconds > 0.0 {
            self.episode_count as f64 / self.observed_seconds * 3600.0
        } else {
            0.0
        }
    }

    /// Current activity level
    pub fn activity_level(&self) -> f64 {
        self.estimator.level()
    }

    /// Current trigger state
    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    /// Episodes processed since construction (or state load)
    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    /// Cumulative idle+active seconds observed
    pub fn observed_seconds(&self) -> f64 {
        self.observed_seconds
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only view of every baseline bucket for host-side export
    pub fn baseline_snapshot(&self) -> BaselineSnapshot {
        self.baseline.snapshot()
    }

    /// Serialize the engine state to JSON for persistence
    pub fn save_state(&self) -> Result<String, EngineError> {
        let state = EngineState {
            baseline: self.baseline.clone(),
            activity_level: self.estimator.level(),
            episode_count: self.episode_count,
            observed_seconds: self.observed_seconds,
            trigger_state: self.trigger.state(),
        };
        Ok(serde_json::to_string(&state)?)
    }

    /// Restore engine state from JSON produced by [`Self::save_state`].
    ///
    /// The configuration (decay, return period, timezone, smoothing) is not
    /// part of the persisted state; it stays as constructed.
    pub fn load_state(&mut self, json: &str) -> Result<(), EngineError> {
        let state: EngineState = serde_json::from_str(json)?;

        self.baseline = state.baseline;
        self.estimator = ActivityEstimator::with_level(self.config.decay, state.activity_level);
        self.episode_count = state.episode_count;
        self.observed_seconds = state.observed_seconds;
        self.trigger = TriggerEngine::with_state(state.trigger_state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpectedSource;
    use chrono::{TimeZone, Utc};

    fn make_episode(day: u32, hour: u32, minute: u32, idle: i64, active: i64) -> Episode {
        let start = Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap();
        Episode::new(start, idle, active)
    }

    fn make_processor() -> VigilProcessor {
        VigilProcessor::new().unwrap()
    }

    /// Twenty silent hours establishing a zero baseline with enough
    /// observed time to leave cold start. 2024-01-08 is a Monday.
    fn quiet_history() -> Vec<Episode> {
        (0..20).map(|h| make_episode(8, h, 0, 3600, 0)).collect()
    }

    /// Twenty hours with the same small burst in each, converging the
    /// activity level to a steady value with a nonzero baseline
    fn steady_history() -> Vec<Episode> {
        (0..20).map(|h| make_episode(8, h, 0, 3400, 200)).collect()
    }

    #[test]
    fn test_construction_rejects_bad_config() {
        let config = EngineConfig {
            decay: -0.1,
            ..EngineConfig::default()
        };
        assert!(VigilProcessor::with_config(config).is_err());
    }

    #[test]
    fn test_cold_start_suppresses_notifications() {
        let mut processor = make_processor();

        // Under an hour of history, as active as it gets
        for minute in 0..3 {
            let outcome =
                processor.on_episode_finished(&make_episode(8, 9, minute * 10, 60, 540));
            assert_eq!(outcome.expected.source, ExpectedSource::ColdStart);
            assert!(outcome.notification.is_none());
            assert_eq!(outcome.state, TriggerState::Idle);
        }
    }

    #[test]
    fn test_event_rate_is_count_over_observed_time() {
        let mut processor = make_processor();
        processor.on_episode_finished(&make_episode(8, 9, 0, 1700, 100));
        processor.on_episode_finished(&make_episode(8, 10, 0, 1750, 50));

        assert_eq!(processor.episode_count(), 2);
        assert!((processor.observed_seconds() - 3600.0).abs() < 1e-9);
        assert!((processor.events_per_hour() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_notification_fires_once_then_releases() {
        let mut processor = make_processor();
        processor.replay_history(&quiet_history());
        assert_eq!(processor.trigger_state(), TriggerState::Idle);

        // A burst of sustained activity against a silent baseline
        let outcome = processor.on_episode_finished(&make_episode(8, 21, 0, 7200, 600));
        assert_eq!(outcome.state, TriggerState::Triggered);
        let notification = outcome.notification.expect("burst should notify");
        assert_eq!(notification.episode_id, outcome.episode_id);

        // Still busy: suppressed by hysteresis, no second notification
        let outcome = processor.on_episode_finished(&make_episode(8, 21, 20, 600, 600));
        assert_eq!(outcome.state, TriggerState::Triggered);
        assert!(outcome.notification.is_none());

        // The level has collapsed by the next morning and the trigger
        // releases
        let outcome = processor.on_episode_finished(&make_episode(9, 7, 0, 34_200, 1));
        assert_eq!(outcome.state, TriggerState::Idle);
        assert!(outcome.notification.is_none());
    }

    #[test]
    fn test_unremarkable_episode_stays_idle_with_threshold() {
        let mut processor = make_processor();
        processor.replay_history(&steady_history());

        // Another episode matching the established rhythm: judged against
        // a live threshold but below it
        let outcome = processor.on_episode_finished(&make_episode(8, 20, 0, 3400, 200));
        assert_eq!(outcome.state, TriggerState::Idle);
        assert!(outcome.notification.is_none());
        let threshold = outcome.threshold.expect("idle evaluation reports a threshold");
        assert!(outcome.activity_level < threshold);
        assert!(outcome.events_per_hour > 0.0);
    }

    #[test]
    fn test_malformed_episode_is_a_no_op() {
        let mut processor = make_processor();
        processor.on_episode_finished(&make_episode(8, 9, 0, 1800, 120));

        let count = processor.episode_count();
        let seconds = processor.observed_seconds();
        let level = processor.activity_level();

        let outcome = processor.on_episode_finished(&make_episode(8, 10, 0, -5, 120));
        assert!(outcome.notification.is_none());
        assert_eq!(outcome.threshold, None);
        assert_eq!(processor.episode_count(), count);
        assert_eq!(processor.observed_seconds(), seconds);
        assert_eq!(processor.activity_level(), level);
    }

    #[test]
    fn test_replay_is_idempotent_from_fresh_state() {
        // Five weekday episodes, then five on the following Saturday
        let log: Vec<Episode> = (0..10u32)
            .map(|i| {
                let (day, hour) = if i < 5 { (8, 2 * i) } else { (13, 2 * (i - 5)) };
                make_episode(day, hour, 0, 1200 + 60 * i as i64, 30)
            })
            .collect();

        let mut first = make_processor();
        first.replay_history(&log);

        let mut second = make_processor();
        second.replay_history(&log);

        assert_eq!(first.save_state().unwrap(), second.save_state().unwrap());
    }

    #[test]
    fn test_save_load_round_trip_preserves_behavior() {
        let mut original = make_processor();
        original.replay_history(&quiet_history());

        let saved = original.save_state().unwrap();
        let mut restored = make_processor();
        restored.load_state(&saved).unwrap();

        assert_eq!(restored.episode_count(), original.episode_count());
        assert_eq!(restored.activity_level(), original.activity_level());
        assert_eq!(restored.trigger_state(), original.trigger_state());

        // Both must make the identical decision on the next episode
        let next = make_episode(8, 21, 0, 7200, 600);
        let a = original.on_episode_finished(&next);
        let b = restored.on_episode_finished(&next);
        assert_eq!(a.activity_level, b.activity_level);
        assert_eq!(a.threshold, b.threshold);
        assert_eq!(a.state, b.state);
        assert_eq!(a.notification.is_some(), b.notification.is_some());
    }

    #[test]
    fn test_load_state_rejects_garbage() {
        let mut processor = make_processor();
        assert!(processor.load_state("not json").is_err());
    }

    #[test]
    fn test_baseline_snapshot_reflects_processing() {
        let mut processor = make_processor();
        // 2024-01-08 is a Monday
        processor.on_episode_finished(&make_episode(8, 9, 0, 1800, 60));

        let snapshot = processor.baseline_snapshot();
        assert_eq!(snapshot.overall.count, 1);
        assert_eq!(snapshot.weekday[9].count, 1);
        assert_eq!(snapshot.weekend[9].count, 0);
    }

    #[test]
    fn test_timezone_places_episodes_on_local_clock() {
        let config = EngineConfig {
            timezone: "America/New_York".to_string(),
            ..EngineConfig::default()
        };
        let mut processor = VigilProcessor::with_config(config).unwrap();

        // 2024-01-08 03:00 UTC is 2024-01-07 22:00 in New York: a Sunday
        // evening, so the observation belongs to weekend[22]
        processor.on_episode_finished(&make_episode(8, 3, 0, 1800, 60));

        let snapshot = processor.baseline_snapshot();
        assert_eq!(snapshot.weekend[22].count, 1);
        assert_eq!(snapshot.weekday[3].count, 0);
    }
}
