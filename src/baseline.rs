//! Seasonal baseline management
//!
//! This module maintains the learned activity baseline, bucketed by
//! hour-of-day and weekday/weekend class, plus one overall accumulator.
//! Buckets enable relative interpretation of the current activity level
//! against what is normal for this time of day.

use crate::stats::OnlineMoments;
use crate::types::{BucketKey, DayClass};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Hours in the daily curve
pub const HOURS_PER_DAY: usize = 24;

/// Per-class hourly activity statistics plus a process-wide accumulator.
///
/// A bucket is selected by `(day class, hour of day)`. The store lives for
/// the whole process: rebuilt from replayed history at start-up, then grown
/// incrementally with one observation per finished episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalBaseline {
    weekday: Vec<OnlineMoments>,
    weekend: Vec<OnlineMoments>,
    overall: OnlineMoments,
}

impl Default for SeasonalBaseline {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonalBaseline {
    pub fn new() -> Self {
        Self {
            weekday: vec![OnlineMoments::new(); HOURS_PER_DAY],
            weekend: vec![OnlineMoments::new(); HOURS_PER_DAY],
            overall: OnlineMoments::new(),
        }
    }

    /// Record one activity observation into the overall accumulator and the
    /// bucket matching the episode's local hour and day class. Returns the
    /// updated bucket so the caller can read its statistics without a
    /// second lookup.
    pub fn record(&mut self, x: f64, weekday: Weekday, hour: u32) -> &OnlineMoments {
        self.overall.push(x);

        let class = DayClass::from_weekday(weekday);
        let bucket = match class {
            DayClass::Weekday => &mut self.weekday[hour as usize],
            DayClass::Weekend => &mut self.weekend[hour as usize],
        };
        bucket.push(x);
        bucket
    }

    /// Read one hourly bucket
    pub fn bucket(&self, class: DayClass, hour: u32) -> &OnlineMoments {
        match class {
            DayClass::Weekday => &self.weekday[hour as usize],
            DayClass::Weekend => &self.weekend[hour as usize],
        }
    }

    /// Read the process-wide accumulator
    pub fn overall(&self) -> &OnlineMoments {
        &self.overall
    }

    /// Number of hourly buckets of a class holding at least one observation
    pub fn hours_with_data(&self, class: DayClass) -> usize {
        (0..HOURS_PER_DAY as u32)
            .filter(|&h| self.bucket(class, h).count() > 0)
            .count()
    }

    /// The 24 hourly means of one class, in hour order
    pub fn hourly_means(&self, class: DayClass) -> [f64; HOURS_PER_DAY] {
        let mut curve = [0.0; HOURS_PER_DAY];
        for (h, value) in curve.iter_mut().enumerate() {
            *value = self.bucket(class, h as u32).mean();
        }
        curve
    }

    /// The 24 hourly standard deviations of one class, in hour order
    pub fn hourly_stdevs(&self, class: DayClass) -> [f64; HOURS_PER_DAY] {
        let mut curve = [0.0; HOURS_PER_DAY];
        for (h, value) in curve.iter_mut().enumerate() {
            *value = self.bucket(class, h as u32).stdev();
        }
        curve
    }

    /// Select the neighboring hourly bucket to blend with for a
    /// continuous-in-time estimate from discrete hourly buckets.
    ///
    /// Minute-of-hour decides direction: minute >= 30 blends forward into
    /// the next hour, otherwise backward into the previous hour. Day
    /// boundaries wrap into the adjacent calendar day's class: hour 23
    /// forward into hour 0 of the next day, hour 0 backward into hour 23 of
    /// the previous day. The primary weight is linearly proportional to
    /// proximity.
    pub fn neighbor_for_interpolation(
        &self,
        weekday: Weekday,
        hour: u32,
        minute: u32,
    ) -> NeighborBlend {
        let primary = BucketKey {
            class: DayClass::from_weekday(weekday),
            hour,
        };

        let (neighbor, weight_primary) = if minute >= 30 {
            let neighbor = if hour == 23 {
                BucketKey {
                    class: DayClass::from_weekday(weekday.succ()),
                    hour: 0,
                }
            } else {
                BucketKey {
                    class: primary.class,
                    hour: hour + 1,
                }
            };
            (neighbor, (90.0 - minute as f64) / 60.0)
        } else {
            let neighbor = if hour == 0 {
                BucketKey {
                    class: DayClass::from_weekday(weekday.pred()),
                    hour: 23,
                }
            } else {
                BucketKey {
                    class: primary.class,
                    hour: hour - 1,
                }
            };
            (neighbor, (31.0 + minute as f64) / 60.0)
        };

        NeighborBlend {
            primary,
            neighbor,
            weight_primary,
            weight_neighbor: 1.0 - weight_primary,
        }
    }

    /// Read-only view of every bucket's statistics for host-side export
    pub fn snapshot(&self) -> BaselineSnapshot {
        BaselineSnapshot {
            weekday: self.weekday.iter().map(BucketStats::of).collect(),
            weekend: self.weekend.iter().map(BucketStats::of).collect(),
            overall: BucketStats::of(&self.overall),
        }
    }

    /// Load baseline state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize baseline state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of a neighbor-bucket selection for linear interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborBlend {
    pub primary: BucketKey,
    pub neighbor: BucketKey,
    pub weight_primary: f64,
    pub weight_neighbor: f64,
}

/// Exported statistics of one bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketStats {
    pub count: u64,
    pub mean: f64,
    pub stdev: f64,
}

impl BucketStats {
    fn of(moments: &OnlineMoments) -> Self {
        Self {
            count: moments.count(),
            mean: moments.mean(),
            stdev: moments.stdev(),
        }
    }
}

/// Read-only view of the whole baseline, for logging to an external time
/// series. The engine exposes this; persistence belongs to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    /// Hourly weekday buckets, index = hour of day
    pub weekday: Vec<BucketStats>,
    /// Hourly weekend buckets, index = hour of day
    pub weekend: Vec<BucketStats>,
    pub overall: BucketStats,
}
