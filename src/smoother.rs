//! Seasonal curve denoising
//!
//! Hourly buckets with few historical episodes carry a lot of sampling
//! noise. This module reconstructs a denoised expectation at an arbitrary
//! fractional hour of day, either by low-pass filtering the 24-hour curve
//! (discrete Fourier transform, DC plus the first three harmonics) or by
//! the legacy linear blend of two adjacent hourly buckets.

use crate::baseline::{SeasonalBaseline, HOURS_PER_DAY};
use crate::types::{ExpectedActivity, ExpectedSource, LocalStamp};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sentinel mean/stdev returned while history is too thin to judge
/// anything. Far above any reachable activity level, so the derived
/// threshold suppresses notifications during cold start.
pub const COLD_START_SENTINEL: f64 = 1001.0;

/// Minimum cumulative observed seconds before the overall accumulator is
/// trusted: one hour
pub const MIN_HISTORY_SECONDS: f64 = 3600.0;

/// Retained spectrum: DC plus the first three daily harmonics, encoded as
/// even indices with paired real/imaginary components
const HARMONICS: [usize; 4] = [0, 2, 4, 6];

/// How the expected mean/stdev are derived from the hourly buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingStrategy {
    /// Low-pass Fourier reconstruction of the full 24-hour class curve.
    /// Requires every hourly bucket of the class to hold data.
    Fourier,
    /// Linear blend of the two hourly buckets nearest the episode start.
    /// Legacy behavior; requires only those two buckets to hold data.
    Interpolated,
}

/// Produces the expected activity used for thresholding
#[derive(Debug, Clone)]
pub struct SeasonalSmoother {
    strategy: SmoothingStrategy,
}

impl SeasonalSmoother {
    pub fn new(strategy: SmoothingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SmoothingStrategy {
        self.strategy
    }

    /// Expected activity at the episode's local time.
    ///
    /// Falls back to the overall accumulator when the seasonal curve lacks
    /// coverage, and to the cold-start sentinel when fewer than
    /// [`MIN_HISTORY_SECONDS`] of history have been observed in total.
    pub fn expected(
        &self,
        baseline: &SeasonalBaseline,
        stamp: &LocalStamp,
        observed_seconds: f64,
    ) -> ExpectedActivity {
        match self.strategy {
            SmoothingStrategy::Fourier => {
                let class = stamp.day_class();
                if baseline.hours_with_data(class) == HOURS_PER_DAY {
                    let t = stamp.fractional_hour();
                    let mean = lowpass_reconstruct(&baseline.hourly_means(class), t);
                    let stdev = lowpass_reconstruct(&baseline.hourly_stdevs(class), t);
                    // Low-pass ringing can dip below zero between sparse
                    // hours; expectations are non-negative.
                    return ExpectedActivity {
                        mean: mean.max(0.0),
                        stdev: stdev.max(0.0),
                        source: ExpectedSource::Seasonal,
                    };
                }
            }
            SmoothingStrategy::Interpolated => {
                let blend =
                    baseline.neighbor_for_interpolation(stamp.weekday, stamp.hour, stamp.minute);
                let primary = baseline.bucket(blend.primary.class, blend.primary.hour);
                let neighbor = baseline.bucket(blend.neighbor.class, blend.neighbor.hour);
                if primary.count() > 0 && neighbor.count() > 0 {
                    return ExpectedActivity {
                        mean: blend.weight_primary * primary.mean()
                            + blend.weight_neighbor * neighbor.mean(),
                        stdev: blend.weight_primary * primary.stdev()
                            + blend.weight_neighbor * neighbor.stdev(),
                        source: ExpectedSource::Seasonal,
                    };
                }
            }
        }

        self.fallback(baseline, observed_seconds)
    }

    fn fallback(&self, baseline: &SeasonalBaseline, observed_seconds: f64) -> ExpectedActivity {
        if observed_seconds >= MIN_HISTORY_SECONDS {
            ExpectedActivity {
                mean: baseline.overall().mean(),
                stdev: baseline.overall().stdev(),
                source: ExpectedSource::Overall,
            }
        } else {
            ExpectedActivity {
                mean: COLD_START_SENTINEL,
                stdev: COLD_START_SENTINEL,
                source: ExpectedSource::ColdStart,
            }
        }
    }
}

/// Forward-transform the 24-hour curve over the retained harmonics and
/// reconstruct the single-sided spectrum at fractional hour `t`
fn lowpass_reconstruct(curve: &[f64; HOURS_PER_DAY], t: f64) -> f64 {
    let mut acc = 0.0;

    for &k in &HARMONICS {
        let mut a = 0.0;
        let mut b = 0.0;
        for (h, &value) in curve.iter().enumerate() {
            let angle = PI * k as f64 * h as f64 / HOURS_PER_DAY as f64;
            a += value * angle.cos();
            b += value * angle.sin();
        }

        let weight = if k == 0 { 1.0 } else { 2.0 };
        let angle = PI * k as f64 * t / HOURS_PER_DAY as f64;
        acc += weight * (a * angle.cos() + b * angle.sin());
    }

    acc / HOURS_PER_DAY as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn stamp(weekday: Weekday, hour: u32, minute: u32) -> LocalStamp {
        LocalStamp {
            weekday,
            hour,
            minute,
        }
    }

    /// Two observations per hour so stdevs are defined
    fn full_weekday_baseline(level: f64) -> SeasonalBaseline {
        let mut baseline = SeasonalBaseline::new();
        for hour in 0..HOURS_PER_DAY as u32 {
            baseline.record(level, Weekday::Mon, hour);
            baseline.record(level, Weekday::Tue, hour);
        }
        baseline
    }

    #[test]
    fn test_constant_curve_reconstructs_exactly() {
        let curve = [3.25; HOURS_PER_DAY];
        for &t in &[0.0, 7.25, 13.5, 23.9] {
            let reconstructed = lowpass_reconstruct(&curve, t);
            assert!(
                (reconstructed - 3.25).abs() < 1e-9,
                "at t={}: {}",
                t,
                reconstructed
            );
        }
    }

    #[test]
    fn test_lowpass_attenuates_a_spike() {
        let mut curve = [0.0; HOURS_PER_DAY];
        curve[12] = 24.0;

        let at_peak = lowpass_reconstruct(&curve, 12.0);
        // The retained harmonics spread the spike's energy: the peak drops
        // well below the raw value but stays above the DC level of 1.
        assert!(at_peak < 24.0);
        assert!(at_peak > 1.0);
    }

    #[test]
    fn test_fourier_with_full_coverage_is_seasonal() {
        let baseline = full_weekday_baseline(0.4);
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Fourier);

        let expected = smoother.expected(&baseline, &stamp(Weekday::Wed, 10, 30), 100_000.0);
        assert_eq!(expected.source, ExpectedSource::Seasonal);
        assert!((expected.mean - 0.4).abs() < 1e-9);
        assert!(expected.stdev.abs() < 1e-9);
    }

    #[test]
    fn test_fourier_partial_coverage_falls_back_to_overall() {
        let mut baseline = SeasonalBaseline::new();
        for hour in 0..12 {
            baseline.record(0.6, Weekday::Mon, hour);
        }
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Fourier);

        let expected = smoother.expected(&baseline, &stamp(Weekday::Mon, 5, 0), 100_000.0);
        assert_eq!(expected.source, ExpectedSource::Overall);
        assert!((expected.mean - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_cold_start_returns_sentinel() {
        let mut baseline = SeasonalBaseline::new();
        baseline.record(0.9, Weekday::Mon, 5);
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Fourier);

        let expected = smoother.expected(&baseline, &stamp(Weekday::Mon, 5, 0), 1800.0);
        assert_eq!(expected.source, ExpectedSource::ColdStart);
        assert_eq!(expected.mean, COLD_START_SENTINEL);
        assert_eq!(expected.stdev, COLD_START_SENTINEL);
    }

    #[test]
    fn test_interpolated_blends_adjacent_buckets() {
        let mut baseline = SeasonalBaseline::new();
        baseline.record(0.2, Weekday::Mon, 10);
        baseline.record(0.6, Weekday::Mon, 11);
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Interpolated);

        // 10:45 blends forward: weight 45/60 on hour 10, 15/60 on hour 11
        let expected = smoother.expected(&baseline, &stamp(Weekday::Mon, 10, 45), 100_000.0);
        assert_eq!(expected.source, ExpectedSource::Seasonal);
        let blended = 0.75 * 0.2 + 0.25 * 0.6;
        assert!((expected.mean - blended).abs() < 1e-12);
    }

    #[test]
    fn test_interpolated_empty_neighbor_falls_back() {
        let mut baseline = SeasonalBaseline::new();
        baseline.record(0.2, Weekday::Mon, 10);
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Interpolated);

        // Hour 11 has no data, so the blend is unusable
        let expected = smoother.expected(&baseline, &stamp(Weekday::Mon, 10, 45), 100_000.0);
        assert_eq!(expected.source, ExpectedSource::Overall);
    }

    #[test]
    fn test_weekend_class_uses_weekend_curve() {
        let mut baseline = SeasonalBaseline::new();
        for hour in 0..HOURS_PER_DAY as u32 {
            baseline.record(0.1, Weekday::Mon, hour);
            baseline.record(0.8, Weekday::Sat, hour);
        }
        let smoother = SeasonalSmoother::new(SmoothingStrategy::Fourier);

        let expected = smoother.expected(&baseline, &stamp(Weekday::Sun, 12, 0), 100_000.0);
        assert_eq!(expected.source, ExpectedSource::Seasonal);
        assert!((expected.mean - 0.8).abs() < 1e-9);
    }
}
