//! # Gain Schedule Runner
//!
//! Drives an ordered list of coefficient sets through the closed loop: each
//! set goes in via the reset-before-change protocol, its settle interval is
//! waited out, the window statistics are measured, and the regime is
//! classified. The reports come back in schedule order.

use tracing::info;

use crate::closed_loop::ClosedLoop;
use crate::regime::{ringing_gains, sluggish_gains, tracking_gains, GainSet, Regime, RegimeThresholds};

/// Measured outcome of one scheduled coefficient set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetReport {
    /// The coefficient set that was applied.
    pub gains: GainSet,
    /// Mean error over the post-settle window.
    pub mean: f64,
    /// RMS deviation of the error over the post-settle window.
    pub rms: f64,
    /// Classified regime.
    pub regime: Regime,
}

/// An ordered list of coefficient sets to measure and classify.
#[derive(Debug, Clone)]
pub struct GainSchedule {
    entries: Vec<GainSet>,
    thresholds: RegimeThresholds,
    measure_ticks: u64,
}

impl GainSchedule {
    /// Build a schedule with default thresholds and enough measurement ticks
    /// to fill a standard window with post-settle samples.
    pub fn new(entries: Vec<GainSet>) -> Self {
        Self {
            entries,
            thresholds: RegimeThresholds::default(),
            measure_ticks: 150,
        }
    }

    /// The canonical three-set schedule: a converging tracker, an
    /// integral-only crawl, and a ringing runaway.
    pub fn standard() -> Self {
        Self::new(vec![tracking_gains(), sluggish_gains(), ringing_gains()])
    }

    /// Override the classification thresholds.
    pub fn with_thresholds(mut self, thresholds: RegimeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override the measurement length.
    pub fn with_measure_ticks(mut self, measure_ticks: u64) -> Self {
        self.measure_ticks = measure_ticks;
        self
    }

    /// The scheduled sets in order.
    pub fn entries(&self) -> &[GainSet] {
        &self.entries
    }

    /// Run every set through the loop in order, returning one report each.
    pub fn run(&self, sim: &mut ClosedLoop) -> Vec<SetReport> {
        self.entries
            .iter()
            .map(|gains| {
                let m = sim.run_set(gains, self.measure_ticks);
                let regime = self.thresholds.classify(m.mean, m.rms);
                info!(
                    kp = gains.kp,
                    ki = gains.ki,
                    kd = gains.kd,
                    mean = m.mean,
                    rms = m.rms,
                    %regime,
                    "measured coefficient set"
                );
                SetReport {
                    gains: *gains,
                    mean: m.mean,
                    rms: m.rms,
                    regime,
                }
            })
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schedule_order() {
        let sched = GainSchedule::standard();
        let entries = sched.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], tracking_gains());
        assert_eq!(entries[1], sluggish_gains());
        assert_eq!(entries[2], ringing_gains());
    }

    #[test]
    fn test_builder_overrides() {
        let sched = GainSchedule::new(vec![tracking_gains()])
            .with_measure_ticks(42)
            .with_thresholds(RegimeThresholds {
                stable_rms: 0.01,
                overdamped_mean: 2.0,
                unstable_rms: 50.0,
            });
        assert_eq!(sched.measure_ticks, 42);
        assert_eq!(sched.thresholds.overdamped_mean, 2.0);
    }
}
