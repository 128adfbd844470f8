//! # Stability Regimes
//!
//! Taxonomy and thresholds for classifying the closed loop's dynamical
//! behavior from moving-window error statistics, plus named gain presets for
//! the documented scenarios.
//!
//! Classification is most-severe-first: a window can have both a runaway RMS
//! and a large mean, and it is the runaway that matters.

use serde::{Deserialize, Serialize};

/// Dynamical regime of the closed loop under a coefficient set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Error has converged: window RMS below the stable threshold.
    Stable,
    /// Bounded residual oscillation around the setpoint.
    Underdamped,
    /// Loop too slow: large mean error persists after the settle interval.
    Overdamped,
    /// Growing oscillation: window RMS above the unstable threshold.
    Unstable,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Stable => write!(f, "stable"),
            Regime::Underdamped => write!(f, "underdamped"),
            Regime::Overdamped => write!(f, "overdamped"),
            Regime::Unstable => write!(f, "unstable"),
        }
    }
}

/// Thresholds separating the regimes, in setpoint units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// Window RMS below this is converged.
    pub stable_rms: f64,
    /// Absolute window mean above this is a loop that never caught up.
    pub overdamped_mean: f64,
    /// Window RMS above this is a runaway oscillation.
    pub unstable_rms: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            stable_rms: 0.001,
            overdamped_mean: 1.0,
            unstable_rms: 5.0,
        }
    }
}

impl RegimeThresholds {
    /// Classify a window's mean and RMS deviation, most severe first.
    pub fn classify(&self, mean: f64, rms: f64) -> Regime {
        if rms > self.unstable_rms {
            Regime::Unstable
        } else if mean.abs() > self.overdamped_mean {
            Regime::Overdamped
        } else if rms < self.stable_rms {
            Regime::Stable
        } else {
            Regime::Underdamped
        }
    }
}

/// One kp/ki/kd coefficient set, in real units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSet {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl GainSet {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

// ---------------------------------------------------------------------------
// Preset coefficient sets
// ---------------------------------------------------------------------------

/// Moderate proportional with a slow integral: converges to the setpoint
/// with no steady-state error.
pub fn tracking_gains() -> GainSet {
    GainSet::new(0.1, 0.03, 0.0)
}

/// Integral-only and an order of magnitude too slow: the loop crawls toward
/// the setpoint and still carries a large mean error after settling.
pub fn sluggish_gains() -> GainSet {
    GainSet::new(0.0, 0.003, 0.0)
}

/// Aggressive integral and derivative against the pipeline latency: the
/// loop rings and the oscillation grows until the data path saturates.
pub fn ringing_gains() -> GainSet {
    GainSet::new(0.11, 0.3, 0.395)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        let t = RegimeThresholds::default();
        assert_eq!(t.classify(0.0, 0.0), Regime::Stable);
        assert_eq!(t.classify(0.0, 0.0005), Regime::Stable);
        assert_eq!(t.classify(0.2, 0.5), Regime::Underdamped);
        assert_eq!(t.classify(2.5, 0.1), Regime::Overdamped);
        assert_eq!(t.classify(-2.5, 0.1), Regime::Overdamped);
        assert_eq!(t.classify(0.0, 100.0), Regime::Unstable);
    }

    #[test]
    fn test_unstable_dominates_overdamped() {
        // A runaway window usually also has a large mean; severity wins.
        let t = RegimeThresholds::default();
        assert_eq!(t.classify(50.0, 50.0), Regime::Unstable);
    }

    #[test]
    fn test_display() {
        assert_eq!(Regime::Stable.to_string(), "stable");
        assert_eq!(Regime::Unstable.to_string(), "unstable");
    }

    #[test]
    fn test_presets() {
        assert_eq!(tracking_gains().kp, 0.1);
        assert_eq!(sluggish_gains().kp, 0.0);
        assert!(ringing_gains().kd > 0.0);
    }
}
