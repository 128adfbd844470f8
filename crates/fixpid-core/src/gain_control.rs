//! # Coefficient & Reset Controller
//!
//! Applies a new kp/ki/kd set to a [`PidPipeline`] under the mandatory
//! reset-before-change protocol: the coefficient pins are rewritten, the
//! reset line is held for a caller-specified number of ticks, and a further
//! settle interval elapses before the set is considered in effect for
//! measurement purposes.
//!
//! The pipeline samples its coefficient pins continuously, so a bare
//! mid-stream change would mix old and new gains across the in-flight
//! stages and leave the integrator carrying history from the previous set.
//! Forcing a reset on every change removes that hazard, at the cost of a
//! settle-time tax. This protocol is part of the engine's contract, not a
//! test-bench convenience.
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::gain_control::GainController;
//! use fixpid_core::pid_pipeline::{PidPipeline, PipelineConfig};
//!
//! let mut pid = PidPipeline::new(PipelineConfig::default()).unwrap();
//! let mut ctrl = GainController::new(4, 16).unwrap();
//!
//! ctrl.apply(&mut pid, 0.1, 0.03, 0.0);
//! assert!(!ctrl.settled());
//!
//! // Reset is held for exactly four ticks, then released.
//! for _ in 0..4 {
//!     assert!(ctrl.tick());
//! }
//! assert!(!ctrl.tick());
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::pid_pipeline::PidPipeline;

/// Protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No change in flight; the last applied set is in effect.
    Idle,
    /// Reset line asserted.
    Resetting { remaining: u32 },
    /// Reset released; waiting out the settle interval.
    Settling { remaining: u32 },
}

/// Drives the reset line through the coefficient-change protocol.
#[derive(Debug, Clone)]
pub struct GainController {
    reset_ticks: u32,
    settle_ticks: u32,
    phase: Phase,
}

impl GainController {
    /// Create a controller that holds reset for `reset_ticks` (at least one)
    /// and then waits `settle_ticks` before reporting the set in effect.
    pub fn new(reset_ticks: u32, settle_ticks: u32) -> ConfigResult<Self> {
        if reset_ticks == 0 {
            return Err(ConfigError::EmptyResetWindow);
        }
        Ok(Self {
            reset_ticks,
            settle_ticks,
            phase: Phase::Idle,
        })
    }

    /// Configured reset window length.
    pub fn reset_ticks(&self) -> u32 {
        self.reset_ticks
    }

    /// Configured settle interval.
    pub fn settle_ticks(&self) -> u32 {
        self.settle_ticks
    }

    /// Write a new coefficient set to the pipeline's pins and start the
    /// protocol. Re-applying while a previous change is still in flight
    /// restarts the reset window from scratch.
    pub fn apply(&mut self, pipeline: &mut PidPipeline, kp: f64, ki: f64, kd: f64) {
        pipeline.set_gains_f64(kp, ki, kd);
        self.phase = Phase::Resetting {
            remaining: self.reset_ticks,
        };
    }

    /// Advance the protocol one tick; returns the reset line value to feed
    /// into the pipeline for this tick.
    pub fn tick(&mut self) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Resetting { remaining } => {
                self.phase = if remaining > 1 {
                    Phase::Resetting {
                        remaining: remaining - 1,
                    }
                } else if self.settle_ticks > 0 {
                    Phase::Settling {
                        remaining: self.settle_ticks,
                    }
                } else {
                    Phase::Idle
                };
                true
            }
            Phase::Settling { remaining } => {
                self.phase = if remaining > 1 {
                    Phase::Settling {
                        remaining: remaining - 1,
                    }
                } else {
                    Phase::Idle
                };
                false
            }
        }
    }

    /// Whether the most recently applied set is in effect (reset window and
    /// settle interval both elapsed).
    pub fn settled(&self) -> bool {
        self.phase == Phase::Idle
    }
}

// ===========================================================================
// Tests
// ===========================================================================
