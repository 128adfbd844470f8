//! # Closed-Loop Harness
//!
//! Drives a [`PidPipeline`] in plant feedback: each tick the error is the
//! setpoint minus the engine's last output, and the feedback path is
//! registered like everything else, so the error computed on one tick is the
//! engine's input sample (valid asserted) on the next. A moving window of
//! real-valued error samples measures how the loop is behaving. Coefficient
//! changes go through the [`GainController`] protocol, and the measurement
//! window is cleared the moment a new set comes into effect so statistics
//! never mix sets.
//!
//! The window works in the real (floating) domain for measurement only;
//! nothing from it is ever fed back into the engine's fixed-point
//! arithmetic. Optional Gaussian measurement noise can be injected into the
//! fed-back error (seeded, off by default) to exercise a set's margin.
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::pid_pipeline::PipelineConfig;
//! use fixpid_sim::closed_loop::{ClosedLoop, LoopConfig};
//! use fixpid_sim::regime::tracking_gains;
//!
//! let config = LoopConfig {
//!     settle_ticks: 50,
//!     ..Default::default()
//! };
//! let mut sim = ClosedLoop::new(PipelineConfig::default(), config).unwrap();
//! let m = sim.run_set(&tracking_gains(), 150);
//! // The loop is moving toward the setpoint, not away from it.
//! assert!(m.mean.abs() < 10.0);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fixpid_core::error::ConfigResult;
use fixpid_core::fixed::Fixed;
use fixpid_core::gain_control::GainController;
use fixpid_core::moving_stats::MovingStats;
use fixpid_core::pid_pipeline::{PidPipeline, PipelineConfig, TickInput};

use crate::regime::GainSet;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Closed-loop harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Target value the loop drives toward.
    pub setpoint: f64,
    /// Measurement window size in samples.
    pub window: usize,
    /// Reset hold length for coefficient changes.
    pub reset_ticks: u32,
    /// Settle interval after reset release before measuring.
    pub settle_ticks: u32,
    /// Standard deviation of injected measurement noise; 0.0 disables it.
    pub noise_std: f64,
    /// Seed for the noise generator, so runs are reproducible.
    pub seed: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            setpoint: 10.0,
            window: 100,
            reset_ticks: 8,
            settle_ticks: 550,
            noise_std: 0.0,
            seed: 7,
        }
    }
}

/// Window statistics for one measured coefficient set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopMeasurement {
    /// Mean error over the window.
    pub mean: f64,
    /// RMS deviation of the error around its mean.
    pub rms: f64,
}

// ---------------------------------------------------------------------------
// ClosedLoop
// ---------------------------------------------------------------------------

/// Plant-feedback simulation around a [`PidPipeline`].
#[derive(Debug)]
pub struct ClosedLoop {
    pipeline: PidPipeline,
    controller: GainController,
    stats: MovingStats,
    config: LoopConfig,
    noise: Option<Normal<f64>>,
    rng: StdRng,
    last_output: f64,
    /// The registered feedback error: computed on one tick, fed on the next.
    pending_error: f64,
    was_settled: bool,
    ticks: u64,
}

impl ClosedLoop {
    /// Build a harness around a freshly constructed engine.
    pub fn new(pipeline: PipelineConfig, config: LoopConfig) -> ConfigResult<Self> {
        let pipeline = PidPipeline::new(pipeline)?;
        let controller = GainController::new(config.reset_ticks, config.settle_ticks)?;
        let noise = if config.noise_std > 0.0 {
            Normal::new(0.0, config.noise_std).ok()
        } else {
            None
        };
        Ok(Self {
            pipeline,
            controller,
            stats: MovingStats::new(config.window),
            rng: StdRng::seed_from_u64(config.seed),
            noise,
            config,
            last_output: 0.0,
            pending_error: 0.0,
            was_settled: true,
            ticks: 0,
        })
    }

    /// The harness configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Start the coefficient-change protocol for a new gain set.
    pub fn apply_gains(&mut self, gains: &GainSet) {
        debug!(
            kp = gains.kp,
            ki = gains.ki,
            kd = gains.kd,
            tick = self.ticks,
            "applying coefficient set"
        );
        self.controller
            .apply(&mut self.pipeline, gains.kp, gains.ki, gains.kd);
    }

    /// Advance the loop by one tick.
    pub fn step(&mut self) {
        // The error computed from the current output becomes the engine's
        // input on the next tick; this tick consumes the one registered
        // last time.
        let mut computed = self.config.setpoint - self.last_output;
        if let Some(dist) = &self.noise {
            computed += dist.sample(&mut self.rng);
        }
        let fed = self.pending_error;
        self.pending_error = computed;

        let reset = self.controller.tick();
        let settled = self.controller.settled();
        if settled && !self.was_settled {
            // The set just came into effect: measure it on a clean window.
            self.stats.reset();
            debug!(tick = self.ticks, "coefficient set in effect");
        }
        self.was_settled = settled;

        let out = self.pipeline.tick(TickInput {
            error: Fixed::from_f64(fed, self.pipeline.data_format()),
            valid: true,
            reset,
        });
        self.last_output = out.value.to_f64();

        // The window records the sample the engine consumed this tick,
        // i.e. the previous tick's error.
        self.stats.push(fed);
        self.ticks += 1;
    }

    /// Advance the loop by `n` ticks.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Apply a gain set, wait out its reset and settle intervals, then run
    /// `measure_ticks` more and return the window statistics.
    pub fn run_set(&mut self, gains: &GainSet, measure_ticks: u64) -> LoopMeasurement {
        self.apply_gains(gains);
        while !self.controller.settled() {
            self.step();
        }
        self.run(measure_ticks);
        self.measurement()
    }

    /// Current window statistics.
    pub fn measurement(&self) -> LoopMeasurement {
        LoopMeasurement {
            mean: self.stats.mean(),
            rms: self.stats.rms_deviation(),
        }
    }

    /// Mean error over the current window.
    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    /// RMS deviation of the error over the current window.
    pub fn rms(&self) -> f64 {
        self.stats.rms_deviation()
    }

    /// Number of samples currently in the window.
    pub fn window_len(&self) -> usize {
        self.stats.len()
    }

    /// The engine's most recent output value.
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// Total ticks driven.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the most recent coefficient set is in effect.
    pub fn settled(&self) -> bool {
        self.controller.settled()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::tracking_gains;

    fn quick_config() -> LoopConfig {
        LoopConfig {
            settle_ticks: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_loop_moves_toward_setpoint() {
        let mut sim = ClosedLoop::new(PipelineConfig::default(), quick_config()).unwrap();
        sim.apply_gains(&tracking_gains());
        sim.run(150);
        let y = sim.last_output();
        assert!(y > 1.0, "output should have risen, got {y}");
        assert!(y < 20.0, "output should stay near the setpoint, got {y}");
    }

    #[test]
    fn test_window_cleared_when_set_takes_effect() {
        let config = LoopConfig {
            settle_ticks: 20,
            window: 10,
            ..Default::default()
        };
        let mut sim = ClosedLoop::new(PipelineConfig::default(), config).unwrap();
        sim.apply_gains(&tracking_gains());
        while !sim.settled() {
            sim.step();
        }
        // The settling step itself contributes the first in-effect sample.
        assert_eq!(sim.window_len(), 1);
        sim.run(5);
        assert_eq!(sim.window_len(), 6);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = LoopConfig {
            settle_ticks: 30,
            noise_std: 0.5,
            seed: 42,
            ..Default::default()
        };
        let mut a = ClosedLoop::new(PipelineConfig::default(), config.clone()).unwrap();
        let mut b = ClosedLoop::new(PipelineConfig::default(), config).unwrap();
        let ma = a.run_set(&tracking_gains(), 120);
        let mb = b.run_set(&tracking_gains(), 120);
        assert_eq!(ma, mb);
    }

    #[test]
    fn test_measurement_before_any_samples_is_zero() {
        let sim = ClosedLoop::new(PipelineConfig::default(), quick_config()).unwrap();
        let m = sim.measurement();
        assert_eq!(m.mean, 0.0);
        assert_eq!(m.rms, 0.0);
    }
}
