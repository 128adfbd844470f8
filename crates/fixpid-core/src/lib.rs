//! # fixpid-core — Fixed-Point PID Pipeline Engine
//!
//! A streaming PID control engine that consumes error samples and produces
//! control outputs as fixed-point numbers with explicit width and radix,
//! structured the way the equivalent hardware datapath would be: a four-stage
//! saturating pipeline with one-cycle valid propagation, a retained
//! integrator, and a synchronous reset.
//!
//! ## Blocks
//!
//! - [`fixed`] — saturating Q-format arithmetic (`add`/`sub`/`mul`/`resize`)
//! - [`pipe_reg`] — the value + valid clocked register cell
//! - [`pid_pipeline`] — the four-stage engine itself
//! - [`gain_control`] — the reset-before-change coefficient protocol
//! - [`moving_stats`] — sliding-window mean / RMS deviation for measurement
//! - [`error`] — construction-time validation errors
//!
//! ## Signal flow
//!
//! ```text
//! error/valid ──► capture ──► integrate/difference ──► scale ──► sum ──► output/valid
//!                    ▲              │ accumulator        ▲
//!            kp ki kd pins          └─ (retained)        │
//!                    └───────────────── latch ───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::fixed::Fixed;
//! use fixpid_core::pid_pipeline::{PidPipeline, PipelineConfig, TickInput};
//!
//! let mut pid = PidPipeline::new(PipelineConfig::default()).unwrap();
//! pid.set_gains_f64(0.1, 0.03, 0.0);
//!
//! // Drive a constant error; the output goes valid after the pipeline fills.
//! let error = Fixed::from_f64(10.0, pid.data_format());
//! let mut last = pid.tick(TickInput { error, valid: true, reset: false });
//! for _ in 0..7 {
//!     last = pid.tick(TickInput { error, valid: true, reset: false });
//! }
//! assert!(last.valid);
//! assert!(last.value.to_f64() > 0.0);
//! ```

pub mod error;
pub mod fixed;
pub mod gain_control;
pub mod moving_stats;
pub mod pid_pipeline;
pub mod pipe_reg;

pub use error::{ConfigError, ConfigResult};
pub use fixed::{Fixed, FixedFormat};
pub use gain_control::GainController;
pub use moving_stats::MovingStats;
pub use pid_pipeline::{
    Coefficients, PidPipeline, PidTerms, PipelineConfig, TickInput, TickOutput, PIPELINE_DEPTH,
    WARMUP_TICKS,
};
pub use pipe_reg::PipeReg;
