//! # fixpid-sim — Closed-Loop Verification Harness
//!
//! Plant-feedback simulation around the [`fixpid_core`] PID pipeline engine:
//! the loop error (setpoint minus last output) is fed back into the engine
//! every tick, a moving window of real-valued error samples measures the
//! result, and coefficient sets are classified into dynamical regimes
//! (stable, underdamped, overdamped, unstable) against documented
//! thresholds.
//!
//! ```text
//!            ┌──────────────────────────────────────────┐
//!            │                ClosedLoop                │
//!            │                                          │
//! setpoint ──┼──►(−)──error──► PidPipeline ──► output ──┼──► window stats
//!            │    ▲                                │    │    (mean, RMS)
//!            │    └────────── last output ◄────────┘    │
//!            └──────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::pid_pipeline::PipelineConfig;
//! use fixpid_sim::closed_loop::{ClosedLoop, LoopConfig};
//! use fixpid_sim::scenario::GainSchedule;
//!
//! let mut sim = ClosedLoop::new(PipelineConfig::default(), LoopConfig::default()).unwrap();
//! let reports = GainSchedule::standard().run(&mut sim);
//! assert_eq!(reports.len(), 3);
//! ```

pub mod closed_loop;
pub mod logging;
pub mod regime;
pub mod scenario;

pub use closed_loop::{ClosedLoop, LoopConfig, LoopMeasurement};
pub use regime::{GainSet, Regime, RegimeThresholds};
pub use scenario::{GainSchedule, SetReport};
