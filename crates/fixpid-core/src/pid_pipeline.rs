//! # Fixed-Point PID Pipeline Engine
//!
//! A streaming PID controller built as a four-stage synchronous pipeline over
//! saturating Q-format arithmetic, the way the equivalent datapath would be
//! laid out in FPGA fabric:
//!
//! ```text
//!          ┌─────────┐   ┌─────────────┐   ┌─────────┐   ┌───────┐
//! error ──►│ capture │──►│ integrate / │──►│  scale  │──►│  sum  │──► output
//! valid ──►│         │   │ difference  │   │ kp ki kd│   │ P+D+I │──► valid
//!          └─────────┘   └─────────────┘   └─────────┘   └───────┘
//!                              │ accumulator (retained) │
//! ```
//!
//! Every tick advances all stage registers together: current state is
//! snapshotted, every next value is computed from the snapshot only, and all
//! registers commit simultaneously. Valid flags propagate one stage per tick,
//! so a sample presented on one tick is on the output wire four clock edges
//! later; the very first sample pair of a stream needs one extra warm-up tick
//! before the difference term has a pair to work with.
//!
//! Coefficients are sampled from the input pins every tick; there is no
//! commit strobe. Changing them mid-stream mixes old and new gains across the
//! in-flight stages, so [`crate::gain_control::GainController`] wraps every
//! change in the reset window that makes it safe.
//!
//! There is no backpressure or ready signal in the streaming contract: the
//! consumer must accept one output per tick. Known limitation, inherited
//! from the hardware design.
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::fixed::Fixed;
//! use fixpid_core::pid_pipeline::{PidPipeline, PipelineConfig, TickInput};
//!
//! let mut pid = PidPipeline::new(PipelineConfig::default()).unwrap();
//! pid.set_gains_f64(1.0, 0.0, 0.0); // pure proportional, unity gain
//!
//! let error = Fixed::from_f64(1.0, pid.data_format());
//! let mut outputs = Vec::new();
//! for _ in 0..5 {
//!     outputs.push(pid.tick(TickInput {
//!         error,
//!         valid: true,
//!         reset: false,
//!     }));
//! }
//! // Four pipeline stages plus one warm-up tick before the first result.
//! assert!(outputs[..4].iter().all(|o| !o.valid));
//! assert!(outputs[4].valid);
//! assert_eq!(outputs[4].value.to_f64(), 1.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::fixed::{Fixed, FixedFormat, MAX_WIDTH};
use crate::pipe_reg::PipeReg;

/// Number of pipeline stages between input and output.
pub const PIPELINE_DEPTH: usize = 4;

/// Extra ticks before the first output of a fresh stream, spent waiting for
/// the second sample of the derivative pair.
pub const WARMUP_TICKS: usize = 1;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Immutable width/radix configuration, validated once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Data path width in bits; must be a whole number of bytes.
    pub data_width: u32,
    /// Data path fractional bits.
    pub data_radix: u32,
    /// Coefficient width in bits.
    pub coeff_width: u32,
    /// Coefficient fractional bits.
    pub coeff_radix: u32,
    /// Integrator width in bits; at least `data_width`.
    pub accumulator_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_width: 24,
            data_radix: 10,
            coeff_width: 24,
            coeff_radix: 10,
            accumulator_width: 32,
        }
    }
}

/// Signal formats derived from a validated [`PipelineConfig`].
#[derive(Debug, Clone, Copy)]
struct Formats {
    /// Error and output samples.
    data: FixedFormat,
    /// kp / ki / kd.
    coeff: FixedFormat,
    /// Running integral, data radix at integrator width.
    accumulator: FixedFormat,
    /// Post-multiply terms: widths compound, radices sum.
    scaled: FixedFormat,
    /// One bit of headroom for the partial sum of two scaled terms.
    wide: FixedFormat,
}

impl PipelineConfig {
    fn formats(&self) -> ConfigResult<Formats> {
        if self.data_width == 0 || self.data_width % 8 != 0 {
            return Err(ConfigError::DataWidthAlignment {
                width: self.data_width,
            });
        }
        let data = FixedFormat::new(self.data_width, self.data_radix)?;
        let coeff = FixedFormat::new(self.coeff_width, self.coeff_radix)?;
        if self.accumulator_width < self.data_width {
            return Err(ConfigError::AccumulatorTooNarrow {
                accumulator: self.accumulator_width,
                data: self.data_width,
            });
        }
        let accumulator = FixedFormat::new(self.accumulator_width, self.data_radix)?;
        let scaled_width = self.data_width + self.coeff_width;
        if scaled_width > MAX_WIDTH {
            return Err(ConfigError::ScaledTermTooWide {
                width: scaled_width,
            });
        }
        let scaled = FixedFormat::new(scaled_width, self.data_radix + self.coeff_radix)?;
        let wide = FixedFormat::new(
            (scaled_width + 1).min(MAX_WIDTH),
            self.data_radix + self.coeff_radix,
        )?;
        Ok(Formats {
            data,
            coeff,
            accumulator,
            scaled,
            wide,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The kp/ki/kd coefficient set, in the coefficient format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficients {
    pub kp: Fixed,
    pub ki: Fixed,
    pub kd: Fixed,
}

impl Coefficients {
    /// All-zero coefficients in the given format.
    pub fn zero(format: FixedFormat) -> Self {
        Self {
            kp: Fixed::zero(format),
            ki: Fixed::zero(format),
            kd: Fixed::zero(format),
        }
    }
}

/// The proportional, integral, and derivative terms of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidTerms {
    pub p: Fixed,
    pub i: Fixed,
    pub d: Fixed,
}

impl PidTerms {
    fn zero(p_fmt: FixedFormat, i_fmt: FixedFormat, d_fmt: FixedFormat) -> Self {
        Self {
            p: Fixed::zero(p_fmt),
            i: Fixed::zero(i_fmt),
            d: Fixed::zero(d_fmt),
        }
    }
}

/// Per-tick input: one error sample with its valid flag, plus the reset line.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// The error sample; resized (saturating) into the data format on capture.
    pub error: Fixed,
    /// Whether `error` carries a sample this tick.
    pub valid: bool,
    /// Synchronous, level-sensitive reset; takes priority over everything.
    pub reset: bool,
}

/// Per-tick output: the control value in the data format with its valid flag.
///
/// When the pipeline holds no valid content (warm-up, gaps, reset) the value
/// is zero and the flag is down.
#[derive(Debug, Clone, Copy)]
pub struct TickOutput {
    pub value: Fixed,
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// PidPipeline
// ---------------------------------------------------------------------------

/// The four-stage fixed-point PID engine.
#[derive(Debug, Clone)]
pub struct PidPipeline {
    config: PipelineConfig,
    fmt: Formats,

    /// Coefficient input pins, sampled every tick.
    gains: Coefficients,

    // Stage 0: capture.
    k_latch: Coefficients,
    s0: PipeReg<Fixed>,
    prev_err: Fixed,
    seen: bool,
    /// Validity of the capture register one tick ago; with `s0`'s own flag
    /// this forms the warm-up condition for the difference pair.
    s0_valid_d: bool,

    // Stage 1: integrate / difference.
    acc: Fixed,
    s1: PipeReg<PidTerms>,

    // Stage 2: coefficient multiplies.
    s2: PipeReg<PidTerms>,

    // Stage 3: saturating sum.
    s3: PipeReg<Fixed>,
}

impl PidPipeline {
    /// Build an engine from a validated configuration.
    ///
    /// All registers start zero/invalid; coefficients start at zero.
    pub fn new(config: PipelineConfig) -> ConfigResult<Self> {
        let fmt = config.formats()?;
        Ok(Self {
            config,
            fmt,
            gains: Coefficients::zero(fmt.coeff),
            k_latch: Coefficients::zero(fmt.coeff),
            s0: PipeReg::invalid(Fixed::zero(fmt.data)),
            prev_err: Fixed::zero(fmt.data),
            seen: false,
            s0_valid_d: false,
            acc: Fixed::zero(fmt.accumulator),
            s1: PipeReg::invalid(PidTerms::zero(fmt.data, fmt.accumulator, fmt.data)),
            s2: PipeReg::invalid(PidTerms::zero(fmt.scaled, fmt.scaled, fmt.scaled)),
            s3: PipeReg::invalid(Fixed::zero(fmt.data)),
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Format of error and output samples.
    pub fn data_format(&self) -> FixedFormat {
        self.fmt.data
    }

    /// Format of the kp/ki/kd coefficients.
    pub fn coeff_format(&self) -> FixedFormat {
        self.fmt.coeff
    }

    /// Format of the integrator.
    pub fn accumulator_format(&self) -> FixedFormat {
        self.fmt.accumulator
    }

    // -- Coefficient pins ---------------------------------------------------

    /// Drive the coefficient pins. Each value is resized (saturating) into
    /// the coefficient format. The latch samples the pins on the next tick;
    /// there is no commit strobe.
    pub fn set_gains(&mut self, kp: Fixed, ki: Fixed, kd: Fixed) {
        self.gains = Coefficients {
            kp: kp.resize(self.fmt.coeff),
            ki: ki.resize(self.fmt.coeff),
            kd: kd.resize(self.fmt.coeff),
        };
    }

    /// Drive the coefficient pins from real values.
    pub fn set_gains_f64(&mut self, kp: f64, ki: f64, kd: f64) {
        self.gains = Coefficients {
            kp: Fixed::from_f64(kp, self.fmt.coeff),
            ki: Fixed::from_f64(ki, self.fmt.coeff),
            kd: Fixed::from_f64(kd, self.fmt.coeff),
        };
    }

    /// Current value of the coefficient pins.
    pub fn gains(&self) -> Coefficients {
        self.gains
    }

    // -- Tick ---------------------------------------------------------------

    /// Advance the pipeline by one clock tick.
    ///
    /// The returned output is the freshly committed stage-3 register, i.e.
    /// what a consumer sees on the wire during the following cycle.
    pub fn tick(&mut self, input: TickInput) -> TickOutput {
        if input.reset {
            self.clear_registers();
            return self.output();
        }

        let f = self.fmt;

        // Snapshot every register; all next values derive from this snapshot
        // only, never from a register already updated this tick.
        let s0 = self.s0;
        let prev_err = self.prev_err;
        let seen = self.seen;
        let s0_valid_d = self.s0_valid_d;
        let acc = self.acc;
        let s1 = self.s1;
        let s2 = self.s2;
        let k = self.k_latch;

        // Stage 3: sum the scaled terms. P+D first, then I; both partial
        // sums share the same saturation/resize discipline.
        let s3_next = if s2.is_valid() {
            let t = s2.value();
            let pd = t.p.add(t.d, f.wide);
            PipeReg::valid(pd.add(t.i, f.data))
        } else {
            PipeReg::invalid(Fixed::zero(f.data))
        };

        // Stage 2: scale by the latched coefficients.
        let s1_terms = s1.value();
        let s2_next = PipeReg::new(
            PidTerms {
                p: s1_terms.p.mul(k.kp, f.scaled),
                i: s1_terms.i.mul(k.ki, f.scaled),
                d: s1_terms.d.mul(k.kd, f.scaled),
            },
            s1.is_valid(),
        );

        // Stage 1: integrate and difference. The integral term is the
        // post-update accumulator value; the accumulator itself commits a
        // captured sample exactly once (the tick its capture is valid) and
        // is retained untouched across invalid captures.
        let integral = acc.add(s0.value(), f.accumulator);
        let s1_next = PipeReg::new(
            PidTerms {
                p: s0.value().resize(f.data),
                i: integral,
                d: s0.value().sub(prev_err, f.data),
            },
            s0.is_valid() && s0_valid_d,
        );
        let acc_next = if s0.is_valid() { integral } else { acc };

        // Stage 0: capture. The first-ever sample also becomes its own
        // "previous", so the first difference is zero.
        let (s0_next, prev_err_next, seen_next) = if input.valid {
            let captured = input.error.resize(f.data);
            let previous = if seen { s0.value() } else { captured };
            (PipeReg::valid(captured), previous, true)
        } else {
            (PipeReg::invalid(s0.value()), prev_err, seen)
        };

        // Commit all registers simultaneously.
        self.k_latch = self.gains;
        self.s0 = s0_next;
        self.prev_err = prev_err_next;
        self.seen = seen_next;
        self.s0_valid_d = s0.is_valid();
        self.acc = acc_next;
        self.s1 = s1_next;
        self.s2 = s2_next;
        self.s3 = s3_next;

        self.output()
    }

    /// The observable output: mirrors the stage-3 registers.
    pub fn output(&self) -> TickOutput {
        TickOutput {
            value: self.s3.value(),
            valid: self.s3.is_valid(),
        }
    }

    // -- Introspection ------------------------------------------------------

    /// The running integral register.
    pub fn accumulator(&self) -> Fixed {
        self.acc
    }

    /// The stage-1 proportional term register.
    pub fn proportional(&self) -> Fixed {
        self.s1.value().p
    }

    /// The stage-1 integral term register.
    pub fn integral(&self) -> Fixed {
        self.s1.value().i
    }

    /// The stage-1 derivative term register.
    pub fn derivative(&self) -> Fixed {
        self.s1.value().d
    }

    // -- Reset --------------------------------------------------------------

    /// Synchronous clear of every register, including the accumulator, the
    /// sample-history flag, and the coefficient latch. The coefficient pins
    /// are wires, not registers; the latch re-acquires them on the first
    /// tick after release.
    fn clear_registers(&mut self) {
        let f = self.fmt;
        self.k_latch = Coefficients::zero(f.coeff);
        self.s0.clear(Fixed::zero(f.data));
        self.prev_err = Fixed::zero(f.data);
        self.seen = false;
        self.s0_valid_d = false;
        self.acc = Fixed::zero(f.accumulator);
        self.s1
            .clear(PidTerms::zero(f.data, f.accumulator, f.data));
        self.s2.clear(PidTerms::zero(f.scaled, f.scaled, f.scaled));
        self.s3.clear(Fixed::zero(f.data));
    }
}

// ===========================================================================
// Tests
// ===========================================================================
