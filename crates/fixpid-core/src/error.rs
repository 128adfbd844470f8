//! Construction-time error types.
//!
//! The engine has exactly one failure surface: validating a configuration.
//! Once a [`crate::pid_pipeline::PidPipeline`] is built, every operation is
//! total: out-of-range arithmetic saturates, it does not fail.

use thiserror::Error;

/// Result type for configuration and construction operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating width/radix parameters.
///
/// All variants are fatal at construction time; none can occur on the tick
/// path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Width outside the representable range of the backing store.
    #[error("width {width} is out of range: must be between 1 and 64 bits")]
    WidthRange { width: u32 },

    /// Data path width must pack into whole bytes.
    #[error("data width {width} must be a multiple of 8 bits")]
    DataWidthAlignment { width: u32 },

    /// Binary point position past the end of the word.
    #[error("radix {radix} exceeds width {width}")]
    RadixTooLarge { radix: u32, width: u32 },

    /// The integrator must be able to hold at least one full data sample.
    #[error("accumulator width {accumulator} is narrower than data width {data}")]
    AccumulatorTooNarrow { accumulator: u32, data: u32 },

    /// Scaled terms grow to data width + coefficient width bits.
    #[error("scaled term width {width} exceeds 64 bits; reduce data or coefficient width")]
    ScaledTermTooWide { width: u32 },

    /// A coefficient change must hold reset for at least one tick.
    #[error("reset window must be at least one tick")]
    EmptyResetWindow,
}
