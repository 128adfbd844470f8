//! # Fixed-Point Sample Arithmetic
//!
//! Signed Q-format numbers with explicit width and radix, and the saturating
//! operations used throughout the PID pipeline: `add`, `sub`, `mul`, `resize`.
//!
//! A [`Fixed`] value represents `raw / 2^radix` in `width` total bits of
//! two's complement. Every operation follows the same discipline:
//!
//! 1. compute at full precision (128-bit intermediates, no truncation);
//! 2. align both operands to the larger of the two radices;
//! 3. shift the result to the target radix, truncating toward negative
//!    infinity (arithmetic shift, no rounding);
//! 4. clamp to the min/max of the target width (saturation, never wrap).
//!
//! Values carry their own format metadata, so there is no ambient width or
//! radix context to get wrong; formats are validated once at construction.
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::fixed::{Fixed, FixedFormat};
//!
//! let q10 = FixedFormat::new(24, 10).unwrap();
//! let a = Fixed::from_f64(1.5, q10);
//! let b = Fixed::from_f64(0.25, q10);
//!
//! let sum = a.add(b, q10);
//! assert_eq!(sum.to_f64(), 1.75);
//!
//! // An 8-bit integer target saturates instead of wrapping.
//! let narrow = FixedFormat::new(8, 0).unwrap();
//! let big = Fixed::from_f64(1000.0, q10);
//! assert_eq!(big.resize(narrow).raw(), 127);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Widest representable word; the backing store is `i64`.
pub const MAX_WIDTH: u32 = 64;

// ---------------------------------------------------------------------------
// FixedFormat
// ---------------------------------------------------------------------------

/// Q-format descriptor: total width in bits and binary point position.
///
/// A `(width, radix)` format holds values `v / 2^radix` for raw integers `v`
/// in `[-2^(width-1), 2^(width-1) - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFormat {
    width: u32,
    radix: u32,
}

impl FixedFormat {
    /// Create a format, validating `1 <= width <= 64` and `radix <= width`.
    pub fn new(width: u32, radix: u32) -> ConfigResult<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(ConfigError::WidthRange { width });
        }
        if radix > width {
            return Err(ConfigError::RadixTooLarge { radix, width });
        }
        Ok(Self { width, radix })
    }

    /// Total width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Binary point position (fractional bits).
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Largest representable raw value: `2^(width-1) - 1`.
    pub fn max_raw(&self) -> i64 {
        ((1i128 << (self.width - 1)) - 1) as i64
    }

    /// Smallest representable raw value: `-2^(width-1)`.
    pub fn min_raw(&self) -> i64 {
        if self.width == MAX_WIDTH {
            i64::MIN
        } else {
            -(1i64 << (self.width - 1))
        }
    }

    /// Value of one least-significant bit: `2^-radix`.
    pub fn lsb(&self) -> f64 {
        2f64.powi(-(self.radix as i32))
    }
}

// ---------------------------------------------------------------------------
// Fixed
// ---------------------------------------------------------------------------

/// A fixed-point sample: a raw two's-complement integer plus its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    raw: i64,
    format: FixedFormat,
}

impl Fixed {
    /// The zero value in the given format.
    pub fn zero(format: FixedFormat) -> Self {
        Self { raw: 0, format }
    }

    /// Build from a raw integer, saturating into the format's width.
    pub fn from_raw(raw: i64, format: FixedFormat) -> Self {
        Self {
            raw: clamp_width(raw as i128, format),
            format,
        }
    }

    /// Convert from a real value, rounding to the nearest representable
    /// sample and saturating at the format's range. Non-finite inputs clamp
    /// (NaN maps to zero).
    pub fn from_f64(value: f64, format: FixedFormat) -> Self {
        if value.is_nan() {
            return Self::zero(format);
        }
        let scaled = (value * 2f64.powi(format.radix as i32)).round();
        let raw = if scaled >= format.max_raw() as f64 {
            format.max_raw()
        } else if scaled <= format.min_raw() as f64 {
            format.min_raw()
        } else {
            scaled as i64
        };
        Self { raw, format }
    }

    /// Convert to a real value: `raw / 2^radix`.
    pub fn to_f64(&self) -> f64 {
        self.raw as f64 * self.format.lsb()
    }

    /// The raw two's-complement integer.
    pub fn raw(&self) -> i64 {
        self.raw
    }

    /// The value's format.
    pub fn format(&self) -> FixedFormat {
        self.format
    }

    /// Move to a new width/radix: arithmetic shift to the target radix,
    /// then saturate to the target width.
    pub fn resize(&self, target: FixedFormat) -> Fixed {
        let aligned = shift_radix(self.raw as i128, self.format.radix, target.radix);
        Fixed {
            raw: clamp_width(aligned, target),
            format: target,
        }
    }

    /// Saturating addition into `target`.
    ///
    /// Operands are aligned to the larger of the two radices before the sum;
    /// the full-precision result is then shifted to the target radix and
    /// clamped to the target width.
    pub fn add(&self, other: Fixed, target: FixedFormat) -> Fixed {
        self.add_sub(other, target, false)
    }

    /// Saturating subtraction (`self - other`) into `target`.
    pub fn sub(&self, other: Fixed, target: FixedFormat) -> Fixed {
        self.add_sub(other, target, true)
    }

    fn add_sub(&self, other: Fixed, target: FixedFormat, negate: bool) -> Fixed {
        let radix = self.format.radix.max(other.format.radix);
        let a = shift_radix(self.raw as i128, self.format.radix, radix);
        let b = shift_radix(other.raw as i128, other.format.radix, radix);
        let full = if negate {
            a.saturating_sub(b)
        } else {
            a.saturating_add(b)
        };
        let aligned = shift_radix(full, radix, target.radix);
        Fixed {
            raw: clamp_width(aligned, target),
            format: target,
        }
    }

    /// Saturating multiplication into `target`.
    ///
    /// The exact double-width product (operand widths compound, operand
    /// radices sum) is formed first, so no intermediate precision is lost
    /// before the final resize and clamp.
    pub fn mul(&self, other: Fixed, target: FixedFormat) -> Fixed {
        let product = self.raw as i128 * other.raw as i128;
        let aligned = shift_radix(product, self.format.radix + other.format.radix, target.radix);
        Fixed {
            raw: clamp_width(aligned, target),
            format: target,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Shift a full-precision value from one radix to another.
///
/// Right shifts are arithmetic (truncation toward negative infinity); left
/// shifts saturate on overflow so the final width clamp sees the correct
/// sign.
fn shift_radix(value: i128, from: u32, to: u32) -> i128 {
    if value == 0 || from == to {
        return value;
    }
    if to > from {
        let shift = to - from;
        if shift >= 127 {
            return if value < 0 { i128::MIN } else { i128::MAX };
        }
        match value.checked_mul(1i128 << shift) {
            Some(v) => v,
            None => {
                if value < 0 {
                    i128::MIN
                } else {
                    i128::MAX
                }
            }
        }
    } else {
        let shift = from - to;
        if shift >= 127 {
            return if value < 0 { -1 } else { 0 };
        }
        value >> shift
    }
}

/// Clamp a full-precision value to the representable range of a format.
fn clamp_width(value: i128, format: FixedFormat) -> i64 {
    let min = format.min_raw() as i128;
    let max = format.max_raw() as i128;
    value.clamp(min, max) as i64
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(width: u32, radix: u32) -> FixedFormat {
        FixedFormat::new(width, radix).unwrap()
    }

    #[test]
    fn test_format_validation() {
        assert!(FixedFormat::new(24, 10).is_ok());
        assert!(FixedFormat::new(64, 64).is_ok());
        assert_eq!(
            FixedFormat::new(0, 0),
            Err(ConfigError::WidthRange { width: 0 })
        );
        assert_eq!(
            FixedFormat::new(65, 0),
            Err(ConfigError::WidthRange { width: 65 })
        );
        assert_eq!(
            FixedFormat::new(8, 9),
            Err(ConfigError::RadixTooLarge { radix: 9, width: 8 })
        );
    }

    #[test]
    fn test_format_range() {
        let f = fmt(8, 0);
        assert_eq!(f.max_raw(), 127);
        assert_eq!(f.min_raw(), -128);

        let f = fmt(64, 0);
        assert_eq!(f.max_raw(), i64::MAX);
        assert_eq!(f.min_raw(), i64::MIN);
    }

    #[test]
    fn test_f64_round_trip() {
        let f = fmt(24, 10);
        let x = Fixed::from_f64(1.5, f);
        assert_eq!(x.raw(), 1536); // 1.5 * 1024
        assert_eq!(x.to_f64(), 1.5);

        let neg = Fixed::from_f64(-0.25, f);
        assert_eq!(neg.raw(), -256);
        assert_eq!(neg.to_f64(), -0.25);
    }

    #[test]
    fn test_from_f64_saturates() {
        let f = fmt(8, 0);
        assert_eq!(Fixed::from_f64(1e9, f).raw(), 127);
        assert_eq!(Fixed::from_f64(-1e9, f).raw(), -128);
        assert_eq!(Fixed::from_f64(f64::INFINITY, f).raw(), 127);
        assert_eq!(Fixed::from_f64(f64::NAN, f).raw(), 0);
    }

    #[test]
    fn test_add_same_radix() {
        let f = fmt(24, 10);
        let a = Fixed::from_f64(1.5, f);
        let b = Fixed::from_f64(2.25, f);
        assert_eq!(a.add(b, f).to_f64(), 3.75);
        assert_eq!(a.sub(b, f).to_f64(), -0.75);
    }

    #[test]
    fn test_add_aligns_radices() {
        // 1.5 in (16,8) plus 1.25 in (16,4): alignment to radix 8.
        let a = Fixed::from_f64(1.5, fmt(16, 8));
        let b = Fixed::from_f64(1.25, fmt(16, 4));
        let out = a.add(b, fmt(16, 8));
        assert_eq!(out.to_f64(), 2.75);
    }

    #[test]
    fn test_add_saturates() {
        let f = fmt(8, 0);
        let a = Fixed::from_raw(100, f);
        let b = Fixed::from_raw(100, f);
        assert_eq!(a.add(b, f).raw(), 127);
        let neg = Fixed::from_raw(-100, f);
        assert_eq!(neg.add(neg, f).raw(), -128);
    }

    #[test]
    fn test_sub_saturates() {
        let f = fmt(8, 0);
        let a = Fixed::from_raw(-100, f);
        let b = Fixed::from_raw(100, f);
        assert_eq!(a.sub(b, f).raw(), -128);
    }

    #[test]
    fn test_mul_exact_product() {
        let f = fmt(24, 10);
        let a = Fixed::from_f64(1.5, f);
        let b = Fixed::from_f64(0.5, f);
        // Full-precision product lands exactly in a (48, 20) target.
        let wide = fmt(48, 20);
        let p = a.mul(b, wide);
        assert_eq!(p.raw(), 1536 * 512);
        assert_eq!(p.to_f64(), 0.75);
        // And survives the resize back to the data format.
        assert_eq!(p.resize(f).to_f64(), 0.75);
    }

    #[test]
    fn test_mul_saturates() {
        let f = fmt(8, 0);
        let a = Fixed::from_raw(100, f);
        let b = Fixed::from_raw(100, f);
        // 10000 does not fit in 8 bits.
        assert_eq!(a.mul(b, f).raw(), 127);
        assert_eq!(a.mul(Fixed::from_raw(-100, f), f).raw(), -128);
    }

    #[test]
    fn test_resize_truncates_toward_negative_infinity() {
        // -1 raw at radix 2 is -0.25; dropping all fraction bits floors to -1.
        let src = fmt(16, 2);
        let dst = fmt(16, 0);
        assert_eq!(Fixed::from_raw(-1, src).resize(dst).raw(), -1);
        assert_eq!(Fixed::from_raw(1, src).resize(dst).raw(), 0);
        assert_eq!(Fixed::from_raw(-5, src).resize(dst).raw(), -2); // -1.25 -> -2
        assert_eq!(Fixed::from_raw(5, src).resize(dst).raw(), 1); // 1.25 -> 1
    }

    #[test]
    fn test_resize_widens_radix() {
        let src = fmt(16, 0);
        let dst = fmt(32, 8);
        assert_eq!(Fixed::from_raw(3, src).resize(dst).raw(), 3 << 8);
    }

    #[test]
    fn test_saturation_law_over_grid() {
        // Every result of every op lies inside the declared target range.
        let formats = [fmt(8, 0), fmt(8, 4), fmt(16, 8), fmt(24, 10)];
        let raws = [i64::from(i8::MIN), -100, -1, 0, 1, 100, i64::from(i8::MAX)];
        for &fa in &formats {
            for &fb in &formats {
                for &ft in &formats {
                    for &ra in &raws {
                        for &rb in &raws {
                            let a = Fixed::from_raw(ra, fa);
                            let b = Fixed::from_raw(rb, fb);
                            for out in [
                                a.add(b, ft),
                                a.sub(b, ft),
                                a.mul(b, ft),
                                a.resize(ft),
                            ] {
                                assert!(
                                    out.raw() >= ft.min_raw() && out.raw() <= ft.max_raw(),
                                    "result {} escapes ({}, {})",
                                    out.raw(),
                                    ft.width(),
                                    ft.radix()
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_full_width_format() {
        let f = fmt(64, 32);
        let a = Fixed::from_raw(i64::MAX, f);
        let b = Fixed::from_raw(i64::MAX, f);
        assert_eq!(a.add(b, f).raw(), i64::MAX);
        let n = Fixed::from_raw(i64::MIN, f);
        assert_eq!(n.add(n, f).raw(), i64::MIN);
    }
}
