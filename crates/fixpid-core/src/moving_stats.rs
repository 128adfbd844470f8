//! # Moving Window Statistics
//!
//! Sliding-window mean and RMS deviation over the most recent N samples,
//! used by the closed-loop harness to measure steady-state error and
//! dispersion. Uses an incremental update (add the new sample, subtract the
//! evicted one) so a push is O(1) regardless of window size.
//!
//! The RMS here is the root-mean-square *deviation from the window mean*,
//! i.e. the population standard deviation of the window, which is the
//! dispersion statistic used to classify control-loop stability.
//!
//! ## Example
//!
//! ```rust
//! use fixpid_core::moving_stats::MovingStats;
//!
//! let mut stats = MovingStats::new(4);
//! for &x in &[2.0, 2.0, 2.0, 2.0] {
//!     stats.push(x);
//! }
//! assert_eq!(stats.mean(), 2.0);
//! assert_eq!(stats.rms_deviation(), 0.0);
//! ```

use std::collections::VecDeque;

/// Sliding-window mean / RMS-deviation estimator.
#[derive(Debug, Clone)]
pub struct MovingStats {
    /// Window size.
    window_size: usize,
    /// Sample buffer.
    buffer: VecDeque<f64>,
    /// Running sum of the window.
    sum: f64,
    /// Running sum of squared samples.
    sum_sq: f64,
    /// Total samples pushed since construction or reset.
    count: u64,
}

impl MovingStats {
    /// Create an estimator over the given window size (minimum 1).
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
        }
    }

    /// Push a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, sample: f64) {
        self.sum += sample;
        self.sum_sq += sample * sample;
        self.buffer.push_back(sample);
        self.count += 1;

        if self.buffer.len() > self.window_size {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
            // Clamp accumulated floating-point drift.
            if self.sum_sq < 0.0 {
                self.sum_sq = 0.0;
            }
        }
    }

    /// Mean of the current window (0.0 when empty).
    pub fn mean(&self) -> f64 {
        let n = self.buffer.len();
        if n == 0 {
            return 0.0;
        }
        self.sum / n as f64
    }

    /// Root-mean-square deviation around the window mean (0.0 when empty).
    pub fn rms_deviation(&self) -> f64 {
        let n = self.buffer.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.sum / n as f64;
        let variance = (self.sum_sq / n as f64) - mean * mean;
        variance.max(0.0).sqrt()
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True if no samples have been pushed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the window has filled to its configured size.
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.window_size
    }

    /// Configured window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Total samples pushed since construction or the last reset.
    pub fn samples_pushed(&self) -> u64 {
        self.count
    }

    /// Drop all samples and running sums.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
        self.sum_sq = 0.0;
        self.count = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_empty() {
        let stats = MovingStats::new(10);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.rms_deviation(), 0.0);
        assert!(stats.is_empty());
        assert!(!stats.is_full());
    }

    #[test]
    fn test_known_window() {
        let mut stats = MovingStats::new(4);
        for &x in &[1.0, 2.0, 3.0, 4.0] {
            stats.push(x);
        }
        assert!((stats.mean() - 2.5).abs() < EPS);
        // Population variance of [1,2,3,4] is 1.25.
        assert!((stats.rms_deviation() - 1.25f64.sqrt()).abs() < EPS);
        assert!(stats.is_full());
    }

    #[test]
    fn test_eviction() {
        let mut stats = MovingStats::new(3);
        for &x in &[10.0, 1.0, 2.0, 3.0] {
            stats.push(x);
        }
        // Window is now [1, 2, 3]; the 10.0 has been evicted.
        assert_eq!(stats.len(), 3);
        assert!((stats.mean() - 2.0).abs() < EPS);
        let expected = (2.0f64 / 3.0).sqrt();
        assert!((stats.rms_deviation() - expected).abs() < EPS);
    }

    #[test]
    fn test_constant_signal_has_zero_deviation() {
        let mut stats = MovingStats::new(100);
        for _ in 0..250 {
            stats.push(7.5);
        }
        assert!((stats.mean() - 7.5).abs() < EPS);
        assert!(stats.rms_deviation() < 1e-9);
        assert_eq!(stats.samples_pushed(), 250);
    }

    #[test]
    fn test_reset() {
        let mut stats = MovingStats::new(4);
        stats.push(5.0);
        stats.push(6.0);
        stats.reset();
        assert!(stats.is_empty());
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.samples_pushed(), 0);
    }
}
