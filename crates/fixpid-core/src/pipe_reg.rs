//! Pipeline Register Cell
//!
//! A clocked value-plus-valid storage element with synchronous clear, the
//! building block of the PID pipeline stages. The register itself is dumb
//! storage; the tick driver owns the snapshot/commit discipline that makes
//! all registers advance together.

/// A pipeline register: a value and a valid flag that travel together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeReg<T> {
    value: T,
    valid: bool,
}

impl<T: Copy> PipeReg<T> {
    /// A register holding `value` with the valid flag set.
    pub fn valid(value: T) -> Self {
        Self { value, valid: true }
    }

    /// A register holding `value` with the valid flag cleared.
    pub fn invalid(value: T) -> Self {
        Self {
            value,
            valid: false,
        }
    }

    /// Build with an explicit valid flag.
    pub fn new(value: T, valid: bool) -> Self {
        Self { value, valid }
    }

    /// Load a new value and valid flag (one clock edge).
    pub fn load(&mut self, value: T, valid: bool) {
        self.value = value;
        self.valid = valid;
    }

    /// Synchronous clear: reset value, valid flag dropped.
    pub fn clear(&mut self, reset_value: T) {
        self.value = reset_value;
        self.valid = false;
    }

    /// The stored value.
    pub fn value(&self) -> T {
        self.value
    }

    /// Whether the stored value is valid.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let r = PipeReg::invalid(0i64);
        assert!(!r.is_valid());
        assert_eq!(r.value(), 0);
    }

    #[test]
    fn test_load_and_clear() {
        let mut r = PipeReg::invalid(0i64);
        r.load(42, true);
        assert!(r.is_valid());
        assert_eq!(r.value(), 42);

        r.clear(0);
        assert!(!r.is_valid());
        assert_eq!(r.value(), 0);
    }

    #[test]
    fn test_load_invalid_keeps_value() {
        let mut r = PipeReg::invalid(0i64);
        r.load(7, false);
        assert!(!r.is_valid());
        assert_eq!(r.value(), 7);
    }
}
