use crate::kernel::{ConfigError, ExecInvariantViolation};

/// The fixed `(x_len, h_len)` pair a handle is sized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalShape {
    x_len: usize,
    h_len: usize,
}

impl SignalShape {
    /// Validate a signal/reference length pair.
    ///
    /// Both lengths must be non-zero and the reference may not be longer
    /// than the signal.
    pub fn try_new(x_len: usize, h_len: usize) -> Result<Self, ConfigError> {
        if x_len == 0 {
            return Err(ConfigError::EmptyInput { arg: "x_len" });
        }
        if h_len == 0 {
            return Err(ConfigError::EmptyInput { arg: "h_len" });
        }
        if h_len > x_len {
            return Err(ConfigError::InvalidArgument {
                arg: "h_len",
                reason: "reference must not be longer than the signal",
            });
        }
        Ok(Self { x_len, h_len })
    }

    /// Length of the long signal, and of every output.
    pub fn x_len(&self) -> usize {
        self.x_len
    }

    /// Length of the reference.
    pub fn h_len(&self) -> usize {
        self.h_len
    }

    /// Length of the full linear correlation, `x_len + h_len - 1`.
    pub fn full_len(&self) -> usize {
        // h_len <= x_len, so this only overflows for x_len > usize::MAX / 2.
        self.x_len.saturating_add(self.h_len - 1)
    }

    /// Smallest power of two holding the full linear correlation.
    pub fn padded_len(&self) -> Option<usize> {
        if self.x_len > usize::MAX / 2 {
            return None;
        }
        self.full_len().checked_next_power_of_two()
    }

    /// Smallest power of two at least `factor · h_len`.
    pub fn segment_len(&self, factor: usize) -> Option<usize> {
        if factor == 0 {
            return None;
        }
        self.h_len
            .checked_mul(factor)
            .and_then(usize::checked_next_power_of_two)
    }

    pub(crate) fn check(
        &self,
        x_len: usize,
        h_len: usize,
        out_len: usize,
    ) -> Result<(), ExecInvariantViolation> {
        let checks = [
            ("x", self.x_len, x_len),
            ("h", self.h_len, h_len),
            ("out", self.x_len, out_len),
        ];
        for (arg, expected, got) in checks {
            if expected != got {
                return Err(ExecInvariantViolation::LengthMismatch { arg, expected, got });
            }
        }
        Ok(())
    }
}
