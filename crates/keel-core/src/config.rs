//! Growth policy for growable containers.

use crate::error::ConfigError;

/// Controls how a growable container picks its next capacity.
///
/// A full container with capacity zero jumps straight to
/// `initial_capacity`; any other full container multiplies its capacity by
/// `growth_factor`. Policies are plain values owned by each container, never
/// process-wide state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Capacity chosen when growing from zero.
    ///
    /// Default: 8. Must be at least 1.
    pub initial_capacity: usize,

    /// Multiplier applied to a non-zero capacity on growth.
    ///
    /// Default: 2. Must be at least 2.
    pub growth_factor: usize,
}

impl GrowthPolicy {
    /// Default capacity of the first allocation made by growth.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

    /// Default capacity multiplier.
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    /// The policy every container uses unless told otherwise.
    pub const DEFAULT: Self = Self {
        initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        growth_factor: Self::DEFAULT_GROWTH_FACTOR,
    };

    /// Create the default policy.
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Check the policy can always make progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroInitialCapacity);
        }
        if self.growth_factor < 2 {
            return Err(ConfigError::GrowthFactorTooSmall {
                factor: self.growth_factor,
            });
        }
        Ok(())
    }

    /// Capacity to grow to from a full buffer of `current` slots.
    ///
    /// Returns `None` if the multiplication overflows `usize`.
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        if current == 0 {
            Some(self.initial_capacity)
        } else {
            current.checked_mul(self.growth_factor)
        }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}
