//! Error types for the keel memory primitives.
//!
//! Split by channel: [`OutOfRange`] is the one checked-access error a caller
//! is expected to handle, while [`AllocError`] travels unchanged from an
//! [`AllocStrategy`](crate::alloc::AllocStrategy) up through whichever
//! operation asked for memory. [`ConfigError`] rejects malformed growth
//! policies at construction time.

use std::error::Error;
use std::fmt;

/// A checked index was not below the current length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    /// The index that was requested.
    pub index: usize,
    /// The length of the sequence at the time of the request.
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index {} out of range for sequence of length {}",
            self.index, self.len
        )
    }
}

impl Error for OutOfRange {}

/// Errors reported by an allocation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested slot count cannot be expressed as a valid layout
    /// (byte size would exceed `isize::MAX`).
    CapacityOverflow {
        /// Number of slots requested.
        requested: usize,
        /// Size of one slot in bytes.
        elem_size: usize,
    },
    /// The underlying allocator could not satisfy the request.
    OutOfMemory {
        /// Number of bytes requested.
        bytes: usize,
        /// Alignment requested.
        align: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow {
                requested,
                elem_size,
            } => {
                write!(
                    f,
                    "capacity overflow: {requested} slots of {elem_size} bytes"
                )
            }
            Self::OutOfMemory { bytes, align } => {
                write!(
                    f,
                    "out of memory: requested {bytes} bytes aligned to {align}"
                )
            }
        }
    }
}

impl Error for AllocError {}

/// A [`GrowthPolicy`](crate::config::GrowthPolicy) failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `initial_capacity` was zero, which would make the first growth a no-op.
    ZeroInitialCapacity,
    /// `growth_factor` below 2 cannot make progress from a full buffer.
    GrowthFactorTooSmall {
        /// The rejected factor.
        factor: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInitialCapacity => write!(f, "initial capacity must be at least 1"),
            Self::GrowthFactorTooSmall { factor } => {
                write!(f, "growth factor {factor} is too small (minimum 2)")
            }
        }
    }
}

impl Error for ConfigError {}
