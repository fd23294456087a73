//! Atomic control block shared by [`Shared`](crate::Shared) and
//! [`WeakShared`](crate::WeakShared) handles.
//!
//! The block carries two counters:
//!
//! - `strong`: live [`Shared`](crate::Shared) handles. The object is
//!   destroyed when it reaches zero.
//! - `weak`: one unit per strong handle plus one per weak handle. The block
//!   itself is freed when it reaches zero.
//!
//! A fresh block starts at `(1, 1)` for the handle that created it.
//! Increments are relaxed; decrements are release operations followed by an
//! acquire fence on the transition to zero, so every access made through
//! any handle happens-before destruction.

use std::process;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicUsize, Ordering};

use keel_core::AllocError;

use crate::object;

/// Counts past this abort the process instead of wrapping.
const MAX_COUNT: usize = isize::MAX as usize;

/// Lifecycle of a control block and the object it governs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// At least one strong handle exists; the object is alive.
    Live,
    /// The object has been destroyed; weak handles keep the block.
    ObjectDestroyed,
    /// The last unit of any kind was released; the block must be freed.
    Freed,
}

/// Strong and weak counters for one shared object.
#[derive(Debug)]
pub struct ControlBlock {
    strong: AtomicUsize,
    weak: AtomicUsize,
}

impl ControlBlock {
    /// A block accounting for one strong handle.
    pub const fn new() -> Self {
        Self {
            strong: AtomicUsize::new(1),
            weak: AtomicUsize::new(1),
        }
    }

    pub(crate) fn allocate() -> Result<NonNull<ControlBlock>, AllocError> {
        object::allocate(Self::new())
    }

    /// # Safety
    ///
    /// `block` came from [`allocate`](Self::allocate) and its weak count
    /// reached zero.
    pub(crate) unsafe fn free(block: NonNull<ControlBlock>) {
        // SAFETY: forwarded contract.
        unsafe { object::destroy(block) };
        tracing::trace!("control block freed");
    }

    /// Live strong handles.
    pub fn strong_count(&self) -> usize {
        self.strong.load(Ordering::Acquire)
    }

    /// Strong handles plus weak handles.
    pub fn weak_count(&self) -> usize {
        self.weak.load(Ordering::Acquire)
    }

    /// Where the block is in its lifecycle.
    ///
    /// Through a live handle this is never [`BlockState::Freed`]; only a
    /// block whose counters were all released in place reports it.
    pub fn state(&self) -> BlockState {
        if self.strong_count() > 0 {
            BlockState::Live
        } else if self.weak_count() > 0 {
            BlockState::ObjectDestroyed
        } else {
            BlockState::Freed
        }
    }

    /// Account for one more strong handle.
    pub(crate) fn acquire_strong(&self) {
        let old = self.strong.fetch_add(1, Ordering::Relaxed);
        if old > MAX_COUNT {
            process::abort();
        }
        self.acquire_weak();
    }

    /// Account for one more weak handle.
    pub(crate) fn acquire_weak(&self) {
        let old = self.weak.fetch_add(1, Ordering::Relaxed);
        if old > MAX_COUNT {
            process::abort();
        }
    }

    /// Add a strong handle only while the object is alive.
    pub(crate) fn try_acquire_strong(&self) -> bool {
        let mut current = self.strong.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return false;
            }
            if current > MAX_COUNT {
                process::abort();
            }
            match self.strong.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.acquire_weak();
                    return true;
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Drop one strong unit. `true` exactly once, for the caller that must
    /// now destroy the object; that caller still holds its weak unit.
    pub(crate) fn release_strong(&self) -> bool {
        if self.strong.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    /// Drop one weak unit. `true` exactly once, for the caller that must now
    /// free the block. After `false` the block is no longer the caller's to
    /// touch.
    pub(crate) fn release_weak(&self) -> bool {
        if self.weak.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }
}

impl Default for ControlBlock {
    fn default() -> Self {
        Self::new()
    }
}
