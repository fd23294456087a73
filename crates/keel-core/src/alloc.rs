//! Exchangeable allocation strategies.
//!
//! An [`AllocStrategy`] hands out uninitialised blocks of `n` slots of some
//! element type and takes them back. Containers hold one strategy value each
//! and never construct or destroy elements through it. [`Global`] forwards
//! to the process allocator.
//!
//! Zero-byte requests (`n == 0` or a zero-sized `T`) never reach the
//! underlying allocator: they yield a dangling, well-aligned pointer, and
//! releasing such a pointer is a no-op.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::AllocError;

/// A source of raw, uninitialised element storage.
pub trait AllocStrategy {
    /// Allocate storage for `n` values of `T`.
    ///
    /// The returned slots are uninitialised. Fails with
    /// [`AllocError::CapacityOverflow`] when `n` slots cannot form a valid
    /// layout and [`AllocError::OutOfMemory`] when the allocator refuses.
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>, AllocError>;

    /// Release a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `self.allocate::<T>(n)` (or a strategy this one
    /// was cloned from) with the same `n`, and must not be used afterwards.
    /// Any values still living in the block are not dropped.
    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize);
}

impl<A: AllocStrategy> AllocStrategy for &A {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        (**self).allocate(n)
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, n) }
    }
}

/// Layout of `n` consecutive `T` slots.
pub fn array_layout<T>(n: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(n).map_err(|_| AllocError::CapacityOverflow {
        requested: n,
        elem_size: std::mem::size_of::<T>(),
    })
}

/// The process-wide allocator (`std::alloc`).
///
/// A block of one slot has the same layout as `Layout::new::<T>()`, so
/// single-object blocks are interchangeable with those of `Box<T>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl AllocStrategy for Global {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        let layout = array_layout::<T>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or_else(|| {
            tracing::debug!(
                bytes = layout.size(),
                align = layout.align(),
                "global allocation failed"
            );
            AllocError::OutOfMemory {
                bytes: layout.size(),
                align: layout.align(),
            }
        })
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        // A block this strategy handed out always had a valid layout.
        let Ok(layout) = array_layout::<T>(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: ptr was allocated by `std::alloc::alloc` with this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
    }
}

/// Turn an allocation failure on an infallible path into a panic or abort.
///
/// Overflow panics with `capacity overflow`; genuine exhaustion goes through
/// [`std::alloc::handle_alloc_error`].
#[cold]
#[track_caller]
pub fn handle_alloc_failure(err: AllocError) -> ! {
    match err {
        AllocError::CapacityOverflow { .. } => panic!("capacity overflow"),
        AllocError::OutOfMemory { bytes, align } => match Layout::from_size_align(bytes, align) {
            Ok(layout) => std::alloc::handle_alloc_error(layout),
            Err(_) => panic!("{err}"),
        },
    }
}
