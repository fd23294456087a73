//! Acquire-then-commit staging buffer for bulk construction.
//!
//! [`RawBuf`] owns a freshly allocated block while elements are written into
//! it one by one. If construction unwinds part way, dropping the guard
//! destroys the prefix built so far and returns the block to its strategy.
//! Only [`RawBuf::commit`] hands the block over, and only after every
//! element is in place.
//!
//! [`FreeBlock`] covers the opposite direction: it returns a block to its
//! strategy when dropped, so teardown releases the block even if an element
//! destructor unwinds.

use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

use keel_core::{AllocError, AllocStrategy};

pub(crate) struct RawBuf<'a, T, A: AllocStrategy> {
    ptr: NonNull<T>,
    cap: usize,
    init: usize,
    alloc: &'a A,
}

impl<'a, T, A: AllocStrategy> RawBuf<'a, T, A> {
    pub(crate) fn allocate(alloc: &'a A, cap: usize) -> Result<Self, AllocError> {
        let ptr = alloc.allocate::<T>(cap)?;
        Ok(Self {
            ptr,
            cap,
            init: 0,
            alloc,
        })
    }

    /// Construct the next slot from `value`.
    ///
    /// # Panics
    ///
    /// Panics if every slot is already initialised.
    pub(crate) fn push(&mut self, value: T) {
        assert!(self.init < self.cap, "staging buffer overfilled");
        // SAFETY: slot `init` is allocated and not yet initialised.
        unsafe { self.ptr.as_ptr().add(self.init).write(value) };
        self.init += 1;
    }

    /// Release ownership of the block: `(ptr, capacity, initialised_len)`.
    pub(crate) fn commit(self) -> (NonNull<T>, usize, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.cap, this.init)
    }
}

impl<T, A: AllocStrategy> Drop for RawBuf<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: the first `init` slots hold live values; the block came
        // from `self.alloc` with `cap` slots.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.init));
            self.alloc.deallocate(self.ptr, self.cap);
        }
    }
}

/// Releases a block with no live values left to the guard.
pub(crate) struct FreeBlock<'a, T, A: AllocStrategy> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: &'a A,
}

impl<'a, T, A: AllocStrategy> FreeBlock<'a, T, A> {
    /// # Safety
    ///
    /// `ptr` came from `alloc` with `cap` slots, and every slot is dead or
    /// owned elsewhere by the time the guard drops.
    pub(crate) unsafe fn new(ptr: NonNull<T>, cap: usize, alloc: &'a A) -> Self {
        Self { ptr, cap, alloc }
    }
}

impl<T, A: AllocStrategy> Drop for FreeBlock<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: guaranteed by the constructor's contract.
        unsafe { self.alloc.deallocate(self.ptr, self.cap) };
    }
}
