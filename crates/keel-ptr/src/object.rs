//! Single-object heap blocks.
//!
//! Every object owned by a [`Unique`](crate::Unique) with the default
//! deleter or by a [`Shared`](crate::Shared), and every control block, lives
//! in a one-slot block from [`Global`]. A one-slot block has the layout of
//! `Layout::new::<T>()`.

use std::ptr::{self, NonNull};

use keel_core::{AllocError, AllocStrategy, Global};

/// Move `value` into a fresh one-slot block. On failure `value` is dropped.
pub(crate) fn allocate<T>(value: T) -> Result<NonNull<T>, AllocError> {
    let ptr = Global.allocate::<T>(1)?;
    // SAFETY: one uninitialised slot for `T`.
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drop the object in place and release its block.
///
/// # Safety
///
/// `ptr` must hold a live object in a one-slot block from [`Global`], and
/// must not be used afterwards.
pub(crate) unsafe fn destroy<T>(ptr: NonNull<T>) {
    let _slot = FreeSlot(ptr);
    // SAFETY: forwarded contract; the slot is released afterwards, or during
    // unwind if the destructor panics.
    unsafe { ptr::drop_in_place(ptr.as_ptr()) };
}

/// Releases a one-slot block whose object is already gone.
struct FreeSlot<T>(NonNull<T>);

impl<T> Drop for FreeSlot<T> {
    fn drop(&mut self) {
        // SAFETY: only built by `destroy`, over a one-slot block from `Global`.
        unsafe { Global.deallocate(self.0, 1) };
    }
}

/// Move the object out and release its block.
///
/// # Safety
///
/// Same as [`destroy`].
pub(crate) unsafe fn take<T>(ptr: NonNull<T>) -> T {
    // SAFETY: forwarded contract; the slot is read exactly once.
    unsafe {
        let value = ptr.as_ptr().read();
        Global.deallocate(ptr, 1);
        value
    }
}
