//! Deletion strategies for [`Unique`](crate::Unique).

use std::ptr::NonNull;

use crate::object;

/// How an exclusive-ownership pointer disposes of its object.
///
/// Any `FnMut(NonNull<T>)` closure is a deleter.
pub trait Deleter<T> {
    /// Dispose of the object at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` is handed over exclusively: the caller owned it, will never use
    /// it again, and it satisfies whatever allocation contract this deleter
    /// expects of the pointers given to its owner.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

/// Drops the object and returns its one-slot block to
/// [`Global`](keel_core::Global).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultDelete;

impl<T> Deleter<T> for DefaultDelete {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: default-deleted pointers are one-slot `Global` blocks.
        unsafe { object::destroy(ptr) }
    }
}

impl<T, F: FnMut(NonNull<T>)> Deleter<T> for F {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self(ptr)
    }
}
