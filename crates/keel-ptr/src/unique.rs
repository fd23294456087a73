//! Exclusive-ownership pointer.
//!
//! A [`Unique`] owns at most one object plus a [`Deleter`]. Ownership moves
//! (Rust moves, [`Unique::take`], [`Unique::assign`]) and is never duplicated;
//! `Unique` is not `Clone`. Whenever an owned pointer is replaced, the new
//! pointer is installed before the old one reaches the deleter, so a
//! panicking deleter leaves the handle holding its new value.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use keel_core::{handle_alloc_failure, AllocError, Null};

use crate::delete::{DefaultDelete, Deleter};
use crate::object;

/// Owns zero or one heap object.
pub struct Unique<T, D: Deleter<T> = DefaultDelete> {
    raw: Option<NonNull<T>>,
    deleter: D,
    _owns: PhantomData<T>,
}

// SAFETY: `Unique` owns its object like `Box` does.
unsafe impl<T: Send, D: Deleter<T> + Send> Send for Unique<T, D> {}
// SAFETY: shared access yields `&T` and `&D` only.
unsafe impl<T: Sync, D: Deleter<T> + Sync> Sync for Unique<T, D> {}

impl<T> Unique<T> {
    /// Allocate `value` and take ownership of it.
    pub fn new(value: T) -> Self {
        Self::try_new(value).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible [`new`](Self::new). On failure `value` is dropped and no
    /// handle exists.
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        let raw = object::allocate(value)?;
        Ok(Self {
            raw: Some(raw),
            deleter: DefaultDelete,
            _owns: PhantomData,
        })
    }

    /// Move the object out, releasing its block. `None` when null.
    pub fn into_inner(mut self) -> Option<T> {
        let raw = self.raw.take()?;
        // SAFETY: default-deleted pointers are one-slot `Global` blocks.
        Some(unsafe { object::take(raw) })
    }
}

impl<T, D: Deleter<T>> Unique<T, D> {
    /// A handle owning nothing.
    pub fn null() -> Self
    where
        D: Default,
    {
        Self::null_with(D::default())
    }

    /// A handle owning nothing, with the given deleter.
    pub const fn null_with(deleter: D) -> Self {
        Self {
            raw: None,
            deleter,
            _owns: PhantomData,
        }
    }

    /// Allocate `value` in a one-slot [`Global`](keel_core::Global) block and
    /// pair it with `deleter`, which becomes responsible for that block.
    pub fn with_deleter(value: T, deleter: D) -> Self {
        match object::allocate(value) {
            Ok(raw) => Self {
                raw: Some(raw),
                deleter,
                _owns: PhantomData,
            },
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Take ownership of `ptr`. A null `ptr` yields a null handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be owned by nobody else and valid for `D`. For
    /// [`DefaultDelete`] that means a live `T` in a one-slot block from
    /// [`Global`](keel_core::Global), such as a pointer from
    /// [`release`](Self::release).
    pub unsafe fn from_raw(ptr: *mut T) -> Self
    where
        D: Default,
    {
        // SAFETY: forwarded contract.
        unsafe { Self::from_raw_with_deleter(ptr, D::default()) }
    }

    /// Take ownership of `ptr`, disposing of it with `deleter`.
    ///
    /// # Safety
    ///
    /// As [`from_raw`](Self::from_raw), with validity judged by `deleter`.
    pub unsafe fn from_raw_with_deleter(ptr: *mut T, deleter: D) -> Self {
        Self {
            raw: NonNull::new(ptr),
            deleter,
            _owns: PhantomData,
        }
    }

    /// The owned pointer, or null.
    pub fn as_ptr(&self) -> *mut T {
        self.raw.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Whether the handle owns nothing.
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Shared access to the object.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: an owned pointer is live for as long as `self` holds it.
        self.raw.map(|p| unsafe { &*p.as_ptr() })
    }

    /// Exclusive access to the object.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as above; `&mut self` is exclusive.
        self.raw.map(|p| unsafe { &mut *p.as_ptr() })
    }

    /// The deletion strategy.
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    /// The deletion strategy, mutably.
    pub fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }

    /// Give up ownership without deleting. The caller now owns the result.
    pub fn release(&mut self) -> *mut T {
        self.raw.take().map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Delete the owned object, if any, leaving the handle null.
    pub fn reset(&mut self) {
        // SAFETY: a null pointer carries no ownership requirements.
        unsafe { self.reset_to(ptr::null_mut()) }
    }

    /// Own `ptr` instead, deleting the previous object afterwards.
    ///
    /// # Safety
    ///
    /// As [`from_raw_with_deleter`](Self::from_raw_with_deleter), and `ptr`
    /// must differ from the currently owned pointer unless both are null.
    pub unsafe fn reset_to(&mut self, ptr: *mut T) {
        let old = mem::replace(&mut self.raw, NonNull::new(ptr));
        if let Some(old) = old {
            // SAFETY: `old` was owned by this handle and is no longer reachable.
            unsafe { self.deleter.delete(old) };
        }
    }

    /// Move-assign: take `other`'s object and deleter, then delete the
    /// object this handle owned before.
    pub fn assign(&mut self, mut other: Self) {
        self.swap(&mut other);
        drop(other);
    }

    /// Move the contents out, leaving a null handle with a default deleter.
    pub fn take(&mut self) -> Self
    where
        D: Default,
    {
        mem::replace(self, Self::null())
    }

    /// Exchange objects and deleters with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.raw, &mut other.raw);
        mem::swap(&mut self.deleter, &mut other.deleter);
    }
}

impl<T, D: Deleter<T>> Drop for Unique<T, D> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            // SAFETY: the handle owned `raw` exclusively.
            unsafe { self.deleter.delete(raw) };
        }
    }
}

impl<T, D: Deleter<T>> Deref for Unique<T, D> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced a null Unique"),
        }
    }
}

impl<T, D: Deleter<T>> DerefMut for Unique<T, D> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("dereferenced a null Unique"),
        }
    }
}

impl<T, D: Deleter<T> + Default> Default for Unique<T, D> {
    fn default() -> Self {
        Self::null()
    }
}

/// Handles are equal when they own the same address.
impl<T, D, U, E> PartialEq<Unique<U, E>> for Unique<T, D>
where
    D: Deleter<T>,
    E: Deleter<U>,
{
    fn eq(&self, other: &Unique<U, E>) -> bool {
        ptr::addr_eq(self.as_ptr(), other.as_ptr())
    }
}

impl<T, D: Deleter<T>> PartialEq<Null> for Unique<T, D> {
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<T, D: Deleter<T>> PartialEq<Unique<T, D>> for Null {
    fn eq(&self, other: &Unique<T, D>) -> bool {
        other.is_null()
    }
}

impl<T: fmt::Debug, D: Deleter<T>> fmt::Debug for Unique<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Unique").field(value).finish(),
            None => f.write_str("Unique(null)"),
        }
    }
}
