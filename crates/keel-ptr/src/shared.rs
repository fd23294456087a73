//! Reference-counted shared ownership.
//!
//! A [`Shared`] is a pair of pointers travelling together: the object and
//! its [`ControlBlock`]. Every copy of a handle shares both. The last strong
//! release destroys the object; the last release of any kind frees the
//! block. [`WeakShared`] observes an object without keeping it alive.
//!
//! Copies may be made and dropped concurrently from any number of threads.
//! Each individual handle is a plain value: one handle must not be mutated
//! from two threads at once.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use keel_core::{handle_alloc_failure, AllocError, Null};

use crate::count::ControlBlock;
use crate::object;

struct Inner<T> {
    object: NonNull<T>,
    block: NonNull<ControlBlock>,
}

impl<T> Clone for Inner<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Inner<T> {}

impl<T> Inner<T> {
    fn block(&self) -> &ControlBlock {
        // SAFETY: a handle holding `Inner` holds a weak unit, so the block
        // outlives the borrow.
        unsafe { self.block.as_ref() }
    }

    /// Give back one weak unit, freeing the block on the last one.
    ///
    /// # Safety
    ///
    /// The caller holds a weak unit of this block and drops it here.
    unsafe fn release_weak(self) {
        // SAFETY: the unit keeps the block alive up to this call.
        let last = unsafe { self.block.as_ref() }.release_weak();
        if last {
            // SAFETY: no unit of any kind remains.
            unsafe { ControlBlock::free(self.block) };
        }
    }
}

/// Weak unit released when dropped, including during unwind.
struct WeakUnit<T>(Inner<T>);

impl<T> Drop for WeakUnit<T> {
    fn drop(&mut self) {
        // SAFETY: a `WeakUnit` is built only from a unit its creator held.
        unsafe { self.0.release_weak() };
    }
}

/// Shared owner of a heap object.
pub struct Shared<T> {
    inner: Option<Inner<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: handles on different threads touch the object only through `&T`,
// and the last one to go drops `T` on its thread.
unsafe impl<T: Send + Sync> Send for Shared<T> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for Shared<T> {}

impl<T> Shared<T> {
    /// A handle owning nothing. Both counts report zero.
    pub const fn empty() -> Self {
        Self {
            inner: None,
            _owns: PhantomData,
        }
    }

    /// Allocate `value` and become its only owner.
    pub fn new(value: T) -> Self {
        Self::try_new(value).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible [`new`](Self::new). On failure `value` is dropped and nothing
    /// stays allocated.
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        let block = ControlBlock::allocate()?;
        let object = match object::allocate(value) {
            Ok(object) => object,
            Err(err) => {
                // SAFETY: the block was never shared.
                unsafe { ControlBlock::free(block) };
                return Err(err);
            }
        };
        Ok(Self::from_inner(Inner { object, block }))
    }

    /// Adopt `ptr`, becoming its only owner. A null `ptr` yields an empty
    /// handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be owned by nobody else and hold a live `T` in a one-slot
    /// block from [`Global`](keel_core::Global), such as a pointer from
    /// [`Unique::release`](crate::Unique::release).
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        // SAFETY: forwarded contract.
        unsafe { Self::try_from_raw(ptr) }.unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible [`from_raw`](Self::from_raw). If the control block cannot be
    /// allocated the object is destroyed before the error is returned.
    ///
    /// # Safety
    ///
    /// As [`from_raw`](Self::from_raw).
    pub unsafe fn try_from_raw(ptr: *mut T) -> Result<Self, AllocError> {
        let Some(object) = NonNull::new(ptr) else {
            return Ok(Self::empty());
        };
        match ControlBlock::allocate() {
            Ok(block) => Ok(Self::from_inner(Inner { object, block })),
            Err(err) => {
                // SAFETY: the caller handed over sole ownership.
                unsafe { object::destroy(object) };
                Err(err)
            }
        }
    }

    fn from_inner(inner: Inner<T>) -> Self {
        Self {
            inner: Some(inner),
            _owns: PhantomData,
        }
    }

    /// Live strong handles to this object; zero when empty.
    pub fn use_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |i| i.block().strong_count())
    }

    /// Value of the weak counter: strong handles plus weak handles. Zero when
    /// empty.
    pub fn weak_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |i| i.block().weak_count())
    }

    /// Whether the handle owns nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The object pointer, or null.
    pub fn as_ptr(&self) -> *const T {
        self.inner.as_ref().map_or(ptr::null(), |i| i.object.as_ptr())
    }

    /// Shared access to the object.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: the strong unit held by `self` keeps the object alive.
        self.inner.as_ref().map(|i| unsafe { i.object.as_ref() })
    }

    /// Exclusive access, available only while this is the sole handle of any
    /// kind.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let inner = self.inner.as_mut()?;
        let block = inner.block();
        if block.strong_count() != 1 || block.weak_count() != 1 {
            return None;
        }
        // SAFETY: no other handle exists that could reach the object, and
        // none can be created without `&self`.
        Some(unsafe { inner.object.as_mut() })
    }

    /// Whether both handles share the same object. Two empty handles do.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// Move the contents out without touching the counters, leaving this
    /// handle empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::empty())
    }

    /// Drop this handle's share, leaving it empty.
    pub fn reset(&mut self) {
        drop(self.take());
    }

    /// A weak observer of the same object.
    pub fn downgrade(&self) -> WeakShared<T> {
        match self.inner {
            Some(inner) => {
                inner.block().acquire_weak();
                WeakShared { inner: Some(inner) }
            }
            None => WeakShared::new(),
        }
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        match self.inner {
            Some(inner) => {
                inner.block().acquire_strong();
                Self::from_inner(inner)
            }
            None => Self::empty(),
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        // Every strong handle also holds a weak unit.
        let _unit = WeakUnit(inner);
        if inner.block().release_strong() {
            // SAFETY: the last strong unit is gone; no handle can reach the
            // object again.
            unsafe { object::destroy(inner.object) };
            tracing::trace!("shared object destroyed");
        }
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty Shared"),
        }
    }
}

impl<T> PartialEq<Null> for Shared<T> {
    fn eq(&self, _: &Null) -> bool {
        self.is_empty()
    }
}

impl<T> PartialEq<Shared<T>> for Null {
    fn eq(&self, other: &Shared<T>) -> bool {
        other.is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Shared").field(value).finish(),
            None => f.write_str("Shared(empty)"),
        }
    }
}

/// Non-owning observer of a [`Shared`] object.
///
/// Keeps the control block alive but not the object.
pub struct WeakShared<T> {
    inner: Option<Inner<T>>,
}

// SAFETY: upgrading produces a `Shared<T>`, which carries the same bounds.
unsafe impl<T: Send + Sync> Send for WeakShared<T> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for WeakShared<T> {}

impl<T> WeakShared<T> {
    /// An observer of nothing. Never upgrades.
    pub const fn new() -> Self {
        Self { inner: None }
    }

    /// A strong handle, if the object is still alive.
    pub fn upgrade(&self) -> Option<Shared<T>> {
        let inner = self.inner?;
        if inner.block().try_acquire_strong() {
            Some(Shared::from_inner(inner))
        } else {
            None
        }
    }

    /// Live strong handles to the observed object.
    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |i| i.block().strong_count())
    }

    /// Value of the weak counter; see [`Shared::weak_count`].
    pub fn weak_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |i| i.block().weak_count())
    }
}

impl<T> Clone for WeakShared<T> {
    fn clone(&self) -> Self {
        if let Some(inner) = self.inner {
            inner.block().acquire_weak();
        }
        Self { inner: self.inner }
    }
}

impl<T> Drop for WeakShared<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            // SAFETY: this observer held one weak unit.
            unsafe { inner.release_weak() };
        }
    }
}

impl<T> Default for WeakShared<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WeakShared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(WeakShared)")
    }
}
