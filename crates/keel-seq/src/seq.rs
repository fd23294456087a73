//! The growable contiguous sequence.
//!
//! [`Seq`] owns one block from its [`AllocStrategy`], a logical length and an
//! allocated capacity. Slots `[0, len)` hold live values and slots
//! `[len, cap)` are allocated but uninitialised. A sequence with no block
//! always has `len == cap == 0`.
//!
//! Growth follows the sequence's [`GrowthPolicy`]: a full sequence with
//! capacity zero grows to `initial_capacity`, otherwise capacity is
//! multiplied by `growth_factor`. Growth relocates live values bitwise into
//! the new block and releases the old one. A failed allocation leaves the
//! old block, length and capacity untouched.

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

use keel_core::{
    handle_alloc_failure, AllocError, AllocStrategy, ConfigError, Global, GrowthPolicy, OutOfRange,
};

use crate::cursor::{Cursor, CursorMut};
use crate::iter::IntoIter;
use crate::raw::{FreeBlock, RawBuf};

/// A growable, contiguous, heap-allocated sequence.
///
/// `A` is the allocation strategy; every sequence owns its own strategy
/// value. Infallible operations (`push`, `reserve`, `with_capacity`, …)
/// panic or abort on allocation failure; their `try_` twins return the
/// [`AllocError`] instead.
pub struct Seq<T, A: AllocStrategy = Global> {
    ptr: Option<NonNull<T>>,
    cap: usize,
    len: usize,
    alloc: A,
    growth: GrowthPolicy,
    _owns: PhantomData<T>,
}

// SAFETY: `Seq` owns its values like `Vec` does.
unsafe impl<T: Send, A: AllocStrategy + Send> Send for Seq<T, A> {}
// SAFETY: shared access only yields `&T` and `&A`.
unsafe impl<T: Sync, A: AllocStrategy + Sync> Sync for Seq<T, A> {}

impl<T> Seq<T> {
    /// An empty sequence. Allocates nothing.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// An empty sequence with room for `n` values.
    ///
    /// No values are constructed. `n == 0` allocates nothing.
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_in(n, Global)
    }

    /// Fallible [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(n: usize) -> Result<Self, AllocError> {
        Self::try_with_capacity_in(n, Global)
    }

    /// Clone every value of `items` into a sequence of exactly that capacity.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self::try_from_slice(items).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible [`from_slice`](Self::from_slice).
    pub fn try_from_slice(items: &[T]) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::try_from_slice_in(items, Global)
    }
}

impl<T, A: AllocStrategy> Seq<T, A> {
    /// An empty sequence drawing memory from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: None,
            cap: 0,
            len: 0,
            alloc,
            growth: GrowthPolicy::DEFAULT,
            _owns: PhantomData,
        }
    }

    /// An empty sequence with room for `n` values, drawing from `alloc`.
    pub fn with_capacity_in(n: usize, alloc: A) -> Self {
        Self::try_with_capacity_in(n, alloc).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_with_capacity_in(n: usize, alloc: A) -> Result<Self, AllocError> {
        let mut seq = Self::new_in(alloc);
        seq.try_reserve(n)?;
        Ok(seq)
    }

    /// Clone every value of `items` into a new block from `alloc`.
    ///
    /// If a clone panics, the values cloned so far are dropped and the new
    /// block is released before the panic continues.
    pub fn try_from_slice_in(items: &[T], alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Ok(Self::new_in(alloc));
        }
        let (ptr, cap, len) = {
            let mut buf = RawBuf::allocate(&alloc, items.len())?;
            for item in items {
                buf.push(item.clone());
            }
            buf.commit()
        };
        Ok(Self {
            ptr: Some(ptr),
            cap,
            len,
            alloc,
            growth: GrowthPolicy::DEFAULT,
            _owns: PhantomData,
        })
    }

    /// Replace the growth policy after validating it.
    pub fn with_growth_policy(mut self, policy: GrowthPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        self.growth = policy;
        Ok(self)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Whether there are no live values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first slot, or null when nothing is allocated.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.map_or(ptr::null(), |p| p.as_ptr().cast_const())
    }

    /// Mutable pointer to the first slot, or null when nothing is allocated.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// The live values as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            // SAFETY: the first `len` slots are live.
            Some(p) => unsafe { slice::from_raw_parts(p.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The live values as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.ptr {
            // SAFETY: the first `len` slots are live and `&mut self` is exclusive.
            Some(p) => unsafe { slice::from_raw_parts_mut(p.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Iterate over shared references in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate over mutable references in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// The allocation strategy.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The growth policy in effect.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.as_slice().get(index).ok_or(OutOfRange { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(OutOfRange { index, len })
    }

    /// Unchecked access.
    ///
    /// # Safety
    ///
    /// `index` must be below [`len`](Self::len).
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: caller guarantees `index < len`.
        unsafe { self.as_slice().get_unchecked(index) }
    }

    /// Unchecked mutable access.
    ///
    /// # Safety
    ///
    /// `index` must be below [`len`](Self::len).
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: caller guarantees `index < len`.
        unsafe { self.as_mut_slice().get_unchecked_mut(index) }
    }

    /// First value, if any.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Last value, if any.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// First value, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Last value, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Ensure room for `n` values in total.
    ///
    /// `n <= capacity` is a no-op. Otherwise capacity becomes exactly `n`
    /// and every live value moves to the new block.
    pub fn reserve(&mut self, n: usize) {
        if let Err(err) = self.try_reserve(n) {
            handle_alloc_failure(err);
        }
    }

    /// Fallible [`reserve`](Self::reserve). On error nothing changes.
    pub fn try_reserve(&mut self, n: usize) -> Result<(), AllocError> {
        if n <= self.cap {
            return Ok(());
        }
        let new_ptr = self.alloc.allocate::<T>(n).inspect_err(|err| {
            tracing::debug!(requested = n, capacity = self.cap, %err, "sequence growth failed");
        })?;
        if let Some(old) = self.ptr {
            // SAFETY: the new block has `n > len` slots and cannot overlap the
            // old one, which holds `len` live values and came from `self.alloc`
            // with `cap` slots. After the copy the old slots are dead.
            unsafe {
                ptr::copy_nonoverlapping(old.as_ptr(), new_ptr.as_ptr(), self.len);
                self.alloc.deallocate(old, self.cap);
            }
        }
        tracing::trace!(
            old_capacity = self.cap,
            new_capacity = n,
            len = self.len,
            "sequence reallocated"
        );
        self.ptr = Some(new_ptr);
        self.cap = n;
        Ok(())
    }

    fn grow_if_full(&mut self) -> Result<(), AllocError> {
        if self.len < self.cap {
            return Ok(());
        }
        let next = self
            .growth
            .next_capacity(self.cap)
            .ok_or(AllocError::CapacityOverflow {
                requested: self.cap,
                elem_size: mem::size_of::<T>(),
            })?;
        self.try_reserve(next)
    }

    /// Append `value`, growing if full.
    pub fn push(&mut self, value: T) {
        if let Err(err) = self.try_push(value) {
            handle_alloc_failure(err);
        }
    }

    /// Fallible [`push`](Self::push). On error `value` is dropped and the
    /// sequence is unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), AllocError> {
        self.try_emplace_with(|| value)
    }

    /// Append a clone of `value`.
    pub fn push_clone(&mut self, value: &T)
    where
        T: Clone,
    {
        self.emplace_with(|| value.clone());
    }

    /// Grow if full, then build the new last value with `make`.
    ///
    /// The slot exists before `make` runs, so the value is written straight
    /// into it. If `make` panics the sequence keeps its old length.
    pub fn emplace_with(&mut self, make: impl FnOnce() -> T) {
        if let Err(err) = self.try_emplace_with(make) {
            handle_alloc_failure(err);
        }
    }

    /// Fallible [`emplace_with`](Self::emplace_with); `make` is not called
    /// when growth fails.
    pub fn try_emplace_with(&mut self, make: impl FnOnce() -> T) -> Result<(), AllocError> {
        self.grow_if_full()?;
        let Some(base) = self.ptr else {
            unreachable!("a sequence with spare capacity has a block");
        };
        // SAFETY: `len < cap`, so slot `len` is allocated and uninitialised.
        unsafe { base.as_ptr().add(self.len).write(make()) };
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last value. Capacity is kept.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let base = self.ptr?;
        // SAFETY: slot `len` held a live value and is now outside `[0, len)`.
        Some(unsafe { base.as_ptr().add(self.len).read() })
    }

    /// Drop every live value. Capacity and the block are kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drop values from index `n` onwards. Capacity and the block are kept.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len {
            return;
        }
        let Some(base) = self.ptr else {
            return;
        };
        let tail = self.len - n;
        // Shrink first so a panicking destructor cannot cause a double drop.
        self.len = n;
        // SAFETY: slots `[n, n + tail)` were live and are no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.as_ptr().add(n), tail));
        }
    }

    /// Move the contents out, leaving `self` empty with no block.
    ///
    /// The source keeps a clone of the allocation strategy.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone()).with_policy_unchecked(self.growth);
        mem::replace(self, empty)
    }

    fn with_policy_unchecked(mut self, policy: GrowthPolicy) -> Self {
        self.growth = policy;
        self
    }

    /// Read-only cursor at the first value.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::begin(self.as_slice())
    }

    /// Read-only cursor one past the last value.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::end(self.as_slice())
    }

    /// Mutable cursor at the first value.
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::begin(self.as_mut_slice())
    }

    /// Mutable cursor one past the last value.
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::end(self.as_mut_slice())
    }

    pub(crate) fn into_raw_parts(self) -> (Option<NonNull<T>>, usize, usize, A) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `alloc` is moved out exactly once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (this.ptr, this.cap, this.len, alloc)
    }
}

impl<T, A: AllocStrategy> Drop for Seq<T, A> {
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        let Some(base) = self.ptr else {
            return;
        };
        // SAFETY: the block came from `self.alloc` with `cap` slots; the
        // values below are dropped before the guard runs.
        let _block = unsafe { FreeBlock::new(base, self.cap, &self.alloc) };
        // SAFETY: slots `[0, len)` were live and are no longer reachable.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.as_ptr(), len)) };
    }
}

impl<T: Clone, A: AllocStrategy + Clone> Clone for Seq<T, A> {
    /// Deep copy into a block of exactly `len` slots.
    fn clone(&self) -> Self {
        match Self::try_from_slice_in(self.as_slice(), self.alloc.clone()) {
            Ok(seq) => seq.with_policy_unchecked(self.growth),
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Reuses the existing block when it is large enough.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.growth = source.growth;
        self.reserve(source.len);
        for item in source.iter() {
            self.push_clone(item);
        }
    }
}

impl<T, A: AllocStrategy + Default> Default for Seq<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, U, A, B> PartialEq<Seq<U, B>> for Seq<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy,
    B: AllocStrategy,
{
    fn eq(&self, other: &Seq<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: AllocStrategy> Eq for Seq<T, A> {}

impl<T: fmt::Debug, A: AllocStrategy> fmt::Debug for Seq<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: AllocStrategy> Index<usize> for Seq<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, A: AllocStrategy> IndexMut<usize> for Seq<T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T, const N: usize> From<[T; N]> for Seq<T> {
    /// Moves the values into a block of exactly `N` slots.
    fn from(items: [T; N]) -> Self {
        let mut seq = Self::with_capacity(N);
        for item in items {
            seq.push(item);
        }
        seq
    }
}

impl<T: Clone> From<&[T]> for Seq<T> {
    fn from(items: &[T]) -> Self {
        Self::from_slice(items)
    }
}

impl<T, A: AllocStrategy> Extend<T> for Seq<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > self.cap - self.len {
            match self.len.checked_add(lower) {
                Some(total) => self.reserve(total),
                None => handle_alloc_failure(AllocError::CapacityOverflow {
                    requested: lower,
                    elem_size: mem::size_of::<T>(),
                }),
            }
        }
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, A: AllocStrategy> Extend<&'a T> for Seq<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, A: AllocStrategy + Default> FromIterator<T> for Seq<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::default();
        seq.extend(iter);
        seq
    }
}

impl<'a, T, A: AllocStrategy> IntoIterator for &'a Seq<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: AllocStrategy> IntoIterator for &'a mut Seq<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: AllocStrategy> IntoIterator for Seq<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let (ptr, cap, len, alloc) = self.into_raw_parts();
        IntoIter::new(ptr, cap, len, alloc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq;
    use keel_test_utils::{CountingAlloc, DropCounter, FailingAlloc, PanicOnClone, PanicOnDrop};
    use proptest::prelude::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Clone, Debug, PartialEq)]
    struct Record {
        x: i32,
        values: Seq<i32>,
    }

    fn record(x: i32, values: [i32; 3]) -> Record {
        Record {
            x,
            values: Seq::from(values),
        }
    }

    // ── Construction ────────────────────────────────────────────

    #[test]
    fn new_is_empty_without_block() {
        let s: Seq<i32> = Seq::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 0);
        assert!(s.as_ptr().is_null());
    }

    #[test]
    fn literal_sets_len_and_capacity() {
        let s = seq![1, 2, 3];
        assert!(!s.is_empty());
        assert_eq!(s.len(), 3);
        assert_eq!(s.capacity(), 3);
        assert!(!s.as_ptr().is_null());
    }

    #[test]
    fn with_capacity_constructs_nothing() {
        let s: Seq<i32> = Seq::with_capacity(10);
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 10);
        assert!(s.is_empty());
    }

    #[test]
    fn with_capacity_then_push_uses_presized_block() {
        let mut s = Seq::with_capacity(4);
        let data = s.as_ptr();
        for i in 0..4 {
            s.push(i);
        }
        assert_eq!(s.capacity(), 4);
        assert_eq!(s.as_ptr(), data);
    }

    #[test]
    fn from_slice_clones_values() {
        let src = [record(1, [1, 2, 3]), record(2, [4, 5, 6])];
        let s = Seq::from_slice(&src);
        assert_eq!(s.len(), 2);
        assert_eq!(s.capacity(), 2);
        assert_eq!(s[1], src[1]);
    }

    #[test]
    fn empty_literal_allocates_nothing() {
        let s: Seq<u8> = Seq::from_slice(&[]);
        assert!(s.as_ptr().is_null());
        assert_eq!(s.capacity(), 0);
    }

    #[test]
    fn collect_from_iterator() {
        let s: Seq<i32> = (1..=5).collect();
        assert_eq!(s, seq![1, 2, 3, 4, 5]);
    }

    // ── Copy and move ───────────────────────────────────────────

    #[test]
    fn clone_is_deep_and_independent() {
        let a = seq![record(2, [1, 2, 3]), record(69, [50, 42, 123])];
        let mut b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a.as_ptr(), b.as_ptr());
        b[0].values.push(4);
        b.push(record(0, [0, 0, 0]));
        assert_ne!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].values.len(), 3);
    }

    #[test]
    fn clone_capacity_matches_len() {
        let mut a = Seq::with_capacity(32);
        a.push(1);
        a.push(2);
        let b = a.clone();
        assert_eq!(b.capacity(), 2);
    }

    #[test]
    fn clone_from_reuses_block() {
        let src = seq![7, 8];
        let mut dst = Seq::with_capacity(16);
        dst.push(1);
        let data = dst.as_ptr();
        dst.clone_from(&src);
        assert_eq!(dst, src);
        assert_eq!(dst.as_ptr(), data);
        assert_eq!(dst.capacity(), 16);
    }

    #[test]
    fn take_transfers_block_and_empties_source() {
        let mut src = seq![1, 2, 3];
        src.reserve(10);
        let (data, len, cap) = (src.as_ptr(), src.len(), src.capacity());

        let dst = src.take();
        assert_eq!(dst.as_ptr(), data);
        assert_eq!(dst.len(), len);
        assert_eq!(dst.capacity(), cap);
        assert_eq!(src.len(), 0);
        assert_eq!(src.capacity(), 0);
        assert!(src.as_ptr().is_null());
    }

    #[test]
    fn move_assignment_via_mem_take() {
        let mut src = seq![4, 5];
        let data = src.as_ptr();
        let mut dst = seq![9];
        assert_eq!(dst.len(), 1);
        dst = std::mem::take(&mut src);
        assert_eq!(dst.as_ptr(), data);
        assert_eq!(dst, seq![4, 5]);
        assert!(src.as_ptr().is_null());
        src.push(1);
        assert_eq!(src.len(), 1);
    }

    // ── Equality ────────────────────────────────────────────────

    #[test]
    fn equality_is_ordered_and_symmetric() {
        let r1 = record(2, [1, 2, 3]);
        let r2 = record(69, [50, 42, 123]);
        let v1 = seq![r1.clone(), r2.clone()];
        let v2 = seq![r1.clone(), r2.clone()];
        let v3 = seq![r2, r1];
        assert_eq!(v1, v2);
        assert_eq!(v2, v1);
        assert_ne!(v1, v3);
        assert_ne!(v3, v2);
    }

    #[test]
    fn equality_ignores_capacity_and_strategy() {
        let a = seq![1, 2];
        let mut b = Seq::with_capacity_in(64, CountingAlloc::new());
        b.push(1);
        b.push(2);
        assert!(a == b);
        b.push(3);
        assert!(a != b);
    }

    // ── Access ──────────────────────────────────────────────────

    #[test]
    fn indexed_and_checked_access_agree() {
        let s = seq![1, 2, 3];
        for i in 0..s.len() {
            assert_eq!(s.at(i), Ok(&s[i]));
        }
        assert_eq!(s[0], 1);
        assert_eq!(s[2], 3);
    }

    #[test]
    fn checked_access_reports_index_and_len() {
        let s = seq![1, 2, 3];
        for i in [s.len(), s.len() + 1, usize::MAX] {
            assert_eq!(s.at(i), Err(OutOfRange { index: i, len: 3 }));
        }
    }

    #[test]
    fn at_mut_writes_through() {
        let mut s = seq![1, 2, 3];
        *s.at_mut(1).unwrap() = 20;
        assert_eq!(s[1], 20);
        assert!(s.at_mut(3).is_err());
    }

    #[test]
    #[should_panic]
    fn index_past_len_panics() {
        let s = seq![1, 2, 3];
        let _value: i32 = s[3];
    }

    #[test]
    fn unchecked_access_reads_live_slot() {
        let mut s = seq![1, 2, 3];
        // SAFETY: indices below len.
        unsafe {
            assert_eq!(*s.get_unchecked(2), 3);
            *s.get_unchecked_mut(0) = 10;
        }
        assert_eq!(s[0], 10);
    }

    #[test]
    fn front_and_back() {
        let mut s = seq![1, 2, 3];
        assert_eq!(s.front(), Some(&1));
        assert_eq!(s.back(), Some(&3));
        *s.back_mut().unwrap() = 30;
        *s.front_mut().unwrap() = 10;
        assert_eq!(s, seq![10, 2, 30]);

        let empty: Seq<i32> = Seq::new();
        assert_eq!(empty.front(), None);
        assert_eq!(empty.back(), None);
    }

    // ── Reservation and growth ──────────────────────────────────

    #[test]
    fn reserve_relocates_values() {
        let r1 = record(2, [1, 2, 3]);
        let r2 = record(69, [50, 42, 123]);
        let mut s = seq![r1.clone(), r2.clone()];
        let data = s.as_ptr();
        s.reserve(20);
        assert_eq!(s.capacity(), 20);
        assert_ne!(s.as_ptr(), data);
        assert_eq!(s[0].x, r1.x);
        assert_eq!(s[1], r2);
    }

    #[test]
    fn reserve_not_above_capacity_is_noop() {
        let mut s = seq![1, 2, 3];
        let data = s.as_ptr();
        s.reserve(2);
        s.reserve(3);
        assert_eq!(s.capacity(), 3);
        assert_eq!(s.as_ptr(), data);
        assert_eq!(s, seq![1, 2, 3]);
    }

    #[test]
    fn first_growth_uses_default_capacity() {
        let mut s = Seq::new();
        s.push(1);
        assert_eq!(s.capacity(), GrowthPolicy::DEFAULT_INITIAL_CAPACITY);
    }

    #[test]
    fn full_sequence_doubles() {
        let mut s = seq![1, 2, 3];
        let data = s.as_ptr();
        s.push(4);
        assert_eq!(s.capacity(), 6);
        assert_ne!(s.as_ptr(), data);
        assert_eq!(s, seq![1, 2, 3, 4]);
    }

    #[test]
    fn custom_growth_policy_applies() {
        let policy = GrowthPolicy {
            initial_capacity: 2,
            growth_factor: 3,
        };
        let mut s = Seq::new().with_growth_policy(policy).unwrap();
        s.push(1);
        assert_eq!(s.capacity(), 2);
        s.push(2);
        s.push(3);
        assert_eq!(s.capacity(), 6);
    }

    #[test]
    fn invalid_growth_policy_rejected() {
        let policy = GrowthPolicy {
            initial_capacity: 0,
            growth_factor: 2,
        };
        let err = Seq::<i32>::new().with_growth_policy(policy).unwrap_err();
        assert_eq!(err, ConfigError::ZeroInitialCapacity);
    }

    #[test]
    fn failed_reserve_leaves_state_untouched() {
        let mut s = Seq::new_in(FailingAlloc::after(1));
        s.extend([1, 2, 3]);
        let (data, len, cap) = (s.as_ptr(), s.len(), s.capacity());

        let err = s.try_reserve(100).unwrap_err();
        assert!(matches!(err, AllocError::OutOfMemory { .. }));
        assert_eq!(s.as_ptr(), data);
        assert_eq!(s.len(), len);
        assert_eq!(s.capacity(), cap);
        assert_eq!(s, seq![1, 2, 3]);
    }

    #[test]
    fn failed_growth_on_push_is_reported() {
        let mut s = Seq::new_in(FailingAlloc::after(1));
        for i in 0..8 {
            s.try_push(i).unwrap();
        }
        assert_eq!(s.capacity(), 8);
        assert!(s.try_push(8).is_err());
        assert_eq!(s.len(), 8);
        assert_eq!(s.back(), Some(&7));
    }

    #[test]
    fn try_emplace_skips_constructor_on_failure() {
        let mut s: Seq<i32, _> = Seq::new_in(FailingAlloc::after(0));
        let mut called = false;
        let result = s.try_emplace_with(|| {
            called = true;
            1
        });
        assert!(result.is_err());
        assert!(!called);
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let mut s: Seq<u64> = Seq::new();
        let err = s.try_reserve(usize::MAX).unwrap_err();
        assert!(matches!(err, AllocError::CapacityOverflow { .. }));
        assert_eq!(s.capacity(), 0);
    }

    // ── Push, pop, clear ────────────────────────────────────────

    #[test]
    fn push_clone_and_emplace() {
        let mut s = Seq::new();
        let base = record(1, [1, 1, 1]);
        s.push_clone(&base);
        s.emplace_with(|| record(2, [2, 2, 2]));
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], base);
        assert_eq!(s[1].x, 2);
    }

    #[test]
    fn panicking_constructor_keeps_length() {
        let mut s = seq![1];
        let result = catch_unwind(AssertUnwindSafe(|| {
            s.emplace_with(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(s, seq![1]);
    }

    #[test]
    fn pop_back_keeps_capacity() {
        let mut s = seq![1, 2, 3];
        assert_eq!(s.pop_back(), Some(3));
        assert_eq!(s.len(), 2);
        assert_eq!(s.capacity(), 3);
        assert_eq!(s.pop_back(), Some(2));
        assert_eq!(s.pop_back(), Some(1));
        assert_eq!(s.pop_back(), None);
        assert_eq!(s.capacity(), 3);
    }

    #[test]
    fn pop_back_drops_exactly_once() {
        let drops = DropCounter::new();
        let mut s = Seq::new();
        s.push(drops.track(1));
        s.push(drops.track(2));
        let last = s.pop_back();
        assert_eq!(drops.count(), 0);
        drop(last);
        assert_eq!(drops.count(), 1);
        drop(s);
        assert_eq!(drops.count(), 2);
    }

    #[test]
    fn clear_keeps_block_and_destroys_values() {
        let drops = DropCounter::new();
        let mut s = Seq::from([drops.track(1), drops.track(2), drops.track(3)]);
        let data = s.as_ptr();
        s.clear();
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 3);
        assert_eq!(s.as_ptr(), data);
        assert_eq!(drops.count(), 3);
        drop(s);
        assert_eq!(drops.count(), 3);
    }

    #[test]
    fn truncate_drops_tail_only() {
        let drops = DropCounter::new();
        let mut s = Seq::new();
        for i in 0..5 {
            s.push(drops.track(i));
        }
        s.truncate(2);
        assert_eq!(drops.count(), 3);
        assert_eq!(s.len(), 2);
        s.truncate(10);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn drop_releases_block() {
        let alloc = CountingAlloc::new();
        {
            let mut s = Seq::new_in(alloc.clone());
            for i in 0..100 {
                s.push(i);
            }
            assert!(alloc.stats().allocations() > 1);
            assert_eq!(alloc.stats().live_blocks(), 1);
        }
        assert_eq!(alloc.stats().live_blocks(), 0);
    }

    // ── Failure safety ──────────────────────────────────────────

    #[test]
    fn panicking_clone_during_literal_build_releases_block() {
        let alloc = CountingAlloc::new();
        let drops = DropCounter::new();
        let items = PanicOnClone::batch(4, 2, &drops);

        let result = catch_unwind(AssertUnwindSafe(|| {
            Seq::try_from_slice_in(&items, alloc.clone())
        }));
        assert!(result.is_err());
        assert_eq!(alloc.stats().live_blocks(), 0);
        // The two successful clones were destroyed; originals still alive.
        assert_eq!(drops.count(), 2);
        drop(items);
        assert_eq!(drops.count(), 6);
    }

    #[test]
    fn panicking_clone_of_whole_sequence_leaks_nothing() {
        let alloc = CountingAlloc::new();
        let drops = DropCounter::new();
        let mut src = Seq::new_in(alloc.clone());
        for item in PanicOnClone::batch(3, 1, &drops) {
            src.push(item);
        }
        let live_before = alloc.stats().live_blocks();

        let result = catch_unwind(AssertUnwindSafe(|| src.clone()));
        assert!(result.is_err());
        assert_eq!(alloc.stats().live_blocks(), live_before);
        assert_eq!(drops.count(), 1);
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn panicking_destructor_still_releases_block() {
        let alloc = CountingAlloc::new();
        let drops = DropCounter::new();
        let mut s = Seq::new_in(alloc.clone());
        s.push(PanicOnDrop::new(false, &drops));
        s.push(PanicOnDrop::new(true, &drops));
        s.push(PanicOnDrop::new(false, &drops));
        assert_eq!(alloc.stats().live_blocks(), 1);

        let result = catch_unwind(AssertUnwindSafe(|| drop(s)));
        assert!(result.is_err());
        assert_eq!(drops.count(), 3);
        assert_eq!(alloc.stats().live_blocks(), 0);
    }

    #[test]
    fn failed_literal_allocation_propagates() {
        let alloc = FailingAlloc::after(0);
        let err = Seq::try_from_slice_in(&[1, 2, 3], alloc.clone()).unwrap_err();
        assert!(matches!(err, AllocError::OutOfMemory { .. }));
        assert_eq!(alloc.stats().live_blocks(), 0);
    }

    // ── Traversal ───────────────────────────────────────────────

    #[test]
    fn for_each_visits_in_order() {
        let s = seq![1, 2, 3];
        let mut expected = 1;
        for value in &s {
            assert_eq!(*value, expected);
            expected += 1;
        }
    }

    #[test]
    fn cursor_walk_matches_values() {
        let s = seq![1, 2, 3];
        let mut c = s.begin();
        let mut expected = 1;
        while c != s.end() {
            assert_eq!(*c, expected);
            expected += 1;
            c.inc();
        }
        assert_eq!(*(s.begin() + 1), 2);
        assert_eq!(*(s.end() - 3), 1);
    }

    #[test]
    fn empty_sequence_cursors_meet() {
        let s: Seq<i32> = Seq::new();
        assert_eq!(s.begin(), s.end());
    }

    #[test]
    fn mutable_cursor_updates_values() {
        let mut s = seq![1, 2, 3];
        {
            let mut c = s.begin_mut();
            while c.get().is_some() {
                *c *= 10;
                c.inc();
            }
        }
        assert_eq!(s, seq![10, 20, 30]);
        let end = s.end_mut();
        assert_eq!(end.position(), 3);
    }

    #[test]
    fn into_iter_yields_owned_values() {
        let s = seq![String::from("a"), String::from("b"), String::from("c")];
        let mut it = s.into_iter();
        assert_eq!(it.next().as_deref(), Some("a"));
        assert_eq!(it.next_back().as_deref(), Some("c"));
        assert_eq!(it.len(), 1);
    }

    #[test]
    fn debug_formats_as_list() {
        assert_eq!(format!("{:?}", seq![1, 2]), "[1, 2]");
    }

    #[test]
    fn zero_sized_values() {
        let mut s = Seq::new();
        for _ in 0..20 {
            s.push(());
        }
        assert_eq!(s.len(), 20);
        assert_eq!(s.pop_back(), Some(()));
    }

    // ── Properties ──────────────────────────────────────────────

    proptest! {
        #[test]
        fn push_appends_and_preserves_prefix(
            initial in proptest::collection::vec(any::<i32>(), 0..64),
            x in any::<i32>(),
        ) {
            let mut s: Seq<i32> = initial.iter().copied().collect();
            let old_len = s.len();
            let full = s.len() == s.capacity();
            let old_cap = s.capacity();
            s.push(x);
            prop_assert_eq!(s.len(), old_len + 1);
            prop_assert_eq!(s.back(), Some(&x));
            prop_assert_eq!(&s.as_slice()[..old_len], initial.as_slice());
            if full {
                let expected = if old_cap == 0 { 8 } else { old_cap * 2 };
                prop_assert_eq!(s.capacity(), expected);
            }
        }

        #[test]
        fn reserve_preserves_values(
            initial in proptest::collection::vec(any::<i64>(), 0..32),
            extra in 0usize..64,
        ) {
            let mut s = Seq::from_slice(&initial);
            let target = s.capacity() + extra;
            s.reserve(target);
            prop_assert_eq!(s.capacity(), target);
            prop_assert_eq!(s.as_slice(), initial.as_slice());
        }

        #[test]
        fn clear_destroys_each_value_once(n in 0usize..48) {
            let drops = DropCounter::new();
            let mut s = Seq::new();
            for i in 0..n {
                s.push(drops.track(i));
            }
            let cap = s.capacity();
            s.clear();
            prop_assert_eq!(drops.count(), n);
            prop_assert_eq!(s.capacity(), cap);
            drop(s);
            prop_assert_eq!(drops.count(), n);
        }
    }
}
