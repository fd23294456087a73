//! Random-access positions over a contiguous region.
//!
//! A cursor is a region base, the region length, and a signed position.
//! Moving a cursor is plain wrapping arithmetic on the position, so it is
//! constant time and cannot fail even when the position walks outside the
//! region. Reading through a cursor checks the position: [`Cursor::get`]
//! returns `None` outside `[0, len)`, while `Deref` and `Index` panic.
//!
//! The `'a` lifetime borrows the owning sequence, so no reallocating
//! operation can run while a cursor into it is alive.
//!
//! [`CursorMut`] has only the pre-increment and pre-decrement forms. A
//! post form would return a copy of the old position, and that copy would
//! be a second mutable cursor over the same elements. Read the current
//! element first and then call [`CursorMut::inc`] or [`CursorMut::dec`].

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};

#[cold]
#[track_caller]
fn outside_region(pos: isize, len: usize) -> ! {
    panic!("cursor position {pos} outside region of length {len}")
}

fn in_region(pos: isize, len: usize) -> bool {
    pos >= 0 && (pos as usize) < len
}

/// A read-only cursor. Copyable, like a shared reference.
pub struct Cursor<'a, T> {
    base: *const T,
    len: usize,
    pos: isize,
    _region: PhantomData<&'a [T]>,
}

// SAFETY: a cursor only hands out `&T`, same as `&[T]`.
unsafe impl<T: Sync> Send for Cursor<'_, T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<'a, T> Cursor<'a, T> {
    /// Cursor at the first slot of `region`.
    pub fn begin(region: &'a [T]) -> Self {
        Self::at(region, 0)
    }

    /// Cursor one past the last slot of `region`.
    pub fn end(region: &'a [T]) -> Self {
        Self::at(region, region.len() as isize)
    }

    fn at(region: &'a [T], pos: isize) -> Self {
        Self {
            base: region.as_ptr(),
            len: region.len(),
            pos,
            _region: PhantomData,
        }
    }

    /// Signed offset from the start of the region.
    pub fn position(&self) -> isize {
        self.pos
    }

    /// The element under the cursor, or `None` outside the region.
    pub fn get(&self) -> Option<&'a T> {
        if in_region(self.pos, self.len) {
            // SAFETY: `pos` is within the `len` live elements borrowed for `'a`.
            Some(unsafe { &*self.base.add(self.pos as usize) })
        } else {
            None
        }
    }

    /// The element under the cursor without a region check.
    ///
    /// # Safety
    ///
    /// The position must lie in `[0, len)` of the region.
    pub unsafe fn get_unchecked(&self) -> &'a T {
        debug_assert!(in_region(self.pos, self.len));
        // SAFETY: caller guarantees the position is in the region.
        unsafe { &*self.base.offset(self.pos) }
    }

    /// Pre-increment: advance one slot and return the cursor.
    pub fn inc(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_add(1);
        self
    }

    /// Pre-decrement: step back one slot and return the cursor.
    pub fn dec(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_sub(1);
        self
    }

    /// Post-increment: advance one slot, returning the old position.
    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    /// Post-decrement: step back one slot, returning the old position.
    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }
}

impl<T> Deref for Cursor<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => outside_region(self.pos, self.len),
        }
    }
}

impl<T> Index<isize> for Cursor<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        let shifted = *self + n;
        match shifted.get() {
            Some(value) => value,
            None => outside_region(shifted.pos, self.len),
        }
    }
}

impl<T> Add<isize> for Cursor<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T> Sub<isize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add(n);
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.pos = self.pos.wrapping_sub(n);
    }
}

/// Distance between two cursors over the same region.
impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        self.pos.wrapping_sub(other.pos)
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.base, other.base) && self.pos == other.pos
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("len", &self.len)
            .finish()
    }
}

/// A cursor that can write through its position.
///
/// Not `Copy`: two mutable cursors over one region could alias a slot.
pub struct CursorMut<'a, T> {
    base: *mut T,
    len: usize,
    pos: isize,
    _region: PhantomData<&'a mut [T]>,
}

// SAFETY: a mutable cursor behaves like `&mut [T]`.
unsafe impl<T: Send> Send for CursorMut<'_, T> {}
// SAFETY: shared access only yields `&T`.
unsafe impl<T: Sync> Sync for CursorMut<'_, T> {}

impl<'a, T> CursorMut<'a, T> {
    /// Mutable cursor at the first slot of `region`.
    pub fn begin(region: &'a mut [T]) -> Self {
        Self::at(region, 0)
    }

    /// Mutable cursor one past the last slot of `region`.
    pub fn end(region: &'a mut [T]) -> Self {
        let len = region.len() as isize;
        Self::at(region, len)
    }

    fn at(region: &'a mut [T], pos: isize) -> Self {
        Self {
            base: region.as_mut_ptr(),
            len: region.len(),
            pos,
            _region: PhantomData,
        }
    }

    /// Signed offset from the start of the region.
    pub fn position(&self) -> isize {
        self.pos
    }

    /// The element under the cursor, or `None` outside the region.
    pub fn get(&self) -> Option<&T> {
        if in_region(self.pos, self.len) {
            // SAFETY: in-region slot of the exclusively borrowed region.
            Some(unsafe { &*self.base.add(self.pos as usize) })
        } else {
            None
        }
    }

    /// Mutable access to the element under the cursor.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if in_region(self.pos, self.len) {
            // SAFETY: in-region slot; `&mut self` prevents a second borrow.
            Some(unsafe { &mut *self.base.add(self.pos as usize) })
        } else {
            None
        }
    }

    /// Read-only view of the same position, borrowing this cursor.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            base: self.base.cast_const(),
            len: self.len,
            pos: self.pos,
            _region: PhantomData,
        }
    }

    /// Pre-increment.
    pub fn inc(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_add(1);
        self
    }

    /// Pre-decrement.
    pub fn dec(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_sub(1);
        self
    }
}

impl<T> Deref for CursorMut<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => outside_region(self.pos, self.len),
        }
    }
}

impl<T> DerefMut for CursorMut<'_, T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        let (pos, len) = (self.pos, self.len);
        match self.get_mut() {
            Some(value) => value,
            None => outside_region(pos, len),
        }
    }
}

impl<T> Index<isize> for CursorMut<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        let pos = self.pos.wrapping_add(n);
        if !in_region(pos, self.len) {
            outside_region(pos, self.len);
        }
        // SAFETY: checked against the region above.
        unsafe { &*self.base.add(pos as usize) }
    }
}

impl<T> IndexMut<isize> for CursorMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, n: isize) -> &mut T {
        let pos = self.pos.wrapping_add(n);
        if !in_region(pos, self.len) {
            outside_region(pos, self.len);
        }
        // SAFETY: checked against the region above; `&mut self` is exclusive.
        unsafe { &mut *self.base.add(pos as usize) }
    }
}

impl<T> Add<isize> for CursorMut<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T> Sub<isize> for CursorMut<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<T> AddAssign<isize> for CursorMut<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add(n);
    }
}

impl<T> SubAssign<isize> for CursorMut<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.pos = self.pos.wrapping_sub(n);
    }
}

impl<T> PartialEq for CursorMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.base, other.base) && self.pos == other.pos
    }
}

impl<T> Eq for CursorMut<'_, T> {}

impl<T> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("pos", &self.pos)
            .field("len", &self.len)
            .finish()
    }
}
