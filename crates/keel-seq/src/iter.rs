//! By-value iteration over a [`Seq`](crate::Seq).

use std::fmt;
use std::ptr::{self, NonNull};

use keel_core::AllocStrategy;

use crate::raw::FreeBlock;

/// Owning iterator returned by `Seq::into_iter`.
///
/// Holds the sequence's block; values not yet yielded are dropped, and the
/// block released, when the iterator is dropped.
pub struct IntoIter<T, A: AllocStrategy> {
    buf: Option<NonNull<T>>,
    cap: usize,
    start: usize,
    end: usize,
    alloc: A,
}

// SAFETY: owns its values like the sequence it came from.
unsafe impl<T: Send, A: AllocStrategy + Send> Send for IntoIter<T, A> {}
// SAFETY: shared access yields nothing mutable.
unsafe impl<T: Sync, A: AllocStrategy + Sync> Sync for IntoIter<T, A> {}

impl<T, A: AllocStrategy> IntoIter<T, A> {
    pub(crate) fn new(buf: Option<NonNull<T>>, cap: usize, len: usize, alloc: A) -> Self {
        Self {
            buf,
            cap,
            start: 0,
            end: len,
            alloc,
        }
    }

    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        match self.buf {
            // SAFETY: slots `[start, end)` are live.
            Some(p) => unsafe {
                std::slice::from_raw_parts(p.as_ptr().add(self.start), self.end - self.start)
            },
            None => &[],
        }
    }
}

impl<T, A: AllocStrategy> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let base = self.buf?;
        let index = self.start;
        self.start += 1;
        // SAFETY: slot `index` was live and is now outside `[start, end)`.
        Some(unsafe { base.as_ptr().add(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, A: AllocStrategy> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let base = self.buf?;
        self.end -= 1;
        // SAFETY: slot `end` was live and is now outside `[start, end)`.
        Some(unsafe { base.as_ptr().add(self.end).read() })
    }
}

impl<T, A: AllocStrategy> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: AllocStrategy> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let Some(base) = self.buf else {
            return;
        };
        let remaining = self.end - self.start;
        self.end = self.start;
        // SAFETY: the block came from `alloc` with `cap` slots; the rest is
        // dropped before the guard runs.
        let _block = unsafe { FreeBlock::new(base, self.cap, &self.alloc) };
        // SAFETY: `[start, start + remaining)` were live and are no longer
        // reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                base.as_ptr().add(self.start),
                remaining,
            ));
        }
    }
}

impl<T: fmt::Debug, A: AllocStrategy> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
