//! Instrumented allocation strategies.
//!
//! Both strategies forward to [`Global`] and record every block they hand
//! out in a shared [`AllocStats`], so a test can assert that nothing leaked
//! after a container is dropped or after a failed operation unwound.

#![allow(unsafe_code)]

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keel_core::alloc::array_layout;
use keel_core::{AllocError, AllocStrategy, Global};

/// Counters shared between clones of an instrumented strategy.
#[derive(Debug, Default)]
pub struct AllocStats {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl AllocStats {
    /// Successful `allocate` calls.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// `deallocate` calls.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    /// Blocks handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Bytes handed out and not yet returned.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }

    fn record_alloc(&self, bytes: usize) {
        self.allocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    fn record_dealloc(&self, bytes: usize) {
        self.deallocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(bytes, Ordering::SeqCst);
    }
}

fn block_bytes<T>(n: usize) -> usize {
    array_layout::<T>(n).map(|l| l.size()).unwrap_or(0)
}

/// Forwards to [`Global`] and counts blocks and bytes.
#[derive(Clone, Debug, Default)]
pub struct CountingAlloc {
    stats: Arc<AllocStats>,
}

impl CountingAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &AllocStats {
        &self.stats
    }
}

impl AllocStrategy for CountingAlloc {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        let ptr = Global.allocate::<T>(n)?;
        self.stats.record_alloc(block_bytes::<T>(n));
        Ok(ptr)
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        self.stats.record_dealloc(block_bytes::<T>(n));
        // SAFETY: the block came from `Global` via `allocate` above.
        unsafe { Global.deallocate(ptr, n) }
    }
}

/// Succeeds for a fixed number of allocations, then reports out-of-memory.
///
/// The budget is shared between clones, so a container and its clones draw
/// from the same pool.
#[derive(Clone, Debug)]
pub struct FailingAlloc {
    inner: CountingAlloc,
    remaining: Arc<AtomicUsize>,
}

impl FailingAlloc {
    /// Allow `successes` allocations before failing every later one.
    pub fn after(successes: usize) -> Self {
        Self {
            inner: CountingAlloc::new(),
            remaining: Arc::new(AtomicUsize::new(successes)),
        }
    }

    pub fn stats(&self) -> &AllocStats {
        self.inner.stats()
    }
}

impl AllocStrategy for FailingAlloc {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        let granted = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if granted.is_err() {
            let layout = array_layout::<T>(n)?;
            return Err(AllocError::OutOfMemory {
                bytes: layout.size(),
                align: layout.align(),
            });
        }
        self.inner.allocate(n)
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: forwarded contract; every granted block came from `inner`.
        unsafe { self.inner.deallocate(ptr, n) }
    }
}
