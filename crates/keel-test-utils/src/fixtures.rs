//! Value fixtures with observable destruction and cloning.
//!
//! - [`DropCounter`]: shared tally of destructor runs.
//! - [`Tracked`]: wraps a value and bumps its counter when dropped.
//! - [`PanicOnClone`]: clones succeed until a shared budget runs out, then panic.
//! - [`PanicOnDrop`]: counts its drop and then panics if armed.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared count of destructor runs.
///
/// Clones observe the same tally, so a counter can be handed to many
/// [`Tracked`] values and inspected afterwards.
#[derive(Clone, Debug, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked values dropped so far.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Wrap `value` so dropping it is recorded here.
    pub fn track<T>(&self, value: T) -> Tracked<T> {
        Tracked {
            value,
            counter: self.clone(),
        }
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A value whose destructor increments a [`DropCounter`].
///
/// Cloning produces a second tracked value on the same counter.
/// Equality compares the wrapped values only.
#[derive(Clone)]
pub struct Tracked<T> {
    value: T,
    counter: DropCounter,
}

impl<T> Tracked<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.counter.bump();
    }
}

/// A value whose `clone` panics once a shared budget is spent.
///
/// Every clone, successful or not, draws from the same budget; drops are
/// recorded on the attached [`DropCounter`].
pub struct PanicOnClone {
    pub id: u32,
    budget: Arc<AtomicUsize>,
    drops: DropCounter,
}

impl PanicOnClone {
    /// Build `count` values that together allow `clones_allowed` clones.
    pub fn batch(count: u32, clones_allowed: usize, drops: &DropCounter) -> Vec<PanicOnClone> {
        let budget = Arc::new(AtomicUsize::new(clones_allowed));
        (0..count)
            .map(|id| PanicOnClone {
                id,
                budget: Arc::clone(&budget),
                drops: drops.clone(),
            })
            .collect()
    }

    /// Clones still permitted before the next one panics.
    pub fn remaining(&self) -> usize {
        self.budget.load(Ordering::SeqCst)
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        let spent = self
            .budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if spent.is_err() {
            panic!("clone budget exhausted at id {}", self.id);
        }
        Self {
            id: self.id,
            budget: Arc::clone(&self.budget),
            drops: self.drops.clone(),
        }
    }
}

impl PartialEq for PanicOnClone {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for PanicOnClone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicOnClone").field("id", &self.id).finish()
    }
}

impl Drop for PanicOnClone {
    fn drop(&mut self) {
        self.drops.bump();
    }
}

/// A value whose destructor panics when armed.
///
/// The drop is recorded before the panic. An armed value dropped during an
/// unwind stays quiet so the process does not abort.
pub struct PanicOnDrop {
    armed: bool,
    drops: DropCounter,
}

impl PanicOnDrop {
    pub fn new(armed: bool, drops: &DropCounter) -> Self {
        Self {
            armed,
            drops: drops.clone(),
        }
    }
}

impl fmt::Debug for PanicOnDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicOnDrop").field("armed", &self.armed).finish()
    }
}

impl Drop for PanicOnDrop {
    fn drop(&mut self) {
        self.drops.bump();
        if self.armed && !std::thread::panicking() {
            panic!("armed value dropped");
        }
    }
}
