//! Keel: hand-built memory primitives.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! keel sub-crates. For most users, adding `keel` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use keel::prelude::*;
//!
//! // A growable sequence with checked access and cursors.
//! let mut s = seq![1, 2, 3];
//! s.reserve(20);
//! s.push(4);
//! assert_eq!(s.capacity(), 20);
//! assert_eq!(s.at(3), Ok(&4));
//! assert!(s.at(4).is_err());
//!
//! let mut cur = s.begin();
//! cur += 2;
//! assert_eq!(*cur, 3);
//!
//! // Exclusive ownership.
//! let mut sole = Unique::new(String::from("mine"));
//! let moved = sole.take();
//! assert!(sole == Null);
//! assert_eq!(moved.as_str(), "mine");
//!
//! // Shared ownership.
//! let a = Shared::new(s);
//! let b = a.clone();
//! assert_eq!(b.use_count(), 2);
//! assert_eq!(b.len(), 4);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `keel-core` | Allocation strategies, errors, growth policy, `Null` |
//! | [`seq`] | `keel-seq` | `Seq`, cursors, owning iterator |
//! | [`ptr`] | `keel-ptr` | `Unique`, `Shared`, `WeakShared`, control block |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocation strategies, error types, and configuration (`keel-core`).
///
/// Implement [`types::AllocStrategy`] to give a [`seq::Seq`] its own source
/// of storage; [`types::Global`] is the default.
pub use keel_core as types;

/// Growable contiguous sequence and its cursors (`keel-seq`).
pub use keel_seq as seq;

/// Exclusive and shared ownership pointers (`keel-ptr`).
///
/// [`ptr::Unique`] takes a pluggable [`ptr::Deleter`]; [`ptr::Shared`]
/// counts owners in an atomic [`ptr::ControlBlock`].
pub use keel_ptr as ptr;

/// Common imports for typical keel usage.
///
/// ```rust
/// use keel::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use keel_core::{AllocError, AllocStrategy, Global, GrowthPolicy, Null, OutOfRange};

    // Sequence
    pub use keel_seq::{seq, Cursor, CursorMut, Seq};

    // Pointers
    pub use keel_ptr::{Shared, Unique, WeakShared};
}
