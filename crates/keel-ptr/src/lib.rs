//! Ownership pointers for keel.
//!
//! - [`Unique`]: sole owner of one heap object, disposed of by a pluggable
//!   [`Deleter`]. Moves, never copies.
//! - [`Shared`]: one of many owners of a heap object, counted in an atomic
//!   [`ControlBlock`]. The object dies with its last owner, the block with
//!   its last handle of any kind.
//! - [`WeakShared`]: observes a [`Shared`] object without keeping it alive.
//!
//! Both owning handles compare equal to [`Null`](keel_core::Null) when they
//! own nothing, and panic rather than misbehave when dereferenced empty.
//!
//! ```
//! use keel_ptr::{Shared, Unique};
//!
//! let mut sole = Unique::new(1);
//! *sole += 1;
//! assert_eq!(*sole, 2);
//!
//! let a = Shared::new("hello");
//! let b = a.clone();
//! assert_eq!(a.use_count(), 2);
//! drop(b);
//! assert_eq!(a.use_count(), 1);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod count;
pub mod delete;
mod object;
pub mod shared;
pub mod unique;

pub use count::{BlockState, ControlBlock};
pub use delete::{DefaultDelete, Deleter};
pub use shared::{Shared, WeakShared};
pub use unique::Unique;
