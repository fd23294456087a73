//! Growable contiguous sequence for keel.
//!
//! [`Seq`] is a hand-built vector: one block from an exchangeable
//! [`AllocStrategy`](keel_core::AllocStrategy), a length, and a capacity.
//! [`Cursor`] and [`CursorMut`] give random-access positions over its live
//! values.
//!
//! ```text
//! Seq<T, A>
//! ├── block: [T; cap] from A   (slots [0, len) live)
//! ├── GrowthPolicy              (8 from empty, then ×2)
//! └── Cursor / CursorMut        (borrow the live region)
//! ```
//!
//! Bulk construction stages elements in a `RawBuf` guard and only commits
//! the block once every element is built.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod cursor;
pub mod iter;
mod raw;
pub mod seq;

pub use cursor::{Cursor, CursorMut};
pub use iter::IntoIter;
pub use seq::Seq;

/// Build a [`Seq`] from literal values.
///
/// The result has exactly as much capacity as there are values.
///
/// ```
/// let s = keel_seq::seq![1, 2, 3];
/// assert_eq!(s.len(), 3);
/// assert_eq!(s.capacity(), 3);
/// ```
#[macro_export]
macro_rules! seq {
    () => {
        <$crate::Seq<_>>::new()
    };
    ($($value:expr),+ $(,)?) => {
        <$crate::Seq<_>>::from([$($value),+])
    };
}
