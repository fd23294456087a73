//! The "no object" sentinel.

/// Stands for the absence of an owned object.
///
/// Owning pointers compare equal to `Null` exactly when they hold nothing:
///
/// ```ignore
/// assert!(Unique::<i32>::null() == Null);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Null;
