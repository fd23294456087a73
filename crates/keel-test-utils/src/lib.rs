//! Test utilities and fixture types for keel development.
//!
//! Provides values with observable side effects ([`Tracked`],
//! [`PanicOnClone`], [`PanicOnDrop`]) and instrumented allocation strategies
//! ([`CountingAlloc`], [`FailingAlloc`]) for asserting ownership and
//! failure-safety contracts.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod fixtures;

pub use alloc::{AllocStats, CountingAlloc, FailingAlloc};
pub use fixtures::{DropCounter, PanicOnClone, PanicOnDrop, Tracked};
