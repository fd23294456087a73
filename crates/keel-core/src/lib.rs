//! Core types for the keel memory primitives.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces every container and pointer in the workspace shares: the
//! [`AllocStrategy`] seam and its [`Global`] default, the error types, the
//! [`GrowthPolicy`] configuration, and the [`Null`] sentinel.
//!
//! Only `alloc.rs` may contain `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod config;
pub mod error;
pub mod null;

pub use alloc::{handle_alloc_failure, AllocStrategy, Global};
pub use config::GrowthPolicy;
pub use error::{AllocError, ConfigError, OutOfRange};
pub use null::Null;
