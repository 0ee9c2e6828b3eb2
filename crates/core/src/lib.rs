//! Core types for the tessera storage engine
//!
//! This crate defines the foundational types used throughout the system:
//! - `Term`: the opaque, orderable key/value term (atoms and cells,
//!   improper-list aware)
//! - `Version`: the positive per-key version counter
//! - `Namespace`: the prefix codec multiplexing logical storages onto shared
//!   physical tables
//! - `qualified`: the `[version, key | 0]` qualified-key shape
//! - `Stored` / `Lookup`: row slots (value or tombstone) and read results
//! - `Error`: the unified error enum

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod namespace;
pub mod qualified;
pub mod term;
pub mod value;
pub mod version;

pub use error::{Error, Result};
pub use namespace::Namespace;
pub use qualified::QualifiedKey;
pub use term::Term;
pub use value::{Lookup, Stored};
pub use version::Version;
