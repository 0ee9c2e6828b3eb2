//! Tessera: a versioned, namespaced key-value storage engine
//!
//! Tessera keeps every value ever written. Each key carries a monotonically
//! increasing version counter; a write stores its value at the fresh
//! `(version, key)` coordinate and bumps the counter, both under one
//! transaction. Readers ask for the current value, the value at an explicit
//! version, or block until a specific coordinate is written. Point-in-time
//! snapshots of the version map stay stable forever because written
//! coordinates are immutable. An append-only SHA-256 commitment accumulator
//! rides on a third table.
//!
//! ## Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera::{MemTables, StorageBuilder, Term, Lookup};
//!
//! let storage = StorageBuilder::new().open(Arc::new(MemTables::new()));
//!
//! storage.put(&Term::text("x"), Term::nat(42)).committed()?;
//! assert_eq!(storage.get(&Term::text("x")), Lookup::Present(Term::nat(42)));
//!
//! // History is retained: version 1 stays readable after later writes.
//! storage.put(&Term::text("x"), Term::nat(43)).committed()?;
//! assert_eq!(
//!     storage.read_at_order(&Term::text("x"), tessera::Version::FIRST),
//!     Lookup::Present(Term::nat(42)),
//! );
//! ```
//!
//! For the serialized request surface (calls and casts through one mailbox),
//! spawn a [`Facade`] around the handle; for waiting on a future write, use
//! [`Storage::blocking_read`] or [`FacadeHandle::blocking_read`].
//!
//! Namespaces multiplex independent logical storages onto the same physical
//! tables: handles configured with distinct namespaces never observe each
//! other's keys, handles with equal configuration share state fully.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use tessera_core::{
    qualified, Error, Lookup, Namespace, QualifiedKey, Result, Stored, Term, Version,
};
pub use tessera_engine::{
    leaf_hash, ChannelSink, CommitmentTree, Digest256, EventSink, Facade, FacadeHandle, Outcome,
    OrderSnapshot, Storage, StorageBuilder, StorageConfig, StorageEvent, TableReport,
    DIGEST_BYTES, MAX_LEAVES, TREE_ARITY, TREE_DEPTH,
};
pub use tessera_tables::{
    MemTables, Pattern, Subscription, TableEvent, TableSnapshot, Tables, TxResult, TxStatus, Txn,
};
