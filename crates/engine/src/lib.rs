//! The tessera storage engine
//!
//! Versioned, namespaced key-value storage over an injected transactional
//! table backend:
//! - [`Storage`]: the handle — versioned writes, current and
//!   version-addressed reads, keyspace scans, order-map snapshots, blocking
//!   reads
//! - [`Facade`] / [`FacadeHandle`]: the mailbox-serialized request surface
//!   (calls and casts)
//! - [`StorageBuilder`] / [`StorageConfig`]: table names, namespace, publish
//!   sink
//! - [`EventSink`] / [`StorageEvent`]: best-effort write/lifecycle events
//! - [`CommitmentTree`]: the SHA-256 accumulator bound to the commitments
//!   table

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
pub mod commitment;
pub mod config;
pub mod events;
pub mod facade;
pub mod lifecycle;
pub mod snapshot;
pub mod store;

pub use commitment::{
    leaf_hash, CommitmentTree, Digest256, DIGEST_BYTES, MAX_LEAVES, TREE_ARITY, TREE_DEPTH,
};
pub use config::{StorageBuilder, StorageConfig};
pub use events::{ChannelSink, EventSink, Outcome, StorageEvent};
pub use facade::{Facade, FacadeHandle};
pub use lifecycle::TableReport;
pub use snapshot::OrderSnapshot;
pub use store::Storage;
