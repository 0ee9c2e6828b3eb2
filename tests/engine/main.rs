//! Engine integration tests
//!
//! End-to-end scenarios over the public API: versioned writes and reads,
//! keyspace scans, snapshots, blocking reads, the facade mailbox, published
//! events, and concurrent writers.

mod common;

mod concurrent;
mod events;
mod scenarios;
