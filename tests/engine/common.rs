//! Shared helpers for engine integration tests.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tessera::{ChannelSink, MemTables, Namespace, Storage, StorageBuilder, StorageEvent, Term};

/// Quiet tracing init so failing tests show engine logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A storage handle over a fresh in-memory backend, empty namespace.
pub fn open() -> Storage<MemTables> {
    init_tracing();
    StorageBuilder::new().open(Arc::new(MemTables::new()))
}

/// A storage handle with a namespace over a shared backend.
pub fn open_namespaced(tables: &Arc<MemTables>, labels: &[&str]) -> Storage<MemTables> {
    init_tracing();
    StorageBuilder::new()
        .namespace(Namespace::of(labels))
        .open(Arc::clone(tables))
}

/// A storage handle publishing onto a channel sink.
pub fn open_with_events() -> (Storage<MemTables>, Receiver<StorageEvent>) {
    init_tracing();
    let (sink, events) = ChannelSink::pair();
    let storage = StorageBuilder::new()
        .sink(Arc::new(sink))
        .open(Arc::new(MemTables::new()));
    (storage, events)
}

/// The `[version, key | 0]` qualified-key term for a text key.
pub fn qkey(version: u64, key: &str) -> Term {
    Term::cell(
        Term::nat(version),
        Term::cell(Term::text(key), Term::nil()),
    )
}
