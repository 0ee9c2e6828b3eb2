//! The table-manager seam
//!
//! The engine consumes transactional tables through the [`Tables`] trait:
//! named tables of `Term → Stored` rows, snapshot reads, atomic validated
//! commits, and per-table write subscriptions. The in-memory backend
//! ([`MemTables`](crate::MemTables)) is the provided implementation; tests
//! and embedding hosts inject it, so no state is ambient.

use tessera_core::Result;

use crate::snapshot::TableSnapshot;
use crate::subscribe::Subscription;
use crate::txn::{TxResult, Txn};

/// A transactional set of named tables with write subscriptions.
pub trait Tables: Send + Sync + 'static {
    /// Create a table. Fails with `TableExists` if it is already present.
    fn create_table(&self, name: &str) -> Result<()>;

    /// Drop a table and its rows. Fails with `NoSuchTable` if absent.
    fn delete_table(&self, name: &str) -> Result<()>;

    /// True if the table currently exists.
    fn table_exists(&self, name: &str) -> bool;

    /// Capture a point-in-time view of every table.
    fn snapshot(&self) -> TableSnapshot;

    /// Validate and atomically apply a transaction, returning its commit
    /// tick. A read-set conflict aborts with `Error::TxAborted`; the engine
    /// never retries on its own.
    fn commit(&self, txn: Txn) -> Result<u64>;

    /// Register on a table's write stream. The registration must be
    /// observable before this returns: a write committed afterwards is
    /// guaranteed to produce an event for this subscriber.
    fn subscribe(&self, table: &str) -> Subscription;

    /// Run a closure transactionally: snapshot, buffered execution, commit.
    ///
    /// The closure's error or a commit conflict yields `Aborted`; otherwise
    /// the closure's value is returned as `Committed`. Compose nested work by
    /// passing the `&mut Txn` through — a single `Txn` commits as a unit.
    fn transaction<T>(&self, f: impl FnOnce(&mut Txn) -> Result<T>) -> TxResult<T>
    where
        Self: Sized,
    {
        let mut txn = Txn::begin(self.snapshot());
        match f(&mut txn) {
            Ok(value) => match self.commit(txn) {
                Ok(_) => TxResult::Committed(value),
                Err(e) => TxResult::Aborted(e.to_string()),
            },
            Err(e) => TxResult::Aborted(e.to_string()),
        }
    }
}
