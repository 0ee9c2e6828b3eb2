//! Buffered transactions with optimistic validation
//!
//! A `Txn` reads from a [`TableSnapshot`] and buffers writes locally; nothing
//! is visible to other transactions until commit. Every snapshot read is
//! tracked in the read set with the tick it observed (0 for an absent row).
//! At commit the backend re-checks each tracked tick under its commit lock —
//! first committer wins, later conflicting committers abort.
//!
//! Read-your-writes: a read or select consults this transaction's own
//! buffered writes before the snapshot.
//!
//! Nested composition is done by passing the `&mut Txn` down the call chain;
//! everything composed into one `Txn` commits or aborts as a unit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tessera_core::{Error, Result, Stored, Term};

use crate::pattern::Pattern;
use crate::snapshot::TableSnapshot;

/// Outcome of a transactional closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxResult<T> {
    /// The transaction validated and its writes are applied.
    Committed(T),
    /// The transaction aborted; no writes are applied.
    Aborted(String),
}

impl<T> TxResult<T> {
    /// Collapse into a `Result`, mapping aborts to [`Error::TxAborted`].
    pub fn committed(self) -> Result<T> {
        match self {
            TxResult::Committed(v) => Ok(v),
            TxResult::Aborted(reason) => Err(Error::TxAborted { reason }),
        }
    }

    /// The outcome tag, without the payload.
    pub fn status(&self) -> TxStatus {
        match self {
            TxResult::Committed(_) => TxStatus::Committed,
            TxResult::Aborted(_) => TxStatus::Aborted,
        }
    }

    /// Map the committed payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TxResult<U> {
        match self {
            TxResult::Committed(v) => TxResult::Committed(f(v)),
            TxResult::Aborted(reason) => TxResult::Aborted(reason),
        }
    }
}

/// Commit-or-abort tag carried by published storage events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// The write committed.
    Committed,
    /// The write aborted.
    Aborted,
}

/// An in-flight transaction: snapshot reads plus buffered writes.
pub struct Txn {
    snapshot: TableSnapshot,
    /// (table, key) → tick observed at read time; 0 means absent.
    read_set: HashMap<(String, Term), u64>,
    /// Buffered writes in program order; later writes to a key shadow earlier
    /// ones.
    writes: Vec<(String, Term, Stored)>,
}

impl Txn {
    /// Begin a transaction over a snapshot.
    pub fn begin(snapshot: TableSnapshot) -> Txn {
        Txn {
            snapshot,
            read_set: HashMap::new(),
            writes: Vec::new(),
        }
    }

    /// The tick of the underlying snapshot.
    pub fn snapshot_tick(&self) -> u64 {
        self.snapshot.tick()
    }

    /// True if this transaction has buffered no writes.
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Read one row, observing this transaction's own writes first.
    pub fn read(&mut self, table: &str, key: &Term) -> Result<Option<Stored>> {
        if !self.snapshot.has_table(table) {
            return Err(Error::NoSuchTable(table.to_string()));
        }
        if let Some(value) = self.own_write(table, key) {
            return Ok(Some(value.clone()));
        }
        let row = self.snapshot.row(table, key);
        let tick = row.map(|r| r.tick).unwrap_or(0);
        let value = row.map(|r| r.value.clone());
        self.track_read(table, key, tick);
        Ok(value)
    }

    /// Buffer a write. Applied atomically with the rest of the transaction at
    /// commit.
    pub fn write(&mut self, table: &str, key: Term, value: Stored) -> Result<()> {
        if !self.snapshot.has_table(table) {
            return Err(Error::NoSuchTable(table.to_string()));
        }
        self.writes.push((table.to_string(), key, value));
        Ok(())
    }

    /// All rows of `table` matching `pattern`, overlaid with this
    /// transaction's buffered writes, in key order.
    ///
    /// Matched snapshot rows join the read set; a row appearing between
    /// snapshot and commit (a phantom) is not detected.
    pub fn select(&mut self, table: &str, pattern: &Pattern) -> Result<Vec<(Term, Stored)>> {
        if !self.snapshot.has_table(table) {
            return Err(Error::NoSuchTable(table.to_string()));
        }
        let mut rows: std::collections::BTreeMap<Term, Stored> = self
            .snapshot
            .rows_matching(table, pattern)
            .map(|(key, row)| (key.clone(), row.value.clone()))
            .collect();
        let tracked: Vec<(Term, u64)> = self
            .snapshot
            .rows_matching(table, pattern)
            .map(|(key, row)| (key.clone(), row.tick))
            .collect();
        for (key, tick) in tracked {
            self.track_read(table, &key, tick);
        }
        for (wtable, key, value) in &self.writes {
            if wtable == table && pattern.matches(key) {
                rows.insert(key.clone(), value.clone());
            }
        }
        Ok(rows.into_iter().collect())
    }

    fn own_write(&self, table: &str, key: &Term) -> Option<&Stored> {
        self.writes
            .iter()
            .rev()
            .find(|(wtable, wkey, _)| wtable == table && wkey == key)
            .map(|(_, _, value)| value)
    }

    fn track_read(&mut self, table: &str, key: &Term, tick: u64) {
        self.read_set
            .entry((table.to_string(), key.clone()))
            .or_insert(tick);
    }

    /// The tracked reads, for commit-time validation.
    pub fn read_set(&self) -> &HashMap<(String, Term), u64> {
        &self.read_set
    }

    /// The buffered writes in program order.
    pub fn writes(&self) -> &[(String, Term, Stored)] {
        &self.writes
    }

    /// Decompose into read set and writes.
    pub fn into_parts(self) -> (HashMap<(String, Term), u64>, Vec<(String, Term, Stored)>) {
        (self.read_set, self.writes)
    }
}
