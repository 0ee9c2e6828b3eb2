//! Point-in-time view of the table set
//!
//! Transactions read from a `TableSnapshot`: a clone of every table taken
//! under the backend's read lock together with the commit tick current at
//! that moment. Cloning the whole map is the simplest implementation that is
//! correct; the snapshot type is the seam where a copy-on-write view could be
//! swapped in later without touching the transaction layer.

use std::collections::BTreeMap;

use tessera_core::{Stored, Term};

use crate::pattern::Pattern;

/// One table row as stored by the backend: the value slot plus the commit
/// tick of the write that last touched it. Ticks drive first-committer-wins
/// validation; tick 0 is reserved for "row absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The value slot.
    pub value: Stored,
    /// Commit tick of the writing transaction.
    pub tick: u64,
}

/// Immutable view of all tables at one commit tick.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    tick: u64,
    data: BTreeMap<String, BTreeMap<Term, Row>>,
}

impl TableSnapshot {
    /// Build a snapshot from cloned backend state.
    pub fn new(tick: u64, data: BTreeMap<String, BTreeMap<Term, Row>>) -> TableSnapshot {
        TableSnapshot { tick, data }
    }

    /// An empty snapshot at tick 0, for tests.
    pub fn empty() -> TableSnapshot {
        TableSnapshot {
            tick: 0,
            data: BTreeMap::new(),
        }
    }

    /// The commit tick this snapshot was taken at.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// True if the named table existed at snapshot time.
    pub fn has_table(&self, table: &str) -> bool {
        self.data.contains_key(table)
    }

    /// The row for `key` in `table`, if any.
    pub fn row(&self, table: &str, key: &Term) -> Option<&Row> {
        self.data.get(table).and_then(|rows| rows.get(key))
    }

    /// All rows of `table` whose key matches `pattern`, in key order.
    pub fn rows_matching<'a>(
        &'a self,
        table: &str,
        pattern: &'a Pattern,
    ) -> impl Iterator<Item = (&'a Term, &'a Row)> + 'a {
        self.data
            .get(table)
            .into_iter()
            .flat_map(|rows| rows.iter())
            .filter(move |(key, _)| pattern.matches(key))
    }
}
