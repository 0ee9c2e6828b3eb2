//! Point-in-time snapshots of the order map
//!
//! `snapshot_order` captures every `(namespaced_key, version)` pair of the
//! order table under one transaction. Because qualified rows are immutable
//! once written, a snapshot keeps resolving to the values that were current
//! at capture time no matter how many writes land afterwards — the snapshot
//! pins versions, and versions pin values.

use tessera_core::{Error, Lookup, Result, Stored, Term, Version};
use tessera_tables::{Pattern, Tables, TxResult};

use crate::store::Storage;

/// A consistent capture of the order map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    rows: Vec<(Term, Version)>,
}

impl OrderSnapshot {
    /// The captured `(namespaced_key, version)` pairs, in key order.
    pub fn rows(&self) -> &[(Term, Version)] {
        &self.rows
    }

    /// Number of captured keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode as a proper list of `[namespaced_key version]` pairs, the form
    /// stored by [`Storage::put_snapshot`].
    pub fn to_term(&self) -> Term {
        Term::list(
            self.rows
                .iter()
                .map(|(key, version)| Term::list([key.clone(), version.to_term()])),
        )
    }

    /// Decode the list form produced by [`OrderSnapshot::to_term`].
    pub fn from_term(term: &Term) -> Result<OrderSnapshot> {
        let mut rows = Vec::new();
        for pair in term.elems() {
            let mut parts = pair.elems();
            let key = parts.next();
            let version = parts.next().and_then(Version::from_term);
            match (key, version, parts.next()) {
                (Some(key), Some(version), None) => rows.push((key.clone(), version)),
                _ => {
                    return Err(Error::Corruption(format!(
                        "snapshot entry {} is not a [key version] pair",
                        pair
                    )))
                }
            }
        }
        Ok(OrderSnapshot { rows })
    }
}

impl<T: Tables> Storage<T> {
    /// Capture the full order map in one transaction.
    pub fn snapshot_order(&self) -> TxResult<OrderSnapshot> {
        self.tables().transaction(|txn| {
            let rows = txn.select(self.order(), &Pattern::all())?;
            let mut out = Vec::with_capacity(rows.len());
            for (nskey, slot) in rows {
                match slot {
                    Stored::Term(t) => match Version::from_term(&t) {
                        Some(version) => out.push((nskey, version)),
                        None => {
                            return Err(Error::Corruption(format!(
                                "order row for {} holds {}, not a version",
                                nskey, t
                            )))
                        }
                    },
                    Stored::Tombstone => {
                        return Err(Error::Corruption(format!(
                            "order row for {} holds a tombstone",
                            nskey
                        )))
                    }
                }
            }
            Ok(OrderSnapshot { rows: out })
        })
    }

    /// Snapshot the order map and store it under `key` as an ordinary
    /// versioned write.
    pub fn put_snapshot(&self, key: &Term) -> TxResult<Version> {
        match self.snapshot_order() {
            TxResult::Committed(snapshot) => self.put(key, snapshot.to_term()),
            TxResult::Aborted(reason) => TxResult::Aborted(reason),
        }
    }

    /// The version a key was at when the snapshot was taken, if present.
    pub fn in_snapshot(&self, snapshot: &OrderSnapshot, key: &Term) -> Option<Version> {
        let nskey = self.config().namespace.apply(key);
        snapshot
            .rows
            .iter()
            .find(|(captured, _)| captured == &nskey)
            .map(|(_, version)| *version)
    }

    /// Resolve a key through the snapshot: the value at its captured
    /// version, stable for the snapshot's lifetime.
    pub fn get_at_snapshot(&self, snapshot: &OrderSnapshot, key: &Term) -> Lookup {
        match self.in_snapshot(snapshot, key) {
            Some(version) => self.read_at_order(key, version),
            None => Lookup::Absent,
        }
    }
}
