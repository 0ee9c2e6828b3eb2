//! The storage handle: versioned writes and reads
//!
//! A `Storage` owns nothing exclusively — all state lives in the injected
//! table backend, so any number of handles (with equal or distinct
//! namespaces) may point at the same tables.
//!
//! Every write advances the key's version and publishes under both tables in
//! one transaction:
//! - order table: `namespaced_key → new version`
//! - qualified table: `[new version, namespaced_key | 0] → value`
//!
//! Reads resolve the latest version through the order table and then the
//! value at that coordinate. Failed read transactions degrade to absence;
//! failed writes report their outcome on the publish topic and are never
//! retried here.

use std::sync::Arc;

use tessera_core::{qualified, Error, Lookup, Result, Stored, Term, Version};
use tessera_tables::{Pattern, Tables, TxResult, Txn};

use crate::config::StorageConfig;
use crate::events::{EventSink, Outcome, StorageEvent};

/// Handle to one logical storage over a shared table backend.
pub struct Storage<T: Tables> {
    tables: Arc<T>,
    config: StorageConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl<T: Tables> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Storage {
            tables: Arc::clone(&self.tables),
            config: self.config.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<T: Tables> Storage<T> {
    /// Open a handle, idempotently ensuring the three tables exist.
    pub fn open(
        tables: Arc<T>,
        config: StorageConfig,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Storage<T> {
        let storage = Storage {
            tables,
            config,
            sink,
        };
        let report = storage.setup();
        if !report.all_ok() {
            tracing::warn!(?report, "storage opened with missing tables");
        }
        storage
    }

    /// The configuration this handle was opened with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The injected table backend.
    pub fn tables(&self) -> &Arc<T> {
        &self.tables
    }

    pub(crate) fn order(&self) -> &str {
        &self.config.order_table
    }

    pub(crate) fn qualified(&self) -> &str {
        &self.config.qualified_table
    }

    pub(crate) fn publish(&self, event: StorageEvent) {
        if let Some(sink) = &self.sink {
            sink.cast(event);
        }
    }

    // =========================================================================
    // Versioning core
    // =========================================================================

    /// Write `value` at the key's next version.
    pub fn put(&self, key: &Term, value: Term) -> TxResult<Version> {
        self.put_stored(key, Stored::Term(value))
    }

    /// Logically delete: a new version holding the tombstone.
    pub fn delete(&self, key: &Term) -> TxResult<Version> {
        self.put_stored(key, Stored::Tombstone)
    }

    fn put_stored(&self, key: &Term, value: Stored) -> TxResult<Version> {
        let nskey = self.config.namespace.apply(key);
        let result = self.tables.transaction(|txn| {
            let new = match self.latest_version(txn, &nskey)? {
                Some(current) => current.next(),
                None => Version::FIRST,
            };
            txn.write(self.order(), nskey.clone(), Stored::Term(new.to_term()))?;
            txn.write(
                self.qualified(),
                qualified::qualify(new, nskey.clone()),
                value.clone(),
            )?;
            Ok(new)
        });
        self.publish(StorageEvent::Put {
            key: key.clone(),
            value,
            outcome: Outcome::of(&result),
        });
        result
    }

    /// Write both rows at an explicit version, without read-then-increment.
    ///
    /// Intended for replays. Passing versions that are not strictly
    /// increasing per key breaks the order-table invariant; that discipline
    /// is the caller's.
    pub fn write_at_order(&self, key: &Term, value: Term, version: Version) -> TxResult<()> {
        let nskey = self.config.namespace.apply(key);
        let stored = Stored::Term(value);
        let result = self.tables.transaction(|txn| {
            txn.write(self.order(), nskey.clone(), Stored::Term(version.to_term()))?;
            txn.write(
                self.qualified(),
                qualified::qualify(version, nskey.clone()),
                stored.clone(),
            )?;
            Ok(())
        });
        self.publish(StorageEvent::WriteAt {
            key: key.clone(),
            value: stored,
            version,
            outcome: Outcome::of(&result),
        });
        result
    }

    // =========================================================================
    // Reader
    // =========================================================================

    /// The latest version recorded for a physical key, if any.
    fn latest_version(&self, txn: &mut Txn, nskey: &Term) -> Result<Option<Version>> {
        match txn.read(self.order(), nskey)? {
            None => Ok(None),
            Some(Stored::Term(t)) => match Version::from_term(&t) {
                Some(v) => Ok(Some(v)),
                None => Err(Error::Corruption(format!(
                    "order row for {} holds {}, not a version",
                    nskey, t
                ))),
            },
            Some(Stored::Tombstone) => Err(Error::Corruption(format!(
                "order row for {} holds a tombstone",
                nskey
            ))),
        }
    }

    /// Current value of a physical key inside an open transaction.
    fn current_in(&self, txn: &mut Txn, nskey: &Term) -> Result<Lookup> {
        let version = match self.latest_version(txn, nskey)? {
            Some(v) => v,
            None => return Ok(Lookup::Absent),
        };
        match txn.read(self.qualified(), &qualified::qualify(version, nskey.clone()))? {
            Some(slot) => Ok(slot.into_lookup()),
            None => Ok(Lookup::Absent),
        }
    }

    /// Current value of a key. Absent when never written, tombstoned, or the
    /// read transaction aborted.
    pub fn get(&self, key: &Term) -> Lookup {
        let nskey = self.config.namespace.apply(key);
        match self.tables.transaction(|txn| self.current_in(txn, &nskey)) {
            TxResult::Committed(lookup) => lookup,
            TxResult::Aborted(reason) => {
                tracing::debug!(key = %key, reason = %reason, "get degraded to absent");
                Lookup::Absent
            }
        }
    }

    /// The value written at an explicit `(key, version)` coordinate.
    pub fn read_at_order(&self, key: &Term, version: Version) -> Lookup {
        let nskey = self.config.namespace.apply(key);
        let target = qualified::qualify(version, nskey);
        let result = self
            .tables
            .transaction(|txn| txn.read(self.qualified(), &target));
        match result {
            TxResult::Committed(Some(slot)) => slot.into_lookup(),
            TxResult::Committed(None) => Lookup::Absent,
            TxResult::Aborted(reason) => {
                tracing::debug!(key = %key, %version, reason = %reason, "read_at_order degraded to absent");
                Lookup::Absent
            }
        }
    }

    /// Transactional form of the order lookup: the raw order rows for a key
    /// (zero or one), key denamespaced.
    pub fn read_order_rows(&self, key: &Term) -> TxResult<Vec<(Term, Version)>> {
        let nskey = self.config.namespace.apply(key);
        let key = key.clone();
        self.tables.transaction(|txn| {
            Ok(self
                .latest_version(txn, &nskey)?
                .map(|version| (key.clone(), version))
                .into_iter()
                .collect())
        })
    }

    /// Transactional form of the qualified lookup: the raw qualified rows at
    /// a `(key, version)` coordinate (zero or one), key denamespaced.
    pub fn read_at_order_rows(
        &self,
        key: &Term,
        version: Version,
    ) -> TxResult<Vec<(Term, Stored)>> {
        let nskey = self.config.namespace.apply(key);
        let target = qualified::qualify(version, nskey);
        let row_key = qualified::qualify(version, key.clone());
        self.tables.transaction(|txn| {
            Ok(txn
                .read(self.qualified(), &target)?
                .map(|slot| (row_key.clone(), slot))
                .into_iter()
                .collect())
        })
    }

    /// Materialize every key under `namespace ++ prefix` with its current
    /// value, all inside one transaction.
    ///
    /// All-or-nothing: if any matched key currently reads absent (tombstoned
    /// or missing), the whole call returns `None` — callers use this to load
    /// a coherent working set and are not prepared for partial absence.
    pub fn get_keyspace(&self, prefix: &[Term]) -> Option<Vec<(Term, Term)>> {
        let pattern = Pattern::key_prefix(self.config.namespace.scan_prefix(prefix));
        let result = self.tables.transaction(|txn| {
            let rows = txn.select(self.order(), &pattern)?;
            let mut out = Vec::with_capacity(rows.len());
            for (nskey, _) in rows {
                match self.current_in(txn, &nskey)? {
                    Lookup::Present(value) => {
                        out.push((self.config.namespace.strip(&nskey)?, value));
                    }
                    Lookup::Absent => return Ok(None),
                }
            }
            Ok(Some(out))
        });
        match result {
            TxResult::Committed(keyspace) => keyspace,
            TxResult::Aborted(reason) => {
                tracing::debug!(reason = %reason, "get_keyspace degraded to absent");
                None
            }
        }
    }
}
