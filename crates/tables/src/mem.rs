//! In-memory table backend
//!
//! `BTreeMap` tables behind a `parking_lot::RwLock`, a global commit tick,
//! and a commit lock serializing validate-then-apply. Snapshots clone the
//! table set under the read lock; commits validate the transaction's read
//! set against current row ticks (first committer wins) and apply all writes
//! under a single write-lock acquisition, so no snapshot observes a partial
//! transaction.
//!
//! Write events are dispatched after the rows are applied, still under the
//! commit lock, so subscribers observe events in commit order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tessera_core::{Error, Result, Term};
use uuid::Uuid;

use crate::snapshot::{Row, TableSnapshot};
use crate::subscribe::{Subscription, TableEvent};
use crate::traits::Tables;
use crate::txn::Txn;

type SubscriberList = Vec<(Uuid, Sender<TableEvent>)>;

/// In-memory implementation of [`Tables`].
pub struct MemTables {
    data: RwLock<BTreeMap<String, BTreeMap<Term, Row>>>,
    tick: AtomicU64,
    registry: Arc<DashMap<String, SubscriberList>>,
    commit_lock: Mutex<()>,
}

impl MemTables {
    /// Create an empty backend with no tables.
    pub fn new() -> MemTables {
        MemTables {
            data: RwLock::new(BTreeMap::new()),
            tick: AtomicU64::new(0),
            registry: Arc::new(DashMap::new()),
            commit_lock: Mutex::new(()),
        }
    }

    /// The latest committed tick.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    fn dispatch(&self, events: Vec<TableEvent>) {
        for event in events {
            let TableEvent::Write { table, .. } = &event;
            if let Some(mut subs) = self.registry.get_mut(table) {
                // A send failure means the subscription was dropped; prune it.
                subs.retain(|(_, tx)| tx.send(event.clone()).is_ok());
            }
        }
    }
}

impl Default for MemTables {
    fn default() -> Self {
        Self::new()
    }
}

impl Tables for MemTables {
    fn create_table(&self, name: &str) -> Result<()> {
        let mut data = self.data.write();
        if data.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        data.insert(name.to_string(), BTreeMap::new());
        tracing::debug!(table = name, "table created");
        Ok(())
    }

    fn delete_table(&self, name: &str) -> Result<()> {
        let mut data = self.data.write();
        if data.remove(name).is_none() {
            return Err(Error::NoSuchTable(name.to_string()));
        }
        tracing::debug!(table = name, "table dropped");
        Ok(())
    }

    fn table_exists(&self, name: &str) -> bool {
        self.data.read().contains_key(name)
    }

    fn snapshot(&self) -> TableSnapshot {
        // Tick must be read while holding the data lock: otherwise a commit
        // could apply rows stamped with a tick this snapshot claims not to
        // cover.
        let data = self.data.read();
        let tick = self.tick.load(Ordering::SeqCst);
        TableSnapshot::new(tick, data.clone())
    }

    fn commit(&self, txn: Txn) -> Result<u64> {
        let _serialize = self.commit_lock.lock();

        if txn.is_read_only() {
            // Snapshot reads were already consistent; nothing to validate or
            // apply.
            return Ok(txn.snapshot_tick());
        }

        let (read_set, writes) = txn.into_parts();
        let mut data = self.data.write();

        for ((table, key), seen) in &read_set {
            let current = data
                .get(table)
                .and_then(|rows| rows.get(key))
                .map(|row| row.tick)
                .unwrap_or(0);
            if current != *seen {
                tracing::debug!(table = %table, key = %key, seen, current, "commit aborted on conflict");
                return Err(Error::aborted(format!(
                    "row {} in {:?} changed (tick {} -> {})",
                    key, table, seen, current
                )));
            }
        }
        for (table, _, _) in &writes {
            if !data.contains_key(table) {
                return Err(Error::aborted(format!("table {:?} dropped", table)));
            }
        }

        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        let mut events = Vec::with_capacity(writes.len());
        for (table, key, value) in writes {
            events.push(TableEvent::Write {
                table: table.clone(),
                key: key.clone(),
                value: value.clone(),
            });
            data.get_mut(&table)
                .expect("write table checked above")
                .insert(key, Row { value, tick });
        }
        drop(data);

        // Still under the commit lock: events leave in commit order.
        self.dispatch(events);
        Ok(tick)
    }

    fn subscribe(&self, table: &str) -> Subscription {
        let (tx, rx) = channel();
        let id = Uuid::new_v4();
        self.registry
            .entry(table.to_string())
            .or_default()
            .push((id, tx));

        let registry = Arc::clone(&self.registry);
        let table = table.to_string();
        Subscription::new(
            rx,
            Box::new(move || {
                if let Some(mut subs) = registry.get_mut(&table) {
                    subs.retain(|(sid, _)| *sid != id);
                }
            }),
        )
    }
}
