//! Blocking reads
//!
//! `blocking_read` takes an explicit qualified key `[version, key | 0]` and
//! either returns the value at that coordinate or parks until it is written.
//!
//! The protocol is subscribe-first, read-second:
//! 1. register on the qualified table's write stream,
//! 2. transactionally read the row,
//! 3. if absent, wait for the event carrying the exact namespaced key.
//!
//! A write committed before step 2 is observed by the read; one committed
//! after step 1 produces an event the waiter receives. No wakeup can be
//! lost. There is no timeout here — cancellation belongs to the caller, and
//! dropping out of the wait drops the subscription with it, so an abandoned
//! waiter leaks nothing.

use tessera_core::{qualified, Lookup, Result, Term};
use tessera_tables::{TableEvent, Tables};

use crate::store::Storage;

impl<T: Tables> Storage<T> {
    /// Return the value at a qualified coordinate, blocking until it is
    /// written.
    ///
    /// Rejects immediately with [`Error::BadVersion`](tessera_core::Error)
    /// for version 0 and [`Error::BadShape`](tessera_core::Error) for a term
    /// that is not `[version, key | 0]`. A tombstone at the coordinate
    /// resolves the wait and reads as [`Lookup::Absent`].
    pub fn blocking_read(&self, qkey: &Term) -> Result<Lookup> {
        let parsed = qualified::parse(qkey)?;
        let nskey = self.config().namespace.apply(&parsed.key);
        let target = qualified::qualify(parsed.version, nskey);

        // Subscribe before checking presence: this ordering is the whole
        // correctness argument, see the module docs.
        let subscription = self.tables().subscribe(self.qualified());

        let existing = self
            .tables()
            .transaction(|txn| txn.read(self.qualified(), &target))
            .committed()?;
        if let Some(slot) = existing {
            return Ok(slot.into_lookup());
        }

        tracing::debug!(target = %target, "blocking read parked");
        loop {
            let event = subscription.recv()?;
            if event.key() == &target {
                let TableEvent::Write { value, .. } = event;
                return Ok(value.into_lookup());
            }
        }
    }
}
