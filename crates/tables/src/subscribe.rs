//! Write-event subscriptions
//!
//! A *simple* subscription delivers one event per committed row write to the
//! subscribed table. Events are dispatched after the writes are applied and
//! in commit order, which is the ordering the blocking reader relies on:
//! subscribe first, then read — a write committed before the read is seen by
//! the read, a write committed after it produces an event.
//!
//! Dropping a `Subscription` unsubscribes, so an abandoned waiter never
//! leaks its registration. Events sent to a dropped subscription are
//! discarded.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use tessera_core::{Error, Result, Stored, Term};

/// A write notification from the table backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// One committed row write.
    Write {
        /// Table the row belongs to.
        table: String,
        /// Physical (namespaced) row key.
        key: Term,
        /// The written slot.
        value: Stored,
    },
}

impl TableEvent {
    /// The row key of this event.
    pub fn key(&self) -> &Term {
        match self {
            TableEvent::Write { key, .. } => key,
        }
    }
}

/// A live registration on a table's write stream.
pub struct Subscription {
    rx: Receiver<TableEvent>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Assemble a subscription from a receiver and an unsubscribe hook.
    ///
    /// Backends call this; consumers obtain subscriptions from
    /// [`Tables::subscribe`](crate::Tables::subscribe).
    pub fn new(rx: Receiver<TableEvent>, cancel: Box<dyn FnOnce() + Send>) -> Subscription {
        Subscription {
            rx,
            cancel: Some(cancel),
        }
    }

    /// Block until the next event arrives.
    pub fn recv(&self) -> Result<TableEvent> {
        self.rx
            .recv()
            .map_err(|_| Error::Disconnected("write subscription"))
    }

    /// Block for at most `timeout`; `Ok(None)` on expiry.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<TableEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Disconnected("write subscription")),
        }
    }

    /// Drain one pending event without blocking.
    pub fn try_recv(&self) -> Result<Option<TableEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::Disconnected("write subscription")),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Arc;

    #[test]
    fn test_recv_delivers_events() {
        let (tx, rx) = channel();
        let sub = Subscription::new(rx, Box::new(|| {}));
        tx.send(TableEvent::Write {
            table: "t".to_string(),
            key: Term::text("k"),
            value: Stored::Term(Term::nat(1)),
        })
        .unwrap();
        let event = sub.recv().unwrap();
        assert_eq!(event.key(), &Term::text("k"));
    }

    #[test]
    fn test_drop_runs_cancel_hook() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (_tx, rx) = channel();
        let sub = Subscription::new(rx, Box::new(move || flag.store(true, Ordering::SeqCst)));
        drop(sub);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_disconnected_sender_is_an_error() {
        let (tx, rx) = channel::<TableEvent>();
        drop(tx);
        let sub = Subscription::new(rx, Box::new(|| {}));
        assert!(matches!(sub.recv(), Err(Error::Disconnected(_))));
    }

    #[test]
    fn test_try_recv_empty() {
        let (_tx, rx) = channel::<TableEvent>();
        let sub = Subscription::new(rx, Box::new(|| {}));
        assert!(sub.try_recv().unwrap().is_none());
    }
}
