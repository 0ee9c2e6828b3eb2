//! Published storage events
//!
//! When a storage handle is configured with a publish sink, every write and
//! every table drop emits one event tagged with the operation, the logical
//! key/value, and the outcome. Delivery is best-effort: a full or closed
//! sink loses events without affecting the write itself. Events are ordered
//! with respect to writes flowing through the same facade, and unordered
//! with respect to anything else.

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tessera_core::{Stored, Term, Version};
use tessera_tables::TxResult;

/// Outcome tag carried by every published event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The operation committed (or the table dropped).
    Ok,
    /// The operation failed; the reason is carried verbatim.
    Failed(String),
}

impl Outcome {
    /// Outcome of a transactional result.
    pub fn of<T>(result: &TxResult<T>) -> Outcome {
        match result {
            TxResult::Committed(_) => Outcome::Ok,
            TxResult::Aborted(reason) => Outcome::Failed(reason.clone()),
        }
    }

    /// True for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// An event published after a storage operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageEvent {
    /// A versioned write (`put` or `delete_key`; deletes carry the
    /// tombstone).
    Put {
        /// Logical key.
        key: Term,
        /// Written slot.
        value: Stored,
        /// Transaction outcome.
        outcome: Outcome,
    },
    /// A forced write at an explicit version.
    WriteAt {
        /// Logical key.
        key: Term,
        /// Written slot.
        value: Stored,
        /// The forced version.
        version: Version,
        /// Transaction outcome.
        outcome: Outcome,
    },
    /// The qualified table was dropped.
    DeletedQualified {
        /// Drop outcome.
        outcome: Outcome,
    },
    /// The order table was dropped.
    DeletedOrdering {
        /// Drop outcome.
        outcome: Outcome,
    },
    /// The commitments table was dropped.
    DeletedCommitments {
        /// Drop outcome.
        outcome: Outcome,
    },
}

/// An injected, addressed publish topic.
///
/// The engine only ever casts into it; nothing is awaited.
pub trait EventSink: Send + Sync {
    /// Deliver one event, best-effort.
    fn cast(&self, event: StorageEvent);
}

/// An [`EventSink`] backed by an mpsc channel, for tests and embedding.
pub struct ChannelSink {
    tx: Sender<StorageEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver draining it.
    pub fn pair() -> (ChannelSink, Receiver<StorageEvent>) {
        let (tx, rx) = channel();
        (ChannelSink { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn cast(&self, event: StorageEvent) {
        // Best-effort: a dropped receiver just discards events.
        let _ = self.tx.send(event);
    }
}
