//! Error types for the tessera storage engine
//!
//! One unified `Error` enum is used across all crates, with `thiserror` for
//! `Display`/`Error` derivation.
//!
//! Categories:
//! - **Transaction**: `TxAborted` (conflict; surfaced to callers unchanged)
//! - **Rejection**: `BadVersion`, `BadShape` (blocking-read input checks)
//! - **Namespace**: prefix mismatch while stripping a physical key
//! - **Table**: missing or duplicate tables, backend failures
//! - **Data**: corruption, serialization
//!
//! Absence is not an error: reads return the `Lookup::Absent` value instead.

use thiserror::Error;

/// Result type alias for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the storage engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction aborted due to a conflict. Callers retry by re-invoking;
    /// no layer of the engine retries on its own.
    #[error("transaction aborted: {reason}")]
    TxAborted {
        /// Why the transaction aborted.
        reason: String,
    },

    /// A blocking read named version 0, which is reserved.
    #[error("blocking read rejected: version 0 is reserved")]
    BadVersion,

    /// A blocking read passed a term that is not a `[version, key | 0]` cell.
    #[error("malformed qualified key: {found}")]
    BadShape {
        /// Rendering of the offending term.
        found: String,
    },

    /// A physical key did not carry the expected namespace prefix.
    ///
    /// Unreachable as long as the tables are touched only through this layer.
    #[error("namespace mismatch on {found}: expected prefix {expected}")]
    Namespace {
        /// Rendering of the expected prefix.
        expected: String,
        /// Rendering of the key that failed to strip.
        found: String,
    },

    /// The named table does not exist.
    #[error("no such table: {0:?}")]
    NoSuchTable(String),

    /// The named table already exists.
    #[error("table already exists: {0:?}")]
    TableExists(String),

    /// A stored row violated the engine's schema (e.g. a non-numeric order
    /// row).
    #[error("corrupt row: {0}")]
    Corruption(String),

    /// Term encoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A channel peer (facade worker or write subscription) went away.
    #[error("{0} disconnected")]
    Disconnected(&'static str),

    /// The commitment tree has no free leaf index left.
    #[error("commitment tree is full ({max} leaves)")]
    TreeFull {
        /// Leaf capacity of the tree.
        max: u64,
    },
}

impl Error {
    /// Construct a `TxAborted` error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Error::TxAborted {
            reason: reason.into(),
        }
    }

    /// True for errors that may succeed on retry (`TxAborted`).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TxAborted { .. })
    }

    /// True for blocking-read input rejections (`BadVersion`, `BadShape`).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::BadVersion | Error::BadShape { .. })
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
