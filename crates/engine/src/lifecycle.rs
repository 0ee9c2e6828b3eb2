//! Table lifecycle: setup, remove, ensure-new
//!
//! Each table is handled independently: one failing does not stop the
//! others, and per-table outcomes are reported rather than raised. A table
//! that already exists counts as a successful setup, which is what makes
//! `setup` (and therefore opening a handle) idempotent. `remove` publishes a
//! deletion event per table when a sink is configured.

use tessera_core::Error;
use tessera_tables::Tables;

use crate::events::{Outcome, StorageEvent};
use crate::store::Storage;

/// Per-table outcomes of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Outcome for the qualified table.
    pub qualified: Outcome,
    /// Outcome for the order table.
    pub order: Outcome,
    /// Outcome for the commitments table.
    pub commitments: Outcome,
}

impl TableReport {
    /// True if every table succeeded.
    pub fn all_ok(&self) -> bool {
        self.qualified.is_ok() && self.order.is_ok() && self.commitments.is_ok()
    }
}

impl<T: Tables> Storage<T> {
    /// Create the three tables. Existing tables count as success; other
    /// failures are reported per table and do not stop the rest.
    pub fn setup(&self) -> TableReport {
        let report = TableReport {
            qualified: self.create_outcome(self.qualified()),
            order: self.create_outcome(self.order()),
            commitments: self.create_outcome(&self.config().commitments_table),
        };
        tracing::debug!(ok = report.all_ok(), "storage setup");
        report
    }

    fn create_outcome(&self, name: &str) -> Outcome {
        match self.tables().create_table(name) {
            Ok(()) | Err(Error::TableExists(_)) => Outcome::Ok,
            Err(e) => {
                tracing::warn!(table = name, error = %e, "table creation failed");
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// Drop the three tables, publishing one deletion event per table.
    pub fn remove(&self) -> TableReport {
        let qualified = self.drop_outcome(self.qualified());
        self.publish(StorageEvent::DeletedQualified {
            outcome: qualified.clone(),
        });
        let order = self.drop_outcome(self.order());
        self.publish(StorageEvent::DeletedOrdering {
            outcome: order.clone(),
        });
        let commitments = self.drop_outcome(&self.config().commitments_table);
        self.publish(StorageEvent::DeletedCommitments {
            outcome: commitments.clone(),
        });
        TableReport {
            qualified,
            order,
            commitments,
        }
    }

    fn drop_outcome(&self, name: &str) -> Outcome {
        match self.tables().delete_table(name) {
            Ok(()) => Outcome::Ok,
            Err(e) => {
                tracing::warn!(table = name, error = %e, "table drop failed");
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// Drop and recreate the tables. Idempotent: the result is always three
    /// fresh, empty tables.
    pub fn ensure_new(&self) -> TableReport {
        self.remove();
        self.setup()
    }
}
