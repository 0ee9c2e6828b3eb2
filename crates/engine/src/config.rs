//! Storage configuration
//!
//! A storage handle is described by its three table names, an optional
//! namespace, and an optional publish sink. The builder mirrors the usual
//! open flow: configure, then `open` against an injected table backend.
//! Opening ensures the tables exist (idempotently), so a fresh backend and a
//! re-opened one behave alike.

use std::sync::Arc;

use tessera_core::Namespace;
use tessera_tables::Tables;

use crate::events::EventSink;
use crate::store::Storage;

/// Table names and namespace for one storage handle.
///
/// Handles with the same table names share physical state; their namespaces
/// are the only isolation between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Name of the order table (`namespaced_key → latest version`).
    pub order_table: String,
    /// Name of the qualified table (`[version, key | 0] → value`).
    pub qualified_table: String,
    /// Name of the commitments table backing the accumulator.
    pub commitments_table: String,
    /// Prefix multiplexing this handle's keys into the shared tables.
    pub namespace: Namespace,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            order_table: "ordering".to_string(),
            qualified_table: "qualified".to_string(),
            commitments_table: "commitments".to_string(),
            namespace: Namespace::empty(),
        }
    }
}

/// Builder for a [`Storage`] handle.
pub struct StorageBuilder {
    config: StorageConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl StorageBuilder {
    /// Start from the default configuration.
    pub fn new() -> StorageBuilder {
        StorageBuilder {
            config: StorageConfig::default(),
            sink: None,
        }
    }

    /// Set the order table name.
    pub fn order_table(mut self, name: impl Into<String>) -> Self {
        self.config.order_table = name.into();
        self
    }

    /// Set the qualified table name.
    pub fn qualified_table(mut self, name: impl Into<String>) -> Self {
        self.config.qualified_table = name.into();
        self
    }

    /// Set the commitments table name.
    pub fn commitments_table(mut self, name: impl Into<String>) -> Self {
        self.config.commitments_table = name.into();
        self
    }

    /// Prefix all three table names, e.g. `node1` → `node1_qualified`.
    pub fn table_prefix(self, prefix: &str) -> Self {
        let defaults = StorageConfig::default();
        self.order_table(format!("{}_{}", prefix, defaults.order_table))
            .qualified_table(format!("{}_{}", prefix, defaults.qualified_table))
            .commitments_table(format!("{}_{}", prefix, defaults.commitments_table))
    }

    /// Set the namespace prefix.
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.config.namespace = namespace;
        self
    }

    /// Configure the publish topic.
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Open a storage handle over the given backend, ensuring the tables
    /// exist.
    pub fn open<T: Tables>(self, tables: Arc<T>) -> Storage<T> {
        Storage::open(tables, self.config, self.sink)
    }
}

impl Default for StorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
