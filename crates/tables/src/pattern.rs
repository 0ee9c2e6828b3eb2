//! Select patterns
//!
//! A select walks every row of one table and keeps those whose key matches
//! the pattern. The only structured pattern the engine needs is the
//! element-wise list prefix: position `i` of the key must equal element `i`
//! of the prefix. Atoms therefore never match a non-empty prefix.

use tessera_core::Term;

/// A row filter for [`select`](crate::Txn::select).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Match every row.
    All,
    /// Match rows whose key is a list beginning with these elements.
    KeyPrefix(Vec<Term>),
}

impl Pattern {
    /// Match every row.
    pub fn all() -> Pattern {
        Pattern::All
    }

    /// Match rows by element-wise list prefix.
    pub fn key_prefix(elems: Vec<Term>) -> Pattern {
        Pattern::KeyPrefix(elems)
    }

    /// Does `key` satisfy this pattern?
    pub fn matches(&self, key: &Term) -> bool {
        match self {
            Pattern::All => true,
            Pattern::KeyPrefix(elems) => key.has_prefix(elems),
        }
    }
}
