//! Stored slots and lookup results
//!
//! `Stored` is what a qualified-table row holds: a user term or the
//! tombstone recording a logical deletion. The tombstone is a dedicated enum
//! variant rather than a magic term, so it can never collide with a legal
//! user value.
//!
//! `Lookup` is what readers hand back: the current term, or absence. Absence
//! covers three cases that callers do not distinguish: the key was never
//! written, its latest version is a tombstone, or a read-side transaction
//! aborted (the conservative degradation).

use serde::{Deserialize, Serialize};

use crate::term::Term;

/// The value slot of a table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stored {
    /// A user value.
    Term(Term),
    /// Logical deletion marker. Advances the version like any other write.
    Tombstone,
}

impl Stored {
    /// True for the tombstone.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Stored::Tombstone)
    }

    /// The user term, if this slot holds one.
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Stored::Term(t) => Some(t),
            Stored::Tombstone => None,
        }
    }

    /// Collapse into a read result: tombstones read as absent.
    pub fn into_lookup(self) -> Lookup {
        match self {
            Stored::Term(t) => Lookup::Present(t),
            Stored::Tombstone => Lookup::Absent,
        }
    }
}

impl From<Term> for Stored {
    fn from(t: Term) -> Stored {
        Stored::Term(t)
    }
}

/// Result of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup {
    /// The key resolves to this term.
    Present(Term),
    /// No value: never written, tombstoned, or the read aborted.
    Absent,
}

impl Lookup {
    /// True if a value is present.
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    /// True if no value is present.
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<Term> {
        match self {
            Lookup::Present(t) => Some(t),
            Lookup::Absent => None,
        }
    }
}

impl From<Option<Term>> for Lookup {
    fn from(opt: Option<Term>) -> Lookup {
        match opt {
            Some(t) => Lookup::Present(t),
            None => Lookup::Absent,
        }
    }
}
