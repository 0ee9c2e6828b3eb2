//! Per-key version counter
//!
//! Every write to a key advances its version by one; the order table records
//! the latest version and the qualified table keeps one immutable row per
//! `(version, key)` coordinate. Version 0 is reserved: it never names a
//! written row, terminates the qualified-key tail, and is rejected by the
//! blocking reader.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::term::Term;

/// A positive, per-key monotonic version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The first version assigned to a key.
    pub const FIRST: Version = Version(1);

    /// Construct a version; returns `None` for the reserved value 0.
    pub fn new(n: u64) -> Option<Version> {
        if n == 0 {
            None
        } else {
            Some(Version(n))
        }
    }

    /// Numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The successor version.
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }

    /// Version as a `Nat` atom, as stored in the order table.
    pub fn to_term(self) -> Term {
        Term::Nat(self.0)
    }

    /// Parse a version from a `Nat` atom. `None` for 0 or non-numeric terms.
    pub fn from_term(term: &Term) -> Option<Version> {
        term.as_nat().and_then(Version::new)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
