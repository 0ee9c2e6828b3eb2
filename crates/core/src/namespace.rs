//! Namespace codec
//!
//! A namespace is an ordered list of binary atoms prepended, element by
//! element, to a logical key to form the physical key stored in the tables.
//! Multiple storage handles with distinct namespaces can share the same
//! physical tables because their prefixes disambiguate every row.
//!
//! The codec has two total operations and their inverses:
//! - `apply` prepends the namespace (list concatenation at the head,
//!   preserving improper tails).
//! - `strip` removes the exact prefix element-for-element and fails with
//!   `Error::Namespace` on any mismatch.
//!
//! For qualified keys `[version, key | tail]` only the middle `key` element
//! is transformed; the head version and the improper tail pass through
//! unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::term::Term;

/// An ordered list of binary atoms scoping a logical storage.
///
/// The empty namespace is the identity codec: keys pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(Vec<Term>);

impl Namespace {
    /// The empty namespace.
    pub fn empty() -> Namespace {
        Namespace(Vec::new())
    }

    /// Construct a namespace from prefix elements.
    pub fn new(elems: Vec<Term>) -> Namespace {
        Namespace(elems)
    }

    /// Convenience constructor from text labels.
    pub fn of(labels: &[&str]) -> Namespace {
        Namespace(labels.iter().map(|l| Term::text(l)).collect())
    }

    /// True if this is the empty namespace.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The prefix elements.
    pub fn elems(&self) -> &[Term] {
        &self.0
    }

    /// Prefix of a keyspace scan: the namespace elements followed by the
    /// caller's prefix elements.
    pub fn scan_prefix(&self, prefix: &[Term]) -> Vec<Term> {
        let mut combined = self.0.clone();
        combined.extend_from_slice(prefix);
        combined
    }

    /// Prepend the namespace to a logical key.
    ///
    /// The key may be an atom, a proper list, or an improper list; its shape
    /// is preserved under the new prefix.
    pub fn apply(&self, key: &Term) -> Term {
        Term::improper(self.0.iter().cloned(), key.clone())
    }

    /// Strip the namespace from a physical key, recovering the logical key.
    pub fn strip(&self, nskey: &Term) -> Result<Term> {
        match nskey.strip_prefix(&self.0) {
            Some(rest) => Ok(rest.clone()),
            None => Err(Error::Namespace {
                expected: Term::list(self.0.iter().cloned()).to_string(),
                found: nskey.to_string(),
            }),
        }
    }

    /// Prepend the namespace to the key element of `[version, key | tail]`.
    ///
    /// The head and the improper tail are preserved verbatim.
    pub fn apply_qualified(&self, qkey: &Term) -> Result<Term> {
        let (version, key, tail) = split_qualified(qkey)?;
        Ok(Term::cell(
            version.clone(),
            Term::cell(self.apply(key), tail.clone()),
        ))
    }

    /// Strip the namespace from the key element of `[version, key | tail]`.
    pub fn strip_qualified(&self, qkey: &Term) -> Result<Term> {
        let (version, key, tail) = split_qualified(qkey)?;
        Ok(Term::cell(
            version.clone(),
            Term::cell(self.strip(key)?, tail.clone()),
        ))
    }
}

/// Split `[version, key | tail]` into its three parts.
fn split_qualified(qkey: &Term) -> Result<(&Term, &Term, &Term)> {
    if let Some((version, rest)) = qkey.as_cell() {
        if let Some((key, tail)) = rest.as_cell() {
            return Ok((version, key, tail));
        }
    }
    Err(Error::BadShape {
        found: qkey.to_string(),
    })
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Term::list(self.0.iter().cloned()))
    }
}
