//! Qualified keys: `[version, key | 0]`
//!
//! The qualified table keys every written value by its version coordinate.
//! The key is an improper list whose head is the version atom, whose second
//! element is the (namespaced) key, and whose tail is the reserved atom 0.

use crate::error::{Error, Result};
use crate::term::Term;
use crate::version::Version;

/// A parsed `[version, key | 0]` qualified key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedKey {
    /// The version coordinate.
    pub version: Version,
    /// The key element (logical or namespaced, depending on provenance).
    pub key: Term,
}

impl QualifiedKey {
    /// Render back into the `[version, key | 0]` term form.
    pub fn to_term(&self) -> Term {
        qualify(self.version, self.key.clone())
    }
}

/// Build the qualified key `[version, key | 0]`.
pub fn qualify(version: Version, key: Term) -> Term {
    Term::cell(version.to_term(), Term::cell(key, Term::nil()))
}

/// Parse a qualified key, enforcing the blocking-read rejections.
///
/// - A version atom of 0 is `Error::BadVersion`.
/// - Anything that is not `[nat, key | 0]` is `Error::BadShape`.
pub fn parse(qkey: &Term) -> Result<QualifiedKey> {
    let bad_shape = || Error::BadShape {
        found: qkey.to_string(),
    };

    let (head, rest) = qkey.as_cell().ok_or_else(bad_shape)?;
    let raw = head.as_nat().ok_or_else(bad_shape)?;
    if raw == 0 {
        return Err(Error::BadVersion);
    }
    let (key, tail) = rest.as_cell().ok_or_else(bad_shape)?;
    if tail != &Term::nil() {
        return Err(bad_shape());
    }
    Ok(QualifiedKey {
        // raw is nonzero here
        version: Version::new(raw).ok_or_else(bad_shape)?,
        key: key.clone(),
    })
}
