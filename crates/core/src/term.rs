//! The `Term` type: keys and values of the storage engine
//!
//! A term is a tagged sum of atoms and cells:
//! - `Nat`: a natural-number atom
//! - `Bytes`: a binary atom
//! - `Cell`: an ordered pair of terms
//!
//! Lists are encoded as right-nested cells. A *proper* list terminates in the
//! nil atom `Nat(0)`; an *improper* list terminates in any other atom. Both
//! shapes occur as keys, and every list operation in this crate preserves the
//! terminating tail verbatim.
//!
//! Equality is structural and the derived `Ord` gives a total order
//! (`Nat < Bytes < Cell`, atoms by value, cells head-then-tail), which makes
//! terms usable as `BTreeMap` keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// An opaque, orderable, structurally-compared term.
///
/// Keys, values, namespaces, and versions all travel through the engine as
/// terms. See the module docs for the list conventions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Natural-number atom. `Nat(0)` doubles as the nil list terminator.
    Nat(u64),
    /// Binary atom.
    Bytes(Vec<u8>),
    /// An ordered pair. Right-nested cells encode lists.
    Cell(Box<Term>, Box<Term>),
}

impl Term {
    /// The nil atom, terminating proper lists.
    pub const fn nil() -> Term {
        Term::Nat(0)
    }

    /// Construct a natural-number atom.
    pub const fn nat(n: u64) -> Term {
        Term::Nat(n)
    }

    /// Construct a binary atom.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Term {
        Term::Bytes(b.into())
    }

    /// Construct a binary atom from UTF-8 text.
    pub fn text(s: &str) -> Term {
        Term::Bytes(s.as_bytes().to_vec())
    }

    /// Construct a cell.
    pub fn cell(head: Term, tail: Term) -> Term {
        Term::Cell(Box::new(head), Box::new(tail))
    }

    /// Construct a proper list (terminated by nil).
    pub fn list(items: impl IntoIterator<Item = Term>) -> Term {
        Self::improper(items, Term::nil())
    }

    /// Construct a list with an explicit terminating tail.
    ///
    /// `improper([a, b], t)` yields `[a, b | t]`; a nil tail yields a proper
    /// list.
    pub fn improper(items: impl IntoIterator<Item = Term>, tail: Term) -> Term {
        let items: Vec<Term> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Term::cell(item, acc))
    }

    /// True if this term is an atom (`Nat` or `Bytes`).
    pub fn is_atom(&self) -> bool {
        !matches!(self, Term::Cell(_, _))
    }

    /// True if this term is a cell.
    pub fn is_cell(&self) -> bool {
        matches!(self, Term::Cell(_, _))
    }

    /// Head and tail of a cell, or `None` for atoms.
    pub fn as_cell(&self) -> Option<(&Term, &Term)> {
        match self {
            Term::Cell(head, tail) => Some((head, tail)),
            _ => None,
        }
    }

    /// Numeric value of a `Nat` atom.
    pub fn as_nat(&self) -> Option<u64> {
        match self {
            Term::Nat(n) => Some(*n),
            _ => None,
        }
    }

    /// Contents of a `Bytes` atom.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Term::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Iterate the list elements of this term.
    ///
    /// Walks right-nested cells, yielding each head; stops at the first
    /// non-cell tail (nil or an improper terminator), which is not yielded.
    pub fn elems(&self) -> Elems<'_> {
        Elems { cursor: self }
    }

    /// True if this term is a list beginning with `prefix` element-wise.
    ///
    /// An atom never matches a non-empty prefix; every term matches the empty
    /// prefix.
    pub fn has_prefix(&self, prefix: &[Term]) -> bool {
        self.strip_prefix(prefix).is_some()
    }

    /// Remove `prefix` element-wise, returning the remaining tail.
    ///
    /// The remainder is whatever follows the final matched element: a further
    /// list, an atom, or an improper terminator. Returns `None` on any
    /// mismatch.
    pub fn strip_prefix<'a>(&'a self, prefix: &[Term]) -> Option<&'a Term> {
        let mut cursor = self;
        for expected in prefix {
            match cursor {
                Term::Cell(head, tail) if head.as_ref() == expected => cursor = tail,
                _ => return None,
            }
        }
        Some(cursor)
    }

    /// Canonical byte encoding, used for commitment-tree leaves.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(Error::from)
    }
}

impl From<u64> for Term {
    fn from(n: u64) -> Term {
        Term::Nat(n)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Term {
        Term::text(s)
    }
}

impl From<Vec<u8>> for Term {
    fn from(b: Vec<u8>) -> Term {
        Term::Bytes(b)
    }
}

impl From<&[u8]> for Term {
    fn from(b: &[u8]) -> Term {
        Term::Bytes(b.to_vec())
    }
}

/// Iterator over the list elements of a term. See [`Term::elems`].
pub struct Elems<'a> {
    cursor: &'a Term,
}

impl<'a> Iterator for Elems<'a> {
    type Item = &'a Term;

    fn next(&mut self) -> Option<&'a Term> {
        match self.cursor {
            Term::Cell(head, tail) => {
                self.cursor = tail;
                Some(head)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Nat(n) => write!(f, "{}", n),
            Term::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) if s.chars().all(|c| !c.is_control()) => write!(f, "{:?}", s),
                _ => {
                    write!(f, "0x")?;
                    for byte in b {
                        write!(f, "{:02x}", byte)?;
                    }
                    Ok(())
                }
            },
            Term::Cell(head, tail) => write!(f, "[{} {}]", head, tail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_terminates_in_nil() {
        let l = Term::list([Term::nat(1), Term::nat(2)]);
        assert_eq!(
            l,
            Term::cell(Term::nat(1), Term::cell(Term::nat(2), Term::nil()))
        );
    }

    #[test]
    fn test_improper_preserves_tail() {
        let l = Term::improper([Term::text("a")], Term::nat(7));
        assert_eq!(l, Term::cell(Term::text("a"), Term::nat(7)));
    }

    #[test]
    fn test_empty_list_is_nil() {
        assert_eq!(Term::list([]), Term::nil());
    }

    #[test]
    fn test_elems_stops_at_improper_tail() {
        let l = Term::improper([Term::nat(1), Term::nat(2)], Term::nat(9));
        let elems: Vec<_> = l.elems().cloned().collect();
        assert_eq!(elems, vec![Term::nat(1), Term::nat(2)]);
    }

    #[test]
    fn test_has_prefix_element_wise() {
        let key = Term::list([Term::text("a"), Term::text("1")]);
        assert!(key.has_prefix(&[Term::text("a")]));
        assert!(key.has_prefix(&[Term::text("a"), Term::text("1")]));
        assert!(!key.has_prefix(&[Term::text("b")]));
    }

    #[test]
    fn test_atom_matches_only_empty_prefix() {
        let atom = Term::text("x");
        assert!(atom.has_prefix(&[]));
        assert!(!atom.has_prefix(&[Term::text("x")]));
    }

    #[test]
    fn test_strip_prefix_returns_remainder() {
        let key = Term::improper([Term::text("ns"), Term::text("k")], Term::nat(3));
        let rest = key.strip_prefix(&[Term::text("ns")]).unwrap();
        assert_eq!(rest, &Term::improper([Term::text("k")], Term::nat(3)));
    }

    #[test]
    fn test_ordering_is_total_and_structural() {
        let mut terms = vec![
            Term::cell(Term::nat(1), Term::nil()),
            Term::bytes(vec![0x01]),
            Term::nat(5),
            Term::nat(2),
        ];
        terms.sort();
        assert_eq!(
            terms,
            vec![
                Term::nat(2),
                Term::nat(5),
                Term::bytes(vec![0x01]),
                Term::cell(Term::nat(1), Term::nil()),
            ]
        );
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(
            Term::list([Term::nat(1), Term::text("x")]),
            Term::list([Term::nat(1), Term::text("x")])
        );
        assert_ne!(Term::nat(0), Term::bytes(vec![0]));
    }

    #[test]
    fn test_display_renders_lists() {
        let l = Term::list([Term::nat(1), Term::text("x")]);
        assert_eq!(l.to_string(), "[1 [\"x\" 0]]");
    }

    #[test]
    fn test_to_bytes_is_deterministic() {
        let t = Term::improper([Term::nat(3), Term::text("k")], Term::nil());
        assert_eq!(t.to_bytes().unwrap(), t.to_bytes().unwrap());
        assert_ne!(
            t.to_bytes().unwrap(),
            Term::nat(3).to_bytes().unwrap()
        );
    }
}
