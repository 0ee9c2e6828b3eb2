//! Commitment-tree binding
//!
//! The accumulator over the commitments table: a fixed-shape Merkle tree of
//! depth 32 and arity 2 with 256-bit digests, where an internal node is
//! `SHA-256(left ‖ right)`. Leaves are appended at the next free index and
//! never move; the table rows are simply `(index, leaf_hash)`.
//!
//! The outer state machine driving the accumulator is not this crate's
//! concern — this binding offers append, length, and the sparse root, which
//! is computed against precomputed empty-subtree digests so an almost-empty
//! tree costs nothing near its capacity of 2³² leaves.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tessera_core::{Error, Result, Stored, Term};
use tessera_tables::{Pattern, Tables, TxResult};

use crate::store::Storage;

/// Tree depth: 32 levels below the root.
pub const TREE_DEPTH: usize = 32;
/// Children per internal node.
pub const TREE_ARITY: usize = 2;
/// Digest width in bytes (SHA-256).
pub const DIGEST_BYTES: usize = 32;
/// Leaf capacity: `TREE_ARITY ^ TREE_DEPTH`.
pub const MAX_LEAVES: u64 = 1 << TREE_DEPTH;

/// A leaf or node digest.
pub type Digest256 = [u8; DIGEST_BYTES];

/// The accumulator bound to one commitments table.
pub struct CommitmentTree<T: Tables> {
    tables: Arc<T>,
    table: String,
}

impl<T: Tables> CommitmentTree<T> {
    /// Bind the accumulator to a commitments table.
    pub fn new(tables: Arc<T>, table: impl Into<String>) -> CommitmentTree<T> {
        CommitmentTree {
            tables,
            table: table.into(),
        }
    }

    /// Number of appended leaves.
    pub fn len(&self) -> Result<u64> {
        self.tables
            .transaction(|txn| Ok(txn.select(&self.table, &Pattern::all())?.len() as u64))
            .committed()
    }

    /// True if no leaf has been appended.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append a leaf digest at the next free index, returning that index.
    ///
    /// Concurrent appends racing for the same index conflict and abort;
    /// callers retry by re-invoking. A committed leaf is never overwritten.
    pub fn append(&self, leaf: Digest256) -> TxResult<u64> {
        self.tables.transaction(|txn| {
            let index = txn.select(&self.table, &Pattern::all())?.len() as u64;
            if index >= MAX_LEAVES {
                return Err(Error::TreeFull { max: MAX_LEAVES });
            }
            // Read the candidate row so its absence joins the read set: a
            // concurrent append committing the same index is then a conflict
            // at commit time rather than a silent overwrite.
            if txn.read(&self.table, &Term::nat(index))?.is_some() {
                return Err(Error::Corruption(format!(
                    "commitment row {} exists past the leaf count",
                    index
                )));
            }
            txn.write(
                &self.table,
                Term::nat(index),
                Stored::Term(Term::bytes(leaf.to_vec())),
            )?;
            Ok(index)
        })
    }

    /// Hash a term into a leaf and append it.
    pub fn commit_term(&self, term: &Term) -> TxResult<u64> {
        match leaf_hash(term) {
            Ok(leaf) => self.append(leaf),
            Err(e) => TxResult::Aborted(e.to_string()),
        }
    }

    /// The current root digest over all appended leaves.
    pub fn root(&self) -> Result<Digest256> {
        let leaves = self.leaves()?;
        Ok(root_over(&leaves))
    }

    fn leaves(&self) -> Result<Vec<Digest256>> {
        let rows = self
            .tables
            .transaction(|txn| txn.select(&self.table, &Pattern::all()))
            .committed()?;
        // Select returns rows in key order, and Nat keys order numerically,
        // so leaves come back by index.
        rows.into_iter()
            .map(|(key, slot)| match slot.as_term().and_then(Term::as_bytes) {
                Some(bytes) if bytes.len() == DIGEST_BYTES => {
                    let mut leaf = [0u8; DIGEST_BYTES];
                    leaf.copy_from_slice(bytes);
                    Ok(leaf)
                }
                _ => Err(Error::Corruption(format!(
                    "commitment row {} does not hold a {}-byte digest",
                    key, DIGEST_BYTES
                ))),
            })
            .collect()
    }
}

impl<T: Tables> Storage<T> {
    /// The accumulator bound to this handle's commitments table.
    ///
    /// Meaningful once `setup` has run, which opening a handle guarantees.
    pub fn commitments(&self) -> CommitmentTree<T> {
        CommitmentTree::new(
            Arc::clone(self.tables()),
            self.config().commitments_table.clone(),
        )
    }
}

/// Leaf digest of a term: SHA-256 over its canonical byte encoding.
pub fn leaf_hash(term: &Term) -> Result<Digest256> {
    Ok(Sha256::digest(term.to_bytes()?).into())
}

fn combine(left: &Digest256, right: &Digest256) -> Digest256 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Digests of the all-empty subtree at each level: `E(0)` is the zero leaf,
/// `E(d+1) = H(E(d) ‖ E(d))`.
fn empty_digests() -> [Digest256; TREE_DEPTH + 1] {
    let mut empty = [[0u8; DIGEST_BYTES]; TREE_DEPTH + 1];
    for depth in 0..TREE_DEPTH {
        empty[depth + 1] = combine(&empty[depth], &empty[depth]);
    }
    empty
}

/// Root of the depth-32 sparse tree whose occupied prefix is `leaves`.
fn root_over(leaves: &[Digest256]) -> Digest256 {
    let empty = empty_digests();
    let mut level: Vec<Digest256> = leaves.to_vec();
    for depth in 0..TREE_DEPTH {
        if level.is_empty() {
            return empty[TREE_DEPTH];
        }
        if level.len() % TREE_ARITY != 0 {
            level.push(empty[depth]);
        }
        level = level
            .chunks(TREE_ARITY)
            .map(|pair| combine(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}
