//! Structural hash computation for expression nodes.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::ExprKind;

/// Compute the structural hash for a node kind.
///
/// Children contribute their own pre-computed hashes, so this is O(children)
/// rather than O(subtree). Sum and Product hash commutatively (order of terms
/// does not change the hash), matching their mathematical semantics.
#[must_use]
pub fn compute_expr_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    hasher.finish()
}
