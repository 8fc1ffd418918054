//! Abstract syntax tree for symbolic expressions.
//!
//! This module defines:
//! - `Expr` - The central AST node type
//! - `ExprKind` - The variants of expression nodes
//!
//! # Architecture
//!
//! ## N-ary Sum/Product
//! Instead of binary `Add(left, right)`, sums and products are N-ary
//! (`Sum(Vec<Arc<Expr>>)`). This keeps canonicalization shallow:
//! - `a + b + c + d` is `Sum([a, b, c, d])`, not `Add(Add(Add(a,b),c),d)`
//! - Flattening happens automatically in constructors
//! - Like-term combination is O(N) instead of O(N²)
//!
//! There is no division node: reduction rewrites `a/b` as `a * b^(-1)` so
//! coefficient extraction only ever sees one canonical product form.
//!
//! ## Exact numbers
//! `Rational` carries exact values through solving; `Float` only appears in
//! approximation results and numeric roots. Parsed decimals become exact
//! rationals, never floats.
//!
//! ## Structural hashing
//! Each `Expr` has a pre-computed `hash` field for O(1) equality rejection.
//! Two expressions with different hashes are definitely not equal, avoiding
//! expensive recursive comparisons in the common case.
//!
//! ## Error markers
//! `Undefined` and `Nonreal` are first-class leaves. Reduction propagates
//! them upward so a solve can reject an equation by looking at the root.

// Submodules
mod analysis;
mod constructors;
mod hash;
mod ordering;

use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::rational::Rational;
use crate::core::symbol::InternedSymbol;

// Re-exports from submodules
pub use analysis::TriBool;
pub use hash::compute_expr_hash;
pub use ordering::expr_cmp;

// =============================================================================
// EXPRESSION ID COUNTER AND CACHED CONSTANTS
// =============================================================================

static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Cached Arc for zero, used during Drop to swap out children without allocation.
static DUMMY_ARC: std::sync::LazyLock<Arc<Expr>> = std::sync::LazyLock::new(|| {
    Arc::new(Expr {
        id: 0,
        hash: compute_expr_hash(&ExprKind::Rational(Rational::ZERO)),
        kind: ExprKind::Rational(Rational::ZERO),
    })
});

// =============================================================================
// EXPR - The main expression type
// =============================================================================

/// A symbolic mathematical expression.
///
/// Expressions are immutable once built; all rewriting produces new nodes.
/// Children are shared via `Arc`, so cloning a whole tree is cheap.
#[derive(Debug, Clone)]
pub struct Expr {
    /// Unique ID for debugging and caching (not used in equality comparisons)
    pub(crate) id: u64,
    /// Structural hash for O(1) equality rejection
    pub(crate) hash: u64,
    /// The kind of expression (structure)
    pub(crate) kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

// Structural equality based on KIND only (with hash fast-reject)
impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast reject: different hashes mean definitely not equal
        if self.hash != other.hash {
            return false;
        }
        // Slow path: verify structural equality (handles hash collisions)
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl std::hash::Hash for Expr {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Use pre-computed hash directly
        self.hash.hash(state);
    }
}

// =============================================================================
// EXPRKIND - N-ary Sum/Product architecture
// =============================================================================

/// The kind (structure) of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Exact rational constant (e.g. `3`, `-7/2`). Parsed decimals land here.
    Rational(Rational),

    /// Inexact numeric constant. Only produced by approximation and numeric
    /// root isolation, never by parsing.
    Float(f64),

    /// Variable or constant symbol (e.g. `x`, `pi`, `i`).
    /// Uses `InternedSymbol` for O(1) equality comparisons.
    Symbol(InternedSymbol),

    /// Function call (built-in or user-defined).
    FunctionCall {
        /// The function name as an interned symbol.
        name: InternedSymbol,
        /// The function arguments.
        args: Vec<Arc<Expr>>,
    },

    /// N-ary sum: a + b + c + ...
    /// Stored flat; reduction sorts into canonical order.
    /// Subtraction is represented as: a - b = Sum([a, Product([-1, b])])
    Sum(Vec<Arc<Expr>>),

    /// N-ary product: a * b * c * ...
    /// Stored flat; reduction sorts into canonical order.
    Product(Vec<Arc<Expr>>),

    /// Exponentiation (binary, right-associative in source form).
    Pow(Arc<Expr>, Arc<Expr>),

    /// Matrix literal, row-major. Equations containing one are rejected by
    /// the solver, but the node must survive parsing and serialization.
    Matrix {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
        /// Row-major entries; `entries.len() == rows * cols`.
        entries: Vec<Arc<Expr>>,
    },

    /// A value outside the domain of some operation (`1/0`, `ln(0)` and kin).
    Undefined,

    /// A value that left the real line while the complex format is real.
    Nonreal,
}

// =============================================================================
// DROP IMPLEMENTATION - Iterative drop to prevent stack overflow
// =============================================================================

impl Drop for Expr {
    fn drop(&mut self) {
        fn drain_children(kind: &mut ExprKind, queue: &mut Vec<Arc<Expr>>) {
            match kind {
                ExprKind::FunctionCall { args, .. } => {
                    queue.extend(std::mem::take(args));
                }
                ExprKind::Sum(terms) => {
                    queue.extend(std::mem::take(terms));
                }
                ExprKind::Product(factors) => {
                    queue.extend(std::mem::take(factors));
                }
                ExprKind::Matrix { entries, .. } => {
                    queue.extend(std::mem::take(entries));
                }
                ExprKind::Pow(base, exp) => {
                    let dummy = Arc::clone(&DUMMY_ARC);
                    queue.push(std::mem::replace(base, Arc::clone(&dummy)));
                    queue.push(std::mem::replace(exp, dummy));
                }
                ExprKind::Rational(_)
                | ExprKind::Float(_)
                | ExprKind::Symbol(_)
                | ExprKind::Undefined
                | ExprKind::Nonreal => {}
            }
        }

        let mut work_queue = Vec::new();
        drain_children(&mut self.kind, &mut work_queue);

        while let Some(child_arc) = work_queue.pop() {
            if let Ok(mut child_expr) = Arc::try_unwrap(child_arc) {
                drain_children(&mut child_expr.kind, &mut work_queue);
            }
        }
    }
}

// =============================================================================
// HASH FOR EXPRKIND
// =============================================================================

impl Hash for ExprKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Rational(r) => r.hash(state),
            Self::Float(n) => {
                // Normalize -0.0 to 0.0 before hashing
                let normalized = if *n == 0.0 { 0.0 } else { *n };
                normalized.to_bits().hash(state);
            }
            Self::Symbol(s) => s.hash(state),
            Self::FunctionCall { name, args } => {
                name.hash(state);
                args.hash(state);
            }
            Self::Sum(terms) => {
                // Commutative hash: sum of children hashes
                let mut sum_hash: u64 = 0;
                for t in terms {
                    sum_hash = sum_hash.wrapping_add(t.hash);
                }
                sum_hash.hash(state);
            }
            Self::Product(factors) => {
                // Commutative hash: sum of children hashes
                let mut prod_hash: u64 = 0;
                for f in factors {
                    prod_hash = prod_hash.wrapping_add(f.hash);
                }
                prod_hash.hash(state);
            }
            Self::Pow(b, e) => {
                b.hash(state);
                e.hash(state);
            }
            Self::Matrix {
                rows,
                cols,
                entries,
            } => {
                rows.hash(state);
                cols.hash(state);
                entries.hash(state);
            }
            Self::Undefined | Self::Nonreal => {}
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_flattening() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let z = Expr::symbol("z");

        // (x + y) + z should flatten to Sum([x, y, z])
        let inner = Expr::sum(vec![x, y]);
        let outer = Expr::sum(vec![inner, z]);

        match &outer.kind {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("Expected Sum, got {other:?}"),
        }
    }

    #[test]
    fn test_product_flattening() {
        let a = Expr::symbol("a");
        let b = Expr::symbol("b");
        let c = Expr::symbol("c");

        let inner = Expr::product(vec![a, b]);
        let outer = Expr::product(vec![inner, c]);

        match &outer.kind {
            ExprKind::Product(factors) => assert_eq!(factors.len(), 3),
            other => panic!("Expected Product, got {other:?}"),
        }
    }

    #[test]
    fn test_subtraction_as_sum() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");

        // x - y = Sum([x, Product([-1, y])])
        let result = Expr::sub_expr(x, y);

        match &result.kind {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 2),
            other => panic!("Expected Sum from subtraction, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_commutes_for_sums() {
        let a = Expr::sum(vec![Expr::symbol("u"), Expr::symbol("v")]);
        let b = Expr::sum(vec![Expr::symbol("v"), Expr::symbol("u")]);
        assert_eq!(a.hash, b.hash);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rational_folding_in_constructors() {
        let sum = Expr::sum(vec![Expr::integer(2), Expr::integer(3)]);
        assert_eq!(sum.as_rational(), Some(Rational::integer(5)));

        let product = Expr::product(vec![Expr::integer(4), Expr::rational(1, 2)]);
        assert_eq!(product.as_rational(), Some(Rational::integer(2)));
    }

    #[test]
    fn test_into_kind_consumes_the_node() {
        let sum = Expr::sum(vec![Expr::symbol("x"), Expr::integer(1)]);
        match sum.into_kind() {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 2),
            other => panic!("Expected Sum, got {other:?}"),
        }
    }

    #[test]
    fn test_flattening_handles_shared_and_owned_children() {
        // Refcount 1: the nested node is dismantled in place.
        let owned = Arc::new(Expr::sum(vec![Expr::symbol("p"), Expr::symbol("q")]));
        let outer = Expr::sum_from_arcs(vec![owned, Arc::new(Expr::symbol("r"))]);
        match &outer.kind {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("Expected Sum, got {other:?}"),
        }

        // Shared: the nested node's children are cloned out and the
        // original tree stays intact.
        let shared = Arc::new(Expr::product(vec![Expr::symbol("p"), Expr::symbol("q")]));
        let keep = Arc::clone(&shared);
        let outer = Expr::product_from_arcs(vec![shared, Arc::new(Expr::symbol("r"))]);
        match &outer.kind {
            ExprKind::Product(factors) => assert_eq!(factors.len(), 3),
            other => panic!("Expected Product, got {other:?}"),
        }
        assert!(matches!(keep.kind, ExprKind::Product(_)));
    }

    #[test]
    fn test_deep_drop_does_not_overflow() {
        let mut expr = Expr::symbol("x");
        for _ in 0..50_000 {
            expr = Expr::new(ExprKind::Pow(
                Arc::new(expr),
                Arc::new(Expr::integer(1)),
            ));
        }
        drop(expr);
    }
}
