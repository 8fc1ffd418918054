//! Canonical ordering for expressions.
//!
//! Sorting n-ary children with this order makes serialization deterministic,
//! which the solver relies on when it compares solutions by their text.

use std::cmp::Ordering as CmpOrdering;

use super::{Expr, ExprKind};
use crate::core::rational::Rational;

/// Compare expressions for canonical ordering.
///
/// Numbers sort first by value; remaining terms sort by (base, exponent,
/// coefficient) so that `x`, `2*x`, `x^2` land adjacent to each other and
/// like terms become neighbors for the reduction pass.
pub fn expr_cmp(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{Pow, Product, Rational as Rat};

    // Sort key per term: (Base, Exponent, Coefficient, IsAtomic).
    // Exponent None means an implied 1; coefficient is the leading rational
    // of a two-factor product.
    fn extract_key(e: &Expr) -> (&Expr, Option<&Expr>, Rational, bool) {
        match &e.kind {
            Pow(b, exp) => (b.as_ref(), Some(exp.as_ref()), Rational::ONE, false),
            Product(factors) if factors.len() == 2 => {
                if let Rat(n) = &factors[0].kind {
                    (&factors[1], None, *n, false)
                } else {
                    (e, None, Rational::ONE, true)
                }
            }
            _ => (e, None, Rational::ONE, true),
        }
    }

    if let (Some(x), Some(y)) = (a.numeric_value(), b.numeric_value()) {
        // Ties between an exact and an inexact form keep the exact one first.
        return x
            .partial_cmp(&y)
            .unwrap_or(CmpOrdering::Equal)
            .then_with(|| number_kind_rank(a).cmp(&number_kind_rank(b)));
    }
    if a.numeric_value().is_some() {
        return CmpOrdering::Less;
    }
    if b.numeric_value().is_some() {
        return CmpOrdering::Greater;
    }

    let (base_a, exp_a, coeff_a, atomic_a) = extract_key(a);
    let (base_b, exp_b, coeff_b, atomic_b) = extract_key(b);

    // Both atomic (e.g. Symbol vs Symbol): strict type sorting avoids
    // infinite recursion when a term is its own base.
    if atomic_a && atomic_b {
        return expr_cmp_type_strict(a, b);
    }

    // Recursion terminates because at least one side is composite.
    let base_cmp = expr_cmp(base_a, base_b);
    if base_cmp != CmpOrdering::Equal {
        return base_cmp;
    }

    // x sorts before x^2: an implied exponent counts as 1.
    let exp_cmp = match (exp_a, exp_b) {
        (Some(e_a), Some(e_b)) => expr_cmp(e_a, e_b),
        (Some(e_a), None) => cmp_exponent_to_one(e_a),
        (None, Some(e_b)) => cmp_exponent_to_one(e_b).reverse(),
        (None, None) => CmpOrdering::Equal,
    };
    if exp_cmp != CmpOrdering::Equal {
        return exp_cmp;
    }

    coeff_a.cmp(&coeff_b)
}

/// Rank so exact rationals sort before floats of the same value.
fn number_kind_rank(e: &Expr) -> u8 {
    match &e.kind {
        ExprKind::Rational(_) => 0,
        _ => 1,
    }
}

/// Compare an explicit exponent against the implied exponent 1.
fn cmp_exponent_to_one(exp: &Expr) -> CmpOrdering {
    match exp.numeric_value() {
        Some(v) => v.partial_cmp(&1.0).unwrap_or(CmpOrdering::Equal),
        // Symbolic exponents sort after any plain term.
        None => CmpOrdering::Greater,
    }
}

/// Strict type comparison for atomic terms.
///
/// Order: Number < Symbol < Sum < `FunctionCall` < Pow < Product < Matrix
/// < Undefined < Nonreal.
pub fn expr_cmp_type_strict(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{
        Float, FunctionCall, Matrix, Nonreal, Pow, Product, Rational as Rat, Sum, Symbol,
        Undefined,
    };

    fn cmp_slices(xs: &[std::sync::Arc<Expr>], ys: &[std::sync::Arc<Expr>]) -> CmpOrdering {
        xs.len().cmp(&ys.len()).then_with(|| {
            for (x, y) in xs.iter().zip(ys.iter()) {
                match expr_cmp(x, y) {
                    CmpOrdering::Equal => {}
                    other => return other,
                }
            }
            CmpOrdering::Equal
        })
    }

    match (&a.kind, &b.kind) {
        (Rat(x), Rat(y)) => x.cmp(y),
        (Rat(_) | Float(_), Rat(_) | Float(_)) => {
            let x = a.numeric_value().unwrap_or(f64::NAN);
            let y = b.numeric_value().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Rat(_) | Float(_), _) => CmpOrdering::Less,
        (_, Rat(_) | Float(_)) => CmpOrdering::Greater,

        (Symbol(x), Symbol(y)) => x.cmp(y),
        (Symbol(_), _) => CmpOrdering::Less,
        (_, Symbol(_)) => CmpOrdering::Greater,

        (Sum(t1), Sum(t2)) => cmp_slices(t1, t2),
        (Sum(_), _) => CmpOrdering::Less,
        (_, Sum(_)) => CmpOrdering::Greater,

        (FunctionCall { name: n1, args: a1 }, FunctionCall { name: n2, args: a2 }) => {
            n1.cmp(n2).then_with(|| cmp_slices(a1, a2))
        }
        (FunctionCall { .. }, _) => CmpOrdering::Less,
        (_, FunctionCall { .. }) => CmpOrdering::Greater,

        (Pow(b1, e1), Pow(b2, e2)) => expr_cmp(b1, b2).then_with(|| expr_cmp(e1, e2)),
        (Pow(_, _), _) => CmpOrdering::Less,
        (_, Pow(_, _)) => CmpOrdering::Greater,

        (Product(f1), Product(f2)) => cmp_slices(f1, f2),
        (Product(_), _) => CmpOrdering::Less,
        (_, Product(_)) => CmpOrdering::Greater,

        (
            Matrix {
                rows: r1,
                cols: c1,
                entries: e1,
            },
            Matrix {
                rows: r2,
                cols: c2,
                entries: e2,
            },
        ) => r1
            .cmp(r2)
            .then_with(|| c1.cmp(c2))
            .then_with(|| cmp_slices(e1, e2)),
        (Matrix { .. }, _) => CmpOrdering::Less,
        (_, Matrix { .. }) => CmpOrdering::Greater,

        (Undefined, Undefined) | (Nonreal, Nonreal) => CmpOrdering::Equal,
        (Undefined, _) => CmpOrdering::Less,
        (_, Undefined) => CmpOrdering::Greater,
    }
}
