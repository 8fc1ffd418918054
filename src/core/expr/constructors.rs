//! Expression constructors.
//!
//! All constructors are smart: they flatten nested sums/products, fold
//! rational constants with checked arithmetic (overflow keeps the term
//! symbolic instead of wrapping), and sort n-ary children into canonical
//! order so equal expressions serialize identically.

use std::sync::Arc;

use super::{Expr, ExprKind, compute_expr_hash, expr_cmp, next_id};
use crate::core::rational::Rational;
use crate::core::symbol::{InternedSymbol, symb};

impl Expr {
    /// Create a new expression with a fresh ID.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Self {
            id: next_id(),
            hash,
            kind,
        }
    }

    /// Get the unique ID of the expression.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Get the structural hash of the expression.
    #[inline]
    #[must_use]
    pub const fn structural_hash(&self) -> u64 {
        self.hash
    }

    /// Consume the expression and return its kind.
    ///
    /// `Expr` has a `Drop` impl, so the field cannot be moved out directly;
    /// a leaf marker is swapped in for the destructor to consume instead.
    #[inline]
    #[must_use]
    pub fn into_kind(mut self) -> ExprKind {
        std::mem::replace(&mut self.kind, ExprKind::Undefined)
    }

    // -------------------------------------------------------------------------
    // Accessor methods
    // -------------------------------------------------------------------------

    /// Return the exact rational value, if this node is one.
    #[inline]
    #[must_use]
    pub const fn as_rational(&self) -> Option<Rational> {
        match &self.kind {
            ExprKind::Rational(r) => Some(*r),
            _ => None,
        }
    }

    /// Return the float value, if this node is one.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Return the interned symbol, if this node is one.
    #[inline]
    #[must_use]
    pub fn as_symbol(&self) -> Option<InternedSymbol> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Return the symbol registry ID, if this node is a symbol.
    #[inline]
    #[must_use]
    pub fn symbol_id(&self) -> Option<u64> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(s.id()),
            _ => None,
        }
    }

    /// Numeric value of a leaf constant (rational or float).
    #[inline]
    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Rational(r) => Some(r.to_f64()),
            ExprKind::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// True if this node is exactly zero (rational or float).
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match &self.kind {
            ExprKind::Rational(r) => r.is_zero(),
            ExprKind::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// True if this node is exactly one (rational or float).
    #[inline]
    #[must_use]
    pub fn is_one(&self) -> bool {
        match &self.kind {
            ExprKind::Rational(r) => r.is_one(),
            ExprKind::Float(f) => *f == 1.0,
            _ => false,
        }
    }

    /// True if this node is exactly minus one (rational or float).
    #[inline]
    #[must_use]
    pub fn is_minus_one(&self) -> bool {
        match &self.kind {
            ExprKind::Rational(r) => r.is_minus_one(),
            ExprKind::Float(f) => *f == -1.0,
            _ => false,
        }
    }

    /// True if this node is the undefined marker.
    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self.kind, ExprKind::Undefined)
    }

    /// True if this node is the nonreal marker.
    #[inline]
    #[must_use]
    pub const fn is_nonreal(&self) -> bool {
        matches!(self.kind, ExprKind::Nonreal)
    }

    // -------------------------------------------------------------------------
    // Leaf constructors
    // -------------------------------------------------------------------------

    /// Create an exact integer constant.
    #[must_use]
    pub fn integer(n: i128) -> Self {
        Self::new(ExprKind::Rational(Rational::integer(n)))
    }

    /// Create an exact rational constant. A zero denominator yields the
    /// undefined marker rather than panicking.
    #[must_use]
    pub fn rational(num: i128, den: i128) -> Self {
        match Rational::new(num, den) {
            Some(r) => Self::new(ExprKind::Rational(r)),
            None => Self::undefined(),
        }
    }

    /// Create an exact constant from an already-built rational.
    #[must_use]
    pub fn from_rational(r: Rational) -> Self {
        Self::new(ExprKind::Rational(r))
    }

    /// Create an inexact float constant. NaN and infinities become the
    /// undefined marker so they can never masquerade as numbers.
    #[must_use]
    pub fn float(f: f64) -> Self {
        if !f.is_finite() {
            return Self::undefined();
        }
        Self::new(ExprKind::Float(f))
    }

    /// Create a symbol expression (auto-interned).
    pub fn symbol(s: impl AsRef<str>) -> Self {
        Self::new(ExprKind::Symbol(symb(s.as_ref())))
    }

    /// Create a symbol expression from an already-interned symbol.
    #[must_use]
    pub fn from_interned(interned: InternedSymbol) -> Self {
        Self::new(ExprKind::Symbol(interned))
    }

    /// Create the undefined marker.
    #[must_use]
    pub fn undefined() -> Self {
        Self::new(ExprKind::Undefined)
    }

    /// Create the nonreal marker.
    #[must_use]
    pub fn nonreal() -> Self {
        Self::new(ExprKind::Nonreal)
    }

    /// Create a row-major matrix literal. Dimension mismatch yields the
    /// undefined marker.
    #[must_use]
    pub fn matrix(rows: usize, cols: usize, entries: Vec<Self>) -> Self {
        if entries.len() != rows * cols || rows == 0 || cols == 0 {
            return Self::undefined();
        }
        Self::new(ExprKind::Matrix {
            rows,
            cols,
            entries: entries.into_iter().map(Arc::new).collect(),
        })
    }

    // -------------------------------------------------------------------------
    // Function call constructors
    // -------------------------------------------------------------------------

    /// Create a function call expression.
    pub fn func(name: impl AsRef<str>, args: Vec<Self>) -> Self {
        Self::func_symbol(symb(name.as_ref()), args)
    }

    /// Create a function call from an already-interned symbol.
    #[must_use]
    pub fn func_symbol(name: InternedSymbol, args: Vec<Self>) -> Self {
        Self::new(ExprKind::FunctionCall {
            name,
            args: args.into_iter().map(Arc::new).collect(),
        })
    }

    /// Create a function call from Arc arguments (avoids cloning).
    #[must_use]
    pub fn func_from_arcs(name: InternedSymbol, args: Vec<Arc<Self>>) -> Self {
        Self::new(ExprKind::FunctionCall { name, args })
    }

    // -------------------------------------------------------------------------
    // N-ary Sum constructor (flattens, folds rationals, sorts)
    // -------------------------------------------------------------------------

    /// Create a sum expression from terms.
    ///
    /// Flattens nested sums, folds rational constants exactly (an overflowing
    /// fold keeps the term symbolic), sorts into canonical order with the
    /// accumulated constant first. `Undefined` and `Nonreal` absorb the whole
    /// node.
    #[must_use]
    pub fn sum(terms: Vec<Self>) -> Self {
        Self::sum_from_arcs(terms.into_iter().map(Arc::new).collect())
    }

    /// Create a sum from Arc terms.
    #[must_use]
    pub fn sum_from_arcs(terms: Vec<Arc<Self>>) -> Self {
        if let Some(marker) = propagated_marker(&terms) {
            return marker;
        }
        let mut pending = terms;
        if pending.len() == 1
            && let Some(only) = pending.pop()
        {
            return Self::unwrap_arc(only);
        }

        // Worklist so rationals inside nested sums still fold into the
        // accumulator. Order is irrelevant: the result is sorted at the end.
        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(pending.len());
        let mut acc = Rational::ZERO;

        while let Some(t) = pending.pop() {
            if let ExprKind::Rational(r) = &t.kind {
                match acc.checked_add(r) {
                    Some(next) => acc = next,
                    None => flat.push(t),
                }
                continue;
            }
            if matches!(t.kind, ExprKind::Sum(_)) {
                match Arc::try_unwrap(t) {
                    Ok(expr) => {
                        if let ExprKind::Sum(inner) = expr.into_kind() {
                            pending.extend(inner);
                        }
                    }
                    Err(arc) => {
                        if let ExprKind::Sum(inner) = &arc.kind {
                            pending.extend(inner.iter().cloned());
                        }
                    }
                }
                continue;
            }
            flat.push(t);
        }

        if flat.is_empty() {
            return Self::from_rational(acc);
        }
        if !acc.is_zero() {
            flat.push(Arc::new(Self::from_rational(acc)));
        }
        if flat.len() == 1
            && let Some(only) = flat.pop()
        {
            return Self::unwrap_arc(only);
        }

        flat.sort_by(|a, b| expr_cmp(a, b));
        Self::new(ExprKind::Sum(flat))
    }

    // -------------------------------------------------------------------------
    // N-ary Product constructor (flattens, folds rationals, sorts)
    // -------------------------------------------------------------------------

    /// Create a product expression from factors.
    ///
    /// Flattens nested products and folds rational constants exactly. A zero
    /// factor collapses the product to zero unless a matrix is present, since
    /// matrix dimensions must stay visible to later analysis.
    #[must_use]
    pub fn product(factors: Vec<Self>) -> Self {
        Self::product_from_arcs(factors.into_iter().map(Arc::new).collect())
    }

    /// Create a product from Arc factors.
    #[must_use]
    pub fn product_from_arcs(factors: Vec<Arc<Self>>) -> Self {
        if let Some(marker) = propagated_marker(&factors) {
            return marker;
        }
        let mut pending = factors;
        if pending.len() == 1
            && let Some(only) = pending.pop()
        {
            return Self::unwrap_arc(only);
        }

        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(pending.len());
        let mut acc = Rational::ONE;

        while let Some(f) = pending.pop() {
            if let ExprKind::Rational(r) = &f.kind {
                match acc.checked_mul(r) {
                    Some(next) => acc = next,
                    None => flat.push(f),
                }
                continue;
            }
            if matches!(f.kind, ExprKind::Product(_)) {
                match Arc::try_unwrap(f) {
                    Ok(expr) => {
                        if let ExprKind::Product(inner) = expr.into_kind() {
                            pending.extend(inner);
                        }
                    }
                    Err(arc) => {
                        if let ExprKind::Product(inner) = &arc.kind {
                            pending.extend(inner.iter().cloned());
                        }
                    }
                }
                continue;
            }
            flat.push(f);
        }

        if acc.is_zero() {
            let has_matrix = flat
                .iter()
                .any(|f| matches!(f.kind, ExprKind::Matrix { .. }));
            if !has_matrix {
                return Self::from_rational(Rational::ZERO);
            }
        }

        if flat.is_empty() {
            return Self::from_rational(acc);
        }
        if !acc.is_one() {
            flat.push(Arc::new(Self::from_rational(acc)));
        }
        if flat.len() == 1
            && let Some(only) = flat.pop()
        {
            return Self::unwrap_arc(only);
        }

        flat.sort_by(|a, b| expr_cmp(a, b));
        Self::new(ExprKind::Product(flat))
    }

    // -------------------------------------------------------------------------
    // Binary operation constructors
    // -------------------------------------------------------------------------

    /// Create addition: `a + b` as `Sum([a, b])`.
    #[must_use]
    pub fn add_expr(left: Self, right: Self) -> Self {
        Self::sum(vec![left, right])
    }

    /// Create subtraction: `a - b` as `Sum([a, Product([-1, b])])`.
    #[must_use]
    pub fn sub_expr(left: Self, right: Self) -> Self {
        if let (Some(l), Some(r)) = (left.as_rational(), right.as_rational())
            && let Some(diff) = l.checked_sub(&r)
        {
            return Self::from_rational(diff);
        }
        if left.is_zero() {
            return right.negate();
        }
        if right.is_zero() {
            return left;
        }
        let neg_right = right.negate();
        Self::sum(vec![left, neg_right])
    }

    /// Create multiplication: `a * b` as `Product([a, b])`.
    #[must_use]
    pub fn mul_expr(left: Self, right: Self) -> Self {
        Self::product(vec![left, right])
    }

    /// Create division: `a / b` as `a * b^(-1)`.
    ///
    /// There is no division node. Exact rational quotients fold immediately;
    /// division by literal zero yields the undefined marker.
    #[must_use]
    pub fn div_expr(left: Self, right: Self) -> Self {
        if right.is_zero() {
            return Self::undefined();
        }
        if let (Some(l), Some(r)) = (left.as_rational(), right.as_rational())
            && let Some(quot) = l.checked_div(&r)
        {
            return Self::from_rational(quot);
        }
        if right.is_one() {
            return left;
        }
        let inverse = Self::pow_static(right, Self::integer(-1));
        Self::product(vec![left, inverse])
    }

    /// Create a power expression.
    ///
    /// Inline folds:
    /// - `x^0` is `1` (but `0^0` is undefined)
    /// - `x^1` is `x`
    /// - `1^x` is `1`
    /// - `0^n` is `0` for positive rational `n`, undefined for negative
    /// - rational base with integer exponent folds with checked arithmetic
    ///
    /// Fractional exponents never fold here, so `2^(1/2)` stays symbolic for
    /// radical extraction during reduction.
    #[must_use]
    pub fn pow_static(base: Self, exponent: Self) -> Self {
        if base.is_undefined() || exponent.is_undefined() {
            return Self::undefined();
        }
        if base.is_nonreal() || exponent.is_nonreal() {
            return Self::nonreal();
        }
        if base.is_zero() {
            if let Some(e) = exponent.as_rational() {
                if e.is_zero() || e.is_negative() {
                    return Self::undefined();
                }
                return Self::from_rational(Rational::ZERO);
            }
        }
        if exponent.is_zero() {
            return Self::integer(1);
        }
        if exponent.is_one() {
            return base;
        }
        if base.is_one() {
            return Self::integer(1);
        }
        if let (Some(b), Some(e)) = (base.as_rational(), exponent.as_rational())
            && let Some(n) = e.as_integer()
            && let Ok(n) = i32::try_from(n)
            && let Some(folded) = b.checked_pow(n)
        {
            return Self::from_rational(folded);
        }
        Self::new(ExprKind::Pow(Arc::new(base), Arc::new(exponent)))
    }

    /// Create a power from Arc operands.
    #[must_use]
    pub fn pow_from_arcs(base: Arc<Self>, exponent: Arc<Self>) -> Self {
        Self::pow_static(Self::unwrap_arc(base), Self::unwrap_arc(exponent))
    }

    /// Square root as `x^(1/2)`, the canonical radical form.
    #[must_use]
    pub fn sqrt(arg: Self) -> Self {
        Self::pow_static(arg, Self::rational(1, 2))
    }

    /// Negate this expression: `-x` as `Product([-1, x])`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::product(vec![Self::integer(-1), self])
    }

    /// Unwrap an `Arc<Expr>` without cloning if the refcount is 1.
    #[inline]
    #[must_use]
    pub fn unwrap_arc(arc: Arc<Self>) -> Self {
        Arc::try_unwrap(arc).unwrap_or_else(|a| (*a).clone())
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::integer(i128::from(n))
    }
}

impl From<Rational> for Expr {
    fn from(r: Rational) -> Self {
        Self::from_rational(r)
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Error markers absorb any n-ary node they appear in, undefined first.
fn propagated_marker(children: &[Arc<Expr>]) -> Option<Expr> {
    if children.iter().any(|c| c.is_undefined()) {
        return Some(Expr::undefined());
    }
    if children.iter().any(|c| c.is_nonreal()) {
        return Some(Expr::nonreal());
    }
    None
}
