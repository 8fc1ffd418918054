//! Sum, product and power reduction rules.
//!
//! These run on nodes whose children are already reduced. Rational folding
//! and canonical sorting live in the constructors; the rules here cover
//! what needs to look across siblings: like-term collection, same-base
//! power collection, distribution, and radical extraction.

use super::Reducer;
use crate::conventions::{ComplexFormat, ReductionTarget};
use crate::core::known::get_symbol;
use crate::core::rational::extract_square_factor;
use crate::core::{Expr, ExprKind, KS, Rational};
use std::sync::Arc;

/// Distribution refuses to grow a sum past this many terms.
const MAX_DISTRIBUTED_TERMS: usize = 512;

/// A term split into its rational coefficient and the rest.
struct TermBucket {
    rest: Arc<Expr>,
    coeff: Rational,
}

/// Factors sharing one base, with every exponent they appeared under.
struct PowerBucket {
    base: Arc<Expr>,
    exponents: Vec<Arc<Expr>>,
    original: Arc<Expr>,
}

impl Reducer<'_> {
    // =========================================================================
    // Sums
    // =========================================================================

    pub(crate) fn reduce_sum(&self, terms: Vec<Arc<Expr>>) -> Arc<Expr> {
        Arc::new(Expr::sum_from_arcs(collect_like_terms(terms)))
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub(crate) fn reduce_product(&self, factors: Vec<Arc<Expr>>) -> Arc<Expr> {
        let collected = self.collect_powers(factors);
        if self.target() == ReductionTarget::SystemForAnalysis
            && let Some(expanded) = self.distribute(&collected)
        {
            return expanded;
        }
        Arc::new(Expr::product_from_arcs(collected))
    }

    /// Merge factors with equal bases: `x * x^2` becomes `x^3`.
    fn collect_powers(&self, factors: Vec<Arc<Expr>>) -> Vec<Arc<Expr>> {
        let mut buckets: Vec<PowerBucket> = Vec::new();
        let mut passthrough: Vec<Arc<Expr>> = Vec::new();

        for factor in factors {
            match &factor.kind {
                ExprKind::Rational(_)
                | ExprKind::Float(_)
                | ExprKind::Matrix { .. }
                | ExprKind::Undefined
                | ExprKind::Nonreal => passthrough.push(factor),
                _ => {
                    let (base, exponent) = match &factor.kind {
                        ExprKind::Pow(b, e) => (Arc::clone(b), Arc::clone(e)),
                        _ => (Arc::clone(&factor), Arc::new(Expr::integer(1))),
                    };
                    if let Some(bucket) = buckets.iter_mut().find(|b| b.base == base) {
                        bucket.exponents.push(exponent);
                    } else {
                        buckets.push(PowerBucket {
                            base,
                            exponents: vec![exponent],
                            original: factor,
                        });
                    }
                }
            }
        }

        let mut out = passthrough;
        for bucket in buckets {
            if bucket.exponents.len() == 1 {
                out.push(bucket.original);
                continue;
            }
            let total = Arc::new(Expr::sum_from_arcs(bucket.exponents));
            out.push(self.reduce_pow(bucket.base, total));
        }
        out
    }

    /// Expand a product over its sum factors, bounded by
    /// `MAX_DISTRIBUTED_TERMS`. Returns `None` when there is nothing to
    /// distribute or the expansion would be too large.
    fn distribute(&self, factors: &[Arc<Expr>]) -> Option<Arc<Expr>> {
        if !factors
            .iter()
            .any(|f| matches!(f.kind, ExprKind::Sum(_)))
        {
            return None;
        }

        let mut projected: usize = 1;
        for factor in factors {
            let width = match &factor.kind {
                ExprKind::Sum(terms) => terms.len(),
                _ => 1,
            };
            projected = projected.saturating_mul(width);
            if projected > MAX_DISTRIBUTED_TERMS {
                return None;
            }
        }

        let mut rows: Vec<Vec<Arc<Expr>>> = vec![Vec::new()];
        for factor in factors {
            match &factor.kind {
                ExprKind::Sum(terms) => {
                    let mut next = Vec::with_capacity(rows.len() * terms.len());
                    for row in &rows {
                        for term in terms {
                            let mut widened = row.clone();
                            widened.push(Arc::clone(term));
                            next.push(widened);
                        }
                    }
                    rows = next;
                }
                _ => {
                    for row in &mut rows {
                        row.push(Arc::clone(factor));
                    }
                }
            }
        }

        let terms: Vec<Arc<Expr>> = rows
            .into_iter()
            .map(|row| self.reduce_product(row))
            .collect();
        Some(self.reduce_sum(terms))
    }

    // =========================================================================
    // Powers
    // =========================================================================

    pub(crate) fn reduce_pow(&self, base: Arc<Expr>, exponent: Arc<Expr>) -> Arc<Expr> {
        // (x^a)^n with integer n merges into x^(a*n).
        if let ExprKind::Pow(inner_base, inner_exponent) = &base.kind
            && exponent
                .as_rational()
                .and_then(|r| r.as_integer())
                .is_some()
        {
            let merged = self.reduce_product(vec![
                Arc::clone(inner_exponent),
                Arc::clone(&exponent),
            ]);
            return self.reduce_pow(Arc::clone(inner_base), merged);
        }

        // (a*b)^n with integer n distributes over the factors, so (-x)^2
        // normalizes to x^2.
        if let ExprKind::Product(factors) = &base.kind
            && exponent
                .as_rational()
                .and_then(|r| r.as_integer())
                .is_some()
        {
            let powered: Vec<Arc<Expr>> = factors
                .iter()
                .map(|f| self.reduce_pow(Arc::clone(f), Arc::clone(&exponent)))
                .collect();
            return self.reduce_product(powered);
        }

        // Integer powers of the imaginary unit cycle with period four.
        if base.symbol_id() == Some(KS.i)
            && let Some(n) = exponent.as_rational().and_then(|r| r.as_integer())
        {
            return match n.rem_euclid(4) {
                0 => Arc::new(Expr::integer(1)),
                1 => base,
                2 => Arc::new(Expr::integer(-1)),
                _ => Arc::new(Expr::product_from_arcs(vec![
                    Arc::new(Expr::integer(-1)),
                    base,
                ])),
            };
        }

        // (sum)^n expands for polynomial analysis.
        if self.target() == ReductionTarget::SystemForAnalysis
            && matches!(base.kind, ExprKind::Sum(_))
            && let Some(n) = exponent.as_rational().and_then(|r| r.as_integer())
            && let Ok(n) = usize::try_from(n)
            && (2..=crate::MAX_EXTRACTED_DEGREE).contains(&n)
        {
            let copies = vec![Arc::clone(&base); n];
            if let Some(expanded) = self.distribute(&copies) {
                return expanded;
            }
        }

        // Rational base under a fractional rational exponent: radicals.
        if let (Some(b), Some(e)) = (base.as_rational(), exponent.as_rational())
            && !e.is_integer()
            && let Some(reduced) = self.reduce_rational_pow(b, e)
        {
            return reduced;
        }

        Arc::new(Expr::pow_from_arcs(base, exponent))
    }

    /// Radical rules for `b^(p/q)` with `q > 1`. Returns `None` when the
    /// power should stay symbolic.
    fn reduce_rational_pow(&self, base: Rational, exponent: Rational) -> Option<Arc<Expr>> {
        if base.is_zero() {
            return None; // pow_static settles zero bases
        }
        let p = exponent.numerator();
        let q = exponent.denominator();

        if base.is_negative() {
            // Principal-branch convention: a negative radicand is nonreal in
            // real format. cbrt() is the entry point for odd real roots.
            if self.conventions().complex_format == ComplexFormat::Real {
                return Some(Arc::new(Expr::nonreal()));
            }
            if q == 2 {
                // (-m)^(p/2) = i^p * m^(p/2); p is odd since gcd(p, 2) = 1.
                let magnitude = self.reduce_pow(
                    Arc::new(Expr::from_rational(base.abs())),
                    Arc::new(Expr::from_rational(exponent)),
                );
                let i = Arc::new(Expr::from_interned(get_symbol(KS.i)));
                let unit = if p.rem_euclid(4) == 1 {
                    i
                } else {
                    Arc::new(Expr::product_from_arcs(vec![
                        Arc::new(Expr::integer(-1)),
                        i,
                    ]))
                };
                return Some(self.reduce_product(vec![unit, magnitude]));
            }
            return None; // approximation goes principal-branch
        }

        // Exact q-th root when the base is a perfect power: 8^(1/3) = 2.
        let root = match q {
            2 => base.exact_sqrt(),
            3 => base.exact_cbrt(),
            _ => None,
        };
        if let Some(r) = root
            && let Ok(p32) = i32::try_from(p)
            && let Some(folded) = r.checked_pow(p32)
        {
            return Some(Arc::new(Expr::from_rational(folded)));
        }

        // Square-factor extraction: sqrt(8) = 2*sqrt(2), and the
        // rationalized sqrt(n/d) = sqrt(n*d)/d.
        if q == 2 && (p == 1 || p == -1) {
            let b = if p == 1 {
                base
            } else {
                Rational::ONE.checked_div(&base)?
            };
            let m = b.numerator().checked_mul(b.denominator())?;
            let (s, t) = extract_square_factor(m);
            if p == 1 && s == 1 && b.denominator() == 1 {
                return None; // nothing to pull out
            }
            let coeff = Rational::new(s, b.denominator())?;
            if t == 1 {
                return Some(Arc::new(Expr::from_rational(coeff)));
            }
            let radical = Arc::new(Expr::pow_static(
                Expr::integer(t),
                Expr::rational(1, 2),
            ));
            if coeff.is_one() {
                return Some(radical);
            }
            return Some(Arc::new(Expr::product_from_arcs(vec![
                Arc::new(Expr::from_rational(coeff)),
                radical,
            ])));
        }

        None
    }
}

/// Merge terms sharing a non-numeric part: `x + 2x` becomes `3x`. Terms
/// whose merged coefficient would overflow stay separate.
fn collect_like_terms(terms: Vec<Arc<Expr>>) -> Vec<Arc<Expr>> {
    let mut buckets: Vec<TermBucket> = Vec::new();
    let mut passthrough: Vec<Arc<Expr>> = Vec::new();

    for term in terms {
        match split_coefficient(&term) {
            None => passthrough.push(term),
            Some((coeff, rest)) => {
                if let Some(bucket) = buckets.iter_mut().find(|b| b.rest == rest) {
                    match bucket.coeff.checked_add(&coeff) {
                        Some(merged) => bucket.coeff = merged,
                        None => passthrough.push(term),
                    }
                } else {
                    buckets.push(TermBucket { rest, coeff });
                }
            }
        }
    }

    let mut out = passthrough;
    for bucket in buckets {
        if bucket.coeff.is_zero() {
            continue;
        }
        if bucket.coeff.is_one() {
            out.push(bucket.rest);
        } else {
            out.push(Arc::new(Expr::product_from_arcs(vec![
                Arc::new(Expr::from_rational(bucket.coeff)),
                bucket.rest,
            ])));
        }
    }
    out
}

/// Split a term into `(rational coefficient, rest)`. Pure numbers return
/// `None`; the sum constructor folds those itself.
fn split_coefficient(term: &Arc<Expr>) -> Option<(Rational, Arc<Expr>)> {
    match &term.kind {
        ExprKind::Rational(_) => None,
        ExprKind::Product(factors) => {
            if let Some(first) = factors.first()
                && let ExprKind::Rational(coeff) = &first.kind
            {
                let rest: Vec<Arc<Expr>> = factors[1..].to_vec();
                Some((*coeff, Arc::new(Expr::product_from_arcs(rest))))
            } else {
                Some((Rational::ONE, Arc::clone(term)))
            }
        }
        _ => Some((Rational::ONE, Arc::clone(term))),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;

    #[test]
    fn split_pulls_the_leading_rational() {
        let term = Arc::new(Expr::product(vec![
            Expr::rational(-2, 3),
            Expr::symbol("x"),
        ]));
        let (coeff, rest) = split_coefficient(&term).unwrap();
        assert_eq!(coeff, Rational::new(-2, 3).unwrap());
        assert_eq!(rest.to_string(), "x");
    }

    #[test]
    fn split_leaves_bare_symbols_alone() {
        let term = Arc::new(Expr::symbol("x"));
        let (coeff, rest) = split_coefficient(&term).unwrap();
        assert_eq!(coeff, Rational::ONE);
        assert_eq!(rest.to_string(), "x");
    }

    #[test]
    fn pure_numbers_pass_through() {
        assert!(split_coefficient(&Arc::new(Expr::integer(5))).is_none());
    }

    #[test]
    fn opposite_terms_cancel() {
        let x = Arc::new(Expr::symbol("x"));
        let neg_x = Arc::new(Expr::product(vec![Expr::integer(-1), Expr::symbol("x")]));
        let collected = collect_like_terms(vec![x, neg_x]);
        assert!(collected.is_empty());
    }
}
