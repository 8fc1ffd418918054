//! Structural analysis of expressions.
//!
//! The central tool is [`Expr::is_null`], a three-valued zero test. Exact
//! elimination needs to know whether a pivot candidate is zero; for symbolic
//! entries that often cannot be decided, and the answer `Unknown` is
//! materially different from `False`. Callers that must pick a pivot treat
//! `Unknown` as non-zero and accept that a cleverly disguised zero slips
//! through.

use super::{Expr, ExprKind};
use crate::core::known::KS;
use crate::core::symbol::InternedSymbol;

/// Three-valued answer for structural predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriBool {
    /// Provably yes.
    True,
    /// Provably no.
    False,
    /// Cannot be decided structurally.
    Unknown,
}

impl TriBool {
    /// True only for the `True` variant.
    #[inline]
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// True only for the `False` variant.
    #[inline]
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }
}

/// Sign of a term when it can be decided without evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Positive,
    Negative,
}

impl Sign {
    const fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl Expr {
    /// Three-valued test for "is this expression zero".
    ///
    /// `True` and `False` are proofs; `Unknown` means the structure does not
    /// decide it (free symbols, transcendental cancellations). A sum of terms
    /// that all share a strict sign is provably non-zero, which covers
    /// coefficients like `sqrt(2)+sqrt(3)` that plain pattern matching would
    /// give up on.
    #[must_use]
    pub fn is_null(&self) -> TriBool {
        match &self.kind {
            ExprKind::Rational(r) => {
                if r.is_zero() {
                    TriBool::True
                } else {
                    TriBool::False
                }
            }
            ExprKind::Float(f) => {
                if *f == 0.0 {
                    TriBool::True
                } else if f.is_nan() {
                    TriBool::Unknown
                } else {
                    TriBool::False
                }
            }
            ExprKind::Symbol(s) => {
                if KS.is_constant(s.id()) {
                    TriBool::False
                } else {
                    TriBool::Unknown
                }
            }
            ExprKind::Sum(terms) => {
                let mut signs = terms.iter().map(|t| definite_sign(t));
                match signs.next().flatten() {
                    Some(first) => {
                        if signs.all(|s| s == Some(first)) {
                            TriBool::False
                        } else {
                            TriBool::Unknown
                        }
                    }
                    None => TriBool::Unknown,
                }
            }
            ExprKind::Product(factors) => {
                let mut all_false = true;
                for f in factors {
                    match f.is_null() {
                        TriBool::True => return TriBool::True,
                        TriBool::False => {}
                        TriBool::Unknown => all_false = false,
                    }
                }
                if all_false {
                    TriBool::False
                } else {
                    TriBool::Unknown
                }
            }
            ExprKind::Pow(base, exp) => match base.is_null() {
                TriBool::True => {
                    // 0^e is zero for positive e, undefined otherwise.
                    if exp.numeric_value().is_some_and(|e| e > 0.0) {
                        TriBool::True
                    } else {
                        TriBool::Unknown
                    }
                }
                TriBool::False => TriBool::False,
                TriBool::Unknown => TriBool::Unknown,
            },
            ExprKind::FunctionCall { name, args } => {
                let id = name.id();
                if (id == KS.abs || id == KS.cbrt) && args.len() == 1 {
                    args[0].is_null()
                } else if id == KS.exp {
                    TriBool::False
                } else {
                    TriBool::Unknown
                }
            }
            ExprKind::Matrix { .. } | ExprKind::Undefined | ExprKind::Nonreal => TriBool::Unknown,
        }
    }

    /// True if the symbol with this registry ID appears anywhere in the tree.
    #[must_use]
    pub fn contains_symbol(&self, id: u64) -> bool {
        match &self.kind {
            ExprKind::Symbol(s) => s.id() == id,
            ExprKind::Rational(_)
            | ExprKind::Float(_)
            | ExprKind::Undefined
            | ExprKind::Nonreal => false,
            ExprKind::FunctionCall { args, .. } => args.iter().any(|a| a.contains_symbol(id)),
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.contains_symbol(id))
            }
            ExprKind::Pow(base, exp) => base.contains_symbol(id) || exp.contains_symbol(id),
            ExprKind::Matrix { entries, .. } => entries.iter().any(|e| e.contains_symbol(id)),
        }
    }

    /// True if any matrix literal appears in the tree.
    #[must_use]
    pub fn contains_matrix(&self) -> bool {
        match &self.kind {
            ExprKind::Matrix { .. } => true,
            ExprKind::Rational(_)
            | ExprKind::Float(_)
            | ExprKind::Symbol(_)
            | ExprKind::Undefined
            | ExprKind::Nonreal => false,
            ExprKind::FunctionCall { args, .. } => args.iter().any(|a| a.contains_matrix()),
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.contains_matrix())
            }
            ExprKind::Pow(base, exp) => base.contains_matrix() || exp.contains_matrix(),
        }
    }

    /// True if any float leaf appears in the tree. Parsed literals are
    /// exact rationals, so floats mark values that went through numeric
    /// evaluation at some point.
    #[must_use]
    pub fn contains_float(&self) -> bool {
        match &self.kind {
            ExprKind::Float(_) => true,
            ExprKind::Rational(_)
            | ExprKind::Symbol(_)
            | ExprKind::Undefined
            | ExprKind::Nonreal => false,
            ExprKind::FunctionCall { args, .. } => args.iter().any(|a| a.contains_float()),
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.contains_float())
            }
            ExprKind::Pow(base, exp) => base.contains_float() || exp.contains_float(),
            ExprKind::Matrix { entries, .. } => entries.iter().any(|e| e.contains_float()),
        }
    }

    /// Visit every symbol leaf in depth-first source order.
    ///
    /// Function names are not symbol leaves and are skipped.
    pub fn for_each_symbol(&self, visit: &mut impl FnMut(&InternedSymbol)) {
        match &self.kind {
            ExprKind::Symbol(s) => visit(s),
            ExprKind::Rational(_)
            | ExprKind::Float(_)
            | ExprKind::Undefined
            | ExprKind::Nonreal => {}
            ExprKind::FunctionCall { args, .. } => {
                for a in args {
                    a.for_each_symbol(visit);
                }
            }
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                for c in children {
                    c.for_each_symbol(visit);
                }
            }
            ExprKind::Pow(base, exp) => {
                base.for_each_symbol(visit);
                exp.for_each_symbol(visit);
            }
            ExprKind::Matrix { entries, .. } => {
                for e in entries {
                    e.for_each_symbol(visit);
                }
            }
        }
    }

    /// Number of nodes in the tree, counting this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            ExprKind::Rational(_)
            | ExprKind::Float(_)
            | ExprKind::Symbol(_)
            | ExprKind::Undefined
            | ExprKind::Nonreal => 0,
            ExprKind::FunctionCall { args, .. } => args.iter().map(|a| a.node_count()).sum(),
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().map(|c| c.node_count()).sum()
            }
            ExprKind::Pow(base, exp) => base.node_count() + exp.node_count(),
            ExprKind::Matrix { entries, .. } => entries.iter().map(|e| e.node_count()).sum(),
        }
    }
}

/// Strict sign of a term, when it is structurally certain.
fn definite_sign(e: &Expr) -> Option<Sign> {
    match &e.kind {
        ExprKind::Rational(r) => {
            if r.is_zero() {
                None
            } else if r.is_negative() {
                Some(Sign::Negative)
            } else {
                Some(Sign::Positive)
            }
        }
        ExprKind::Float(f) => {
            if *f > 0.0 {
                Some(Sign::Positive)
            } else if *f < 0.0 {
                Some(Sign::Negative)
            } else {
                None
            }
        }
        ExprKind::Symbol(s) => {
            // pi and e are positive; i has no real sign.
            if s.id() == KS.pi || s.id() == KS.e {
                Some(Sign::Positive)
            } else {
                None
            }
        }
        ExprKind::Sum(terms) => {
            let mut signs = terms.iter().map(|t| definite_sign(t));
            let first = signs.next().flatten()?;
            signs.all(|s| s == Some(first)).then_some(first)
        }
        ExprKind::Product(factors) => {
            let mut sign = Sign::Positive;
            for f in factors {
                match definite_sign(f)? {
                    Sign::Positive => {}
                    Sign::Negative => sign = sign.flip(),
                }
            }
            Some(sign)
        }
        ExprKind::Pow(base, exp) => match definite_sign(base)? {
            Sign::Positive => Some(Sign::Positive),
            Sign::Negative => {
                let n = exp.as_rational()?.as_integer()?;
                if n % 2 == 0 {
                    Some(Sign::Positive)
                } else {
                    Some(Sign::Negative)
                }
            }
        },
        ExprKind::FunctionCall { name, args } => {
            let id = name.id();
            if id == KS.exp {
                Some(Sign::Positive)
            } else if id == KS.abs && args.len() == 1 && args[0].is_null().is_false() {
                Some(Sign::Positive)
            } else if id == KS.cbrt && args.len() == 1 {
                definite_sign(&args[0])
            } else {
                None
            }
        }
        ExprKind::Matrix { .. } | ExprKind::Undefined | ExprKind::Nonreal => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_on_constants() {
        assert_eq!(Expr::integer(0).is_null(), TriBool::True);
        assert_eq!(Expr::integer(7).is_null(), TriBool::False);
        assert_eq!(Expr::rational(-3, 4).is_null(), TriBool::False);
        assert_eq!(Expr::float(0.0).is_null(), TriBool::True);
    }

    #[test]
    fn test_is_null_on_symbols() {
        assert_eq!(Expr::symbol("x").is_null(), TriBool::Unknown);
        assert_eq!(Expr::symbol("pi").is_null(), TriBool::False);
    }

    #[test]
    fn test_sum_of_positive_radicals_is_nonzero() {
        // sqrt(2) + sqrt(3) cannot be zero: every term is strictly positive.
        let e = Expr::sum(vec![
            Expr::sqrt(Expr::integer(2)),
            Expr::sqrt(Expr::integer(3)),
        ]);
        assert_eq!(e.is_null(), TriBool::False);
    }

    #[test]
    fn test_mixed_sign_sum_is_unknown() {
        let e = Expr::sum(vec![Expr::symbol("x"), Expr::integer(-1)]);
        assert_eq!(e.is_null(), TriBool::Unknown);
    }

    #[test]
    fn test_product_with_unknown_factor() {
        let e = Expr::new(ExprKind::Product(vec![
            std::sync::Arc::new(Expr::integer(2)),
            std::sync::Arc::new(Expr::symbol("x")),
        ]));
        assert_eq!(e.is_null(), TriBool::Unknown);
    }

    #[test]
    fn test_contains_symbol() {
        let x = crate::core::symbol::symb("x");
        let e = Expr::sum(vec![Expr::symbol("x"), Expr::integer(1)]);
        assert!(e.contains_symbol(x.id()));
        let y = crate::core::symbol::symb("y");
        assert!(!e.contains_symbol(y.id()));
    }

    #[test]
    fn test_node_count() {
        let e = Expr::sum(vec![Expr::symbol("x"), Expr::integer(1)]);
        assert_eq!(e.node_count(), 3);
    }
}
