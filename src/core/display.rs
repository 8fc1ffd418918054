//! Canonical serialization for expressions.
//!
//! `Display` renders the one canonical text form of an expression: compact,
//! no whitespace, every byte significant. Two reduced expressions are
//! considered identical exactly when their serializations are byte-equal,
//! and every serialization parses back to a structurally equal tree.
//!
//! Rendering rules:
//! - Sum terms join with `+`, negative terms fold the sign into `-`
//! - Products join with `*`; a leading `-1` renders as a bare minus
//! - Power bases and exponents are parenthesized whenever re-parsing could
//!   regroup them (`(1/2)^x`, `x^(-1)`)
//! - Rationals render as `p` or `p/q`, floats with the shortest round-trip
//!   form, matrices as `[[a,b],[c,d]]`

use std::fmt;
use std::sync::Arc;

use crate::core::expr::{Expr, ExprKind};

/// Split a leading negative coefficient off a term.
///
/// Returns the positive remainder if the term is a negative number or a
/// product with a negative numeric head, so sums can render `a-b` instead
/// of `a+-1*b`.
fn extract_negative(expr: &Expr) -> Option<Expr> {
    match &expr.kind {
        ExprKind::Product(factors) => {
            let first = factors.first()?;
            match &first.kind {
                ExprKind::Rational(n) if n.is_negative() => {
                    if n.is_minus_one() {
                        if factors.len() == 2 {
                            return Some(Expr::unwrap_arc(Arc::clone(&factors[1])));
                        }
                        return Some(Expr::product_from_arcs(factors[1..].to_vec()));
                    }
                    let mut rest: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
                    rest.push(Arc::new(Expr::from_rational(n.abs())));
                    rest.extend_from_slice(&factors[1..]);
                    Some(Expr::product_from_arcs(rest))
                }
                ExprKind::Float(x) if *x < 0.0 => {
                    if *x == -1.0 {
                        if factors.len() == 2 {
                            return Some(Expr::unwrap_arc(Arc::clone(&factors[1])));
                        }
                        return Some(Expr::product_from_arcs(factors[1..].to_vec()));
                    }
                    let mut rest: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
                    rest.push(Arc::new(Expr::float(-*x)));
                    rest.extend_from_slice(&factors[1..]);
                    Some(Expr::product_from_arcs(rest))
                }
                _ => None,
            }
        }
        ExprKind::Rational(n) if n.is_negative() => Some(Expr::from_rational(n.abs())),
        ExprKind::Float(x) if *x < 0.0 => Some(Expr::float(-*x)),
        _ => None,
    }
}

/// A power base re-parses wrongly without parens unless it is atomic.
fn needs_parens_as_base(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Sum(_) | ExprKind::Product(_) | ExprKind::Pow(_, _) => true,
        // 1/2^x regroups as 1/(2^x); -2^x regroups as -(2^x)
        ExprKind::Rational(r) => r.is_negative() || !r.is_integer(),
        ExprKind::Float(x) => *x < 0.0,
        ExprKind::Symbol(_)
        | ExprKind::FunctionCall { .. }
        | ExprKind::Matrix { .. }
        | ExprKind::Undefined
        | ExprKind::Nonreal => false,
    }
}

/// Exponents keep parens unless they are a plain positive number, symbol or
/// function call.
fn needs_parens_as_exponent(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Rational(r) => r.is_negative() || !r.is_integer(),
        ExprKind::Float(x) => *x < 0.0,
        ExprKind::Symbol(_) | ExprKind::FunctionCall { .. } => false,
        _ => true,
    }
}

fn write_wrapped(f: &mut fmt::Formatter<'_>, expr: &Expr, wrap: bool) -> fmt::Result {
    if wrap {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn format_sum(f: &mut fmt::Formatter<'_>, terms: &[Arc<Expr>]) -> fmt::Result {
    let mut first = true;
    for term in terms {
        if let Some(positive) = extract_negative(term) {
            write!(f, "-")?;
            write_wrapped(f, &positive, matches!(positive.kind, ExprKind::Sum(_)))?;
        } else {
            if !first {
                write!(f, "+")?;
            }
            write_wrapped(f, term, matches!(term.kind, ExprKind::Sum(_)))?;
        }
        first = false;
    }
    Ok(())
}

fn format_product(f: &mut fmt::Formatter<'_>, factors: &[Arc<Expr>]) -> fmt::Result {
    // A negative numeric head renders as a sign on the whole product, with
    // a coefficient of -1 disappearing entirely.
    let mut rest = factors;
    if factors.len() >= 2
        && let Some(first) = factors.first()
    {
        match &first.kind {
            ExprKind::Rational(n) if n.is_negative() => {
                write!(f, "-")?;
                if !n.is_minus_one() {
                    write!(f, "{}*", Expr::from_rational(n.abs()))?;
                }
                rest = &factors[1..];
            }
            ExprKind::Float(x) if *x < 0.0 => {
                write!(f, "-")?;
                if *x != -1.0 {
                    write!(f, "{}*", Expr::float(-*x))?;
                }
                rest = &factors[1..];
            }
            _ => {}
        }
    }

    let mut first = true;
    for factor in rest {
        if !first {
            write!(f, "*")?;
        }
        write_wrapped(f, factor, matches!(factor.kind, ExprKind::Sum(_)))?;
        first = false;
    }
    Ok(())
}

fn format_pow(f: &mut fmt::Formatter<'_>, base: &Expr, exponent: &Expr) -> fmt::Result {
    write_wrapped(f, base, needs_parens_as_base(base))?;
    write!(f, "^")?;
    write_wrapped(f, exponent, needs_parens_as_exponent(exponent))
}

fn format_function_call(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    args: &[Arc<Expr>],
) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{arg}")?;
    }
    write!(f, ")")
}

fn format_matrix(
    f: &mut fmt::Formatter<'_>,
    rows: usize,
    cols: usize,
    entries: &[Arc<Expr>],
) -> fmt::Result {
    write!(f, "[")?;
    for r in 0..rows {
        if r > 0 {
            write!(f, ",")?;
        }
        write!(f, "[")?;
        for c in 0..cols {
            if c > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", entries[r * cols + c])?;
        }
        write!(f, "]")?;
    }
    write!(f, "]")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Rational(r) => write!(f, "{r}"),
            ExprKind::Float(x) => write!(f, "{x}"),
            ExprKind::Symbol(s) => write!(f, "{}", s.name()),
            ExprKind::FunctionCall { name, args } => format_function_call(f, name.name(), args),
            ExprKind::Sum(terms) => format_sum(f, terms),
            ExprKind::Product(factors) => format_product(f, factors),
            ExprKind::Pow(base, exp) => format_pow(f, base, exp),
            ExprKind::Matrix {
                rows,
                cols,
                entries,
            } => format_matrix(f, *rows, *cols, entries),
            ExprKind::Undefined => write!(f, "undef"),
            ExprKind::Nonreal => write!(f, "nonreal"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Expr::integer(3).to_string(), "3");
        assert_eq!(Expr::rational(-5, 2).to_string(), "-5/2");
        assert_eq!(Expr::float(0.5).to_string(), "0.5");
        assert_eq!(Expr::float(2.0).to_string(), "2");
    }

    #[test]
    fn test_display_polynomial_shape() {
        // Canonical order puts the constant first, then ascending powers.
        let e = Expr::sum(vec![
            Expr::pow_static(Expr::symbol("x"), Expr::integer(2)),
            Expr::product(vec![Expr::integer(-5), Expr::symbol("x")]),
            Expr::integer(6),
        ]);
        assert_eq!(e.to_string(), "6-5*x+x^2");
    }

    #[test]
    fn test_display_negation() {
        let e = Expr::product(vec![Expr::integer(-1), Expr::symbol("x")]);
        assert_eq!(e.to_string(), "-x");
        let e = Expr::product(vec![Expr::integer(-2), Expr::symbol("x")]);
        assert_eq!(e.to_string(), "-2*x");
    }

    #[test]
    fn test_display_division_as_inverse_power() {
        let e = Expr::div_expr(Expr::symbol("x"), Expr::symbol("y"));
        assert_eq!(e.to_string(), "x*y^(-1)");
    }

    #[test]
    fn test_display_pow_parens() {
        let e = Expr::pow_static(Expr::rational(1, 2), Expr::symbol("x"));
        assert_eq!(e.to_string(), "(1/2)^x");
        let e = Expr::sqrt(Expr::integer(2));
        assert_eq!(e.to_string(), "2^(1/2)");
    }

    #[test]
    fn test_display_function_and_matrix() {
        let e = Expr::func("sin", vec![Expr::symbol("x")]);
        assert_eq!(e.to_string(), "sin(x)");
        let m = Expr::matrix(
            2,
            2,
            vec![
                Expr::integer(1),
                Expr::integer(2),
                Expr::integer(3),
                Expr::integer(4),
            ],
        );
        assert_eq!(m.to_string(), "[[1,2],[3,4]]");
    }

    #[test]
    fn test_display_markers() {
        assert_eq!(Expr::undefined().to_string(), "undef");
        assert_eq!(Expr::nonreal().to_string(), "nonreal");
    }
}
