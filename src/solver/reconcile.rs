//! Pairing exact solutions with their numeric values.
//!
//! Every surviving exact solution is displayed next to its approximation,
//! with two flags steering presentation: whether both serializations are the
//! same text (show just one), and whether they denote the same value (join
//! with `=` rather than `≈`). Candidates whose approximation is nonreal are
//! dropped quietly; candidates whose approximation is undefined are dropped
//! too and reported once after the whole set has been walked.

use std::sync::Arc;

use crate::approx::{Approximation, approximate, approximate_real};
use crate::context::SolveContext;
use crate::conventions::Conventions;
use crate::core::Expr;
use crate::parser::parse;
use crate::store::ExactSolution;

/// Relative tolerance under which the exact and approximate values count as
/// the same number.
const EQUALITY_TOLERANCE: f64 = 1e-10;

/// Build display slots for exact candidates. Returns the surviving slots
/// and whether any candidate approximated to undefined.
pub(crate) fn reconcile_exact(
    candidates: &[Arc<Expr>],
    ctx: &SolveContext,
    conventions: Conventions,
) -> (Vec<ExactSolution>, bool) {
    let mut slots = Vec::with_capacity(candidates.len());
    let mut undefined = false;
    for exact in candidates {
        match approximate(exact, conventions) {
            Approximation::Nonreal => {}
            Approximation::Undefined => undefined = true,
            approx => slots.push(slot_for(exact, approx, ctx, conventions)),
        }
    }
    (slots, undefined)
}

/// Slots for roots that only exist numerically. The value is its own
/// approximation, so one serialization fills both layouts.
pub(crate) fn approximated_slots(values: &[Arc<Expr>]) -> Vec<ExactSolution> {
    values
        .iter()
        .map(|value| {
            let text = value.to_string();
            ExactSolution {
                exact_layout: Some(text.clone()),
                approximate_layout: Some(text),
                identical: true,
                equal: true,
            }
        })
        .collect()
}

fn slot_for(
    exact: &Arc<Expr>,
    approx: Approximation,
    ctx: &SolveContext,
    conventions: Conventions,
) -> ExactSolution {
    let approximate_text = approx.to_expr().to_string();
    if ctx.exact_suppressed(exact) {
        return ExactSolution {
            exact_layout: None,
            approximate_layout: Some(approximate_text),
            identical: true,
            equal: false,
        };
    }
    let exact_text = exact.to_string();
    if exact_text == approximate_text {
        return ExactSolution {
            exact_layout: Some(exact_text),
            approximate_layout: Some(approximate_text),
            identical: true,
            equal: true,
        };
    }
    let equal = denote_same_value(exact, &approximate_text, ctx, conventions);
    ExactSolution {
        exact_layout: Some(exact_text),
        approximate_layout: Some(approximate_text),
        identical: false,
        equal,
    }
}

/// Whether the approximate serialization names the same value as the exact
/// expression. Scanning the approximate text back recovers exact rationals
/// (`0.5` scans as `1/2`), so a structural comparison settles most cases.
/// Exact forms that already carry float leaves may serialize with rounding,
/// so they get a numeric comparison instead.
fn denote_same_value(
    exact: &Arc<Expr>,
    approximate_text: &str,
    ctx: &SolveContext,
    conventions: Conventions,
) -> bool {
    let Ok(rescanned) = parse(approximate_text, &ctx.definitions) else {
        return false;
    };
    if **exact == rescanned {
        return true;
    }
    if !exact.contains_float() {
        return false;
    }
    let (Some(a), Some(b)) = (
        approximate_real(exact, conventions, None),
        approximate_real(&rescanned, conventions, None),
    ) else {
        return false;
    };
    (a - b).abs() <= EQUALITY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
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
    use crate::conventions::ComplexFormat;
    use crate::core::ExprKind;

    fn candidate(text: &str, ctx: &SolveContext) -> Arc<Expr> {
        Arc::new(parse(text, &ctx.definitions).unwrap())
    }

    #[test]
    fn integer_layouts_are_identical() {
        let ctx = SolveContext::new();
        let (slots, undefined) = reconcile_exact(&[candidate("2", &ctx)], &ctx, ctx.conventions);
        assert!(!undefined);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("2"));
        assert_eq!(slots[0].approximate_layout.as_deref(), Some("2"));
        assert!(slots[0].identical);
        assert!(slots[0].equal);
    }

    #[test]
    fn rational_rescans_to_the_same_value() {
        let ctx = SolveContext::new();
        let (slots, _) = reconcile_exact(&[candidate("1/2", &ctx)], &ctx, ctx.conventions);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("1/2"));
        assert_eq!(slots[0].approximate_layout.as_deref(), Some("0.5"));
        assert!(!slots[0].identical);
        assert!(slots[0].equal);
    }

    #[test]
    fn surd_differs_from_its_decimal() {
        let ctx = SolveContext::new();
        let (slots, _) = reconcile_exact(&[candidate("2^(1/2)", &ctx)], &ctx, ctx.conventions);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("2^(1/2)"));
        assert_eq!(
            slots[0].approximate_layout.as_deref(),
            Some("1.4142135623730951")
        );
        assert!(!slots[0].identical);
        assert!(!slots[0].equal);
    }

    #[test]
    fn transcendental_value_is_not_equal_to_its_rounding() {
        let ctx = SolveContext::new();
        let (slots, _) = reconcile_exact(&[candidate("pi/2", &ctx)], &ctx, ctx.conventions);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("1/2*pi"));
        assert!(!slots[0].identical);
        assert!(!slots[0].equal);
    }

    #[test]
    fn imaginary_pair_under_cartesian() {
        let ctx = SolveContext::new().with_complex_format(ComplexFormat::Cartesian);
        let (slots, undefined) = reconcile_exact(&[candidate("-i", &ctx)], &ctx, ctx.conventions);
        assert!(!undefined);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("-i"));
        assert_eq!(slots[0].approximate_layout.as_deref(), Some("0-i"));
        assert!(!slots[0].identical);
        assert!(slots[0].equal);
    }

    #[test]
    fn nonreal_under_real_format_drops_quietly() {
        let ctx = SolveContext::new();
        let (slots, undefined) = reconcile_exact(&[candidate("-i", &ctx)], &ctx, ctx.conventions);
        assert!(slots.is_empty());
        assert!(!undefined);
    }

    #[test]
    fn undefined_candidates_drop_and_report() {
        let ctx = SolveContext::new();
        let candidates = [Arc::new(Expr::undefined()), candidate("3", &ctx)];
        let (slots, undefined) = reconcile_exact(&candidates, &ctx, ctx.conventions);
        assert!(undefined);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("3"));
    }

    #[test]
    fn suppression_withholds_the_exact_layout() {
        let ctx = SolveContext::new()
            .suppress_exact_when(|expr| matches!(&expr.kind, ExprKind::Pow(_, _)));
        let (slots, _) = reconcile_exact(&[candidate("2^(1/2)", &ctx)], &ctx, ctx.conventions);
        assert_eq!(slots[0].exact_layout, None);
        assert_eq!(
            slots[0].approximate_layout.as_deref(),
            Some("1.4142135623730951")
        );
        assert!(slots[0].identical);
        assert!(!slots[0].equal);
    }

    #[test]
    fn float_tainted_exact_compares_numerically() {
        let ctx = SolveContext::new();
        let exact = Arc::new(Expr::product_from_arcs(vec![
            Arc::new(Expr::float(2.0)),
            Arc::new(Expr::symbol("pi")),
        ]));
        let (slots, _) = reconcile_exact(&[exact], &ctx, ctx.conventions);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("2*pi"));
        assert!(!slots[0].identical);
        assert!(slots[0].equal);
    }

    #[test]
    fn approximated_slots_share_one_text() {
        let values = [Arc::new(Expr::float(1.5)), Arc::new(Expr::integer(81))];
        let slots = approximated_slots(&values);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].exact_layout.as_deref(), Some("1.5"));
        assert_eq!(slots[0].approximate_layout.as_deref(), Some("1.5"));
        assert!(slots[0].identical);
        assert!(slots[0].equal);
        assert_eq!(slots[1].exact_layout.as_deref(), Some("81"));
    }
}
