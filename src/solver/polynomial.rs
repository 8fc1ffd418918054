//! Closed-form polynomial solving in one unknown.
//!
//! Coefficient extraction is degree-bounded; degrees two and three have
//! closed forms. The quadratic formula always produces exact roots. The
//! cubic tries a rational root first (deflating to a quadratic), then
//! Cardano's branches on the discriminant sign; three real roots with no
//! rational among them (casus irreducibilis) have no real radical form, so
//! that branch and non-rational coefficients fall back to numeric roots.
//! Every result carries the discriminant as one extra trailing slot.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::approx::approximate_real;
use crate::conventions::Conventions;
use crate::core::known::get_symbol;
use crate::core::{Expr, ExprKind, KS, Rational};
use crate::reduce::Reducer;

/// Trial division bound for divisor enumeration in the rational root
/// search; numbers with no divisor found below it fall through to Cardano.
const DIVISOR_SCAN_LIMIT: i128 = 100_000;

/// Upper bound on rational root candidates tested before giving up.
const ROOT_CANDIDATE_LIMIT: usize = 10_000;

/// Solution slots for one polynomial equation, roots first, discriminant
/// last. `Approximated` roots are numeric (`Float`) because no exact real
/// closed form exists; reconciliation clones them instead of comparing.
pub(crate) enum PolynomialRoots {
    Exact(Vec<Arc<Expr>>),
    Approximated(Vec<Arc<Expr>>),
}

/// Coefficients of `form` seen as a polynomial in the symbol `unknown`,
/// constant term first, trailing provably-zero coefficients trimmed.
/// `None` when the form is not a polynomial in that symbol or its degree
/// exceeds [`crate::MAX_EXTRACTED_DEGREE`].
pub(crate) fn extract_coefficients(
    form: &Arc<Expr>,
    unknown: u64,
    reducer: &Reducer<'_>,
) -> Option<Vec<Arc<Expr>>> {
    let mut buckets: Vec<Vec<Arc<Expr>>> = vec![Vec::new(); crate::MAX_EXTRACTED_DEGREE + 1];
    let terms: Vec<Arc<Expr>> = match &form.kind {
        ExprKind::Sum(terms) => terms.clone(),
        _ => vec![Arc::clone(form)],
    };
    for term in terms {
        let (degree, coefficient) = term_degree(&term, unknown)?;
        buckets[degree].push(coefficient);
    }
    let top = buckets.iter().rposition(|bucket| !bucket.is_empty())?;
    let mut coefficients: Vec<Arc<Expr>> = buckets
        .into_iter()
        .take(top + 1)
        .map(|bucket| reducer.reduce(&sum_of(bucket)))
        .collect();
    while coefficients.len() > 1
        && coefficients
            .last()
            .is_some_and(|leading| leading.is_null().is_true())
    {
        coefficients.pop();
    }
    Some(coefficients)
}

/// Degree of one reduced term in the unknown, with the residual
/// coefficient. `None` when the unknown occurs non-polynomially.
fn term_degree(term: &Arc<Expr>, unknown: u64) -> Option<(usize, Arc<Expr>)> {
    match &term.kind {
        ExprKind::Symbol(symbol) if symbol.id() == unknown => {
            Some((1, Arc::new(Expr::integer(1))))
        }
        ExprKind::Pow(base, exponent) => {
            if let Some(degree) = symbol_power(base, exponent, unknown) {
                Some((degree, Arc::new(Expr::integer(1))))
            } else if term.contains_symbol(unknown) {
                None
            } else {
                Some((0, Arc::clone(term)))
            }
        }
        ExprKind::Product(factors) => {
            let mut degree = 0usize;
            let mut rest: Vec<Arc<Expr>> = Vec::new();
            for factor in factors {
                if let ExprKind::Symbol(symbol) = &factor.kind
                    && symbol.id() == unknown
                {
                    degree += 1;
                } else if let ExprKind::Pow(base, exponent) = &factor.kind
                    && let Some(power) = symbol_power(base, exponent, unknown)
                {
                    degree += power;
                } else if factor.contains_symbol(unknown) {
                    return None;
                } else {
                    rest.push(Arc::clone(factor));
                }
            }
            if degree > crate::MAX_EXTRACTED_DEGREE {
                return None;
            }
            Some((degree, product_of(rest)))
        }
        _ if term.contains_symbol(unknown) => None,
        _ => Some((0, Arc::clone(term))),
    }
}

/// `base ^ exponent` as a plain power of the unknown, if that is what it
/// is: the base must be the unknown itself and the exponent a positive
/// integer within the extraction bound.
fn symbol_power(base: &Arc<Expr>, exponent: &Arc<Expr>, unknown: u64) -> Option<usize> {
    let ExprKind::Symbol(symbol) = &base.kind else {
        return None;
    };
    if symbol.id() != unknown {
        return None;
    }
    let ExprKind::Rational(r) = &exponent.kind else {
        return None;
    };
    let value = r.as_integer()?;
    if value < 1 || value > crate::MAX_EXTRACTED_DEGREE as i128 {
        return None;
    }
    usize::try_from(value).ok()
}

fn sum_of(terms: Vec<Arc<Expr>>) -> Arc<Expr> {
    Arc::new(Expr::sum_from_arcs(terms))
}

fn product_of(factors: Vec<Arc<Expr>>) -> Arc<Expr> {
    Arc::new(Expr::product_from_arcs(factors))
}

fn rational_expr(value: Rational) -> Arc<Expr> {
    Arc::new(Expr::rational(value.numerator(), value.denominator()))
}

fn rational_of(expr: &Arc<Expr>) -> Option<Rational> {
    match &expr.kind {
        ExprKind::Rational(r) => Some(*r),
        _ => None,
    }
}

/// Solve a degree-2 or degree-3 polynomial with the extracted
/// `coefficients` (constant first). `None` when even the numeric fallback
/// cannot evaluate the coefficients.
pub(crate) fn closed_form_slots(
    coefficients: &[Arc<Expr>],
    user: &Reducer<'_>,
    conventions: Conventions,
) -> Option<PolynomialRoots> {
    match coefficients.len() {
        3 => Some(PolynomialRoots::Exact(quadratic_slots(
            &coefficients[0],
            &coefficients[1],
            &coefficients[2],
            user,
            conventions,
        ))),
        4 => cubic_slots(coefficients, user, conventions),
        _ => None,
    }
}

/// `c2 x² + c1 x + c0 = 0` by the quadratic formula: discriminant
/// `c1² - 4 c2 c0`, one root `-c1/(2 c2)` when it is provably zero, else
/// `(-c1 ∓ sqrt(delta))/(2 c2)` in ascending numeric order. Negative
/// discriminants surface through reduction as `nonreal` roots (real
/// format) or cartesian pairs; the caller's reconciliation sorts that out.
fn quadratic_slots(
    c0: &Arc<Expr>,
    c1: &Arc<Expr>,
    c2: &Arc<Expr>,
    user: &Reducer<'_>,
    conventions: Conventions,
) -> Vec<Arc<Expr>> {
    let delta = user.reduce(&sum_of(vec![
        Arc::new(Expr::pow_from_arcs(
            Arc::clone(c1),
            Arc::new(Expr::integer(2)),
        )),
        product_of(vec![
            Arc::new(Expr::integer(-4)),
            Arc::clone(c2),
            Arc::clone(c0),
        ]),
    ]));
    // (2 c2)^(-1)
    let inverse_denominator = Arc::new(Expr::pow_from_arcs(
        product_of(vec![Arc::new(Expr::integer(2)), Arc::clone(c2)]),
        Arc::new(Expr::integer(-1)),
    ));
    let minus_c1 = product_of(vec![Arc::new(Expr::integer(-1)), Arc::clone(c1)]);

    if delta.is_null().is_true() {
        let root = user.reduce(&product_of(vec![
            Arc::clone(&minus_c1),
            Arc::clone(&inverse_denominator),
        ]));
        return vec![root, delta];
    }

    let sqrt_delta = Arc::new(Expr::pow_from_arcs(
        Arc::clone(&delta),
        Arc::new(Expr::rational(1, 2)),
    ));
    let minus_root = user.reduce(&product_of(vec![
        sum_of(vec![
            Arc::clone(&minus_c1),
            product_of(vec![Arc::new(Expr::integer(-1)), Arc::clone(&sqrt_delta)]),
        ]),
        Arc::clone(&inverse_denominator),
    ]));
    let plus_root = user.reduce(&product_of(vec![
        sum_of(vec![Arc::clone(&minus_c1), sqrt_delta]),
        inverse_denominator,
    ]));
    let mut slots = vec![minus_root, plus_root];
    sort_ascending(&mut slots, conventions);
    slots.push(delta);
    slots
}

/// `c3 x³ + c2 x² + c1 x + c0 = 0`. Rational coefficients go through the
/// exact pipeline; anything else (or exact arithmetic overflow) through
/// the numeric one.
fn cubic_slots(
    coefficients: &[Arc<Expr>],
    user: &Reducer<'_>,
    conventions: Conventions,
) -> Option<PolynomialRoots> {
    let delta = discriminant_expr(coefficients, user);
    if let (Some(d), Some(c), Some(b), Some(a)) = (
        rational_of(&coefficients[0]),
        rational_of(&coefficients[1]),
        rational_of(&coefficients[2]),
        rational_of(&coefficients[3]),
    ) && let Some(result) = rational_cubic(a, b, c, d, &delta, user, conventions)
    {
        return Some(result);
    }
    numeric_cubic_slots(coefficients, delta, conventions)
}

/// The full cubic discriminant
/// `18·c3·c2·c1·c0 - 4·c2³·c0 + c2²·c1² - 4·c3·c1³ - 27·c3²·c0²`,
/// built symbolically so it folds exactly for rational coefficients and
/// stays readable for symbolic ones.
fn discriminant_expr(coefficients: &[Arc<Expr>], user: &Reducer<'_>) -> Arc<Expr> {
    let c0 = &coefficients[0];
    let c1 = &coefficients[1];
    let c2 = &coefficients[2];
    let c3 = &coefficients[3];
    let square = |e: &Arc<Expr>| {
        Arc::new(Expr::pow_from_arcs(
            Arc::clone(e),
            Arc::new(Expr::integer(2)),
        ))
    };
    let cube = |e: &Arc<Expr>| {
        Arc::new(Expr::pow_from_arcs(
            Arc::clone(e),
            Arc::new(Expr::integer(3)),
        ))
    };
    user.reduce(&sum_of(vec![
        product_of(vec![
            Arc::new(Expr::integer(18)),
            Arc::clone(c3),
            Arc::clone(c2),
            Arc::clone(c1),
            Arc::clone(c0),
        ]),
        product_of(vec![Arc::new(Expr::integer(-4)), cube(c2), Arc::clone(c0)]),
        product_of(vec![square(c2), square(c1)]),
        product_of(vec![Arc::new(Expr::integer(-4)), Arc::clone(c3), cube(c1)]),
        product_of(vec![Arc::new(Expr::integer(-27)), square(c3), square(c0)]),
    ]))
}

/// Exact cubic over rationals: rational root deflation first, then the
/// discriminant-directed Cardano branches. `None` only on `i128` overflow,
/// which sends the caller to the numeric fallback.
fn rational_cubic(
    a: Rational,
    b: Rational,
    c: Rational,
    d: Rational,
    delta: &Arc<Expr>,
    user: &Reducer<'_>,
    conventions: Conventions,
) -> Option<PolynomialRoots> {
    if let Some(root) = rational_root(a, b, c, d) {
        // synthetic division by (x - root) leaves a quadratic
        let q2 = a;
        let q1 = b.checked_add(&root.checked_mul(&q2)?)?;
        let q0 = c.checked_add(&root.checked_mul(&q1)?)?;
        let mut slots = quadratic_slots(
            &rational_expr(q0),
            &rational_expr(q1),
            &rational_expr(q2),
            user,
            conventions,
        );
        slots.pop();
        slots.push(rational_expr(root));
        sort_ascending(&mut slots, conventions);
        slots.push(Arc::clone(delta));
        return Some(PolynomialRoots::Exact(slots));
    }

    // depressed form t³ + p t + q, where x = t - c2/(3 c3)
    let three_a = Rational::integer(3).checked_mul(&a)?;
    let p = three_a
        .checked_mul(&c)?
        .checked_sub(&b.checked_mul(&b)?)?
        .checked_div(&three_a.checked_mul(&a)?)?;
    let q_numerator = Rational::integer(2)
        .checked_mul(&b.checked_pow(3)?)?
        .checked_sub(&Rational::integer(9).checked_mul(&a.checked_mul(&b)?.checked_mul(&c)?)?)?
        .checked_add(&Rational::integer(27).checked_mul(&a.checked_mul(&a)?.checked_mul(&d)?)?)?;
    let q = q_numerator.checked_div(&Rational::integer(27).checked_mul(&a.checked_pow(3)?)?)?;
    let shift = b.neg().checked_div(&three_a)?;
    let depressed_delta = Rational::integer(4)
        .checked_mul(&p.checked_pow(3)?)?
        .checked_add(&Rational::integer(27).checked_mul(&q.checked_mul(&q)?)?)?
        .neg();

    if depressed_delta.is_zero() {
        let mut slots = if p.is_zero() {
            // triple root at t = 0
            vec![rational_expr(shift)]
        } else {
            let double_root = Rational::integer(-3)
                .checked_mul(&q)?
                .checked_div(&Rational::integer(2).checked_mul(&p)?)?
                .checked_add(&shift)?;
            let simple_root = Rational::integer(3)
                .checked_mul(&q)?
                .checked_div(&p)?
                .checked_add(&shift)?;
            vec![rational_expr(double_root), rational_expr(simple_root)]
        };
        sort_ascending(&mut slots, conventions);
        slots.push(Arc::clone(delta));
        return Some(PolynomialRoots::Exact(slots));
    }

    if depressed_delta.is_negative() {
        // one real root: cbrt(-q/2 + s) + cbrt(-q/2 - s), s = sqrt(-delta/108)
        let radicand = depressed_delta
            .neg()
            .checked_div(&Rational::integer(108))?;
        let radical = Arc::new(Expr::pow_from_arcs(
            rational_expr(radicand),
            Arc::new(Expr::rational(1, 2)),
        ));
        let minus_half_q = q.checked_div(&Rational::integer(-2))?;
        let cbrt = get_symbol(KS.cbrt);
        let left = Arc::new(Expr::func_from_arcs(
            cbrt.clone(),
            vec![sum_of(vec![rational_expr(minus_half_q), Arc::clone(&radical)])],
        ));
        let right = Arc::new(Expr::func_from_arcs(
            cbrt,
            vec![sum_of(vec![
                rational_expr(minus_half_q),
                product_of(vec![Arc::new(Expr::integer(-1)), radical]),
            ])],
        ));
        let root = user.reduce(&sum_of(vec![left, right, rational_expr(shift)]));
        return Some(PolynomialRoots::Exact(vec![root, Arc::clone(delta)]));
    }

    // three real roots, no rational one: no real radical form exists
    let mut slots = float_slots(trigonometric_roots(p.to_f64(), q.to_f64(), shift.to_f64()));
    slots.push(Arc::clone(delta));
    Some(PolynomialRoots::Approximated(slots))
}

/// Numeric cubic for non-rational (or overflowing) coefficients. `None`
/// when a coefficient cannot be evaluated at all.
fn numeric_cubic_slots(
    coefficients: &[Arc<Expr>],
    delta: Arc<Expr>,
    conventions: Conventions,
) -> Option<PolynomialRoots> {
    let d = approximate_real(&coefficients[0], conventions, None)?;
    let c = approximate_real(&coefficients[1], conventions, None)?;
    let b = approximate_real(&coefficients[2], conventions, None)?;
    let a = approximate_real(&coefficients[3], conventions, None)?;
    let mut slots = float_slots(numeric_cubic_roots(a, b, c, d));
    slots.push(delta);
    Some(PolynomialRoots::Approximated(slots))
}

fn float_slots(mut values: Vec<f64>) -> Vec<Arc<Expr>> {
    values.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    values
        .into_iter()
        .map(|value| Arc::new(Expr::float(value)))
        .collect()
}

/// All real roots of `a x³ + b x² + c x + d` in floating point.
fn numeric_cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a == 0.0 || !(a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()) {
        return Vec::new();
    }
    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b.powi(3) - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a.powi(3));
    let shift = -b / (3.0 * a);
    if !(p.is_finite() && q.is_finite()) {
        return Vec::new();
    }
    let discriminant = -4.0 * p.powi(3) - 27.0 * q * q;
    if discriminant > 0.0 {
        return trigonometric_roots(p, q, shift);
    }
    let t_roots = if discriminant < 0.0 {
        let s = (q * q / 4.0 + p.powi(3) / 27.0).sqrt();
        vec![(-q / 2.0 + s).cbrt() + (-q / 2.0 - s).cbrt()]
    } else if p == 0.0 {
        vec![0.0]
    } else {
        vec![-3.0 * q / (2.0 * p), 3.0 * q / p]
    };
    t_roots.into_iter().map(|t| t + shift).collect()
}

/// Three real roots of the depressed cubic `t³ + p t + q` (requires a
/// strictly positive discriminant, hence `p < 0`), shifted back to `x`.
fn trigonometric_roots(p: f64, q: f64, shift: f64) -> Vec<f64> {
    let magnitude = 2.0 * (-p / 3.0).sqrt();
    let angle = ((3.0 * q) / (2.0 * p) * (-3.0 / p).sqrt())
        .clamp(-1.0, 1.0)
        .acos()
        / 3.0;
    let third_turn = 2.0 * std::f64::consts::PI / 3.0;
    vec![
        magnitude * angle.cos() + shift,
        magnitude * (angle - third_turn).cos() + shift,
        magnitude * (angle - 2.0 * third_turn).cos() + shift,
    ]
}

/// One rational root of `a x³ + b x² + c x + d`, if a bounded candidate
/// search finds one. Candidates are `±p/q` with `p` dividing the scaled
/// constant term and `q` the scaled leading coefficient.
fn rational_root(a: Rational, b: Rational, c: Rational, d: Rational) -> Option<Rational> {
    let scale = lcm(
        lcm(a.denominator(), b.denominator())?,
        lcm(c.denominator(), d.denominator())?,
    )?;
    let leading = scaled_integer(a, scale)?;
    let constant = scaled_integer(d, scale)?;
    if leading == 0 {
        return None;
    }
    if constant == 0 {
        return Some(Rational::ZERO);
    }
    let constant_divisors = divisors(constant);
    let leading_divisors = divisors(leading);
    let mut tested = 0usize;
    for numerator in &constant_divisors {
        for denominator in &leading_divisors {
            tested += 2;
            if tested > ROOT_CANDIDATE_LIMIT {
                return None;
            }
            for candidate in [
                Rational::new(*numerator, *denominator)?,
                Rational::new(-*numerator, *denominator)?,
            ] {
                if is_root(a, b, c, d, candidate) {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Exact Horner evaluation; overflow counts as "not a root".
fn is_root(a: Rational, b: Rational, c: Rational, d: Rational, x: Rational) -> bool {
    let value = a
        .checked_mul(&x)
        .and_then(|v| v.checked_add(&b))
        .and_then(|v| v.checked_mul(&x))
        .and_then(|v| v.checked_add(&c))
        .and_then(|v| v.checked_mul(&x))
        .and_then(|v| v.checked_add(&d));
    value.is_some_and(|v| v.is_zero())
}

fn scaled_integer(value: Rational, scale: i128) -> Option<i128> {
    value.numerator().checked_mul(scale / value.denominator())
}

fn lcm(a: i128, b: i128) -> Option<i128> {
    let g = crate::core::rational::gcd(a, b);
    if g == 0 {
        return None;
    }
    (a / g).checked_mul(b)
}

/// Divisors of `|n|`, found by trial division up to `sqrt(|n|)` (bounded);
/// incomplete for huge values, which just weakens the candidate search.
fn divisors(n: i128) -> Vec<i128> {
    let n = n.abs();
    let mut found = Vec::new();
    let mut d = 1i128;
    while d <= DIVISOR_SCAN_LIMIT && d.checked_mul(d).is_some_and(|square| square <= n) {
        if n % d == 0 {
            found.push(d);
            found.push(n / d);
        }
        d += 1;
    }
    found
}

/// Sort roots by their numeric value, ascending; roots with no real
/// approximation (cartesian pairs, markers) keep their relative order at
/// the end.
fn sort_ascending(roots: &mut Vec<Arc<Expr>>, conventions: Conventions) {
    let mut keyed: Vec<(f64, Arc<Expr>)> = roots
        .drain(..)
        .map(|root| {
            let key = approximate_real(&root, conventions, None).unwrap_or(f64::INFINITY);
            (key, root)
        })
        .collect();
    keyed.sort_by(|left, right| left.0.partial_cmp(&right.0).unwrap_or(Ordering::Equal));
    roots.extend(keyed.into_iter().map(|(_, root)| root));
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
    use crate::context::Definitions;
    use crate::conventions::{ComplexFormat, ReductionTarget};
    use crate::parser::parse;
    use crate::pool::Pool;

    fn coefficients_of(text: &str, pool: &Pool, conventions: Conventions) -> Option<Vec<Arc<Expr>>> {
        let defs = Definitions::new();
        let parsed = Arc::new(parse(text, &defs).unwrap());
        let analysis = Reducer::new(ReductionTarget::SystemForAnalysis, conventions, pool);
        let form = analysis.reduce(&parsed);
        let unknown = crate::core::symb("x").id();
        extract_coefficients(&form, unknown, &analysis)
    }

    fn slot_strings(slots: &[Arc<Expr>]) -> Vec<String> {
        slots.iter().map(|slot| slot.to_string()).collect()
    }

    fn solve(text: &str, conventions: Conventions) -> PolynomialRoots {
        let pool = Pool::default();
        let coefficients = coefficients_of(text, &pool, conventions).unwrap();
        let user = Reducer::new(ReductionTarget::User, conventions, &pool);
        closed_form_slots(&coefficients, &user, conventions).unwrap()
    }

    fn exact(text: &str) -> Vec<String> {
        match solve(text, Conventions::default()) {
            PolynomialRoots::Exact(slots) => slot_strings(&slots),
            PolynomialRoots::Approximated(_) => panic!("expected exact roots"),
        }
    }

    #[test]
    fn extracts_quadratic_coefficients() {
        let pool = Pool::default();
        let coefficients = coefficients_of("x^2-5*x+6", &pool, Conventions::default()).unwrap();
        assert_eq!(slot_strings(&coefficients), ["6", "-5", "1"]);
    }

    #[test]
    fn expanded_binomial_extracts_too() {
        let pool = Pool::default();
        let coefficients = coefficients_of("(x+2)^2", &pool, Conventions::default()).unwrap();
        assert_eq!(slot_strings(&coefficients), ["4", "4", "1"]);
    }

    #[test]
    fn transcendental_occurrences_are_not_polynomial() {
        let pool = Pool::default();
        assert!(coefficients_of("cos(x)-x", &pool, Conventions::default()).is_none());
        assert!(coefficients_of("2^x-3", &pool, Conventions::default()).is_none());
    }

    #[test]
    fn extraction_degree_is_bounded() {
        let pool = Pool::default();
        assert!(coefficients_of("x^11-1", &pool, Conventions::default()).is_none());
        let ten = coefficients_of("x^10-1", &pool, Conventions::default()).unwrap();
        assert_eq!(ten.len(), 11);
    }

    #[test]
    fn distinct_rational_roots_ascending_then_discriminant() {
        assert_eq!(exact("x^2-5*x+6"), ["2", "3", "1"]);
    }

    #[test]
    fn repeated_root_collapses_to_one_slot() {
        assert_eq!(exact("x^2-2*x+1"), ["1", "0"]);
    }

    #[test]
    fn negative_discriminant_real_format_roots_are_nonreal() {
        let PolynomialRoots::Exact(slots) = solve("x^2+1", Conventions::default()) else {
            panic!("expected exact slots");
        };
        assert_eq!(slots.len(), 3);
        assert!(matches!(slots[0].kind, ExprKind::Nonreal));
        assert!(matches!(slots[1].kind, ExprKind::Nonreal));
        assert_eq!(slots[2].to_string(), "-4");
    }

    #[test]
    fn negative_discriminant_cartesian_roots_are_imaginary() {
        let conventions = Conventions::new().with_complex_format(ComplexFormat::Cartesian);
        let PolynomialRoots::Exact(slots) = solve("x^2+1", conventions) else {
            panic!("expected exact slots");
        };
        assert_eq!(slot_strings(&slots), ["-i", "i", "-4"]);
    }

    #[test]
    fn cubic_with_three_rational_roots() {
        assert_eq!(exact("x^3-6*x^2+11*x-6"), ["1", "2", "3", "4"]);
    }

    #[test]
    fn cubic_with_one_real_irrational_root() {
        assert_eq!(exact("x^3-2"), ["cbrt(2)", "-108"]);
    }

    #[test]
    fn casus_irreducibilis_goes_numeric() {
        let PolynomialRoots::Approximated(slots) = solve("x^3-3*x+1", Conventions::default())
        else {
            panic!("expected approximated slots");
        };
        assert_eq!(slots.len(), 4);
        let values: Vec<f64> = slots[..3]
            .iter()
            .map(|slot| approximate_real(slot, Conventions::default(), None).unwrap())
            .collect();
        assert!((values[0] - -1.879_385_241_571_817).abs() < 1e-9);
        assert!((values[1] - 0.347_296_355_333_861).abs() < 1e-9);
        assert!((values[2] - 1.532_088_886_237_956).abs() < 1e-9);
        assert_eq!(slots[3].to_string(), "81");
    }

    #[test]
    fn symbolic_coefficients_go_numeric() {
        let PolynomialRoots::Approximated(slots) = solve("x^3-pi", Conventions::default()) else {
            panic!("expected approximated slots");
        };
        assert_eq!(slots.len(), 2);
        let root = approximate_real(&slots[0], Conventions::default(), None).unwrap();
        assert!((root - std::f64::consts::PI.cbrt()).abs() < 1e-12);
        assert_eq!(slots[1].to_string(), "-27*pi^2");
    }

    #[test]
    fn rational_root_search_finds_fractions() {
        // 2x³ - 3x² - 3x + 2 has roots -1, 1/2, 2
        assert_eq!(exact("2*x^3-3*x^2-3*x+2"), ["-1", "1/2", "2", "729"]);
    }
}
