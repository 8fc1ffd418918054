//! Interval scanning and root refinement for equations with no closed form.
//!
//! The search interval is stretched slightly on both sides, sampled on a
//! fixed grid, and every sign change is refined with Brent's method. A
//! local minimum of `|f|` between same-sign samples is refined too, which
//! catches roots of even multiplicity that never cross zero. Sample points
//! where the function has no real value are gaps: they never form a
//! bracket, so piecewise-real functions are scanned segment by segment.

use std::sync::Arc;

use crate::approx::approximate_real;
use crate::conventions::Conventions;
use crate::core::Expr;

/// Grid resolution of the scan; roots closer together than one step can be
/// missed.
const SCAN_STEPS: usize = 1024;

/// Iteration caps for the two refiners.
const MAX_BRENT_ITERATIONS: usize = 100;
const MAX_MINIMUM_ITERATIONS: usize = 80;

/// A refined minimum only counts as a root when `|f|` gets this close to
/// zero, relative to the position's magnitude.
const MINIMUM_ROOT_TOLERANCE: f64 = 1e-9;

/// What to do with the scan after a candidate root was processed.
enum Flow {
    Continue,
    Stop,
}

/// All real roots of `f` in `interval`, ascending, at most `max_roots` of
/// them. The second value reports whether another root exists beyond the
/// returned ones.
pub(crate) fn isolate_roots(
    f: &Arc<Expr>,
    variable: u64,
    interval: [f64; 2],
    conventions: Conventions,
    max_roots: usize,
) -> (Vec<f64>, bool) {
    let mut roots: Vec<f64> = Vec::new();
    let mut more = false;

    let span = interval[1] - interval[0];
    let stretch = (0.01 * span).max(0.01);
    let start = interval[0] - stretch;
    let end = interval[1] + stretch;
    #[allow(
        clippy::cast_precision_loss,
        reason = "Grid arithmetic on a four-digit step count"
    )]
    let step = (end - start) / SCAN_STEPS as f64;
    if !(step.is_finite() && step > 0.0) {
        return (roots, more);
    }

    let eval = |x: f64| {
        approximate_real(f, conventions, Some((variable, x))).filter(|y| y.is_finite())
    };

    let accept = |root: f64, roots: &mut Vec<f64>, more: &mut bool| {
        if root < interval[0] {
            return Flow::Continue;
        }
        if root > interval[1] {
            return Flow::Stop;
        }
        if let Some(&last) = roots.last()
            && (root - last).abs() <= MINIMUM_ROOT_TOLERANCE * root.abs().max(1.0)
        {
            return Flow::Continue;
        }
        if roots.len() == max_roots {
            *more = true;
            return Flow::Stop;
        }
        roots.push(root);
        Flow::Continue
    };

    // Rolling window of the last two real samples; a gap clears it.
    let mut window: [Option<(f64, f64)>; 2] = [None, None];
    for i in 0..=SCAN_STEPS {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Grid arithmetic on a four-digit step count"
        )]
        let x = start + step * i as f64;
        let Some(y) = eval(x) else {
            window = [None, None];
            continue;
        };

        let mut candidate = None;
        if y == 0.0 {
            candidate = Some(x);
        } else if let Some((x1, y1)) = window[1] {
            if y1 * y < 0.0 {
                candidate = brent(&eval, x1, x, y1, y);
            } else if let Some((x0, y0)) = window[0]
                && y0.signum() == y1.signum()
                && y1.signum() == y.signum()
                && y1.abs() < y0.abs()
                && y1.abs() <= y.abs()
            {
                // |f| dips between same-sign samples: possible root of even
                // multiplicity around x1.
                if let Some(xm) = refine_minimum(&eval, x0, x)
                    && let Some(fm) = eval(xm)
                    && fm.abs() <= MINIMUM_ROOT_TOLERANCE * xm.abs().max(1.0)
                {
                    candidate = Some(xm);
                }
            }
        }

        if let Some(root) = candidate
            && matches!(accept(root, &mut roots, &mut more), Flow::Stop)
        {
            return (roots, more);
        }

        window[0] = window[1];
        window[1] = Some((x, y));
    }

    (roots, more)
}

/// Brent's method on a sign-change bracket. `None` when the function stops
/// being real inside the bracket.
fn brent(
    eval: &impl Fn(f64) -> Option<f64>,
    mut a: f64,
    mut b: f64,
    mut fa: f64,
    mut fb: f64,
) -> Option<f64> {
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_BRENT_ITERATIONS {
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tolerance = 2.0 * f64::EPSILON * b.abs() + 0.5e-13;
        let midpoint = 0.5 * (c - b);
        if midpoint.abs() <= tolerance || fb == 0.0 {
            return Some(b);
        }
        if e.abs() >= tolerance && fa.abs() > fb.abs() {
            // Inverse quadratic interpolation, degrading to the secant when
            // only two points are distinct.
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                p = 2.0 * midpoint * s;
                q = 1.0 - s;
            } else {
                let t = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * midpoint * t * (t - r) - (b - a) * (r - 1.0));
                q = (t - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let by_interpolation = 3.0 * midpoint * q - (tolerance * q).abs();
            let by_previous = (e * q).abs();
            if 2.0 * p < by_interpolation.min(by_previous) {
                e = d;
                d = p / q;
            } else {
                d = midpoint;
                e = d;
            }
        } else {
            d = midpoint;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tolerance {
            b += d;
        } else {
            b += tolerance.copysign(midpoint);
        }
        fb = eval(b)?;
    }
    Some(b)
}

/// Golden-section search for the minimum of `|f|` on `[a, b]`.
fn refine_minimum(eval: &impl Fn(f64) -> Option<f64>, mut a: f64, mut b: f64) -> Option<f64> {
    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    for _ in 0..MAX_MINIMUM_ITERATIONS {
        let c = b - (b - a) * INV_PHI;
        let d = a + (b - a) * INV_PHI;
        let fc = eval(c)?.abs();
        let fd = eval(d)?.abs();
        if fc < fd {
            b = d;
        } else {
            a = c;
        }
        if (b - a).abs() <= 1e-13 * (1.0 + a.abs()) {
            break;
        }
    }
    Some((a + b) / 2.0)
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
    use crate::conventions::ReductionTarget;
    use crate::core::symb;
    use crate::parser::parse;
    use crate::pool::Pool;
    use crate::reduce::Reducer;

    fn scan(text: &str, interval: [f64; 2], max_roots: usize) -> (Vec<f64>, bool) {
        let defs = Definitions::new();
        let pool = Pool::default();
        let reducer = Reducer::new(
            ReductionTarget::SystemForApproximation,
            Conventions::default(),
            &pool,
        );
        let f = reducer.reduce(&Arc::new(parse(text, &defs).unwrap()));
        isolate_roots(&f, symb("x").id(), interval, Conventions::default(), max_roots)
    }

    #[test]
    fn dottie_number_from_cos_equation() {
        let (roots, more) = scan("cos(x)-x", [-10.0, 10.0], 10);
        assert_eq!(roots.len(), 1);
        assert!(!more);
        assert!((roots[0] - 0.739_085_133_215_160_7).abs() < 1e-9);
    }

    #[test]
    fn sine_roots_inside_a_subinterval() {
        let (roots, more) = scan("sin(x)", [1.0, 10.0], 10);
        assert!(!more);
        let expected = [
            std::f64::consts::PI,
            2.0 * std::f64::consts::PI,
            3.0 * std::f64::consts::PI,
        ];
        assert_eq!(roots.len(), expected.len());
        for (root, want) in roots.iter().zip(expected) {
            assert!((root - want).abs() < 1e-9);
        }
    }

    #[test]
    fn even_multiplicity_root_is_caught() {
        let (roots, more) = scan("x^2-2*x+1", [-10.0, 10.0], 10);
        assert!(!more);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rootless_function_reports_nothing() {
        let (roots, more) = scan("x^2+1", [-10.0, 10.0], 10);
        assert!(roots.is_empty());
        assert!(!more);
    }

    #[test]
    fn overflow_reports_more_at_any_cap() {
        let (roots, more) = scan("sin(10*x)", [-10.0, 10.0], 3);
        assert_eq!(roots.len(), 3);
        assert!(more);

        let (roots, more) = scan("sin(10*x)", [-10.0, 10.0], 2);
        assert_eq!(roots.len(), 2);
        assert!(more);
    }

    #[test]
    fn stretch_roots_outside_the_interval_are_not_reported() {
        // Root at -10.1 sits in the stretched margin only.
        let (roots, more) = scan("x+10.1", [-10.0, 10.0], 10);
        assert!(roots.is_empty());
        assert!(!more);

        // Root at 10.1 likewise, and the scan stops there.
        let (roots, more) = scan("x-10.1", [-10.0, 10.0], 10);
        assert!(roots.is_empty());
        assert!(!more);
    }

    #[test]
    fn gaps_in_the_domain_never_bracket() {
        let (roots, more) = scan("sqrt(x)-2", [-10.0, 10.0], 10);
        assert!(!more);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 4.0).abs() < 1e-9);
    }
}
