//! Property-Based and Fuzz Testing
//!
//! Uses quickcheck for property-based testing of:
//! - Equation parser robustness (fuzz testing)
//! - Solver agreement with independently computed algebra
//! - Reconciliation flag laws

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{
    Definitions, EquationStore, Rational, SolutionCount, SolveContext, SolveError, parse,
    parse_equation,
};

// ============================================================
// PART 1: EQUATION GENERATORS FOR PROPERTY TESTS
// ============================================================

/// Generate random equation text biased toward the valid grammar.
fn random_equation_text(g: &mut Gen) -> String {
    format!("{}={}", random_expr_text(g, 3), random_expr_text(g, 2))
}

fn random_expr_text(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        // Base cases: small numbers, unknowns, a constant
        let choice: u8 = u8::arbitrary(g) % 6;
        return match choice {
            0 | 1 => {
                let n = i8::arbitrary(g) % 10;
                if n < 0 {
                    format!("({n})")
                } else {
                    n.to_string()
                }
            }
            2 | 3 => "x".to_string(),
            4 => "y".to_string(),
            _ => "pi".to_string(),
        };
    }
    let choice: u8 = u8::arbitrary(g) % 10;
    match choice {
        0..=3 => {
            let ops = ["+", "-", "*", "/"];
            let op = ops[usize::arbitrary(g) % ops.len()];
            format!(
                "({}{op}{})",
                random_expr_text(g, depth - 1),
                random_expr_text(g, depth - 1)
            )
        }
        4 | 5 => {
            // Small integer exponents keep exact arithmetic in i128 range.
            let exponent = 2 + u8::arbitrary(g) % 2;
            format!("({})^{exponent}", random_expr_text(g, depth - 1))
        }
        6 | 7 => {
            let fns = ["sin", "cos", "exp", "ln", "sqrt", "abs"];
            let f = fns[usize::arbitrary(g) % fns.len()];
            format!("{f}({})", random_expr_text(g, depth - 1))
        }
        _ => random_expr_text(g, depth - 1),
    }
}

/// A rational built from raw quickcheck inputs, bounded small.
fn rational_from(numerator: i8, denominator: u8) -> Rational {
    Rational::new(i128::from(numerator % 7), i128::from(denominator % 4) + 1)
        .unwrap_or(Rational::ZERO)
}

fn exact_layouts(store: &EquationStore) -> Vec<String> {
    let count = match store.solution_count() {
        SolutionCount::Finite(n) => n,
        SolutionCount::Infinite => 0,
    };
    (0..count)
        .map(|i| {
            store
                .exact_solution_layout_at(i, true)
                .unwrap_or_default()
                .to_owned()
        })
        .collect()
}

// ============================================================
// PART 2: PARSER AND SOLVER FUZZ TESTS
// ============================================================

#[cfg(test)]
mod parser_fuzz_tests {
    use super::*;

    /// Property: the equation parser never panics on arbitrary input
    #[test]
    fn test_parser_never_panics_on_arbitrary_input() {
        fn prop(input: String) -> TestResult {
            let defs = Definitions::new();
            // Either side of the '=' may fail to parse; it must not panic.
            let _ = parse_equation(&input, &defs);
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(1000)
            .max_tests(2000)
            .quickcheck(prop as fn(String) -> TestResult);
    }

    /// Fuzz test with specifically crafted hostile equation shapes
    #[test]
    fn test_hostile_equation_shapes_do_not_panic() {
        let cases = [
            "", "   ", "=", "x=", "=x", "x==", "x=1=2", "((x)=1", "x)=1", "sin()=0", "1..2=x",
            "x^=1", "()=()", "x+*2=1", "∞=x", "π=0",
        ];
        let defs = Definitions::new();
        for case in cases {
            let _ = parse_equation(case, &defs);
        }
        assert!(parse_equation("", &defs).is_err());
        assert!(parse_equation("x+1", &defs).is_err());
        assert!(parse_equation("x=1=2", &defs).is_err());
    }

    /// Property: serialization is canonical: rendering a parsed tree,
    /// parsing that text, and rendering again reproduces the same bytes.
    /// Holds for float-free trees only, since decimals re-scan as exact
    /// rationals.
    #[test]
    fn test_serialization_round_trips_through_the_parser() {
        fn prop() -> TestResult {
            let mut g = Gen::new(12);
            let text = random_expr_text(&mut g, 3);
            let defs = Definitions::new();
            let Ok(parsed) = parse(&text, &defs) else {
                return TestResult::discard();
            };
            let rendered = parsed.to_string();
            let Ok(reparsed) = parse(&rendered, &defs) else {
                return TestResult::failed();
            };
            TestResult::from_bool(reparsed.to_string() == rendered)
        }
        QuickCheck::new()
            .tests(500)
            .max_tests(1000)
            .quickcheck(prop as fn() -> TestResult);
    }

    /// Deeply nested parentheses parse and solve without stack trouble
    #[test]
    fn test_deep_nesting_parses_and_solves() {
        let mut text = "x".to_string();
        for _ in 0..40 {
            text = format!("({text}+1)");
        }
        let ctx = SolveContext::new();
        let mut store = EquationStore::new();
        store
            .add_equation(&format!("{text}=0"), &ctx.definitions)
            .unwrap();
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
        assert_eq!(store.exact_solution_layout_at(0, true), Some("-40"));
    }
}

#[cfg(test)]
mod solver_fuzz_tests {
    use super::*;

    fn all_layouts(store: &EquationStore) -> Vec<(Option<String>, Option<String>)> {
        let count = match store.solution_count() {
            SolutionCount::Finite(n) => n,
            SolutionCount::Infinite => 0,
        };
        (0..count)
            .map(|i| {
                (
                    store.exact_solution_layout_at(i, true).map(str::to_owned),
                    store.exact_solution_layout_at(i, false).map(str::to_owned),
                )
            })
            .collect()
    }

    /// Property: the whole pipeline never panics on generated equations,
    /// numeric fallback included
    #[test]
    fn test_generated_equations_never_panic() {
        fn prop() -> TestResult {
            let mut g = Gen::new(12);
            let text = random_equation_text(&mut g);
            let ctx = SolveContext::new();
            let mut store = EquationStore::new();
            if store.add_equation(&text, &ctx.definitions).is_err() {
                return TestResult::discard();
            }
            if store.solve(&ctx) == Err(SolveError::RequireApproximateSolution) {
                store.approximate_solve(&ctx);
            }
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(300)
            .max_tests(600)
            .quickcheck(prop as fn() -> TestResult);
    }

    /// Property: solving the same store twice gives the same outcome and
    /// layouts, memoized forms included
    #[test]
    fn test_solving_twice_is_deterministic() {
        fn prop() -> TestResult {
            let mut g = Gen::new(10);
            let text = random_equation_text(&mut g);
            let ctx = SolveContext::new();
            let mut store = EquationStore::new();
            if store.add_equation(&text, &ctx.definitions).is_err() {
                return TestResult::discard();
            }
            let first = store.solve(&ctx);
            let first_layouts = all_layouts(&store);
            let second = store.solve(&ctx);
            TestResult::from_bool(first == second && first_layouts == all_layouts(&store))
        }
        QuickCheck::new()
            .tests(300)
            .max_tests(600)
            .quickcheck(prop as fn() -> TestResult);
    }
}

// ============================================================
// PART 3: CLOSED-FORM AGREEMENT PROPERTY TESTS
// ============================================================

#[cfg(test)]
mod algebraic_agreement_tests {
    use super::*;

    /// Property: a quadratic built from two known rational roots solves to
    /// exactly those roots in ascending order, discriminant last
    #[test]
    fn test_factored_quadratics_recover_their_roots() {
        fn prop(n1: i8, d1: u8, n2: i8, d2: u8) -> TestResult {
            let r1 = rational_from(n1, d1);
            let r2 = rational_from(n2, d2);
            let ctx = SolveContext::new();
            let mut store = EquationStore::new();
            store
                .add_equation(&format!("(x-({r1}))*(x-({r2}))=0"), &ctx.definitions)
                .unwrap();

            let difference = r1.checked_sub(&r2).unwrap();
            let delta = difference.checked_mul(&difference).unwrap();
            let expected: Vec<String> = if r1 == r2 {
                vec![r1.to_string(), "0".to_string()]
            } else {
                let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
                vec![lo.to_string(), hi.to_string(), delta.to_string()]
            };

            if store.solve(&ctx) != Ok(SolutionCount::Finite(expected.len())) {
                return TestResult::failed();
            }
            TestResult::from_bool(exact_layouts(&store) == expected)
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(i8, u8, i8, u8) -> TestResult);
    }

    /// Property: 2x2 systems with a nonzero determinant match Cramer's rule
    #[test]
    fn test_two_by_two_systems_match_cramers_rule() {
        fn prop(a: i8, b: i8, c: i8, d: i8, e: i8, f: i8) -> TestResult {
            let [a, b, c, d, e, f] = [a, b, c, d, e, f].map(|v| i128::from(v % 5));
            let det = a * d - b * c;
            if det == 0 {
                return TestResult::discard();
            }

            let ctx = SolveContext::new();
            let mut store = EquationStore::new();
            store
                .add_equation(&format!("({a})*x+({b})*y=({e})"), &ctx.definitions)
                .unwrap();
            store
                .add_equation(&format!("({c})*x+({d})*y=({f})"), &ctx.definitions)
                .unwrap();
            if store.solve(&ctx) != Ok(SolutionCount::Finite(2)) {
                return TestResult::failed();
            }

            let x_expected = Rational::new(e * d - b * f, det).unwrap();
            let y_expected = Rational::new(a * f - e * c, det).unwrap();
            // A zero coefficient folds its variable out of the parsed
            // equation and can flip first-appearance order, so slots are
            // looked up by name.
            let names: Vec<&str> = store.variables().iter().map(|v| v.name()).collect();
            let x_slot = names.iter().position(|n| *n == "x").unwrap();
            let y_slot = names.iter().position(|n| *n == "y").unwrap();
            TestResult::from_bool(
                store.exact_solution_layout_at(x_slot, true)
                    == Some(x_expected.to_string().as_str())
                    && store.exact_solution_layout_at(y_slot, true)
                        == Some(y_expected.to_string().as_str()),
            )
        }
        QuickCheck::new()
            .tests(300)
            .max_tests(3000)
            .quickcheck(prop as fn(i8, i8, i8, i8, i8, i8) -> TestResult);
    }
}

// ============================================================
// PART 4: RECONCILIATION ORACLE (LAYOUT FLAG LAWS)
// ============================================================

#[cfg(test)]
mod reconciliation_oracle_tests {
    use super::*;

    fn without_twos_and_fives(mut n: i128) -> i128 {
        while n % 2 == 0 {
            n /= 2;
        }
        while n % 5 == 0 {
            n /= 5;
        }
        n
    }

    /// Property: the `=` versus `≈` flag matches decimal termination: a
    /// reduced denominator of only twos and fives prints exactly, so the
    /// approximate layout rescans to the same value. The identity flag
    /// holds exactly for integers, whose two layouts coincide.
    #[test]
    fn test_equality_flag_matches_decimal_termination() {
        fn prop(numerator: i16, twos: u8, fives: u8, extra: u8) -> TestResult {
            let numerator = i128::from(numerator % 1000);
            let denominator = i128::pow(2, u32::from(twos % 4))
                * i128::pow(5, u32::from(fives % 4))
                * [1, 3, 7, 11][usize::from(extra % 4)];

            let ctx = SolveContext::new();
            let mut store = EquationStore::new();
            store
                .add_equation(
                    &format!("({denominator})*x=({numerator})"),
                    &ctx.definitions,
                )
                .unwrap();
            if store.solve(&ctx) != Ok(SolutionCount::Finite(1)) {
                return TestResult::failed();
            }

            let value = Rational::new(numerator, denominator).unwrap();
            let terminates = without_twos_and_fives(value.denominator()) == 1;
            TestResult::from_bool(
                store.exact_solution_equality_at(0) == terminates
                    && store.exact_solution_identity_at(0) == value.is_integer(),
            )
        }
        QuickCheck::new()
            .tests(400)
            .quickcheck(prop as fn(i16, u8, u8, u8) -> TestResult);
    }
}
