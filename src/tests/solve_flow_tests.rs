//! Full pipeline tests: equation text in, layouts and flags out.
//!
//! Each test drives the public store API the way a host application would:
//! record equations, solve, then read classification, solution slots and
//! their identity/equality flags, falling back to the numeric isolator
//! where the solver requests it.

use crate::{
    Classification, ComplexFormat, EquationStore, Expr, Pool, SolutionCount, SolveContext,
    SolveError,
};

fn store_with(texts: &[&str], ctx: &SolveContext) -> EquationStore {
    let mut store = EquationStore::new();
    for text in texts {
        store.add_equation(text, &ctx.definitions).unwrap();
    }
    store
}

fn exact(store: &EquationStore) -> Vec<String> {
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

#[test]
fn single_linear_equation_end_to_end() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["2*x+1=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.classification(), Classification::LinearSystem);
    assert_eq!(store.degree(), Some(1));
    assert_eq!(store.variables()[0].name(), "x");
    assert_eq!(store.exact_solution_layout_at(0, true), Some("-1/2"));
    assert_eq!(store.exact_solution_layout_at(0, false), Some("-0.5"));
    assert!(!store.exact_solution_identity_at(0));
    assert!(store.exact_solution_equality_at(0));
}

#[test]
fn defined_coefficients_reach_the_system() {
    let ctx = SolveContext::new().define_symbol("a", Expr::integer(2));
    let mut store = store_with(&["a*x+y=3", "x-y=1"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(2)));
    assert_eq!(exact(&store), ["4/3", "1/3"]);
    assert!(store.user_variables_used());
    assert_eq!(store.user_variables()[0].name(), "a");
}

#[test]
fn proportional_pair_has_infinitely_many() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["2*x+y=4", "4*x+2*y=8"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Infinite));
    assert_eq!(store.solution_count(), SolutionCount::Infinite);
}

#[test]
fn constant_truths_and_lies() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["2=2"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Infinite));

    let mut store = store_with(&["2=3"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(0)));
}

#[test]
fn real_format_keeps_only_the_discriminant() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^2+1=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(
        store.classification(),
        Classification::PolynomialMonovariable
    );
    assert_eq!(store.degree(), Some(2));
    assert_eq!(exact(&store), ["-4"]);
}

#[test]
fn cartesian_format_keeps_the_imaginary_pair() {
    let ctx = SolveContext::new().with_complex_format(ComplexFormat::Cartesian);
    let mut store = store_with(&["x^2+1=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
    assert_eq!(exact(&store), ["-i", "i", "-4"]);
    assert_eq!(store.exact_solution_layout_at(0, false), Some("0-i"));
    assert!(!store.exact_solution_identity_at(0));
    assert!(store.exact_solution_equality_at(0));
}

#[test]
fn quadratic_surds_pair_with_decimals() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^2=2"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
    assert_eq!(exact(&store), ["-2^(1/2)", "2^(1/2)", "8"]);
    assert_eq!(
        store.exact_solution_layout_at(1, false),
        Some("1.4142135623730951")
    );
    // A surd and its rounding are different values.
    assert!(!store.exact_solution_equality_at(1));
    // The integer discriminant serializes the same both ways.
    assert!(store.exact_solution_identity_at(2));
    assert!(store.exact_solution_equality_at(2));
}

#[test]
fn cubic_with_rational_roots_lists_all_three() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^3-6*x^2+11*x-6=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(4)));
    assert_eq!(store.degree(), Some(3));
    assert_eq!(exact(&store), ["1", "2", "3", "4"]);
}

#[test]
fn cubic_with_one_real_root_stays_exact() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^3-2=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(2)));
    assert_eq!(exact(&store), ["cbrt(2)", "-108"]);
    assert_eq!(
        store.exact_solution_layout_at(0, false),
        Some("1.2599210498948732")
    );
    assert!(!store.exact_solution_identity_at(0));
    assert!(!store.exact_solution_equality_at(0));
}

#[test]
fn casus_irreducibilis_falls_back_to_floats() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^3-3*x+1=0"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(4)));
    let slots = exact(&store);
    assert_eq!(slots[3], "81");
    let expected = [
        -1.879_385_241_571_817,
        0.347_296_355_333_861,
        1.532_088_886_237_956,
    ];
    for (slot, root) in slots.iter().zip(expected) {
        let value: f64 = slot.parse().unwrap();
        assert!((value - root).abs() < 1e-9);
    }
    // Numeric-only roots show a single layout.
    for i in 0..4 {
        assert!(store.exact_solution_identity_at(i));
        assert!(store.exact_solution_equality_at(i));
    }
}

#[test]
fn suppression_withholds_exact_layouts() {
    let ctx = SolveContext::new().suppress_exact_when(|e| e.to_string().contains('^'));
    let mut store = store_with(&["x^2=2"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
    assert_eq!(store.exact_solution_layout_at(0, true), None);
    assert_eq!(store.exact_solution_layout_at(1, true), None);
    assert_eq!(store.exact_solution_layout_at(2, true), Some("8"));
    assert_eq!(
        store.exact_solution_layout_at(1, false),
        Some("1.4142135623730951")
    );
    assert!(store.exact_solution_identity_at(0));
    assert!(!store.exact_solution_equality_at(0));
}

#[test]
fn decimal_input_scans_exact_and_reconciles() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x=0.5"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.exact_solution_layout_at(0, true), Some("1/2"));
    assert_eq!(store.exact_solution_layout_at(0, false), Some("0.5"));
    assert!(!store.exact_solution_identity_at(0));
    assert!(store.exact_solution_equality_at(0));

    // A non-terminating decimal rounds, so the layouts differ in value.
    let mut store = store_with(&["3*x=2"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.exact_solution_layout_at(0, true), Some("2/3"));
    assert!(!store.exact_solution_equality_at(0));
}

#[test]
fn imaginary_coefficient_promotes_and_solves() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["i*x=2"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.exact_solution_layout_at(0, true), Some("-2*i"));
    assert_eq!(store.exact_solution_layout_at(0, false), Some("0-2*i"));
    assert!(store.exact_solution_equality_at(0));
}

#[test]
fn sine_roots_over_a_chosen_interval() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["sin(x)=0"], &ctx);
    assert_eq!(
        store.solve(&ctx),
        Err(SolveError::RequireApproximateSolution)
    );
    assert_eq!(store.classification(), Classification::Monovariable);
    assert_eq!(store.degree(), None);

    store.set_interval_bound(0, 1.0);
    store.set_interval_bound(1, 10.0);
    store.approximate_solve(&ctx);
    assert_eq!(store.approximate_solution_count(), 3);
    for (i, expected) in [1.0, 2.0, 3.0].into_iter().enumerate() {
        let root = store.approximate_solution_at(i).unwrap();
        assert!((root - expected * std::f64::consts::PI).abs() < 1e-9);
    }
    assert!(!store.has_more_solutions());
}

#[test]
fn quintic_reports_its_degree_and_solves_numerically() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x^5=1"], &ctx);
    assert_eq!(
        store.solve(&ctx),
        Err(SolveError::RequireApproximateSolution)
    );
    assert_eq!(store.degree(), Some(5));

    store.approximate_solve(&ctx);
    assert_eq!(store.approximate_solution_count(), 1);
    let root = store.approximate_solution_at(0).unwrap();
    assert!((root - 1.0).abs() < 1e-9);
}

#[test]
fn dense_roots_overflow_the_numeric_cap() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["sin(10*x)=0"], &ctx);
    assert_eq!(
        store.solve(&ctx),
        Err(SolveError::RequireApproximateSolution)
    );
    store.approximate_solve(&ctx);
    assert_eq!(
        store.approximate_solution_count(),
        crate::MAX_APPROXIMATE_SOLUTIONS
    );
    assert!(store.has_more_solutions());
}

#[test]
fn nonreal_and_undefined_equations_error() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["sqrt(-1)=x"], &ctx);
    assert_eq!(store.solve(&ctx), Err(SolveError::EquationNonreal));

    let mut store = store_with(&["ln(0)=x"], &ctx);
    assert_eq!(store.solve(&ctx), Err(SolveError::EquationUndefined));
}

#[test]
fn redefining_a_symbol_invalidates_after_tidy() {
    let mut ctx = SolveContext::new();
    ctx.definitions.define_symbol("a", Expr::integer(2));
    let mark = ctx.pool.mark();

    let mut store = store_with(&["x=a"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.exact_solution_layout_at(0, true), Some("2"));
    assert!(store.user_variables_used());

    ctx.definitions.define_symbol("a", Expr::integer(5));
    ctx.pool.rewind(mark);
    store.tidy_downstream(mark);
    assert_eq!(store.solution_count(), SolutionCount::Finite(0));

    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(store.exact_solution_layout_at(0, true), Some("5"));
}

#[test]
fn solving_again_after_edits_starts_clean() {
    let ctx = SolveContext::new();
    let mut store = store_with(&["x=1"], &ctx);
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(exact(&store), ["1"]);

    store.remove_equation(0);
    assert_eq!(store.solution_count(), SolutionCount::Finite(0));
    assert!(store.variables().is_empty());

    store.add_equation("x=7", &ctx.definitions).unwrap();
    assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
    assert_eq!(exact(&store), ["7"]);
}

#[test]
fn exhausted_pool_surfaces_as_undefined() {
    let ctx = SolveContext::new().with_pool(Pool::new(2));
    let mut store = store_with(&["x+1=0"], &ctx);
    assert_eq!(store.solve(&ctx), Err(SolveError::EquationUndefined));
}
