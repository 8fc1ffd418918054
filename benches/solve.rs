//! Equation Solving Benchmarks
//!
//! Measures the parser and each solve classification path in isolation.
//! The reduction pool is rewound every iteration so the budget never runs
//! out mid-benchmark; stores are kept alive where the memoized forms are
//! the thing being measured.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use symsolve::{EquationStore, SolutionCount, SolveContext, SolveError, parse_equation};

// =============================================================================
// Parsing
// =============================================================================

fn bench_equation_parsing(c: &mut Criterion) {
    let ctx = SolveContext::new();
    let mut group = c.benchmark_group("parsing");

    group.bench_function("linear_2x+1=0", |b| {
        b.iter(|| parse_equation(black_box("2*x+1=0"), &ctx.definitions))
    });

    group.bench_function("quadratic_surds", |b| {
        b.iter(|| parse_equation(black_box("x^2-2*x-1=0"), &ctx.definitions))
    });

    group.bench_function("trig_implicit_mul", |b| {
        b.iter(|| parse_equation(black_box("2sin(x)cos(x)=1"), &ctx.definitions))
    });

    group.finish();
}

// =============================================================================
// Cold solves, one store per iteration
// =============================================================================

fn solve_cold(ctx: &SolveContext, texts: &[&str]) -> Result<SolutionCount, SolveError> {
    let mark = ctx.pool.mark();
    let mut store = EquationStore::new();
    for text in texts {
        let _ = store.add_equation(text, &ctx.definitions);
    }
    let outcome = store.solve(ctx);
    ctx.pool.rewind(mark);
    outcome
}

fn bench_closed_form_paths(c: &mut Criterion) {
    let ctx = SolveContext::new();
    let mut group = c.benchmark_group("closed_form");

    group.bench_function("linear_system_2x2", |b| {
        b.iter(|| solve_cold(&ctx, black_box(&["x+y=3", "x-y=1"])))
    });

    group.bench_function("quadratic_surd_roots", |b| {
        b.iter(|| solve_cold(&ctx, black_box(&["x^2=2"])))
    });

    group.bench_function("cubic_rational_roots", |b| {
        b.iter(|| solve_cold(&ctx, black_box(&["x^3-6*x^2+11*x-6=0"])))
    });

    group.finish();
}

// =============================================================================
// Warm solves and the numeric fallback
// =============================================================================

fn bench_solve_modes(c: &mut Criterion) {
    let ctx = SolveContext::new();
    let mut group = c.benchmark_group("solve_modes");

    // Re-solving an unchanged store hits the memoized standard forms.
    let mut warm = EquationStore::new();
    warm.add_equation("x^2-5*x+6=0", &ctx.definitions)
        .expect("valid equation");
    group.bench_function("memoized_resolve", |b| {
        b.iter(|| {
            let mark = ctx.pool.mark();
            let outcome = warm.solve(&ctx);
            ctx.pool.rewind(mark);
            black_box(outcome)
        })
    });

    let mut numeric = EquationStore::new();
    numeric
        .add_equation("sin(x)=0", &ctx.definitions)
        .expect("valid equation");
    group.bench_function("numeric_isolation", |b| {
        b.iter(|| {
            let mark = ctx.pool.mark();
            let outcome = numeric.solve(&ctx);
            debug_assert_eq!(outcome, Err(SolveError::RequireApproximateSolution));
            numeric.approximate_solve(&ctx);
            ctx.pool.rewind(mark);
            black_box(numeric.approximate_solution_count())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_equation_parsing,
    bench_closed_form_paths,
    bench_solve_modes,
);
criterion_main!(benches);
