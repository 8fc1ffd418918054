//! Equation solving pipeline.
//!
//! `solve` reduces every equation to a standard form, collects the
//! unknowns and routes the set: a single polynomial equation of degree two
//! or three gets closed-form roots with a trailing discriminant slot,
//! anything linear goes through Gaussian elimination, and a single
//! equation out of closed-form reach is handed to the numeric isolator
//! over a user-adjustable interval. When symbols carry user definitions,
//! solving runs up to twice: once with every definition substituted, and
//! once ignoring variable definitions if the first pass failed or
//! degenerated.

mod linear;
mod numeric;
mod polynomial;
mod reconcile;
mod variables;

use std::sync::Arc;

use crate::context::{SolveContext, Substitution};
use crate::conventions::{ComplexFormat, Conventions, ReductionTarget};
use crate::core::{Expr, ExprKind, KS};
use crate::error::SolveError;
use crate::reduce::Reducer;
use crate::solver::linear::{LinearOutcome, extract_system};
use crate::solver::numeric::isolate_roots;
use crate::solver::polynomial::{PolynomialRoots, closed_form_slots, extract_coefficients};
use crate::solver::reconcile::{approximated_slots, reconcile_exact};
use crate::solver::variables::{collect_unknowns, collect_user_variables};
use crate::store::{Classification, DEFAULT_INTERVAL, EquationStore, SolutionCount};

impl EquationStore {
    /// Solve the recorded equations exactly.
    ///
    /// The first pass substitutes every definition. When the result is an
    /// error, no solution, or infinitely many, and some of the symbols
    /// carry user definitions, a second pass re-solves with those symbols
    /// kept free; its result stands unless it fails harder than the first
    /// pass did, in which case the first pass is restored. Solution slots,
    /// classification, unknowns and degree are readable through the store
    /// accessors afterwards, including alongside some of the errors
    /// (a polynomial whose roots all approximate to undefined still
    /// records its discriminant).
    ///
    /// # Errors
    /// [`SolveError::RequireApproximateSolution`] is a routing outcome,
    /// not a failure: the equation is beyond closed-form reach and
    /// [`EquationStore::approximate_solve`] should run next. The other
    /// variants report equations that are undefined or nonreal after
    /// substitution, too many unknowns, or a non-linear system.
    pub fn solve(&mut self, ctx: &SolveContext) -> Result<SolutionCount, SolveError> {
        self.clear_solutions();
        let start = ctx.pool.mark();

        let mut user_trees = Vec::with_capacity(self.equations.len());
        for equation in &self.equations {
            if let Some(tree) =
                equation.substituted(&ctx.definitions, Substitution::FunctionsOnly, &ctx.pool)
            {
                user_trees.push(tree);
            }
        }
        let user_variables = collect_user_variables(&user_trees, &ctx.definitions);

        let mut policy = Substitution::AllDefinitions;
        let mut outcome = self.solve_pass(ctx, policy);
        let degenerate = match outcome {
            Err(_) | Ok(SolutionCount::Infinite) => true,
            Ok(SolutionCount::Finite(count)) => count == 0,
        };
        if degenerate && !user_variables.is_empty() {
            let checkpoint = ctx.pool.mark();
            let second = self.solve_pass(ctx, Substitution::FunctionsOnly);
            match second {
                Ok(_) | Err(SolveError::RequireApproximateSolution) => {
                    policy = Substitution::FunctionsOnly;
                    outcome = second;
                }
                Err(_) => {
                    // The retry failed harder than the original attempt.
                    // Roll its work back and restore the first pass, whose
                    // derived forms are still memoized below the mark.
                    ctx.pool.rewind(checkpoint);
                    self.tidy_downstream(checkpoint);
                    outcome = self.solve_pass(ctx, policy);
                }
            }
        }

        self.user_variables = user_variables;
        self.user_variables_used =
            policy == Substitution::AllDefinitions && !self.user_variables.is_empty();
        self.last_substitution = Some(policy);
        self.solve_mark = Some(start);
        if crate::reduce::trace_enabled() {
            eprintln!(
                "[TRACE] solve: {:?} via {policy:?} -> {outcome:?}",
                self.classification
            );
        }
        outcome
    }

    /// One solving attempt under a fixed substitution policy.
    fn solve_pass(
        &mut self,
        ctx: &SolveContext,
        policy: Substitution,
    ) -> Result<SolutionCount, SolveError> {
        self.clear_solutions();
        if self.equations.is_empty() {
            return Ok(SolutionCount::Finite(0));
        }
        let conventions = self.effective_conventions(ctx, policy);

        let mut forms = Vec::with_capacity(self.equations.len());
        for equation in &self.equations {
            let form = equation.standard_form_with(
                &ctx.definitions,
                conventions,
                &ctx.pool,
                policy,
                ReductionTarget::SystemForAnalysis,
            );
            if matches!(&form.kind, ExprKind::Undefined) || form.contains_matrix() {
                return Err(SolveError::EquationUndefined);
            }
            if matches!(&form.kind, ExprKind::Nonreal) {
                return Err(SolveError::EquationNonreal);
            }
            forms.push(form);
        }
        let unknowns = collect_unknowns(&forms)?;
        self.variables = unknowns.clone();

        let analysis = Reducer::new(ReductionTarget::SystemForAnalysis, conventions, &ctx.pool);
        if forms.len() == 1
            && unknowns.len() == 1
            && let Some(coefficients) = extract_coefficients(&forms[0], unknowns[0].id(), &analysis)
        {
            let degree = coefficients.len() - 1;
            self.degree = Some(degree);
            if (2..=crate::MAX_SOLVED_DEGREE).contains(&degree) {
                let user = Reducer::new(ReductionTarget::User, conventions, &ctx.pool);
                if let Some(roots) = closed_form_slots(&coefficients, &user, conventions) {
                    self.classification = Classification::PolynomialMonovariable;
                    return self.record_slots(roots, ctx, conventions);
                }
            }
        }

        if let Some(system) = extract_system(&forms, &unknowns) {
            let user = Reducer::new(ReductionTarget::User, conventions, &ctx.pool);
            return match system.solve(&analysis)? {
                LinearOutcome::Unique(values) => {
                    let candidates: Vec<Arc<Expr>> =
                        values.iter().map(|value| user.reduce(value)).collect();
                    let (slots, undefined) = reconcile_exact(&candidates, ctx, conventions);
                    self.exact_solutions = slots;
                    if undefined {
                        return Err(SolveError::EquationUndefined);
                    }
                    Ok(SolutionCount::Finite(self.exact_solutions.len()))
                }
                LinearOutcome::Inconsistent => Ok(SolutionCount::Finite(0)),
                LinearOutcome::Infinite => {
                    self.infinite_solutions = true;
                    Ok(SolutionCount::Infinite)
                }
            };
        }

        if forms.len() > 1 || unknowns.len() != 1 {
            return Err(SolveError::NonLinearSystem);
        }
        self.classification = Classification::Monovariable;
        self.interval = DEFAULT_INTERVAL;
        Err(SolveError::RequireApproximateSolution)
    }

    /// Store polynomial roots, reconciling exact ones against their
    /// approximations.
    fn record_slots(
        &mut self,
        roots: PolynomialRoots,
        ctx: &SolveContext,
        conventions: Conventions,
    ) -> Result<SolutionCount, SolveError> {
        match roots {
            PolynomialRoots::Exact(candidates) => {
                let (slots, undefined) = reconcile_exact(&candidates, ctx, conventions);
                self.exact_solutions = slots;
                if undefined {
                    return Err(SolveError::EquationUndefined);
                }
            }
            PolynomialRoots::Approximated(values) => {
                self.exact_solutions = approximated_slots(&values);
            }
        }
        Ok(SolutionCount::Finite(self.exact_solutions.len()))
    }

    /// Numerically isolate roots of the first equation over the stored
    /// interval, up to [`crate::MAX_APPROXIMATE_SOLUTIONS`] of them.
    ///
    /// Intended after a [`EquationStore::solve`] that returned
    /// [`SolveError::RequireApproximateSolution`]: the same substitution
    /// policy that produced that routing is replayed here. Roots land in
    /// [`EquationStore::approximate_solution_at`], with
    /// [`EquationStore::has_more_solutions`] raised when the search hit
    /// the cap before the interval was exhausted.
    pub fn approximate_solve(&mut self, ctx: &SolveContext) {
        self.approximate_solutions.clear();
        self.more_solutions = false;
        let Some(policy) = self.last_substitution else {
            return;
        };
        let Some(variable) = self.variables.first().cloned() else {
            return;
        };
        let Some(equation) = self.equations.first() else {
            return;
        };
        let conventions = self.effective_conventions(ctx, policy);
        let form = equation.standard_form_with(
            &ctx.definitions,
            conventions,
            &ctx.pool,
            policy,
            ReductionTarget::SystemForApproximation,
        );
        let (roots, more) = isolate_roots(
            &form,
            variable.id(),
            self.interval,
            conventions,
            crate::MAX_APPROXIMATE_SOLUTIONS,
        );
        self.approximate_solutions = roots;
        self.more_solutions = more;
        if crate::reduce::trace_enabled() {
            eprintln!(
                "[TRACE] approximate_solve: {} root(s) in [{}, {}]",
                self.approximate_solutions.len(),
                self.interval[0],
                self.interval[1]
            );
        }
    }

    /// The ambient conventions, with the complex format promoted to
    /// Cartesian when any equation mentions `i` explicitly. A real-format
    /// solve of `x^2=i` has no sensible reading otherwise.
    fn effective_conventions(&self, ctx: &SolveContext, policy: Substitution) -> Conventions {
        let mut conventions = ctx.conventions;
        if conventions.complex_format == ComplexFormat::Real
            && self.equations.iter().any(|equation| {
                equation
                    .substituted(&ctx.definitions, policy, &ctx.pool)
                    .is_some_and(|tree| tree.contains_symbol(KS.i))
            })
        {
            conventions.complex_format = ComplexFormat::Cartesian;
        }
        conventions
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
    use crate::parser::parse;

    fn store_with(texts: &[&str], ctx: &SolveContext) -> EquationStore {
        let mut store = EquationStore::new();
        for text in texts {
            store.add_equation(text, &ctx.definitions).unwrap();
        }
        store
    }

    fn exact_layouts(store: &EquationStore) -> Vec<String> {
        (0..store.exact_solutions.len())
            .map(|i| {
                store
                    .exact_solution_layout_at(i, true)
                    .unwrap_or_default()
                    .to_owned()
            })
            .collect()
    }

    #[test]
    fn linear_pair_solves_per_variable() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["x+y=3", "x-y=1"], &ctx);
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(2)));
        assert_eq!(store.classification(), Classification::LinearSystem);
        let names: Vec<&str> = store.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(exact_layouts(&store), ["2", "1"]);
    }

    #[test]
    fn quadratic_reports_roots_then_discriminant() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["x^2-5*x+6=0"], &ctx);
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
        assert_eq!(
            store.classification(),
            Classification::PolynomialMonovariable
        );
        assert_eq!(store.degree(), Some(2));
        assert_eq!(exact_layouts(&store), ["2", "3", "1"]);
    }

    #[test]
    fn transcendental_routes_to_the_numeric_isolator() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["cos(x)=x"], &ctx);
        assert_eq!(
            store.solve(&ctx),
            Err(SolveError::RequireApproximateSolution)
        );
        assert_eq!(store.classification(), Classification::Monovariable);
        assert_eq!(store.interval_bound(0), -10.0);
        assert_eq!(store.interval_bound(1), 10.0);

        store.approximate_solve(&ctx);
        assert_eq!(store.approximate_solution_count(), 1);
        let root = store.approximate_solution_at(0).unwrap();
        assert!((root - 0.739_085_133_215_160_7).abs() < 1e-9);
        assert!(!store.has_more_solutions());
    }

    #[test]
    fn contradiction_and_tautology() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["x+y=1", "x+y=2"], &ctx);
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(0)));

        let mut store = store_with(&["2=2"], &ctx);
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Infinite));
        assert_eq!(store.solution_count(), SolutionCount::Infinite);
    }

    #[test]
    fn second_pass_frees_defined_symbols() {
        let ctx = SolveContext::new().define_symbol("a", Expr::integer(1));
        let mut store = store_with(&["x=a", "x=2*a"], &ctx);
        // With a=1 the pair contradicts; freeing `a` leaves x=a=0.
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(2)));
        assert_eq!(exact_layouts(&store), ["0", "0"]);
        assert!(!store.user_variables_used());
        let names: Vec<&str> = store.user_variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, ["a"]);
    }

    #[test]
    fn failed_second_pass_restores_the_first() {
        let ctx = SolveContext::new().define_symbol("a", Expr::integer(0));
        let mut store = store_with(&["a*x=a"], &ctx);
        // With a=0 this is 0=0; freeing `a` makes it non-linear, so the
        // substituted result stands.
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Infinite));
        assert!(store.user_variables_used());
    }

    #[test]
    fn function_definitions_expand_in_both_passes() {
        let empty = crate::context::Definitions::new();
        let body = parse("t^2", &empty).unwrap();
        let ctx = SolveContext::new().define_function("f", "t", body);
        let mut store = store_with(&["f(x)=4"], &ctx);
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
        assert_eq!(exact_layouts(&store), ["-2", "2", "16"]);
    }

    #[test]
    fn non_linear_system_is_rejected() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["x*y=1", "x+y=2"], &ctx);
        assert_eq!(store.solve(&ctx), Err(SolveError::NonLinearSystem));
    }

    #[test]
    fn too_many_unknowns_is_rejected() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["a+b+c+d+e2+f+g=0"], &ctx);
        assert_eq!(store.solve(&ctx), Err(SolveError::TooManyVariables));
    }

    #[test]
    fn undefined_equation_is_reported() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["1/0=x"], &ctx);
        assert_eq!(store.solve(&ctx), Err(SolveError::EquationUndefined));
    }

    #[test]
    fn explicit_i_promotes_the_complex_format() {
        let ctx = SolveContext::new();
        let mut store = store_with(&["x^2=-1"], &ctx);
        // Real format keeps only the discriminant slot.
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(1)));
        assert_eq!(exact_layouts(&store), ["-4"]);

        let mut store = store_with(&["x^2=i*i"], &ctx);
        // Writing `i` switches the solve to Cartesian and keeps the pair.
        assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
        assert_eq!(exact_layouts(&store), ["-i", "i", "-4"]);
    }
}
