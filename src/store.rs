//! Equation records and owned solve state.
//!
//! The store keeps the raw equation texts (the durable data), memoized
//! derived forms per substitution policy and reduction target, and the
//! state the last solve produced: classification, solution slots, numeric
//! roots, the search interval and the pool watermark that stamps it all.
//! Everything derived can be re-derived from the texts; `tidy_downstream`
//! clears whatever a pool rewind invalidated, and cleared state reads back
//! as empty rather than stale.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::context::{Definitions, SolveContext, Substitution};
use crate::conventions::{AngleUnit, ComplexFormat, Conventions, ReductionTarget};
use crate::core::{Expr, InternedSymbol};
use crate::error::{ParseError, StoreError};
use crate::parser::parse_equation;
use crate::pool::{Pool, PoolMark};
use crate::reduce::{Reducer, substitute};

/// Numeric search window installed when a solve routes to approximation.
pub(crate) const DEFAULT_INTERVAL: [f64; 2] = [-10.0, 10.0];

/// Which solving subsystem the equation set was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    /// Every equation is linear over the shared unknown list.
    #[default]
    LinearSystem,
    /// One equation, one unknown, polynomial of degree two or more.
    PolynomialMonovariable,
    /// One equation, one unknown, no usable closed form.
    Monovariable,
}

/// How many exact solutions a solve produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionCount {
    /// That many recorded solution slots (possibly zero).
    Finite(usize),
    /// A consistent under-determined system: every assignment works.
    Infinite,
}

/// One recorded exact/approximate solution pair.
#[derive(Debug, Clone)]
pub(crate) struct ExactSolution {
    /// Canonical serialization of the exact form; withheld under
    /// suppression, and a clone of the approximate text for roots that
    /// only exist numerically.
    pub(crate) exact_layout: Option<String>,
    /// Canonical serialization of the approximate value.
    pub(crate) approximate_layout: Option<String>,
    /// Both layouts are byte-identical (or suppression forces the flag).
    pub(crate) identical: bool,
    /// Exact and approximate denote the same value, shown as `=` not `≈`.
    pub(crate) equal: bool,
}

/// Memoization key for a reduced standard form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FormKey {
    policy: Substitution,
    target: ReductionTarget,
    angle_unit: AngleUnit,
    complex_format: ComplexFormat,
}

/// A cached derived expression with the watermark of its derivation.
#[derive(Debug, Clone)]
struct CachedForm {
    expr: Arc<Expr>,
    mark: PoolMark,
}

/// One user equation: source text plus lazily derived forms.
#[derive(Debug, Default)]
pub struct Equation {
    text: String,
    parsed: RefCell<Option<(Arc<Expr>, Arc<Expr>)>>,
    substituted: RefCell<FxHashMap<Substitution, CachedForm>>,
    forms: RefCell<FxHashMap<FormKey, CachedForm>>,
}

impl Equation {
    /// Validate and record an equation. The text must contain exactly one
    /// `=` and parse on both sides.
    pub(crate) fn new(text: &str, definitions: &Definitions) -> Result<Self, ParseError> {
        let (lhs, rhs) = parse_equation(text, definitions)?;
        Ok(Self {
            text: text.to_owned(),
            parsed: RefCell::new(Some((Arc::new(lhs), Arc::new(rhs)))),
            substituted: RefCell::new(FxHashMap::default()),
            forms: RefCell::new(FxHashMap::default()),
        })
    }

    /// The source text as entered.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed sides, re-deriving from the text after a tidy. Definitions
    /// participate because they decide whether `f(x)` is a call or an
    /// implicit product.
    pub(crate) fn sides(&self, definitions: &Definitions) -> Option<(Arc<Expr>, Arc<Expr>)> {
        if let Some((lhs, rhs)) = self.parsed.borrow().as_ref() {
            return Some((Arc::clone(lhs), Arc::clone(rhs)));
        }
        let (lhs, rhs) = parse_equation(&self.text, definitions).ok()?;
        let pair = (Arc::new(lhs), Arc::new(rhs));
        *self.parsed.borrow_mut() = Some((Arc::clone(&pair.0), Arc::clone(&pair.1)));
        Some(pair)
    }

    /// `lhs - rhs` with definitions substituted under `policy`, memoized.
    pub(crate) fn substituted(
        &self,
        definitions: &Definitions,
        policy: Substitution,
        pool: &Pool,
    ) -> Option<Arc<Expr>> {
        if let Some(cached) = self.substituted.borrow().get(&policy) {
            return Some(Arc::clone(&cached.expr));
        }
        let (lhs, rhs) = self.sides(definitions)?;
        let mark = pool.mark();
        let substituted = substitute(&difference(&lhs, &rhs), definitions, policy);
        self.substituted.borrow_mut().insert(
            policy,
            CachedForm {
                expr: Arc::clone(&substituted),
                mark,
            },
        );
        Some(substituted)
    }

    /// The reduced standard form of `lhs - rhs` under the context's
    /// conventions; memoized per policy, target and conventions.
    #[must_use]
    pub fn standard_form(
        &self,
        ctx: &SolveContext,
        policy: Substitution,
        target: ReductionTarget,
    ) -> Arc<Expr> {
        self.standard_form_with(&ctx.definitions, ctx.conventions, &ctx.pool, policy, target)
    }

    /// `standard_form` with the conventions spelled out, so the solver can
    /// pass an effective complex format different from the ambient one.
    pub(crate) fn standard_form_with(
        &self,
        definitions: &Definitions,
        conventions: Conventions,
        pool: &Pool,
        policy: Substitution,
        target: ReductionTarget,
    ) -> Arc<Expr> {
        let key = FormKey {
            policy,
            target,
            angle_unit: conventions.angle_unit,
            complex_format: conventions.complex_format,
        };
        if let Some(cached) = self.forms.borrow().get(&key) {
            return Arc::clone(&cached.expr);
        }
        let mark = pool.mark();
        let Some(substituted) = self.substituted(definitions, policy, pool) else {
            // The text validated at add time; a later parse failure means
            // definitions shifted under it, which reads as undefined.
            return Arc::new(Expr::undefined());
        };
        let reduced = Reducer::new(target, conventions, pool).reduce(&substituted);
        self.forms.borrow_mut().insert(
            key,
            CachedForm {
                expr: Arc::clone(&reduced),
                mark,
            },
        );
        reduced
    }

    /// Drop derived forms stamped at or after `mark`. The parse memo is
    /// dropped unconditionally: definitions may have changed what the text
    /// means, and re-parsing is cheap.
    pub(crate) fn tidy(&self, mark: PoolMark) {
        self.parsed.replace(None);
        self.substituted.borrow_mut().retain(|_, f| f.mark < mark);
        self.forms.borrow_mut().retain(|_, f| f.mark < mark);
    }
}

/// `lhs - rhs`, built through the constructors so trivial cases fold.
fn difference(lhs: &Arc<Expr>, rhs: &Arc<Expr>) -> Arc<Expr> {
    let negated = Expr::product_from_arcs(vec![Arc::new(Expr::integer(-1)), Arc::clone(rhs)]);
    Arc::new(Expr::sum_from_arcs(vec![
        Arc::clone(lhs),
        Arc::new(negated),
    ]))
}

/// Ordered equation records plus the state of the last solve.
#[derive(Debug, Default)]
pub struct EquationStore {
    pub(crate) equations: Vec<Equation>,
    pub(crate) classification: Classification,
    pub(crate) degree: Option<usize>,
    pub(crate) variables: Vec<InternedSymbol>,
    pub(crate) user_variables: Vec<InternedSymbol>,
    pub(crate) user_variables_used: bool,
    pub(crate) last_substitution: Option<Substitution>,
    pub(crate) exact_solutions: Vec<ExactSolution>,
    pub(crate) infinite_solutions: bool,
    pub(crate) approximate_solutions: Vec<f64>,
    pub(crate) more_solutions: bool,
    pub(crate) interval: [f64; 2],
    pub(crate) solve_mark: Option<PoolMark>,
}

impl EquationStore {
    /// An empty store with the default numeric interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------
    // Record management
    // -------------------------------------------------------------------

    /// Validate and append an equation.
    pub fn add_equation(
        &mut self,
        text: &str,
        definitions: &Definitions,
    ) -> Result<(), StoreError> {
        if self.equations.len() >= crate::MAX_EQUATIONS {
            return Err(StoreError::Full);
        }
        self.equations.push(Equation::new(text, definitions)?);
        Ok(())
    }

    /// Remove the equation at `index`; out-of-range indices are ignored.
    /// Any stored solutions refer to the old set and are cleared.
    pub fn remove_equation(&mut self, index: usize) {
        if index < self.equations.len() {
            self.equations.remove(index);
            self.clear_solutions();
        }
    }

    /// Remove every equation and all solve state.
    pub fn remove_all(&mut self) {
        self.equations.clear();
        self.clear_solutions();
    }

    /// Number of recorded equations.
    #[must_use]
    pub fn equation_count(&self) -> usize {
        self.equations.len()
    }

    /// Source text of the equation at `index`.
    #[must_use]
    pub fn equation_text_at(&self, index: usize) -> Option<&str> {
        self.equations.get(index).map(Equation::text)
    }

    /// The equation record at `index`.
    #[must_use]
    pub fn equation_at(&self, index: usize) -> Option<&Equation> {
        self.equations.get(index)
    }

    // -------------------------------------------------------------------
    // Solve-state accessors
    // -------------------------------------------------------------------

    /// Which subsystem the last solve routed to.
    #[must_use]
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Extracted polynomial degree, when the last solve classified the
    /// equation as polynomial.
    #[must_use]
    pub fn degree(&self) -> Option<usize> {
        self.degree
    }

    /// Exact solution count of the last solve.
    #[must_use]
    pub fn solution_count(&self) -> SolutionCount {
        if self.infinite_solutions {
            SolutionCount::Infinite
        } else {
            SolutionCount::Finite(self.exact_solutions.len())
        }
    }

    /// Unknowns of the last solve, in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> &[InternedSymbol] {
        &self.variables
    }

    /// Symbols with user definitions that appear in the equations.
    #[must_use]
    pub fn user_variables(&self) -> &[InternedSymbol] {
        &self.user_variables
    }

    /// True when the recorded solutions were computed with user variable
    /// definitions substituted in (a first-pass result).
    #[must_use]
    pub fn user_variables_used(&self) -> bool {
        self.user_variables_used
    }

    /// True when the numeric search found more roots than it can record.
    #[must_use]
    pub fn has_more_solutions(&self) -> bool {
        self.more_solutions
    }

    /// Serialized solution at `index`: the exact layout when `want_exact`,
    /// otherwise the approximate one. `None` when out of range or when the
    /// exact layout is withheld.
    #[must_use]
    pub fn exact_solution_layout_at(&self, index: usize, want_exact: bool) -> Option<&str> {
        let slot = self.exact_solutions.get(index)?;
        if want_exact {
            slot.exact_layout.as_deref()
        } else {
            slot.approximate_layout.as_deref()
        }
    }

    /// True when the exact and approximate layouts at `index` are
    /// byte-identical (or suppression forces the exact one out).
    #[must_use]
    pub fn exact_solution_identity_at(&self, index: usize) -> bool {
        self.exact_solutions
            .get(index)
            .is_some_and(|s| s.identical)
    }

    /// True when exact and approximate denote the same value, so a UI can
    /// join them with `=` instead of `≈`.
    #[must_use]
    pub fn exact_solution_equality_at(&self, index: usize) -> bool {
        self.exact_solutions.get(index).is_some_and(|s| s.equal)
    }

    /// Numeric root at `index` from the last approximate solve.
    #[must_use]
    pub fn approximate_solution_at(&self, index: usize) -> Option<f64> {
        self.approximate_solutions.get(index).copied()
    }

    /// Number of numeric roots recorded by the last approximate solve.
    #[must_use]
    pub fn approximate_solution_count(&self) -> usize {
        self.approximate_solutions.len()
    }

    // -------------------------------------------------------------------
    // Numeric search interval
    // -------------------------------------------------------------------

    /// Search bound: `0` is the lower bound, anything else the upper.
    #[must_use]
    pub fn interval_bound(&self, index: usize) -> f64 {
        if index == 0 {
            self.interval[0]
        } else {
            self.interval[1]
        }
    }

    /// Set a search bound. Setting one bound past the other drags the
    /// other along so the interval stays ordered: pushing the lower bound
    /// past the upper moves the upper to `value + 1`, and symmetrically
    /// for the upper bound. Equal bounds are a valid, degenerate interval
    /// and are left alone.
    pub fn set_interval_bound(&mut self, index: usize, value: f64) {
        if index == 0 {
            self.interval[0] = value;
            if self.interval[0] > self.interval[1] {
                self.interval[1] = value + 1.0;
            }
        } else {
            self.interval[1] = value;
            if self.interval[0] > self.interval[1] {
                self.interval[0] = value - 1.0;
            }
        }
    }

    // -------------------------------------------------------------------
    // Invalidation
    // -------------------------------------------------------------------

    /// Drop all derived state stamped at or after `mark`: memoized forms
    /// in every equation, and the whole solution set if it was produced
    /// there. Call after rewinding the pool below state that must not be
    /// reused, e.g. when definitions change.
    pub fn tidy_downstream(&mut self, mark: PoolMark) {
        for equation in &self.equations {
            equation.tidy(mark);
        }
        if self.solve_mark.is_some_and(|m| m >= mark) {
            self.clear_solutions();
        }
    }

    /// Reset every solve output to its observable empty state.
    pub(crate) fn clear_solutions(&mut self) {
        self.classification = Classification::LinearSystem;
        self.degree = None;
        self.variables.clear();
        self.user_variables.clear();
        self.user_variables_used = false;
        self.last_substitution = None;
        self.exact_solutions.clear();
        self.infinite_solutions = false;
        self.approximate_solutions.clear();
        self.more_solutions = false;
        self.solve_mark = None;
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
    fn add_and_read_back() {
        let defs = Definitions::new();
        let mut store = EquationStore::new();
        store.add_equation("x+1=2", &defs).unwrap();
        store.add_equation("y=x", &defs).unwrap();
        assert_eq!(store.equation_count(), 2);
        assert_eq!(store.equation_text_at(0), Some("x+1=2"));
        assert_eq!(store.equation_text_at(1), Some("y=x"));
        assert_eq!(store.equation_text_at(2), None);
    }

    #[test]
    fn capacity_is_bounded() {
        let defs = Definitions::new();
        let mut store = EquationStore::new();
        for i in 0..crate::MAX_EQUATIONS {
            store.add_equation(&format!("x={i}"), &defs).unwrap();
        }
        assert_eq!(
            store.add_equation("x=99", &defs),
            Err(StoreError::Full)
        );
    }

    #[test]
    fn parse_errors_surface_at_add() {
        let defs = Definitions::new();
        let mut store = EquationStore::new();
        assert!(matches!(
            store.add_equation("x+1", &defs),
            Err(StoreError::Parse(ParseError::MissingEquals))
        ));
        assert!(store.add_equation("2=)", &defs).is_err());
        assert_eq!(store.equation_count(), 0);
    }

    #[test]
    fn remove_shifts_order() {
        let defs = Definitions::new();
        let mut store = EquationStore::new();
        store.add_equation("x=1", &defs).unwrap();
        store.add_equation("x=2", &defs).unwrap();
        store.remove_equation(0);
        assert_eq!(store.equation_count(), 1);
        assert_eq!(store.equation_text_at(0), Some("x=2"));
        store.remove_equation(7);
        assert_eq!(store.equation_count(), 1);
    }

    #[test]
    fn interval_bounds_auto_correct() {
        let mut store = EquationStore::new();
        assert_eq!(store.interval_bound(0), -10.0);
        assert_eq!(store.interval_bound(1), 10.0);

        store.set_interval_bound(0, 15.0);
        assert_eq!(store.interval_bound(0), 15.0);
        assert_eq!(store.interval_bound(1), 16.0);

        store.set_interval_bound(1, -3.0);
        assert_eq!(store.interval_bound(1), -3.0);
        assert_eq!(store.interval_bound(0), -4.0);

        store.set_interval_bound(1, 5.0);
        assert_eq!(store.interval_bound(0), -4.0);
        assert_eq!(store.interval_bound(1), 5.0);

        // Equal bounds are a valid single-point interval, not a crossing.
        store.set_interval_bound(0, 5.0);
        assert_eq!(store.interval_bound(0), 5.0);
        assert_eq!(store.interval_bound(1), 5.0);
        store.set_interval_bound(1, 5.0);
        assert_eq!(store.interval_bound(0), 5.0);
        assert_eq!(store.interval_bound(1), 5.0);
    }

    #[test]
    fn standard_form_is_memoized() {
        let ctx = SolveContext::new();
        let equation = Equation::new("x+x=6", &ctx.definitions).unwrap();
        let first = equation.standard_form(
            &ctx,
            Substitution::AllDefinitions,
            ReductionTarget::SystemForAnalysis,
        );
        assert_eq!(first.to_string(), "-6+2*x");
        let used = ctx.pool.used();
        let second = equation.standard_form(
            &ctx,
            Substitution::AllDefinitions,
            ReductionTarget::SystemForAnalysis,
        );
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.pool.used(), used);
    }

    #[test]
    fn tidy_drops_memoized_forms() {
        let ctx = SolveContext::new();
        let equation = Equation::new("x=2", &ctx.definitions).unwrap();
        let mark = ctx.pool.mark();
        let first = equation.standard_form(
            &ctx,
            Substitution::AllDefinitions,
            ReductionTarget::SystemForAnalysis,
        );
        equation.tidy(mark);
        let second = equation.standard_form(
            &ctx,
            Substitution::AllDefinitions,
            ReductionTarget::SystemForAnalysis,
        );
        // Equal values, but re-derived rather than the cached allocation.
        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn substitution_policies_memoize_separately() {
        let ctx = SolveContext::new().define_symbol("a", Expr::integer(5));
        let equation = Equation::new("x=a", &ctx.definitions).unwrap();
        let all = equation.standard_form(
            &ctx,
            Substitution::AllDefinitions,
            ReductionTarget::SystemForAnalysis,
        );
        let functions_only = equation.standard_form(
            &ctx,
            Substitution::FunctionsOnly,
            ReductionTarget::SystemForAnalysis,
        );
        assert_eq!(all.to_string(), "-5+x");
        assert_eq!(functions_only.to_string(), "-a+x");
    }
}
