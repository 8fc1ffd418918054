//! Target-driven expression reduction.
//!
//! A single bottom-up pass: children first, then node rules. The smart
//! constructors already fold rational arithmetic and sort n-ary operands,
//! so reduction adds what they cannot do locally: like-term and same-base
//! collection, distribution (analysis target only), radical extraction,
//! builtin identities, and definition substitution.
//!
//! Every visited node charges one unit to the shared pool; running out of
//! budget collapses the result to `Undefined`, which a solve then reports
//! as `EquationUndefined`.

mod arithmetic;
mod calls;
mod substitute;

pub(crate) use substitute::{replace_symbol, substitute};

use crate::conventions::{Conventions, ReductionTarget};
use crate::core::{Expr, ExprKind};
use crate::pool::Pool;
use std::sync::Arc;
use std::sync::OnceLock;

/// Check if tracing is enabled via environment variable (cached)
pub(crate) fn trace_enabled() -> bool {
    static TRACE: OnceLock<bool> = OnceLock::new();
    *TRACE.get_or_init(|| {
        std::env::var("SYMSOLVE_TRACE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    })
}

/// One reduction run: a target, the ambient conventions, and the pool the
/// node budget is charged against.
pub(crate) struct Reducer<'a> {
    target: ReductionTarget,
    conventions: Conventions,
    pool: &'a Pool,
}

impl<'a> Reducer<'a> {
    pub(crate) fn new(
        target: ReductionTarget,
        conventions: Conventions,
        pool: &'a Pool,
    ) -> Self {
        Self {
            target,
            conventions,
            pool,
        }
    }

    pub(crate) fn target(&self) -> ReductionTarget {
        self.target
    }

    pub(crate) fn conventions(&self) -> Conventions {
        self.conventions
    }

    /// Reduce `expr` bottom-up under this run's target and conventions.
    pub(crate) fn reduce(&self, expr: &Arc<Expr>) -> Arc<Expr> {
        let result = self.reduce_node(expr);
        if trace_enabled() {
            eprintln!("[TRACE] reduce/{:?}: {expr} => {result}", self.target);
        }
        result
    }

    pub(crate) fn reduce_node(&self, expr: &Arc<Expr>) -> Arc<Expr> {
        if !self.pool.charge(1) {
            return Arc::new(Expr::undefined());
        }

        match &expr.kind {
            ExprKind::Sum(terms) => {
                let reduced: Vec<Arc<Expr>> =
                    terms.iter().map(|t| self.reduce_node(t)).collect();
                self.reduce_sum(reduced)
            }
            ExprKind::Product(factors) => {
                let reduced: Vec<Arc<Expr>> =
                    factors.iter().map(|f| self.reduce_node(f)).collect();
                self.reduce_product(reduced)
            }
            ExprKind::Pow(base, exponent) => {
                let base = self.reduce_node(base);
                let exponent = self.reduce_node(exponent);
                self.reduce_pow(base, exponent)
            }
            ExprKind::FunctionCall { name, args } => {
                let reduced: Vec<Arc<Expr>> =
                    args.iter().map(|a| self.reduce_node(a)).collect();
                self.reduce_call(name.clone(), reduced)
            }
            ExprKind::Matrix {
                rows,
                cols,
                entries,
            } => {
                let reduced: Vec<Arc<Expr>> =
                    entries.iter().map(|e| self.reduce_node(e)).collect();
                if reduced.iter().any(|e| e.is_undefined()) {
                    return Arc::new(Expr::undefined());
                }
                if reduced.iter().any(|e| e.is_nonreal()) {
                    return Arc::new(Expr::nonreal());
                }
                let unchanged = reduced
                    .iter()
                    .zip(entries.iter())
                    .all(|(new, old)| Arc::ptr_eq(new, old));
                if unchanged {
                    Arc::clone(expr)
                } else {
                    Arc::new(Expr::new(ExprKind::Matrix {
                        rows: *rows,
                        cols: *cols,
                        entries: reduced,
                    }))
                }
            }
            // Leaves: rationals, floats, symbols, markers.
            _ => Arc::clone(expr),
        }
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
    use crate::context::Definitions;
    use crate::conventions::ComplexFormat;
    use crate::parser::parse;
    use crate::pool::POOL_CAPACITY;

    fn reduce_str(input: &str, target: ReductionTarget) -> String {
        let defs = Definitions::new();
        let pool = Pool::new(POOL_CAPACITY);
        let reducer = Reducer::new(target, Conventions::default(), &pool);
        let expr = Arc::new(parse(input, &defs).unwrap());
        reducer.reduce(&expr).to_string()
    }

    fn analyze(input: &str) -> String {
        reduce_str(input, ReductionTarget::SystemForAnalysis)
    }

    #[test]
    fn like_terms_collect() {
        assert_eq!(analyze("x+x"), "2*x");
        assert_eq!(analyze("3x-x"), "2*x");
        assert_eq!(analyze("x-x"), "0");
        assert_eq!(analyze("2x+3x+1"), "1+5*x");
    }

    #[test]
    fn same_base_powers_collect() {
        assert_eq!(analyze("x*x"), "x^2");
        assert_eq!(analyze("x^2*x"), "x^3");
        assert_eq!(analyze("x^2*x^(-2)"), "1");
        assert_eq!(analyze("x*y*x"), "x^2*y");
    }

    #[test]
    fn analysis_target_distributes() {
        assert_eq!(analyze("2*(x+1)"), "2+2*x");
        assert_eq!(analyze("(x+1)*(x-1)"), "-1+x^2");
        assert_eq!(analyze("(x+1)^2"), "1+2*x+x^2");
        assert_eq!(analyze("(x-2)*(x-3)"), "6-5*x+x^2");
    }

    #[test]
    fn user_target_keeps_factored_forms() {
        assert_eq!(
            reduce_str("2*(x+1)", ReductionTarget::User),
            "2*(1+x)"
        );
        assert_eq!(
            reduce_str("(x+1)^2", ReductionTarget::User),
            "(1+x)^2"
        );
    }

    #[test]
    fn radicals_extract_square_factors() {
        assert_eq!(analyze("sqrt(4)"), "2");
        assert_eq!(analyze("sqrt(8)"), "2*2^(1/2)");
        assert_eq!(analyze("sqrt(2)"), "2^(1/2)");
        assert_eq!(analyze("sqrt(1/2)"), "1/2*2^(1/2)");
        assert_eq!(analyze("8^(1/3)"), "2");
    }

    #[test]
    fn negative_radicand_follows_complex_format() {
        let defs = Definitions::new();
        let pool = Pool::new(POOL_CAPACITY);
        let expr = Arc::new(parse("sqrt(-4)", &defs).unwrap());

        let real = Reducer::new(
            ReductionTarget::SystemForAnalysis,
            Conventions::default(),
            &pool,
        );
        assert_eq!(real.reduce(&expr).to_string(), "nonreal");

        let cartesian = Reducer::new(
            ReductionTarget::SystemForAnalysis,
            Conventions::default().with_complex_format(ComplexFormat::Cartesian),
            &pool,
        );
        assert_eq!(cartesian.reduce(&expr).to_string(), "2*i");
    }

    #[test]
    fn builtin_identities() {
        assert_eq!(analyze("ln(1)"), "0");
        assert_eq!(analyze("ln(e)"), "1");
        assert_eq!(analyze("exp(0)"), "1");
        assert_eq!(analyze("cos(0)"), "1");
        assert_eq!(analyze("sin(0)"), "0");
        assert_eq!(analyze("abs(-3/2)"), "3/2");
        assert_eq!(analyze("cbrt(-27)"), "-3");
        assert_eq!(analyze("cbrt(2)"), "cbrt(2)");
    }

    #[test]
    fn undefined_and_nonreal_propagate() {
        assert_eq!(analyze("ln(0)"), "undef");
        assert_eq!(analyze("x+ln(0)"), "undef");
        assert_eq!(analyze("1/0"), "undef");
    }

    #[test]
    fn nested_powers_merge_under_integer_exponents() {
        assert_eq!(analyze("(x^2)^3"), "x^6");
        assert_eq!(analyze("(x^(1/2))^2"), "x");
    }

    #[test]
    fn integer_products_distribute_over_powers() {
        assert_eq!(analyze("(2x)^3"), "8*x^3");
        assert_eq!(analyze("(-x)^2"), "x^2");
    }

    #[test]
    fn imaginary_unit_powers_cycle() {
        assert_eq!(analyze("i^2"), "-1");
        assert_eq!(analyze("i^3"), "-i");
        assert_eq!(analyze("i^4"), "1");
        assert_eq!(analyze("i^(-1)"), "-i");
        assert_eq!(analyze("i*i"), "-1");
    }

    #[test]
    fn exhausted_pool_collapses_to_undefined() {
        let defs = Definitions::new();
        let pool = Pool::new(3);
        let reducer = Reducer::new(
            ReductionTarget::SystemForAnalysis,
            Conventions::default(),
            &pool,
        );
        let expr = Arc::new(parse("x+y+z+w+v", &defs).unwrap());
        assert_eq!(reducer.reduce(&expr).to_string(), "undef");
    }
}
