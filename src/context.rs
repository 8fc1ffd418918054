//! Solve session configuration.
//!
//! A [`SolveContext`] bundles everything one solve runs under: user
//! definitions to substitute, conventions, the node budget, and an optional
//! policy predicate that withholds exact layouts (exam-style restrictions
//! where a device must not reveal symbolic radicals).
//!
//! # Example
//! ```ignore
//! use symsolve::{SolveContext, Expr};
//!
//! let ctx = SolveContext::new()
//!     .define_symbol("a", Expr::integer(2))
//!     .define_function("f", "t", Expr::pow_static(Expr::symbol("t"), Expr::integer(2)));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::conventions::{AngleUnit, ComplexFormat, Conventions};
use crate::core::{Expr, InternedSymbol, symb};
use crate::pool::Pool;

/// Predicate deciding whether an exact solution layout must be withheld.
pub type ExactSuppressor = Arc<dyn Fn(&Expr) -> bool + Send + Sync>;

/// A single-parameter user function definition, `f(t):=body`.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// The bound parameter name.
    pub param: InternedSymbol,
    /// The body, with the parameter free inside it.
    pub body: Expr,
}

/// Which user definitions are substituted into an equation before solving.
///
/// The second solve pass keeps defined symbols as free unknowns so a system
/// like `x=a` with `a:=1` can still be solved for both `x` and `a` when the
/// full-substitution pass degenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substitution {
    /// Substitute symbol values and function bodies.
    AllDefinitions,
    /// Substitute function bodies only.
    FunctionsOnly,
}

/// User-defined symbols and functions visible during substitution.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    symbols: FxHashMap<u64, Expr>,
    functions: FxHashMap<u64, FunctionDef>,
}

impl Definitions {
    /// Empty definitions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a symbol value.
    pub fn define_symbol(&mut self, name: &str, value: Expr) {
        self.symbols.insert(symb(name).id(), value);
    }

    /// Define (or redefine) a single-parameter function.
    pub fn define_function(&mut self, name: &str, param: &str, body: Expr) {
        self.functions.insert(
            symb(name).id(),
            FunctionDef {
                param: symb(param),
                body,
            },
        );
    }

    /// Value bound to a symbol ID, if any.
    #[must_use]
    pub fn symbol_value(&self, id: u64) -> Option<&Expr> {
        self.symbols.get(&id)
    }

    /// Function bound to a symbol ID, if any.
    #[must_use]
    pub fn function(&self, id: u64) -> Option<&FunctionDef> {
        self.functions.get(&id)
    }

    /// True if this name is a user-defined function. The parser uses this to
    /// tell `f(x)` the call from `f*(x)` the implicit product.
    #[must_use]
    pub fn is_function(&self, id: u64) -> bool {
        self.functions.contains_key(&id)
    }

    /// Name-keyed variant of [`Definitions::is_function`] for the parser,
    /// which sees identifiers before they become interned symbols.
    #[must_use]
    pub fn is_function_name(&self, name: &str) -> bool {
        self.is_function(symb(name).id())
    }

    /// True if this name is a user-defined symbol.
    #[must_use]
    pub fn is_symbol(&self, id: u64) -> bool {
        self.symbols.contains_key(&id)
    }

    /// True when nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.functions.is_empty()
    }
}

/// Everything one solve session runs under.
pub struct SolveContext {
    /// User definitions substituted before reduction.
    pub definitions: Definitions,
    /// Angle and complex conventions.
    pub conventions: Conventions,
    /// Node budget shared by all reductions of the session.
    pub pool: Pool,
    suppress_exact: Option<ExactSuppressor>,
}

impl SolveContext {
    /// A context with default conventions, an empty definition set and the
    /// default node budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conventions wholesale.
    #[must_use]
    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Set the angle unit.
    #[must_use]
    pub fn with_angle_unit(mut self, unit: AngleUnit) -> Self {
        self.conventions.angle_unit = unit;
        self
    }

    /// Set the complex format.
    #[must_use]
    pub fn with_complex_format(mut self, format: ComplexFormat) -> Self {
        self.conventions.complex_format = format;
        self
    }

    /// Replace the node budget.
    #[must_use]
    pub fn with_pool(mut self, pool: Pool) -> Self {
        self.pool = pool;
        self
    }

    /// Define a symbol, fluent form.
    #[must_use]
    pub fn define_symbol(mut self, name: &str, value: Expr) -> Self {
        self.definitions.define_symbol(name, value);
        self
    }

    /// Define a function, fluent form.
    #[must_use]
    pub fn define_function(mut self, name: &str, param: &str, body: Expr) -> Self {
        self.definitions.define_function(name, param, body);
        self
    }

    /// Install a policy predicate that withholds exact layouts it matches.
    #[must_use]
    pub fn suppress_exact_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Expr) -> bool + Send + Sync + 'static,
    {
        self.suppress_exact = Some(Arc::new(predicate));
        self
    }

    /// True when the policy predicate forbids showing this exact form.
    #[must_use]
    pub fn exact_suppressed(&self, exact: &Expr) -> bool {
        self.suppress_exact.as_ref().is_some_and(|p| p(exact))
    }
}

impl Default for SolveContext {
    fn default() -> Self {
        Self {
            definitions: Definitions::default(),
            conventions: Conventions::default(),
            pool: Pool::default(),
            suppress_exact: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_lookup() {
        let mut defs = Definitions::new();
        defs.define_symbol("a", Expr::integer(2));
        defs.define_function("f", "t", Expr::symbol("t"));

        let a = symb("a");
        let f = symb("f");
        assert!(defs.symbol_value(a.id()).is_some());
        assert!(defs.is_function(f.id()));
        assert!(!defs.is_function(a.id()));
    }

    #[test]
    fn test_suppressor_defaults_to_off() {
        let ctx = SolveContext::new();
        assert!(!ctx.exact_suppressed(&Expr::sqrt(Expr::integer(2))));

        let ctx = SolveContext::new().suppress_exact_when(|_| true);
        assert!(ctx.exact_suppressed(&Expr::integer(1)));
    }
}
