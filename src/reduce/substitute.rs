//! Definition substitution.
//!
//! Replaces defined symbols and function calls by their stored values
//! before reduction. Depth counts definition expansions, not structural
//! descent, so self-referential definitions bottom out as undefined
//! instead of overflowing the stack.

use crate::context::{Definitions, Substitution};
use crate::core::{Expr, ExprKind};
use std::sync::Arc;

const MAX_SUBSTITUTION_DEPTH: usize = 100;

pub(crate) fn substitute(
    expr: &Arc<Expr>,
    definitions: &Definitions,
    policy: Substitution,
) -> Arc<Expr> {
    substitute_at(expr, definitions, policy, 0)
}

fn substitute_at(
    expr: &Arc<Expr>,
    definitions: &Definitions,
    policy: Substitution,
    depth: usize,
) -> Arc<Expr> {
    if depth > MAX_SUBSTITUTION_DEPTH {
        return Arc::new(Expr::undefined());
    }
    match &expr.kind {
        ExprKind::Symbol(symbol) => {
            if policy == Substitution::AllDefinitions
                && let Some(value) = definitions.symbol_value(symbol.id())
            {
                let value = Arc::new(value.clone());
                return substitute_at(&value, definitions, policy, depth + 1);
            }
            Arc::clone(expr)
        }
        ExprKind::FunctionCall { name, args } => {
            let new_args: Vec<Arc<Expr>> = args
                .iter()
                .map(|a| substitute_at(a, definitions, policy, depth))
                .collect();
            if let Some(def) = definitions.function(name.id()) {
                if new_args.len() != 1 {
                    return Arc::new(Expr::undefined());
                }
                let body = Arc::new(def.body.clone());
                let bound = replace_symbol(&body, def.param.id(), &new_args[0]);
                return substitute_at(&bound, definitions, policy, depth + 1);
            }
            if new_args.iter().zip(args).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::func_from_arcs(name.clone(), new_args))
        }
        ExprKind::Sum(terms) => {
            let new_terms: Vec<Arc<Expr>> = terms
                .iter()
                .map(|t| substitute_at(t, definitions, policy, depth))
                .collect();
            if new_terms.iter().zip(terms).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::sum_from_arcs(new_terms))
        }
        ExprKind::Product(factors) => {
            let new_factors: Vec<Arc<Expr>> = factors
                .iter()
                .map(|f| substitute_at(f, definitions, policy, depth))
                .collect();
            if new_factors.iter().zip(factors).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::product_from_arcs(new_factors))
        }
        ExprKind::Pow(base, exponent) => {
            let new_base = substitute_at(base, definitions, policy, depth);
            let new_exponent = substitute_at(exponent, definitions, policy, depth);
            if Arc::ptr_eq(&new_base, base) && Arc::ptr_eq(&new_exponent, exponent) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::pow_from_arcs(new_base, new_exponent))
        }
        ExprKind::Matrix { rows, cols, entries } => {
            let new_entries: Vec<Arc<Expr>> = entries
                .iter()
                .map(|e| substitute_at(e, definitions, policy, depth))
                .collect();
            if new_entries.iter().zip(entries).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::new(ExprKind::Matrix {
                rows: *rows,
                cols: *cols,
                entries: new_entries,
            }))
        }
        ExprKind::Rational(_)
        | ExprKind::Float(_)
        | ExprKind::Undefined
        | ExprKind::Nonreal => Arc::clone(expr),
    }
}

/// Replace every occurrence of a symbol by `replacement`, rebuilding
/// through the constructors so the result re-folds.
pub(crate) fn replace_symbol(expr: &Arc<Expr>, id: u64, replacement: &Arc<Expr>) -> Arc<Expr> {
    match &expr.kind {
        ExprKind::Symbol(symbol) => {
            if symbol.id() == id {
                Arc::clone(replacement)
            } else {
                Arc::clone(expr)
            }
        }
        ExprKind::FunctionCall { name, args } => {
            let new_args: Vec<Arc<Expr>> = args
                .iter()
                .map(|a| replace_symbol(a, id, replacement))
                .collect();
            if new_args.iter().zip(args).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::func_from_arcs(name.clone(), new_args))
        }
        ExprKind::Sum(terms) => {
            let new_terms: Vec<Arc<Expr>> = terms
                .iter()
                .map(|t| replace_symbol(t, id, replacement))
                .collect();
            if new_terms.iter().zip(terms).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::sum_from_arcs(new_terms))
        }
        ExprKind::Product(factors) => {
            let new_factors: Vec<Arc<Expr>> = factors
                .iter()
                .map(|f| replace_symbol(f, id, replacement))
                .collect();
            if new_factors.iter().zip(factors).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::product_from_arcs(new_factors))
        }
        ExprKind::Pow(base, exponent) => {
            let new_base = replace_symbol(base, id, replacement);
            let new_exponent = replace_symbol(exponent, id, replacement);
            if Arc::ptr_eq(&new_base, base) && Arc::ptr_eq(&new_exponent, exponent) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::pow_from_arcs(new_base, new_exponent))
        }
        ExprKind::Matrix { rows, cols, entries } => {
            let new_entries: Vec<Arc<Expr>> = entries
                .iter()
                .map(|e| replace_symbol(e, id, replacement))
                .collect();
            if new_entries.iter().zip(entries).all(|(n, o)| Arc::ptr_eq(n, o)) {
                return Arc::clone(expr);
            }
            Arc::new(Expr::new(ExprKind::Matrix {
                rows: *rows,
                cols: *cols,
                entries: new_entries,
            }))
        }
        ExprKind::Rational(_)
        | ExprKind::Float(_)
        | ExprKind::Undefined
        | ExprKind::Nonreal => Arc::clone(expr),
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
    use crate::core::symb;
    use crate::parser::parse;

    fn sub(input: &str, definitions: &Definitions, policy: Substitution) -> String {
        let expr = Arc::new(parse(input, definitions).unwrap());
        substitute(&expr, definitions, policy).to_string()
    }

    #[test]
    fn symbols_expand_under_all_definitions() {
        let mut defs = Definitions::new();
        defs.define_symbol("a", Expr::integer(3));
        assert_eq!(sub("a+1", &defs, Substitution::AllDefinitions), "4");
        assert_eq!(sub("a+1", &defs, Substitution::FunctionsOnly), "1+a");
    }

    #[test]
    fn chained_symbol_definitions_resolve() {
        let mut defs = Definitions::new();
        defs.define_symbol("b", Expr::integer(2));
        defs.define_symbol(
            "a",
            Expr::add_expr(Expr::symbol("b"), Expr::integer(1)),
        );
        assert_eq!(sub("a", &defs, Substitution::AllDefinitions), "3");
    }

    #[test]
    fn functions_expand_under_both_policies() {
        let mut defs = Definitions::new();
        defs.define_function(
            "f",
            "t",
            Expr::pow_static(Expr::symbol("t"), Expr::integer(2)),
        );
        assert_eq!(sub("f(3)", &defs, Substitution::AllDefinitions), "9");
        assert_eq!(sub("f(3)", &defs, Substitution::FunctionsOnly), "9");
        assert_eq!(sub("f(x)", &defs, Substitution::FunctionsOnly), "x^2");
    }

    #[test]
    fn self_referential_definition_becomes_undefined() {
        let mut defs = Definitions::new();
        defs.define_symbol(
            "a",
            Expr::add_expr(Expr::symbol("a"), Expr::integer(1)),
        );
        assert_eq!(sub("a", &defs, Substitution::AllDefinitions), "undef");
    }

    #[test]
    fn replace_symbol_refolds_through_constructors() {
        let x = symb("x");
        let expr = Arc::new(Expr::add_expr(Expr::symbol("x"), Expr::integer(1)));
        let replaced = replace_symbol(&expr, x.id(), &Arc::new(Expr::integer(3)));
        assert_eq!(replaced.to_string(), "4");
    }

    #[test]
    fn untouched_trees_share_storage() {
        let defs = Definitions::new();
        let expr = Arc::new(
            parse("x^2+y", &defs).unwrap(),
        );
        let substituted = substitute(&expr, &defs, Substitution::AllDefinitions);
        assert!(Arc::ptr_eq(&expr, &substituted));
    }
}
