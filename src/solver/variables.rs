//! Symbol collection over reduced equation forms.
//!
//! Two collectors with the same walk and different filters: the unknowns
//! (every free symbol left after substitution and reduction) and the user
//! variables (symbols that have a plain definition, gathered from the
//! functions-only substituted trees so the orchestrator can tell whether
//! ignoring those definitions could rescue a failed solve).

use std::sync::Arc;

use crate::core::{Expr, InternedSymbol, KS};
use crate::context::Definitions;
use crate::error::SolveError;

/// Free symbols of the reduced forms, deduplicated, in order of first
/// appearance across the equation list. Known constants (`pi`, `e`, `i`)
/// are never unknowns. More than [`crate::MAX_VARIABLES`] distinct symbols
/// is an error rather than a silent truncation.
pub(crate) fn collect_unknowns(forms: &[Arc<Expr>]) -> Result<Vec<InternedSymbol>, SolveError> {
    let mut unknowns: Vec<InternedSymbol> = Vec::new();
    let mut overflow = false;
    for form in forms {
        form.for_each_symbol(&mut |symbol| {
            if KS.is_constant(symbol.id()) {
                return;
            }
            if unknowns.iter().any(|known| known.id() == symbol.id()) {
                return;
            }
            if unknowns.len() == crate::MAX_VARIABLES {
                overflow = true;
                return;
            }
            unknowns.push(symbol.clone());
        });
    }
    if overflow {
        return Err(SolveError::TooManyVariables);
    }
    Ok(unknowns)
}

/// Symbols with a plain variable definition appearing in `trees`,
/// deduplicated, in order of first appearance. At most
/// [`crate::MAX_VARIABLES`] are kept; later ones are ignored, since the
/// list only informs the retry decision.
pub(crate) fn collect_user_variables(
    trees: &[Arc<Expr>],
    definitions: &Definitions,
) -> Vec<InternedSymbol> {
    let mut found: Vec<InternedSymbol> = Vec::new();
    for tree in trees {
        tree.for_each_symbol(&mut |symbol| {
            if !definitions.is_symbol(symbol.id()) {
                return;
            }
            if found.iter().any(|known| known.id() == symbol.id()) {
                return;
            }
            if found.len() < crate::MAX_VARIABLES {
                found.push(symbol.clone());
            }
        });
    }
    found
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

    fn tree(text: &str) -> Arc<Expr> {
        Arc::new(parse(text, &Definitions::new()).unwrap())
    }

    fn names(symbols: &[InternedSymbol]) -> Vec<&str> {
        symbols.iter().map(InternedSymbol::name).collect()
    }

    #[test]
    fn first_appearance_order_across_equations() {
        let forms = [tree("y+x"), tree("z+x")];
        let unknowns = collect_unknowns(&forms).unwrap();
        assert_eq!(names(&unknowns), ["y", "x", "z"]);
    }

    #[test]
    fn known_constants_are_not_unknowns() {
        let forms = [tree("pi*x+e")];
        let unknowns = collect_unknowns(&forms).unwrap();
        assert_eq!(names(&unknowns), ["x"]);
    }

    #[test]
    fn overflow_is_an_error() {
        let forms = [tree("a+b+c+d+e2+f+g")];
        assert_eq!(
            collect_unknowns(&forms),
            Err(SolveError::TooManyVariables)
        );
    }

    #[test]
    fn exactly_at_the_cap_is_fine() {
        let forms = [tree("a+b+c+d+e2+f")];
        assert_eq!(collect_unknowns(&forms).unwrap().len(), crate::MAX_VARIABLES);
    }

    #[test]
    fn user_variables_filtered_by_definitions() {
        let mut defs = Definitions::new();
        defs.define_symbol("a", Expr::integer(3));
        let trees = [tree("a*x+b")];
        let found = collect_user_variables(&trees, &defs);
        assert_eq!(names(&found), ["a"]);
    }

    #[test]
    fn user_variable_list_is_capped() {
        let mut defs = Definitions::new();
        for name in ["a", "b", "c", "d", "e2", "f", "g"] {
            defs.define_symbol(name, Expr::integer(1));
        }
        let trees = [tree("a+b+c+d+e2+f+g")];
        let found = collect_user_variables(&trees, &defs);
        assert_eq!(found.len(), crate::MAX_VARIABLES);
        assert_eq!(names(&found), ["a", "b", "c", "d", "e2", "f"]);
    }
}
