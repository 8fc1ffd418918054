//! Reduction of function applications.
//!
//! Arguments are already reduced when these rules run. Builtins fold only
//! where the result is exact; everything else stays symbolic for the
//! numeric layer.

use super::Reducer;
use crate::core::{Expr, InternedSymbol, KS};
use crate::functions::Registry;
use std::sync::Arc;

impl Reducer<'_> {
    pub(crate) fn reduce_call(&self, name: InternedSymbol, args: Vec<Arc<Expr>>) -> Arc<Expr> {
        if args.iter().any(|a| a.is_undefined()) {
            return Arc::new(Expr::undefined());
        }
        if args.iter().any(|a| a.is_nonreal()) {
            return Arc::new(Expr::nonreal());
        }

        let id = name.id();

        // sqrt lowers to a power so the radical rules apply in one place.
        if id == KS.sqrt && args.len() == 1 {
            let arg = Arc::clone(&args[0]);
            return self.reduce_pow(arg, Arc::new(Expr::rational(1, 2)));
        }

        if let Some(def) = Registry::get(name.name()) {
            if !def.validate_arity(args.len()) {
                return Arc::new(Expr::undefined());
            }
            if let Some(folded) = fold_builtin(id, &args) {
                return folded;
            }
        }

        Arc::new(Expr::func_from_arcs(name, args))
    }
}

/// Exact identities for builtin calls. `None` keeps the call symbolic.
fn fold_builtin(id: u64, args: &[Arc<Expr>]) -> Option<Arc<Expr>> {
    let arg = args.first()?;

    if id == KS.cbrt {
        let root = arg.as_rational()?.exact_cbrt()?;
        return Some(Arc::new(Expr::from_rational(root)));
    }
    if id == KS.exp {
        return arg
            .is_zero()
            .then(|| Arc::new(Expr::integer(1)));
    }
    if id == KS.ln {
        if arg.is_zero() {
            return Some(Arc::new(Expr::undefined()));
        }
        if arg.is_one() {
            return Some(Arc::new(Expr::integer(0)));
        }
        if arg.symbol_id() == Some(KS.e) {
            return Some(Arc::new(Expr::integer(1)));
        }
        return None;
    }
    if id == KS.log && args.len() == 1 {
        if arg.is_one() {
            return Some(Arc::new(Expr::integer(0)));
        }
        if arg.as_rational().is_some_and(|r| r == crate::core::Rational::integer(10)) {
            return Some(Arc::new(Expr::integer(1)));
        }
        return None;
    }
    if id == KS.abs {
        if let Some(r) = arg.as_rational() {
            return Some(Arc::new(Expr::from_rational(r.abs())));
        }
        if let Some(f) = arg.as_float() {
            return Some(Arc::new(Expr::float(f.abs())));
        }
        return None;
    }

    // Zero-argument identities shared by every angle unit.
    let arg_is_zero = arg.is_null().is_true();
    if id == KS.sin || id == KS.tan || id == KS.asin || id == KS.atan || id == KS.sinh || id == KS.tanh
    {
        return arg_is_zero.then(|| Arc::new(Expr::integer(0)));
    }
    if id == KS.cos || id == KS.cosh {
        return arg_is_zero.then(|| Arc::new(Expr::integer(1)));
    }

    None
}
