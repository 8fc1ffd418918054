//! Core types for symbolic expressions.
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - Expression AST with exact rational leaves
//! - `Rational` - Checked exact arithmetic on `i128` fractions
//! - `InternedSymbol` - Interned symbol system
//! - `KnownSymbols` - Pre-interned builtin names and constants
//! - Canonical serialization via `Display`

mod display;
pub(crate) mod expr;
pub(crate) mod known;
pub(crate) mod rational;
pub(crate) mod symbol;

pub use expr::{Expr, ExprKind, TriBool, expr_cmp};
pub use known::{KS, KnownSymbols};
pub use rational::Rational;
pub use symbol::{InternedSymbol, lookup_by_id, symb, symbol_count};
