//! Symbolic Equation Solving Library
//!
//! A focused Rust library for solving small systems of equations exactly,
//! with a numeric fallback when no closed form exists.
//!
//! # Features
//! - Equation store holding up to six simultaneous equations
//! - Exact linear systems via Gauss-Jordan elimination over symbolic entries
//! - Closed-form quadratics and cubics, with the discriminant as a trailing
//!   solution slot
//! - Numeric root isolation (scan plus Brent refinement) over an adjustable
//!   interval
//! - Two-pass solving that can set user-defined variables free when their
//!   definitions make a system unsolvable
//! - Exact/approximate layout reconciliation, deciding between `=` and `≈`
//! - Budgeted computation pool with watermark rewind and memo invalidation
//!
//! # Usage Examples
//!
//! ## Exact solve
//! ```
//! use symsolve::{EquationStore, SolveContext, SolutionCount};
//!
//! let ctx = SolveContext::new();
//! let mut store = EquationStore::new();
//! store.add_equation("x^2=2", &ctx.definitions).unwrap();
//!
//! assert_eq!(store.solve(&ctx), Ok(SolutionCount::Finite(3)));
//! assert_eq!(store.exact_solution_layout_at(0, true), Some("-2^(1/2)"));
//! assert_eq!(store.exact_solution_layout_at(1, true), Some("2^(1/2)"));
//! // The discriminant rides along as the last slot.
//! assert_eq!(store.exact_solution_layout_at(2, true), Some("8"));
//! ```
//!
//! ## Numeric fallback
//! ```
//! use symsolve::{EquationStore, SolveContext, SolveError};
//!
//! let ctx = SolveContext::new();
//! let mut store = EquationStore::new();
//! store.add_equation("cos(x)=x", &ctx.definitions).unwrap();
//!
//! assert_eq!(store.solve(&ctx), Err(SolveError::RequireApproximateSolution));
//! store.approximate_solve(&ctx);
//! let root = store.approximate_solution_at(0).unwrap();
//! assert!((root - 0.7390851332151607).abs() < 1e-9);
//! ```

mod approx;
mod context;
mod conventions;
mod core;
mod error;
mod functions;
mod parser;
mod pool;
mod reduce;
mod solver;
mod store;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use context::{Definitions, FunctionDef, SolveContext, Substitution};
pub use conventions::{AngleUnit, ComplexFormat, Conventions, ReductionTarget};
pub use crate::core::{Expr, ExprKind, InternedSymbol, Rational, symb};
pub use error::{ParseError, SolveError, Span, StoreError};
pub use parser::{parse, parse_equation};
pub use pool::{POOL_CAPACITY, Pool, PoolMark};
pub use store::{Classification, Equation, EquationStore, SolutionCount};

/// Maximum number of equations a store records.
pub const MAX_EQUATIONS: usize = 6;
/// Maximum number of distinct unknowns across a system.
pub const MAX_VARIABLES: usize = 6;
/// Maximum number of exact solution slots, discriminant included.
pub const MAX_EXACT_SOLUTIONS: usize = 6;
/// Maximum number of numeric roots recorded per approximate solve.
pub const MAX_APPROXIMATE_SOLUTIONS: usize = 10;
/// Highest polynomial degree solved in closed form.
pub const MAX_SOLVED_DEGREE: usize = 3;
/// Highest degree the polynomial coefficient extractor recognizes.
pub const MAX_EXTRACTED_DEGREE: usize = 10;
