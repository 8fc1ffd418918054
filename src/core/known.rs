//! Pre-interned symbol IDs for O(1) comparison.
//!
//! Function names and mathematical constants come up constantly in reduction
//! and approximation; comparing their pre-interned IDs is a u64 compare
//! instead of a string compare.

use std::sync::LazyLock;

use crate::core::symbol::{InternedSymbol, lookup_by_id, symb};

fn intern_id(name: &str) -> u64 {
    symb(name).id()
}

/// Collection of pre-interned symbol IDs for built-in functions and constants.
pub struct KnownSymbols {
    // Roots
    pub sqrt: u64,
    pub cbrt: u64,

    // Exponential / Log
    pub exp: u64,
    pub ln: u64,
    pub log: u64,

    // Trigonometric
    pub sin: u64,
    pub cos: u64,
    pub tan: u64,

    // Inverse trigonometric
    pub asin: u64,
    pub acos: u64,
    pub atan: u64,

    // Hyperbolic
    pub sinh: u64,
    pub cosh: u64,
    pub tanh: u64,

    // Special
    pub abs: u64,

    // Constants used as symbols
    pub pi: u64,
    pub e: u64,
    pub i: u64,
}

impl KnownSymbols {
    fn new() -> Self {
        Self {
            sqrt: intern_id("sqrt"),
            cbrt: intern_id("cbrt"),
            exp: intern_id("exp"),
            ln: intern_id("ln"),
            log: intern_id("log"),
            sin: intern_id("sin"),
            cos: intern_id("cos"),
            tan: intern_id("tan"),
            asin: intern_id("asin"),
            acos: intern_id("acos"),
            atan: intern_id("atan"),
            sinh: intern_id("sinh"),
            cosh: intern_id("cosh"),
            tanh: intern_id("tanh"),
            abs: intern_id("abs"),
            pi: intern_id("pi"),
            e: intern_id("e"),
            i: intern_id("i"),
        }
    }

    /// Whether `id` names one of the constants (`pi`, `e`, `i`).
    #[inline]
    #[must_use]
    pub fn is_constant(&self, id: u64) -> bool {
        id == self.pi || id == self.e || id == self.i
    }
}

/// Global instance of pre-interned symbol IDs.
pub static KS: LazyLock<KnownSymbols> = LazyLock::new(KnownSymbols::new);

/// Get the `InternedSymbol` for a known ID.
///
/// # Panics
///
/// Panics if the ID was not produced by the known-symbol table.
#[inline]
#[must_use]
pub fn get_symbol(id: u64) -> InternedSymbol {
    lookup_by_id(id).expect("Known symbol ID not found in registry")
}
