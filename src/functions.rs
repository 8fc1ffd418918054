//! Builtin function registry.
//!
//! Numerical evaluation runs over `Complex64` so that square roots of
//! negatives and inverse trigonometric functions outside `[-1, 1]` produce
//! values the solver can classify instead of NaNs. Whether a complex result
//! is reported or rejected is decided later by the complex format in
//! effect, not here.

use num_complex::Complex64;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// How the active angle unit applies to a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AngleRole {
    /// Unit-insensitive (sqrt, ln, abs, the hyperbolics, ...).
    Neutral,
    /// The argument is an angle: scale it to radians before evaluating.
    Direct,
    /// The result is an angle: scale it back from radians after evaluating.
    Inverse,
}

/// Definition of a builtin function: arity contract plus numerical kernel.
#[derive(Clone)]
pub(crate) struct FunctionDefinition {
    /// Canonical name (e.g. "sin", "log").
    pub name: &'static str,

    /// Acceptable argument count.
    pub arity: RangeInclusive<usize>,

    /// Numerical evaluation over complex inputs. `None` signals an empty
    /// domain (e.g. `ln(0)`), never a merely complex value.
    pub eval: fn(&[Complex64]) -> Option<Complex64>,

    /// Angle-unit sensitivity.
    pub angle: AngleRole,
}

impl FunctionDefinition {
    /// Helper to check if argument count is valid
    pub(crate) fn validate_arity(&self, args: usize) -> bool {
        self.arity.contains(&args)
    }
}

/// Static registry storing all builtin definitions
static REGISTRY: OnceLock<HashMap<&'static str, FunctionDefinition>> = OnceLock::new();

/// Initialize the registry with all builtin definitions
fn init_registry() -> HashMap<&'static str, FunctionDefinition> {
    let mut map = HashMap::with_capacity(16);

    for def in all_definitions() {
        map.insert(def.name, def);
    }

    map
}

/// Central registry for getting builtin definitions
pub(crate) struct Registry;

impl Registry {
    /// Get a builtin definition by name - O(1) HashMap lookup
    pub(crate) fn get(name: &str) -> Option<&'static FunctionDefinition> {
        REGISTRY.get_or_init(init_registry).get(name)
    }

    /// Whether `name` denotes a builtin. The parser uses this to decide
    /// between a function call and an implicit product.
    pub(crate) fn is_builtin(name: &str) -> bool {
        Self::get(name).is_some()
    }
}

fn is_real(z: Complex64) -> bool {
    z.im == 0.0
}

/// Return all builtin definitions for populating the registry
fn all_definitions() -> Vec<FunctionDefinition> {
    vec![
        // Roots and exponentials
        FunctionDefinition {
            name: "sqrt",
            arity: 1..=1,
            eval: |args| Some(args[0].sqrt()),
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "cbrt",
            arity: 1..=1,
            // Real arguments take the real cube root so cbrt(-8) is -2,
            // the root the solver reports for odd radicals. Complex
            // arguments fall back to the principal branch.
            eval: |args| {
                let z = args[0];
                if is_real(z) {
                    Some(Complex64::new(z.re.cbrt(), 0.0))
                } else {
                    Some(z.powf(1.0 / 3.0))
                }
            },
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "exp",
            arity: 1..=1,
            eval: |args| Some(args[0].exp()),
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "ln",
            arity: 1..=1,
            eval: |args| {
                let z = args[0];
                if z.norm() == 0.0 { None } else { Some(z.ln()) }
            },
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "log",
            arity: 1..=2,
            // log(x) is base 10; log(x, b) is base b.
            eval: |args| {
                let x = args[0];
                if x.norm() == 0.0 {
                    return None;
                }
                let base = if args.len() == 2 {
                    args[1]
                } else {
                    Complex64::new(10.0, 0.0)
                };
                if base.norm() == 0.0 {
                    return None;
                }
                let ln_base = base.ln();
                if ln_base.norm() == 0.0 {
                    return None;
                }
                Some(x.ln() / ln_base)
            },
            angle: AngleRole::Neutral,
        },
        // Trigonometric
        FunctionDefinition {
            name: "sin",
            arity: 1..=1,
            eval: |args| Some(args[0].sin()),
            angle: AngleRole::Direct,
        },
        FunctionDefinition {
            name: "cos",
            arity: 1..=1,
            eval: |args| Some(args[0].cos()),
            angle: AngleRole::Direct,
        },
        FunctionDefinition {
            name: "tan",
            arity: 1..=1,
            eval: |args| Some(args[0].tan()),
            angle: AngleRole::Direct,
        },
        // Inverse trigonometric
        FunctionDefinition {
            name: "asin",
            arity: 1..=1,
            eval: |args| Some(args[0].asin()),
            angle: AngleRole::Inverse,
        },
        FunctionDefinition {
            name: "acos",
            arity: 1..=1,
            eval: |args| Some(args[0].acos()),
            angle: AngleRole::Inverse,
        },
        FunctionDefinition {
            name: "atan",
            arity: 1..=1,
            eval: |args| Some(args[0].atan()),
            angle: AngleRole::Inverse,
        },
        // Hyperbolic (never angle-scaled)
        FunctionDefinition {
            name: "sinh",
            arity: 1..=1,
            eval: |args| Some(args[0].sinh()),
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "cosh",
            arity: 1..=1,
            eval: |args| Some(args[0].cosh()),
            angle: AngleRole::Neutral,
        },
        FunctionDefinition {
            name: "tanh",
            arity: 1..=1,
            eval: |args| Some(args[0].tanh()),
            angle: AngleRole::Neutral,
        },
        // Magnitude
        FunctionDefinition {
            name: "abs",
            arity: 1..=1,
            eval: |args| Some(Complex64::new(args[0].norm(), 0.0)),
            angle: AngleRole::Neutral,
        },
    ]
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

    fn re(x: f64) -> Complex64 {
        Complex64::new(x, 0.0)
    }

    #[test]
    fn registry_knows_builtins() {
        assert!(Registry::is_builtin("sin"));
        assert!(Registry::is_builtin("cbrt"));
        assert!(!Registry::is_builtin("sine"));
        assert!(!Registry::is_builtin("f"));
    }

    #[test]
    fn arity_contracts() {
        let log = Registry::get("log").unwrap();
        assert!(log.validate_arity(1));
        assert!(log.validate_arity(2));
        assert!(!log.validate_arity(3));

        let sin = Registry::get("sin").unwrap();
        assert!(sin.validate_arity(1));
        assert!(!sin.validate_arity(2));
    }

    #[test]
    fn sqrt_of_negative_is_imaginary() {
        let sqrt = Registry::get("sqrt").unwrap();
        let v = (sqrt.eval)(&[re(-4.0)]).unwrap();
        assert!(v.re.abs() < 1e-12);
        assert!((v.im - 2.0).abs() < 1e-12);
    }

    #[test]
    fn cbrt_of_negative_real_stays_real() {
        let cbrt = Registry::get("cbrt").unwrap();
        let v = (cbrt.eval)(&[re(-8.0)]).unwrap();
        assert!((v.re - -2.0).abs() < 1e-12);
        assert_eq!(v.im, 0.0);
    }

    #[test]
    fn ln_rejects_zero() {
        let ln = Registry::get("ln").unwrap();
        assert!((ln.eval)(&[re(0.0)]).is_none());
    }

    #[test]
    fn log_defaults_to_base_ten() {
        let log = Registry::get("log").unwrap();
        let v = (log.eval)(&[re(100.0)]).unwrap();
        assert!((v.re - 2.0).abs() < 1e-12);

        let v = (log.eval)(&[re(8.0), re(2.0)]).unwrap();
        assert!((v.re - 3.0).abs() < 1e-12);

        assert!((log.eval)(&[re(8.0), re(1.0)]).is_none());
    }

    #[test]
    fn abs_is_complex_magnitude() {
        let abs = Registry::get("abs").unwrap();
        let v = (abs.eval)(&[Complex64::new(3.0, -4.0)]).unwrap();
        assert!((v.re - 5.0).abs() < 1e-12);
        assert_eq!(v.im, 0.0);
    }

    #[test]
    fn angle_roles() {
        assert_eq!(Registry::get("sin").unwrap().angle, AngleRole::Direct);
        assert_eq!(Registry::get("atan").unwrap().angle, AngleRole::Inverse);
        assert_eq!(Registry::get("sinh").unwrap().angle, AngleRole::Neutral);
        assert_eq!(Registry::get("sqrt").unwrap().angle, AngleRole::Neutral);
    }
}
