//! Floating-point evaluation of reduced expressions.
//!
//! Evaluation runs over `Complex64` throughout so intermediate values may
//! leave the real line (`sqrt(-1)` during a real solve); whether the final
//! value is acceptable is decided once at the end, against the ambient
//! complex format.

use num_complex::Complex64;

use crate::conventions::{ComplexFormat, Conventions};
use crate::core::known::get_symbol;
use crate::core::{Expr, ExprKind, KS};
use crate::functions::{AngleRole, Registry};

/// An imaginary part below this (relative) threshold is rounding noise
/// from complex intermediates, and the value counts as real.
const IMAGINARY_TOLERANCE: f64 = 1e-12;

/// The outcome of numerically evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Approximation {
    Real(f64),
    Complex(Complex64),
    Undefined,
    Nonreal,
}

impl Approximation {
    /// The real value, when there is one.
    pub(crate) fn as_real(self) -> Option<f64> {
        match self {
            Self::Real(x) => Some(x),
            _ => None,
        }
    }

    /// Render the approximation as an expression for display. Complex
    /// values keep both Cartesian components, even when one is zero, so
    /// the layout is visibly approximate next to an exact `-i`.
    pub(crate) fn to_expr(self) -> Expr {
        match self {
            Self::Real(x) => Expr::float(x),
            Self::Complex(z) => {
                let i = Expr::from_interned(get_symbol(KS.i));
                Expr::add_expr(Expr::float(z.re), Expr::mul_expr(Expr::float(z.im), i))
            }
            Self::Undefined => Expr::undefined(),
            Self::Nonreal => Expr::nonreal(),
        }
    }
}

/// Evaluation stops early on these.
enum Halt {
    Undefined,
    Nonreal,
}

pub(crate) fn approximate(expr: &Expr, conventions: Conventions) -> Approximation {
    approximate_with(expr, conventions, None)
}

/// Evaluate with an optional symbol binding, used to sample a function of
/// one unknown along the real line.
pub(crate) fn approximate_with(
    expr: &Expr,
    conventions: Conventions,
    binding: Option<(u64, Complex64)>,
) -> Approximation {
    match eval(expr, conventions, binding) {
        Ok(z) => classify(z, conventions.complex_format),
        Err(Halt::Undefined) => Approximation::Undefined,
        Err(Halt::Nonreal) => Approximation::Nonreal,
    }
}

/// Evaluate and keep only real results; complex, nonreal and undefined
/// all come back as `None`.
pub(crate) fn approximate_real(
    expr: &Expr,
    conventions: Conventions,
    binding: Option<(u64, f64)>,
) -> Option<f64> {
    let binding = binding.map(|(id, x)| (id, Complex64::new(x, 0.0)));
    approximate_with(expr, conventions, binding).as_real()
}

fn classify(z: Complex64, format: ComplexFormat) -> Approximation {
    if !z.re.is_finite() || !z.im.is_finite() {
        return Approximation::Undefined;
    }
    if z.im.abs() <= IMAGINARY_TOLERANCE * z.re.abs().max(1.0) {
        return Approximation::Real(z.re);
    }
    match format {
        ComplexFormat::Real => Approximation::Nonreal,
        ComplexFormat::Cartesian => Approximation::Complex(z),
    }
}

fn eval(
    expr: &Expr,
    conventions: Conventions,
    binding: Option<(u64, Complex64)>,
) -> Result<Complex64, Halt> {
    match &expr.kind {
        ExprKind::Rational(r) => Ok(Complex64::new(r.to_f64(), 0.0)),
        ExprKind::Float(x) => Ok(Complex64::new(*x, 0.0)),
        ExprKind::Symbol(symbol) => {
            let id = symbol.id();
            if let Some((bound, value)) = binding
                && bound == id
            {
                return Ok(value);
            }
            if id == KS.pi {
                Ok(Complex64::new(std::f64::consts::PI, 0.0))
            } else if id == KS.e {
                Ok(Complex64::new(std::f64::consts::E, 0.0))
            } else if id == KS.i {
                Ok(Complex64::i())
            } else {
                Err(Halt::Undefined)
            }
        }
        ExprKind::Sum(terms) => {
            let mut acc = Complex64::new(0.0, 0.0);
            for term in terms {
                acc += eval(term, conventions, binding)?;
            }
            Ok(acc)
        }
        ExprKind::Product(factors) => {
            let mut acc = Complex64::new(1.0, 0.0);
            for factor in factors {
                acc *= eval(factor, conventions, binding)?;
            }
            Ok(acc)
        }
        ExprKind::Pow(base, exponent) => {
            let b = eval(base, conventions, binding)?;
            if let Some(r) = exponent.as_rational() {
                if let Some(n) = r.as_integer()
                    && let Ok(n) = i32::try_from(n)
                {
                    return Ok(b.powi(n));
                }
                return Ok(b.powf(r.to_f64()));
            }
            let e = eval(exponent, conventions, binding)?;
            Ok(b.powc(e))
        }
        ExprKind::FunctionCall { name, args } => {
            let Some(def) = Registry::get(name.name()) else {
                return Err(Halt::Undefined);
            };
            if !def.validate_arity(args.len()) {
                return Err(Halt::Undefined);
            }
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, conventions, binding)?);
            }
            let factor = conventions.angle_unit.to_radians_factor();
            if def.angle == AngleRole::Direct
                && let Some(first) = values.first_mut()
            {
                *first *= factor;
            }
            let mut result = (def.eval)(&values).ok_or(Halt::Undefined)?;
            if def.angle == AngleRole::Inverse {
                result /= factor;
            }
            Ok(result)
        }
        ExprKind::Matrix { .. } => Err(Halt::Undefined),
        ExprKind::Undefined => Err(Halt::Undefined),
        ExprKind::Nonreal => Err(Halt::Nonreal),
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
    use crate::conventions::AngleUnit;
    use crate::core::symb;
    use crate::parser::parse;

    fn real_of(input: &str) -> f64 {
        let expr = parse(input, &Definitions::new()).unwrap();
        approximate(&expr, Conventions::default())
            .as_real()
            .unwrap()
    }

    #[test]
    fn arithmetic_evaluates() {
        assert!((real_of("1/2+1/4") - 0.75).abs() < 1e-15);
        assert!((real_of("2^10") - 1024.0).abs() < 1e-12);
        assert!((real_of("sqrt(2)") - std::f64::consts::SQRT_2).abs() < 1e-15);
    }

    #[test]
    fn constants_evaluate() {
        assert!((real_of("pi") - std::f64::consts::PI).abs() < 1e-15);
        assert!((real_of("exp(1)") - std::f64::consts::E).abs() < 1e-15);
    }

    #[test]
    fn free_symbols_are_undefined() {
        let expr = parse("x+1", &Definitions::new()).unwrap();
        assert_eq!(
            approximate(&expr, Conventions::default()),
            Approximation::Undefined
        );
    }

    #[test]
    fn bindings_substitute_the_variable() {
        let expr = parse("x^2-2", &Definitions::new()).unwrap();
        let x = symb("x").id();
        let value = approximate_real(&expr, Conventions::default(), Some((x, 2.0))).unwrap();
        assert!((value - 2.0).abs() < 1e-15);
    }

    #[test]
    fn negative_root_is_nonreal_in_real_format() {
        let expr = parse("sqrt(x)", &Definitions::new()).unwrap();
        let x = symb("x").id();
        let binding = Some((x, Complex64::new(-4.0, 0.0)));
        assert_eq!(
            approximate_with(&expr, Conventions::default(), binding),
            Approximation::Nonreal
        );
    }

    #[test]
    fn negative_root_is_complex_in_cartesian_format() {
        let conventions = Conventions::default().with_complex_format(ComplexFormat::Cartesian);
        let expr = parse("sqrt(x)", &Definitions::new()).unwrap();
        let x = symb("x").id();
        let binding = Some((x, Complex64::new(-4.0, 0.0)));
        match approximate_with(&expr, conventions, binding) {
            Approximation::Complex(z) => {
                assert!(z.re.abs() < 1e-12);
                assert!((z.im - 2.0).abs() < 1e-12);
            }
            other => panic!("expected a complex value, got {other:?}"),
        }
    }

    #[test]
    fn angle_units_scale_trigonometry() {
        let degrees = Conventions::default().with_angle_unit(AngleUnit::Degree);
        let expr = parse("sin(90)", &Definitions::new()).unwrap();
        let value = approximate(&expr, degrees).as_real().unwrap();
        assert!((value - 1.0).abs() < 1e-12);

        let inverse = parse("asin(1)", &Definitions::new()).unwrap();
        let value = approximate(&inverse, degrees).as_real().unwrap();
        assert!((value - 90.0).abs() < 1e-12);
    }

    #[test]
    fn division_by_zero_is_undefined() {
        let x = symb("x").id();
        let expr = parse("1/x", &Definitions::new()).unwrap();
        assert_eq!(
            approximate_with(&expr, Conventions::default(), Some((x, Complex64::new(0.0, 0.0)))),
            Approximation::Undefined
        );
    }

    #[test]
    fn complex_layouts_render_cartesian() {
        let z = Approximation::Complex(Complex64::new(0.0, -1.0));
        assert_eq!(z.to_expr().to_string(), "0-i");
        let z = Approximation::Complex(Complex64::new(0.5, 2.0));
        assert_eq!(z.to_expr().to_string(), "0.5+2*i");
    }
}
