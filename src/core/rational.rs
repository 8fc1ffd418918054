//! Exact rational arithmetic for equation coefficients and solutions.
//!
//! All arithmetic is checked: an operation that would overflow `i128` returns
//! `None` and the caller keeps the computation symbolic instead of folding it.
//! Values are always stored normalized (positive denominator, reduced by gcd),
//! so structural equality on expressions doubles as numeric equality here.

use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;

/// Greatest common divisor on magnitudes.
pub(crate) fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    // Magnitudes of i128 values always fit back after gcd, except the
    // pathological gcd(i128::MIN, 0) case which the constructors never produce.
    i128::try_from(a).unwrap_or(i128::MAX)
}

/// An exact rational number `num / den` with `den > 0` and `gcd(num, den) == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    pub const ZERO: Self = Self { num: 0, den: 1 };
    pub const ONE: Self = Self { num: 1, den: 1 };
    pub const MINUS_ONE: Self = Self { num: -1, den: 1 };

    /// Build a normalized rational. Returns `None` for a zero denominator.
    #[must_use]
    pub fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den);
        let sign = if den < 0 { -1 } else { 1 };
        Some(Self {
            num: sign * (num / g),
            den: (den / g) * sign,
        })
    }

    #[inline]
    #[must_use]
    pub const fn integer(n: i128) -> Self {
        Self { num: n, den: 1 }
    }

    #[inline]
    #[must_use]
    pub const fn numerator(&self) -> i128 {
        self.num
    }

    #[inline]
    #[must_use]
    pub const fn denominator(&self) -> i128 {
        self.den
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }

    #[inline]
    #[must_use]
    pub const fn is_minus_one(&self) -> bool {
        self.num == -1 && self.den == 1
    }

    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.num < 0
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// The value as an integer, if it is one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        if self.den == 1 { Some(self.num) } else { None }
    }

    /// Checked addition: `a/b + c/d`.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        // Reduce by the denominator gcd first to delay overflow.
        let g = gcd(self.den, other.den);
        let lhs = self.num.checked_mul(other.den / g)?;
        let rhs = other.num.checked_mul(self.den / g)?;
        let num = lhs.checked_add(rhs)?;
        let den = self.den.checked_mul(other.den / g)?;
        Self::new(num, den)
    }

    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.checked_add(&other.neg())
    }

    /// Checked multiplication with cross-reduction.
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        let g1 = gcd(self.num, other.den);
        let g2 = gcd(other.num, self.den);
        let num = (self.num / g1).checked_mul(other.num / g2)?;
        let den = (self.den / g2).checked_mul(other.den / g1)?;
        Self::new(num, den)
    }

    /// Checked division. `None` when dividing by zero or on overflow.
    #[must_use]
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        self.checked_mul(&Self {
            num: other.den * other.num.signum(),
            den: other.num.abs(),
        })
    }

    /// Checked integer power. Negative exponents invert; `0^negative` is `None`.
    #[must_use]
    pub fn checked_pow(&self, exp: i32) -> Option<Self> {
        if exp == 0 {
            return Some(Self::ONE);
        }
        if self.is_zero() {
            return if exp > 0 { Some(Self::ZERO) } else { None };
        }
        let mag = exp.unsigned_abs();
        let num = self.num.checked_pow(mag)?;
        let den = self.den.checked_pow(mag)?;
        if exp > 0 {
            Self::new(num, den)
        } else {
            Self::new(den, num)
        }
    }

    #[must_use]
    pub const fn neg(&self) -> Self {
        Self {
            num: -self.num,
            den: self.den,
        }
    }

    #[must_use]
    pub const fn abs(&self) -> Self {
        Self {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Approximate as `f64` (lossy for large numerators/denominators).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.num.to_f64().unwrap_or(f64::NAN) / self.den.to_f64().unwrap_or(f64::NAN)
    }

    /// Exact square root, if this is a perfect square of a rational.
    #[must_use]
    pub fn exact_sqrt(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        let num = integer_sqrt(self.num)?;
        let den = integer_sqrt(self.den)?;
        Self::new(num, den)
    }

    /// Exact cube root, if this is a perfect cube of a rational.
    #[must_use]
    pub fn exact_cbrt(&self) -> Option<Self> {
        let num = integer_cbrt(self.num)?;
        let den = integer_cbrt(self.den)?;
        Self::new(num, den)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross multiplication preserves order.
        match (
            self.num.checked_mul(other.den),
            other.num.checked_mul(self.den),
        ) {
            (Some(l), Some(r)) => l.cmp(&r),
            // Overflow fallback: compare approximations.
            _ => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::integer(i128::from(n))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Integer square root for non-negative perfect squares only.
fn integer_sqrt(n: i128) -> Option<i128> {
    if n < 0 {
        return None;
    }
    if n < 2 {
        return Some(n);
    }
    let approx = n.to_f64()?.sqrt();
    if !approx.is_finite() {
        return None;
    }
    let guess = approx as i128;
    // Float rounding can land one off in either direction.
    for candidate in guess.saturating_sub(2)..=guess.saturating_add(2) {
        if candidate >= 0 && candidate.checked_mul(candidate) == Some(n) {
            return Some(candidate);
        }
    }
    None
}

/// Integer cube root for perfect cubes (any sign).
fn integer_cbrt(n: i128) -> Option<i128> {
    if n < 0 {
        return integer_cbrt(-n).map(|r| -r);
    }
    if n < 2 {
        return Some(n);
    }
    let approx = n.to_f64()?.cbrt();
    if !approx.is_finite() {
        return None;
    }
    let guess = approx as i128;
    for candidate in guess.saturating_sub(2)..=guess.saturating_add(2) {
        if candidate >= 0
            && candidate
                .checked_mul(candidate)
                .and_then(|sq| sq.checked_mul(candidate))
                == Some(n)
        {
            return Some(candidate);
        }
    }
    None
}

/// Largest `s` with `s*s` dividing `n`, together with the remainder `r` such
/// that `n == s*s*r`. Used to pull square factors out of radicals. Gives up
/// (returns `(1, n)`) past the trial-division bound.
pub(crate) fn extract_square_factor(n: i128) -> (i128, i128) {
    debug_assert!(n >= 0);
    if n < 2 {
        return (1, n);
    }
    const TRIAL_BOUND: i128 = 100_000;
    let mut s: i128 = 1;
    let mut r = n;
    let mut p: i128 = 2;
    while p * p <= r && p <= TRIAL_BOUND {
        while r % (p * p) == 0 {
            r /= p * p;
            s *= p;
        }
        p += 1;
    }
    // Whatever remains may itself be a perfect square larger than the bound.
    if let Some(root) = integer_sqrt(r) {
        s *= root;
        r = 1;
    }
    (s, r)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let r = Rational::new(4, -6).unwrap();
        assert_eq!(r.numerator(), -2);
        assert_eq!(r.denominator(), 3);
        assert_eq!(Rational::new(0, 5).unwrap(), Rational::ZERO);
        assert!(Rational::new(1, 0).is_none());
    }

    #[test]
    fn test_arithmetic() {
        let half = Rational::new(1, 2).unwrap();
        let third = Rational::new(1, 3).unwrap();
        assert_eq!(half.checked_add(&third).unwrap(), Rational::new(5, 6).unwrap());
        assert_eq!(half.checked_mul(&third).unwrap(), Rational::new(1, 6).unwrap());
        assert_eq!(half.checked_sub(&half).unwrap(), Rational::ZERO);
        assert_eq!(
            half.checked_div(&third).unwrap(),
            Rational::new(3, 2).unwrap()
        );
        assert!(half.checked_div(&Rational::ZERO).is_none());
    }

    #[test]
    fn test_pow() {
        let two = Rational::integer(2);
        assert_eq!(two.checked_pow(10).unwrap(), Rational::integer(1024));
        assert_eq!(
            two.checked_pow(-2).unwrap(),
            Rational::new(1, 4).unwrap()
        );
        assert!(Rational::ZERO.checked_pow(-1).is_none());
        assert_eq!(Rational::ZERO.checked_pow(3).unwrap(), Rational::ZERO);
    }

    #[test]
    fn test_overflow_is_checked() {
        let big = Rational::integer(i128::MAX / 2);
        assert!(big.checked_mul(&big).is_none());
        assert!(big.checked_add(&big).is_some());
    }

    #[test]
    fn test_ordering() {
        let a = Rational::new(1, 3).unwrap();
        let b = Rational::new(1, 2).unwrap();
        assert!(a < b);
        assert!(Rational::integer(-1) < Rational::ZERO);
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(
            Rational::new(9, 4).unwrap().exact_sqrt().unwrap(),
            Rational::new(3, 2).unwrap()
        );
        assert!(Rational::integer(2).exact_sqrt().is_none());
        assert_eq!(
            Rational::integer(-27).exact_cbrt().unwrap(),
            Rational::integer(-3)
        );
    }

    #[test]
    fn test_square_factor_extraction() {
        assert_eq!(extract_square_factor(8), (2, 2));
        assert_eq!(extract_square_factor(72), (6, 2));
        assert_eq!(extract_square_factor(7), (1, 7));
        assert_eq!(extract_square_factor(1), (1, 1));
    }
}
