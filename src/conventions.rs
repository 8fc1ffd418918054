//! User-visible conventions that parameterize reduction and approximation.
//!
//! The same equation text can reduce differently depending on how angles
//! are measured and whether complex values are renderable. These knobs are
//! part of every cached reduced form's key: changing one invalidates the
//! cache naturally because lookups use the new key.

use std::f64::consts::PI;

/// How angle arguments of trigonometric functions are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AngleUnit {
    /// Radians, the identity scaling.
    #[default]
    Radian,
    /// Degrees, 360 per turn.
    Degree,
    /// Gradians, 400 per turn.
    Gradian,
}

impl AngleUnit {
    /// Factor converting a value in this unit to radians.
    #[must_use]
    pub fn to_radians_factor(self) -> f64 {
        match self {
            Self::Radian => 1.0,
            Self::Degree => PI / 180.0,
            Self::Gradian => PI / 200.0,
        }
    }
}

/// Whether results may leave the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComplexFormat {
    /// Real output only: a value with an imaginary part is nonreal.
    #[default]
    Real,
    /// Cartesian `a+b*i` output.
    Cartesian,
}

/// How aggressively reduction rewrites, and for whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionTarget {
    /// Full expansion for structural analysis: distribute products over
    /// sums so degree extraction and linear coefficient reads see a flat
    /// polynomial form.
    SystemForAnalysis,
    /// Light reduction ahead of numeric evaluation: no distribution, since
    /// expanded forms evaluate with worse conditioning.
    SystemForApproximation,
    /// Reduction of user-facing output layouts.
    User,
}

/// The bundle of conventions a solve session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Conventions {
    /// Angle measure for trigonometric evaluation.
    pub angle_unit: AngleUnit,
    /// Complex rendering policy.
    pub complex_format: ComplexFormat,
}

impl Conventions {
    /// Conventions with everything at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the angle unit.
    #[must_use]
    pub fn with_angle_unit(mut self, unit: AngleUnit) -> Self {
        self.angle_unit = unit;
        self
    }

    /// Replace the complex format.
    #[must_use]
    pub fn with_complex_format(mut self, format: ComplexFormat) -> Self {
        self.complex_format = format;
        self
    }
}
