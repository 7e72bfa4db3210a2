//! Unit-tagged scalar values for force field geometry.
//!
//! All geometric formulas in this crate are written against [`Length`],
//! [`Angle`], and [`Area`] rather than raw floats, so mixing a distance
//! with an angle is a compile error. Parameter records, which may carry
//! values this crate does not interpret (force constants, charges), store
//! the dynamic [`Quantity`] enum instead and are converted at the boundary.
//!
//! Internal conventions: lengths are nanometers, angles are radians.
//! Conversions from Ångströms and degrees are provided for io code.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

const NANOMETERS_PER_ANGSTROM: f64 = 0.1;

/// A physical length, stored in nanometers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    pub fn nanometers(value: f64) -> Self {
        Self(value)
    }

    pub fn angstroms(value: f64) -> Self {
        Self(value * NANOMETERS_PER_ANGSTROM)
    }

    #[inline]
    pub fn as_nanometers(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_angstroms(self) -> f64 {
        self.0 / NANOMETERS_PER_ANGSTROM
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length {
        Length(-self.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

/// Length ÷ length is a dimensionless ratio.
impl Div for Length {
    type Output = f64;
    fn div(self, rhs: Length) -> f64 {
        self.0 / rhs.0
    }
}

/// Length × length is an area; used by the law-of-cosines formulas.
impl Mul for Length {
    type Output = Area;
    fn mul(self, rhs: Length) -> Area {
        Area(self.0 * rhs.0)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nm", self.0)
    }
}

/// A product of two lengths, in nm².
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Area(f64);

impl Area {
    /// Positive square root, recovering a length.
    pub fn sqrt(self) -> Length {
        Length(self.0.sqrt())
    }

    #[inline]
    pub fn as_square_nanometers(self) -> f64 {
        self.0
    }
}

impl Add for Area {
    type Output = Area;
    fn add(self, rhs: Area) -> Area {
        Area(self.0 + rhs.0)
    }
}

impl Sub for Area {
    type Output = Area;
    fn sub(self, rhs: Area) -> Area {
        Area(self.0 - rhs.0)
    }
}

impl Mul<f64> for Area {
    type Output = Area;
    fn mul(self, rhs: f64) -> Area {
        Area(self.0 * rhs)
    }
}

/// Area ÷ area is a dimensionless ratio.
impl Div for Area {
    type Output = f64;
    fn div(self, rhs: Area) -> f64 {
        self.0 / rhs.0
    }
}

/// A plane angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn radians(value: f64) -> Self {
        Self(value)
    }

    pub fn degrees(value: f64) -> Self {
        Self(value.to_radians())
    }

    /// Inverse cosine of a dimensionless ratio.
    pub fn acos(ratio: f64) -> Self {
        Self(ratio.acos())
    }

    #[inline]
    pub fn as_radians(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_degrees(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// The supplement π − self, which the lone-pair weight formulas use.
    pub fn supplement(self) -> Angle {
        Angle(std::f64::consts::PI - self.0)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, rhs: f64) -> Angle {
        Angle(self.0 * rhs)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rad", self.0)
    }
}

/// A parameter value as stored in a [`Potential`](super::store::Potential).
///
/// Geometry code never operates on this type directly; it converts to the
/// static newtypes via [`as_length`](Quantity::as_length) and
/// [`as_angle`](Quantity::as_angle) at the point of lookup. Values
/// this crate does not interpret (force constants, charges) pass through
/// untouched as [`Quantity::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Length(Length),
    Angle(Angle),
    Other { value: f64, unit: String },
}

impl Quantity {
    /// The dimension name, for error messages.
    pub fn dimension(&self) -> &str {
        match self {
            Quantity::Length(_) => "length",
            Quantity::Angle(_) => "angle",
            Quantity::Other { unit, .. } => unit,
        }
    }

    /// Extracts a length, or `None` if the value has another dimension.
    pub fn as_length(&self) -> Option<Length> {
        match self {
            Quantity::Length(l) => Some(*l),
            _ => None,
        }
    }

    /// Extracts an angle, or `None` if the value has another dimension.
    pub fn as_angle(&self) -> Option<Angle> {
        match self {
            Quantity::Angle(a) => Some(*a),
            _ => None,
        }
    }
}

impl From<Length> for Quantity {
    fn from(l: Length) -> Self {
        Quantity::Length(l)
    }
}

impl From<Angle> for Quantity {
    fn from(a: Angle) -> Self {
        Quantity::Angle(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn length_unit_conversions() {
        let l = Length::angstroms(1.5);
        assert_relative_eq!(l.as_nanometers(), 0.15);
        assert_relative_eq!(l.as_angstroms(), 1.5);
    }

    #[test]
    fn length_arithmetic() {
        let a = Length::nanometers(0.3);
        let b = Length::nanometers(0.1);
        assert_relative_eq!((a + b).as_nanometers(), 0.4);
        assert_relative_eq!((a - b).as_nanometers(), 0.2);
        assert_relative_eq!(a / b, 3.0);
        assert_relative_eq!((a * 0.5).as_nanometers(), 0.15);
    }

    #[test]
    fn area_round_trip() {
        let l = Length::nanometers(0.25);
        assert_relative_eq!((l * l).sqrt().as_nanometers(), 0.25);
    }

    #[test]
    fn law_of_cosines_right_triangle() {
        // 3-4-5 triangle: gamma = 90 degrees between the 3 and 4 legs.
        let a = Length::nanometers(0.3);
        let b = Length::nanometers(0.4);
        let gamma = Angle::degrees(90.0);
        let c = (a * a + b * b - a * b * (2.0 * gamma.cos())).sqrt();
        assert_relative_eq!(c.as_nanometers(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn angle_conversions_and_supplement() {
        let theta = Angle::degrees(120.0);
        assert_relative_eq!(theta.as_radians(), 2.0 * std::f64::consts::PI / 3.0);
        assert_relative_eq!(theta.supplement().as_degrees(), 60.0, max_relative = 1e-12);
    }

    #[test]
    fn quantity_dimension_extraction() {
        let q = Quantity::from(Length::nanometers(0.1));
        assert!(q.as_length().is_some());
        assert!(q.as_angle().is_none());
        assert_eq!(q.dimension(), "length");

        let k = Quantity::Other {
            value: 1000.0,
            unit: "kilojoule_per_mole / nanometer ** 2".into(),
        };
        assert!(k.as_length().is_none());
    }
}
