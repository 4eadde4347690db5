//! SI dimension vectors.

use std::ops::{Div, Mul};

/// The exponents of the seven SI base dimensions.
///
/// Two units are interconvertible exactly when their dimensions are equal;
/// the remaining difference is a pure scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    /// Metre exponent
    pub length: i32,
    /// Kilogram exponent
    pub mass: i32,
    /// Second exponent
    pub time: i32,
    /// Ampere exponent
    pub current: i32,
    /// Kelvin exponent
    pub temperature: i32,
    /// Mole exponent
    pub amount: i32,
    /// Candela exponent
    pub luminosity: i32,
}

impl Dimension {
    /// The dimensionless dimension (all exponents zero).
    pub const NONE: Self = Self {
        length: 0,
        mass: 0,
        time: 0,
        current: 0,
        temperature: 0,
        amount: 0,
        luminosity: 0,
    };

    /// Raises the dimension to an integer power.
    #[must_use]
    pub fn pow(self, exponent: i32) -> Self {
        Self {
            length: self.length * exponent,
            mass: self.mass * exponent,
            time: self.time * exponent,
            current: self.current * exponent,
            temperature: self.temperature * exponent,
            amount: self.amount * exponent,
            luminosity: self.luminosity * exponent,
        }
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            length: self.length + rhs.length,
            mass: self.mass + rhs.mass,
            time: self.time + rhs.time,
            current: self.current + rhs.current,
            temperature: self.temperature + rhs.temperature,
            amount: self.amount + rhs.amount,
            luminosity: self.luminosity + rhs.luminosity,
        }
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self {
            length: self.length - rhs.length,
            mass: self.mass - rhs.mass,
            time: self.time - rhs.time,
            current: self.current - rhs.current,
            temperature: self.temperature - rhs.temperature,
            amount: self.amount - rhs.amount,
            luminosity: self.luminosity - rhs.luminosity,
        }
    }
}
