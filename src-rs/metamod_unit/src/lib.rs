//! Unit expressions and dimensional rescaling.
//!
//! Corpus reference records and user-entered parameter values carry unit
//! strings (`ms`, `uV`, `m/s^2`). Aggregating values from several records
//! requires converting them to a common unit, which is only meaningful when
//! their dimensions agree. This crate parses unit strings into an SI
//! dimension vector plus scale factor and rescales quantities between
//! compatible units.

use std::fmt;

mod dimension;
mod error;
mod parse;
mod symbols;

pub use dimension::Dimension;
pub use error::{IncompatibleUnits, UnitError, UnitErrorReason};

/// A parsed unit: the original text, its dimension, and its scale relative
/// to the coherent SI unit of that dimension.
#[derive(Debug, Clone)]
pub struct Unit {
    text: String,
    dimension: Dimension,
    scale: f64,
}

impl Unit {
    /// Parses a unit string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a well-formed unit expression
    /// or contains an unknown unit symbol.
    pub fn parse(text: &str) -> Result<Self, UnitError> {
        let (dimension, scale) = parse::parse(text)?;

        Ok(Self {
            text: text.to_string(),
            dimension,
            scale,
        })
    }

    /// Returns the unit string exactly as it was written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the SI dimension vector.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Returns the scale factor relative to the coherent SI unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns true if quantities can be rescaled between the two units.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dimension == other.dimension
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.scale == other.scale
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A numeric value paired with its unit.
///
/// A value is never meaningful without its unit, so the two always travel
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Creates a quantity from a value and its unit.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the unit.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Re-expresses the quantity in another unit of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the target unit's dimension differs from this
    /// quantity's.
    pub fn rescale(&self, target: &Unit) -> Result<Self, IncompatibleUnits> {
        if !self.unit.is_compatible(target) {
            return Err(IncompatibleUnits {
                from: self.unit.text.clone(),
                to: target.text.clone(),
            });
        }

        let value = self.value * self.unit.scale / target.scale;

        Ok(Self {
            value,
            unit: target.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod success {
        use super::*;

        #[test]
        fn rescale_microseconds_to_milliseconds() {
            let us = Unit::parse("us").expect("us should parse");
            let ms = Unit::parse("ms").expect("ms should parse");

            let rescaled = Quantity::new(5000.0, us)
                .rescale(&ms)
                .expect("time units should be compatible");

            assert!((rescaled.value() - 5.0).abs() < 1e-12);
            assert_eq!(rescaled.unit().text(), "ms");
        }

        #[test]
        fn rescale_is_identity_for_equal_units() {
            let ms = Unit::parse("ms").expect("ms should parse");
            let quantity = Quantity::new(7.25, ms.clone());
            let rescaled = quantity.rescale(&ms).expect("should rescale to itself");
            assert!((rescaled.value() - 7.25).abs() < f64::EPSILON);
        }

        #[test]
        fn units_compare_by_dimension_and_scale() {
            let a = Unit::parse("mV").expect("mV should parse");
            let b = Unit::parse("mV").expect("mV should parse");
            assert_eq!(a, b);

            let c = Unit::parse("V").expect("V should parse");
            assert_ne!(a, c);
            assert!(a.is_compatible(&c));
        }

        #[test]
        fn molar_concentration_round_trip() {
            let molar = Unit::parse("mM").expect("mM should parse");
            let si = Unit::parse("mol/m^3").expect("mol/m^3 should parse");

            let rescaled = Quantity::new(2.0, molar)
                .rescale(&si)
                .expect("concentrations should be compatible");

            assert!((rescaled.value() - 2.0).abs() < 1e-12);
        }
    }

    mod error {
        use super::*;

        #[test]
        fn incompatible_dimensions_fail() {
            let ms = Unit::parse("ms").expect("ms should parse");
            let mv = Unit::parse("mV").expect("mV should parse");

            let err = Quantity::new(1.0, ms)
                .rescale(&mv)
                .expect_err("time and voltage should not convert");

            assert_eq!(err.from, "ms");
            assert_eq!(err.to, "mV");
        }

        #[test]
        fn parse_error_surfaces_unknown_symbol() {
            let err = Unit::parse("blorps").expect_err("should reject unknown symbol");
            assert!(matches!(err.reason, UnitErrorReason::UnknownUnit(_)));
        }
    }
}
