//! Error types for unit parsing and rescaling.

use std::fmt;

/// An error produced while parsing a unit expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitError {
    /// The specific reason the parse failed
    pub reason: UnitErrorReason,
    /// The byte offset in the unit string where the error occurred
    pub offset: usize,
}

/// The different reasons a unit expression can fail to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitErrorReason {
    /// Expected a unit term (symbol, `1`, or parenthesized group)
    ExpectTerm,
    /// Expected an integer exponent after `^`
    MissingExponent,
    /// Expected `)` to close a parenthesized group
    UnclosedParen,
    /// The expression parsed but input remained
    TrailingInput,
    /// A symbol resolved to no known unit or prefixed unit
    UnknownUnit(String),
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UnitErrorReason::ExpectTerm => {
                write!(f, "expected a unit at offset {}", self.offset)
            }
            UnitErrorReason::MissingExponent => {
                write!(f, "expected an exponent after `^` at offset {}", self.offset)
            }
            UnitErrorReason::UnclosedParen => {
                write!(f, "unclosed parenthesis at offset {}", self.offset)
            }
            UnitErrorReason::TrailingInput => {
                write!(f, "unexpected trailing input at offset {}", self.offset)
            }
            UnitErrorReason::UnknownUnit(symbol) => {
                write!(f, "unknown unit symbol `{symbol}`")
            }
        }
    }
}

impl std::error::Error for UnitError {}

/// A rescale between two units of different dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibleUnits {
    /// The unit the quantity was expressed in
    pub from: String,
    /// The unit the rescale targeted
    pub to: String,
}

impl fmt::Display for IncompatibleUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert `{}` to `{}`", self.from, self.to)
    }
}

impl std::error::Error for IncompatibleUnits {}
