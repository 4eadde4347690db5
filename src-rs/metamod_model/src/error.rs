//! Error types for aggregation and generation.

use std::fmt;

use metamod_tag::{CanonicalKey, TagError};
use metamod_unit::{IncompatibleUnits, UnitError};

/// An error produced while recomputing a corpus parameter's aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// A sample's unit cannot be converted to the common unit
    IncompatibleUnits(IncompatibleUnits),
    /// A sample carries a unit string that does not parse
    InvalidUnit {
        /// The offending unit string
        unit: String,
        /// The underlying parse error
        error: UnitError,
    },
    /// A non-default transformation code with no implementation
    NotImplemented {
        /// The transformation code that was requested
        code: String,
    },
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleUnits(err) => write!(f, "cannot aggregate: {err}"),
            Self::InvalidUnit { unit, error } => {
                write!(f, "invalid unit `{unit}` on a reference sample: {error}")
            }
            Self::NotImplemented { code } => {
                write!(f, "transformation `{code}` is not implemented")
            }
        }
    }
}

impl std::error::Error for AggregationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IncompatibleUnits(err) => Some(err),
            Self::InvalidUnit { error, .. } => Some(error),
            Self::NotImplemented { .. } => None,
        }
    }
}

/// An error produced while generating output text from a file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// A tracked parameter has no value yet
    IncompleteParameter {
        /// The canonical key of the incomplete parameter
        key: CanonicalKey,
    },
    /// The marker for a tracked key no longer appears in the source text
    MarkerNotFound(TagError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteParameter { key } => {
                write!(f, "parameter `{key}` has no value")
            }
            Self::MarkerNotFound(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IncompleteParameter { .. } => None,
            Self::MarkerNotFound(err) => Some(err),
        }
    }
}
