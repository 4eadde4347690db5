//! Error handling for the placeholder tag grammar.

use std::fmt;

use crate::marker::CanonicalKey;

/// An error produced while parsing or locating a placeholder marker.
///
/// Contains both the reason for the failure and the byte offset (into the
/// scanned text) where it occurred, when an offset is meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    /// The specific reason the operation failed
    pub reason: TagErrorReason,
    /// The byte offset in the scanned text where the error occurred
    pub offset: usize,
}

/// The different reasons a tag operation can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagErrorReason {
    /// The text at the reported offset is not a well-formed marker
    Malformed(MalformedKind),
    /// A marker repeats an argument key
    DuplicateArgument {
        /// The repeated argument key
        key: String,
    },
    /// No marker with the requested canonical key exists in the text
    NotFound {
        /// The canonical key that was searched for
        key: CanonicalKey,
    },
}

/// The different ways a marker can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// Expected the `#|` opener
    ExpectOpener,
    /// Expected a marker name after the opener
    ExpectName,
    /// Expected an argument key after `(` or `,`
    ExpectArgument,
    /// Expected `=` between an argument key and its value
    ExpectEquals,
    /// Expected an argument value after `=`
    ExpectValue,
    /// Expected `)` to close the argument list
    UnclosedParen,
    /// Expected the `|#` closer
    ExpectCloser,
}

impl TagError {
    /// Creates a new error for a malformed marker at the given offset.
    pub(crate) fn malformed(kind: MalformedKind, offset: usize) -> Self {
        Self {
            reason: TagErrorReason::Malformed(kind),
            offset,
        }
    }

    /// Creates a new error for a repeated argument key.
    pub(crate) fn duplicate_argument(key: String, offset: usize) -> Self {
        Self {
            reason: TagErrorReason::DuplicateArgument { key },
            offset,
        }
    }

    /// Creates a new error for a canonical key that no longer appears in the
    /// text.
    pub(crate) fn not_found(key: CanonicalKey) -> Self {
        Self {
            reason: TagErrorReason::NotFound { key },
            offset: 0,
        }
    }
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            TagErrorReason::Malformed(kind) => {
                write!(f, "malformed marker at offset {}: {kind}", self.offset)
            }
            TagErrorReason::DuplicateArgument { key } => {
                write!(
                    f,
                    "marker at offset {} repeats the argument key `{key}`",
                    self.offset
                )
            }
            TagErrorReason::NotFound { key } => {
                write!(f, "no marker with key `{key}` appears in the text")
            }
        }
    }
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::ExpectOpener => "expected `#|`",
            Self::ExpectName => "expected a marker name",
            Self::ExpectArgument => "expected an argument key",
            Self::ExpectEquals => "expected `=` after the argument key",
            Self::ExpectValue => "expected an argument value",
            Self::UnclosedParen => "expected `)` to close the argument list",
            Self::ExpectCloser => "expected `|#`",
        };
        f.write_str(description)
    }
}

impl std::error::Error for TagError {}
