//! Placeholder tag grammar for meta-model template files.
//!
//! Meta-model templates embed substitution markers of the form
//! `#|name(key=value, ...)|#` in otherwise arbitrary text. This crate
//! recognizes and decomposes those markers:
//!
//! - [`find_all`] scans a text for every well-formed marker in document order
//! - [`parse_marker`] parses one complete marker string
//! - [`find_marker_for`] locates the exact marker text for a canonical key,
//!   which is what generation uses when rewriting a template
//!
//! Argument values may be double-quoted to carry spaces, parentheses, and
//! arithmetic operators (biological unit expressions need all of these).
//! Quoting is non-nested and there is no escaping, so the grammar stays
//! regular.

mod error;
mod marker;
mod parser;

pub use error::{MalformedKind, TagError, TagErrorReason};
pub use marker::{CanonicalKey, Marker};

/// Scans `text` for every well-formed marker, in document order.
///
/// Matches are non-overlapping: scanning resumes after the end of each
/// recognized marker. Text that merely looks like a marker opener but does
/// not complete the grammar is skipped, the way a regular-expression scan
/// would skip it.
///
/// # Errors
///
/// Returns an error if a syntactically well-formed marker repeats an
/// argument key. Malformed pseudo-markers are not errors; they are simply
/// not matches.
pub fn find_all(text: &str) -> Result<Vec<Marker>, TagError> {
    let mut markers = Vec::new();
    let mut position = 0;

    while let Some(found) = text[position..].find("#|") {
        let start = position + found;

        match parser::parse_at(text, start) {
            Ok((marker, end)) => {
                markers.push(marker);
                position = end;
            }
            Err(err) if matches!(err.reason, TagErrorReason::DuplicateArgument { .. }) => {
                return Err(err);
            }
            Err(_) => {
                // Not a marker; resume the scan past the opener.
                position = start + 2;
            }
        }
    }

    Ok(markers)
}

/// Parses one complete marker string, such as a raw substring previously
/// returned by [`find_all`].
///
/// # Errors
///
/// Returns an error if `text` is not exactly one well-formed marker, or if
/// the marker repeats an argument key.
pub fn parse_marker(text: &str) -> Result<Marker, TagError> {
    let (marker, end) = parser::parse_at(text, 0)?;

    if end != text.len() {
        return Err(TagError {
            reason: TagErrorReason::Malformed(MalformedKind::ExpectCloser),
            offset: end,
        });
    }

    Ok(marker)
}

/// Locates the marker text for an exact canonical key in `text`.
///
/// Used when rewriting a template: the returned marker's raw substring is
/// what substitution replaces. If the same logical parameter occurs more
/// than once, the first occurrence is returned (every occurrence has
/// identical raw text up to argument spelling, and substitution replaces
/// all of them).
///
/// # Errors
///
/// Returns a `NotFound` error if no marker with this exact name and
/// argument set appears in the text, which happens when the source file
/// changed between scan and generation.
pub fn find_marker_for(key: &CanonicalKey, text: &str) -> Result<Marker, TagError> {
    find_all(text)?
        .into_iter()
        .find(|marker| marker.canonical_key() == *key)
        .ok_or_else(|| TagError::not_found(key.clone()))
}
