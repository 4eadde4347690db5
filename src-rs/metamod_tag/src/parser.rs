//! The nom grammar for placeholder markers.
//!
//! Marker shape: `#|` NAME (`(` ARG `=` VALUE (`,` ARG `=` VALUE)* `)`)? `|#`
//! where NAME is alphanumeric/underscore and ARG/VALUE are either unquoted
//! identifier tokens or double-quoted strings that may additionally contain
//! spaces, parentheses, and the `+ - * ^ /` operators. Quotes are not
//! nestable and there is no escaping, which keeps the grammar regular.

use indexmap::IndexMap;
use nom::{
    IResult, Parser as _,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    combinator::{cut, opt},
    error::ParseError,
    sequence::delimited,
};

use crate::{
    error::{MalformedKind, TagError},
    marker::Marker,
};

type Input<'a> = &'a str;
type PResult<'a, T> = IResult<Input<'a>, T, MarkerFailure<'a>>;

/// Internal parse failure: the remaining input at the point of failure plus
/// the kind of element that was expected there.
///
/// The remaining input is kept (rather than an offset) so that the caller,
/// which knows the full scanned text, can compute the absolute offset.
#[derive(Debug)]
pub(crate) struct MarkerFailure<'a> {
    input: Input<'a>,
    kind: MalformedKind,
}

impl<'a> ParseError<Input<'a>> for MarkerFailure<'a> {
    fn from_error_kind(input: Input<'a>, _kind: nom::error::ErrorKind) -> Self {
        Self {
            input,
            kind: MalformedKind::ExpectOpener,
        }
    }

    fn append(_input: Input<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

/// Wraps a parser so that its failure reports the given expectation.
fn expect<'a, T>(
    mut parser: impl nom::Parser<Input<'a>, Output = T, Error = MarkerFailure<'a>>,
    kind: MalformedKind,
) -> impl FnMut(Input<'a>) -> PResult<'a, T> {
    move |input| {
        parser.parse(input).map_err(|err| {
            err.map(|failure| MarkerFailure {
                input: failure.input,
                kind,
            })
        })
    }
}

/// An unquoted token: one or more alphanumeric/underscore characters.
fn bare_token(input: Input<'_>) -> PResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// A double-quoted token, which may additionally contain whitespace,
/// parentheses, and arithmetic operators. The quotes are stripped. At
/// least one character is required between the quotes.
fn quoted_token(input: Input<'_>) -> PResult<'_, &str> {
    delimited(
        tag("\""),
        take_while1(|c: char| {
            c.is_ascii_alphanumeric()
                || c == '_'
                || c == '('
                || c == ')'
                || c == '-'
                || c == '+'
                || c == '*'
                || c == '^'
                || c == '/'
                || c.is_whitespace()
        }),
        tag("\""),
    )
    .parse(input)
}

/// An argument key or value: quoted or unquoted.
fn arg_token(input: Input<'_>) -> PResult<'_, &str> {
    alt((quoted_token, bare_token)).parse(input)
}

/// One `key = value` pair, with optional whitespace around the equals sign.
fn key_value(input: Input<'_>) -> PResult<'_, (&str, &str)> {
    let (rest, key) = expect(arg_token, MalformedKind::ExpectArgument)(input)?;
    let (rest, _) = multispace0.parse(rest)?;
    let (rest, _) = expect(tag("="), MalformedKind::ExpectEquals)(rest)?;
    let (rest, _) = multispace0.parse(rest)?;
    let (rest, value) = expect(arg_token, MalformedKind::ExpectValue)(rest)?;

    Ok((rest, (key, value)))
}

/// The parenthesized argument group, `(k=v, k=v, ...)`.
///
/// The group opens immediately after the marker name; a marker with no
/// group has zero arguments. Once the opening parenthesis has matched the
/// group must complete, so failures past it are escalated and not retried
/// as a group-less marker.
fn argument_group(input: Input<'_>) -> PResult<'_, Vec<(&str, &str)>> {
    let (rest, _) = tag("(").parse(input)?;
    let (mut rest, first) = cut(key_value).parse(rest)?;

    let mut pairs = vec![first];
    loop {
        let (after_ws, _) = multispace0.parse(rest)?;
        let Ok((after_comma, _)) = tag::<_, _, MarkerFailure<'_>>(",").parse(after_ws) else {
            break;
        };
        let (after_ws, _) = multispace0.parse(after_comma)?;
        let (after_pair, pair) = cut(key_value).parse(after_ws)?;
        pairs.push(pair);
        rest = after_pair;
    }

    let (rest, _) = cut(expect(tag(")"), MalformedKind::UnclosedParen)).parse(rest)?;

    Ok((rest, pairs))
}

/// A complete marker: opener, name, optional argument group, closer.
fn marker(input: Input<'_>) -> PResult<'_, (&str, Vec<(&str, &str)>)> {
    let (rest, _) = expect(tag("#|"), MalformedKind::ExpectOpener)(input)?;
    let (rest, name) = expect(bare_token, MalformedKind::ExpectName)(rest)?;
    let (rest, pairs) = opt(argument_group).parse(rest)?;
    let (rest, _) = expect(tag("|#"), MalformedKind::ExpectCloser)(rest)?;

    Ok((rest, (name, pairs.unwrap_or_default())))
}

/// Attempts to parse a marker starting at `offset` into `text`.
///
/// Returns the parsed marker and the offset just past it. The failure offset
/// is absolute into `text`.
pub(crate) fn parse_at(text: &str, offset: usize) -> Result<(Marker, usize), TagError> {
    let input = &text[offset..];

    match marker(input) {
        Ok((rest, (name, pairs))) => {
            let end = text.len() - rest.len();
            let raw = &text[offset..end];

            let mut arguments = IndexMap::new();
            for (key, value) in pairs {
                if arguments.insert(key.to_string(), value.to_string()).is_some() {
                    return Err(TagError::duplicate_argument(key.to_string(), offset));
                }
            }

            let parsed = Marker::new(name.to_string(), arguments, offset, raw.to_string());
            Ok((parsed, end))
        }
        Err(nom::Err::Error(failure) | nom::Err::Failure(failure)) => Err(TagError::malformed(
            failure.kind,
            text.len() - failure.input.len(),
        )),
        Err(nom::Err::Incomplete(_)) => unreachable!(
            "This should never happen because we use `complete` combinators rather than `stream` combinators"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagErrorReason;

    mod success {
        use super::*;

        #[test]
        fn bare_marker_without_arguments() {
            let (marker, end) = parse_at("#|g_leak|#", 0).expect("should parse bare marker");
            assert_eq!(marker.name(), "g_leak");
            assert!(marker.arguments().is_empty());
            assert_eq!(marker.raw(), "#|g_leak|#");
            assert_eq!(end, 10);
        }

        #[test]
        fn marker_with_unquoted_arguments() {
            let (marker, _) =
                parse_at("#|tau(unit=ms, cell=L5)|#", 0).expect("should parse marker");
            assert_eq!(marker.name(), "tau");
            assert_eq!(marker.arguments().get("unit").map(String::as_str), Some("ms"));
            assert_eq!(marker.arguments().get("cell").map(String::as_str), Some("L5"));
        }

        #[test]
        fn quoted_values_keep_spaces_and_operators() {
            let (marker, _) = parse_at(r#"#|v(unit="mV / s^2", region="CA1 (dorsal)")|#"#, 0)
                .expect("should parse marker with quoted values");
            assert_eq!(
                marker.arguments().get("unit").map(String::as_str),
                Some("mV / s^2")
            );
            assert_eq!(
                marker.arguments().get("region").map(String::as_str),
                Some("CA1 (dorsal)")
            );
        }

        #[test]
        fn quoted_keys_are_stripped() {
            let (marker, _) = parse_at(r#"#|x("long key"=3)|#"#, 0).expect("should parse");
            assert_eq!(marker.arguments().get("long key").map(String::as_str), Some("3"));
        }

        #[test]
        fn marker_in_surrounding_text() {
            let text = "v = #|v_rest(unit=mV)|#  # resting potential";
            let (marker, end) = parse_at(text, 4).expect("should parse marker mid-text");
            assert_eq!(marker.offset(), 4);
            assert_eq!(marker.raw(), "#|v_rest(unit=mV)|#");
            assert_eq!(&text[..end], "v = #|v_rest(unit=mV)|#");
        }

        #[test]
        fn whitespace_around_equals_and_commas() {
            let (marker, _) =
                parse_at("#|x(a = 1 , b = 2)|#", 0).expect("should parse spaced arguments");
            assert_eq!(marker.arguments().len(), 2);
        }
    }

    mod error {
        use super::*;

        #[test]
        fn missing_closer() {
            let err = parse_at("#|name(a=1)", 0).expect_err("should fail without closer");
            assert_eq!(
                err.reason,
                TagErrorReason::Malformed(MalformedKind::ExpectCloser)
            );
            assert_eq!(err.offset, 11);
        }

        #[test]
        fn missing_name() {
            let err = parse_at("#||#", 0).expect_err("should fail without a name");
            assert_eq!(
                err.reason,
                TagErrorReason::Malformed(MalformedKind::ExpectName)
            );
            assert_eq!(err.offset, 2);
        }

        #[test]
        fn unclosed_argument_group() {
            let err = parse_at("#|x(a=1|#", 0).expect_err("should fail on unclosed group");
            assert_eq!(
                err.reason,
                TagErrorReason::Malformed(MalformedKind::UnclosedParen)
            );
        }

        #[test]
        fn missing_value_after_equals() {
            let err = parse_at("#|x(a=)|#", 0).expect_err("should fail on missing value");
            assert_eq!(
                err.reason,
                TagErrorReason::Malformed(MalformedKind::ExpectValue)
            );
        }

        #[test]
        fn duplicate_argument_key() {
            let err = parse_at("#|x(a=1, a=2)|#", 0).expect_err("should reject duplicate key");
            assert_eq!(
                err.reason,
                TagErrorReason::DuplicateArgument { key: "a".to_string() }
            );
            assert_eq!(err.offset, 0);
        }

        #[test]
        fn empty_quoted_token_is_malformed() {
            let err = parse_at(r#"#|x(a="")|#"#, 0).expect_err("should reject an empty quoted value");
            assert_eq!(
                err.reason,
                TagErrorReason::Malformed(MalformedKind::ExpectValue)
            );
        }

        #[test]
        fn unterminated_quote_is_malformed() {
            let err = parse_at(r#"#|x(a="broken)|#"#, 0).expect_err("should fail on open quote");
            assert!(matches!(err.reason, TagErrorReason::Malformed(_)));
        }
    }
}
