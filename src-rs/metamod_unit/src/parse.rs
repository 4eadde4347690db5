//! Parser for unit expressions.
//!
//! The grammar mirrors ordinary scientific notation for units:
//!
//! - a term is a unit symbol with an optional `^` integer exponent, the
//!   dimensionless `1`, or a parenthesized expression
//! - terms combine left-associatively with `*` and `/`
//!
//! Examples: `ms`, `uV`, `m/s^2`, `1/s`, `(kg*m)/s^2`.
//!
//! The parser evaluates directly to a dimension and scale factor rather
//! than building a syntax tree; nothing downstream needs the tree.

use nom::{
    IResult, Parser as _,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    combinator::opt,
    error::ParseError,
};

use crate::{
    dimension::Dimension,
    error::{UnitError, UnitErrorReason},
    symbols,
};

type Input<'a> = &'a str;
type PResult<'a, T> = IResult<Input<'a>, T, UnitFailure<'a>>;

/// Internal failure carrying the remaining input and the failure reason.
#[derive(Debug)]
struct UnitFailure<'a> {
    input: Input<'a>,
    reason: UnitErrorReason,
}

impl<'a> ParseError<Input<'a>> for UnitFailure<'a> {
    fn from_error_kind(input: Input<'a>, _kind: nom::error::ErrorKind) -> Self {
        Self {
            input,
            reason: UnitErrorReason::ExpectTerm,
        }
    }

    fn append(_input: Input<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

fn fail<'a, T>(input: Input<'a>, reason: UnitErrorReason) -> PResult<'a, T> {
    Err(nom::Err::Error(UnitFailure { input, reason }))
}

/// A resolved subexpression: dimension plus scale factor.
type Resolved = (Dimension, f64);

/// Parses a unit symbol and resolves it through the symbol table.
fn symbol(input: Input<'_>) -> PResult<'_, Resolved> {
    let (rest, text) = take_while1(|c: char| c.is_alphabetic()).parse(input)?;

    match symbols::resolve(text) {
        Some(resolved) => Ok((rest, resolved)),
        None => fail(input, UnitErrorReason::UnknownUnit(text.to_string())),
    }
}

/// Parses an integer exponent, with an optional leading minus sign.
fn exponent(input: Input<'_>) -> PResult<'_, i32> {
    let (rest, sign) = opt(tag("-")).parse(input)?;
    let (rest, digits) = take_while1(|c: char| c.is_ascii_digit()).parse(rest)?;

    let Ok(magnitude) = digits.parse::<i32>() else {
        return fail(input, UnitErrorReason::MissingExponent);
    };

    let value = if sign.is_some() { -magnitude } else { magnitude };
    Ok((rest, value))
}

/// Parses a unit term: symbol with optional exponent, `1`, or a
/// parenthesized expression.
fn term(input: Input<'_>) -> PResult<'_, Resolved> {
    let parse_symbol = |input| {
        let (rest, (dimension, scale)) = symbol(input)?;

        let (rest, exp) = opt(|input| {
            let (rest, _) = tag("^").parse(input)?;
            match exponent(rest) {
                Ok(ok) => Ok(ok),
                Err(_) => Err(nom::Err::Failure(UnitFailure {
                    input: rest,
                    reason: UnitErrorReason::MissingExponent,
                })),
            }
        })
        .parse(rest)?;

        let resolved = match exp {
            Some(exp) => (dimension.pow(exp), scale.powi(exp)),
            None => (dimension, scale),
        };

        Ok((rest, resolved))
    };

    let parse_one = |input| {
        let (rest, _) = tag("1").parse(input)?;
        Ok((rest, (Dimension::NONE, 1.0)))
    };

    let parse_parenthesized = |input| {
        let (rest, _) = tag("(").parse(input)?;
        let (rest, _) = multispace0.parse(rest)?;
        let (rest, resolved) = expr(rest)?;
        let (rest, _) = multispace0.parse(rest)?;
        match tag::<_, _, UnitFailure<'_>>(")").parse(rest) {
            Ok((rest, _)) => Ok((rest, resolved)),
            Err(_) => Err(nom::Err::Failure(UnitFailure {
                input: rest,
                reason: UnitErrorReason::UnclosedParen,
            })),
        }
    };

    alt((parse_symbol, parse_one, parse_parenthesized)).parse(input)
}

/// Parses a unit expression with left-associative `*` and `/`.
fn expr(input: Input<'_>) -> PResult<'_, Resolved> {
    let (mut rest, mut resolved) = term(input)?;

    loop {
        let (after_ws, _) = multispace0.parse(rest)?;
        let op = alt((tag::<_, _, UnitFailure<'_>>("*"), tag("/"))).parse(after_ws);
        let Ok((after_op, op)) = op else {
            break;
        };
        let (after_ws, _) = multispace0.parse(after_op)?;

        let (after_term, (dimension, scale)) = match term(after_ws) {
            Ok(ok) => ok,
            Err(nom::Err::Failure(failure)) => return Err(nom::Err::Failure(failure)),
            Err(_) => {
                return Err(nom::Err::Failure(UnitFailure {
                    input: after_ws,
                    reason: UnitErrorReason::ExpectTerm,
                }));
            }
        };

        resolved = if op == "*" {
            (resolved.0 * dimension, resolved.1 * scale)
        } else {
            (resolved.0 / dimension, resolved.1 / scale)
        };
        rest = after_term;
    }

    Ok((rest, resolved))
}

/// Parses a complete unit string to a dimension and scale factor.
///
/// Surrounding whitespace is ignored; anything else left over after the
/// expression is an error.
pub(crate) fn parse(text: &str) -> Result<Resolved, UnitError> {
    let trimmed_start = text.trim_start();
    let leading = text.len() - trimmed_start.len();

    let to_error = |failure: UnitFailure<'_>| UnitError {
        reason: failure.reason,
        offset: text.len() - failure.input.len(),
    };

    match expr(trimmed_start) {
        Ok((rest, resolved)) => {
            if rest.trim_start().is_empty() {
                Ok(resolved)
            } else {
                Err(UnitError {
                    reason: UnitErrorReason::TrailingInput,
                    offset: leading + (trimmed_start.len() - rest.len()),
                })
            }
        }
        Err(nom::Err::Error(failure) | nom::Err::Failure(failure)) => Err(to_error(failure)),
        Err(nom::Err::Incomplete(_)) => unreachable!(
            "This should never happen because we use `complete` combinators rather than `stream` combinators"
        ),
    }
}
