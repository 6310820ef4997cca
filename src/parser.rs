//! Text-to-symex parsing.
//!
//! The surface syntax is tiny: atoms, parenthesized lists, whitespace, and
//! line comments starting with `;`. Parsing is a convenience for programs
//! arriving as text; the evaluators never see text, only symexes.

use nom::{
    IResult,
    Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::multispace1,
    combinator::value,
    multi::many0,
    sequence::{delimited, pair},
};
use thiserror::Error;
use tracing::trace;

use crate::symex::Symex;

/// Every way input text can fail to parse as one symex.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected an expression, found the end of the input")]
    UnexpectedEndOfInput,
    #[error("a list was opened but never closed")]
    UnterminatedList,
    #[error("unrecognized character {0:?}")]
    UnrecognizedCharacter(char),
    #[error("trailing input after the expression: {0:?}")]
    TrailingInput(String),
}

impl<'a> nom::error::ParseError<&'a str> for ParseError {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        match input.chars().next() {
            None => ParseError::UnexpectedEndOfInput,
            Some(character) => ParseError::UnrecognizedCharacter(character),
        }
    }

    fn append(_input: &'a str, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

type ParseResult<'a, T> = IResult<&'a str, T, ParseError>;

/// Parses `input` as exactly one symex, allowing surrounding whitespace and
/// comments. Anything left over is an error.
#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
pub fn parse(input: &str) -> Result<Symex, ParseError> {
    match delimited(junk0, symex, junk0).parse(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(ParseError::TrailingInput(rest.to_string())),
        Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => Err(error),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEndOfInput),
    }
}

/// The characters that may appear in an atom.
fn is_atom_char(character: char) -> bool {
    character.is_alphanumeric() || "*+-./:<=>?_".contains(character)
}

// Consumes any run of whitespace and line comments, possibly empty.
fn junk0(input: &str) -> ParseResult<'_, ()> {
    value(
        (),
        many0(alt((value((), multispace1), value((), line_comment)))),
    )
    .parse(input)
}

fn line_comment(input: &str) -> ParseResult<'_, &str> {
    trace!("Attempting to parse line comment");
    pair(tag(";"), take_while(|character| character != '\n'))
        .map(|(_, text)| text)
        .parse(input)
}

fn symex(input: &str) -> ParseResult<'_, Symex> {
    alt((list, atom)).parse(input)
}

fn atom(input: &str) -> ParseResult<'_, Symex> {
    trace!("Attempting to parse atom");
    take_while1(is_atom_char).map(Symex::atom).parse(input)
}

// Hand-rolled rather than combinator-built so that hitting the end of the
// input mid-list reports `UnterminatedList` instead of a generic failure.
fn list(input: &str) -> ParseResult<'_, Symex> {
    trace!("Attempting to parse list");
    let (mut rest, _) = tag("(").parse(input)?;
    let mut items = Vec::new();

    loop {
        let (after_junk, ()) = junk0(rest)?;
        if let Ok((after_close, _)) = tag::<_, _, ParseError>(")").parse(after_junk) {
            return Ok((after_close, Symex::list(items)));
        }
        if after_junk.is_empty() {
            return Err(nom::Err::Failure(ParseError::UnterminatedList));
        }

        // A bad element is fatal for the whole parse; `Failure` keeps `alt`
        // from retrying it as an atom.
        let (after_item, item) = symex(after_junk).map_err(|error| match error {
            nom::Err::Error(error) => nom::Err::Failure(error),
            other => other,
        })?;
        items.push(item);
        rest = after_item;
    }
}
