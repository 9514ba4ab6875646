//! Literal keyword matching.
//!
//! Type keywords are recognized by their leading character,
//! then the rest of the keyword is read and compared verbatim.

use protopack_core::{ArrayLen, PrimitiveKind, Type};

use crate::{
    error::{SyntaxError, SyntaxErrorKind},
    stream::{cold_err, ParseStream},
};

fn unknown_type<T>(start: usize, expected: &'static str, found: &str) -> Result<T, SyntaxError> {
    cold_err(SyntaxError::new(
        start,
        SyntaxErrorKind::UnknownType {
            expected,
            found: found.to_owned(),
        },
    ))
}

/// Reads the keyword tail that follows its first character.
fn expect_tail(
    stream: &mut ParseStream<'_>,
    start: usize,
    keyword: &'static str,
) -> Result<(), SyntaxError> {
    let tail = &keyword[1..];
    let read = stream.read_n(tail.chars().count(), keyword)?;
    if read != tail {
        return unknown_type(start, keyword, stream.consumed_since(start));
    }
    Ok(())
}

/// Reads the width of `int` and `uint` keywords.
fn read_int_width(
    stream: &mut ParseStream<'_>,
    start: usize,
    signed: bool,
) -> Result<PrimitiveKind, SyntaxError> {
    let (expected, kinds) = if signed {
        (
            "int8, int16 or int32",
            [PrimitiveKind::Int8, PrimitiveKind::Int16, PrimitiveKind::Int32],
        )
    } else {
        (
            "uint8, uint16 or uint32",
            [PrimitiveKind::UInt8, PrimitiveKind::UInt16, PrimitiveKind::UInt32],
        )
    };

    let kind = match stream.read(expected)? {
        '8' => return Ok(kinds[0]),
        '1' => kinds[1],
        '3' => kinds[2],
        _ => return unknown_type(start, expected, stream.consumed_since(start)),
    };

    // Second digit of 16 or 32.
    let digit = kind.keyword().chars().last().unwrap_or_default();
    match stream.read(kind.keyword())? {
        ch if ch == digit => Ok(kind),
        _ => unknown_type(start, kind.keyword(), stream.consumed_since(start)),
    }
}

/// Reads a type keyword whose first character `first` is already consumed.
/// `start` is the offset of `first`.
pub fn read_type(
    stream: &mut ParseStream<'_>,
    first: char,
    start: usize,
) -> Result<Type, SyntaxError> {
    let ty = match first {
        'i' => {
            expect_tail(stream, start, "int")?;
            Type::Primitive(read_int_width(stream, start, true)?)
        }
        'u' => {
            expect_tail(stream, start, "uint")?;
            Type::Primitive(read_int_width(stream, start, false)?)
        }
        'f' => {
            expect_tail(stream, start, "float")?;
            Type::Primitive(PrimitiveKind::Float)
        }
        'd' => {
            expect_tail(stream, start, "double")?;
            Type::Primitive(PrimitiveKind::Double)
        }
        'b' => {
            expect_tail(stream, start, "bool")?;
            Type::Primitive(PrimitiveKind::Bool)
        }
        's' => {
            expect_tail(stream, start, Type::STRING_KEYWORD)?;
            Type::String
        }
        found => {
            return cold_err(SyntaxError::new(
                start,
                SyntaxErrorKind::UnexpectedCharacter {
                    found,
                    expected: "type, `{` or `}`",
                },
            ))
        }
    };
    Ok(ty)
}

/// Reads an optional array suffix, `[]` or `[N]`.
pub fn read_array_suffix(stream: &mut ParseStream<'_>) -> Result<Option<ArrayLen>, SyntaxError> {
    stream.skip_blank();
    if stream.peek() != Some('[') {
        return Ok(None);
    }
    stream.advance(1);

    let len = match stream.read_unsigned_int()? {
        Some(len) => ArrayLen::Fixed(len),
        None => ArrayLen::Variable,
    };

    match stream.peek() {
        Some(']') => {
            stream.advance(1);
            Ok(Some(len))
        }
        found => cold_err(stream.error(SyntaxErrorKind::UnclosedArraySize { found })),
    }
}
