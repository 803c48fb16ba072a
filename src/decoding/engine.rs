//! The typed decode engine: drives a [`Lexer`] into destinations described by their [`Shape`].

use std::{num::ParseIntError, str, str::FromStr};

use crate::{
    decoding::{Decode, Error, Lexer, MapKey},
    record::Record,
    shape::{Shape, Truthiness},
    state_tracker::{StructureError, Token},
};

/// Lists start with room for this many elements.
const MIN_SEQUENCE_CAPACITY: usize = 4;

/// Decode the next value from `tokens` into `dest`.
///
/// Raw and custom destinations receive the value's exact bytes; everything else is checked
/// against its shape and then decoded token by token.
pub fn decode_into<T: Decode + ?Sized>(tokens: &mut Lexer<'_>, dest: &mut T) -> Result<(), Error> {
    match T::SHAPE {
        Shape::Raw | Shape::Custom => {
            let raw = tokens.capture_raw()?;
            dest.decode_raw(raw)
        },
        Shape::Dynamic => dest.decode_tokens(tokens),
        shape => {
            let head = peek_value_token(tokens)?;
            if !shape.accepts(&head) {
                return Err(Error::type_mismatch(shape, head.name()));
            }
            dest.decode_tokens(tokens)
        },
    }
}

/// The next token, which may close a container. End of input is an error.
pub fn next_token<'a>(tokens: &mut Lexer<'a>) -> Result<Token<'a>, Error> {
    match tokens.next_token() {
        Some(token) => Ok(token?),
        None => Err(StructureError::eof("where a value was expected").into()),
    }
}

/// Like [`next_token`], but does not consume the token.
pub fn peek_token<'a>(tokens: &mut Lexer<'a>) -> Result<Token<'a>, Error> {
    match tokens.peek_token() {
        Some(token) => Ok(token?),
        None => Err(StructureError::eof("where a value was expected").into()),
    }
}

/// The first token of a value; container ends are rejected.
pub fn next_value_token<'a>(tokens: &mut Lexer<'a>) -> Result<Token<'a>, Error> {
    reject_end(next_token(tokens)?)
}

pub fn peek_value_token<'a>(tokens: &mut Lexer<'a>) -> Result<Token<'a>, Error> {
    reject_end(peek_token(tokens)?)
}

fn reject_end(token: Token<'_>) -> Result<Token<'_>, Error> {
    if token.is_end() {
        Err(StructureError::terminator(format!(
            "Found {} where a value was expected",
            token.name()
        ))
        .into())
    } else {
        Ok(token)
    }
}

/// Parse an integer token at the width of `N`; `shape` names the destination in errors.
pub fn decode_integer<N>(tokens: &mut Lexer<'_>, shape: Shape) -> Result<N, Error>
where
    N: FromStr<Err = ParseIntError>,
{
    match next_value_token(tokens)? {
        Token::Integer(text) => text
            .parse()
            .map_err(|error| Error::numeric_parse(text, shape, Some(error))),
        other => Err(Error::type_mismatch(shape, other.name())),
    }
}

pub fn decode_bool(tokens: &mut Lexer<'_>, truthiness: Truthiness) -> Result<bool, Error> {
    let shape = Shape::Boolean(truthiness);
    match (next_value_token(tokens)?, truthiness) {
        // The lexer only lets canonical integers through, so zero is always spelled "0"
        (Token::Integer(text), Truthiness::NonZero) => Ok(text != "0"),
        (Token::Integer("0"), Truthiness::YesNo) | (Token::String(b"n"), Truthiness::YesNo) => {
            Ok(false)
        },
        (Token::Integer("1"), Truthiness::YesNo) | (Token::String(b"y"), Truthiness::YesNo) => {
            Ok(true)
        },
        (Token::Integer(text), Truthiness::YesNo) => Err(Error::numeric_parse(text, shape, None)),
        (Token::String(text), Truthiness::YesNo) => Err(Error::type_mismatch(
            shape,
            format!("string {:?}", String::from_utf8_lossy(text)),
        )),
        (other, _) => Err(Error::type_mismatch(shape, other.name())),
    }
}

pub fn decode_text<'a>(tokens: &mut Lexer<'a>) -> Result<&'a str, Error> {
    match next_value_token(tokens)? {
        Token::String(bytes) => str::from_utf8(bytes)
            .map_err(|_| Error::type_mismatch(Shape::Text, "non-UTF-8 string")),
        other => Err(Error::type_mismatch(Shape::Text, other.name())),
    }
}

pub fn decode_byte_string<'a>(tokens: &mut Lexer<'a>) -> Result<&'a [u8], Error> {
    match next_value_token(tokens)? {
        Token::String(bytes) => Ok(bytes),
        other => Err(Error::type_mismatch(Shape::Bytes, other.name())),
    }
}

/// Decode a list into `dest`, reusing its existing elements and dropping any surplus.
pub fn decode_sequence<T: Decode + Default>(
    tokens: &mut Lexer<'_>,
    dest: &mut Vec<T>,
) -> Result<(), Error> {
    match next_value_token(tokens)? {
        Token::ListStart => {},
        other => return Err(Error::type_mismatch(Shape::Sequence, other.name())),
    }

    let mut len = 0;
    while peek_token(tokens)? != Token::ListEnd {
        if len == dest.len() {
            if dest.len() == dest.capacity() {
                dest.reserve_exact(dest.capacity().max(MIN_SEQUENCE_CAPACITY));
            }
            dest.push(T::default());
        }
        decode_into(tokens, &mut dest[len])?;
        len += 1;
    }
    next_token(tokens)?;

    dest.truncate(len);
    Ok(())
}

/// Decode a dictionary, handing each decoded entry to `insert` in input order.
pub fn decode_associative<K, V>(
    tokens: &mut Lexer<'_>,
    mut insert: impl FnMut(K, V),
) -> Result<(), Error>
where
    K: MapKey,
    V: Decode + Default,
{
    match next_value_token(tokens)? {
        Token::DictStart => {},
        other => return Err(Error::type_mismatch(Shape::Associative, other.name())),
    }

    loop {
        let offset = tokens.offset();
        match next_token(tokens)? {
            Token::DictEnd => return Ok(()),
            Token::String(key) => {
                let key = K::from_key(key)?;
                let mut value = V::default();
                decode_into(tokens, &mut value)?;
                insert(key, value);
            },
            other => {
                return Err(StructureError::InvalidKeyType {
                    found: other.name(),
                    offset,
                }
                .into());
            },
        }
    }
}

/// Decode a dictionary into the fields of a record.
///
/// Keys that match no field have their value checked and discarded without being parsed. Fields absent from the
/// input keep their current values.
pub fn decode_record<R: Record + ?Sized>(tokens: &mut Lexer<'_>, dest: &mut R) -> Result<(), Error> {
    match next_value_token(tokens)? {
        Token::DictStart => {},
        other => return Err(Error::type_mismatch(Shape::Record, other.name())),
    }

    let shape = R::record_shape();
    loop {
        let offset = tokens.offset();
        let key = match next_token(tokens)? {
            Token::DictEnd => return Ok(()),
            Token::String(key) => key,
            other => {
                return Err(StructureError::InvalidKeyType {
                    found: other.name(),
                    offset,
                }
                .into());
            },
        };

        match shape.resolve(key) {
            None => {
                tokens.capture_raw()?;
            },
            Some(field) if !field.is_writable() => {
                return Err(Error::UnwritableField {
                    record: shape.name(),
                    field: field.name().to_owned(),
                });
            },
            Some(field) => dest.decode_field(field.name(), tokens)?,
        }
    }
}
