//! `Value`s hold arbitrary owned bencode data, read without knowing its layout in advance.
//!
//! `Value` implements `Decode` and `Encode`, and decoding into it never fails on shape. If the
//! `serde` feature is enabled, it also implements `Serialize` and `Deserialize`.

use std::{collections::BTreeMap, str};

#[cfg(feature = "serde")]
use std::fmt::{self, Formatter};

#[cfg(feature = "serde")]
use serde_ as serde;

#[cfg(feature = "serde")]
use serde::{
    Serialize,
    ser::{SerializeMap, SerializeSeq},
};

use crate::{
    decoding::{self, Decode, Lexer, engine},
    encoding::{self, Encode, SingleItemEncoder},
    shape::Shape,
    state_tracker::{StructureError, Token},
};

/// An owned bencoded value.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value {
    /// A byte string
    Bytes(Vec<u8>),
    /// A dictionary mapping byte strings to values
    Dict(BTreeMap<Vec<u8>, Value>),
    /// A signed integer
    Integer(i64),
    /// A list of values
    List(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(integer) => Some(integer),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The byte string as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|bytes| str::from_utf8(bytes).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, Value>> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Look up `key` if this is a dictionary.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_dict().and_then(|dict| dict.get(key.as_ref()))
    }
}

impl From<i64> for Value {
    fn from(integer: i64) -> Self {
        Value::Integer(integer)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Bytes(text.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<BTreeMap<Vec<u8>, Value>> for Value {
    fn from(dict: BTreeMap<Vec<u8>, Value>) -> Self {
        Value::Dict(dict)
    }
}

/// A container that has been opened but not yet closed.
enum Partial {
    List(Vec<Value>),
    /// Entries so far, and the key waiting for its value.
    Dict(BTreeMap<Vec<u8>, Value>, Option<Vec<u8>>),
}

/// Read the next complete value from `tokens`, whatever its shape.
///
/// Integers are read as `i64`; bigger ones fail to parse. When a dictionary repeats a key,
/// the later value wins. Open containers are kept on the heap, so the nesting depth is
/// bounded only by the lexer's limit.
pub fn read_dynamic(tokens: &mut Lexer<'_>) -> Result<Value, decoding::Error> {
    let mut open: Vec<Partial> = Vec::new();

    loop {
        let complete = if let Some(Partial::Dict(dict, pending @ None)) = open.last_mut() {
            let offset = tokens.offset();
            match engine::next_token(tokens)? {
                Token::DictEnd => {
                    let dict = std::mem::take(dict);
                    open.pop();
                    Value::Dict(dict)
                },
                Token::String(key) => {
                    *pending = Some(key.to_vec());
                    continue;
                },
                other => {
                    return Err(StructureError::InvalidKeyType {
                        found: other.name(),
                        offset,
                    }
                    .into());
                },
            }
        } else {
            match engine::next_token(tokens)? {
                Token::Integer(text) => text.parse().map(Value::Integer).map_err(|error| {
                    decoding::Error::numeric_parse(text, <i64 as Decode>::SHAPE, Some(error))
                })?,
                Token::String(bytes) => Value::Bytes(bytes.to_vec()),
                Token::ListStart => {
                    open.push(Partial::List(Vec::new()));
                    continue;
                },
                Token::DictStart => {
                    open.push(Partial::Dict(BTreeMap::new(), None));
                    continue;
                },
                token @ (Token::ListEnd | Token::DictEnd) => match open.pop() {
                    Some(Partial::List(list)) if token == Token::ListEnd => Value::List(list),
                    _ => {
                        return Err(StructureError::terminator(format!(
                            "Found {} where a value was expected",
                            token.name()
                        ))
                        .into());
                    },
                },
            }
        };

        match open.last_mut() {
            None => return Ok(complete),
            Some(Partial::List(list)) => list.push(complete),
            Some(Partial::Dict(dict, pending)) => {
                if let Some(key) = pending.take() {
                    dict.insert(key, complete);
                }
            },
        }
    }
}

impl Decode for Value {
    const SHAPE: Shape = Shape::Dynamic;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), decoding::Error> {
        *self = read_dynamic(tokens)?;
        Ok(())
    }
}

impl Encode for Value {
    const SHAPE: Shape = Shape::Dynamic;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), encoding::Error> {
        match self {
            Value::Bytes(bytes) => encoder.emit_bytes(bytes),
            Value::Dict(dict) => dict.encode(encoder),
            Value::Integer(integer) => encoder.emit_int(*integer),
            Value::List(list) => list.encode(encoder),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;

    use serde_bytes::{ByteBuf, Bytes};

    impl Serialize for Value {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            match self {
                Value::Bytes(string) => serializer.serialize_bytes(string),
                Value::Integer(int) => serializer.serialize_i64(*int),
                Value::List(list) => {
                    let mut seed = serializer.serialize_seq(Some(list.len()))?;
                    for value in list {
                        seed.serialize_element(value)?;
                    }
                    seed.end()
                },
                Value::Dict(dict) => {
                    let mut seed = serializer.serialize_map(Some(dict.len()))?;
                    // Text keys stay text so formats with string-only keys can hold them
                    for (k, v) in dict {
                        match str::from_utf8(k) {
                            Ok(key) => seed.serialize_entry(key, v)?,
                            Err(_) => seed.serialize_entry(Bytes::new(k), v)?,
                        }
                    }
                    seed.end()
                },
            }
        }
    }

    impl<'de> serde::de::Deserialize<'de> for Value {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
        where
            D: serde::de::Deserializer<'de>,
        {
            deserializer.deserialize_any(Visitor)
        }
    }

    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Value;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            formatter.write_str("any valid bencode value")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
            Ok(Value::Integer(i64::from(value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
            Ok(Value::Integer(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Value, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value)
                .map(Value::Integer)
                .map_err(|_| E::custom(format!("integer {value} does not fit in i64")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Value, E> {
            Ok(Value::from(value))
        }

        fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
            Ok(Value::from(value))
        }

        fn visit_string<E>(self, value: String) -> Result<Value, E> {
            Ok(Value::from(value))
        }

        fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
            Ok(Value::Bytes(value))
        }

        fn visit_seq<V>(self, mut access: V) -> Result<Value, V::Error>
        where
            V: serde::de::SeqAccess<'de>,
        {
            let mut list = Vec::new();
            while let Some(e) = access.next_element()? {
                list.push(e);
            }
            Ok(Value::List(list))
        }

        fn visit_map<V>(self, mut access: V) -> Result<Value, V::Error>
        where
            V: serde::de::MapAccess<'de>,
        {
            let mut map = BTreeMap::new();
            while let Some((k, v)) = access.next_entry::<ByteBuf, _>()? {
                map.insert(k.into_vec(), v);
            }
            Ok(Value::Dict(map))
        }
    }
}
