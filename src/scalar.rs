//! Wrappers that pick a different bencode representation for common types.

use std::{borrow::Borrow, ops::Deref};

use crate::{
    decoding::{self, Decode, Lexer, MapKey, engine},
    encoding::{self, Encode, SingleItemEncoder},
    shape::{Shape, Truthiness},
};

/// Bytes encoded as a bencode string rather than a list of integers.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for ByteString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ByteString {
    fn from(content: &[u8]) -> Self {
        ByteString(content.to_vec())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(content: Vec<u8>) -> Self {
        ByteString(content)
    }
}

impl Decode for ByteString {
    const SHAPE: Shape = Shape::Bytes;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), decoding::Error> {
        let bytes = engine::decode_byte_string(tokens)?;
        self.0.clear();
        self.0.extend_from_slice(bytes);
        Ok(())
    }
}

impl Encode for ByteString {
    const SHAPE: Shape = Shape::Bytes;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), encoding::Error> {
        encoder.emit_bytes(&self.0)
    }

    fn is_empty_value(&self) -> bool {
        self.0.is_empty()
    }
}

impl MapKey for ByteString {
    fn from_key(key: &[u8]) -> Result<Self, decoding::Error> {
        Ok(ByteString::from(key))
    }
}

/// A boolean that only accepts `i0e`/`i1e` or the strings `n`/`y`, and encodes as `n`/`y`.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct YesNo(pub bool);

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        YesNo(value)
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value.0
    }
}

impl Decode for YesNo {
    const SHAPE: Shape = Shape::Boolean(Truthiness::YesNo);

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), decoding::Error> {
        self.0 = engine::decode_bool(tokens, Truthiness::YesNo)?;
        Ok(())
    }
}

impl Encode for YesNo {
    const SHAPE: Shape = Shape::Boolean(Truthiness::YesNo);

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), encoding::Error> {
        encoder.emit_str(if self.0 { "y" } else { "n" })
    }

    fn is_empty_value(&self) -> bool {
        !self.0
    }
}
