//! Capturing values without interpreting them.

use crate::{
    decoding::{self, Decode, Lexer},
    encoding::{self, Encode, SingleItemEncoder},
    shape::Shape,
    state_tracker::StructureError,
};

/// The exact bytes of one bencode value.
///
/// Decoding stores the value's encoding byte for byte, unsorted keys and all; encoding writes
/// those bytes back unchanged. Use it to defer decoding of a part of a message, or to forward it
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawValue(Vec<u8>);

impl RawValue {
    /// Wrap bytes holding exactly one complete value.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, decoding::Error> {
        let bytes: Vec<u8> = bytes.into();
        let mut raw = RawValue::default();
        crate::decode_bytes(&bytes, &mut raw)?;
        if raw.0.len() != bytes.len() {
            return Err(StructureError::MalformedInput {
                detail: format!("{} trailing bytes after raw value", bytes.len() - raw.0.len()),
            }
            .into());
        }
        Ok(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Decode the captured value into `dest`.
    pub fn decode_into<T: Decode + ?Sized>(&self, dest: &mut T) -> Result<(), decoding::Error> {
        crate::decode_bytes(&self.0, dest)
    }
}

impl AsRef<[u8]> for RawValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Decode for RawValue {
    const SHAPE: Shape = Shape::Raw;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), decoding::Error> {
        let raw = tokens.capture_raw()?;
        self.decode_raw(raw)
    }

    fn decode_raw(&mut self, raw: &[u8]) -> Result<(), decoding::Error> {
        self.0.clear();
        self.0.extend_from_slice(raw);
        Ok(())
    }
}

impl Encode for RawValue {
    const SHAPE: Shape = Shape::Raw;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), encoding::Error> {
        encoder.emit_raw(&self.0)
    }

    fn is_empty_value(&self) -> bool {
        self.0.is_empty()
    }
}
