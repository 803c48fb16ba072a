//! Encodes and decodes bencode.
//!
//! Values are decoded into existing destinations: integers of any width, booleans, text, byte
//! strings, lists, maps, records declared with [`record!`], the dynamic [`Value`] tree, the
//! verbatim [`RawValue`], and types with their own [`hook!`]s. The decoder does not accept
//! malformed structure; the encoder only produces canonical output, with dictionary keys in
//! ascending byte order.
//!
//! ```
//! use bencodec::{decode_bytes, encode_to_bytes, record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Announce {
//!     interval: u32,
//!     peers: Vec<String>,
//! }
//!
//! record! {
//!     Announce {
//!         interval,
//!         #[omit_empty] peers,
//!     }
//! }
//!
//! let mut announce = Announce::default();
//! decode_bytes(b"d8:intervali1800e5:peersl4:peeree", &mut announce).unwrap();
//! assert_eq!(announce.interval, 1800);
//! assert_eq!(announce.peers, ["peer"]);
//!
//! announce.peers.clear();
//! assert_eq!(encode_to_bytes(&announce).unwrap(), b"d8:intervali1800ee");
//! ```

use std::io::{BufRead, Write};

pub mod decoding;
pub mod encoding;
pub mod hook;
mod raw;
pub mod record;
mod scalar;
pub mod shape;
mod state_tracker;
mod value;

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeDoctests;

pub use crate::{
    decoding::{Decode, Decoder, Error as DecodeError},
    encoding::{Encode, Error as EncodeError},
    raw::RawValue,
    record::Record,
    scalar::{ByteString, YesNo},
    shape::Shape,
    state_tracker::{DEFAULT_MAX_DEPTH, StructureError, Token},
    value::{Value, read_dynamic},
};

/// The failure classes shared by decoding and encoding errors, for matching without caring
/// about the details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A byte that cannot start or continue the current construct.
    MalformedInput,
    /// A string length that is missing, not a number, or longer than the input.
    InvalidLength,
    /// An `e` where it is not allowed, or input ending mid-value.
    UnexpectedTerminator,
    /// A non-string dictionary key.
    InvalidKeyType,
    /// Lists and dictionaries nested deeper than allowed.
    NestingTooDeep,
    /// The input value cannot be stored in the destination.
    TypeMismatch,
    /// An integer outside the destination's range.
    NumericParse,
    /// An input key resolved to a field that may not be written.
    UnwritableField,
    /// A value with no bencode representation.
    UnencodableShape,
    /// A user hook failed.
    CustomHook,
    /// The byte source or sink failed.
    Io,
}

/// Decode the next complete value from `source` into `dest`.
///
/// Exactly the bytes of that value are consumed; anything after it is left in `source`.
pub fn decode<R, T>(source: R, dest: &mut T) -> Result<(), DecodeError>
where
    R: BufRead,
    T: Decode + ?Sized,
{
    Decoder::new(source).decode(dest)
}

/// Decode the first complete value in `buffer` into `dest`. Trailing bytes are ignored.
pub fn decode_bytes<T: Decode + ?Sized>(buffer: &[u8], dest: &mut T) -> Result<(), DecodeError> {
    decode(buffer, dest)
}

/// Encode `value` and write it to `sink`.
pub fn encode<W, T>(mut sink: W, value: &T) -> Result<(), EncodeError>
where
    W: Write,
    T: Encode + ?Sized,
{
    let bytes = encode_to_bytes(value)?;
    sink.write_all(&bytes).map_err(EncodeError::io)
}

/// Encode `value` into a fresh buffer.
pub fn encode_to_bytes<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    value.to_bencode()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_leaves_trailing_bytes() {
        let mut source: &[u8] = b"i7erest";
        let mut number = 0i32;
        decode(&mut source, &mut number).unwrap();
        assert_eq!(number, 7);
        assert_eq!(source, b"rest");
    }

    #[test]
    fn encode_writes_to_the_sink() {
        let mut sink = Vec::new();
        encode(&mut sink, &vec!["a", "b"]).unwrap();
        assert_eq!(sink, b"l1:a1:be");
    }

    #[test]
    fn write_failures_are_io_errors() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::WriteZero.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let error = encode(Full, &1).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
    }
}
