//! Decodes bencode into typed destinations
//!
//! # Basic decoding
//!
//! Most callers only need [`decode`](crate::decode) or [`decode_bytes`](crate::decode_bytes),
//! which write into an existing destination:
//!
//! ```
//! # use bencodec::decode_bytes;
//! #
//! let mut numbers: Vec<u32> = Vec::new();
//! decode_bytes(b"li1ei2ei3ee", &mut numbers).unwrap();
//! assert_eq!(numbers, [1, 2, 3]);
//! ```
//!
//! Decoding happens in three stages. A [`Chunker`] reads exactly one complete value from a
//! byte stream. A [`Lexer`] turns those bytes into tokens, rejecting anything that is not
//! well-formed. The engine ([`decode_into`]) then walks the tokens into the destination,
//! guided by its [`Decode::SHAPE`].
//!
//! Decoders have a depth limit to prevent resource exhaustion from hostile inputs. The default,
//! [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH), is generous; the lower the limit, the less
//! stack an attacker can make a dynamic decode use, so set it tightly where you can:
//!
//! ```
//! # use bencodec::{decoding::Decoder, Value};
//! #
//! let mut decoder = Decoder::new(&b"llleee"[..]).with_max_depth(2);
//! assert!(decoder.decode(&mut Value::default()).is_err());
//! ```
//!
//! Atoms (integers and strings) have depth zero, and lists and dicts have a depth equal to the
//! depth of their deepest member plus one. As a special case, an empty list or dict has depth 1.
//!
//! # Error handling
//!
//! Once a [`Lexer`] reports an error it won't try to muddle through it; it returns `None` from
//! then on. Every error carries an [`ErrorKind`](crate::ErrorKind) for programmatic handling.

mod chunker;
mod decode;
mod decoder;
pub(crate) mod engine;
mod error;
mod lexer;

pub use self::{
    chunker::Chunker,
    decode::{Decode, MapKey},
    decoder::Decoder,
    engine::{
        decode_associative, decode_bool, decode_byte_string, decode_integer, decode_into,
        decode_record, decode_sequence, decode_text, next_token, next_value_token, peek_token,
        peek_value_token,
    },
    error::Error,
    lexer::Lexer,
};
