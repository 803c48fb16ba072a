//! An encoder for bencode. Guarantees that the output string is valid, canonical bencode
//!
//! # Encoding a structure
//!
//! Records declared with [`record!`](crate::record) and most standard types already implement
//! [`Encode`]. A hand-written implementation emits its value through the
//! [`SingleItemEncoder`] it is given:
//!
//! ```
//! # use bencodec::{encoding::{Encode, SingleItemEncoder, Error}, shape::Shape};
//!
//! struct Message {
//!     foo: i32,
//!     bar: String,
//! }
//!
//! impl Encode for Message {
//!     const SHAPE: Shape = Shape::Record;
//!
//!     fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
//!         encoder.emit_dict(|mut e| {
//!             // Keys must be emitted in ascending byte order
//!             e.emit_pair(b"bar", &self.bar)?;
//!             e.emit_pair(b"foo", &self.foo)
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), Error> {
//! let message = Message {
//!     foo: 1,
//!     bar: "quux".to_string(),
//! };
//!
//! assert_eq!(message.to_bencode()?, b"d3:bar4:quux3:fooi1ee");
//! # Ok(())
//! # }
//! ```
//!
//! # Canonical output
//!
//! Dictionary keys are always written in ascending byte order: maps sort their keys and
//! records sort their fields by wire name. Hand-written dictionaries that emit keys out of
//! order fail with [`StructureError::UnsortedKeys`](crate::StructureError::UnsortedKeys).
//!
//! # Error handling
//!
//! Once an error occurs during encoding, all future calls to the same encoder will fail
//! early with the same error. Callbacks should respond to failure by bailing out as quickly
//! as possible.

mod encode;
mod encoder;
mod error;
mod printable_integer;

pub use self::{
    encode::{Encode, encode_record},
    encoder::{Encoder, SingleItemEncoder, SortedDictEncoder},
    error::Error,
    printable_integer::PrintableInteger,
};
