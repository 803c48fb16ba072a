//! Types with named fields, mapped to and from bencode dictionaries.
//!
//! The [`record!`](crate::record) macro implements [`Record`], [`Decode`](crate::Decode) and
//! [`Encode`](crate::Encode) for a struct whose fields all implement both codec traits:
//!
//! ```
//! use bencodec::{decode_bytes, encode_to_bytes, record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Peer {
//!     ip: String,
//!     port: u16,
//!     peer_id: String,
//!     cached: u32,
//! }
//!
//! record! {
//!     Peer {
//!         ip,
//!         port,
//!         peer_id => "peer id",
//!         cached => "-",
//!     }
//! }
//!
//! let mut peer = Peer::default();
//! decode_bytes(b"d2:ip9:127.0.0.17:peer id3:abc4:porti6881ee", &mut peer).unwrap();
//! assert_eq!(peer.port, 6881);
//! assert_eq!(encode_to_bytes(&peer).unwrap(), b"d2:ip9:127.0.0.17:peer id3:abc4:porti6881ee");
//! ```
//!
//! Each field is written as `name`, optionally followed by `=> "tag"` to use another dictionary
//! key. The tag `"-"` hides the field from the wire entirely. Fields may carry options:
//!
//! - `#[omit_empty]` leaves the field out of the encoding while it holds its empty value.
//! - `#[read_only]` makes inputs that set the field fail to decode.
//!
//! Keys are matched to fields by tag first, then by the name of an untagged field, exactly and
//! then ignoring case. Keys that match nothing are read and dropped.

use crate::{
    decoding::{self, Lexer},
    encoding::{self, SingleItemEncoder},
    shape::RecordShape,
};

/// A type whose fields are addressed by name.
pub trait Record {
    /// The field table, built once per type.
    fn record_shape() -> &'static RecordShape;

    /// Decode the next value into the field called `name`.
    fn decode_field(&mut self, name: &str, tokens: &mut Lexer<'_>) -> Result<(), decoding::Error>;

    /// Encode the field called `name`.
    fn encode_field(&self, name: &str, encoder: SingleItemEncoder) -> Result<(), encoding::Error>;

    /// Whether the field called `name` holds its empty value.
    fn field_is_empty(&self, name: &str) -> bool;
}

/// Implement [`Record`], [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for a struct.
/// See the [module documentation](crate::record) for the syntax.
#[macro_export]
macro_rules! record {
    ($type:ident { $( $(#[$option:ident])* $field:ident $(=> $tag:literal)? ),* $(,)? }) => {
        impl $crate::record::Record for $type {
            fn record_shape() -> &'static $crate::shape::RecordShape {
                static SHAPE: ::std::sync::OnceLock<$crate::shape::RecordShape> =
                    ::std::sync::OnceLock::new();
                SHAPE.get_or_init(|| {
                    $crate::shape::RecordShape::new(
                        stringify!($type),
                        vec![$(
                            $crate::shape::FieldShape::new(stringify!($field))
                                $(.renamed($tag))?
                                $(.$option())*
                        ),*],
                    )
                })
            }

            fn decode_field(
                &mut self,
                name: &str,
                tokens: &mut $crate::decoding::Lexer<'_>,
            ) -> ::std::result::Result<(), $crate::decoding::Error> {
                $(
                    if name == stringify!($field) {
                        return $crate::decoding::decode_into(tokens, &mut self.$field);
                    }
                )*
                Err($crate::decoding::Error::UnwritableField {
                    record: stringify!($type),
                    field: name.to_owned(),
                })
            }

            fn encode_field(
                &self,
                name: &str,
                encoder: $crate::encoding::SingleItemEncoder,
            ) -> ::std::result::Result<(), $crate::encoding::Error> {
                $(
                    if name == stringify!($field) {
                        return encoder.emit(&self.$field);
                    }
                )*
                Err($crate::encoding::Error::unencodable(
                    $crate::shape::Shape::Record,
                    format!("{} has no field `{}`", stringify!($type), name),
                ))
            }

            fn field_is_empty(&self, name: &str) -> bool {
                $(
                    if name == stringify!($field) {
                        return $crate::encoding::Encode::is_empty_value(&self.$field);
                    }
                )*
                false
            }
        }

        impl $crate::decoding::Decode for $type {
            const SHAPE: $crate::shape::Shape = $crate::shape::Shape::Record;

            fn decode_tokens(
                &mut self,
                tokens: &mut $crate::decoding::Lexer<'_>,
            ) -> ::std::result::Result<(), $crate::decoding::Error> {
                $crate::decoding::decode_record(tokens, self)
            }
        }

        impl $crate::encoding::Encode for $type {
            const SHAPE: $crate::shape::Shape = $crate::shape::Shape::Record;

            fn encode(
                &self,
                encoder: $crate::encoding::SingleItemEncoder,
            ) -> ::std::result::Result<(), $crate::encoding::Error> {
                $crate::encoding::encode_record(self, encoder)
            }
        }
    };
}
