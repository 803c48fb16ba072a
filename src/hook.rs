//! Types that take over their own encoding.
//!
//! A type implementing [`DecodeHook`] receives the exact bytes of its value; one implementing
//! [`EncodeHook`] returns bytes that are spliced into the output. [`hook!`](crate::hook) wires
//! them into [`Decode`](crate::Decode) and [`Encode`](crate::Encode):
//!
//! ```
//! use bencodec::{decode_bytes, encode_to_bytes, hook, hook::{DecodeHook, EncodeHook, HookError}};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Celsius(f64);
//!
//! impl DecodeHook for Celsius {
//!     fn decode_hook(&mut self, raw: &[u8]) -> Result<(), HookError> {
//!         let mut text = String::new();
//!         decode_bytes(raw, &mut text)?;
//!         self.0 = text.parse()?;
//!         Ok(())
//!     }
//! }
//!
//! impl EncodeHook for Celsius {
//!     fn encode_hook(&self) -> Result<Vec<u8>, HookError> {
//!         Ok(encode_to_bytes(&self.0.to_string())?)
//!     }
//! }
//!
//! hook!(Celsius);
//!
//! let mut temperature = Celsius::default();
//! decode_bytes(b"4:21.5", &mut temperature).unwrap();
//! assert_eq!(temperature, Celsius(21.5));
//! assert_eq!(encode_to_bytes(&temperature).unwrap(), b"4:21.5");
//! ```
//!
//! Hook failures surface as `CustomHook` errors with the hook's error as their source.

/// Error type returned by hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Decode a value from the exact bytes of its encoding.
pub trait DecodeHook {
    fn decode_hook(&mut self, raw: &[u8]) -> Result<(), HookError>;
}

/// Produce the complete encoding of one value.
pub trait EncodeHook {
    fn encode_hook(&self) -> Result<Vec<u8>, HookError>;
}

/// Implement [`Decode`](crate::Decode) and/or [`Encode`](crate::Encode) through the hook
/// traits: `hook!(Type)` for both directions, `hook!(decode Type)` or `hook!(encode Type)` for
/// one.
#[macro_export]
macro_rules! hook {
    (decode $type:ty) => {
        impl $crate::decoding::Decode for $type {
            const SHAPE: $crate::shape::Shape = $crate::shape::Shape::Custom;

            fn decode_tokens(
                &mut self,
                tokens: &mut $crate::decoding::Lexer<'_>,
            ) -> ::std::result::Result<(), $crate::decoding::Error> {
                let raw = tokens.capture_raw()?;
                $crate::decoding::Decode::decode_raw(self, raw)
            }

            fn decode_raw(&mut self, raw: &[u8]) -> ::std::result::Result<(), $crate::decoding::Error> {
                $crate::hook::DecodeHook::decode_hook(self, raw)
                    .map_err($crate::decoding::Error::custom_hook)
            }
        }
    };
    (encode $type:ty) => {
        impl $crate::encoding::Encode for $type {
            const SHAPE: $crate::shape::Shape = $crate::shape::Shape::Custom;

            fn encode(
                &self,
                encoder: $crate::encoding::SingleItemEncoder,
            ) -> ::std::result::Result<(), $crate::encoding::Error> {
                let bytes = $crate::hook::EncodeHook::encode_hook(self)
                    .map_err($crate::encoding::Error::custom_hook)?;
                encoder.emit_raw(&bytes)
            }
        }
    };
    ($type:ty) => {
        $crate::hook!(decode $type);
        $crate::hook!(encode $type);
    };
}
