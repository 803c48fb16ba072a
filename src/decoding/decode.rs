use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    rc::Rc,
    str,
};

use crate::{
    decoding::{Error, Lexer, engine},
    shape::{IntShape, Shape, Truthiness},
};

/// Basic trait for decoding bencode into an existing destination.
///
/// Destinations are written in place: the engine checks the next token against
/// [`Decode::SHAPE`] and then hands the lexer to [`Decode::decode_tokens`]. Raw and custom
/// shapes receive the exact bytes of the value through [`Decode::decode_raw`] instead.
pub trait Decode {
    /// What kind of bencode value this destination holds.
    const SHAPE: Shape;

    /// Read one value from `tokens` into `self`.
    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error>;

    /// Store the complete encoding of one value. Only called for [`Shape::Raw`] and
    /// [`Shape::Custom`] destinations; others decode the bytes as tokens.
    fn decode_raw(&mut self, raw: &[u8]) -> Result<(), Error> {
        let mut tokens = Lexer::new(raw);
        engine::decode_into(&mut tokens, self)
    }

    /// Decode a fresh value from its byte representation.
    fn from_bencode(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Default + Sized,
    {
        let mut value = Self::default();
        crate::decode_bytes(bytes, &mut value)?;
        Ok(value)
    }
}

/// Types that a dictionary key can be decoded into.
pub trait MapKey: Sized {
    fn from_key(key: &[u8]) -> Result<Self, Error>;
}

impl MapKey for String {
    fn from_key(key: &[u8]) -> Result<Self, Error> {
        str::from_utf8(key)
            .map(str::to_owned)
            .map_err(|_| Error::type_mismatch(Shape::Text, "non-UTF-8 dictionary key"))
    }
}

impl MapKey for Vec<u8> {
    fn from_key(key: &[u8]) -> Result<Self, Error> {
        Ok(key.to_vec())
    }
}

macro_rules! impl_decode_for_integer {
    ($($type:ty)*) => {$(
        impl Decode for $type {
            const SHAPE: Shape = Shape::Integer(IntShape {
                signed: <$type>::MIN != 0,
                bits: <$type>::BITS,
            });

            fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
                *self = engine::decode_integer(tokens, Self::SHAPE)?;
                Ok(())
            }
        }
    )*}
}

impl_decode_for_integer!(u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize);

impl Decode for bool {
    const SHAPE: Shape = Shape::Boolean(Truthiness::NonZero);

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        *self = engine::decode_bool(tokens, Truthiness::NonZero)?;
        Ok(())
    }
}

impl Decode for String {
    const SHAPE: Shape = Shape::Text;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        let text = engine::decode_text(tokens)?;
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

impl<ContentT: Decode + Default> Decode for Vec<ContentT> {
    const SHAPE: Shape = Shape::Sequence;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        engine::decode_sequence(tokens, self)
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Decode + Default,
{
    const SHAPE: Shape = Shape::Associative;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        self.clear();
        engine::decode_associative(tokens, |key, value| {
            self.insert(key, value);
        })
    }
}

impl<K, V, H> Decode for HashMap<K, V, H>
where
    K: MapKey + Hash + Eq,
    V: Decode + Default,
    H: BuildHasher,
{
    const SHAPE: Shape = Shape::Associative;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        self.clear();
        engine::decode_associative(tokens, |key, value| {
            self.insert(key, value);
        })
    }
}

/// Absent values are allocated when the input provides one; an existing value is decoded into.
impl<T: Decode + Default> Decode for Option<T> {
    const SHAPE: Shape = T::SHAPE;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        self.get_or_insert_with(T::default).decode_tokens(tokens)
    }

    fn decode_raw(&mut self, raw: &[u8]) -> Result<(), Error> {
        self.get_or_insert_with(T::default).decode_raw(raw)
    }
}

impl<T: Decode + ?Sized> Decode for Box<T> {
    const SHAPE: Shape = T::SHAPE;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        self.as_mut().decode_tokens(tokens)
    }

    fn decode_raw(&mut self, raw: &[u8]) -> Result<(), Error> {
        self.as_mut().decode_raw(raw)
    }
}

/// Shared values are replaced by a freshly decoded one.
impl<T: Decode + Default> Decode for Rc<T> {
    const SHAPE: Shape = T::SHAPE;

    fn decode_tokens(&mut self, tokens: &mut Lexer<'_>) -> Result<(), Error> {
        let mut value = T::default();
        value.decode_tokens(tokens)?;
        *self = Rc::new(value);
        Ok(())
    }

    fn decode_raw(&mut self, raw: &[u8]) -> Result<(), Error> {
        let mut value = T::default();
        value.decode_raw(raw)?;
        *self = Rc::new(value);
        Ok(())
    }
}
