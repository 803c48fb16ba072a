use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    hash::BuildHasher,
    rc::Rc,
    sync::Arc,
};

use crate::{
    encoding::{Encoder, Error, SingleItemEncoder},
    record::Record,
    shape::{IntShape, Shape, Truthiness},
};

/// An object that can be encoded into a single bencode object
pub trait Encode {
    /// What kind of bencode value this object produces.
    const SHAPE: Shape;

    /// Encode this object into the bencode stream
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error>;

    /// Whether this is the empty value of its type: zero, false, an empty string or
    /// container, or an absent value. Record fields marked to omit empties skip such values.
    fn is_empty_value(&self) -> bool {
        false
    }

    /// Encode this object to a byte string
    fn to_bencode(&self) -> Result<Vec<u8>, Error> {
        let mut encoder = Encoder::new();
        encoder.emit_with(|e| self.encode(e))?;

        encoder.finish()
    }
}

/// Encode the fields of a record as a dictionary ordered by wire name.
///
/// Skipped fields are never written; fields marked to omit empties are left out while
/// holding their empty value.
pub fn encode_record<R: Record + ?Sized>(record: &R, encoder: SingleItemEncoder) -> Result<(), Error> {
    let shape = R::record_shape();
    encoder.emit_dict(|mut e| {
        for field in shape.encode_order() {
            if field.omits_empty() && record.field_is_empty(field.name()) {
                continue;
            }
            e.emit_pair_with(field.wire_name().as_bytes(), |e| {
                record.encode_field(field.name(), e)
            })?;
        }
        Ok(())
    })
}

// Forwarding impls
impl<E: Encode + ?Sized> Encode for &E {
    const SHAPE: Shape = E::SHAPE;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        E::encode(self, encoder)
    }

    fn is_empty_value(&self) -> bool {
        E::is_empty_value(self)
    }
}

macro_rules! impl_encodable_pointer {
    ($($type:ident)*) => {$(
        impl<E: Encode + ?Sized> Encode for $type<E> {
            const SHAPE: Shape = E::SHAPE;

            fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
                E::encode(self, encoder)
            }

            fn is_empty_value(&self) -> bool {
                E::is_empty_value(self)
            }
        }
    )*}
}

impl_encodable_pointer!(Box Rc Arc);

/// `None` is only encodable when a record leaves it out.
impl<E: Encode> Encode for Option<E> {
    const SHAPE: Shape = E::SHAPE;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        match self {
            Some(value) => value.encode(encoder),
            None => Err(Error::unencodable(E::SHAPE, "absent value")),
        }
    }

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

// Base type impls
impl Encode for str {
    const SHAPE: Shape = Shape::Text;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        encoder.emit_str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for String {
    const SHAPE: Shape = Shape::Text;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        encoder.emit_str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for bool {
    const SHAPE: Shape = Shape::Boolean(Truthiness::NonZero);

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        encoder.emit_int(u8::from(*self))
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

macro_rules! impl_encodable_integer {
    ($($type:ty)*) => {$(
        impl Encode for $type {
            const SHAPE: Shape = Shape::Integer(IntShape {
                signed: <$type>::MIN != 0,
                bits: <$type>::BITS,
            });

            fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
                encoder.emit_int(*self)
            }

            fn is_empty_value(&self) -> bool {
                *self == 0
            }
        }
    )*}
}

impl_encodable_integer!(u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize);

macro_rules! impl_encodable_iterable {
    ($($type:ident)*) => {$(
        impl<ContentT> Encode for $type<ContentT>
        where
            ContentT: Encode,
        {
            const SHAPE: Shape = Shape::Sequence;

            fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
                encoder.emit_list(|e| {
                    for item in self {
                        e.emit(item)?;
                    }
                    Ok(())
                })
            }

            fn is_empty_value(&self) -> bool {
                self.is_empty()
            }
        }
    )*}
}

impl_encodable_iterable!(Vec VecDeque);

impl<ContentT: Encode> Encode for [ContentT] {
    const SHAPE: Shape = Shape::Sequence;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        encoder.emit_list(|e| {
            for item in self {
                e.emit(item)?;
            }
            Ok(())
        })
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: AsRef<[u8]>, V: Encode> Encode for BTreeMap<K, V> {
    const SHAPE: Shape = Shape::Associative;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        // Ord on K need not agree with byte order, so sort by the bytes themselves
        let mut pairs: Vec<(&[u8], &V)> = self.iter().map(|(k, v)| (k.as_ref(), v)).collect();
        pairs.sort_by_key(|&(k, _)| k);
        encode_pairs(pairs, encoder)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Encode for HashMap<K, V, S>
where
    K: AsRef<[u8]>,
    V: Encode,
    S: BuildHasher,
{
    const SHAPE: Shape = Shape::Associative;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), Error> {
        let mut pairs: Vec<(&[u8], &V)> = self.iter().map(|(k, v)| (k.as_ref(), v)).collect();
        pairs.sort_by_key(|&(k, _)| k);
        encode_pairs(pairs, encoder)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

fn encode_pairs<V: Encode>(pairs: Vec<(&[u8], &V)>, encoder: SingleItemEncoder) -> Result<(), Error> {
    encoder.emit_dict(|mut e| {
        for (k, v) in pairs {
            e.emit_pair(k, v)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ErrorKind, scalar::ByteString};

    #[test]
    fn scalars() {
        assert_eq!(42u8.to_bencode().unwrap(), b"i42e");
        assert_eq!((-7i64).to_bencode().unwrap(), b"i-7e");
        assert_eq!(u128::MAX.to_bencode().unwrap(), b"i340282366920938463463374607431768211455e");
        assert_eq!(true.to_bencode().unwrap(), b"i1e");
        assert_eq!(false.to_bencode().unwrap(), b"i0e");
        assert_eq!("spam".to_bencode().unwrap(), b"4:spam");
    }

    #[test]
    fn sequences() {
        assert_eq!(vec![1, 2].to_bencode().unwrap(), b"li1ei2ee");
        assert_eq!(Vec::<String>::new().to_bencode().unwrap(), b"le");
        assert_eq!([3u8][..].to_bencode().unwrap(), b"li3ee");
    }

    #[test]
    fn hash_map_keys_are_sorted() {
        let mut map = HashMap::new();
        for key in ["zz", "a", "m", "ab"] {
            map.insert(key.to_owned(), key.len());
        }
        assert_eq!(
            map.to_bencode().unwrap(),
            b"d1:ai1e2:abi2e1:mi1e2:zzi2ee"
        );
    }

    #[test]
    fn btree_map_with_byte_keys() {
        let mut map = BTreeMap::new();
        map.insert(ByteString::from(&b"\xff"[..]), 1);
        map.insert(ByteString::from(&b"a"[..]), 2);
        assert_eq!(map.to_bencode().unwrap(), b"d1:ai2e1:\xffi1ee");
    }

    #[test]
    fn absent_values_cannot_be_encoded() {
        let error = None::<i32>.to_bencode().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnencodableShape);
        assert_eq!(Some(5).to_bencode().unwrap(), b"i5e");
    }

    #[test]
    fn empty_values() {
        assert!(0u32.is_empty_value());
        assert!(!1i8.is_empty_value());
        assert!(String::new().is_empty_value());
        assert!(Vec::<u8>::new().is_empty_value());
        assert!(None::<String>.is_empty_value());
        assert!(!Some(0).is_empty_value());
    }
}
