use std::fmt::Display;

/// A value that can be written as the body of an `i...e` integer.
///
/// Rust integers never format as `-0` or with leading zeros, so their `Display` output is
/// already canonical.
pub trait PrintableInteger: Copy + Display {}

macro_rules! impl_integer {
    ($($type:ty)*) => {$(
        impl PrintableInteger for $type {}
    )*}
}

impl_integer!(u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize);
