//! Descriptions of destination types, consulted by the decode and encode engines.
//!
//! Every [`Decode`](crate::Decode) and [`Encode`](crate::Encode) type carries a constant
//! [`Shape`] saying which bencode values it can hold. Records additionally describe their fields
//! with a [`RecordShape`], built once per type and then shared.

use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    str,
};

use crate::state_tracker::Token;

/// The kind of value a destination can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A fixed-width integer.
    Integer(IntShape),
    /// A boolean; how integers (and possibly strings) map to it.
    Boolean(Truthiness),
    /// UTF-8 text.
    Text,
    /// Arbitrary bytes.
    Bytes,
    /// A homogeneous list.
    Sequence,
    /// A dictionary with homogeneous values.
    Associative,
    /// A type with named fields, see [`RecordShape`].
    Record,
    /// The dynamic [`Value`](crate::Value) tree, which accepts anything.
    Dynamic,
    /// The exact bytes of one value, see [`RawValue`](crate::RawValue).
    Raw,
    /// A type with its own hooks, see [`hook!`](crate::hook).
    Custom,
}

/// Width and signedness of an integer destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntShape {
    pub signed: bool,
    pub bits: u32,
}

/// How a boolean destination interprets tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Truthiness {
    /// Integers only; any nonzero integer is `true`.
    NonZero,
    /// `i0e`/`i1e` or the strings `n`/`y`; anything else is an error.
    YesNo,
}

impl Shape {
    /// Whether a value starting with `token` may be decoded into this shape.
    pub fn accepts(&self, token: &Token<'_>) -> bool {
        match (self, token) {
            (_, Token::ListEnd | Token::DictEnd) => false,
            (Shape::Dynamic | Shape::Raw | Shape::Custom, _) => true,
            (Shape::Integer(_) | Shape::Boolean(_), Token::Integer(_)) => true,
            (Shape::Boolean(Truthiness::YesNo), Token::String(_)) => true,
            (Shape::Text | Shape::Bytes, Token::String(_)) => true,
            (Shape::Sequence, Token::ListStart) => true,
            (Shape::Associative | Shape::Record, Token::DictStart) => true,
            _ => false,
        }
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Integer(int) => write!(f, "integer ({int})"),
            Shape::Boolean(_) => f.write_str("boolean"),
            Shape::Text => f.write_str("text"),
            Shape::Bytes => f.write_str("byte string"),
            Shape::Sequence => f.write_str("list"),
            Shape::Associative => f.write_str("dictionary"),
            Shape::Record => f.write_str("record"),
            Shape::Dynamic => f.write_str("dynamic value"),
            Shape::Raw => f.write_str("raw value"),
            Shape::Custom => f.write_str("custom value"),
        }
    }
}

impl Display for IntShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.signed { 'i' } else { 'u' };
        write!(f, "{sign}{}", self.bits)
    }
}

/// One field of a record.
///
/// Built with `const` methods so [`record!`](crate::record) can chain the options written on a
/// field: `FieldShape::new("name").renamed("wire").omit_empty()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldShape {
    name: &'static str,
    tag: Option<&'static str>,
    omit_empty: bool,
    writable: bool,
}

/// The tag that hides a field from the wire in both directions.
pub const SKIP_TAG: &str = "-";

impl FieldShape {
    pub const fn new(name: &'static str) -> Self {
        FieldShape {
            name,
            tag: None,
            omit_empty: false,
            writable: true,
        }
    }

    /// Use `tag` as the dictionary key instead of the field name. The tag `"-"` skips the field.
    pub const fn renamed(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Leave the field out of the encoding while it holds its empty value.
    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Reject inputs that try to set this field.
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The dictionary key this field is written under.
    pub fn wire_name(&self) -> &'static str {
        self.tag.unwrap_or(self.name)
    }

    pub fn is_skipped(&self) -> bool {
        self.tag == Some(SKIP_TAG)
    }

    pub fn omits_empty(&self) -> bool {
        self.omit_empty
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// Field table of a record, with lookup indexes for decoding and the canonical encode order.
#[derive(Clone, Debug)]
pub struct RecordShape {
    name: &'static str,
    fields: Vec<FieldShape>,
    by_tag: HashMap<&'static [u8], usize>,
    by_name: HashMap<&'static [u8], usize>,
    by_folded_name: HashMap<String, usize>,
    encode_order: Vec<usize>,
}

impl RecordShape {
    pub fn new(name: &'static str, fields: Vec<FieldShape>) -> Self {
        let mut by_tag = HashMap::new();
        let mut by_name = HashMap::new();
        let mut by_folded_name = HashMap::new();

        for (index, field) in fields.iter().enumerate() {
            if field.is_skipped() {
                continue;
            }
            match field.tag {
                Some(tag) => {
                    by_tag.entry(tag.as_bytes()).or_insert(index);
                },
                None => {
                    by_name.entry(field.name.as_bytes()).or_insert(index);
                    by_folded_name
                        .entry(field.name.to_lowercase())
                        .or_insert(index);
                },
            }
        }

        let mut encode_order: Vec<usize> = (0..fields.len())
            .filter(|&index| !fields[index].is_skipped())
            .collect();
        encode_order.sort_by_key(|&index| fields[index].wire_name().as_bytes());

        RecordShape {
            name,
            fields,
            by_tag,
            by_name,
            by_folded_name,
            encode_order,
        }
    }

    /// Name of the record type, for error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Find the field a dictionary key refers to.
    ///
    /// Tags are tried first, and only when the key is a well-formed tag. Untagged fields then
    /// match by exact name, and finally by name ignoring case.
    pub fn resolve(&self, key: &[u8]) -> Option<&FieldShape> {
        let index = is_valid_tag(key)
            .then(|| self.by_tag.get(key))
            .flatten()
            .or_else(|| self.by_name.get(key))
            .copied()
            .or_else(|| {
                let key = str::from_utf8(key).ok()?;
                self.by_folded_name.get(&key.to_lowercase()).copied()
            })?;
        self.fields.get(index)
    }

    /// Fields in the order they are encoded: ascending by wire name, skipped fields left out.
    pub fn encode_order(&self) -> impl Iterator<Item = &FieldShape> {
        self.encode_order.iter().map(|&index| &self.fields[index])
    }
}

/// Tags are non-empty and made of letters, digits, spaces, `$`, `-` and `_`.
pub fn is_valid_tag(tag: &[u8]) -> bool {
    !tag.is_empty()
        && str::from_utf8(tag).is_ok_and(|tag| {
            tag.chars()
                .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '$' | '-' | '_'))
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn shape() -> RecordShape {
        RecordShape::new(
            "Sample",
            vec![
                FieldShape::new("zebra"),
                FieldShape::new("apple").renamed("b"),
                FieldShape::new("hidden").renamed(SKIP_TAG),
                FieldShape::new("Mixed"),
                FieldShape::new("dotted").renamed("a.b"),
            ],
        )
    }

    #[test]
    fn tags_take_priority_over_names() {
        assert_eq!(shape().resolve(b"b").map(FieldShape::name), Some("apple"));
    }

    #[test]
    fn tagged_fields_do_not_match_by_name() {
        assert_eq!(shape().resolve(b"apple"), None);
    }

    #[test]
    fn names_match_ignoring_case() {
        assert_eq!(shape().resolve(b"ZEBRA").map(FieldShape::name), Some("zebra"));
        assert_eq!(shape().resolve(b"mixed").map(FieldShape::name), Some("Mixed"));
    }

    #[test]
    fn skipped_fields_are_invisible() {
        assert_eq!(shape().resolve(b"hidden"), None);
        assert_eq!(shape().resolve(b"-"), None);
        assert!(shape().encode_order().all(|field| !field.is_skipped()));
    }

    #[test]
    fn malformed_tags_never_match() {
        assert_eq!(shape().resolve(b"a.b"), None);
    }

    #[test]
    fn encode_order_follows_wire_names() {
        let names: Vec<_> = shape().encode_order().map(FieldShape::wire_name).collect();
        assert_eq!(names, vec!["Mixed", "a.b", "b", "zebra"]);
    }

    #[test]
    fn tag_validity() {
        assert!(is_valid_tag(b"info hash$-_1"));
        assert!(!is_valid_tag(b""));
        assert!(!is_valid_tag(b"a,b"));
        assert!(!is_valid_tag(b"\xff"));
    }

    #[test]
    fn shapes_accept_matching_tokens() {
        let int = Shape::Integer(IntShape {
            signed: true,
            bits: 32,
        });
        assert!(int.accepts(&Token::Integer("5")));
        assert!(!int.accepts(&Token::String(b"5")));
        assert!(Shape::Boolean(Truthiness::YesNo).accepts(&Token::String(b"y")));
        assert!(!Shape::Boolean(Truthiness::NonZero).accepts(&Token::String(b"y")));
        assert!(Shape::Record.accepts(&Token::DictStart));
        assert!(!Shape::Dynamic.accepts(&Token::ListEnd));
        assert_eq!(int.to_string(), "integer (i32)");
    }
}
