use std::fmt::Display;

use thiserror::Error;

use crate::ErrorKind;

/// The input (or an emitted token stream) is not well-formed bencode.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Error)]
pub enum StructureError {
    /// A byte that cannot start or continue the current construct.
    #[error("Malformed input: {detail}")]
    MalformedInput { detail: String },

    /// A string length that is missing, not a number, or longer than the remaining input.
    #[error("Invalid string length: {detail}")]
    InvalidLength { detail: String },

    /// An `e` where it is not allowed, or input ending in the middle of a value.
    #[error("Unexpected terminator: {detail}")]
    UnexpectedTerminator { detail: String },

    /// Something other than a byte string in dictionary key position.
    #[error("Dictionary keys must be strings, found {found} at offset {offset}")]
    InvalidKeyType { found: &'static str, offset: usize },

    /// Dictionary keys emitted out of order.
    #[error("Keys were not sorted: {key:?} emitted after a greater or equal key")]
    UnsortedKeys { key: String },

    /// Exceeded the recursion limit.
    #[error("Maximum nesting depth exceeded")]
    NestingTooDeep,
}

impl StructureError {
    pub fn unexpected(expected: impl Display, got: char, offset: usize) -> Self {
        StructureError::MalformedInput {
            detail: format!("Expected {expected}, got {got:?} at offset {offset}"),
        }
    }

    pub fn invalid_length(detail: impl Display) -> Self {
        StructureError::InvalidLength {
            detail: detail.to_string(),
        }
    }

    pub fn terminator(detail: impl Display) -> Self {
        StructureError::UnexpectedTerminator {
            detail: detail.to_string(),
        }
    }

    /// Input ran out; `context` says where, e.g. "inside a list".
    pub fn eof(context: impl Display) -> Self {
        StructureError::UnexpectedTerminator {
            detail: format!("Reached EOF {context}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StructureError::MalformedInput { .. } => ErrorKind::MalformedInput,
            StructureError::InvalidLength { .. } => ErrorKind::InvalidLength,
            StructureError::UnexpectedTerminator { .. } => ErrorKind::UnexpectedTerminator,
            StructureError::InvalidKeyType { .. } => ErrorKind::InvalidKeyType,
            StructureError::UnsortedKeys { .. } => ErrorKind::UnencodableShape,
            StructureError::NestingTooDeep => ErrorKind::NestingTooDeep,
        }
    }
}
