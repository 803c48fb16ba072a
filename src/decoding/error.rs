use std::{io, num::ParseIntError, sync::Arc};

use thiserror::Error;

use crate::{ErrorKind, shape::Shape, state_tracker::StructureError};

/// An enumeration of potential errors that appear during bencode decoding.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error in the bencode structure (e.g. a missing end separator).
    #[error("bencode structure corrupted: {source}")]
    Structure { source: StructureError },

    /// The value in the input cannot be stored in the destination's shape.
    #[error("cannot decode {found} into {expected}")]
    TypeMismatch { expected: Shape, found: String },

    /// An integer does not fit the destination's width or signedness.
    #[error("cannot parse {text:?} as {shape}")]
    NumericParse {
        text: String,
        shape: Shape,
        source: Option<ParseIntError>,
    },

    /// A dictionary key resolved to a field that may not be written.
    #[error("field `{field}` of {record} cannot be written")]
    UnwritableField { record: &'static str, field: String },

    /// A user decode hook rejected its raw bytes.
    #[error("custom decoder failed: {source}")]
    CustomHook {
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Reading the byte source failed.
    #[error("failed to read bencode source: {source}")]
    Io { source: Arc<io::Error> },
}

impl Error {
    pub fn type_mismatch(expected: Shape, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected,
            found: found.into(),
        }
    }

    pub fn numeric_parse(text: &str, shape: Shape, source: Option<ParseIntError>) -> Self {
        Error::NumericParse {
            text: text.to_owned(),
            shape,
            source,
        }
    }

    /// Wrap the failure of a user hook. The hook's error stays reachable through
    /// [`std::error::Error::source`].
    pub fn custom_hook<SourceT>(source: SourceT) -> Self
    where
        SourceT: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::CustomHook {
            source: Arc::from(source.into()),
        }
    }

    pub fn io(source: io::Error) -> Self {
        Error::Io {
            source: Arc::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structure { source } => source.kind(),
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::NumericParse { .. } => ErrorKind::NumericParse,
            Error::UnwritableField { .. } => ErrorKind::UnwritableField,
            Error::CustomHook { .. } => ErrorKind::CustomHook,
            Error::Io { .. } => ErrorKind::Io,
        }
    }
}

impl From<StructureError> for Error {
    fn from(error: StructureError) -> Self {
        Error::Structure { source: error }
    }
}

#[test]
fn decoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}
