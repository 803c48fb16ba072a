use std::{io, sync::Arc};

use thiserror::Error;

use crate::{ErrorKind, shape::Shape, state_tracker::StructureError};

/// An enumeration of potential errors that appear during bencode encoding.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    /// The value has no bencode representation.
    #[error("cannot encode {shape}: {reason}")]
    UnencodableShape { shape: Shape, reason: String },

    /// A user encode hook failed.
    #[error("custom encoder failed: {source}")]
    CustomHook {
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Error in the emitted bencode structure (e.g. unsorted keys or a bad raw value).
    #[error("bencode encoding corrupted: {source}")]
    Structure { source: StructureError },

    /// Writing to the sink failed.
    #[error("failed to write bencode: {source}")]
    Io { source: Arc<io::Error> },
}

impl Error {
    pub fn unencodable(shape: Shape, reason: impl Into<String>) -> Self {
        Error::UnencodableShape {
            shape,
            reason: reason.into(),
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
            Error::UnencodableShape { .. } => ErrorKind::UnencodableShape,
            Error::CustomHook { .. } => ErrorKind::CustomHook,
            Error::Structure { source } => source.kind(),
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
fn encoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}
