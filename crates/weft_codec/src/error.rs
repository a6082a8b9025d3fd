use alloc::string::{String, ToString};
use core::fmt::Display;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Every failure a serialize or deserialize operation can report.
///
/// Any error aborts the whole operation. The backend stream and the partially
/// built graph are left in an unspecified state and should be discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No strategy claims the type.
    #[error("no strategy can handle type `{type_path}`")]
    UnsupportedType { type_path: &'static str },

    /// A runtime type is not assignable to the declared type.
    #[error("type mismatch: expected `{expected}`, found `{actual}`")]
    TypeMismatch { expected: String, actual: String },

    /// A header, tail or value node is missing or out of sequence.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// A type name read from the stream is not registered.
    #[error("type name `{0}` is not registered")]
    UnresolvedTypeName(String),

    /// A value could not be formatted or parsed.
    #[error("cannot convert `{type_path}`: {reason}")]
    ConversionFailure { type_path: String, reason: String },

    /// A descriptor combines settings that cannot work together.
    #[error("invalid descriptor for `{type_path}`: {reason}")]
    InvalidDescriptor { type_path: &'static str, reason: &'static str },

    /// A strategy, override or alias was registered twice.
    #[error("`{0}` is already registered")]
    DuplicateRegistration(String),

    /// Nesting exceeded [`SerializerConfig::max_depth`](crate::SerializerConfig).
    #[error("object graph nested deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },

    /// A stream holds more distinct objects than a `u32` id can number.
    #[error("too many objects in one stream")]
    ObjectIdsExhausted,

    /// A shared object was already mutably borrowed.
    #[error("object of type `{0}` is already borrowed")]
    ObjectBusy(&'static str),

    /// Failure reported by a format backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// `core::result::Result` with [`Error`] as the error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    #[cold]
    pub fn malformed(reason: impl Display) -> Self {
        Self::MalformedStream(reason.to_string())
    }

    #[cold]
    pub fn mismatch(expected: impl Display, actual: impl Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    #[cold]
    pub fn conversion(type_path: impl Display, reason: impl Display) -> Self {
        Self::ConversionFailure {
            type_path: type_path.to_string(),
            reason: reason.to_string(),
        }
    }

    #[cold]
    pub fn backend(reason: impl Display) -> Self {
        Self::Backend(reason.to_string())
    }
}
