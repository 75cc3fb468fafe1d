//! Error types for the memcol engine.

use crate::types::ColumnType;
use alloc::string::String;
use core::fmt;

/// Result type alias for memcol operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for memcol operations.
///
/// Only recoverable conditions are represented here. Contract violations
/// (for example comparing a nullable key column) panic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Memory for a buffer could not be obtained.
    AllocFailed {
        bytes: usize,
    },
    /// Type mismatch error.
    TypeMismatch {
        expected: ColumnType,
        got: ColumnType,
    },
    /// Null written to a non-nullable column.
    NullConstraint {
        column: String,
    },
    /// Column, cell or other named item not found.
    NotFound {
        what: String,
    },
    /// Invalid argument supplied by the caller.
    InvalidArgument {
        message: String,
    },
    /// Operation or type not supported.
    NotSupported {
        message: String,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Requested version precedes the column's base version, or a delta
    /// was published out of order.
    InvalidVersion {
        requested: u64,
        base: u64,
    },
    /// A fixed-capacity container is full.
    OverCapacity {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocFailed { bytes } => {
                write!(f, "Allocation failed: {} bytes", bytes)
            }
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Error::NullConstraint { column } => {
                write!(f, "Null constraint violation on column: {}", column)
            }
            Error::NotFound { what } => {
                write!(f, "Not found: {}", what)
            }
            Error::InvalidArgument { message } => {
                write!(f, "Invalid argument: {}", message)
            }
            Error::NotSupported { message } => {
                write!(f, "Not supported: {}", message)
            }
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
            Error::InvalidVersion { requested, base } => {
                write!(f, "Invalid version {} (base version {})", requested, base)
            }
            Error::OverCapacity { message } => {
                write!(f, "Over capacity: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates an allocation failure error.
    pub fn alloc_failed(bytes: usize) -> Self {
        Error::AllocFailed { bytes }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: ColumnType, got: ColumnType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not supported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Error::NotSupported {
            message: message.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an invalid version error.
    pub fn invalid_version(requested: u64, base: u64) -> Self {
        Error::InvalidVersion { requested, base }
    }

    /// Creates an over capacity error.
    pub fn over_capacity(message: impl Into<String>) -> Self {
        Error::OverCapacity {
            message: message.into(),
        }
    }
}
