//! # Error Types
//!
//! Errors raised while constructing core primitives. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error constructing a core primitive from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A dotted field path was empty or contained an empty segment.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path text.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// A type name outside the closed taxonomy.
    #[error("unknown type name '{0}'")]
    UnknownType(String),
}
