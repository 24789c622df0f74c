//! # Error Types
//!
//! Fatal conditions of the engine. Per-value constraint problems are never
//! errors: they are collected as [`Violation`](crate::Violation)s and
//! returned as data.
//!
//! ## Propagation
//!
//! - Schema-shape problems are fatal and reported once, when the handle is
//!   constructed ([`SchemaError::SchemaInvalid`]).
//! - A custom handler that raises a fault aborts the whole `validate` or
//!   `generate` call ([`SchemaError::Handler`]). A validator that merely
//!   returns `false` is a violation, not a fault.

use recschema_core::{CoreError, JsonType};
use thiserror::Error;

/// Error compiling a pattern for matching or synthesis.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("pattern '{pattern}' does not compile: {reason}")]
    Compile {
        /// Pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The pattern compiles but cannot drive string synthesis.
    #[error("pattern '{pattern}' cannot be synthesized: {reason}")]
    Synthesis {
        /// Pattern source text.
        pattern: String,
        /// Synthesizer diagnostic.
        reason: String,
    },
}

/// Error registering handlers in the named registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry name is not a valid dotted path.
    #[error(transparent)]
    InvalidPath(#[from] CoreError),

    /// A pattern definition did not compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A definition manifest could not be read or parsed.
    #[error("definition manifest load error for '{path}': {reason}")]
    ManifestLoad {
        /// Manifest location.
        path: String,
        /// Reason the manifest could not be loaded.
        reason: String,
    },
}

/// Fault raised by a custom validator or generator.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    /// A fault with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A fault wrapping an underlying error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The fault message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error from a schema handle.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document is not an object schema or lacks `properties`.
    #[error("invalid schema '{schema_name}': {reason}")]
    SchemaInvalid {
        /// Source file name, or `<in-memory>`.
        schema_name: String,
        /// What makes the document unusable.
        reason: String,
    },

    /// The schema document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The candidate record is not a JSON object.
    #[error("record must be an object, found {found}")]
    InvalidRecord {
        /// Runtime kind of the rejected record.
        found: JsonType,
    },

    /// A custom handler raised a fault.
    #[error("handler for '{key}' failed: {source}")]
    Handler {
        /// Full registry key of the failing handler.
        key: String,
        /// The handler's fault.
        #[source]
        source: HandlerError,
    },
}
