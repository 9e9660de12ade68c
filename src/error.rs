//! Error types for the jsonschema-bean-gen crate.

use std::path::PathBuf;

use url::Url;

/// Errors that can occur while generating types from JSON Schema.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced location does not resolve to any schema content.
    #[error("{location}: no schema found at this location")]
    MissingSchema { location: Url },

    /// The schema declares a `type` no generator is registered for.
    #[error("{location}: cannot handle schema type '{kind}'")]
    UnsupportedKind { location: Url, kind: String },

    /// A location that produces no type (`"type": "null"`) was used where a
    /// value type is required, e.g. as a property or array element type.
    #[error("{location}: schema does not produce a type and cannot be referenced")]
    InvalidTypeReference { location: Url },

    /// A generator was handed a schema shape it deliberately does not support.
    #[error("{location}: unsupported: {message}")]
    UnsupportedOperation { location: Url, message: String },

    /// A `$ref` value that is not a string or cannot be resolved against its base.
    #[error("{location}: invalid $ref '{reference}'")]
    InvalidReference { location: Url, reference: String },

    /// Generation of a location failed; `source` holds the cause.
    #[error("{location}: code generation failed")]
    CodeGeneration {
        location: Url,
        #[source]
        source: Box<Error>,
    },

    /// A string could not be parsed as a URI.
    #[error("invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// Invalid engine configuration or mapping file content.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to write generated source files.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parse error with context.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error while fetching a remote schema.
    #[cfg(feature = "download")]
    #[error("download failed: {0}")]
    Download(String),
}

impl Error {
    /// Strip any [`Error::CodeGeneration`] wrappers and return the underlying cause.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::CodeGeneration { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
