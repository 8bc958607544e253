//! Error types for the store crate.
//!
//! All load and mutation paths report failures through [`StoreError`];
//! read paths never fail — unknown ids resolve to `None` or empty sets
//! so callers cannot distinguish "hidden" from "nonexistent".

use thiserror::Error;

/// Errors that can occur while loading a snapshot or mutating the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Snapshot file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a snapshot file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a snapshot file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had an invalid value (e.g. difficulty outside 1-5)
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A unique field collided (username, email, share token, id)
    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    /// Referenced entity doesn't exist (e.g. recipe with unknown author)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u64 },

    /// A store invariant was violated by a mutation
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
