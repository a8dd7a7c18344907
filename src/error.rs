//! Error types for jast.
//!
//! Per-file failures (`ParseFailure`, `MissingCategoryMapping`) are reported to the
//! pipeline, which turns them into "no features" for that file. `UnknownLiteralType`
//! never leaves the extractor; it is logged and the node is skipped.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for jast domain operations.
pub type Result<T> = std::result::Result<T, JastError>;

#[derive(Error, Debug)]
pub enum JastError {
    /// The external parser failed, or its output could not be used.
    #[error("parser could not produce an AST for {}: {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    /// A literal node has neither a typed `value` nor a `regex` attribute.
    #[error("literal {raw} has an unknown type")]
    UnknownLiteralType { raw: String },

    /// A node kind is missing from the unit table.
    #[error("node kind `{0}` has no category mapping")]
    MissingCategoryMapping(String),

    /// A tree that was already built was handed to the builder again.
    #[error("tree root {0} has already been built; a fresh root is required per build")]
    SharedRootReuse(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("feature store error: {0}")]
    Store(String),
}

impl JastError {
    pub fn parse_failure(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        JastError::ParseFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<sled::Error> for JastError {
    fn from(e: sled::Error) -> Self {
        JastError::Store(e.to_string())
    }
}

impl From<bincode::Error> for JastError {
    fn from(e: bincode::Error) -> Self {
        JastError::Store(e.to_string())
    }
}
