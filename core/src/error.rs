use std::path::PathBuf;
use thiserror::Error;

/// Error type for index, query, configuration and persistence operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read document {document}: {source}")]
    DocumentRead {
        document: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("incompatible index snapshot: version {actual}, expected {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn read(document: &str, source: std::io::Error) -> Self {
        Error::DocumentRead { document: document.to_string(), source }
    }

    /// True when the error only concerns a single document.
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::DocumentRead { .. })
    }
}
