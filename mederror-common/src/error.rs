//! Common error types for MedError

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for MedError operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by loaders, exporters and configuration.
///
/// Reference lookups against the taxonomy never produce an error; see
/// [`crate::editor::reassign`].
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a user-selected file failed
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid YAML/JSON or does not match the expected schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export serialization failure
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// True for errors caused by the content of a user file
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

/// Read a user-selected file into a string, tagging failures with the path
pub fn read_user_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
