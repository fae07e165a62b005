//! Error types for ruledb.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for ruledb operations.
///
/// Every variant is fatal for a load run: the pipeline stops at the first
/// error and hands it back to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a rule file or walking a source directory failed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule file does not match the expected schema
    #[error("JSON decode error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// SQLite error (table creation, pragma, prepare, insert, commit)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Attempted to load an empty record list
    #[error("no records to load into table {table}")]
    EmptyRecords { table: String },

    /// Table name is not a plain SQL identifier
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Source name not present in the configuration
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for ruledb operations.
pub type Result<T> = std::result::Result<T, Error>;
