use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Errors that can occur in the logging library
#[derive(ThisError, Debug)]
pub enum Error {
    /// The directory holding the log file could not be created.
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The log file could not be created or opened at construction.
    #[error("failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Neither the log path nor its fallback could be opened after a rotation.
    #[error(
        "failed to reopen log file {} (fallback {}): {source}",
        .path.display(),
        .fallback.display()
    )]
    Reopen {
        path: PathBuf,
        fallback: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A record's arguments failed to format.
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
    /// A date or time could not be formatted.
    #[error("Time error: {0}")]
    Time(#[from] time::error::Format),
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Initialization failed.
    #[error("Initialization error: {0}")]
    Init(String),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => std::io::Error::other(other),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
