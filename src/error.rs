// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The linter emitted a line that does not split into path, line
    /// number and message. The separator scheme is broken, so the run
    /// aborts instead of skipping.
    #[error("malformed linter output line {line:?}: expected 3 fields separated by {separator:?}")]
    MalformedFinding { line: String, separator: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("hosting api {operation} failed with status {status}: {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("hosting api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        source: reqwest::Error,
    },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("linter invocation failed: {0}")]
    Linter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// Allow `?` on std::io::Error by converting to Error::Io with unknown path.
impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
