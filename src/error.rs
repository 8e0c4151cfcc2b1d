use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that may go wrong while fetching a single image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that stop a run before any download is attempted
#[derive(Debug, Error)]
pub enum RunError {
    #[error("unable to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}
