use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by corpus mutation and generation runs.
///
/// I/O failures are fatal to the run that hit them and carry the pipeline
/// stage plus the file involved; corpus content never appears in messages.
#[derive(Debug, Error)]
pub enum WordmillError {
    #[error("{stage}: {}: {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, WordmillError>;

impl WordmillError {
    /// Adapter for `map_err`: tag an `io::Error` with stage and path context.
    pub fn io<'a>(stage: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> WordmillError + 'a {
        move |source| WordmillError::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }
}
