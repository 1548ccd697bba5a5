//! Error types for input staging.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while staging an input file.
#[derive(Debug, Error)]
pub enum StageError {
    /// Selected file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
