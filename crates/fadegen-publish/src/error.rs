//! Error types for result publishing.

use std::path::PathBuf;

use fadegen_ipc::ResourceId;
use thiserror::Error;

/// Errors that can occur while working with published resources.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Resource id was never issued or has already been released.
    #[error("unknown or released resource {0:?}")]
    UnknownResource(ResourceId),

    /// Artifact could not be written to its download target.
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
