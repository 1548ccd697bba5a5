//! Error types for the engine module.

use thiserror::Error;

/// Errors that can occur while driving the external engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine binary could not be located.
    #[error("engine binary not found: {0}")]
    BinaryNotFound(String),

    /// Engine was found but the readiness probe failed.
    #[error("engine probe failed: {0}")]
    LoadFailed(String),

    /// Operation requires a loaded engine.
    #[error("engine not loaded")]
    NotLoaded,

    /// Virtual file names form a flat namespace.
    #[error("invalid virtual file name: {0:?}")]
    InvalidFileName(String),

    /// Virtual file could not be read or written.
    #[error("virtual file {name:?}: {source}")]
    VirtualFile {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine workspace directory could not be created.
    #[error("failed to create engine workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// Engine process could not be spawned or awaited.
    #[error("failed to run engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// Engine ran but exited with an error.
    #[error("engine invocation failed ({status}): {stderr}")]
    Invocation {
        /// Exit status description.
        status: String,

        /// Captured diagnostic output.
        stderr: String,
    },
}
