//! Commands sent from the shell to the session.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Commands that a shell can send to the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Stage a newly picked image, discarding any prior result.
    SelectImage {
        /// Path delivered by the host's file picker.
        path: PathBuf,
    },

    /// Run the fade conversion on the staged image.
    Generate,

    /// Save the current result as `fade-video.mp4` under the given directory.
    Download {
        /// Target directory chosen by the user.
        dest_dir: PathBuf,
    },

    /// Request a full state snapshot.
    GetState,

    /// Release all resources and end the session.
    Shutdown,
}
