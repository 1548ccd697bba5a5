//! Events sent from the session to the shell.

use serde::{Deserialize, Serialize};

use crate::state::{EngineStatus, TaskState};
use crate::types::{DownloadInfo, ImageInfo, SessionSnapshot, VideoArtifact};

/// Events that the session can send to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Engine lifecycle status changed.
    EngineStatus {
        /// Previous status.
        previous: Box<EngineStatus>,

        /// Current status.
        current: Box<EngineStatus>,
    },

    /// A new image was staged.
    ImageSelected(ImageInfo),

    /// The conversion task changed state.
    TaskState {
        /// Previous state.
        previous: Box<TaskState>,

        /// Current state.
        current: Box<TaskState>,
    },

    /// Progress report for the running task (monotonic per task).
    Progress {
        /// Percentage in 0-100.
        percent: u8,
    },

    /// A conversion finished and its output is playable/downloadable.
    ResultReady(VideoArtifact),

    /// An artifact was saved to disk.
    Downloaded(DownloadInfo),

    /// Answer to a state request.
    State(SessionSnapshot),

    /// Session finished engine setup and accepts commands.
    Ready,

    /// Session has released its resources and stopped.
    Shutdown,
}
