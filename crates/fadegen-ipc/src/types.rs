//! Common types used across IPC messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::{EngineStatus, TaskState};

/// MIME type of every produced video artifact.
pub const VIDEO_MIME: &str = "video/mp4";

/// File name under which an artifact is saved on download.
pub const DOWNLOAD_FILE_NAME: &str = "fade-video.mp4";

/// Identifier of a published, revocable resource.
///
/// The id is only meaningful to the publisher that issued it; once released
/// it never becomes valid again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

/// A staged input image, as presented to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Original file name of the selection.
    pub file_name: String,

    /// Sniffed MIME type (octet-stream when unrecognized).
    pub mime: String,

    /// Size of the staged bytes.
    pub len: u64,

    /// Browser-displayable preview (`data:` URI).
    pub preview: String,
}

/// A produced video, playable and downloadable through its resource id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoArtifact {
    /// Handle into the result publisher.
    pub resource: ResourceId,

    /// Always `video/mp4` for this pipeline.
    pub mime: String,

    /// Size of the encoded output.
    pub len: u64,
}

/// Full session state, answered to [`SessionCommand::GetState`].
///
/// [`SessionCommand::GetState`]: crate::SessionCommand::GetState
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Engine lifecycle status.
    pub engine: EngineStatus,

    /// Currently staged image, if any.
    pub image: Option<ImageInfo>,

    /// Current conversion task state.
    pub task: TaskState,

    /// Current published result, if any.
    pub result: Option<VideoArtifact>,
}

/// A completed download, reported back to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Where the artifact was written.
    pub path: PathBuf,

    /// Bytes written.
    pub len: u64,
}
