//! Typed shell<->session messages for fadegen.
//!
//! This crate defines all the message types exchanged between a user-facing
//! shell and the conversion session, plus the bounded channels that carry
//! them. It is the complete integration surface a shell needs.

mod commands;
mod events;
mod state;
mod types;

pub use commands::SessionCommand;
pub use events::SessionEvent;
pub use state::{EngineStatus, TaskState};
pub use types::{
    DownloadInfo, ImageInfo, ResourceId, SessionSnapshot, VideoArtifact, DOWNLOAD_FILE_NAME,
    VIDEO_MIME,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (shell -> session).
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for events (session -> shell).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<SessionCommand>, Receiver<SessionCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<SessionEvent>, Receiver<SessionEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
