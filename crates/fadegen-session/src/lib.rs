//! Conversion session controller for fadegen.
//!
//! This crate coordinates the engine handle, input staging, the conversion
//! task state machine, and result publishing into one session loop driven
//! over the typed channels of `fadegen-ipc`.

mod controller;
mod resources;
mod task;

pub use controller::Session;
pub use task::{
    fade_argv, ConversionTask, TaskError, FADE_DURATION_SECS, FADE_START_SECS, INPUT_FILE,
    OUTPUT_DURATION_SECS, OUTPUT_FILE,
};

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use fadegen_engine::MediaEngine;
use fadegen_ipc::{SessionCommand, SessionEvent};
use fadegen_publish::ResourcePublisher;

/// Create a session instance with IPC channels and a shared publisher.
pub fn create_session(
    engine: Box<dyn MediaEngine>,
    publisher: Arc<ResourcePublisher>,
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
) -> Session {
    Session::new(engine, publisher, command_rx, event_tx)
}
