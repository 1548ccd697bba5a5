//! Session controller loop.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use fadegen_engine::{EngineHandle, MediaEngine};
use fadegen_publish::ResourcePublisher;
use fadegen_ipc::{
    DownloadInfo, EngineStatus, SessionCommand, SessionEvent, SessionSnapshot, TaskState,
    DOWNLOAD_FILE_NAME,
};
use fadegen_stage::stage_file;
use tracing::{debug, error, info, instrument, warn};

use crate::resources::SessionResources;
use crate::task::{run_conversion, ConversionTask};

/// One user's conversion session.
///
/// Owns the only engine handle and the only conversion task of its lifetime,
/// drains commands from the shell, and reports every state change as events.
/// Commands are handled to completion one at a time, so no two operations of
/// a session ever overlap.
pub struct Session {
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    engine: EngineHandle,
    task: ConversionTask,
    resources: SessionResources,
}

impl Session {
    /// Create a session around an (unloaded) engine.
    ///
    /// The publisher is shared: the shell keeps a clone to resolve artifact
    /// handles for playback, while the session decides when they are
    /// released.
    pub fn new(
        engine: Box<dyn MediaEngine>,
        publisher: Arc<ResourcePublisher>,
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            engine: EngineHandle::new(engine),
            task: ConversionTask::new(),
            resources: SessionResources::new(publisher),
        }
    }

    /// Run the session (blocking).
    ///
    /// Loads the engine once, then drains commands until `Shutdown` or until
    /// the shell drops its sender. All held resources are released on exit.
    #[instrument(name = "session_run", skip(self))]
    pub fn run(&mut self) {
        info!("session starting");
        self.load_engine();
        self.send_event(SessionEvent::Ready);

        loop {
            match self.command_rx.recv() {
                Ok(command) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Err(_) => {
                    info!("command channel disconnected, shutting down");
                    break;
                }
            }
        }

        self.resources.teardown();
        self.send_event(SessionEvent::Shutdown);
        info!("session stopped");
    }

    /// Handle a command. Returns false if the session should stop.
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!(?command, "handling command");

        match command {
            SessionCommand::SelectImage { path } => self.select_image(&path),
            SessionCommand::Generate => self.generate(),
            SessionCommand::Download { dest_dir } => self.download(&dest_dir),
            SessionCommand::GetState => self.send_state(),
            SessionCommand::Shutdown => return false,
        }

        true
    }

    /// Drive the engine handle through its one load.
    fn load_engine(&mut self) {
        if !self.engine.status().is_unloaded() {
            debug!(status = self.engine.status().name(), "engine already driven");
            return;
        }

        self.emit_engine_status(EngineStatus::Unloaded, EngineStatus::Loading);
        let current = self.engine.load().clone();
        self.emit_engine_status(EngineStatus::Loading, current);
    }

    /// Stage a newly picked image.
    ///
    /// Rejected while a conversion is running: the running task keeps its
    /// input, and the user re-selects after the terminal transition. A prior
    /// result is released before the new image is stored; a prior terminal
    /// task outcome is dropped back to Idle.
    #[instrument(name = "select_image", skip(self))]
    fn select_image(&mut self, path: &Path) {
        if self.task.state().is_running() {
            warn!("selection while a conversion is running, ignoring");
            return;
        }

        let staged = match stage_file(path) {
            Ok(staged) => staged,
            Err(e) => {
                warn!("selection rejected: {e}");
                return;
            }
        };

        let info = staged.info();
        self.resources.replace_image(staged);
        let previous = self.task.state().clone();
        if self.task.reset() {
            self.emit_task_transition(previous, TaskState::Idle);
        }
        self.send_event(SessionEvent::ImageSelected(info));
    }

    /// Run the fade conversion on the staged image.
    ///
    /// Preconditions are enforced here and never reach the task layer: the
    /// engine must be Ready, an image must be staged, and no task may be
    /// running. A rejected request is a logged no-op.
    #[instrument(name = "generate", skip(self))]
    fn generate(&mut self) {
        if !self.engine.is_ready() {
            debug!("generate rejected: engine not ready");
            return;
        }
        if self.resources.image().is_none() {
            debug!("generate rejected: no image staged");
            return;
        }
        if self.task.state().is_running() {
            debug!("generate rejected: a conversion is already running");
            return;
        }

        let Session {
            engine,
            task,
            resources,
            event_tx,
            ..
        } = self;
        let (Ok(engine), Some(image)) = (engine.engine_mut(), resources.image()) else {
            return;
        };

        let previous = task.state().clone();
        if task.begin().is_err() {
            return;
        }
        debug!(
            previous = previous.name(),
            current = task.state().name(),
            "task state transition"
        );
        send(
            event_tx,
            SessionEvent::TaskState {
                previous: Box::new(previous),
                current: Box::new(task.state().clone()),
            },
        );
        // Progress restarts at zero for every run.
        send(event_tx, SessionEvent::Progress { percent: 0 });

        let mut on_progress = |percent: u8| {
            if let Some(percent) = task.progress(percent) {
                send(event_tx, SessionEvent::Progress { percent });
            }
        };
        let outcome = run_conversion(engine, image, &mut on_progress);

        match outcome {
            Ok(bytes) => {
                let artifact = resources.store_result(bytes);
                let previous = task.state().clone();
                task.succeed(artifact.clone());
                send(
                    event_tx,
                    SessionEvent::TaskState {
                        previous: Box::new(previous),
                        current: Box::new(task.state().clone()),
                    },
                );
                send(event_tx, SessionEvent::ResultReady(artifact));
            }
            Err(e) => {
                // Terminal for this task only; the session stays interactive.
                error!("conversion failed: {e}");
                let previous = task.state().clone();
                task.fail(e.to_string());
                send(
                    event_tx,
                    SessionEvent::TaskState {
                        previous: Box::new(previous),
                        current: Box::new(task.state().clone()),
                    },
                );
            }
        }
    }

    /// Save the current result as `fade-video.mp4` under `dest_dir`.
    #[instrument(name = "download", skip(self))]
    fn download(&mut self, dest_dir: &Path) {
        let Some(artifact) = self.resources.result() else {
            debug!("download is a no-op without a result");
            return;
        };

        let path = dest_dir.join(DOWNLOAD_FILE_NAME);
        match self.resources.publisher().save_as(artifact.resource, &path) {
            Ok(len) => self.send_event(SessionEvent::Downloaded(DownloadInfo { path, len })),
            Err(e) => error!("download failed: {e}"),
        }
    }

    fn send_state(&self) {
        self.send_event(SessionEvent::State(SessionSnapshot {
            engine: self.engine.status().clone(),
            image: self.resources.image().map(|image| image.info()),
            task: self.task.state().clone(),
            result: self.resources.result().cloned(),
        }));
    }

    fn emit_engine_status(&self, previous: EngineStatus, current: EngineStatus) {
        debug!(
            previous = previous.name(),
            current = current.name(),
            "engine status transition"
        );
        self.send_event(SessionEvent::EngineStatus {
            previous: Box::new(previous),
            current: Box::new(current),
        });
    }

    fn emit_task_transition(&self, previous: TaskState, current: TaskState) {
        debug!(
            previous = previous.name(),
            current = current.name(),
            "task state transition"
        );
        self.send_event(SessionEvent::TaskState {
            previous: Box::new(previous),
            current: Box::new(current),
        });
    }

    fn send_event(&self, event: SessionEvent) {
        send(&self.event_tx, event);
    }
}

fn send(event_tx: &Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = event_tx.try_send(event) {
        warn!("failed to send event: {e}");
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use crossbeam_channel::Receiver;
    use fadegen_engine::EngineResult;
    use fadegen_ipc::{command_channel, event_channel};
    use fadegen_stage::stage_bytes;

    use super::*;

    struct StubEngine {
        fail_load: bool,
    }

    impl MediaEngine for StubEngine {
        fn load(&mut self) -> EngineResult<String> {
            if self.fail_load {
                Err(fadegen_engine::EngineError::BinaryNotFound("stub".into()))
            } else {
                Ok("stub version 1".into())
            }
        }

        fn write_virtual_file(&mut self, _name: &str, _bytes: &[u8]) -> EngineResult<()> {
            Ok(())
        }

        fn invoke(&mut self, _argv: &[String], _on_progress: &mut dyn FnMut(u8)) -> EngineResult<()> {
            Ok(())
        }

        fn read_virtual_file(&mut self, _name: &str) -> EngineResult<Bytes> {
            Ok(Bytes::new())
        }

        fn remove_virtual_file(&mut self, _name: &str) -> EngineResult<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn session(fail_load: bool) -> (Session, Receiver<SessionEvent>) {
        let (_command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let mut session = Session::new(
            Box::new(StubEngine { fail_load }),
            Arc::new(ResourcePublisher::new()),
            command_rx,
            event_tx,
        );
        session.load_engine();
        (session, event_rx)
    }

    fn task_events(event_rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        event_rx
            .try_iter()
            .filter(|event| matches!(event, SessionEvent::TaskState { .. }))
            .collect()
    }

    #[test]
    fn test_generate_rejected_while_engine_not_ready() {
        let (mut session, event_rx) = session(true);
        session
            .resources
            .replace_image(stage_bytes("photo.jpg", Bytes::from_static(b"jpeg")));
        event_rx.try_iter().for_each(drop);

        session.generate();

        // Precondition holds: no task was ever created.
        assert!(session.task.state().is_idle());
        assert!(task_events(&event_rx).is_empty());
    }

    #[test]
    fn test_generate_rejected_without_image() {
        let (mut session, event_rx) = session(false);
        event_rx.try_iter().for_each(drop);

        session.generate();

        assert!(session.task.state().is_idle());
        assert!(task_events(&event_rx).is_empty());
    }

    #[test]
    fn test_generate_rejected_while_task_running() {
        let (mut session, event_rx) = session(false);
        session
            .resources
            .replace_image(stage_bytes("photo.jpg", Bytes::from_static(b"jpeg")));
        session.task.begin().unwrap();
        session.task.progress(40);
        event_rx.try_iter().for_each(drop);

        session.generate();

        // The running task is untouched and no transition was emitted.
        assert!(matches!(
            session.task.state(),
            TaskState::Running { percent: 40 }
        ));
        assert!(task_events(&event_rx).is_empty());
    }

    #[test]
    fn test_selection_rejected_while_task_running() {
        let (mut session, event_rx) = session(false);
        session
            .resources
            .replace_image(stage_bytes("first.jpg", Bytes::from_static(b"jpeg")));
        session.task.begin().unwrap();
        event_rx.try_iter().for_each(drop);

        let dir = tempfile::tempdir().unwrap();
        let replacement = dir.path().join("second.jpg");
        std::fs::write(&replacement, b"\xFF\xD8\xFF\xE0").unwrap();
        session.select_image(&replacement);

        let image = session.resources.image().unwrap();
        assert_eq!(image.file_name, "first.jpg");
        assert!(event_rx.try_iter().count() == 0);
    }

    #[test]
    fn test_unreadable_selection_changes_nothing() {
        let (mut session, event_rx) = session(false);
        event_rx.try_iter().for_each(drop);

        session.select_image(Path::new("/definitely/not/here.jpg"));

        assert!(session.resources.image().is_none());
        assert_eq!(event_rx.try_iter().count(), 0);
    }
}
