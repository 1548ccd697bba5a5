//! Conversion task state machine and the fixed fade pipeline.

use bytes::Bytes;
use fadegen_engine::{EngineError, MediaEngine};
use fadegen_ipc::{TaskState, VideoArtifact};
use fadegen_stage::StagedImage;
use thiserror::Error;
use tracing::{debug, warn};

/// Virtual file the staged image is written to.
pub const INPUT_FILE: &str = "input.jpg";

/// Virtual file the engine writes its output to.
pub const OUTPUT_FILE: &str = "output.mp4";

/// Fade-in starts at the first frame.
pub const FADE_START_SECS: u32 = 0;

/// Fade-in runs over the first two seconds.
pub const FADE_DURATION_SECS: u32 = 2;

/// Output holds for ten seconds total.
pub const OUTPUT_DURATION_SECS: u32 = 10;

/// The fixed, non-configurable fade command. Timing and codec choices are
/// pipeline constants, not user input.
pub fn fade_argv() -> Vec<String> {
    vec![
        "-loop".into(),
        "1".into(),
        "-i".into(),
        INPUT_FILE.into(),
        "-vf".into(),
        format!("fade=t=in:st={FADE_START_SECS}:d={FADE_DURATION_SECS}"),
        "-t".into(),
        OUTPUT_DURATION_SECS.to_string(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        OUTPUT_FILE.into(),
    ]
}

/// Errors raised by the task state machine itself.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Only one conversion may run per session.
    #[error("a conversion is already running")]
    AlreadyRunning,
}

/// The single conversion task a session may run.
///
/// `Idle -> Running -> {Succeeded, Failed}`; terminal states are left only
/// by a brand-new [`begin`](Self::begin), never by resumption.
#[derive(Debug, Default)]
pub struct ConversionTask {
    state: TaskState,
}

impl ConversionTask {
    /// Task in the Idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Admit a new run. Progress restarts at zero.
    pub fn begin(&mut self) -> Result<(), TaskError> {
        if self.state.is_running() {
            return Err(TaskError::AlreadyRunning);
        }
        self.state = TaskState::Running { percent: 0 };
        Ok(())
    }

    /// Observe a progress report.
    ///
    /// Purely observational: values are clamped to 100 and only strictly
    /// increasing reports are kept, so the observed sequence per task is
    /// monotonic non-decreasing within [0, 100]. Returns the effective value
    /// when the report advanced the task.
    pub fn progress(&mut self, percent: u8) -> Option<u8> {
        let TaskState::Running { percent: current } = &mut self.state else {
            debug!(percent, "progress report outside a running task");
            return None;
        };
        let percent = percent.min(100);
        if percent <= *current {
            return None;
        }
        *current = percent;
        Some(percent)
    }

    /// Terminal transition: the invocation finished and its output was
    /// published.
    pub fn succeed(&mut self, artifact: VideoArtifact) {
        if !self.state.is_running() {
            warn!(state = self.state.name(), "completion outside a running task");
            return;
        }
        self.state = TaskState::Succeeded { artifact };
    }

    /// Terminal transition: the invocation raised an error.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.state.is_running() {
            warn!(state = self.state.name(), "failure outside a running task");
            return;
        }
        self.state = TaskState::Failed {
            message: message.into(),
        };
    }

    /// Drop a terminal outcome back to Idle (the staged image changed).
    /// Returns true when the state actually changed.
    pub fn reset(&mut self) -> bool {
        if self.state.is_terminal() {
            self.state = TaskState::Idle;
            true
        } else {
            false
        }
    }
}

/// The Running phase: stage the input into the engine, run the fixed fade
/// command, read the produced bytes back, and clean up the virtual files.
///
/// Cleanup is best-effort — a failed delete never demotes a produced result.
pub(crate) fn run_conversion(
    engine: &mut dyn MediaEngine,
    image: &StagedImage,
    on_progress: &mut dyn FnMut(u8),
) -> Result<Bytes, EngineError> {
    engine.write_virtual_file(INPUT_FILE, &image.bytes)?;

    let produced = engine
        .invoke(&fade_argv(), on_progress)
        .and_then(|()| engine.read_virtual_file(OUTPUT_FILE));

    for name in [INPUT_FILE, OUTPUT_FILE] {
        if let Err(e) = engine.remove_virtual_file(name) {
            debug!(name, "virtual file cleanup skipped: {e}");
        }
    }

    produced
}
