//! External media-engine handle for fadegen.
//!
//! The actual encoding is delegated to an opaque engine consumed through
//! virtual files and an argv invocation; this crate provides that contract
//! ([`MediaEngine`]), the system-ffmpeg implementation, and the lifecycle
//! wrapper ([`EngineHandle`]) the session owns.

mod error;
mod ffmpeg;
mod handle;
mod progress;

pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use handle::EngineHandle;
pub use progress::ProgressTracker;

use bytes::Bytes;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Contract of the external encoding engine.
///
/// The engine owns a flat, private namespace of named byte buffers (its
/// "virtual files") and executes one command at a time. Invocations block the
/// caller; progress callbacks fire on the calling thread strictly before
/// `invoke` returns.
pub trait MediaEngine: Send {
    /// Probe the engine runtime. Returns its version line as ready-signal.
    fn load(&mut self) -> EngineResult<String>;

    /// Place bytes into the engine's namespace under `name`.
    fn write_virtual_file(&mut self, name: &str, bytes: &[u8]) -> EngineResult<()>;

    /// Execute the engine with the given argument vector.
    ///
    /// `on_progress` is called zero or more times with percentages in 0-100.
    fn invoke(&mut self, argv: &[String], on_progress: &mut dyn FnMut(u8)) -> EngineResult<()>;

    /// Read back a virtual file produced by an invocation.
    fn read_virtual_file(&mut self, name: &str) -> EngineResult<Bytes>;

    /// Delete a virtual file.
    fn remove_virtual_file(&mut self, name: &str) -> EngineResult<()>;

    /// Get engine name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Create the production engine (system ffmpeg), still unloaded.
pub fn create_engine() -> EngineResult<Box<dyn MediaEngine>> {
    let engine = FfmpegEngine::new()?;
    tracing::debug!(name = engine.name(), "engine created");
    Ok(Box::new(engine))
}
