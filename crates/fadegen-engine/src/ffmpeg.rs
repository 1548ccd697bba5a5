//! System-ffmpeg implementation of the engine contract.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use bytes::Bytes;
use tempfile::TempDir;
use tracing::debug;

use crate::error::EngineError;
use crate::progress::ProgressTracker;
use crate::{EngineResult, MediaEngine};

/// Drives the `ffmpeg` binary found on PATH.
///
/// The virtual file namespace is backed by a private temporary directory that
/// doubles as the working directory of every invocation, so argument vectors
/// address files by bare name. The directory is removed when the engine is
/// dropped.
pub struct FfmpegEngine {
    binary: PathBuf,
    workspace: TempDir,
    version: Option<String>,
}

impl FfmpegEngine {
    /// Engine using the `ffmpeg` binary on PATH.
    pub fn new() -> EngineResult<Self> {
        Self::with_binary("ffmpeg")
    }

    /// Engine using a specific binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> EngineResult<Self> {
        Ok(Self {
            binary: binary.into(),
            workspace: TempDir::new().map_err(EngineError::Workspace)?,
            version: None,
        })
    }

    /// Directory backing the virtual file namespace.
    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    fn resolve(&self, name: &str) -> EngineResult<PathBuf> {
        // Flat namespace: a name is a single path component.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(EngineError::InvalidFileName(name.to_string()));
        }
        Ok(self.workspace.path().join(name))
    }
}

impl MediaEngine for FfmpegEngine {
    fn load(&mut self) -> EngineResult<String> {
        if let Some(version) = &self.version {
            return Ok(version.clone());
        }

        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| EngineError::BinaryNotFound(format!("{}: {e}", self.binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::LoadFailed(stderr.trim().to_string()));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown version")
            .to_string();
        debug!(%version, "engine probe succeeded");
        self.version = Some(version.clone());
        Ok(version)
    }

    fn write_virtual_file(&mut self, name: &str, bytes: &[u8]) -> EngineResult<()> {
        let path = self.resolve(name)?;
        std::fs::write(&path, bytes).map_err(|source| EngineError::VirtualFile {
            name: name.to_string(),
            source,
        })
    }

    fn invoke(&mut self, argv: &[String], on_progress: &mut dyn FnMut(u8)) -> EngineResult<()> {
        if self.version.is_none() {
            return Err(EngineError::NotLoaded);
        }

        let mut child = Command::new(&self.binary)
            .current_dir(self.workspace.path())
            // Plumbing flags: overwrite silently, keep stderr to real errors,
            // stream machine-readable progress records on stdout.
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(["-progress", "pipe:1"])
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let mut tracker = ProgressTracker::from_argv(argv);
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if let Some(percent) = tracker.observe_line(&line) {
                    on_progress(percent);
                }
            }
        }

        // stdout is already drained; this collects stderr and the exit status.
        let output = child.wait_with_output().map_err(EngineError::Spawn)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Invocation {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    fn read_virtual_file(&mut self, name: &str) -> EngineResult<Bytes> {
        let path = self.resolve(name)?;
        let bytes = std::fs::read(&path).map_err(|source| EngineError::VirtualFile {
            name: name.to_string(),
            source,
        })?;
        Ok(Bytes::from(bytes))
    }

    fn remove_virtual_file(&mut self, name: &str) -> EngineResult<()> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path).map_err(|source| EngineError::VirtualFile {
            name: name.to_string(),
            source,
        })
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
