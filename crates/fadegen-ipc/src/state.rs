//! Session state machine types.

use serde::{Deserialize, Serialize};

use crate::types::VideoArtifact;

/// Lifecycle of the external encoding engine.
///
/// One engine handle exists per session. It moves `Unloaded -> Loading ->
/// Ready | Failed` exactly once; `Failed` is terminal for the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum EngineStatus {
    /// Engine has not been probed yet.
    #[default]
    Unloaded,

    /// Engine probe is in flight.
    Loading,

    /// Engine answered the probe and accepts work.
    Ready {
        /// Version line reported by the engine.
        version: String,
    },

    /// Engine probe failed; the session must be recreated to retry.
    Failed {
        /// Probe failure description.
        message: String,
    },
}

impl EngineStatus {
    /// Returns true while the engine has not been probed.
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    /// Returns true while the probe is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true once the engine accepts work.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns true once the probe has failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns a simple string representation of the status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unloaded => "Unloaded",
            Self::Loading => "Loading",
            Self::Ready { .. } => "Ready",
            Self::Failed { .. } => "Failed",
        }
    }
}

/// State of the single conversion task a session may run.
///
/// `Succeeded` and `Failed` are terminal; a retry is always a brand-new run,
/// never a resumption.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum TaskState {
    /// No conversion has been admitted.
    #[default]
    Idle,

    /// Engine invocation in flight.
    Running {
        /// Last observed progress percentage (0-100).
        percent: u8,
    },

    /// Invocation finished and the output was published.
    Succeeded {
        /// The published result.
        artifact: VideoArtifact,
    },

    /// Invocation raised an error.
    Failed {
        /// Diagnostic suitable for display.
        message: String,
    },
}

impl TaskState {
    /// Returns true when no conversion has been admitted.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true while an invocation is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns true in either terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Succeeded { .. } => "Succeeded",
            Self::Failed { .. } => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_status_predicates() {
        assert!(EngineStatus::Unloaded.is_unloaded());
        assert!(EngineStatus::Loading.is_loading());
        assert!(EngineStatus::Ready {
            version: "ffmpeg version 6.1".into()
        }
        .is_ready());

        let failed = EngineStatus::Failed {
            message: "binary not found".into(),
        };
        assert!(failed.is_failed());
        assert!(!failed.is_ready());
        assert_eq!(failed.name(), "Failed");
    }

    #[test]
    fn test_task_state_terminality() {
        assert!(TaskState::Idle.is_idle());
        assert!(!TaskState::Idle.is_terminal());
        assert!(TaskState::Running { percent: 40 }.is_running());
        assert!(!TaskState::Running { percent: 40 }.is_terminal());
        assert!(TaskState::Failed {
            message: "bad input".into()
        }
        .is_terminal());
    }
}
