//! Engine lifecycle wrapper owned by the session.

use fadegen_ipc::EngineStatus;
use tracing::{debug, error, info};

use crate::{EngineError, EngineResult, MediaEngine};

/// Wraps the engine with its `Unloaded -> Loading -> Ready | Failed` lifecycle.
///
/// Exactly one handle exists per session and it is never recreated while the
/// session lives. A failed load is terminal: the session must be torn down
/// and rebuilt for a manual reload.
pub struct EngineHandle {
    engine: Box<dyn MediaEngine>,
    status: EngineStatus,
}

impl EngineHandle {
    /// Wrap an engine, still unloaded.
    pub fn new(engine: Box<dyn MediaEngine>) -> Self {
        Self {
            engine,
            status: EngineStatus::Unloaded,
        }
    }

    /// Probe the engine once.
    ///
    /// Idempotent: calling while Loading or Ready is a no-op returning the
    /// current status, and a Failed handle stays failed (no automatic retry).
    pub fn load(&mut self) -> &EngineStatus {
        if !self.status.is_unloaded() {
            debug!(status = self.status.name(), "engine load is a no-op");
            return &self.status;
        }

        self.status = EngineStatus::Loading;
        match self.engine.load() {
            Ok(version) => {
                info!(engine = self.engine.name(), %version, "engine ready");
                self.status = EngineStatus::Ready { version };
            }
            Err(e) => {
                error!(engine = self.engine.name(), "engine load failed: {e}");
                self.status = EngineStatus::Failed {
                    message: e.to_string(),
                };
            }
        }
        &self.status
    }

    /// Current lifecycle status.
    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Returns true once the engine accepts work.
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    /// Ready-gated access for a conversion run.
    pub fn engine_mut(&mut self) -> EngineResult<&mut dyn MediaEngine> {
        if self.status.is_ready() {
            Ok(self.engine.as_mut())
        } else {
            Err(EngineError::NotLoaded)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;

    struct ProbeEngine {
        loads: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MediaEngine for ProbeEngine {
        fn load(&mut self) -> EngineResult<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EngineError::BinaryNotFound("probe".into()))
            } else {
                Ok("probe version 1".into())
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
            "probe"
        }
    }

    #[test]
    fn test_load_is_idempotent() {
        let loads = Arc::new(AtomicUsize::new(0));
        let mut handle = EngineHandle::new(Box::new(ProbeEngine {
            loads: Arc::clone(&loads),
            fail: false,
        }));

        assert!(handle.load().is_ready());
        assert!(handle.load().is_ready());
        assert!(handle.is_ready());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_terminal() {
        let loads = Arc::new(AtomicUsize::new(0));
        let mut handle = EngineHandle::new(Box::new(ProbeEngine {
            loads: Arc::clone(&loads),
            fail: true,
        }));

        assert!(handle.load().is_failed());
        // No automatic retry: the failed handle never re-probes.
        assert!(handle.load().is_failed());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(matches!(handle.engine_mut(), Err(EngineError::NotLoaded)));
    }

    #[test]
    fn test_engine_access_requires_ready() {
        let mut handle = EngineHandle::new(Box::new(ProbeEngine {
            loads: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }));

        assert!(matches!(handle.engine_mut(), Err(EngineError::NotLoaded)));
        handle.load();
        assert!(handle.engine_mut().is_ok());
    }
}
