//! Result publishing for fadegen.
//!
//! Wraps produced byte buffers behind revocable resource handles so a shell
//! can play them back or save them to disk without owning the memory. A
//! handle must be released exactly once — when its result is superseded or
//! the session ends — after which it never resolves again.

mod error;

pub use error::PublishError;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use fadegen_ipc::ResourceId;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Result type for publishing operations.
pub type PublishResult<T> = Result<T, PublishError>;

struct Entry {
    bytes: Bytes,
    mime: String,
}

/// Registry of published, revocable resources.
pub struct ResourcePublisher {
    entries: Mutex<HashMap<u64, Entry>>,
    next_id: AtomicU64,
}

impl ResourcePublisher {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Publish bytes under a fresh handle.
    pub fn publish(&self, bytes: Bytes, mime: &str) -> ResourceId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, mime, len = bytes.len(), "published resource");
        self.entries.lock().insert(
            id,
            Entry {
                bytes,
                mime: mime.to_string(),
            },
        );
        ResourceId(id)
    }

    /// Resolve a handle for playback.
    pub fn open(&self, id: ResourceId) -> PublishResult<Bytes> {
        self.entries
            .lock()
            .get(&id.0)
            .map(|entry| entry.bytes.clone())
            .ok_or(PublishError::UnknownResource(id))
    }

    /// Declared MIME type of a published resource.
    pub fn mime_of(&self, id: ResourceId) -> PublishResult<String> {
        self.entries
            .lock()
            .get(&id.0)
            .map(|entry| entry.mime.clone())
            .ok_or(PublishError::UnknownResource(id))
    }

    /// Save a resource to disk. Returns the number of bytes written.
    pub fn save_as(&self, id: ResourceId, dest: &Path) -> PublishResult<u64> {
        let bytes = self.open(id)?;
        std::fs::write(dest, &bytes).map_err(|source| PublishError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(bytes.len() as u64)
    }

    /// Revoke a handle. Must be called exactly once per published resource;
    /// releasing an unknown or already-released handle is an error.
    pub fn release(&self, id: ResourceId) -> PublishResult<()> {
        match self.entries.lock().remove(&id.0) {
            Some(entry) => {
                debug!(id = id.0, len = entry.bytes.len(), "released resource");
                Ok(())
            }
            None => {
                warn!(id = id.0, "release of unknown resource");
                Err(PublishError::UnknownResource(id))
            }
        }
    }

    /// Number of live (unreleased) resources.
    pub fn active(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for ResourcePublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_open() {
        let publisher = ResourcePublisher::new();
        let id = publisher.publish(Bytes::from_static(b"mp4 bytes"), "video/mp4");

        assert_eq!(publisher.open(id).unwrap().as_ref(), b"mp4 bytes");
        assert_eq!(publisher.mime_of(id).unwrap(), "video/mp4");
        assert_eq!(publisher.active(), 1);
    }

    #[test]
    fn test_release_exactly_once() {
        let publisher = ResourcePublisher::new();
        let id = publisher.publish(Bytes::from_static(b"x"), "video/mp4");

        publisher.release(id).unwrap();
        assert_eq!(publisher.active(), 0);

        // A released handle never resolves again, and a second release is an
        // error the caller must avoid by construction.
        assert!(matches!(
            publisher.open(id),
            Err(PublishError::UnknownResource(_))
        ));
        assert!(matches!(
            publisher.release(id),
            Err(PublishError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_handles_are_never_reused() {
        let publisher = ResourcePublisher::new();
        let first = publisher.publish(Bytes::from_static(b"a"), "video/mp4");
        publisher.release(first).unwrap();

        let second = publisher.publish(Bytes::from_static(b"b"), "video/mp4");
        assert_ne!(first, second);
        assert!(publisher.open(first).is_err());
        assert_eq!(publisher.open(second).unwrap().as_ref(), b"b");
    }

    #[test]
    fn test_save_as_writes_exact_bytes() {
        let publisher = ResourcePublisher::new();
        let id = publisher.publish(Bytes::from_static(b"\x00\x00\x00\x20ftypisom"), "video/mp4");

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fade-video.mp4");
        let written = publisher.save_as(id, &dest).unwrap();

        assert_eq!(written, 12);
        assert_eq!(std::fs::read(&dest).unwrap(), b"\x00\x00\x00\x20ftypisom");
    }

    #[test]
    fn test_save_as_unknown_resource() {
        let publisher = ResourcePublisher::new();
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            publisher.save_as(ResourceId(99), &dir.path().join("out.mp4")),
            Err(PublishError::UnknownResource(_))
        ));
    }
}
