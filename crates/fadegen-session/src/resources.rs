//! Session-held resources and their release discipline.

use std::sync::Arc;

use bytes::Bytes;
use fadegen_ipc::{VideoArtifact, VIDEO_MIME};
use fadegen_publish::ResourcePublisher;
use fadegen_stage::StagedImage;
use tracing::warn;

/// Everything a session owns besides the engine: the staged image, the
/// published result, and the publisher backing it.
///
/// The publisher is shared with the shell so it can resolve artifact handles
/// for playback; the session alone decides their lifetime. A result is valid
/// only while paired with the image that produced it, so replacing the image
/// releases the result first; storing a new result releases the superseded
/// one. Both paths keep "release exactly once" true by construction.
pub(crate) struct SessionResources {
    publisher: Arc<ResourcePublisher>,
    image: Option<StagedImage>,
    result: Option<VideoArtifact>,
}

impl SessionResources {
    pub(crate) fn new(publisher: Arc<ResourcePublisher>) -> Self {
        Self {
            publisher,
            image: None,
            result: None,
        }
    }

    pub(crate) fn image(&self) -> Option<&StagedImage> {
        self.image.as_ref()
    }

    pub(crate) fn result(&self) -> Option<&VideoArtifact> {
        self.result.as_ref()
    }

    pub(crate) fn publisher(&self) -> &ResourcePublisher {
        &self.publisher
    }

    /// Replace the staged image, releasing any result the prior image
    /// produced.
    pub(crate) fn replace_image(&mut self, staged: StagedImage) {
        self.release_result();
        self.image = Some(staged);
    }

    /// Publish a fresh artifact, releasing the superseded one.
    pub(crate) fn store_result(&mut self, bytes: Bytes) -> VideoArtifact {
        self.release_result();
        let len = bytes.len() as u64;
        let resource = self.publisher.publish(bytes, VIDEO_MIME);
        let artifact = VideoArtifact {
            resource,
            mime: VIDEO_MIME.to_string(),
            len,
        };
        self.result = Some(artifact.clone());
        artifact
    }

    pub(crate) fn release_result(&mut self) {
        if let Some(artifact) = self.result.take() {
            if let Err(e) = self.publisher.release(artifact.resource) {
                warn!("result release failed: {e}");
            }
        }
    }

    /// Release everything at session end.
    pub(crate) fn teardown(&mut self) {
        self.release_result();
        self.image = None;
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.teardown();
    }
}
