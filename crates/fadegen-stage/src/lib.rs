//! Input staging for fadegen.
//!
//! Converts a user-selected file into the in-memory form the rest of the
//! pipeline works with: the raw bytes for the engine, a sniffed MIME type,
//! and a browser-displayable `data:` URI preview. Staging is deliberately
//! best-effort — size, dimensions and decodability are not enforced here;
//! unreadable input is the engine's to reject.

mod error;

pub use error::StageError;

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use fadegen_ipc::ImageInfo;
use tracing::debug;

/// Result type for staging operations.
pub type StageResult<T> = Result<T, StageError>;

/// MIME fallback for inputs no sniffer recognizes.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A staged input image.
///
/// Immutably paired with its preview; a new selection replaces the whole
/// value rather than mutating it.
#[derive(Debug, Clone)]
pub struct StagedImage {
    /// Original file name of the selection.
    pub file_name: String,

    /// Sniffed MIME type, or [`OCTET_STREAM`].
    pub mime: String,

    /// Raw bytes, ready for virtual-file placement.
    pub bytes: Bytes,

    /// `data:` URI preview for immediate display.
    pub preview: String,
}

impl StagedImage {
    /// Shell-facing description of this image.
    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            file_name: self.file_name.clone(),
            mime: self.mime.clone(),
            len: self.bytes.len() as u64,
            preview: self.preview.clone(),
        }
    }
}

/// Stage a file from the local file system.
///
/// The only side effect is reading the file; there is no network access.
pub fn stage_file(path: &Path) -> StageResult<StagedImage> {
    let bytes = std::fs::read(path).map_err(|source| StageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "selection".to_string());
    Ok(stage_bytes(file_name, Bytes::from(bytes)))
}

/// Stage bytes already in memory.
pub fn stage_bytes(file_name: impl Into<String>, bytes: Bytes) -> StagedImage {
    let file_name = file_name.into();
    let mime = sniff_mime(&bytes);
    let preview = preview_data_uri(mime, &bytes);
    debug!(%file_name, %mime, len = bytes.len(), "staged input");
    StagedImage {
        file_name,
        mime: mime.to_string(),
        bytes,
        preview,
    }
}

/// Sniff the MIME type from magic bytes; pass-through on anything unknown.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(OCTET_STREAM)
}

/// Build the `data:<mime>;base64,<payload>` preview form.
fn preview_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniffs_common_formats() {
        assert_eq!(sniff_mime(JPEG_MAGIC), "image/jpeg");
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_unknown_input_is_passed_through() {
        let staged = stage_bytes("note.txt", Bytes::from_static(b"not an image"));
        assert_eq!(staged.mime, OCTET_STREAM);
        assert_eq!(staged.bytes.as_ref(), b"not an image");
    }

    #[test]
    fn test_zero_byte_input_stages() {
        let staged = stage_bytes("empty.jpg", Bytes::new());
        assert_eq!(staged.mime, OCTET_STREAM);
        assert_eq!(staged.preview, format!("data:{OCTET_STREAM};base64,"));
    }

    #[test]
    fn test_preview_is_a_decodable_data_uri() {
        let staged = stage_bytes("photo.jpg", Bytes::from_static(JPEG_MAGIC));

        let payload = staged
            .preview
            .strip_prefix("data:image/jpeg;base64,")
            .expect("preview carries the sniffed mime");
        assert_eq!(STANDARD.decode(payload).unwrap(), JPEG_MAGIC);
    }

    #[test]
    fn test_stage_file_reads_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, JPEG_MAGIC).unwrap();

        let staged = stage_file(&path).unwrap();
        assert_eq!(staged.file_name, "photo.jpg");
        assert_eq!(staged.mime, "image/jpeg");
        assert_eq!(staged.info().len, JPEG_MAGIC.len() as u64);

        assert!(matches!(
            stage_file(&dir.path().join("missing.jpg")),
            Err(StageError::Read { .. })
        ));
    }
}
