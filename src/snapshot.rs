//! Immutable capture of the user-selected upload file.
//!
//! Spreadsheet editors and file-sync clients may rewrite or lock a file
//! between selection and submission. The snapshot removes that race: the
//! file content is copied into an owned buffer once, at selection time, and
//! the original path is never read again.

use std::path::Path;
use std::time::SystemTime;

use crate::model::ClientError;

/// Remediation hint shown whenever reading the selected file fails.
pub const RESELECT_HINT: &str = "If this is a spreadsheet-exported CSV, save it under a NEW \
     filename, close the editor, then re-select the file.";

/// An immutable in-memory copy of a selected upload file.
///
/// All fields are private; the snapshot is either wholly replaced by a new
/// capture or consumed read-only at submission time, never partially
/// updated.
#[derive(Clone, Debug)]
pub struct UploadSnapshot {
    name: String,
    bytes: Vec<u8>,
    media_type: String,
    captured_at: SystemTime,
}

impl UploadSnapshot {
    /// Assembles a snapshot from already-read bytes.
    ///
    /// # Parameters
    /// * `name` - Original file name, preserved for the upload payload
    /// * `bytes` - Full file content
    /// * `media_type` - Declared media type of the content
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type: media_type.into(),
            captured_at: SystemTime::now(),
        }
    }

    /// Original file name at capture time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The captured bytes. Never re-read from the source after capture.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared media type of the captured content.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size of the captured content in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Moment the snapshot was taken.
    #[allow(dead_code)]
    pub fn captured_at(&self) -> SystemTime {
        self.captured_at
    }
}

/// Reads the selected file completely into an `UploadSnapshot`.
///
/// The media type is inferred from the file name, falling back to
/// `application/octet-stream` for unknown extensions. A zero-length read is
/// treated as a failure: that is the symptom a locked or mid-rewrite
/// spreadsheet produces.
///
/// # Returns
/// `Ok(UploadSnapshot)` on success, otherwise `ClientError::UnreadableFile`.
/// Existing state is never mutated on failure.
pub async fn capture_snapshot(path: &Path) -> Result<UploadSnapshot, ClientError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ClientError::UnreadableFile(format!("'{}' has no file name", path.display()))
        })?;

    let bytes = tokio::fs::read(path).await.map_err(|err| {
        ClientError::UnreadableFile(format!("{}: {}. {}", path.display(), err, RESELECT_HINT))
    })?;

    if bytes.is_empty() {
        return Err(ClientError::UnreadableFile(format!(
            "{} read back empty. {}",
            path.display(),
            RESELECT_HINT
        )));
    }

    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Ok(UploadSnapshot::new(name, bytes, media_type))
}
