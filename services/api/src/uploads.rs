//! Upload workflows for thumbnails and videos
//!
//! The shared pieces live here: the validation policy applied to every
//! inbound file, the multipart field reader, and the staging-file guard that
//! keeps temporary files from leaking. The per-kind handlers are in the
//! submodules.

use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;

pub mod thumbnail;
pub mod video;

/// Which kind of media an upload carries; decides ceiling and allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Thumbnail,
    Video,
}

impl UploadKind {
    /// Name of the multipart form field carrying the file
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "thumbnail",
            UploadKind::Video => "video",
        }
    }

    fn label(self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "Thumbnail",
            UploadKind::Video => "Video",
        }
    }

    fn ceiling(self, config: &ApiConfig) -> u64 {
        match self {
            UploadKind::Thumbnail => config.thumbnail_max_bytes,
            UploadKind::Video => config.video_max_bytes,
        }
    }

    fn allowed_content_types(self) -> &'static [&'static str] {
        match self {
            UploadKind::Thumbnail => &["image/jpeg", "image/png"],
            UploadKind::Video => &["video/mp4"],
        }
    }

    fn type_rejection(self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "Invalid file type. Only JPEG and PNG allowed.",
            UploadKind::Video => "Invalid file type. Only MP4 videos are allowed.",
        }
    }
}

/// An uploaded file part: raw bytes plus the declared content type
pub struct FilePart {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Pull the expected file field out of a multipart body
///
/// Fails with a client error when the field is absent, is not a file, or the
/// body cannot be read (including a body that blows past the route's size
/// limit mid-stream).
pub async fn read_file_part(
    multipart: &mut Multipart,
    kind: UploadKind,
) -> Result<FilePart, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() != Some(kind.field_name()) {
            continue;
        }

        if field.file_name().is_none() {
            return Err(ApiError::BadRequest(format!(
                "Form field '{}' is not a file",
                kind.field_name()
            )));
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| {
                ApiError::BadRequest(format!("Failed to read {} file: {}", kind.field_name(), e))
            })?
            .to_vec();

        return Ok(FilePart { data, content_type });
    }

    Err(ApiError::BadRequest(format!(
        "{} file missing",
        kind.label()
    )))
}

/// Validate an uploaded file against the per-kind policy
///
/// Purely a function of request metadata; runs before any storage write.
pub fn validate_upload(
    kind: UploadKind,
    part: &FilePart,
    config: &ApiConfig,
) -> Result<(), ApiError> {
    let ceiling = kind.ceiling(config);
    if part.data.len() as u64 > ceiling {
        return Err(ApiError::BadRequest(format!(
            "{} file exceeds the maximum allowed size of {} bytes",
            kind.label(),
            ceiling
        )));
    }

    if !kind
        .allowed_content_types()
        .contains(&part.content_type.as_str())
    {
        return Err(ApiError::BadRequest(kind.type_rejection().to_string()));
    }

    Ok(())
}

/// File extension for an allow-listed content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "video/mp4" => Some("mp4"),
        _ => None,
    }
}

/// Guard around a temporary staging file
///
/// The file is removed when the guard drops, covering every exit path of an
/// upload: success, validation failure after staging, and transfer failure.
/// Removal failure is logged and never escalated.
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Write `data` to a uniquely named file under `dir`
    pub async fn write(dir: &Path, extension: &str, data: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        // Unique per request so concurrent uploads never collide
        let path = dir.join(format!("upload-{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, data).await?;

        Ok(StagedFile { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staging file"
                );
            }
        }
    }
}
