//! Video upload workflow
//!
//! Unlike thumbnails, video bytes go through a staging file before the
//! durable transfer, and the durable object name is random so it never leaks
//! the mutable record id. The [`StagedFile`] guard removes the staging file
//! on every exit path.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use rand::Rng;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::video::Video;
use crate::state::AppState;
use crate::storage::StorageError;
use crate::uploads::{self, StagedFile, UploadKind};

/// Handle `POST /api/video_upload/{videoId}`
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Video>, ApiError> {
    let mut video = state
        .video_repository
        .get_by_id(video_id)
        .await
        .map_err(|e| {
            error!("Failed to load video {}: {}", video_id, e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Couldn't find video".to_string()))?;

    if video.user_id != auth.id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this video".to_string(),
        ));
    }

    let part = uploads::read_file_part(&mut multipart, UploadKind::Video).await?;
    uploads::validate_upload(UploadKind::Video, &part, &state.config)?;

    let key = generate_video_key();

    let staged = StagedFile::write(&state.config.staging_dir, "mp4", &part.data)
        .await
        .map_err(|e| {
            error!("Failed to stage video upload: {}", e);
            ApiError::Storage(StorageError::Io(e))
        })?;
    info!(
        video_id = %video_id,
        path = %staged.path().display(),
        "Staged video upload"
    );

    // A transfer failure returns here with the record untouched; the staged
    // file is cleaned up by the guard either way.
    let url = state
        .store
        .put_file(&key, staged.path(), &part.content_type)
        .await?;

    video.video_url = Some(url);
    video.file_size = Some(part.data.len() as i64);
    video.content_type = Some(part.content_type.clone());
    let video = state.video_repository.update(&video).await.map_err(|e| {
        error!("Failed to persist video URL for {}: {}", video_id, e);
        ApiError::InternalServerError
    })?;

    info!(
        video_id = %video_id,
        key = %key,
        size_bytes = part.data.len(),
        "Saved video upload"
    );

    Ok(Json(video))
}

/// Collision-resistant random storage key, independent of the record id
fn generate_video_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    format!("videos/{}.mp4", hex::encode(bytes))
}
