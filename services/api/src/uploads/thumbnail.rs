//! Thumbnail upload workflow
//!
//! Ordering matters: authenticate (middleware) → load record → ownership →
//! validate → storage write → record update. A failure at any step before
//! the write leaves both the store and the database untouched.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::video::Video;
use crate::state::AppState;
use crate::uploads::{self, UploadKind};

/// Handle `POST /api/thumbnail_upload/{videoId}`
pub async fn upload_thumbnail(
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

    let part = uploads::read_file_part(&mut multipart, UploadKind::Thumbnail).await?;
    uploads::validate_upload(UploadKind::Thumbnail, &part, &state.config)?;

    // The allow-list ran above, so the extension lookup cannot miss
    let ext = uploads::extension_for(&part.content_type).ok_or_else(|| {
        ApiError::BadRequest(format!("Unsupported content type: {}", part.content_type))
    })?;
    let key = format!("thumbnails/{}.{}", video_id, ext);

    let size = part.data.len();
    let url = state.store.put(&key, part.data, &part.content_type).await?;

    video.thumbnail_url = Some(url);
    let video = state.video_repository.update(&video).await.map_err(|e| {
        error!("Failed to persist thumbnail URL for {}: {}", video_id, e);
        ApiError::InternalServerError
    })?;

    info!(
        video_id = %video_id,
        key = %key,
        size_bytes = size,
        "Saved thumbnail for video"
    );

    Ok(Json(video))
}
