//! Video record model
//!
//! The JSON spelling of the URL and owner fields (`thumbnailURL`, `videoURL`,
//! `userID`) is part of the public API contract and deliberately not plain
//! camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Video metadata record
///
/// URL, size, and content-type fields stay empty until the corresponding
/// upload workflow completes successfully.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "videoURL")]
    pub video_url: Option<String>,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

/// Request for creating a video record
#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
}
