//! Video repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::video::Video;

/// Video repository for database operations
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a metadata-only video record; URL fields start empty
    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (title, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, updated_at, title, description,
                      thumbnail_url, video_url, file_size, content_type, user_id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Get a video by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, created_at, updated_at, title, description,
                   thumbnail_url, video_url, file_size, content_type, user_id
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// List all videos owned by a user, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, created_at, updated_at, title, description,
                   thumbnail_url, video_url, file_size, content_type, user_id
            FROM videos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Persist the mutable fields of a record and return the stored row
    pub async fn update(&self, video: &Video) -> Result<Video> {
        let updated = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                thumbnail_url = $4,
                video_url = $5,
                file_size = $6,
                content_type = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING id, created_at, updated_at, title, description,
                      thumbnail_url, video_url, file_size, content_type, user_id
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.file_size)
        .bind(&video.content_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
