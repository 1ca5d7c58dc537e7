//! Application state shared across handlers
//!
//! Everything a handler needs is constructed once at startup and cloned into
//! the router; there are no process-wide singletons.

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    jwt::JwtService,
    repositories::{RefreshTokenRepository, UserRepository, video::VideoRepository},
    storage::MediaStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: ApiConfig,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub refresh_token_repository: RefreshTokenRepository,
    pub video_repository: VideoRepository,
    pub store: Arc<dyn MediaStore>,
}
