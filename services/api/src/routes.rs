//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware, bearer_token},
    models::{
        CreateUserRequest, LoginRequest, LoginResponse, RefreshResponse, UserResponse,
        video::{CreateVideoRequest, Video},
    },
    state::AppState,
    uploads,
    validation::{validate_email, validate_password},
};

/// Multipart framing overhead allowed on top of the payload ceilings
const BODY_LIMIT_SLACK: usize = 1 << 20;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let thumbnail_body_limit = state.config.thumbnail_max_bytes as usize + BODY_LIMIT_SLACK;
    let video_body_limit = state.config.video_max_bytes as usize + BODY_LIMIT_SLACK;

    let protected_routes = Router::new()
        .route("/api/videos", post(create_video).get(list_videos))
        .route("/api/videos/:videoId", get(get_video))
        .route(
            "/api/thumbnail_upload/:videoId",
            post(uploads::thumbnail::upload_thumbnail)
                .layer(DefaultBodyLimit::max(thumbnail_body_limit)),
        )
        .route(
            "/api/video_upload/:videoId",
            post(uploads::video::upload_video).layer(DefaultBodyLimit::max(video_body_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh_token))
        .route("/api/revoke", post(revoke_token))
        .merge(protected_routes)
        .nest_service("/assets", ServeDir::new(&state.config.assets_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match common::database::health_check(&state.db_pool).await {
        Ok(true) => "ok",
        _ => "unreachable",
    };

    Json(json!({
        "status": "ok",
        "service": "clipshelf-api",
        "database": database,
    }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?;
    if existing.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let user = state
        .user_repository
        .create(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// User login: verify credentials, mint an access token and a refresh token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    let password_matches = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;
    if !password_matches {
        return Err(ApiError::Unauthorized);
    }

    let token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    let refresh = state
        .refresh_token_repository
        .create(user.id, state.config.refresh_token_expiry)
        .await
        .map_err(|e| {
            error!("Failed to create refresh token: {}", e);
            ApiError::InternalServerError
        })?;

    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        token,
        refresh_token: refresh.token,
    }))
}

/// Exchange a stored refresh token for a fresh access token
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)?;

    let stored = state
        .refresh_token_repository
        .find(token)
        .await
        .map_err(|e| {
            error!("Failed to look up refresh token: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    if !stored.is_usable(chrono::Utc::now()) {
        return Err(ApiError::Unauthorized);
    }

    let access = state
        .jwt_service
        .generate_access_token(stored.user_id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(RefreshResponse { token: access }))
}

/// Revoke a refresh token; idempotent
pub async fn revoke_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?;

    let revoked = state
        .refresh_token_repository
        .revoke(token)
        .await
        .map_err(|e| {
            error!("Failed to revoke refresh token: {}", e);
            ApiError::InternalServerError
        })?;
    if !revoked {
        info!("Revoke requested for unknown or already revoked token");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Create a metadata-only video record owned by the caller
pub async fn create_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let video = state
        .video_repository
        .create(auth.id, title, payload.description.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to create video: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(video)))
}

/// List the caller's videos
pub async fn list_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = state
        .video_repository
        .list_by_user(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to list videos: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(videos))
}

/// Get one of the caller's videos by ID
pub async fn get_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<Uuid>,
) -> Result<Json<Video>, ApiError> {
    let video = state
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
            "Not authorized to view this video".to_string(),
        ));
    }

    Ok(Json(video))
}
