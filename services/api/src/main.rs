use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{
    config::ApiConfig,
    jwt::JwtService,
    repositories::{RefreshTokenRepository, UserRepository, video::VideoRepository},
    routes, storage,
    state::AppState,
};
use common::database::{DatabaseConfig, health_check, init_pool};
use common::error::DatabaseError;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Clipshelf API service");

    let config = ApiConfig::from_env()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    let jwt_service = JwtService::new(&config.jwt_secret, config.access_token_expiry);
    let store = storage::create_store(&config).await?;

    let user_repository = UserRepository::new(pool.clone());
    let refresh_token_repository = RefreshTokenRepository::new(pool.clone());
    let video_repository = VideoRepository::new(pool.clone());

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        db_pool: pool,
        config,
        jwt_service,
        user_repository,
        refresh_token_repository,
        video_repository,
        store,
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
