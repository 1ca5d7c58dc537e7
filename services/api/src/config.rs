//! Runtime configuration for the API service
//!
//! Everything the service needs beyond the database connection is collected
//! into one explicitly constructed [`ApiConfig`] carried in the application
//! state. Nothing reads the environment after startup.

use anyhow::Result;
use std::path::PathBuf;

/// Default thumbnail size ceiling: 10 MiB
pub const DEFAULT_THUMBNAIL_MAX_BYTES: u64 = 10 << 20;

/// Default video size ceiling for the local backend: 100 MiB
pub const DEFAULT_VIDEO_MAX_BYTES_LOCAL: u64 = 100 << 20;

/// Default video size ceiling for the S3 backend: 1 GiB
pub const DEFAULT_VIDEO_MAX_BYTES_S3: u64 = 1 << 30;

/// Which durable storage backend holds uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    /// Files under `ASSETS_ROOT`, served back at `/assets/…`
    Local,
    /// Objects in an S3 bucket, read through presigned URLs
    S3,
}

impl StorageBackendKind {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "local" => Ok(StorageBackendKind::Local),
            "s3" => Ok(StorageBackendKind::S3),
            other => Err(anyhow::anyhow!(
                "Unknown STORAGE_BACKEND '{}', expected 'local' or 's3'",
                other
            )),
        }
    }
}

/// API service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Externally reachable base URL, used to build local asset URLs
    pub base_url: String,
    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: u64,
    /// Selected storage backend
    pub storage_backend: StorageBackendKind,
    /// Root directory for the local backend
    pub assets_root: PathBuf,
    /// Directory for temporary upload staging files
    pub staging_dir: PathBuf,
    /// Bucket name for the S3 backend
    pub s3_bucket: Option<String>,
    /// AWS region override for the S3 backend
    pub s3_region: Option<String>,
    /// Lifetime of presigned video URLs in seconds
    pub presign_expiry: u64,
    /// Size ceiling for thumbnail uploads in bytes
    pub thumbnail_max_bytes: u64,
    /// Size ceiling for video uploads in bytes
    pub video_max_bytes: u64,
}

impl ApiConfig {
    /// Create a new ApiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: listen address (default: `0.0.0.0:8091`)
    /// - `BASE_URL`: external base URL (default: `http://localhost:8091`)
    /// - `JWT_SECRET`: token signing secret (required)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: access token lifetime in seconds (default: 3600)
    /// - `REFRESH_TOKEN_EXPIRY`: refresh token lifetime in seconds (default: 60 days)
    /// - `STORAGE_BACKEND`: `local` or `s3` (default: `local`)
    /// - `ASSETS_ROOT`: local backend root directory (default: `./assets`)
    /// - `STAGING_DIR`: staging directory for video uploads (default: system temp dir)
    /// - `S3_BUCKET`: bucket name, required when `STORAGE_BACKEND=s3`
    /// - `S3_REGION`: region override for the S3 client
    /// - `PRESIGN_EXPIRY`: presigned URL lifetime in seconds (default: 24 hours)
    /// - `THUMBNAIL_MAX_BYTES`: thumbnail ceiling (default: 10 MiB)
    /// - `VIDEO_MAX_BYTES`: video ceiling (default: 100 MiB local, 1 GiB S3)
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8091".to_string());

        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8091".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        let refresh_token_expiry = std::env::var("REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "5184000".to_string()) // 60 days
            .parse()
            .unwrap_or(5_184_000);

        let storage_backend = StorageBackendKind::parse(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string()),
        )?;

        let assets_root = std::env::var("ASSETS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./assets"));

        let staging_dir = std::env::var("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let s3_bucket = std::env::var("S3_BUCKET").ok();
        let s3_region = std::env::var("S3_REGION").ok();

        if storage_backend == StorageBackendKind::S3 && s3_bucket.is_none() {
            anyhow::bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
        }

        let presign_expiry = std::env::var("PRESIGN_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86_400);

        let thumbnail_max_bytes = std::env::var("THUMBNAIL_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_THUMBNAIL_MAX_BYTES);

        // The video ceiling is deployment policy: S3 deployments accept much
        // larger files than ones spooling to local disk.
        let default_video_max = match storage_backend {
            StorageBackendKind::Local => DEFAULT_VIDEO_MAX_BYTES_LOCAL,
            StorageBackendKind::S3 => DEFAULT_VIDEO_MAX_BYTES_S3,
        };
        let video_max_bytes = std::env::var("VIDEO_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_video_max);

        Ok(ApiConfig {
            bind_addr,
            base_url,
            jwt_secret,
            access_token_expiry,
            refresh_token_expiry,
            storage_backend,
            assets_root,
            staging_dir,
            s3_bucket,
            s3_region,
            presign_expiry,
            thumbnail_max_bytes,
            video_max_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "BIND_ADDR",
            "BASE_URL",
            "JWT_SECRET",
            "JWT_ACCESS_TOKEN_EXPIRY",
            "REFRESH_TOKEN_EXPIRY",
            "STORAGE_BACKEND",
            "ASSETS_ROOT",
            "STAGING_DIR",
            "S3_BUCKET",
            "S3_REGION",
            "PRESIGN_EXPIRY",
            "THUMBNAIL_MAX_BYTES",
            "VIDEO_MAX_BYTES",
        ] {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
        }

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8091");
        assert_eq!(config.storage_backend, StorageBackendKind::Local);
        assert_eq!(config.access_token_expiry, 3600);
        assert_eq!(config.thumbnail_max_bytes, DEFAULT_THUMBNAIL_MAX_BYTES);
        assert_eq!(config.video_max_bytes, DEFAULT_VIDEO_MAX_BYTES_LOCAL);
        assert_eq!(config.presign_expiry, 86_400);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_requires_jwt_secret() {
        clear_env();

        assert!(ApiConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_s3_backend_raises_video_ceiling() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
            std::env::set_var("STORAGE_BACKEND", "s3");
            std::env::set_var("S3_BUCKET", "clipshelf-media");
        }

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.storage_backend, StorageBackendKind::S3);
        assert_eq!(config.video_max_bytes, DEFAULT_VIDEO_MAX_BYTES_S3);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_s3_backend_requires_bucket() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
            std::env::set_var("STORAGE_BACKEND", "s3");
        }

        assert!(ApiConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_explicit_ceiling_overrides_backend_default() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
            std::env::set_var("VIDEO_MAX_BYTES", "1048576");
        }

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.video_max_bytes, 1 << 20);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_rejects_unknown_backend() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
            std::env::set_var("STORAGE_BACKEND", "ftp");
        }

        assert!(ApiConfig::from_env().is_err());

        clear_env();
    }
}
