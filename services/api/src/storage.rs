//! Durable media storage behind a backend-agnostic trait
//!
//! The upload workflows only ever talk to [`MediaStore`]; whether bytes land
//! on the local filesystem or in an S3 bucket is decided once at startup from
//! configuration. Both backends accept the same keys and return an externally
//! reachable URL for what they stored.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ApiConfig, StorageBackendKind};

pub mod local;
pub mod s3;

pub use local::LocalStore;
pub use s3::S3Store;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Presigning failed: {0}")]
    PresignFailed(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-agnostic writer for uploaded media
///
/// Keys are forward-slash paths like `thumbnails/{id}.png` or
/// `videos/{hex}.mp4`. Writing to an existing key fully replaces its content.
/// The returned URL is what clients dereference to read the object back: a
/// `BASE_URL/assets/…` path for the local backend, a time-limited presigned
/// URL for S3.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write a blob at `key` and return its externally reachable URL
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Transfer an already staged file into `key` and return its URL
    ///
    /// The staged source file is left in place; removing it is the caller's
    /// responsibility on every exit path.
    async fn put_file(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<String>;
}

/// Create the storage backend selected by configuration
pub async fn create_store(config: &ApiConfig) -> StorageResult<Arc<dyn MediaStore>> {
    match config.storage_backend {
        StorageBackendKind::Local => {
            let store = LocalStore::new(config.assets_root.clone(), config.base_url.clone()).await?;
            Ok(Arc::new(store))
        }
        StorageBackendKind::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET not configured".to_string())
            })?;
            let store = S3Store::new(
                bucket,
                config.s3_region.clone(),
                Duration::from_secs(config.presign_expiry),
            )
            .await;
            Ok(Arc::new(store))
        }
    }
}
