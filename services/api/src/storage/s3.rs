//! S3 storage backend
//!
//! Objects are written to a private bucket and read back through presigned
//! GET URLs, so the bucket never needs public access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::storage::{MediaStore, StorageError, StorageResult};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    presign_expiry: Duration,
}

impl S3Store {
    /// Create a new S3Store against `bucket`
    ///
    /// Credentials and, unless overridden, the region come from the default
    /// AWS environment (env vars, profile, instance metadata).
    pub async fn new(bucket: String, region: Option<String>, presign_expiry: Duration) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;

        S3Store {
            client: Client::new(&sdk_config),
            bucket,
            presign_expiry,
        }
    }

    /// Mint a time-limited, read-only URL for an object
    async fn presign_get(&self, key: &str) -> StorageResult<String> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl MediaStore for S3Store {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            "Uploaded media to S3"
        );

        self.presign_get(key).await
    }

    async fn put_file(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        info!(
            bucket = %self.bucket,
            key = %key,
            source = %source.display(),
            "Uploaded staged media to S3"
        );

        self.presign_get(key).await
    }
}
