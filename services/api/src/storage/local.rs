//! Local filesystem storage backend
//!
//! Files live under a configured assets root and are served back by the API
//! process itself at `/assets/{key}`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::storage::{MediaStore, StorageError, StorageResult};

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `root`, serving URLs under `base_url`
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStore { root, base_url })
    }

    /// Convert a storage key to a filesystem path, rejecting traversal keys
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' contains invalid characters",
                key
            )));
        }

        Ok(self.root.join(key))
    }

    /// Public URL for a stored key
    fn url_for(&self, key: &str) -> String {
        format!("{}/assets/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        info!(
            key = %key,
            size_bytes = data.len(),
            "Stored media on local filesystem"
        );

        Ok(self.url_for(key))
    }

    async fn put_file(
        &self,
        key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        // Copy rather than rename: the staging directory may live on another
        // filesystem, and the caller owns the staged file's lifetime.
        let size = fs::copy(source, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy staged file {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        info!(
            key = %key,
            size_bytes = size,
            "Transferred staged media to local filesystem"
        );

        Ok(self.url_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::new(dir.path(), "http://localhost:8091".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let url = store
            .put("thumbnails/v1.png", b"png-bytes".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/thumbnails/v1.png");
        let written = fs::read(dir.path().join("thumbnails/v1.png")).await.unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_put_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        store
            .put("thumbnails/v1.png", b"first".to_vec(), "image/png")
            .await
            .unwrap();
        store
            .put("thumbnails/v1.png", b"second".to_vec(), "image/png")
            .await
            .unwrap();

        let written = fs::read(dir.path().join("thumbnails/v1.png")).await.unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn test_put_file_copies_staged_source() {
        let dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let staged = staging.path().join("staged.mp4");
        fs::write(&staged, b"mp4-bytes").await.unwrap();

        let url = store
            .put_file("videos/abc.mp4", &staged, "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/videos/abc.mp4");
        let written = fs::read(dir.path().join("videos/abc.mp4")).await.unwrap();
        assert_eq!(written, b"mp4-bytes");
        // Source is left for the caller's cleanup
        assert!(staged.exists());
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        for key in ["../escape.png", "/etc/passwd", "a/../../b", "", "a\\b"] {
            let result = store.put(key, b"x".to_vec(), "image/png").await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
