//! Storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store client.
///
/// Every call is a plain remote operation: failures surface as a
/// `StorageError` and are never retried here.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch `(bucket, key)` into `local_path`, replacing any existing file.
    async fn get_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()>;

    /// Store the file at `local_path` under `(bucket, key)`.
    async fn put_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
        bucket: &str,
    ) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
