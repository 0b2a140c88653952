//! Shared key validation for storage backends.

use crate::{StorageError, StorageResult};

/// Reject bucket names and keys that could escape their namespace.
pub fn validate_location(bucket: &str, key: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Invalid bucket name: {:?}",
            bucket
        )));
    }

    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
