//! In-memory object store

use super::Journal;
use async_trait::async_trait;
use rendition_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
#[allow(clippy::type_complexity)]
pub struct MemoryStorage {
    objects: Arc<Mutex<HashMap<(String, String), (Vec<u8>, String)>>>,
    fail_puts: Arc<AtomicBool>,
    journal: Journal,
}

impl MemoryStorage {
    pub fn new(journal: Journal) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_puts: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn insert(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (data, "application/octet-stream".to_string()),
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(_, content_type)| content_type.clone())
    }

    /// Sorted keys stored in `bucket`.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()> {
        self.journal.record(format!("storage.get {}/{}", bucket, key));
        let data = self
            .object(bucket, key)
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", bucket, key)))?;
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }

    async fn put_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
        bucket: &str,
    ) -> StorageResult<()> {
        self.journal.record(format!("storage.put {}/{}", bucket, key));
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("simulated outage".to_string()));
        }
        let data = tokio::fs::read(local_path).await?;
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (data, content_type.to_string()),
        );
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
