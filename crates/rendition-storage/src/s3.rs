use crate::keys::validate_location;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutMultipartOptions, PutOptions,
    PutPayload, Result as ObjectResult, WriteMultipart,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Files larger than this are uploaded in parts.
const MULTIPART_THRESHOLD: u64 = 5 * 1024 * 1024;
/// Minimum part size S3 accepts for every part but the last.
const PART_SIZE: usize = 5 * 1024 * 1024;
const MAX_CONCURRENT_PARTS: usize = 4;
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// S3 storage implementation
///
/// One `AmazonS3` client is built lazily per bucket and reused.
#[derive(Clone)]
pub struct S3Storage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    stores: Arc<Mutex<HashMap<String, AmazonS3>>>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            region,
            endpoint_url,
            stores: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn get_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()> {
        validate_location(bucket, key)?;
        let store = self.store_for(bucket)?;
        let location = ObjectPath::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => {
                StorageError::NotFound(format!("{}/{}", bucket, key))
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let size = write_stream(result.into_stream(), local_path).await?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(())
    }

    async fn put_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
        bucket: &str,
    ) -> StorageResult<()> {
        validate_location(bucket, key)?;
        let store = self.store_for(bucket)?;
        let size = tokio::fs::metadata(local_path).await?.len();
        let location = ObjectPath::from(key.to_string());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let result = if size > MULTIPART_THRESHOLD {
            put_multipart(&store, &location, local_path, attributes).await
        } else {
            let data = tokio::fs::read(local_path).await?;
            let options = PutOptions {
                attributes,
                ..Default::default()
            };
            let result: ObjectResult<_> = store
                .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
                .await;
            result
                .map(|_| ())
                .map_err(|e| StorageError::UploadFailed(e.to_string()))
        };

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            return Err(e);
        }

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Write a download stream to `local_path` chunk by chunk. Returns the byte count.
async fn write_stream(
    mut stream: futures::stream::BoxStream<'static, ObjectResult<Bytes>>,
    local_path: &Path,
) -> StorageResult<u64> {
    let mut file = tokio::fs::File::create(local_path).await?;
    let mut size = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(size)
}

/// Stream `local_path` into a multipart upload, aborting it on any failure.
async fn put_multipart(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    local_path: &Path,
    attributes: Attributes,
) -> StorageResult<()> {
    let options = PutMultipartOptions {
        attributes,
        ..Default::default()
    };
    let upload = store
        .put_multipart_opts(location, options)
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, PART_SIZE);

    if let Err(e) = write_parts(&mut writer, local_path).await {
        if let Err(abort_err) = writer.abort().await {
            tracing::warn!(error = %abort_err, "Failed to abort multipart upload");
        }
        return Err(e);
    }

    writer
        .finish()
        .await
        .map(|_| ())
        .map_err(|e| StorageError::UploadFailed(e.to_string()))
}

async fn write_parts(writer: &mut WriteMultipart, local_path: &Path) -> StorageResult<()> {
    let mut file = tokio::fs::File::open(local_path).await?;
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            return Ok(());
        }
        writer
            .wait_for_capacity(MAX_CONCURRENT_PARTS)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        writer.write(&buffer[..read]);
    }
}
