//! Rendition Storage Library
//!
//! Object store client used by the conversion pipelines. Blobs are addressed
//! by `(bucket, key)` and always move between the store and a local path;
//! pipelines never hold whole blobs in memory.
//!
//! Keys must not contain `..` or a leading `/`. Validation is centralized in
//! the `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use rendition_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
