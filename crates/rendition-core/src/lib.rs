//! Rendition Core Library
//!
//! Domain models, configuration and content-type helpers shared by every
//! rendition component.

pub mod config;
pub mod content_type;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, Limits, StorageConfig, ToolPaths, WorkerConfig};
pub use content_type::{
    content_type_for_extension, content_type_for_path, extension_for_content_type, extension_of,
};
pub use models::*;
pub use storage_types::StorageBackend;
