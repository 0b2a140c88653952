//! Processor contracts
//!
//! Processors are stateless transformations over local file paths. They never
//! perform network I/O, and they do not decide whether a failure is fatal:
//! that classification belongs to the pipeline calling them.

use crate::error::ProcessingResult;
use async_trait::async_trait;
use rendition_core::ImageProps;
use std::path::{Path, PathBuf};

/// Renders a PNG thumbnail of `input` into `output`, fitting within
/// `max_width` x `max_height` with the aspect ratio kept.
#[async_trait]
pub trait ThumbnailProcessor: Send + Sync {
    async fn thumbnail(
        &self,
        input: &Path,
        max_width: u32,
        max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()>;
}

#[async_trait]
pub trait ImageMeasurer: Send + Sync {
    async fn measure(&self, input: &Path) -> ProcessingResult<ImageProps>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, input: &Path) -> ProcessingResult<String>;
}

/// Converts an office document to PDF inside `output_dir` and returns the
/// path of the produced file.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert_to_pdf(&self, input: &Path, output_dir: &Path) -> ProcessingResult<PathBuf>;
}

/// Expands an archive into `output_dir` and returns the extracted files.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    async fn extract(&self, archive: &Path, output_dir: &Path) -> ProcessingResult<Vec<PathBuf>>;
}
