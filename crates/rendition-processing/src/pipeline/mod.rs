//! Per-format pipelines
//!
//! Every variant follows the same shape: patch the Task with the current
//! phase, run processors, upload derived artifacts, patch the Snapshot and
//! release temporary paths. The shared steps live on `PipelineContext`; the
//! variants only decide which steps run and in what order.
//!
//! Failure policy:
//! - Task phase patch, artifact upload and Snapshot patch are fatal.
//! - Thumbnail, measurement and text extraction are tolerated: logged,
//!   recorded in the `RunReport` and skipped.
//! - Temp paths are `TempPath` guards and are removed on every exit path.

mod glb;
mod gltf_archive;
mod office;
mod pdf;
mod raster;

pub use glb::GlbPipeline;
pub use gltf_archive::GltfArchivePipeline;
pub use office::OfficePipeline;
pub use pdf::PdfPipeline;
pub use raster::ImagePipeline;

use crate::error::{PipelineError, PipelineResult};
use crate::identifier::PipelineVariant;
use crate::report::{RunReport, RunStep};
use crate::temp::TempPath;
use crate::traits::{ImageMeasurer, ThumbnailProcessor};
use async_trait::async_trait;
use rendition_api_client::{SnapshotClient, TaskClient};
use rendition_core::{
    content_type_for_path, extension_of, ArtifactRef, ImageProps, Limits, RunOptions,
    SnapshotPatch, TaskPatch,
};
use rendition_storage::Storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Task names reported at the start of each phase.
pub const CREATING_THUMBNAIL: &str = "Creating thumbnail.";
pub const EXTRACTING_TEXT: &str = "Extracting text.";
pub const CONVERTING_TO_PDF: &str = "Converting to PDF.";
pub const EXTRACTING_ARCHIVE: &str = "Extracting archive.";

pub const THUMBNAIL_NAME: &str = "thumbnail.png";
pub const TEXT_NAME: &str = "text.txt";
const PREVIEW_STEM: &str = "preview";

/// One conversion pipeline.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn variant(&self) -> PipelineVariant;

    fn context(&self) -> &PipelineContext;

    /// Download the source object to a temp path, then run
    /// `run_from_local_path` on it. The download is removed before returning.
    async fn run(&self, opts: &RunOptions) -> PipelineResult<RunReport> {
        let input = self.context().download(opts).await?;
        self.run_from_local_path(input.path(), opts).await
    }

    /// Orchestration over a local copy of the source object.
    async fn run_from_local_path(
        &self,
        input: &Path,
        opts: &RunOptions,
    ) -> PipelineResult<RunReport>;
}

/// Dependencies and shared steps of every pipeline.
///
/// Read-only after construction and cheap to clone; runs share nothing else.
#[derive(Clone)]
pub struct PipelineContext {
    pub storage: Arc<dyn Storage>,
    pub task_client: Arc<dyn TaskClient>,
    pub snapshot_client: Arc<dyn SnapshotClient>,
    pub temp_dir: PathBuf,
    pub limits: Limits,
}

impl PipelineContext {
    pub fn new(
        storage: Arc<dyn Storage>,
        task_client: Arc<dyn TaskClient>,
        snapshot_client: Arc<dyn SnapshotClient>,
        temp_dir: impl Into<PathBuf>,
        limits: Limits,
    ) -> Self {
        Self {
            storage,
            task_client,
            snapshot_client,
            temp_dir: temp_dir.into(),
            limits,
        }
    }

    pub fn temp_file(&self, extension: &str) -> TempPath {
        TempPath::file(&self.temp_dir, extension)
    }

    /// Create the configured temp directory if it does not exist yet.
    pub async fn ensure_temp_dir(&self) -> PipelineResult<()> {
        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| PipelineError::resource("Failed to create temp directory", e))
    }

    pub async fn temp_dir(&self) -> PipelineResult<TempPath> {
        self.ensure_temp_dir().await?;
        TempPath::dir(&self.temp_dir)
            .await
            .map_err(|e| PipelineError::resource("Failed to create temporary directory", e))
    }

    /// Fetch the source object into `<temp>/<uuid><ext of key>`.
    pub async fn download(&self, opts: &RunOptions) -> PipelineResult<TempPath> {
        self.ensure_temp_dir().await?;
        let input = self.temp_file(&extension_of(&opts.key));
        self.storage
            .get_file(&opts.bucket, &opts.key, input.path())
            .await?;
        Ok(input)
    }

    /// Report the current phase on the Task. Fatal on failure.
    pub async fn patch_task_name(&self, opts: &RunOptions, name: &str) -> PipelineResult<()> {
        self.task_client
            .patch(&opts.task_id, TaskPatch::name(name))
            .await?;
        Ok(())
    }

    pub async fn file_size(path: &Path) -> PipelineResult<u64> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            PipelineError::resource(format!("Failed to stat {}", path.display()), e)
        })?;
        Ok(metadata.len())
    }

    /// Render, measure, upload and patch the thumbnail.
    ///
    /// Rendering and measuring are tolerated and yield `Ok(None)`; upload and
    /// Snapshot patch failures are fatal.
    pub async fn create_thumbnail(
        &self,
        processor: &dyn ThumbnailProcessor,
        measurer: &dyn ImageMeasurer,
        input: &Path,
        opts: &RunOptions,
        report: &mut RunReport,
    ) -> PipelineResult<Option<ArtifactRef>> {
        self.ensure_temp_dir().await?;
        let output = self.temp_file(".png");

        let rendered = processor
            .thumbnail(
                input,
                self.limits.image_preview_max_width,
                self.limits.image_preview_max_height,
                output.path(),
            )
            .await;
        if report.tolerate(RunStep::Thumbnail, rendered).is_none() {
            return Ok(None);
        }

        let measured = measurer.measure(output.path()).await;
        let Some(props) = report.tolerate(RunStep::Measure, measured) else {
            return Ok(None);
        };

        let size = Self::file_size(output.path()).await?;
        let artifact = ArtifactRef::new(&opts.bucket, opts.snapshot_key(THUMBNAIL_NAME), size)
            .with_image(props);

        self.storage
            .put_file(
                &artifact.key,
                output.path(),
                content_type_for_path(output.path()),
                &artifact.bucket,
            )
            .await?;
        self.snapshot_client
            .patch(SnapshotPatch::thumbnail(opts, artifact.clone()))
            .await?;

        report.thumbnail = Some(artifact.clone());
        Ok(Some(artifact))
    }

    /// Point the Snapshot preview at the processed artifact.
    ///
    /// When `processed` keeps the source object's extension the original
    /// `(bucket, key)` is reused as is. Otherwise the artifact is uploaded to
    /// `<snapshotId>/preview<ext>` first.
    pub async fn patch_preview(
        &self,
        processed: &Path,
        opts: &RunOptions,
        image: Option<ImageProps>,
        report: &mut RunReport,
    ) -> PipelineResult<ArtifactRef> {
        let processed_ext = extension_of(&processed.to_string_lossy());
        let size = Self::file_size(processed).await?;

        let mut artifact = if processed_ext == extension_of(&opts.key) {
            ArtifactRef::new(&opts.bucket, &opts.key, size)
        } else {
            let key = opts.snapshot_key(&format!("{}{}", PREVIEW_STEM, processed_ext));
            self.storage
                .put_file(&key, processed, content_type_for_path(processed), &opts.bucket)
                .await?;
            ArtifactRef::new(&opts.bucket, key, size)
        };
        artifact.image = image;

        self.snapshot_client
            .patch(SnapshotPatch::preview(opts, artifact.clone()))
            .await?;

        report.preview = Some(artifact.clone());
        Ok(artifact)
    }

    /// Upload extracted text to `<snapshotId>/text.txt` and patch it in.
    pub async fn store_text(
        &self,
        text: &str,
        opts: &RunOptions,
        report: &mut RunReport,
    ) -> PipelineResult<ArtifactRef> {
        self.ensure_temp_dir().await?;
        let output = self.temp_file(".txt");
        tokio::fs::write(output.path(), text).await.map_err(|e| {
            PipelineError::resource(format!("Failed to write {}", output.path().display()), e)
        })?;

        let artifact = ArtifactRef::new(
            &opts.bucket,
            opts.snapshot_key(TEXT_NAME),
            text.len() as u64,
        );
        self.storage
            .put_file(
                &artifact.key,
                output.path(),
                content_type_for_path(output.path()),
                &artifact.bucket,
            )
            .await?;
        self.snapshot_client
            .patch(SnapshotPatch::text(opts, artifact.clone()))
            .await?;

        report.text = Some(artifact.clone());
        Ok(artifact)
    }
}
