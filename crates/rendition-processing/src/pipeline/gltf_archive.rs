use super::{GlbPipeline, Pipeline, PipelineContext, EXTRACTING_ARCHIVE};
use crate::error::{PipelineResult, ProcessingError};
use crate::identifier::PipelineVariant;
use crate::mesh::select_scene;
use crate::report::RunReport;
use crate::traits::ArchiveExtractor;
use async_trait::async_trait;
use rendition_core::RunOptions;
use std::path::Path;
use std::sync::Arc;

/// Zip archives holding a glTF/GLB scene.
///
/// The archive is expanded into a per-run directory and the scene file is
/// handed to the GLB pipeline. A `.gltf` that references external buffers
/// can only render if those buffers sit next to it in the archive.
#[derive(Clone)]
pub struct GltfArchivePipeline {
    ctx: PipelineContext,
    extractor: Arc<dyn ArchiveExtractor>,
    glb: GlbPipeline,
}

impl GltfArchivePipeline {
    pub fn new(ctx: PipelineContext, extractor: Arc<dyn ArchiveExtractor>, glb: GlbPipeline) -> Self {
        Self {
            ctx,
            extractor,
            glb,
        }
    }
}

#[async_trait]
impl Pipeline for GltfArchivePipeline {
    fn variant(&self) -> PipelineVariant {
        PipelineVariant::GltfArchive
    }

    fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    #[tracing::instrument(
        name = "gltf_archive_pipeline",
        skip_all,
        fields(task_id = %opts.task_id, snapshot_id = %opts.snapshot_id, bucket = %opts.bucket, key = %opts.key)
    )]
    async fn run_from_local_path(
        &self,
        input: &Path,
        opts: &RunOptions,
    ) -> PipelineResult<RunReport> {
        self.ctx.patch_task_name(opts, EXTRACTING_ARCHIVE).await?;

        let workdir = self.ctx.temp_dir().await?;
        let files = self.extractor.extract(input, workdir.path()).await?;
        let scene = select_scene(&files).ok_or_else(|| {
            ProcessingError::Archive("Archive contains no .glb or .gltf scene".to_string())
        })?;

        tracing::debug!(scene = %scene.display(), "Selected scene from archive");

        let mut report = self.glb.run_from_local_path(&scene, opts).await?;
        report.variant = self.variant();
        Ok(report)
    }
}
