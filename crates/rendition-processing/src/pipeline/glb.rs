use super::{Pipeline, PipelineContext, CREATING_THUMBNAIL};
use crate::error::PipelineResult;
use crate::identifier::PipelineVariant;
use crate::report::RunReport;
use crate::traits::{ImageMeasurer, ThumbnailProcessor};
use async_trait::async_trait;
use rendition_core::RunOptions;
use std::path::Path;
use std::sync::Arc;

/// glTF/GLB scenes: thumbnail from the renderer, preview is the scene itself.
#[derive(Clone)]
pub struct GlbPipeline {
    ctx: PipelineContext,
    renderer: Arc<dyn ThumbnailProcessor>,
    measurer: Arc<dyn ImageMeasurer>,
}

impl GlbPipeline {
    pub fn new(
        ctx: PipelineContext,
        renderer: Arc<dyn ThumbnailProcessor>,
        measurer: Arc<dyn ImageMeasurer>,
    ) -> Self {
        Self {
            ctx,
            renderer,
            measurer,
        }
    }
}

#[async_trait]
impl Pipeline for GlbPipeline {
    fn variant(&self) -> PipelineVariant {
        PipelineVariant::Glb
    }

    fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    #[tracing::instrument(
        name = "glb_pipeline",
        skip_all,
        fields(task_id = %opts.task_id, snapshot_id = %opts.snapshot_id, bucket = %opts.bucket, key = %opts.key)
    )]
    async fn run_from_local_path(
        &self,
        input: &Path,
        opts: &RunOptions,
    ) -> PipelineResult<RunReport> {
        let mut report = RunReport::new(self.variant());

        self.ctx.patch_task_name(opts, CREATING_THUMBNAIL).await?;
        self.ctx
            .create_thumbnail(
                self.renderer.as_ref(),
                self.measurer.as_ref(),
                input,
                opts,
                &mut report,
            )
            .await?;
        self.ctx
            .patch_preview(input, opts, None, &mut report)
            .await?;

        tracing::info!(warnings = report.warnings.len(), "GLB pipeline finished");
        Ok(report)
    }
}
