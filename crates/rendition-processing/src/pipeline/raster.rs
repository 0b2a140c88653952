use super::{Pipeline, PipelineContext, CREATING_THUMBNAIL};
use crate::error::PipelineResult;
use crate::identifier::PipelineVariant;
use crate::report::{RunReport, RunStep};
use crate::traits::{ImageMeasurer, ThumbnailProcessor};
use async_trait::async_trait;
use rendition_core::RunOptions;
use std::path::Path;
use std::sync::Arc;

/// Raster images: the original is the preview, annotated with its size.
#[derive(Clone)]
pub struct ImagePipeline {
    ctx: PipelineContext,
    thumbnailer: Arc<dyn ThumbnailProcessor>,
    measurer: Arc<dyn ImageMeasurer>,
}

impl ImagePipeline {
    pub fn new(
        ctx: PipelineContext,
        thumbnailer: Arc<dyn ThumbnailProcessor>,
        measurer: Arc<dyn ImageMeasurer>,
    ) -> Self {
        Self {
            ctx,
            thumbnailer,
            measurer,
        }
    }
}

#[async_trait]
impl Pipeline for ImagePipeline {
    fn variant(&self) -> PipelineVariant {
        PipelineVariant::Image
    }

    fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    #[tracing::instrument(
        name = "image_pipeline",
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

        let measured = self.measurer.measure(input).await;
        let original = report.tolerate(RunStep::Measure, measured);

        self.ctx
            .create_thumbnail(
                self.thumbnailer.as_ref(),
                self.measurer.as_ref(),
                input,
                opts,
                &mut report,
            )
            .await?;
        self.ctx
            .patch_preview(input, opts, original, &mut report)
            .await?;

        tracing::info!(warnings = report.warnings.len(), "Image pipeline finished");
        Ok(report)
    }
}
