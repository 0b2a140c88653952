use super::{Pipeline, PipelineContext, CREATING_THUMBNAIL, EXTRACTING_TEXT};
use crate::error::PipelineResult;
use crate::identifier::PipelineVariant;
use crate::report::{RunReport, RunStep};
use crate::traits::{ImageMeasurer, TextExtractor, ThumbnailProcessor};
use async_trait::async_trait;
use rendition_core::RunOptions;
use std::path::Path;
use std::sync::Arc;

/// PDF documents: first-page thumbnail, extracted text, the PDF as preview.
#[derive(Clone)]
pub struct PdfPipeline {
    ctx: PipelineContext,
    thumbnailer: Arc<dyn ThumbnailProcessor>,
    measurer: Arc<dyn ImageMeasurer>,
    text: Arc<dyn TextExtractor>,
}

impl PdfPipeline {
    pub fn new(
        ctx: PipelineContext,
        thumbnailer: Arc<dyn ThumbnailProcessor>,
        measurer: Arc<dyn ImageMeasurer>,
        text: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            ctx,
            thumbnailer,
            measurer,
            text,
        }
    }
}

#[async_trait]
impl Pipeline for PdfPipeline {
    fn variant(&self) -> PipelineVariant {
        PipelineVariant::Pdf
    }

    fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    #[tracing::instrument(
        name = "pdf_pipeline",
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
                self.thumbnailer.as_ref(),
                self.measurer.as_ref(),
                input,
                opts,
                &mut report,
            )
            .await?;

        self.ctx.patch_task_name(opts, EXTRACTING_TEXT).await?;
        let extracted = self.text.extract_text(input).await;
        match report.tolerate(RunStep::TextExtraction, extracted) {
            Some(text) if !text.is_empty() => {
                self.ctx.store_text(&text, opts, &mut report).await?;
            }
            Some(_) => tracing::debug!("PDF has no extractable text"),
            None => {}
        }

        self.ctx
            .patch_preview(input, opts, None, &mut report)
            .await?;

        tracing::info!(warnings = report.warnings.len(), "PDF pipeline finished");
        Ok(report)
    }
}
