use super::{PdfPipeline, Pipeline, PipelineContext, CONVERTING_TO_PDF};
use crate::error::PipelineResult;
use crate::identifier::PipelineVariant;
use crate::report::RunReport;
use crate::traits::DocumentConverter;
use async_trait::async_trait;
use rendition_core::RunOptions;
use std::path::Path;
use std::sync::Arc;

/// Office documents: converted to PDF, then run through the PDF pipeline.
/// The converted PDF becomes the preview under `<snapshotId>/preview.pdf`.
#[derive(Clone)]
pub struct OfficePipeline {
    ctx: PipelineContext,
    converter: Arc<dyn DocumentConverter>,
    pdf: PdfPipeline,
}

impl OfficePipeline {
    pub fn new(ctx: PipelineContext, converter: Arc<dyn DocumentConverter>, pdf: PdfPipeline) -> Self {
        Self { ctx, converter, pdf }
    }
}

#[async_trait]
impl Pipeline for OfficePipeline {
    fn variant(&self) -> PipelineVariant {
        PipelineVariant::Office
    }

    fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    #[tracing::instrument(
        name = "office_pipeline",
        skip_all,
        fields(task_id = %opts.task_id, snapshot_id = %opts.snapshot_id, bucket = %opts.bucket, key = %opts.key)
    )]
    async fn run_from_local_path(
        &self,
        input: &Path,
        opts: &RunOptions,
    ) -> PipelineResult<RunReport> {
        self.ctx.patch_task_name(opts, CONVERTING_TO_PDF).await?;

        let workdir = self.ctx.temp_dir().await?;
        let converted = self.converter.convert_to_pdf(input, workdir.path()).await?;

        let mut report = self.pdf.run_from_local_path(&converted, opts).await?;
        report.variant = self.variant();
        Ok(report)
    }
}
