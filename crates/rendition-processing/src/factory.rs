//! Builds pipelines with their processor and client dependencies injected.

use crate::document::{OfficeConverter, PdfProcessor};
use crate::error::PipelineResult;
use crate::identifier::{identify, PipelineVariant};
use crate::mesh::{GlbProcessor, GltfArchiveExtractor};
use crate::pipeline::{
    GlbPipeline, GltfArchivePipeline, ImagePipeline, OfficePipeline, PdfPipeline, Pipeline,
    PipelineContext,
};
use crate::raster::ImageProcessor;
use crate::traits::{
    ArchiveExtractor, DocumentConverter, ImageMeasurer, TextExtractor, ThumbnailProcessor,
};
use rendition_core::{RunOptions, ToolPaths};
use std::sync::Arc;

/// The processor set handed to pipelines.
#[derive(Clone)]
pub struct Processors {
    pub image: Arc<dyn ThumbnailProcessor>,
    pub measurer: Arc<dyn ImageMeasurer>,
    pub pdf: Arc<dyn ThumbnailProcessor>,
    pub text: Arc<dyn TextExtractor>,
    pub glb: Arc<dyn ThumbnailProcessor>,
    pub office: Arc<dyn DocumentConverter>,
    pub archive: Arc<dyn ArchiveExtractor>,
}

impl Processors {
    /// Production processors backed by the `image` crate and external tools.
    pub fn from_tools(tools: &ToolPaths) -> Self {
        let pdf = Arc::new(PdfProcessor::new(tools.pdftoppm.clone()));
        Self {
            image: Arc::new(ImageProcessor),
            measurer: Arc::new(ImageProcessor),
            pdf: pdf.clone(),
            text: pdf,
            glb: Arc::new(GlbProcessor::new(tools.glb_renderer.clone())),
            office: Arc::new(OfficeConverter::new(tools.soffice.clone())),
            archive: Arc::new(GltfArchiveExtractor),
        }
    }
}

#[derive(Clone)]
pub struct PipelineFactory {
    ctx: PipelineContext,
    processors: Processors,
}

impl PipelineFactory {
    pub fn new(ctx: PipelineContext, processors: Processors) -> Self {
        Self { ctx, processors }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    fn glb(&self) -> GlbPipeline {
        GlbPipeline::new(
            self.ctx.clone(),
            self.processors.glb.clone(),
            self.processors.measurer.clone(),
        )
    }

    fn pdf(&self) -> PdfPipeline {
        PdfPipeline::new(
            self.ctx.clone(),
            self.processors.pdf.clone(),
            self.processors.measurer.clone(),
            self.processors.text.clone(),
        )
    }

    pub fn create(&self, variant: PipelineVariant) -> Box<dyn Pipeline> {
        match variant {
            PipelineVariant::Pdf => Box::new(self.pdf()),
            PipelineVariant::Office => Box::new(OfficePipeline::new(
                self.ctx.clone(),
                self.processors.office.clone(),
                self.pdf(),
            )),
            PipelineVariant::Image => Box::new(ImagePipeline::new(
                self.ctx.clone(),
                self.processors.image.clone(),
                self.processors.measurer.clone(),
            )),
            PipelineVariant::Glb => Box::new(self.glb()),
            PipelineVariant::GltfArchive => Box::new(GltfArchivePipeline::new(
                self.ctx.clone(),
                self.processors.archive.clone(),
                self.glb(),
            )),
        }
    }

    /// Identify the variant for `opts` and build its pipeline. Unsupported
    /// input fails here, before any I/O.
    pub fn for_options(&self, opts: &RunOptions) -> PipelineResult<Box<dyn Pipeline>> {
        let variant = identify(&opts.key, opts.content_type.as_deref())?;
        Ok(self.create(variant))
    }
}
