//! Rendition Processing Library
//!
//! Turns an uploaded object into derived artifacts. The pieces, leaves first:
//!
//! - processors (`raster`, `document`, `mesh`): stateless local transformations
//!   over file paths, behind the traits in `traits`
//! - `identifier`: pure mapping from an object key to a `PipelineVariant`
//! - `pipeline`: one orchestrator per variant (download, process, upload,
//!   patch, clean up)
//! - `factory`: builds a pipeline for a variant with its dependencies injected

pub(crate) mod command;
pub mod document;
pub mod error;
pub mod factory;
pub mod identifier;
pub mod mesh;
pub mod pipeline;
pub mod raster;
pub mod report;
pub mod temp;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use document::{OfficeConverter, PdfProcessor};
pub use error::{PipelineError, PipelineResult, ProcessingError, ProcessingResult};
pub use factory::{PipelineFactory, Processors};
pub use identifier::{identify, PipelineVariant};
pub use mesh::{GlbProcessor, GltfArchiveExtractor};
pub use pipeline::{Pipeline, PipelineContext};
pub use raster::ImageProcessor;
pub use report::{RunReport, RunStep, RunWarning};
pub use temp::TempPath;
pub use traits::{
    ArchiveExtractor, DocumentConverter, ImageMeasurer, TextExtractor, ThumbnailProcessor,
};
