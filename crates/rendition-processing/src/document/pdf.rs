use crate::command::run_tool;
use crate::error::{ProcessingError, ProcessingResult};
use crate::raster::ImageProcessor;
use crate::temp::TempPath;
use crate::traits::{TextExtractor, ThumbnailProcessor};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// PDF processor.
///
/// Thumbnails render the first page with `pdftoppm`, then fit it to the box
/// with the raster processor. Text comes from `pdf-extract`.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    pdftoppm_path: String,
    image: ImageProcessor,
}

impl PdfProcessor {
    pub fn new(pdftoppm_path: impl Into<String>) -> Self {
        Self {
            pdftoppm_path: pdftoppm_path.into(),
            image: ImageProcessor,
        }
    }
}

/// Output root handed to pdftoppm and the file it renders there. pdftoppm
/// appends ".png" to the root, so the page lands next to `output` under its
/// own name.
fn page_paths(output: &Path) -> (PathBuf, PathBuf) {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let root = output.with_file_name(format!("{}-page", stem));
    let rendered = output.with_file_name(format!("{}-page.png", stem));
    (root, rendered)
}

#[async_trait]
impl ThumbnailProcessor for PdfProcessor {
    async fn thumbnail(
        &self,
        input: &Path,
        max_width: u32,
        max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()> {
        let (root, rendered) = page_paths(output);
        let page = TempPath::adopt_file(rendered);
        let scale = max_width.max(max_height).to_string();

        run_tool(
            &self.pdftoppm_path,
            [
                OsStr::new("-png"),
                OsStr::new("-f"),
                OsStr::new("1"),
                OsStr::new("-l"),
                OsStr::new("1"),
                OsStr::new("-singlefile"),
                OsStr::new("-scale-to"),
                OsStr::new(&scale),
                input.as_os_str(),
                root.as_os_str(),
            ],
        )
        .await?;

        if !tokio::fs::try_exists(page.path()).await.unwrap_or(false) {
            return Err(ProcessingError::MissingOutput {
                tool: self.pdftoppm_path.clone(),
                path: page.path().display().to_string(),
            });
        }

        self.image
            .thumbnail(page.path(), max_width, max_height, output)
            .await
    }
}

#[async_trait]
impl TextExtractor for PdfProcessor {
    async fn extract_text(&self, input: &Path) -> ProcessingResult<String> {
        let input = input.to_path_buf();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&input))
            .await?
            .map_err(|e| ProcessingError::TextExtraction(e.to_string()))?;

        let trimmed = text.trim();
        tracing::debug!(text_len = trimmed.len(), "PDF text extracted");
        Ok(trimmed.to_string())
    }
}
