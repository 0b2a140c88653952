use crate::command::run_tool;
use crate::error::{ProcessingError, ProcessingResult};
use crate::traits::DocumentConverter;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Converts office documents to PDF with a headless LibreOffice.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    soffice_path: String,
}

impl OfficeConverter {
    pub fn new(soffice_path: impl Into<String>) -> Self {
        Self {
            soffice_path: soffice_path.into(),
        }
    }

    /// Where soffice writes the PDF for `input`: `<output_dir>/<stem>.pdf`.
    pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .unwrap_or_else(|| OsStr::new("document"));
        output_dir.join(stem).with_extension("pdf")
    }
}

#[async_trait]
impl DocumentConverter for OfficeConverter {
    async fn convert_to_pdf(&self, input: &Path, output_dir: &Path) -> ProcessingResult<PathBuf> {
        run_tool(
            &self.soffice_path,
            [
                OsStr::new("--headless"),
                OsStr::new("--convert-to"),
                OsStr::new("pdf"),
                OsStr::new("--outdir"),
                output_dir.as_os_str(),
                input.as_os_str(),
            ],
        )
        .await?;

        let output = Self::output_path(input, output_dir);
        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(ProcessingError::MissingOutput {
                tool: self.soffice_path.clone(),
                path: output.display().to_string(),
            });
        }

        Ok(output)
    }
}
