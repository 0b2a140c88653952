use crate::command::run_tool;
use crate::error::{ProcessingError, ProcessingResult};
use crate::traits::ThumbnailProcessor;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;

/// Renders a PNG snapshot of a glTF/GLB scene with an external headless
/// renderer invoked as `<renderer> -i <input> -o <output> --width W --height H`.
#[derive(Debug, Clone)]
pub struct GlbProcessor {
    renderer_path: String,
}

impl GlbProcessor {
    pub fn new(renderer_path: impl Into<String>) -> Self {
        Self {
            renderer_path: renderer_path.into(),
        }
    }
}

#[async_trait]
impl ThumbnailProcessor for GlbProcessor {
    async fn thumbnail(
        &self,
        input: &Path,
        max_width: u32,
        max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()> {
        let width = max_width.to_string();
        let height = max_height.to_string();

        run_tool(
            &self.renderer_path,
            [
                OsStr::new("-i"),
                input.as_os_str(),
                OsStr::new("-o"),
                output.as_os_str(),
                OsStr::new("--width"),
                OsStr::new(&width),
                OsStr::new("--height"),
                OsStr::new(&height),
            ],
        )
        .await?;

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(ProcessingError::MissingOutput {
                tool: self.renderer_path.clone(),
                path: output.display().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_renderer_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scene.glb");
        std::fs::write(&input, b"glTF").unwrap();

        let err = GlbProcessor::new("rendition-missing-glb-renderer")
            .thumbnail(&input, 320, 240, &dir.path().join("thumb.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_renderer_without_output_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scene.glb");
        std::fs::write(&input, b"glTF").unwrap();

        let err = GlbProcessor::new("true")
            .thumbnail(&input, 320, 240, &dir.path().join("thumb.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MissingOutput { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_renderer_exit_status_is_reported() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scene.glb");
        std::fs::write(&input, b"glTF").unwrap();

        let err = GlbProcessor::new("false")
            .thumbnail(&input, 320, 240, &dir.path().join("thumb.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ToolFailed { .. }));
    }
}
