//! Processors that write fixed bytes instead of doing real work

use super::Journal;
use crate::error::{ProcessingError, ProcessingResult};
use crate::traits::{DocumentConverter, ImageMeasurer, TextExtractor, ThumbnailProcessor};
use async_trait::async_trait;
use rendition_core::ImageProps;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FAKE_THUMBNAIL: &[u8] = b"\x89PNG fake thumbnail";
pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake conversion";
pub const FAKE_IMAGE_PROPS: ImageProps = ImageProps {
    width: 256,
    height: 128,
};

fn simulated(tool: &str) -> ProcessingError {
    ProcessingError::ToolFailed {
        tool: tool.to_string(),
        stderr: "simulated failure".to_string(),
    }
}

#[derive(Clone)]
pub struct FakeThumbnailer {
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    journal: Journal,
}

impl FakeThumbnailer {
    pub fn new(journal: Journal) -> Self {
        Self {
            fail: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
            journal,
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailProcessor for FakeThumbnailer {
    async fn thumbnail(
        &self,
        input: &Path,
        _max_width: u32,
        _max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal
            .record(format!("processor.thumbnail {}", input.display()));
        if self.fail.load(Ordering::SeqCst) {
            // Leave a partial file behind like a crashed tool would.
            tokio::fs::write(output, b"partial").await?;
            return Err(simulated("thumbnailer"));
        }
        tokio::fs::write(output, FAKE_THUMBNAIL).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeMeasurer {
    fail: Arc<AtomicBool>,
    journal: Journal,
}

impl FakeMeasurer {
    pub fn new(journal: Journal) -> Self {
        Self {
            fail: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageMeasurer for FakeMeasurer {
    async fn measure(&self, input: &Path) -> ProcessingResult<ImageProps> {
        self.journal
            .record(format!("processor.measure {}", input.display()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(simulated("measurer"));
        }
        Ok(FAKE_IMAGE_PROPS)
    }
}

#[derive(Clone)]
pub struct FakeTextExtractor {
    result: Arc<Mutex<Result<String, String>>>,
    journal: Journal,
}

impl FakeTextExtractor {
    pub fn new(journal: Journal) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok("extracted text".to_string()))),
            journal,
        }
    }

    pub fn set_text(&self, text: &str) {
        *self.result.lock().unwrap() = Ok(text.to_string());
    }

    pub fn set_fail(&self) {
        *self.result.lock().unwrap() = Err("simulated failure".to_string());
    }
}

#[async_trait]
impl TextExtractor for FakeTextExtractor {
    async fn extract_text(&self, input: &Path) -> ProcessingResult<String> {
        self.journal
            .record(format!("processor.text {}", input.display()));
        self.result
            .lock()
            .unwrap()
            .clone()
            .map_err(ProcessingError::TextExtraction)
    }
}

#[derive(Clone)]
pub struct FakeConverter {
    fail: Arc<AtomicBool>,
    journal: Journal,
}

impl FakeConverter {
    pub fn new(journal: Journal) -> Self {
        Self {
            fail: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert_to_pdf(&self, input: &Path, output_dir: &Path) -> ProcessingResult<PathBuf> {
        self.journal
            .record(format!("processor.convert {}", input.display()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(simulated("soffice"));
        }
        let output = crate::document::OfficeConverter::output_path(input, output_dir);
        tokio::fs::write(&output, FAKE_PDF).await?;
        Ok(output)
    }
}
