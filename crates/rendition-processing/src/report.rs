use crate::identifier::PipelineVariant;
use rendition_core::ArtifactRef;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Steps whose failure is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStep {
    Thumbnail,
    Measure,
    TextExtraction,
}

impl Display for RunStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RunStep::Thumbnail => write!(f, "thumbnail"),
            RunStep::Measure => write!(f, "measure"),
            RunStep::TextExtraction => write!(f, "text_extraction"),
        }
    }
}

/// A tolerated failure: logged, recorded here, never a fatal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunWarning {
    pub step: RunStep,
    pub message: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub variant: PipelineVariant,
    pub preview: Option<ArtifactRef>,
    pub thumbnail: Option<ArtifactRef>,
    pub text: Option<ArtifactRef>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub fn new(variant: PipelineVariant) -> Self {
        Self {
            variant,
            preview: None,
            thumbnail: None,
            text: None,
            warnings: Vec::new(),
        }
    }

    /// Record a tolerated failure and log it at warn.
    pub fn warn(&mut self, step: RunStep, error: impl Display) {
        tracing::warn!(step = %step, error = %error, "Tolerated processing failure");
        self.warnings.push(RunWarning {
            step,
            message: error.to_string(),
        });
    }

    /// Unwrap a tolerated step: `Some` on success, `None` with a warning recorded.
    pub fn tolerate<T, E: Display>(&mut self, step: RunStep, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.warn(step, e);
                None
            }
        }
    }

    pub fn has_warning(&self, step: RunStep) -> bool {
        self.warnings.iter().any(|w| w.step == step)
    }
}
