use rendition_api_client::ClientError;
use rendition_storage::StorageError;
use std::io;
use thiserror::Error;

/// Failure inside a processor. Processors never touch the network, so these
/// are always local: a tool failed, a file could not be decoded, and so on.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to execute {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("{tool} produced no output at {path}")]
    MissingOutput { tool: String, path: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Background task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for ProcessingError {
    fn from(e: tokio::task::JoinError) -> Self {
        ProcessingError::Join(e.to_string())
    }
}

impl From<zip::result::ZipError> for ProcessingError {
    fn from(e: zip::result::ZipError) -> Self {
        ProcessingError::Archive(e.to_string())
    }
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Failure of a whole run. Every variant is fatal; tolerated failures never
/// become a `PipelineError` and are reported as warnings instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported input: {key}")]
    Unsupported { key: String },

    #[error("Object store error: {0}")]
    Storage(#[from] StorageError),

    #[error("Tracking service error: {0}")]
    Client(#[from] ClientError),

    #[error("Processing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("{context}: {source}")]
    Resource {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn resource(context: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Resource {
            context: context.into(),
            source,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, PipelineError::Unsupported { .. })
    }

    /// Whether re-running the same options may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Unsupported { .. } => false,
            PipelineError::Storage(e) => e.is_transient(),
            PipelineError::Client(e) => e.is_transient(),
            PipelineError::Processing(_) => false,
            PipelineError::Resource { .. } => true,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rendition_api_client::StatusCode;

    #[test]
    fn test_retry_classification() {
        let unsupported = PipelineError::Unsupported {
            key: "a.exe".to_string(),
        };
        assert!(unsupported.is_unsupported());
        assert!(!unsupported.is_retryable());

        let unavailable = PipelineError::from(ClientError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        });
        assert!(unavailable.is_retryable());

        let missing = PipelineError::from(StorageError::NotFound("b/a.glb".to_string()));
        assert!(!missing.is_retryable());

        let tool = PipelineError::from(ProcessingError::ToolFailed {
            tool: "soffice".to_string(),
            stderr: "bad file".to_string(),
        });
        assert!(!tool.is_retryable());

        let disk = PipelineError::resource(
            "Failed to create temp dir",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(disk.is_retryable());
        assert!(disk.to_string().starts_with("Failed to create temp dir"));
    }
}
