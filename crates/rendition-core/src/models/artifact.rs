use serde::{Deserialize, Serialize};

/// Pixel dimensions of a raster artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProps {
    pub width: u32,
    pub height: u32,
}

/// Pointer to a blob in the object store, never the blob itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub bucket: String,
    pub key: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageProps>,
}

impl ArtifactRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size: u64) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageProps) -> Self {
        self.image = Some(image);
        self
    }
}
