//! Pipeline identification
//!
//! A pure mapping from an object key (and, when the key is not enough, a
//! declared media type) to the pipeline variant that handles it.

use crate::error::{PipelineError, PipelineResult};
use rendition_core::{extension_for_content_type, extension_of};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const PDF_EXTENSIONS: &[&str] = &[".pdf"];
const OFFICE_EXTENSIONS: &[&str] = &[
    ".doc", ".docx", ".odt", ".rtf", ".xls", ".xlsx", ".ods", ".ppt", ".pptx", ".odp",
];
const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp", ".tif", ".tiff",
];
const GLB_EXTENSIONS: &[&str] = &[".glb", ".gltf"];
const GLTF_ARCHIVE_EXTENSIONS: &[&str] = &[".zip"];

/// Closed set of pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    Pdf,
    Office,
    Image,
    Glb,
    GltfArchive,
}

impl PipelineVariant {
    pub const ALL: [PipelineVariant; 5] = [
        PipelineVariant::Pdf,
        PipelineVariant::Office,
        PipelineVariant::Image,
        PipelineVariant::Glb,
        PipelineVariant::GltfArchive,
    ];

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            PipelineVariant::Pdf => PDF_EXTENSIONS,
            PipelineVariant::Office => OFFICE_EXTENSIONS,
            PipelineVariant::Image => IMAGE_EXTENSIONS,
            PipelineVariant::Glb => GLB_EXTENSIONS,
            PipelineVariant::GltfArchive => GLTF_ARCHIVE_EXTENSIONS,
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.extensions().contains(&ext))
    }
}

impl Display for PipelineVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineVariant::Pdf => write!(f, "pdf"),
            PipelineVariant::Office => write!(f, "office"),
            PipelineVariant::Image => write!(f, "image"),
            PipelineVariant::Glb => write!(f, "glb"),
            PipelineVariant::GltfArchive => write!(f, "gltf_archive"),
        }
    }
}

impl FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(PipelineVariant::Pdf),
            "office" => Ok(PipelineVariant::Office),
            "image" => Ok(PipelineVariant::Image),
            "glb" => Ok(PipelineVariant::Glb),
            "gltf_archive" => Ok(PipelineVariant::GltfArchive),
            _ => Err(format!("Invalid pipeline variant: {}", s)),
        }
    }
}

/// Resolve the variant for `key`.
///
/// The key's extension decides (case-insensitively). The declared media type
/// is consulted only when the extension is missing or unknown. Anything else
/// is `PipelineError::Unsupported`, raised before any I/O.
pub fn identify(key: &str, declared_type: Option<&str>) -> PipelineResult<PipelineVariant> {
    PipelineVariant::from_extension(&extension_of(key))
        .or_else(|| {
            declared_type
                .and_then(extension_for_content_type)
                .and_then(PipelineVariant::from_extension)
        })
        .ok_or_else(|| PipelineError::Unsupported {
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_by_extension() {
        assert_eq!(identify("a.glb", None).unwrap(), PipelineVariant::Glb);
        assert_eq!(identify("docs/report.PDF", None).unwrap(), PipelineVariant::Pdf);
        assert_eq!(identify("slides.pptx", None).unwrap(), PipelineVariant::Office);
        assert_eq!(identify("photo.JPeG", None).unwrap(), PipelineVariant::Image);
        assert_eq!(
            identify("scene.zip", None).unwrap(),
            PipelineVariant::GltfArchive
        );
    }

    #[test]
    fn test_extension_wins_over_declared_type() {
        let variant = identify("model.glb", Some("application/pdf")).unwrap();
        assert_eq!(variant, PipelineVariant::Glb);
    }

    #[test]
    fn test_declared_type_used_for_unknown_extension() {
        assert_eq!(
            identify("uploads/blob", Some("application/pdf")).unwrap(),
            PipelineVariant::Pdf
        );
        assert_eq!(
            identify("uploads/blob.bin", Some("model/gltf-binary")).unwrap(),
            PipelineVariant::Glb
        );
    }

    #[test]
    fn test_unsupported_is_distinguished() {
        let err = identify("movie.mp4", None).unwrap_err();
        assert!(err.is_unsupported());
        assert!(!err.is_retryable());

        let err = identify("README", Some("video/mp4")).unwrap_err();
        assert!(matches!(err, PipelineError::Unsupported { key } if key == "README"));

        // A directory named like a supported file does not count.
        assert!(identify("scene.zip/", None).is_err());
    }

    #[test]
    fn test_variant_names_round_trip() {
        for variant in PipelineVariant::ALL {
            assert_eq!(variant.to_string().parse::<PipelineVariant>().unwrap(), variant);
        }
    }
}
