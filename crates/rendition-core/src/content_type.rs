//! Content-type detection for stored artifacts.
//!
//! Artifacts are always produced locally with a known extension, so a fixed
//! table is enough; anything unknown is stored as `application/octet-stream`.

use std::path::Path;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPES: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".webp", "image/webp"),
    (".bmp", "image/bmp"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".pdf", "application/pdf"),
    (".txt", "text/plain; charset=utf-8"),
    (".json", "application/json"),
    (".glb", "model/gltf-binary"),
    (".gltf", "model/gltf+json"),
    (".zip", "application/zip"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".odt", "application/vnd.oasis.opendocument.text"),
    (".rtf", "application/rtf"),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (".ods", "application/vnd.oasis.opendocument.spreadsheet"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".odp", "application/vnd.oasis.opendocument.presentation"),
];

/// Lower-cased extension of `key` including the leading dot, or an empty
/// string when the final path segment has none.
pub fn extension_of(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(idx) if idx > 0 || name.len() > 1 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

pub fn content_type_for_extension(ext: &str) -> &'static str {
    let ext = ext.to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

pub fn content_type_for_path(path: &Path) -> &'static str {
    content_type_for_extension(&extension_of(&path.to_string_lossy()))
}

/// First known extension for a declared media type. Parameters such as
/// `; charset=utf-8` are ignored.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(_, known)| known.split(';').next().unwrap_or_default().trim() == essence)
        .map(|(ext, _)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("model.GLB"), ".glb");
        assert_eq!(extension_of("s1/preview.gltf"), ".gltf");
        assert_eq!(extension_of("dir.v2/README"), "");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of(""), "");
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for_extension(".png"), "image/png");
        assert_eq!(content_type_for_extension(".PDF"), "application/pdf");
        assert_eq!(content_type_for_extension(".xyz"), DEFAULT_CONTENT_TYPE);
        assert_eq!(
            content_type_for_path(Path::new("/tmp/abc.glb")),
            "model/gltf-binary"
        );
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some(".jpg"));
        assert_eq!(extension_for_content_type("Application/PDF"), Some(".pdf"));
        assert_eq!(
            extension_for_content_type("text/plain; charset=utf-8"),
            Some(".txt")
        );
        assert_eq!(extension_for_content_type("video/mp4"), None);
    }
}
