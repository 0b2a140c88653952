use crate::error::{ProcessingError, ProcessingResult};
use crate::traits::ArchiveExtractor;
use async_trait::async_trait;
use rendition_core::extension_of;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const MAX_ARCHIVE_ENTRIES: usize = 10_000;
/// Upper bound on the bytes one archive may expand to.
const MAX_ARCHIVE_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Expands zip archives with the `zip` crate.
///
/// Entries whose names would escape the output directory are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfArchiveExtractor;

impl GltfArchiveExtractor {
    fn extract_blocking(
        archive: &Path,
        output_dir: &Path,
        max_bytes: u64,
    ) -> ProcessingResult<Vec<PathBuf>> {
        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file)?;

        if zip.len() > MAX_ARCHIVE_ENTRIES {
            return Err(ProcessingError::Archive(format!(
                "Archive has {} entries, limit is {}",
                zip.len(),
                MAX_ARCHIVE_ENTRIES
            )));
        }

        let mut extracted = Vec::new();
        let mut total: u64 = 0;
        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;

            let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
                tracing::warn!(name = %entry.name(), "Skipping archive entry with unsafe path");
                continue;
            };
            let target = output_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            // Sizes in the central directory are not trusted; count what is written.
            let remaining = max_bytes - total;
            let mut out = File::create(&target)?;
            let copied = io::copy(&mut (&mut entry).take(remaining + 1), &mut out)?;
            if copied > remaining {
                return Err(ProcessingError::Archive(format!(
                    "Archive expands beyond {} bytes",
                    max_bytes
                )));
            }
            total += copied;
            extracted.push(target);
        }

        Ok(extracted)
    }
}

#[async_trait]
impl ArchiveExtractor for GltfArchiveExtractor {
    async fn extract(&self, archive: &Path, output_dir: &Path) -> ProcessingResult<Vec<PathBuf>> {
        let archive = archive.to_path_buf();
        let output_dir = output_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            Self::extract_blocking(&archive, &output_dir, MAX_ARCHIVE_BYTES)
        })
        .await?
    }
}

/// Pick the renderable scene among extracted files: a `.glb` if there is one,
/// otherwise a `.gltf`. Ties go to the shallowest path, then by name.
pub fn select_scene(files: &[PathBuf]) -> Option<PathBuf> {
    [".glb", ".gltf"].iter().find_map(|wanted| {
        files
            .iter()
            .filter(|f| extension_of(&f.to_string_lossy()) == *wanted)
            .min_by(|a, b| {
                a.components()
                    .count()
                    .cmp(&b.components().count())
                    .then_with(|| a.cmp(b))
            })
            .cloned()
    })
}
