//! Raster image processor: thumbnails and measurement with the `image` crate.

use crate::error::ProcessingResult;
use crate::traits::{ImageMeasurer, ThumbnailProcessor};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat, ImageReader};
use rendition_core::ImageProps;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Largest size fitting in `max_width` x `max_height` with the aspect ratio
/// kept. Images already inside the box are left at their size.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.clamp(1, max_width), h.clamp(1, max_height))
}

/// Opens `path` with the decoder chosen from its content, so files without
/// a meaningful extension still decode.
fn open_reader(path: &Path) -> ProcessingResult<ImageReader<BufReader<File>>> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    fn thumbnail_blocking(
        input: &Path,
        max_width: u32,
        max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()> {
        let img = open_reader(input)?.decode()?;
        let (width, height) = img.dimensions();
        let (target_width, target_height) = fit_within(width, height, max_width, max_height);

        let thumbnail = if (target_width, target_height) == (width, height) {
            img
        } else {
            img.resize_exact(target_width, target_height, FilterType::Lanczos3)
        };

        thumbnail.save_with_format(output, ImageFormat::Png)?;
        Ok(())
    }
}

#[async_trait]
impl ThumbnailProcessor for ImageProcessor {
    async fn thumbnail(
        &self,
        input: &Path,
        max_width: u32,
        max_height: u32,
        output: &Path,
    ) -> ProcessingResult<()> {
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || {
            Self::thumbnail_blocking(&input, max_width, max_height, &output)
        })
        .await?
    }
}

#[async_trait]
impl ImageMeasurer for ImageProcessor {
    async fn measure(&self, input: &Path) -> ProcessingResult<ImageProps> {
        let input = input.to_path_buf();
        let (width, height) =
            tokio::task::spawn_blocking(move || -> ProcessingResult<(u32, u32)> {
                Ok(open_reader(&input)?.into_dimensions()?)
            })
            .await??;
        Ok(ImageProps { width, height })
    }
}
