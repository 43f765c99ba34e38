//! Thumbnail generation: orientation-aware decode, proportional resize, write.
//!
//! A probe inspects the source's EXIF orientation and picks a strategy:
//!
//! - `RotateThenResize`: decode, turn the pixels upright, rewrite the source
//!   in place with the corrected orientation, then resize into the destination.
//! - `PlainResize`: decode and resize as stored.
//!
//! If `RotateThenResize` fails at any step the transformer falls back to
//! `PlainResize` on the original bytes. Only when both fail does the task fail.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

use crate::config::ResizeConfig;
use crate::error::PipelineError;
use crate::types::Outcome;

use super::decode::ImageDecoder;
use super::metadata::{MetadataExtractor, Orientation};

/// Quality used when rewriting a rotated JPEG source.
const SOURCE_REWRITE_QUALITY: u8 = 100;

/// Something that turns one source image into one destination image.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Produce `dst` from `src` at `height` pixels tall.
    async fn transform(&self, src: &Path, dst: &Path, height: u32)
        -> Result<Outcome, PipelineError>;
}

/// How a source will be processed, chosen by [`ImageTransformer::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RotateThenResize(Orientation),
    PlainResize,
}

/// Resizes images to a fixed height with bicubic filtering.
#[derive(Debug, Clone, Copy)]
pub struct ImageTransformer {
    jpeg_quality: u8,
}

impl ImageTransformer {
    /// Create a transformer with the given resize settings.
    pub fn new(config: &ResizeConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Pick a strategy from the source bytes' EXIF orientation.
    pub fn probe(bytes: &[u8]) -> Strategy {
        match MetadataExtractor::orientation(bytes) {
            Some(o) if o.needs_correction() => Strategy::RotateThenResize(o),
            _ => Strategy::PlainResize,
        }
    }

    /// Width that keeps the aspect ratio at the given height (at least 1).
    pub fn proportional_width(width: u32, height: u32, target_height: u32) -> u32 {
        let scaled = (width as f64 * target_height as f64 / height.max(1) as f64).round();
        (scaled as u32).max(1)
    }

    /// Resize to `target_height`, deriving the width.
    pub fn resize_to_height(image: &DynamicImage, target_height: u32) -> DynamicImage {
        let (w, h) = image.dimensions();
        let width = Self::proportional_width(w, h, target_height);
        image.resize_exact(width, target_height, FilterType::CatmullRom)
    }

    /// Run the full transform synchronously. Intended for `spawn_blocking`.
    pub fn transform_blocking(
        &self,
        src: &Path,
        dst: &Path,
        height: u32,
    ) -> Result<Outcome, PipelineError> {
        let bytes = std::fs::read(src).map_err(|e| PipelineError::transform(src, e))?;

        if let Strategy::RotateThenResize(orientation) = Self::probe(&bytes) {
            match self.rotate_then_resize(&bytes, orientation, src, dst, height) {
                Ok(()) => return Ok(Outcome::Rotated),
                Err(e) => {
                    tracing::warn!(
                        "Orientation correction failed for {:?}, resizing as stored: {}",
                        src,
                        e
                    );
                }
            }
        }

        self.plain_resize(&bytes, src, dst, height)
            .map_err(|e| PipelineError::transform(src, e))?;
        Ok(Outcome::Resized)
    }

    fn rotate_then_resize(
        &self,
        bytes: &[u8],
        orientation: Orientation,
        src: &Path,
        dst: &Path,
        height: u32,
    ) -> image::ImageResult<()> {
        let decoded = ImageDecoder::decode_bytes(bytes, src)?;
        let upright = orientation.apply(decoded.image);
        tracing::trace!("Corrected {:?} ({:?})", src, orientation);

        // Re-encoding drops the EXIF block, so a later run sees an upright source.
        replace_via_staging(&upright, src, decoded.format)?;

        self.write_resized(&upright, dst, height)
    }

    fn plain_resize(
        &self,
        bytes: &[u8],
        src: &Path,
        dst: &Path,
        height: u32,
    ) -> image::ImageResult<()> {
        let decoded = ImageDecoder::decode_bytes(bytes, src)?;
        self.write_resized(&decoded.image, dst, height)
    }

    fn write_resized(&self, image: &DynamicImage, dst: &Path, height: u32) -> image::ImageResult<()> {
        let resized = Self::resize_to_height(image, height);
        let format = ImageDecoder::format_for(dst)?;
        ImageDecoder::encode_to_path(&resized, dst, format, self.jpeg_quality)
    }
}

#[async_trait]
impl Transform for ImageTransformer {
    async fn transform(
        &self,
        src: &Path,
        dst: &Path,
        height: u32,
    ) -> Result<Outcome, PipelineError> {
        let this = *self;
        let src_owned = src.to_path_buf();
        let dst_owned = dst.to_path_buf();

        tokio::task::spawn_blocking(move || this.transform_blocking(&src_owned, &dst_owned, height))
            .await
            .map_err(|e| PipelineError::Worker(format!("Task join error: {}", e)))?
    }
}

/// Rewrite `target` with `image` through a sibling staging file and a rename.
///
/// On failure the staging file is removed, so no stray unsupported file is
/// left next to the sources.
fn replace_via_staging(
    image: &DynamicImage,
    target: &Path,
    format: image::ImageFormat,
) -> image::ImageResult<()> {
    let staging = staging_path(target);
    let result = ImageDecoder::encode_to_path(image, &staging, format, SOURCE_REWRITE_QUALITY)
        .and_then(|()| std::fs::rename(&staging, target).map_err(image::ImageError::from));

    if result.is_err() && staging.is_file() {
        if let Err(e) = std::fs::remove_file(&staging) {
            tracing::warn!("Could not remove staging file {:?}: {}", staging, e);
        } else {
            tracing::warn!("Removed staging file {:?} after a failed rewrite", staging);
        }
    }
    result
}

/// Sibling path used to stage an in-place rewrite before the rename.
fn staging_path(src: &Path) -> PathBuf {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    src.with_file_name(format!(".{name}.quickthumb-tmp"))
}
