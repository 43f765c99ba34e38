//! Image decoding with format detection, and format-aware encoding to disk.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError, ImageFormat, ImageResult};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
}

/// Synchronous codec helpers. Callers run these under `spawn_blocking`.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode an image from an in-memory byte buffer.
    ///
    /// The format is sniffed from the content first; the path's extension
    /// is only consulted when the content is not recognized.
    pub fn decode_bytes(bytes: &[u8], path: &Path) -> ImageResult<DecodedImage> {
        let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path)?,
        };
        let image = image::load_from_memory_with_format(bytes, format)?;
        Ok(DecodedImage { image, format })
    }

    /// Encode `image` to `path` in `format`.
    ///
    /// JPEG output drops any alpha channel and uses `jpeg_quality`.
    pub fn encode_to_path(
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> ImageResult<()> {
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(ImageError::Unsupported(
                image::error::UnsupportedError::from_format_and_kind(
                    format.into(),
                    image::error::UnsupportedErrorKind::Format(format.into()),
                ),
            ));
        }

        let mut writer = BufWriter::new(File::create(path)?);
        if format == ImageFormat::Jpeg {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpeg_quality))?;
        } else {
            image.write_with_encoder(PngEncoder::new(&mut writer))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Output format implied by a destination path's extension.
    pub fn format_for(path: &Path) -> ImageResult<ImageFormat> {
        ImageFormat::from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use image::GenericImageView;

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name are still decoded as PNG
        let bytes = test_fixtures::png_bytes(6, 3);
        let decoded = ImageDecoder::decode_bytes(&bytes, Path::new("misnamed.jpg")).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.image.dimensions(), (6, 3));
    }

    #[test]
    fn test_decode_rejects_truncated_jpeg() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert!(ImageDecoder::decode_bytes(&bytes, Path::new("bad.jpg")).is_err());
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let rgba = DynamicImage::new_rgba8(10, 5);

        ImageDecoder::encode_to_path(&rgba, &path, ImageFormat::Jpeg, 80).unwrap();
        let decoded = ImageDecoder::decode_bytes(&std::fs::read(&path).unwrap(), &path).unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);
        assert_eq!(decoded.image.dimensions(), (10, 5));
    }

    #[test]
    fn test_encode_unsupported_format_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let result = ImageDecoder::encode_to_path(
            &DynamicImage::new_rgb8(2, 2),
            &path,
            ImageFormat::Gif,
            80,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_format_for_extension() {
        assert_eq!(
            ImageDecoder::format_for(Path::new("a.JPEG")).unwrap(),
            ImageFormat::Jpeg
        );
        assert!(ImageDecoder::format_for(Path::new("a")).is_err());
    }
}
