//! EXIF orientation lookup and correction.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::io::Cursor;

/// EXIF `Orientation` values (tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1: already upright
    Normal,
    /// 2: mirrored left-right
    FlipHorizontal,
    /// 3: upside down
    Rotate180,
    /// 4: mirrored top-bottom
    FlipVertical,
    /// 5: mirrored across the main diagonal
    Transpose,
    /// 6: needs a 90° clockwise turn
    Rotate90,
    /// 7: mirrored across the anti-diagonal
    Transverse,
    /// 8: needs a 270° clockwise turn
    Rotate270,
}

impl Orientation {
    /// Map a raw EXIF value; anything outside 1..=8 is invalid.
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Whether pixels must be transformed to display upright.
    pub fn needs_correction(self) -> bool {
        self != Self::Normal
    }

    /// Return the upright version of an image stored with this orientation.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::FlipHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVertical => image.flipv(),
            Self::Transpose => image.rotate90().fliph(),
            Self::Rotate90 => image.rotate90(),
            Self::Transverse => image.rotate270().fliph(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

/// Reads EXIF metadata from encoded image bytes.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Read the orientation tag from an in-memory JPEG/PNG/TIFF container.
    ///
    /// Returns `None` if there is no EXIF block, no orientation field, or
    /// the value is out of range.
    pub fn orientation(bytes: &[u8]) -> Option<Orientation> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;
        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        let raw = match &field.value {
            Value::Short(v) => v.first().map(|&x| x as u32),
            Value::Long(v) => v.first().copied(),
            _ => None,
        }?;
        Orientation::from_exif(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use image::GenericImageView;

    #[test]
    fn test_orientation_from_tagged_jpeg() {
        let bytes = test_fixtures::jpeg_with_orientation(8, 4, 6);
        assert_eq!(
            MetadataExtractor::orientation(&bytes),
            Some(Orientation::Rotate90)
        );
    }

    #[test]
    fn test_orientation_missing_without_exif() {
        let bytes = test_fixtures::jpeg_bytes(8, 4);
        assert_eq!(MetadataExtractor::orientation(&bytes), None);
    }

    #[test]
    fn test_orientation_garbage_bytes() {
        assert_eq!(MetadataExtractor::orientation(b"not an image"), None);
    }

    #[test]
    fn test_from_exif_range() {
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
        assert!(!Orientation::from_exif(1).unwrap().needs_correction());
        assert!(Orientation::from_exif(3).unwrap().needs_correction());
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let img = DynamicImage::new_rgb8(40, 20);
        for o in [
            Orientation::Transpose,
            Orientation::Rotate90,
            Orientation::Transverse,
            Orientation::Rotate270,
        ] {
            assert_eq!(o.apply(img.clone()).dimensions(), (20, 40));
        }
        for o in [
            Orientation::Normal,
            Orientation::FlipHorizontal,
            Orientation::Rotate180,
            Orientation::FlipVertical,
        ] {
            assert_eq!(o.apply(img.clone()).dimensions(), (40, 20));
        }
    }

    #[test]
    fn test_transpose_maps_pixels_across_diagonal() {
        let mut buf = image::RgbImage::new(3, 2);
        buf.put_pixel(2, 0, image::Rgb([255, 0, 0]));
        let out = Orientation::Transpose.apply(DynamicImage::ImageRgb8(buf));
        assert_eq!(out.to_rgb8().get_pixel(0, 2), &image::Rgb([255, 0, 0]));
    }
}
