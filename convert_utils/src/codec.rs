//! Codec seam
//!
//! [`ImageCodec`] is the only place pixels are touched. The batch logic never
//! interprets quality per format; that mapping lives in the codec.

use crate::formats::OutputFormat;
use crate::img_errors::CodecError;
use crate::types::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

/// Decoded image handed from `decode` to `encode`.
pub type PixelBuffer = DynamicImage;

pub trait ImageCodec {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;

    fn supported_formats(&self) -> Vec<OutputFormat>;
}

impl<C: ImageCodec + ?Sized> ImageCodec for &C {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        (**self).decode(path)
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        (**self).encode(image, format, quality)
    }

    fn supported_formats(&self) -> Vec<OutputFormat> {
        (**self).supported_formats()
    }
}

/// Production codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

/// JPEG's scale starts at 1.
fn jpeg_quality(quality: Quality) -> u8 {
    quality.value().max(1)
}

/// High quality spends little effort compressing, low quality squeezes hardest.
fn png_compression(quality: Quality) -> CompressionType {
    match quality.value() {
        0..=33 => CompressionType::Best,
        34..=66 => CompressionType::Default,
        _ => CompressionType::Fast,
    }
}

/// Converts to a pixel layout the target encoder accepts.
fn normalize_for(format: OutputFormat, image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match format {
        // PNG has no float samples; widen to 16-bit instead
        OutputFormat::Png => match image {
            DynamicImage::ImageRgb32F(_) => Cow::Owned(DynamicImage::ImageRgb16(image.to_rgb16())),
            DynamicImage::ImageRgba32F(_) => {
                Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
            }
            _ => Cow::Borrowed(image),
        },
        OutputFormat::Jpeg => match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => Cow::Borrowed(image),
            _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        },
        OutputFormat::Webp
        | OutputFormat::Bmp
        | OutputFormat::Gif
        | OutputFormat::Tiff
        | OutputFormat::Ico => {
            match image {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
                _ if image.color().has_alpha() => {
                    Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
                }
                _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
            }
        }
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(CodecError::EmptyImage);
        }
        Ok(image)
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let prepared = normalize_for(format, image);
        let mut buffer = Cursor::new(Vec::new());

        match format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
                prepared.write_with_encoder(encoder)?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    png_compression(quality),
                    FilterType::Adaptive,
                );
                prepared.write_with_encoder(encoder)?;
            }
            other => prepared.write_to(&mut buffer, other.image_format())?,
        }

        Ok(buffer.into_inner())
    }

    fn supported_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 5) as u8, 128, 200])
        }))
    }

    #[test]
    fn test_float_image_encodes_as_sixteen_bit_png() {
        let codec = RasterCodec::new();
        let float_rgb = DynamicImage::ImageRgb32F(image::Rgb32FImage::from_fn(5, 3, |x, y| {
            Rgb([x as f32 / 4.0, y as f32 / 2.0, 0.5])
        }));
        let float_rgba = DynamicImage::ImageRgba32F(image::Rgba32FImage::from_fn(5, 3, |x, _| {
            Rgba([x as f32 / 4.0, 0.25, 1.0, 0.75])
        }));

        for (image, expected) in [
            (float_rgb, image::ColorType::Rgb16),
            (float_rgba, image::ColorType::Rgba16),
        ] {
            let bytes = codec.encode(&image, OutputFormat::Png, Quality::default()).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.color(), expected);
            assert_eq!((decoded.width(), decoded.height()), (5, 3));
        }
    }

    #[test]
    fn test_quality_mappings() {
        assert_eq!(jpeg_quality(Quality::new(0)), 1);
        assert_eq!(jpeg_quality(Quality::new(80)), 80);
        assert!(matches!(png_compression(Quality::new(0)), CompressionType::Best));
        assert!(matches!(png_compression(Quality::new(50)), CompressionType::Default));
        assert!(matches!(png_compression(Quality::new(100)), CompressionType::Fast));
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let image = gradient_rgba(4, 4);
        let prepared = normalize_for(OutputFormat::Jpeg, &image);
        assert!(!prepared.color().has_alpha());

        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(normalize_for(OutputFormat::Jpeg, &rgb), Cow::Borrowed(_)));
    }

    #[test]
    fn test_every_supported_format_encodes_and_decodes() {
        let codec = RasterCodec::new();
        let image = gradient_rgba(16, 12);
        let dir = tempfile::tempdir().unwrap();

        for format in codec.supported_formats() {
            let bytes = codec
                .encode(&image, format, Quality::new(80))
                .unwrap_or_else(|e| panic!("{format} encode failed: {e}"));
            assert!(!bytes.is_empty(), "{format} produced no bytes");

            let path = dir.path().join(format!("probe.{}", format.identifier()));
            std::fs::write(&path, &bytes).unwrap();
            let decoded = codec.decode(&path).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (16, 12), "{format}");
        }
    }

    #[test]
    fn test_jpeg_quality_changes_output_size() {
        let codec = RasterCodec::new();
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8])
        }));
        let low = codec.encode(&image, OutputFormat::Jpeg, Quality::new(5)).unwrap();
        let high = codec.encode(&image, OutputFormat::Jpeg, Quality::new(100)).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(RasterCodec::new().decode(&path).is_err());
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let err = RasterCodec::new()
            .decode(Path::new("/nonexistent/dir/missing.png"))
            .unwrap_err();
        assert!(matches!(err, CodecError::IoError(_)));
    }

    #[test]
    fn test_ico_rejects_oversized_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(300, 10));
        assert!(RasterCodec::new()
            .encode(&image, OutputFormat::Ico, Quality::default())
            .is_err());
    }
}
