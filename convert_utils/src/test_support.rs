//! Helpers shared by the unit tests.

use crate::codec::{ImageCodec, PixelBuffer};
use crate::formats::OutputFormat;
use crate::img_errors::CodecError;
use crate::types::Quality;
use image::{DynamicImage, Rgb, RgbImage};
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

/// Writes a small real image; the extension picks the encoder.
pub fn write_sample(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(8, 6, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 90]))
        .save(&path)
        .unwrap();
    path
}

/// Content-driven codec: files starting with `ok` decode to a 2x2 image,
/// `empty` decodes to a 0x0 image, anything else fails.
#[derive(Default)]
pub struct FakeCodec {
    fail_encode: Option<OutputFormat>,
    pub encoded: RefCell<Vec<(OutputFormat, Quality)>>,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_encode(format: OutputFormat) -> Self {
        Self {
            fail_encode: Some(format),
            ..Self::default()
        }
    }
}

impl ImageCodec for FakeCodec {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let bytes = std::fs::read(path)?;
        if bytes.starts_with(b"ok") {
            Ok(DynamicImage::new_rgb8(2, 2))
        } else if bytes.starts_with(b"empty") {
            Ok(DynamicImage::new_rgb8(0, 0))
        } else {
            Err(CodecError::IoError(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("not an image: {}", path.display()),
            )))
        }
    }

    fn encode(
        &self,
        _image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        if self.fail_encode == Some(format) {
            return Err(CodecError::IoError(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot encode {}", format),
            )));
        }
        self.encoded.borrow_mut().push((format, quality));
        Ok(format!("encoded:{}:{}", format, quality).into_bytes())
    }

    fn supported_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL.to_vec()
    }
}
