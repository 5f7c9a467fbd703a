//! Output format enumeration and the catalog of codec-supported formats.

use crate::codec::ImageCodec;
use crate::img_errors::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Target format for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Bmp,
    Gif,
    Tiff,
    Ico,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Webp,
        OutputFormat::Bmp,
        OutputFormat::Gif,
        OutputFormat::Tiff,
        OutputFormat::Ico,
    ];

    /// Canonical lowercase identifier, also the extension written by
    /// same-location naming.
    pub fn identifier(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Ico => "ico",
        }
    }

    /// Every extension that already names this format. The identifier comes first.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            OutputFormat::Png => &["png"],
            OutputFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            OutputFormat::Webp => &["webp"],
            OutputFormat::Bmp => &["bmp"],
            OutputFormat::Gif => &["gif"],
            OutputFormat::Tiff => &["tiff", "tif"],
            OutputFormat::Ico => &["ico"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Webp => "WEBP",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Gif => "GIF",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Ico => "ICO",
        }
    }

    pub fn from_identifier(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('.');
        Self::ALL.into_iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(name))
        })
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    pub(crate) fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Webp => image::ImageFormat::WebP,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Gif => image::ImageFormat::Gif,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Ico => image::ImageFormat::Ico,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Formats the codec can write, queried once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCatalog {
    formats: Vec<OutputFormat>,
}

impl FormatCatalog {
    pub fn from_codec<C: ImageCodec + ?Sized>(codec: &C) -> Self {
        let mut formats = codec.supported_formats();
        formats.sort();
        formats.dedup();
        tracing::debug!(count = formats.len(), "Loaded codec format catalog");
        Self { formats }
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Resolves a user-supplied identifier; anything unknown or not offered
    /// by the codec is rejected before a request is built.
    pub fn resolve(&self, name: &str) -> Result<OutputFormat, ConvertError> {
        match OutputFormat::from_identifier(name) {
            Some(format) if self.contains(format) => Ok(format),
            _ => Err(ConvertError::UnsupportedFormat {
                requested: name.to_string(),
                supported: self
                    .formats
                    .iter()
                    .map(|f| f.identifier())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}
