//! Conversion Module
//!
//! Single-file conversion shared by every caller:
//! - OutputPolicy / ConversionRequest: what to convert and where to put it
//! - ConversionOutcome: unified per-file result (never an error value)
//! - Output naming: same-location, explicit and directory policies
//! - Atomic output writes: a failed write never leaves a truncated file

use crate::codec::ImageCodec;
use crate::formats::OutputFormat;
use crate::img_errors::CodecError;
use crate::types::Quality;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the converted file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPolicy {
    /// `<sourceDir>/<stem>.<identifier>`, overwriting whatever is there.
    SameLocation,
    /// Path chosen up front by the caller. `None` means the picker returned
    /// no selection.
    Explicit(Option<PathBuf>),
    /// `<dir>/<stem>.<identifier>`; the directory is created when missing.
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source_path: PathBuf,
    target_format: OutputFormat,
    quality: Quality,
    output_policy: OutputPolicy,
}

impl ConversionRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_format: OutputFormat,
        quality: Quality,
        output_policy: OutputPolicy,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_format,
            quality,
            output_policy,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn target_format(&self) -> OutputFormat {
        self.target_format
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn output_policy(&self) -> &OutputPolicy {
        &self.output_policy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    LoadFailed,
    WriteFailed,
    /// The user cancelled path selection. Not an error.
    NoOutputChosen,
}

impl OutcomeKind {
    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeKind::LoadFailed | OutcomeKind::WriteFailed)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::LoadFailed => "load failed",
            OutcomeKind::WriteFailed => "write failed",
            OutcomeKind::NoOutputChosen => "no output chosen",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub source_path: PathBuf,
    /// Only present on success.
    pub output_path: Option<PathBuf>,
    pub result: OutcomeKind,
    pub detail: Option<String>,
    pub input_bytes: u64,
    pub output_bytes: Option<u64>,
}

impl ConversionOutcome {
    pub fn success(source: &Path, output: &Path, input_bytes: u64, output_bytes: u64) -> Self {
        Self {
            source_path: source.to_path_buf(),
            output_path: Some(output.to_path_buf()),
            result: OutcomeKind::Success,
            detail: None,
            input_bytes,
            output_bytes: Some(output_bytes),
        }
    }

    pub fn load_failed(source: &Path, input_bytes: u64, error: impl fmt::Display) -> Self {
        Self {
            source_path: source.to_path_buf(),
            output_path: None,
            result: OutcomeKind::LoadFailed,
            detail: Some(format!("Could not load the image: {}", error)),
            input_bytes,
            output_bytes: None,
        }
    }

    pub fn write_failed(
        source: &Path,
        output: &Path,
        input_bytes: u64,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            source_path: source.to_path_buf(),
            output_path: None,
            result: OutcomeKind::WriteFailed,
            detail: Some(format!(
                "Could not write the image to {}: {}",
                output.display(),
                error
            )),
            input_bytes,
            output_bytes: None,
        }
    }

    pub fn no_output_chosen(source: &Path, input_bytes: u64) -> Self {
        Self {
            source_path: source.to_path_buf(),
            output_path: None,
            result: OutcomeKind::NoOutputChosen,
            detail: None,
            input_bytes,
            output_bytes: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == OutcomeKind::Success
    }
}

/// `<dir>/<stem>.<identifier>`. Always replaces the extension, even when it
/// already names the target format.
pub fn same_location_path(source: &Path, format: OutputFormat) -> PathBuf {
    source.with_extension(format.identifier())
}

/// Appends `.<identifier>` unless the path already carries one of the
/// format's extensions.
pub fn ensure_extension(path: &Path, format: OutputFormat) -> PathBuf {
    if format.matches_extension(path) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(format.identifier());
    PathBuf::from(name)
}

pub fn directory_output_path(source: &Path, dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    dir.join(format!("{}.{}", stem, format.identifier()))
}

/// Pure path resolution. `None` only for `Explicit(None)`.
pub fn resolve_output_path(request: &ConversionRequest) -> Option<PathBuf> {
    let format = request.target_format();
    match request.output_policy() {
        OutputPolicy::SameLocation => Some(same_location_path(request.source_path(), format)),
        OutputPolicy::Explicit(Some(path)) => Some(ensure_extension(path, format)),
        OutputPolicy::Explicit(None) => None,
        OutputPolicy::Directory(dir) => {
            Some(directory_output_path(request.source_path(), dir, format))
        }
    }
}

/// Follows a symlinked output so the link target is what gets replaced.
fn rename_target(output: &Path) -> PathBuf {
    match fs::symlink_metadata(output) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(output).unwrap_or_else(|_| output.to_path_buf())
        }
        _ => output.to_path_buf(),
    }
}

/// Stages `bytes` next to the output and renames it into place. New files
/// get the process umask; overwritten files keep their permissions.
pub fn write_atomically(output: &Path, bytes: &[u8]) -> std::io::Result<u64> {
    let target = rename_target(output);
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".imgconvert-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // open(2) masks this with the umask
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(parent)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;

    if let Ok(existing) = fs::metadata(&target) {
        staged.as_file().set_permissions(existing.permissions())?;
    }

    staged.persist(&target).map_err(|e| e.error)?;
    Ok(bytes.len() as u64)
}

/// Decode, resolve the output path, encode, write. Every failure is folded
/// into the returned outcome.
pub fn convert_one<C: ImageCodec + ?Sized>(codec: &C, request: &ConversionRequest) -> ConversionOutcome {
    let source = request.source_path();
    let input_bytes = fs::metadata(source).map(|m| m.len()).unwrap_or(0);

    let image = match codec.decode(source) {
        Ok(image) if image.width() == 0 || image.height() == 0 => {
            warn!(source = ?source, "Decoded image is empty");
            return ConversionOutcome::load_failed(source, input_bytes, CodecError::EmptyImage);
        }
        Ok(image) => image,
        Err(e) => {
            warn!(source = ?source, error = %e, "Could not load image");
            return ConversionOutcome::load_failed(source, input_bytes, e);
        }
    };

    let Some(output) = resolve_output_path(request) else {
        info!(source = ?source, "No output path chosen, skipping");
        return ConversionOutcome::no_output_chosen(source, input_bytes);
    };

    if let OutputPolicy::Directory(dir) = request.output_policy() {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = ?dir, error = %e, "Could not create output directory");
            return ConversionOutcome::write_failed(source, &output, input_bytes, e);
        }
    }

    let format = request.target_format();
    let quality = request.quality();
    let bytes = match codec.encode(&image, format, quality) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(source = ?source, format = %format, error = %e, "Encode failed");
            return ConversionOutcome::write_failed(source, &output, input_bytes, e);
        }
    };

    match write_atomically(&output, &bytes) {
        Ok(written) => {
            debug!(
                source = ?source,
                output = ?output,
                format = %format,
                quality = %quality,
                bytes = written,
                "Converted image"
            );
            ConversionOutcome::success(source, &output, input_bytes, written)
        }
        Err(e) => {
            warn!(output = ?output, error = %e, "Write failed");
            ConversionOutcome::write_failed(source, &output, input_bytes, e)
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // *For any* source path and format, same-location naming is stable,
    // keeps the parent directory and ends in the format identifier;
    // ensure_extension is idempotent.
    // ========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn output_naming_property(
            parent in "[a-z]{1,6}",
            stem in "[a-z][a-z0-9_]{0,8}",
            ext in proptest::option::of("[a-zA-Z]{1,4}"),
            index in 0..OutputFormat::ALL.len(),
        ) {
            let format = OutputFormat::ALL[index];
            let name = match &ext {
                Some(ext) => format!("{stem}.{ext}"),
                None => stem.clone(),
            };
            let source = Path::new(&parent).join(name);

            let first = same_location_path(&source, format);
            prop_assert_eq!(&first, &same_location_path(&source, format));
            prop_assert_eq!(first.parent(), source.parent());
            prop_assert_eq!(
                first.extension().and_then(|e| e.to_str()),
                Some(format.identifier())
            );

            let ensured = ensure_extension(&source, format);
            prop_assert!(format.matches_extension(&ensured));
            prop_assert_eq!(ensure_extension(&ensured, format), ensured.clone());
        }
    }
}
