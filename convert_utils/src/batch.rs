//! Batch Processing Module
//!
//! Runs a list of sources through [`convert_one`] in input order. One file's
//! failure never stops the rest; every entry yields exactly one outcome
//! unless the batch is cancelled, in which case the outcomes gathered so far
//! are returned.

use crate::cancel::CancelFlag;
use crate::codec::ImageCodec;
use crate::conversion::{convert_one, ConversionOutcome, ConversionRequest, OutputPolicy};
use crate::formats::OutputFormat;
use crate::img_errors::ConvertError;
use crate::types::Quality;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "jpe", "jfif", "webp", "gif", "tiff", "tif", "bmp", "ico",
];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Files under `dir` with a matching extension, sorted by path.
pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Expands directories into their image files. Anything else is passed
/// through untouched so the decoder reports it.
pub fn expand_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = collect_files(input, IMAGE_EXTENSIONS, recursive);
            info!(dir = ?input, count = found.len(), "Collected images from directory");
            sources.extend(found);
        } else {
            sources.push(input.clone());
        }
    }

    if sources.is_empty() {
        return Err(ConvertError::NoInputs);
    }
    Ok(sources)
}

/// Pairs every source with the same policy.
pub fn with_policy<I>(sources: I, policy: &OutputPolicy) -> Vec<(PathBuf, OutputPolicy)>
where
    I: IntoIterator<Item = PathBuf>,
{
    sources
        .into_iter()
        .map(|source| (source, policy.clone()))
        .collect()
}

pub struct BatchConverter<C> {
    codec: C,
    cancel: Option<CancelFlag>,
}

impl<C: ImageCodec> BatchConverter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec, cancel: None }
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    pub fn convert_batch<I>(
        &self,
        entries: I,
        format: OutputFormat,
        quality: Quality,
    ) -> Vec<ConversionOutcome>
    where
        I: IntoIterator<Item = (PathBuf, OutputPolicy)>,
    {
        self.convert_batch_with_progress(entries, format, quality, |_, _| {})
    }

    /// Like [`convert_batch`](Self::convert_batch), calling `on_outcome`
    /// with the entry index after each file.
    pub fn convert_batch_with_progress<I, F>(
        &self,
        entries: I,
        format: OutputFormat,
        quality: Quality,
        mut on_outcome: F,
    ) -> Vec<ConversionOutcome>
    where
        I: IntoIterator<Item = (PathBuf, OutputPolicy)>,
        F: FnMut(usize, &ConversionOutcome),
    {
        let entries = entries.into_iter();
        let mut outcomes = Vec::with_capacity(entries.size_hint().0);
        info!(format = %format, quality = %quality, "Starting batch conversion");

        for (index, (source, policy)) in entries.enumerate() {
            if self.is_cancelled() {
                warn!(completed = outcomes.len(), "Batch cancelled, skipping remaining files");
                break;
            }
            let request = ConversionRequest::new(source, format, quality, policy);
            let outcome = convert_one(&self.codec, &request);
            on_outcome(index, &outcome);
            outcomes.push(outcome);
        }

        outcomes
    }
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<(PathBuf, String)>,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            errors: Vec::new(),
            input_bytes: 0,
            output_bytes: 0,
        }
    }

    pub fn from_outcomes(outcomes: &[ConversionOutcome]) -> Self {
        let mut result = Self::new();
        for outcome in outcomes {
            result.record(outcome);
        }
        result
    }

    pub fn record(&mut self, outcome: &ConversionOutcome) {
        if outcome.result.is_failure() {
            self.fail(
                outcome.source_path.clone(),
                outcome.detail.clone().unwrap_or_else(|| outcome.result.to_string()),
            );
        } else if outcome.is_success() {
            self.success();
            self.input_bytes += outcome.input_bytes;
            self.output_bytes += outcome.output_bytes.unwrap_or(0);
        } else {
            self.skip();
        }
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}
