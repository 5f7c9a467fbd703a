//! Output path selection
//!
//! Interactive choice of output paths happens here, once per source and
//! before any decoding starts. The batch itself only ever sees
//! `OutputPolicy::Explicit` values that are already settled.

use crate::conversion::OutputPolicy;
use crate::formats::OutputFormat;
use crate::img_errors::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies an output path for one source. `None` means no selection.
pub trait OutputPathPicker {
    fn pick(&mut self, source: &Path, format: OutputFormat) -> Option<PathBuf>;
}

impl<F> OutputPathPicker for F
where
    F: FnMut(&Path, OutputFormat) -> Option<PathBuf>,
{
    fn pick(&mut self, source: &Path, format: OutputFormat) -> Option<PathBuf> {
        self(source, format)
    }
}

/// Asks `picker` for every source up front.
pub fn plan_explicit<P>(
    sources: &[PathBuf],
    format: OutputFormat,
    picker: &mut P,
) -> Vec<(PathBuf, OutputPolicy)>
where
    P: OutputPathPicker + ?Sized,
{
    sources
        .iter()
        .map(|source| {
            let chosen = picker.pick(source, format);
            debug!(source = ?source, chosen = ?chosen, "Output path picked");
            (source.clone(), OutputPolicy::Explicit(chosen))
        })
        .collect()
}

/// Pairs pre-supplied outputs with sources. Sources past the end of
/// `outputs` get no selection; extra outputs are an error.
pub fn explicit_from_list(
    sources: &[PathBuf],
    outputs: &[PathBuf],
) -> Result<Vec<(PathBuf, OutputPolicy)>, ConvertError> {
    if outputs.len() > sources.len() {
        return Err(ConvertError::OutputCountMismatch {
            inputs: sources.len(),
            outputs: outputs.len(),
        });
    }

    Ok(sources
        .iter()
        .enumerate()
        .map(|(i, source)| (source.clone(), OutputPolicy::Explicit(outputs.get(i).cloned())))
        .collect())
}
