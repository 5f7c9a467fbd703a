use convert_utils::{same_location_path, OutputFormat, OutputPathPicker};
use dialoguer::Input;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Terminal stand-in for a save-file dialog. An empty answer means no selection.
pub struct PromptPicker;

impl OutputPathPicker for PromptPicker {
    fn pick(&mut self, source: &Path, format: OutputFormat) -> Option<PathBuf> {
        let suggestion = same_location_path(source, format);
        let answer = Input::<String>::new()
            .with_prompt(format!(
                "Save {} as {} (empty to skip)",
                source.display(),
                format.display_name()
            ))
            .with_initial_text(suggestion.display().to_string())
            .allow_empty(true)
            .interact_text();

        match answer {
            Ok(text) if !text.trim().is_empty() => Some(PathBuf::from(text.trim())),
            Ok(_) => None,
            Err(e) => {
                warn!(source = ?source, error = %e, "Output path prompt failed, skipping file");
                None
            }
        }
    }
}
