//! Report Module
//!
//! Summary and per-file lines for batch conversions.

use crate::batch::BatchResult;
use crate::conversion::{ConversionOutcome, OutcomeKind};
use crate::progress::{format_bytes, format_duration};
use console::style;
use std::time::Duration;

/// One status line per outcome.
pub fn outcome_line(outcome: &ConversionOutcome) -> String {
    let name = outcome
        .source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.source_path.display().to_string());

    match outcome.result {
        OutcomeKind::Success => format!(
            "{} {} → {}",
            style("✅").green(),
            name,
            outcome
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
        OutcomeKind::NoOutputChosen => {
            format!("{} {} → SKIP (no output path chosen)", style("⏭️").yellow(), name)
        }
        OutcomeKind::LoadFailed | OutcomeKind::WriteFailed => format!(
            "{} {} → FAILED ({})",
            style("❌").red(),
            name,
            outcome.detail.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn size_change(input_bytes: u64, output_bytes: u64) -> String {
    if input_bytes == 0 {
        return "n/a".to_string();
    }
    let reduction = (1.0 - output_bytes as f64 / input_bytes as f64) * 100.0;
    if reduction >= 0.0 {
        format!("-{:.1}%", reduction)
    } else {
        format!("+{:.1}%", -reduction)
    }
}

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 {} Summary", style(operation_name).bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  📁 Files:        {:>10}", result.total);
    println!("  ✅ Succeeded:    {:>10}", style(result.succeeded).green());
    println!("  ❌ Failed:       {:>10}", style(result.failed).red());
    println!("  ⏭️  Skipped:      {:>10}", style(result.skipped).yellow());
    println!("  📈 Success Rate: {:>9.1}%", result.success_rate());
    println!(
        "  💾 Size:         {} → {} ({})",
        format_bytes(result.input_bytes),
        format_bytes(result.output_bytes),
        size_change(result.input_bytes, result.output_bytes)
    );
    println!("  ⏱️  Time:         {:>10}", format_duration(duration));

    if !result.errors.is_empty() {
        println!();
        println!("{}", style("❌ Errors encountered:").red().bold());
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_size_change() {
        assert_eq!(size_change(0, 10), "n/a");
        assert_eq!(size_change(1000, 250), "-75.0%");
        assert_eq!(size_change(100, 150), "+50.0%");
    }

    #[test]
    fn test_outcome_lines_name_the_file() {
        let ok = ConversionOutcome::success(Path::new("/in/a.png"), Path::new("/in/a.jpg"), 1, 1);
        let line = console::strip_ansi_codes(&outcome_line(&ok)).into_owned();
        assert!(line.contains("a.png"));
        assert!(line.contains("/in/a.jpg"));

        let failed = ConversionOutcome::load_failed(Path::new("/in/b.png"), 0, "truncated");
        let line = console::strip_ansi_codes(&outcome_line(&failed)).into_owned();
        assert!(line.contains("FAILED"));
        assert!(line.contains("truncated"));

        let skipped = ConversionOutcome::no_output_chosen(Path::new("c.png"), 0);
        assert!(outcome_line(&skipped).contains("SKIP"));
    }

    #[test]
    fn test_print_summary_report_no_panic() {
        let mut result = BatchResult::new();
        result.success();
        result.fail(std::path::PathBuf::from("test.png"), "Error".to_string());
        print_summary_report(&result, Duration::from_secs(3), "Test");

        print_summary_report(&BatchResult::new(), Duration::ZERO, "Empty");
    }
}
