mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use convert_utils::logging::{init_logging, LogConfig};
use convert_utils::{
    create_progress_bar, expand_inputs, explicit_from_list, install_ctrlc_handler, outcome_line,
    plan_explicit, print_summary_report, with_policy, BatchConverter, BatchResult, CancelFlag,
    ConversionOutcome, ConvertError, FormatCatalog, OutputFormat, OutputPathPicker, OutputPolicy, Quality,
    RasterCodec,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn, Level};

/// Exit status for rejected arguments, matching clap's usage errors.
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "imgconvert")]
#[command(version, about = "Batch image converter: pick a format and a quality, convert many files at once", long_about = None)]
struct Cli {
    /// Directory for log files (defaults to the system temp directory).
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Debug logging, mirrored to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert files (directories are expanded to the images they contain).
    Convert {
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Target format identifier, e.g. png, jpg, webp.
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Output quality 0-100. Out-of-range values are clamped.
        #[arg(short, long, default_value_t = 100, allow_negative_numbers = true)]
        quality: i64,

        /// Write next to each source with only the extension changed (default).
        #[arg(long, conflicts_with_all = ["output_dir", "output", "prompt"])]
        same_location: bool,

        /// Write every result into this directory.
        #[arg(short = 'd', long, value_name = "DIR", conflicts_with_all = ["output", "prompt"])]
        output_dir: Option<PathBuf>,

        /// Explicit output path, once per input in order.
        #[arg(short, long, value_name = "PATH", conflicts_with = "prompt")]
        output: Vec<PathBuf>,

        /// Ask for each output path before converting.
        #[arg(long)]
        prompt: bool,

        #[arg(short, long)]
        recursive: bool,

        /// Print outcomes as JSON instead of human-readable lines.
        #[arg(long)]
        json: bool,

        /// No progress bar or per-file lines.
        #[arg(long)]
        quiet: bool,
    },

    /// List the formats the codec can write.
    Formats {
        #[arg(long)]
        json: bool,
    },
}

/// How output paths are chosen for a run.
#[derive(Debug, PartialEq, Eq)]
enum OutputTarget {
    SameLocation,
    Directory(PathBuf),
    Explicit(Vec<PathBuf>),
    Prompt,
}

impl OutputTarget {
    fn from_args(output_dir: Option<PathBuf>, output: Vec<PathBuf>, prompt: bool) -> Self {
        if let Some(dir) = output_dir {
            OutputTarget::Directory(dir)
        } else if !output.is_empty() {
            OutputTarget::Explicit(output)
        } else if prompt {
            OutputTarget::Prompt
        } else {
            OutputTarget::SameLocation
        }
    }
}

fn plan_entries(
    sources: Vec<PathBuf>,
    format: OutputFormat,
    target: &OutputTarget,
    picker: &mut dyn OutputPathPicker,
) -> Result<Vec<(PathBuf, OutputPolicy)>, ConvertError> {
    let entries = match target {
        OutputTarget::SameLocation => with_policy(sources, &OutputPolicy::SameLocation),
        OutputTarget::Directory(dir) => with_policy(sources, &OutputPolicy::Directory(dir.clone())),
        OutputTarget::Explicit(outputs) => explicit_from_list(&sources, outputs)?,
        OutputTarget::Prompt => plan_explicit(&sources, format, picker),
    };
    Ok(entries)
}

/// Everything checked before the first file is touched.
fn prepare_run(
    catalog: &FormatCatalog,
    format: &str,
    inputs: &[PathBuf],
    recursive: bool,
    target: &OutputTarget,
    picker: &mut dyn OutputPathPicker,
) -> Result<(OutputFormat, Vec<(PathBuf, OutputPolicy)>), ConvertError> {
    let format = catalog.resolve(format)?;
    let sources = expand_inputs(inputs, recursive)?;
    let entries = plan_entries(sources, format, target, picker)?;
    Ok((format, entries))
}

fn usage_error(err: &ConvertError) -> ExitCode {
    error!(error = %err, "Rejected arguments");
    eprintln!("❌ {}", err);
    ExitCode::from(EXIT_USAGE)
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    cancelled: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    format: OutputFormat,
    quality: Quality,
    outcomes: &'a [ConversionOutcome],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFormat {
    identifier: &'static str,
    name: &'static str,
    extensions: &'static [&'static str],
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default()
        .with_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_stderr(cli.verbose);
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    if let Err(e) = init_logging("imgconvert", log_config) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }

    let codec = RasterCodec::new();
    let catalog = FormatCatalog::from_codec(&codec);

    match cli.command {
        Commands::Formats { json } => {
            list_formats(&catalog, json)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Convert {
            inputs,
            format,
            quality,
            same_location: _,
            output_dir,
            output,
            prompt,
            recursive,
            json,
            quiet,
        } => {
            let target = OutputTarget::from_args(output_dir, output, prompt);
            let (format, entries) = match prepare_run(
                &catalog,
                &format,
                &inputs,
                recursive,
                &target,
                &mut prompt::PromptPicker,
            ) {
                Ok(planned) => planned,
                Err(e) => return Ok(usage_error(&e)),
            };

            if Quality::needs_clamp(quality) {
                warn!(requested = quality, "Quality outside 0-100, clamping");
                eprintln!("⚠️  Quality {} is outside 0-100, clamping", quality);
            }
            let quality = Quality::clamped(quality);

            let cancel = CancelFlag::new();
            if let Err(e) = install_ctrlc_handler(&cancel) {
                warn!(error = %e, "Could not install Ctrl+C handler");
            }

            run_batch(entries, format, quality, cancel, json, quiet)
        }
    }
}

fn run_batch(
    entries: Vec<(PathBuf, OutputPolicy)>,
    format: OutputFormat,
    quality: Quality,
    cancel: CancelFlag,
    json: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let requested = entries.len();
    info!(files = requested, format = %format, quality = %quality, "Converting");

    let start = Instant::now();
    let pb = create_progress_bar(requested as u64, "Converting", quiet || json);
    let converter = BatchConverter::new(RasterCodec::new()).with_cancel_flag(cancel);

    let outcomes = converter.convert_batch_with_progress(entries, format, quality, |_, outcome| {
        if let Some(name) = outcome.source_path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        if !quiet && !json {
            pb.println(outcome_line(outcome));
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let result = BatchResult::from_outcomes(&outcomes);
    let cancelled = outcomes.len() < requested;

    if json {
        let report = JsonReport {
            format,
            quality,
            outcomes: &outcomes,
            summary: JsonSummary {
                total: result.total,
                succeeded: result.succeeded,
                failed: result.failed,
                skipped: result.skipped,
                cancelled,
            },
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else if !quiet {
        print_summary_report(&result, start.elapsed(), "Conversion");
        if cancelled {
            println!(
                "⚠️  Cancelled: {} of {} files were not processed",
                requested - outcomes.len(),
                requested
            );
        }
    }

    info!(
        succeeded = result.succeeded,
        failed = result.failed,
        skipped = result.skipped,
        cancelled,
        "Batch finished"
    );

    Ok(if result.has_failures() || cancelled {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn list_formats(catalog: &FormatCatalog, json: bool) -> Result<()> {
    if json {
        let formats: Vec<JsonFormat> = catalog
            .formats()
            .iter()
            .map(|f| JsonFormat {
                identifier: f.identifier(),
                name: f.display_name(),
                extensions: f.extensions(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&formats).context("Failed to serialize formats")?
        );
    } else {
        for format in catalog.formats() {
            println!(
                "{:<6} {:<5} ({})",
                format.display_name(),
                format.identifier(),
                format.extensions().join(", ")
            );
        }
    }
    Ok(())
}
