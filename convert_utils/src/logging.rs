//! Logging Module
//!
//! tracing-based logging shared by the converter binaries:
//! - daily-rolled log file in the system temp directory (or a chosen dir)
//! - stderr output for interactive runs
//! - old log files pruned to a fixed count
//!
//! # Examples
//!
//! ```no_run
//! use convert_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! init_logging("imgconvert", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Defaults to the system temp directory.
    pub log_dir: PathBuf,
    /// How many log files to keep.
    pub max_files: usize,
    pub level: Level,
    /// Mirror log lines to stderr.
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
            stderr: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }
}

/// Default directive: the program and this crate at `level`. `RUST_LOG`
/// replaces it entirely.
fn default_directive(program_name: &str, level: Level) -> String {
    let target = program_name.replace('-', "_");
    format!("{}={},convert_utils={}", target, level, level)
}

/// Installs the global subscriber. Fails instead of panicking when one is
/// already installed.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(program_name, config.level)));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Logging already initialized")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;

    Ok(())
}

/// Keeps the newest `max_files` logs for `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // rolled files are named `<program>.log.<date>`
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let file_name = file_name.to_string_lossy();
        if file_name.starts_with(&format!("{}.log", program_name)) {
            if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    if log_files.len() > max_files {
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new()
            .with_log_dir("/tmp/imgconvert-logs")
            .with_max_files(2)
            .with_level(Level::DEBUG)
            .with_stderr(false);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/imgconvert-logs"));
        assert_eq!(config.max_files, 2);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.stderr);
    }

    #[test]
    fn test_default_directive_normalizes_dashes() {
        assert_eq!(
            default_directive("img-convert", Level::WARN),
            "img_convert=WARN,convert_utils=WARN"
        );
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        for (i, name) in ["tool.log.1", "tool.log.2", "tool.log.3", "other.log"].iter().enumerate() {
            let path = dir.path().join(name);
            fs::write(&path, b"x").unwrap();
            let file = fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(now - Duration::from_secs(100 * (4 - i as u64))).unwrap();
        }

        cleanup_old_logs(dir.path(), "tool", 2).unwrap();

        assert!(!dir.path().join("tool.log.1").exists());
        assert!(dir.path().join("tool.log.2").exists());
        assert!(dir.path().join("tool.log.3").exists());
        assert!(dir.path().join("other.log").exists());
    }
}
