//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting,
//! either to the console alone or to the console and an append-only run log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Writes every log line to stderr and to the run log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn builder(level: LevelFilter, format: LogFormat) -> Builder {
    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("fantoccini", LevelFilter::Info);
    builder.filter_module("used_car_crawler", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                let emoji = match level {
                    log::Level::Error => "❌",
                    log::Level::Warn => "⚠️",
                    log::Level::Info => "✔️",
                    log::Level::Debug => "🔍",
                    log::Level::Trace => "🔬",
                };

                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    emoji,
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }
    builder
}

/// Initializes the console logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors and emojis) and JSON formats for structured logging.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
/// * `format` - Log format (Plain or Json)
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);
    builder(level, format)
        .try_init()
        .map_err(InitializationError::from)
}

/// Initializes the logger so every line goes to the console and is appended
/// to `path` (created with its parent directories on demand).
///
/// Colours are disabled so the run log stays plain text.
///
/// # Errors
///
/// Returns `InitializationError::LoggerSetupError` if the log file cannot be
/// opened, or `LoggerError` if a logger is already installed.
pub fn init_logger_to_file(
    level: LevelFilter,
    format: LogFormat,
    path: &Path,
) -> Result<(), InitializationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            InitializationError::LoggerSetupError(format!(
                "cannot create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            InitializationError::LoggerSetupError(format!(
                "cannot open log file {}: {e}",
                path.display()
            ))
        })?;

    colored::control::set_override(false);
    builder(level, format)
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()
        .map_err(InitializationError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tee_writer_writes_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("run.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .expect("open");
        let mut tee = TeeWriter { file };
        tee.write_all("list collection [세단]: 1/5 (total 1)\n".as_bytes())
            .expect("write");
        tee.flush().expect("flush");
        let written = fs::read_to_string(&path).expect("read");
        assert_eq!(written, "list collection [세단]: 1/5 (total 1)\n");
    }

    #[test]
    fn test_init_logger_to_file_bad_path() {
        let dir = TempDir::new().expect("temp dir");
        // a regular file cannot be a parent directory
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").expect("write");
        let result = init_logger_to_file(
            LevelFilter::Info,
            LogFormat::Plain,
            &blocker.join("sub").join("run.log"),
        );
        assert!(matches!(
            result,
            Err(InitializationError::LoggerSetupError(_))
        ));
    }

    #[test]
    fn test_init_logger_json_format() {
        let _ = env_logger::try_init();

        let result = init_logger_with(LevelFilter::Info, LogFormat::Json);
        // Accept either success or error (if already initialized)
        assert!(result.is_ok() || result.is_err());
    }
}
