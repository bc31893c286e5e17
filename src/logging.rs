//! File logging.
//!
//! The terminal belongs to the TUI, so log records only go to a file:
//! `logging.file` when configured, otherwise
//! `<data_local_dir>/trackinfo/trackinfo.log`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::{LogLevel, LoggingSettings};

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Default log file location.
pub fn default_log_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("trackinfo").join("trackinfo.log"))
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Initialize the file logger and return the log path on success.
///
/// Failures are reported on stderr before the TUI starts and leave logging
/// disabled.
pub fn init_logging(settings: &LoggingSettings) -> Option<PathBuf> {
    let level = level_filter(settings.level);
    if level == LevelFilter::Off {
        return None;
    }

    let Some(log_path) = settings.file.clone().or_else(default_log_file) else {
        eprintln!("trackinfo: could not determine log directory");
        return None;
    };

    if let Some(dir) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("trackinfo: could not create log directory: {e}");
            return None;
        }
    }

    // Keep one previous log around once the current one gets large.
    if let Ok(metadata) = fs::metadata(&log_path) {
        if metadata.len() > MAX_LOG_BYTES {
            let _ = fs::rename(&log_path, log_path.with_extension("log.old"));
        }
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("trackinfo: could not open log file: {e}");
            return None;
        }
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .build();

    if WriteLogger::init(level, config, log_file).is_err() {
        eprintln!("trackinfo: logger already initialized");
    }

    log::info!("=== trackinfo session started ===");
    Some(log_path)
}
