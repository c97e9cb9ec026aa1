// src/log.rs
//! Process-wide logging: console plus a rolling file, configured once at startup.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::consts::{LOG_FILE_PREFIX, LOG_FILES_KEPT, NOISY_TARGETS};
use crate::config::options::LogOptions;
use crate::error::ConfigError;

/// Build the filter from the configured level, keeping HTTP plumbing quiet.
pub fn build_filter(level: &str) -> EnvFilter {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    let mut directives = s!(level);
    for target in NOISY_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the returned guard alive for the whole
/// process, otherwise buffered file lines are dropped on exit.
pub fn init(opts: &LogOptions) -> Result<WorkerGuard, ConfigError> {
    fs::create_dir_all(&opts.dir).map_err(|e| ConfigError::LogDir {
        path: opts.dir.clone(),
        source: e,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(&opts.dir)
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true);

    let console_layer = opts
        .console
        .then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(build_filter(&opts.level))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    logf!(level = %opts.level, dir = %opts.dir.display(), "logging configured");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_level_falls_back_to_info() {
        let f = build_filter("  ");
        let txt = f.to_string();
        assert!(txt.contains("info"));
        assert!(txt.contains("reqwest=warn"));
    }
}
