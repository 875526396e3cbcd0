//! Tracing setup for the `geogenie` binary.
//!
//! Game prompts own stdout, so events go to stderr. `GEOGENIE_FILE_LOGS=1`
//! adds a daily-rolling copy under `GEOGENIE_LOG_DIR`.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "geogenie.log";

/// Keeps the non-blocking file writer alive; drop it on shutdown to flush.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

pub fn file_logging_enabled() -> bool {
    flag_enabled(std::env::var("GEOGENIE_FILE_LOGS").ok().as_deref())
}

fn file_log_dir() -> Option<PathBuf> {
    if !file_logging_enabled() {
        return None;
    }
    let dir = std::env::var("GEOGENIE_LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    Some(PathBuf::from(dir))
}

fn daily_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber. Returns a guard only when file logging is
/// active.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut dir_error = None;
    let (file_layer, guard) = match file_log_dir().map(|dir| (daily_writer(&dir), dir)) {
        Some((Ok((writer, guard)), _)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        Some((Err(err), dir)) => {
            dir_error = Some((err, dir));
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .init();

    if let Some((err, dir)) = dir_error {
        tracing::warn!(error = %err, dir = %dir.display(), "file logging disabled");
    }

    guard
}
