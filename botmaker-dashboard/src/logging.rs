use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use anyhow::Context;
use tokio::task;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

const LOG_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 3);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Map a configured level onto a filter, falling back to `info`.
pub fn parse_level(level: &str) -> (LevelFilter, bool) {
    match level.to_ascii_lowercase().as_str() {
        "trace" => (LevelFilter::TRACE, true),
        "debug" => (LevelFilter::DEBUG, true),
        "info" => (LevelFilter::INFO, true),
        "warn" => (LevelFilter::WARN, true),
        "error" => (LevelFilter::ERROR, true),
        _ => (LevelFilter::INFO, false),
    }
}

/// Install stdout and daily rolling file layers. Must be called from inside a tokio runtime.
pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, level: &str) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();
    let (level_filter, valid) = parse_level(level);

    let builder = EnvFilter::builder().with_default_directive(level_filter.into());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();

    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create file appender")?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if !valid {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }

    start_log_cleanup_task(log_dir, prefix.to_string());

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    task::spawn(async move {
        loop {
            match cleanup_old_logs(&log_dir, &prefix, LOG_MAX_AGE, SystemTime::now()) {
                Ok(removed) if removed > 0 => {
                    tracing::info!("Removed {} old log file(s) from {:?}", removed, log_dir);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to delete old log file: {}", e),
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

/// Delete `<prefix>*.log` files last modified more than `max_age` before `now`.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration, now: SystemTime) -> std::io::Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let metadata = fs::metadata(&path)?;
        if let Ok(modified) = metadata.modified() {
            if now.duration_since(modified).unwrap_or_default() > max_age {
                fs::remove_file(&path)?;
                tracing::debug!("Old log file deleted: {}", file_name);
                removed += 1;
            }
        }
    }
    Ok(removed)
}
