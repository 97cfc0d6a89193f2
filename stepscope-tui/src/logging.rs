//! File logging for the TUI.
//!
//! The terminal is owned by ratatui, so output goes only to a per-launch log
//! file under `<data_local_dir>/stepscope/logs`. Older files are pruned.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Maximum number of log files to retain.
const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "stepscope";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber. `default_filter` applies when `RUST_LOG`
/// is unset. Subsequent calls are no-ops; failures leave logging disabled.
pub fn init(default_filter: &str) -> Result<PathBuf, LoggingError> {
    let log_dir = log_directory()?;
    let log_path = log_dir.join(log_file_name(chrono::Local::now()));
    if LOG_GUARD.get().is_some() {
        return Ok(log_path);
    }
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.clone(),
        source,
    })?;
    ensure_file_exists(&log_path)?;

    let file_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    let file_appender = rolling::never(&log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    prune_old_logs(&log_dir, MAX_LOG_FILES)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer);

    let subscriber = Registry::default().with(env_filter).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(log_path)
}

fn log_directory() -> Result<PathBuf, LoggingError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("stepscope").join("logs"))
        .ok_or(LoggingError::NoDataDir)
}

fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("{LOG_FILE_PREFIX}-{}.log", now.format("%Y%m%d-%H%M%S"))
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Delete the oldest `stepscope-*.log` files until at most `max_files` remain.
/// Names embed the launch time, so lexical order is age order.
fn prune_old_logs(dir: &Path, max_files: usize) -> Result<(), LoggingError> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .collect();

    logs.sort();
    let excess = logs.len().saturating_sub(max_files);
    for path in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn is_log_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_embeds_timestamp() {
        let now = chrono::Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(log_file_name(now), "stepscope-20260304-050607.log");
    }

    #[test]
    fn prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..13 {
            fs::write(dir.path().join(format!("stepscope-20260101-0000{i:02}.log")), "").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        prune_old_logs(dir.path(), MAX_LOG_FILES).unwrap();

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left.len(), 11);
        assert_eq!(left[0], "notes.txt");
        assert_eq!(left[1], "stepscope-20260101-000003.log");
        assert_eq!(left[10], "stepscope-20260101-000012.log");
    }

    #[test]
    fn prune_under_limit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stepscope-a.log"), "").unwrap();
        prune_old_logs(dir.path(), MAX_LOG_FILES).unwrap();
        assert!(dir.path().join("stepscope-a.log").exists());
    }
}
