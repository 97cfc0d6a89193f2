//! Checkpoint directory discovery.
//!
//! A training output directory holds `*.safetensors` checkpoints and an
//! optional `sample/` folder with images named `{name}_{step:06}_{idx}_....png`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::checkpoint::{parse_step, CheckpointDescriptor};
use crate::safetensors::{self, EXTENSION};

pub const SAMPLE_DIR: &str = "sample";
const SAMPLE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
}

/// List the checkpoints directly inside `dir`, in file-name order.
///
/// The step comes from the file name. Without digits in the name the header's
/// `ss_steps` is used, falling back to 0.
pub fn scan_checkpoints(dir: &Path) -> Result<Vec<CheckpointDescriptor>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirNotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| Path::new(name).extension().and_then(|x| x.to_str()) == Some(EXTENSION))
        .collect();
    names.sort();

    let samples = sample_names(dir);
    let checkpoints = names
        .into_iter()
        .map(|filename| {
            let step_number = step_for(dir, &filename);
            let has_samples = step_number > 0 && samples.iter().any(|s| s.contains(&sample_marker(step_number)));
            CheckpointDescriptor {
                filename,
                step_number,
                has_samples,
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(dir = %dir.display(), count = checkpoints.len(), "scanned checkpoints");
    Ok(checkpoints)
}

/// Sample images for `step`, sorted by path.
pub fn list_samples(dir: &Path, step: u64) -> Vec<PathBuf> {
    if step == 0 {
        return Vec::new();
    }
    let marker = sample_marker(step);
    let sample_dir = dir.join(SAMPLE_DIR);
    let mut paths: Vec<PathBuf> = sample_names(dir)
        .into_iter()
        .filter(|name| name.contains(&marker))
        .map(|name| sample_dir.join(name))
        .collect();
    paths.sort();
    paths
}

fn step_for(dir: &Path, filename: &str) -> u64 {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    if let Some(step) = parse_step(stem) {
        return step;
    }
    match safetensors::read_metadata(&dir.join(filename)) {
        Ok(meta) => meta.get("ss_steps").and_then(|s| s.parse().ok()).unwrap_or(0),
        Err(e) => {
            tracing::debug!(filename, error = %e, "no step in name and header unreadable");
            0
        }
    }
}

fn sample_marker(step: u64) -> String {
    format!("_{step:06}_")
}

fn sample_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir.join(SAMPLE_DIR)) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| SAMPLE_EXTENSIONS.contains(&x.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect()
}
