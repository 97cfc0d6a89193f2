//! Safetensors header reader.
//!
//! Layout: an 8-byte little-endian header length `N`, then `N` bytes of JSON.
//! Training metadata lives in the header's `__metadata__` object. Tensor data
//! after the header is never read.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::metadata::CheckpointMetadata;
use crate::source::{FetchError, FetchErrorCode, MetadataSource};

/// Largest header accepted, matching the format's own limit.
pub const MAX_HEADER_BYTES: u64 = 100 * 1024 * 1024;
pub const METADATA_KEY: &str = "__metadata__";
pub const EXTENSION: &str = "safetensors";

/// Reads checkpoint metadata from safetensors files under `root`.
#[derive(Debug, Clone)]
pub struct SafetensorsSource {
    root: PathBuf,
}

impl SafetensorsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetadataSource for SafetensorsSource {
    fn fetch(&self, filename: &str) -> Result<CheckpointMetadata, FetchError> {
        let name = Path::new(filename);
        // Plain file names only; no walking out of the root.
        if name.file_name().map(|n| n != name.as_os_str()).unwrap_or(true) {
            return Err(FetchError::new(
                FetchErrorCode::Unsupported,
                format!("not a checkpoint file name: {filename}"),
            ));
        }
        if name.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            return Err(FetchError::new(
                FetchErrorCode::Unsupported,
                format!("unsupported checkpoint format: {filename}"),
            ));
        }
        read_metadata(&self.root.join(name))
    }
}

/// Read the `__metadata__` mapping of a safetensors file.
pub fn read_metadata(path: &Path) -> Result<CheckpointMetadata, FetchError> {
    let shown = path.display().to_string();
    let mut file = File::open(path).map_err(|e| io_error(&shown, e))?;
    let file_len = file.metadata().map_err(|e| io_error(&shown, e))?.len();

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes).map_err(|e| io_error(&shown, e))?;
    let header_len = u64::from_le_bytes(len_bytes);

    if header_len > MAX_HEADER_BYTES {
        return Err(FetchError::new(
            FetchErrorCode::HeaderTooLarge,
            format!("header of {header_len} bytes exceeds {MAX_HEADER_BYTES}"),
        ));
    }
    if file_len < 8 + header_len {
        return Err(FetchError::invalid_header(format!(
            "truncated: expected {header_len} header bytes, file has {}",
            file_len.saturating_sub(8)
        )));
    }

    let mut header = vec![0u8; header_len as usize];
    file.read_exact(&mut header).map_err(|e| io_error(&shown, e))?;
    tracing::debug!(path = %shown, header_len, "read safetensors header");
    parse_header(&header)
}

/// Extract metadata from raw header JSON.
///
/// A header without `__metadata__` yields an empty mapping. Non-string values
/// are kept as their JSON text.
pub fn parse_header(header: &[u8]) -> Result<CheckpointMetadata, FetchError> {
    let root: serde_json::Map<String, Value> =
        serde_json::from_slice(header).map_err(FetchError::invalid_header)?;

    let metadata = match root.get(METADATA_KEY) {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect(),
        Some(_) => return Err(FetchError::invalid_header("__metadata__ is not an object")),
    };
    Ok(CheckpointMetadata::new(metadata))
}

/// Encode a tensor-less safetensors file carrying only `metadata`.
pub fn encode_metadata_only(metadata: &BTreeMap<String, String>) -> Vec<u8> {
    let mut header = serde_json::Map::new();
    header.insert(
        METADATA_KEY.to_string(),
        Value::Object(
            metadata
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
    );
    let json = Value::Object(header).to_string();
    let mut out = Vec::with_capacity(8 + json.len());
    out.extend_from_slice(&(json.len() as u64).to_le_bytes());
    out.extend_from_slice(json.as_bytes());
    out
}

/// Write [`encode_metadata_only`] output to `path`.
pub fn write_metadata_only(path: &Path, metadata: &BTreeMap<String, String>) -> io::Result<()> {
    std::fs::write(path, encode_metadata_only(metadata))
}

fn io_error(path: &str, err: io::Error) -> FetchError {
    match err.kind() {
        io::ErrorKind::NotFound => FetchError::new(
            FetchErrorCode::NotFound,
            format!("checkpoint not found: {path}"),
        ),
        io::ErrorKind::UnexpectedEof => FetchError::invalid_header(format!("{path} is too short")),
        _ => FetchError::new(FetchErrorCode::Io, format!("failed to read {path}: {err}")),
    }
}
