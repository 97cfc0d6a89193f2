//! Metadata source trait and structured fetch errors.
//!
//! The `MetadataSource` trait abstracts over where checkpoint metadata comes
//! from, so the TUI worker can be driven by the on-disk reader or a scripted
//! source in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::CheckpointMetadata;

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorCode {
    NotFound,
    Io,
    InvalidHeader,
    HeaderTooLarge,
    Unsupported,
    /// The fetch worker went away before answering.
    Disconnected,
}

impl FetchErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorCode::NotFound => "not_found",
            FetchErrorCode::Io => "io",
            FetchErrorCode::InvalidHeader => "invalid_header",
            FetchErrorCode::HeaderTooLarge => "header_too_large",
            FetchErrorCode::Unsupported => "unsupported",
            FetchErrorCode::Disconnected => "disconnected",
        }
    }
}

/// A rejected fetch. Displayed to users by `message` only.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct FetchError {
    pub code: FetchErrorCode,
    pub message: String,
}

impl FetchError {
    pub fn new(code: FetchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(filename: &str) -> Self {
        Self::new(FetchErrorCode::NotFound, format!("checkpoint not found: {filename}"))
    }

    pub fn invalid_header(detail: impl std::fmt::Display) -> Self {
        Self::new(FetchErrorCode::InvalidHeader, format!("invalid header: {detail}"))
    }
}

/// Anything that can load the metadata mapping for a checkpoint file name.
pub trait MetadataSource: Send + Sync {
    fn fetch(&self, filename: &str) -> Result<CheckpointMetadata, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message_only() {
        let err = FetchError::new(FetchErrorCode::Io, "Connection lost");
        assert_eq!(err.to_string(), "Connection lost");
        assert_eq!(err.code.as_str(), "io");
    }

    #[test]
    fn code_serializes_snake_case() {
        let err = FetchError::not_found("a.safetensors");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"not_found\""));
        assert!(json.contains("a.safetensors"));
    }
}
