//! stepscope core: checkpoint descriptors, training metadata, and the
//! metadata source abstraction shared by the TUI and CLI.
//!
//! - [`checkpoint`]: descriptors, step parsing, display ordering
//! - [`metadata`]: `ss_` field filtering and sorting
//! - [`source`]: the `MetadataSource` trait and structured fetch errors
//! - [`safetensors`]: header reader and the on-disk source
//! - [`scan`]: directory discovery and sample lookup

pub mod checkpoint;
pub mod metadata;
pub mod safetensors;
pub mod scan;
pub mod source;

pub use checkpoint::{parse_step, sort_by_step_desc, CheckpointDescriptor};
pub use metadata::{training_entries, CheckpointMetadata, MetadataEntry, TRAINING_FIELD_PREFIX};
pub use safetensors::SafetensorsSource;
pub use scan::{list_samples, scan_checkpoints, ScanError};
pub use source::{FetchError, FetchErrorCode, MetadataSource};
