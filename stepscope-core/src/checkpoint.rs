//! Checkpoint descriptors and their display ordering.

use serde::{Deserialize, Serialize};

/// A saved model snapshot found in a training output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDescriptor {
    /// File name relative to the checkpoint directory. Unique per directory.
    pub filename: String,
    /// Training-progress counter, usually embedded in the file name.
    pub step_number: u64,
    /// Whether sample images exist for this step.
    pub has_samples: bool,
}

impl CheckpointDescriptor {
    pub fn new(filename: impl Into<String>, step_number: u64, has_samples: bool) -> Self {
        Self {
            filename: filename.into(),
            step_number,
            has_samples,
        }
    }
}

/// Copy of `checkpoints` ordered by descending step number.
///
/// The sort is stable, so entries with equal steps keep their relative order.
/// The input slice is never reordered.
pub fn sort_by_step_desc(checkpoints: &[CheckpointDescriptor]) -> Vec<CheckpointDescriptor> {
    let mut sorted = checkpoints.to_vec();
    sorted.sort_by(|a, b| b.step_number.cmp(&a.step_number));
    sorted
}

/// Zero-padded counters at least this long are trusted without a separator.
const PADDED_STEP_DIGITS: usize = 6;

/// Step number embedded in a file stem.
///
/// Only a digit run that ends the stem counts. It must follow a `-`, `_` or
/// `.` separator, the word `step`, or be zero-padded to six digits. Version
/// tags such as `v2` or `sd15` are not steps.
///
/// `"lora-step00003000"` gives 3000, `"lora-000012"` gives 12,
/// `"sdxl-lora-v2"` and `"lora"` give `None`.
pub fn parse_step(stem: &str) -> Option<u64> {
    let bytes = stem.as_bytes();
    let start = bytes
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let digits = &stem[start..];
    if digits.is_empty() {
        return None;
    }
    let prefix = &stem[..start];
    let separated = prefix.is_empty()
        || prefix.ends_with(['-', '_', '.'])
        || prefix.to_ascii_lowercase().ends_with("step");
    if !separated && digits.len() < PADDED_STEP_DIGITS {
        return None;
    }
    digits.parse().ok()
}
