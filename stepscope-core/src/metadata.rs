//! Training metadata attached to a checkpoint.
//!
//! Trainers store their settings as string key/value pairs in the checkpoint
//! header. Only keys carrying the [`TRAINING_FIELD_PREFIX`] are shown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix of the fields written by the training scripts.
pub const TRAINING_FIELD_PREFIX: &str = "ss_";

/// One displayed field/value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub field: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Successful payload of a metadata fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub metadata: BTreeMap<String, String>,
}

impl CheckpointMetadata {
    pub fn new(metadata: BTreeMap<String, String>) -> Self {
        Self { metadata }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// `ss_` rows sorted by field name.
    pub fn training_entries(&self) -> Vec<MetadataEntry> {
        training_entries(&self.metadata)
    }

    /// Every row, unfiltered, sorted by field name.
    pub fn all_entries(&self) -> Vec<MetadataEntry> {
        self.metadata
            .iter()
            .map(|(k, v)| MetadataEntry::new(k.as_str(), v.as_str()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CheckpointMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            metadata: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Filter a raw mapping to `ss_` keys and sort ascending by field name.
pub fn training_entries(metadata: &BTreeMap<String, String>) -> Vec<MetadataEntry> {
    let mut entries: Vec<MetadataEntry> = metadata
        .iter()
        .filter(|(k, _)| k.starts_with(TRAINING_FIELD_PREFIX))
        .map(|(k, v)| MetadataEntry::new(k.as_str(), v.as_str()))
        .collect();
    entries.sort_by(|a, b| a.field.cmp(&b.field));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_and_sorts_training_fields() {
        let meta: CheckpointMetadata = [
            ("ss_output_name", "test-model"),
            ("ss_total_steps", "9000"),
            ("ss_epoch", "104"),
            ("format", "pt"),
            ("modelspec.title", "x"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            meta.training_entries(),
            vec![
                MetadataEntry::new("ss_epoch", "104"),
                MetadataEntry::new("ss_output_name", "test-model"),
                MetadataEntry::new("ss_total_steps", "9000"),
            ]
        );
    }

    #[test]
    fn no_training_fields_is_empty() {
        let meta: CheckpointMetadata = [("format", "pt")].into_iter().collect();
        assert!(meta.training_entries().is_empty());
        assert!(CheckpointMetadata::default().training_entries().is_empty());
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let meta: CheckpointMetadata = [("SS_epoch", "1"), ("ss", "2")].into_iter().collect();
        assert!(meta.training_entries().is_empty());
    }

    #[test]
    fn all_entries_keeps_everything() {
        let meta: CheckpointMetadata = [("b", "2"), ("a", "1"), ("ss_x", "3")].into_iter().collect();
        let fields: Vec<String> = meta.all_entries().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["a", "b", "ss_x"]);
        assert_eq!(meta.get("b"), Some("2"));
    }
}
