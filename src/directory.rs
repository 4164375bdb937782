//! Field directories and record relabeling

use std::collections::HashMap;

use serde_json::Value;

/// Paired lookup maps for one object's fields.
///
/// Holds key→label for relabeling responses and label→key for resolving
/// sort/filter field identifiers. Both sides are rebuilt together by
/// [`KnackClient::fetch_fields`](crate::KnackClient::fetch_fields); the
/// key side always carries the identity entry `"id" → "id"` so relabeling
/// leaves record ids alone.
#[derive(Debug, Clone)]
pub struct FieldDirectory {
    key_to_label: HashMap<String, String>,
    label_to_key: HashMap<String, String>,
}

impl Default for FieldDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldDirectory {
    pub fn new() -> Self {
        let mut key_to_label = HashMap::new();
        key_to_label.insert("id".to_string(), "id".to_string());
        Self {
            key_to_label,
            label_to_key: HashMap::new(),
        }
    }

    /// Register a field under both maps.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();
        self.key_to_label.insert(key.clone(), label.clone());
        self.label_to_key.insert(label, key);
    }

    /// Label for a field key, if known.
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.key_to_label.get(key).map(String::as_str)
    }

    /// Key for a field label, if known.
    pub fn key_for(&self, label: &str) -> Option<&str> {
        self.label_to_key.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.key_to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_label.is_empty()
    }

    /// Rewrite a record's top-level keys from field keys to labels.
    ///
    /// Keys with no directory entry pass through unchanged, so a record
    /// relabeled against a stale directory loses no data. Non-object
    /// values are left alone.
    pub fn relabel_record(&self, record: &mut Value) {
        let Some(map) = record.as_object_mut() else {
            return;
        };
        let renamed: serde_json::Map<String, Value> = std::mem::take(map)
            .into_iter()
            .map(|(k, v)| match self.label_for(&k) {
                Some(label) => (label.to_string(), v),
                None => (k, v),
            })
            .collect();
        *map = renamed;
    }
}
