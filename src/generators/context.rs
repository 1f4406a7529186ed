//! Placeholder contexts and manual records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Placeholder name → rendered value, as handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderContext {
    values: BTreeMap<&'static str, String>,
}

impl PlaceholderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.values.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn placeholder_count(&self) -> usize {
        self.values.len()
    }
}

/// Named form fields of a single manually entered record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualRecord {
    fields: HashMap<String, String>,
}

impl ManualRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Trimmed field value, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// First non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.text(key))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// `first_name` / `last_name`, derived from `student_name` when both are absent.
    pub fn split_name(&self) -> (String, String) {
        let first = self.text("first_name");
        let last = self.text("last_name");
        if !first.is_empty() || !last.is_empty() {
            return (first, last);
        }

        let full = self.text("student_name");
        match full.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (full, String::new()),
        }
    }
}

impl From<HashMap<String, String>> for ManualRecord {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}
