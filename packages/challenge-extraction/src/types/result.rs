//! Per-URL extraction output.

use indexmap::IndexMap;
use serde::Serialize;

use super::fields::{FieldKey, FieldValue};

/// Parsed attributes for one URL.
///
/// Always holds exactly one value per Field Set key: construction starts from
/// an all-missing mapping and `set` only replaces existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    values: IndexMap<FieldKey, FieldValue>,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::all_missing()
    }
}

impl ExtractionResult {
    /// A result with every field missing.
    pub fn all_missing() -> Self {
        Self {
            values: FieldKey::ALL
                .into_iter()
                .map(|k| (k, FieldValue::Missing))
                .collect(),
        }
    }

    /// Build a result by computing each field in canonical order.
    pub fn from_fn(mut f: impl FnMut(FieldKey) -> FieldValue) -> Self {
        Self {
            values: FieldKey::ALL.into_iter().map(|k| (k, f(k))).collect(),
        }
    }

    /// Replace the value of a field.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) {
        self.values.insert(key, value);
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: FieldKey, value: FieldValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: FieldKey) -> &FieldValue {
        // Every key is present by construction.
        &self.values[&key]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.values.keys().copied()
    }

    /// Number of fields that carry a value.
    pub fn found_count(&self) -> usize {
        self.values.values().filter(|v| !v.is_missing()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }
}
