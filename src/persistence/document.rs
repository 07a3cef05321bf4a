//! Flat key-value state document.

use im::OrdMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PersistError;

/// A flat document of named JSON fields.
///
/// Backed by a persistent map, so cloning a document to keep a snapshot or
/// build a patch is O(1).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: OrdMap<String, serde_json::Value>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a raw field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }

    /// Set a raw field, returning the previous value.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.fields.insert(field.into(), value)
    }

    /// Remove a field.
    pub fn remove(&mut self, field: &str) -> Option<serde_json::Value> {
        self.fields.remove(field)
    }

    /// Deserialize a field. `Ok(None)` if it is absent or null.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, PersistError> {
        match self.fields.get(field) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| PersistError::Deserialize {
                    field: field.to_string(),
                    source,
                }),
        }
    }

    /// Serialize a value into a field.
    pub fn insert_as<T: Serialize>(
        &mut self,
        field: impl Into<String>,
        value: &T,
    ) -> Result<(), PersistError> {
        let field = field.into();
        let value = serde_json::to_value(value).map_err(|source| PersistError::Serialize {
            field: field.clone(),
            source,
        })?;
        self.fields.insert(field, value);
        Ok(())
    }

    /// Apply a patch: every field in `patch` overwrites the field here.
    pub fn merge(&mut self, patch: &Document) {
        for (field, value) in &patch.fields {
            self.fields.insert(field.clone(), value.clone());
        }
    }

    /// Whether a field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
