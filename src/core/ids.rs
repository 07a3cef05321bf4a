//! Identifiers for modal effects and turn-scoped registrants.
//!
//! Both are opaque, non-empty strings chosen by the card handlers
//! (`"FutureTechLamp"`, `"Heinz"`, ...). Emptiness is rejected at
//! construction so the lock and the registry never have to check it, and
//! deserialization goes through the same validation, so a corrupt saved
//! document cannot smuggle in an empty holder.
//!
//! ```
//! use duel_session::core::{EffectId, IdError};
//!
//! let lamp = EffectId::new("FutureTechLamp").unwrap();
//! assert_eq!(lamp.as_str(), "FutureTechLamp");
//!
//! assert_eq!(EffectId::new(""), Err(IdError::Empty));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when an identifier fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier must not be empty")]
    Empty,
}

/// Identifier of a modal effect that can hold the exclusive-mode lock.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EffectId(String);

impl EffectId {
    /// Create a new effect ID. Fails if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(id))
    }

    /// Create an effect ID from a built-in name.
    ///
    /// Panics if `id` is empty; meant for compile-time constants.
    #[must_use]
    pub fn from_static(id: &'static str) -> Self {
        assert!(!id.is_empty(), "Effect id must not be empty");
        Self(id.to_string())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EffectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EffectId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EffectId> for String {
    fn from(id: EffectId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an owner of turn-scoped state in the effect registry.
///
/// Usually the name of the hero or artifact whose bonus is once per turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrantId(String);

impl RegistrantId {
    /// Create a new registrant ID. Fails if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(id))
    }

    /// Create a registrant ID from a built-in name.
    ///
    /// Panics if `id` is empty; meant for compile-time constants.
    #[must_use]
    pub fn from_static(id: &'static str) -> Self {
        assert!(!id.is_empty(), "Registrant id must not be empty");
        Self(id.to_string())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RegistrantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RegistrantId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegistrantId> for String {
    fn from(id: RegistrantId) -> Self {
        id.0
    }
}

impl From<&EffectId> for RegistrantId {
    /// A modal effect's once-per-turn flag is registered under the effect's own name.
    fn from(id: &EffectId) -> Self {
        Self(id.0.clone())
    }
}

impl std::borrow::Borrow<str> for RegistrantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegistrantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_id_basics() {
        let id = EffectId::new("FutureTechLamp").unwrap();
        assert_eq!(id.as_str(), "FutureTechLamp");
        assert_eq!(format!("{}", id), "FutureTechLamp");
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert_eq!(EffectId::new(""), Err(IdError::Empty));
        assert_eq!(RegistrantId::new(String::new()), Err(IdError::Empty));
    }

    #[test]
    fn test_effect_id_serialization() {
        let id = EffectId::new("FutureTechCopyDevice").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"FutureTechCopyDevice\"");

        let back: EffectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_empty_id_fails_to_deserialize() {
        assert!(serde_json::from_str::<EffectId>("\"\"").is_err());
        assert!(serde_json::from_str::<RegistrantId>("\"\"").is_err());
    }

    #[test]
    #[should_panic(expected = "Effect id must not be empty")]
    fn test_from_static_empty() {
        let _ = EffectId::from_static("");
    }

    #[test]
    fn test_registrant_from_effect() {
        let effect = EffectId::new("FutureTechLamp").unwrap();
        let registrant = RegistrantId::from(&effect);
        assert_eq!(registrant.as_str(), effect.as_str());
    }
}
