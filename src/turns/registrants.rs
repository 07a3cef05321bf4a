//! Built-in registrants for the common once-per-turn patterns.

use serde::{Deserialize, Serialize};

use super::registry::{RegistrantError, Resettable};

/// A "used this turn" flag.
///
/// Unused → Used on `consume_once`, Used → Unused on `reset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnceFlag {
    used: bool,
}

impl OnceFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn used(&self) -> bool {
        self.used
    }

    /// Set the flag directly, for effects that spend the bonus outside
    /// `consume_once`.
    pub fn mark_used(&mut self) {
        self.used = true;
    }
}

impl Resettable for OnceFlag {
    fn reset(&mut self) -> Result<(), RegistrantError> {
        self.used = false;
        Ok(())
    }

    fn consume_once(&mut self) -> Option<bool> {
        let first = !self.used;
        self.used = true;
        Some(first)
    }

    fn is_used(&self) -> Option<bool> {
        Some(self.used)
    }

    fn export_state(&self) -> Option<serde_json::Value> {
        Some(serde_json::Value::Bool(self.used))
    }

    fn import_state(&mut self, data: &serde_json::Value) -> Result<(), RegistrantError> {
        self.used = data
            .as_bool()
            .ok_or_else(|| RegistrantError::InvalidState(format!("expected a bool, got {}", data)))?;
        Ok(())
    }
}

/// Counts uses within a turn, with an optional per-turn limit.
///
/// For effects like "up to twice per turn". Without a limit it only counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    used: u32,
    limit: Option<u32>,
}

impl UsageCounter {
    /// An unlimited counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter allowing at most `limit` uses per turn.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            used: 0,
            limit: Some(limit),
        }
    }

    /// Uses this turn.
    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Uses left this turn. `None` if unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }

    /// Record a use if the limit allows it.
    pub fn try_use(&mut self) -> bool {
        if self.remaining() == Some(0) {
            return false;
        }
        self.used = self.used.saturating_add(1);
        true
    }
}

impl Resettable for UsageCounter {
    fn reset(&mut self) -> Result<(), RegistrantError> {
        self.used = 0;
        Ok(())
    }

    fn export_state(&self) -> Option<serde_json::Value> {
        Some(serde_json::Value::from(self.used))
    }

    fn import_state(&mut self, data: &serde_json::Value) -> Result<(), RegistrantError> {
        let used = data
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| RegistrantError::InvalidState(format!("expected a count, got {}", data)))?;
        self.used = used;
        Ok(())
    }
}
