//! Turn-scoped effect registry.
//!
//! The registry owns every registrant and resets them all at each turn
//! boundary. A registrant that fails to reset, by returning an error or by
//! panicking, is reported, and every other registrant is still reset.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::RegistrantId;

use super::registrants::OnceFlag;

/// Error returned by a registrant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrantError {
    /// The registrant could not complete the operation.
    #[error("{0}")]
    Failed(String),

    /// Imported data did not match the registrant's format.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl RegistrantError {
    /// Create a `Failed` error.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// A registrant that failed during `reset_all` or `import_state`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantFailure {
    pub id: RegistrantId,
    pub error: String,
}

/// Downcasting support for registrants. Implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An owner of turn-scoped state.
///
/// Only `reset` is required. Flag-style registrants override `consume_once`;
/// registrants whose state must survive a reconnect override
/// `export_state` / `import_state`.
pub trait Resettable: AsAny + Send {
    /// Return to the start-of-turn state.
    fn reset(&mut self) -> Result<(), RegistrantError>;

    /// Mark the once-per-turn bonus as used.
    ///
    /// Returns `Some(true)` the first time after a reset, `Some(false)`
    /// afterwards, and `None` if this registrant has no such bonus.
    fn consume_once(&mut self) -> Option<bool> {
        None
    }

    /// Whether the once-per-turn bonus has been used, if there is one.
    fn is_used(&self) -> Option<bool> {
        None
    }

    /// Serializable state, or `None` if this registrant is not persisted.
    fn export_state(&self) -> Option<serde_json::Value> {
        None
    }

    /// Restore state produced by `export_state`.
    fn import_state(&mut self, data: &serde_json::Value) -> Result<(), RegistrantError> {
        let _ = data;
        Ok(())
    }
}

/// Registry of turn-scoped effect owners.
///
/// Registration order is irrelevant. Owners register once when the session
/// is set up and are cleared wholesale on a new game.
#[derive(Default)]
pub struct TurnScopedEffectRegistry {
    registrants: FxHashMap<RegistrantId, Box<dyn Resettable>>,
}

impl TurnScopedEffectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an owner. An existing owner with the same id is replaced.
    pub fn register(&mut self, id: RegistrantId, owner: impl Resettable + 'static) {
        self.register_boxed(id, Box::new(owner));
    }

    /// Register an already boxed owner.
    pub fn register_boxed(&mut self, id: RegistrantId, owner: Box<dyn Resettable>) {
        if self.registrants.insert(id.clone(), owner).is_some() {
            debug!(registrant = %id, "registrant replaced");
        } else {
            debug!(registrant = %id, "registrant added");
        }
    }

    /// Register a plain once-per-turn flag.
    pub fn register_flag(&mut self, id: RegistrantId) {
        self.register(id, OnceFlag::new());
    }

    /// Remove an owner. No-op if absent.
    pub fn unregister(&mut self, id: &str) -> Option<Box<dyn Resettable>> {
        let removed = self.registrants.remove(id);
        if removed.is_some() {
            debug!(registrant = id, "registrant removed");
        }
        removed
    }

    /// Reset every registrant exactly once.
    ///
    /// Failures are collected, sorted by id, and returned; they never stop
    /// the remaining registrants from resetting. A panic inside `reset` is
    /// caught here and reported like an error. The panicking registrant
    /// stays registered.
    pub fn reset_all(&mut self) -> Vec<RegistrantFailure> {
        let mut failures = Vec::new();

        for (id, owner) in &mut self.registrants {
            let error = match panic::catch_unwind(AssertUnwindSafe(|| owner.reset())) {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error.to_string(),
                Err(payload) => format!("reset panicked: {}", panic_message(payload.as_ref())),
            };
            warn!(registrant = %id, %error, "turn reset failed");
            failures.push(RegistrantFailure {
                id: id.clone(),
                error,
            });
        }

        failures.sort_by(|a, b| a.id.cmp(&b.id));
        failures
    }

    /// Use a registrant's once-per-turn bonus.
    ///
    /// Returns `true` exactly once between resets. Unknown ids and
    /// registrants without a once-per-turn bonus return `false`.
    pub fn consume_once(&mut self, id: &str) -> bool {
        let Some(owner) = self.registrants.get_mut(id) else {
            debug!(registrant = id, "consume_once on unknown registrant");
            return false;
        };

        match owner.consume_once() {
            Some(consumed) => {
                debug!(registrant = id, consumed, "consume_once");
                consumed
            }
            None => {
                debug!(registrant = id, "registrant has no once-per-turn bonus");
                false
            }
        }
    }

    /// Whether a registrant's once-per-turn bonus is already used.
    ///
    /// `None` for unknown ids and registrants without such a bonus.
    #[must_use]
    pub fn is_used(&self, id: &str) -> Option<bool> {
        self.registrants.get(id).and_then(|owner| owner.is_used())
    }

    /// Export every persisted registrant's state, keyed by id.
    #[must_use]
    pub fn export_state(&self) -> BTreeMap<RegistrantId, serde_json::Value> {
        self.registrants
            .iter()
            .filter_map(|(id, owner)| owner.export_state().map(|state| (id.clone(), state)))
            .collect()
    }

    /// Import saved state into each registrant present in `data`.
    ///
    /// Ids in `data` with no registrant are skipped. Registrants that reject
    /// their data are reported and keep their current state.
    pub fn import_state(
        &mut self,
        data: &BTreeMap<RegistrantId, serde_json::Value>,
    ) -> Vec<RegistrantFailure> {
        let mut failures = Vec::new();

        for (id, state) in data {
            let Some(owner) = self.registrants.get_mut(id) else {
                warn!(registrant = %id, "saved state for unknown registrant skipped");
                continue;
            };

            if let Err(error) = owner.import_state(state) {
                warn!(registrant = %id, %error, "registrant import failed");
                failures.push(RegistrantFailure {
                    id: id.clone(),
                    error: error.to_string(),
                });
            }
        }

        failures
    }

    /// Typed access to a registrant.
    #[must_use]
    pub fn get<T: Resettable + 'static>(&self, id: &str) -> Option<&T> {
        self.registrants
            .get(id)
            .and_then(|owner| (**owner).as_any().downcast_ref::<T>())
    }

    /// Typed mutable access to a registrant.
    pub fn get_mut<T: Resettable + 'static>(&mut self, id: &str) -> Option<&mut T> {
        self.registrants
            .get_mut(id)
            .and_then(|owner| (**owner).as_any_mut().downcast_mut::<T>())
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.registrants.contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&RegistrantId> {
        let mut ids: Vec<_> = self.registrants.keys().collect();
        ids.sort();
        ids
    }

    /// Get total registrant count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrants.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrants.is_empty()
    }

    /// Drop every registrant (new game).
    pub fn clear(&mut self) {
        self.registrants.clear();
    }
}

impl std::fmt::Debug for TurnScopedEffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnScopedEffectRegistry")
            .field("registrants", &self.ids())
            .finish()
    }
}

/// Text of a panic payload (`panic!` with a literal or a format string).
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
