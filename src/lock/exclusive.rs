//! The exclusive-mode lock.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::EffectId;

/// Recoverable lock failures.
///
/// Neither is fatal: `AlreadyLocked` means the caller must not open its
/// modal, `NotHeld` means a stale handler tried to release someone else's
/// lock and should be logged and ignored.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("another effect is in progress: {0}")]
    AlreadyLocked(EffectId),

    #[error("{requested} does not hold the exclusive lock (holder: {})", .holder.as_ref().map_or("none", EffectId::as_str))]
    NotHeld {
        requested: EffectId,
        holder: Option<EffectId>,
    },
}

/// Serializable lock snapshot.
///
/// Unknown keys are rejected, so a document field holding something else
/// fails to load instead of reading as a free lock.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LockState {
    #[serde(default)]
    pub active_effect_id: Option<EffectId>,
}

/// Gate ensuring at most one modal effect is open per session.
///
/// The lock is local to one client. It does not arbitrate between host and
/// guest; that is the authoritative peer's job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusiveModeLock {
    active: Option<EffectId>,
}

impl ExclusiveModeLock {
    /// Create a free lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `effect`.
    ///
    /// Re-acquiring with the current holder succeeds, so a reconnecting
    /// handler can reopen its modal after `import_state`.
    pub fn acquire(&mut self, effect: &EffectId) -> Result<(), LockError> {
        match &self.active {
            Some(holder) if holder == effect => {
                debug!(effect = %effect, "exclusive lock re-entered");
                Ok(())
            }
            Some(holder) => {
                warn!(effect = %effect, holder = %holder, "exclusive lock already held");
                Err(LockError::AlreadyLocked(holder.clone()))
            }
            None => {
                debug!(effect = %effect, "exclusive lock acquired");
                self.active = Some(effect.clone());
                Ok(())
            }
        }
    }

    /// Release the lock if `effect` holds it.
    pub fn release(&mut self, effect: &EffectId) -> Result<(), LockError> {
        if self.active.as_ref() != Some(effect) {
            warn!(
                effect = %effect,
                holder = ?self.active.as_ref().map(EffectId::as_str),
                "stale release of exclusive lock ignored"
            );
            return Err(LockError::NotHeld {
                requested: effect.clone(),
                holder: self.active.clone(),
            });
        }
        debug!(effect = %effect, "exclusive lock released");
        self.active = None;
        Ok(())
    }

    /// Clear the lock regardless of holder. Returns the previous holder.
    pub fn force_release(&mut self) -> Option<EffectId> {
        let previous = self.active.take();
        if let Some(holder) = &previous {
            info!(holder = %holder, "exclusive lock force-released");
        }
        previous
    }

    /// Whether any effect holds the lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `effect` specifically holds the lock.
    #[must_use]
    pub fn is_held_by(&self, effect: &EffectId) -> bool {
        self.active.as_ref() == Some(effect)
    }

    /// The current holder, if any.
    #[must_use]
    pub fn current_holder(&self) -> Option<&EffectId> {
        self.active.as_ref()
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn export_state(&self) -> LockState {
        LockState {
            active_effect_id: self.active.clone(),
        }
    }

    /// Restore a saved snapshot, replacing the current holder.
    pub fn import_state(&mut self, state: LockState) {
        if self.active != state.active_effect_id {
            info!(
                previous = ?self.active.as_ref().map(EffectId::as_str),
                restored = ?state.active_effect_id.as_ref().map(EffectId::as_str),
                "exclusive lock restored"
            );
        }
        self.active = state.active_effect_id;
    }
}
