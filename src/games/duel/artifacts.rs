//! Modal artifacts: the Future Tech Lamp and the Future Tech Copy Device.
//!
//! Both open a "pick one" choice that suspends play, so both go through the
//! exclusive lock, and both may be activated once per turn.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{EffectId, RegistrantId};
use crate::lock::LockError;
use crate::session::GameSession;

pub const FUTURE_TECH_LAMP: &str = "FutureTechLamp";
pub const FUTURE_TECH_COPY_DEVICE: &str = "FutureTechCopyDevice";

/// Cards offered by the lamp.
const LAMP_OPTIONS: usize = 3;
/// Cards offered by the copy device.
const COPY_DEVICE_OPTIONS: usize = 5;

/// Failures of a modal artifact activation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("{0} was already used this turn")]
    AlreadyUsedThisTurn(EffectId),

    #[error("{0} has nothing to choose from")]
    NoOptions(EffectId),

    #[error("no {0} choice is pending")]
    NotPending(EffectId),

    #[error("no modal choice is open")]
    NoChoiceOpen,

    #[error("choice {index} is out of range ({len} options)")]
    OutOfRange { index: usize, len: usize },
}

/// An open modal choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub effect: EffectId,
    pub options: SmallVec<[String; 3]>,
}

/// A once-per-turn artifact that asks the player to pick one of several cards.
#[derive(Clone, Debug)]
pub struct ModalArtifact {
    effect: EffectId,
    max_options: usize,
    pending: Option<PendingChoice>,
}

impl ModalArtifact {
    fn named(name: &'static str, max_options: usize) -> Self {
        Self {
            effect: EffectId::from_static(name),
            max_options,
            pending: None,
        }
    }

    /// Offers up to three cards; the chosen one is added to hand.
    #[must_use]
    pub fn future_tech_lamp() -> Self {
        Self::named(FUTURE_TECH_LAMP, LAMP_OPTIONS)
    }

    /// Offers up to five of the opponent's cards; the chosen one is copied.
    #[must_use]
    pub fn future_tech_copy_device() -> Self {
        Self::named(FUTURE_TECH_COPY_DEVICE, COPY_DEVICE_OPTIONS)
    }

    #[must_use]
    pub fn effect(&self) -> &EffectId {
        &self.effect
    }

    #[must_use]
    pub fn max_options(&self) -> usize {
        self.max_options
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    /// Register this artifact's once-per-turn flag.
    pub fn register(&self, session: &mut GameSession) {
        session
            .effects_mut()
            .register_flag(RegistrantId::from(&self.effect));
    }

    /// Activate the artifact and open its choice.
    ///
    /// Opening again while the choice is pending returns the same choice, so
    /// the UI can redisplay it.
    pub fn open(
        &mut self,
        session: &mut GameSession,
        options: impl IntoIterator<Item = String>,
    ) -> Result<&PendingChoice, ChoiceError> {
        let choice = match self.pending.take() {
            Some(pending) => {
                if let Err(error) = session.lock_mut().acquire(&self.effect) {
                    self.pending = Some(pending);
                    return Err(error.into());
                }
                pending
            }
            None => self.activate(session, options)?,
        };
        Ok(self.pending.insert(choice))
    }

    /// Take the lock and spend this turn's use.
    fn activate(
        &self,
        session: &mut GameSession,
        options: impl IntoIterator<Item = String>,
    ) -> Result<PendingChoice, ChoiceError> {
        let options: SmallVec<[String; 3]> = options.into_iter().take(self.max_options).collect();
        if options.is_empty() {
            return Err(ChoiceError::NoOptions(self.effect.clone()));
        }

        session.lock_mut().acquire(&self.effect)?;

        if !session.effects_mut().consume_once(self.effect.as_str()) {
            // Only ever releases our own hold
            session.lock_mut().release(&self.effect)?;
            return Err(ChoiceError::AlreadyUsedThisTurn(self.effect.clone()));
        }

        info!(effect = %self.effect, options = options.len(), "modal choice opened");
        Ok(PendingChoice {
            effect: self.effect.clone(),
            options,
        })
    }

    /// Pick option `index`, close the choice and free the lock.
    pub fn resolve(
        &mut self,
        session: &mut GameSession,
        index: usize,
    ) -> Result<String, ChoiceError> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| ChoiceError::NotPending(self.effect.clone()))?;
        let len = pending.options.len();
        let chosen = pending
            .options
            .get(index)
            .cloned()
            .ok_or(ChoiceError::OutOfRange { index, len })?;

        session.lock_mut().release(&self.effect)?;
        self.pending = None;
        info!(effect = %self.effect, chosen = %chosen, "modal choice resolved");
        Ok(chosen)
    }

    /// Close the choice without picking. The once-per-turn use stays spent.
    pub fn cancel(&mut self, session: &mut GameSession) -> Result<(), ChoiceError> {
        if self.pending.take().is_none() {
            return Err(ChoiceError::NotPending(self.effect.clone()));
        }
        session.lock_mut().release(&self.effect)?;
        debug!(effect = %self.effect, "modal choice cancelled");
        Ok(())
    }

    /// Reopen a choice restored from a saved document.
    ///
    /// The restored lock already names this artifact, so the acquire is an
    /// idempotent re-entry. Saved options beyond this artifact's limit are
    /// dropped; a choice with no options is rejected.
    pub fn resume(
        &mut self,
        session: &mut GameSession,
        mut pending: PendingChoice,
    ) -> Result<&PendingChoice, ChoiceError> {
        if pending.effect != self.effect {
            return Err(ChoiceError::NotPending(self.effect.clone()));
        }
        if pending.options.is_empty() {
            return Err(ChoiceError::NoOptions(self.effect.clone()));
        }
        pending.options.truncate(self.max_options);

        session.lock_mut().acquire(&self.effect)?;
        info!(effect = %self.effect, "modal choice resumed after reconnect");
        Ok(self.pending.insert(pending))
    }

    /// Forget any pending choice without touching the lock (new game).
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
