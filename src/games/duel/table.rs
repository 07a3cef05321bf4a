//! The duel table: one client's session plus its artifacts and heroes.

use thiserror::Error;
use tracing::{info, warn};

use crate::core::{ConfigError, EffectId, PeerRole, SessionConfig};
use crate::persistence::{PersistError, StateStore};
use crate::session::{GameSession, RestoreReport, TurnAdvance};

use super::artifacts::{ChoiceError, ModalArtifact, PendingChoice};
use super::heroes::{Heinz, Kyli, Nicolas};

#[derive(Debug, Error)]
pub enum DuelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Choice(#[from] ChoiceError),
}

/// A client's view of the duel.
#[derive(Debug)]
pub struct DuelTable {
    session: GameSession,
    lamp: ModalArtifact,
    copy_device: ModalArtifact,
}

impl DuelTable {
    /// Set up a fresh table with every hero and artifact registered.
    pub fn new(config: SessionConfig, role: PeerRole) -> Result<Self, DuelError> {
        let mut table = Self {
            session: GameSession::new(config, role)?,
            lamp: ModalArtifact::future_tech_lamp(),
            copy_device: ModalArtifact::future_tech_copy_device(),
        };
        table.register_all();
        Ok(table)
    }

    fn register_all(&mut self) {
        Heinz::register(&mut self.session);
        Kyli::register(&mut self.session);
        Nicolas::register(&mut self.session);
        self.lamp.register(&mut self.session);
        self.copy_device.register(&mut self.session);
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    // === Artifacts ===

    /// Activate the lamp with the cards it offers.
    pub fn open_lamp(
        &mut self,
        options: impl IntoIterator<Item = String>,
    ) -> Result<&PendingChoice, ChoiceError> {
        self.lamp.open(&mut self.session, options)
    }

    /// Activate the copy device with the opponent's cards it can copy.
    pub fn open_copy_device(
        &mut self,
        options: impl IntoIterator<Item = String>,
    ) -> Result<&PendingChoice, ChoiceError> {
        self.copy_device.open(&mut self.session, options)
    }

    /// Resolve whichever modal choice is open.
    pub fn resolve_choice(&mut self, index: usize) -> Result<String, ChoiceError> {
        if self.lamp.pending().is_some() {
            self.lamp.resolve(&mut self.session, index)
        } else if self.copy_device.pending().is_some() {
            self.copy_device.resolve(&mut self.session, index)
        } else {
            Err(ChoiceError::NoChoiceOpen)
        }
    }

    /// Close whichever modal choice is open.
    pub fn cancel_choice(&mut self) -> Result<(), ChoiceError> {
        if self.lamp.pending().is_some() {
            self.lamp.cancel(&mut self.session)
        } else if self.copy_device.pending().is_some() {
            self.copy_device.cancel(&mut self.session)
        } else {
            Err(ChoiceError::NoChoiceOpen)
        }
    }

    /// The open modal choice, if any.
    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.lamp.pending().or_else(|| self.copy_device.pending())
    }

    // === Turns ===

    /// End the current turn.
    pub fn end_turn(&mut self) -> TurnAdvance {
        self.session.advance_turn()
    }

    /// Start a new game on the same table.
    pub fn reset_for_new_game(&mut self) {
        self.session.reset_for_new_game();
        self.lamp.clear();
        self.copy_device.clear();
        self.register_all();
    }

    // === Save / Restore ===

    /// Save the session fields and the open choice.
    pub fn save(&self, store: &mut impl StateStore) -> Result<(), DuelError> {
        let mut patch = self.session.export_patch()?;
        let field = self.pending_field();
        patch.insert_as(field, &self.pending_choice())?;
        store.save(&patch)?;
        Ok(())
    }

    /// Rebuild a table from the shared document after a reconnect.
    ///
    /// An open choice is reopened on the artifact that owns it. A lock
    /// holder with no saved choice to show is released.
    pub fn reconnect(
        config: SessionConfig,
        role: PeerRole,
        store: &impl StateStore,
    ) -> Result<(Self, RestoreReport), DuelError> {
        let mut table = Self::new(config, role)?;
        let document = store.load()?;

        let report = table.session.apply_document(&document)?;
        let pending: Option<PendingChoice> = document.get_as(&table.pending_field())?;

        let holder = table.session.lock().current_holder().cloned();
        match (holder, pending) {
            (Some(holder), Some(pending)) if pending.effect == holder => {
                let session = &mut table.session;
                let resumed = if *table.lamp.effect() == holder {
                    table.lamp.resume(session, pending).map(|_| ())
                } else if *table.copy_device.effect() == holder {
                    table.copy_device.resume(session, pending).map(|_| ())
                } else {
                    Err(ChoiceError::NotPending(holder.clone()))
                };
                if let Err(error) = resumed {
                    warn!(holder = %holder, %error, "saved choice cannot be reopened, releasing");
                    session.lock_mut().force_release();
                }
            }
            (Some(holder), _) => {
                warn!(holder = %holder, "lock restored without a matching choice, releasing");
                table.session.lock_mut().force_release();
            }
            (None, Some(pending)) => {
                warn!(effect = %pending.effect, "saved choice without a lock holder dropped");
            }
            (None, None) => {}
        }

        info!(role = %role, turn = table.session.turn(), "duel table reconnected");
        Ok((table, report))
    }

    /// The modal the other peer had open at its last save, if any.
    pub fn opponent_choosing(
        &self,
        store: &impl StateStore,
    ) -> Result<Option<EffectId>, DuelError> {
        let lock = self.session.opponent_lock(&store.load()?)?;
        Ok(lock.active_effect_id)
    }

    fn pending_field(&self) -> String {
        let persistence = &self.session.config().persistence;
        persistence.field_name(self.session.role(), &persistence.pending_choice_field)
    }
}
