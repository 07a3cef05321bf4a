//! Game session: the owner of one client's lock, registry and turn counter.
//!
//! A session is an explicit value handed to card handlers; nothing here is
//! global, so several sessions can live in one process (tests, a server
//! hosting many rooms).
//!
//! ## Turn flow
//!
//! The turn tracker calls [`GameSession::advance_turn`] once per turn
//! boundary. That resets every turn-scoped effect and reports the
//! registrants that failed, without stopping the turn from advancing.
//!
//! ## Save / restore
//!
//! [`GameSession::export_patch`] writes the lock, the exported effect state
//! and the turn number as named fields (prefixed with the peer role by
//! default). [`GameSession::apply_document`] reads them back on reconnect.
//! Fields missing from the document leave the session's current values in
//! place.
//!
//! ```
//! use duel_session::core::{EffectId, PeerRole, RegistrantId, SessionConfig};
//! use duel_session::persistence::MemoryStore;
//! use duel_session::session::GameSession;
//!
//! let mut store = MemoryStore::new();
//! let lamp = EffectId::new("FutureTechLamp").unwrap();
//!
//! let mut session = GameSession::new(SessionConfig::default(), PeerRole::Host).unwrap();
//! session.effects_mut().register_flag(RegistrantId::new("Heinz").unwrap());
//! session.lock_mut().acquire(&lamp).unwrap();
//! session.effects_mut().consume_once("Heinz");
//! session.save(&mut store).unwrap();
//!
//! // Reconnect: a fresh client rebuilds its registrants, then restores
//! let mut reconnected = GameSession::new(SessionConfig::default(), PeerRole::Host).unwrap();
//! reconnected.effects_mut().register_flag(RegistrantId::new("Heinz").unwrap());
//! reconnected.restore(&store).unwrap();
//!
//! assert_eq!(reconnected.lock().current_holder(), Some(&lamp));
//! assert!(!reconnected.effects_mut().consume_once("Heinz"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{ConfigError, PeerRole, RegistrantId, SessionConfig, TurnTracker};
use crate::lock::{ExclusiveModeLock, LockState};
use crate::persistence::{Document, PersistError, StateStore};
use crate::turns::{RegistrantFailure, TurnScopedEffectRegistry};

/// Outcome of a turn boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnAdvance {
    /// The new turn number.
    pub turn: u32,
    /// Registrants whose reset failed. The turn advanced anyway.
    pub failures: Vec<RegistrantFailure>,
}

/// Outcome of applying a saved document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// A lock field was present and applied.
    pub lock_restored: bool,
    /// A turn field was present and applied.
    pub turn_restored: bool,
    /// Registrants that rejected their saved state.
    pub failures: Vec<RegistrantFailure>,
}

/// Everything a session persists, in one value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub turn: u32,
    pub lock: LockState,
    pub effects: BTreeMap<RegistrantId, serde_json::Value>,
}

/// One client's session state.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    role: PeerRole,
    turns: TurnTracker,
    lock: ExclusiveModeLock,
    effects: TurnScopedEffectRegistry,
}

impl GameSession {
    /// Create a session for `role`. The configuration is validated first.
    pub fn new(config: SessionConfig, role: PeerRole) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            turns: TurnTracker::new(config.turns.first_turn),
            config,
            role,
            lock: ExclusiveModeLock::new(),
            effects: TurnScopedEffectRegistry::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn role(&self) -> PeerRole {
        self.role
    }

    /// The current turn number.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turns.current()
    }

    #[must_use]
    pub fn lock(&self) -> &ExclusiveModeLock {
        &self.lock
    }

    pub fn lock_mut(&mut self) -> &mut ExclusiveModeLock {
        &mut self.lock
    }

    #[must_use]
    pub fn effects(&self) -> &TurnScopedEffectRegistry {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut TurnScopedEffectRegistry {
        &mut self.effects
    }

    // === Turn Advancement ===

    /// Cross a turn boundary: bump the turn and reset every turn-scoped
    /// effect exactly once.
    ///
    /// An open modal is left alone; closing it is the card handler's call.
    pub fn advance_turn(&mut self) -> TurnAdvance {
        let turn = self.turns.advance();
        let failures = self.effects.reset_all();

        if failures.is_empty() {
            info!(turn, registrants = self.effects.len(), "turn advanced");
        } else {
            warn!(
                turn,
                failed = failures.len(),
                registrants = self.effects.len(),
                "turn advanced with reset failures"
            );
        }

        TurnAdvance { turn, failures }
    }

    /// Start over: free the lock, drop every registrant, back to the first turn.
    pub fn reset_for_new_game(&mut self) {
        self.lock.force_release();
        self.effects.clear();
        self.turns.reset();
        info!(role = %self.role, "session reset for new game");
    }

    // === Save / Restore ===

    /// Capture everything this session persists.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turn: self.turns.current(),
            lock: self.lock.export_state(),
            effects: self.effects.export_state(),
        }
    }

    /// Document field name for a configured base field.
    fn field(&self, base: &str) -> String {
        self.config.persistence.field_name(self.role, base)
    }

    /// Build the patch this session writes to the shared document.
    pub fn export_patch(&self) -> Result<Document, PersistError> {
        let snapshot = self.snapshot();
        let persistence = &self.config.persistence;

        let mut patch = Document::new();
        patch.insert_as(self.field(&persistence.lock_field), &snapshot.lock)?;
        patch.insert_as(self.field(&persistence.effects_field), &snapshot.effects)?;
        patch.insert_as(self.field(&persistence.turn_field), &snapshot.turn)?;
        Ok(patch)
    }

    /// Restore lock, effect state and turn from a document.
    ///
    /// Registrants must already be registered; only their state is restored.
    /// Malformed fields fail the whole restore before anything is applied.
    pub fn apply_document(&mut self, document: &Document) -> Result<RestoreReport, PersistError> {
        let persistence = &self.config.persistence;
        let lock_field = self.field(&persistence.lock_field);
        let effects_field = self.field(&persistence.effects_field);
        let turn_field = self.field(&persistence.turn_field);

        let lock: Option<LockState> = document.get_as(&lock_field)?;
        let effects: Option<BTreeMap<RegistrantId, serde_json::Value>> =
            document.get_as(&effects_field)?;
        let turn: Option<u32> = document.get_as(&turn_field)?;

        let mut report = RestoreReport::default();

        if let Some(lock) = lock {
            self.lock.import_state(lock);
            report.lock_restored = true;
        }
        if let Some(effects) = effects {
            report.failures = self.effects.import_state(&effects);
        }
        if let Some(turn) = turn {
            self.turns.restore(turn);
            report.turn_restored = true;
        }

        info!(
            role = %self.role,
            authoritative = self.role.is_authoritative(),
            turn = self.turns.current(),
            holder = ?self.lock.current_holder().map(|id| id.as_str()),
            failed = report.failures.len(),
            "session restored"
        );
        Ok(report)
    }

    /// Lock state the other peer last saved to `document`.
    ///
    /// Lets a client show that its opponent is in the middle of a choice.
    /// Free if the opponent has not saved a lock yet.
    pub fn opponent_lock(&self, document: &Document) -> Result<LockState, PersistError> {
        let field = self
            .config
            .persistence
            .field_name(self.role.opponent(), &self.config.persistence.lock_field);
        Ok(document.get_as::<LockState>(&field)?.unwrap_or_default())
    }

    /// Save this session's fields to a store.
    pub fn save(&self, store: &mut impl StateStore) -> Result<(), PersistError> {
        store.save(&self.export_patch()?)
    }

    /// Load the store's document and apply it.
    pub fn restore(&mut self, store: &impl StateStore) -> Result<RestoreReport, PersistError> {
        let document = store.load()?;
        self.apply_document(&document)
    }
}
