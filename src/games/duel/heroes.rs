//! Hero abilities with turn-scoped state.
//!
//! Each hero is a registrant in the session's effect registry; none of them
//! resets its own flags.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::RegistrantId;
use crate::session::GameSession;
use crate::turns::{RegistrantError, Resettable, UsageCounter};

pub const HEINZ: &str = "Heinz";
pub const KYLI: &str = "Kyli";
pub const NICOLAS: &str = "Nicolas";

/// Graveyard recalls Kyli may perform per turn.
pub const KYLI_RECALLS_PER_TURN: u32 = 2;

/// Heinz: the first card drawn each turn draws one more.
pub struct Heinz;

impl Heinz {
    pub fn register(session: &mut GameSession) {
        session
            .effects_mut()
            .register_flag(RegistrantId::from_static(HEINZ));
    }

    /// Extra cards to draw for a draw that just happened.
    pub fn on_card_drawn(session: &mut GameSession) -> u32 {
        if session.effects_mut().consume_once(HEINZ) {
            debug!("Heinz draw bonus");
            1
        } else {
            0
        }
    }
}

/// Kyli: recall a card from the graveyard, up to twice per turn.
pub struct Kyli;

impl Kyli {
    pub fn register(session: &mut GameSession) {
        session.effects_mut().register(
            RegistrantId::from_static(KYLI),
            UsageCounter::with_limit(KYLI_RECALLS_PER_TURN),
        );
    }

    /// Spend one recall. `false` once the turn's recalls are gone.
    pub fn try_recall(session: &mut GameSession) -> bool {
        session
            .effects_mut()
            .get_mut::<UsageCounter>(KYLI)
            .is_some_and(UsageCounter::try_use)
    }

    /// Recalls left this turn.
    #[must_use]
    pub fn recalls_left(session: &GameSession) -> u32 {
        session
            .effects()
            .get::<UsageCounter>(KYLI)
            .and_then(UsageCounter::remaining)
            .unwrap_or(0)
    }
}

/// Nicolas: gain 1 gold for the first card of each type played in a turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nicolas {
    played_types: BTreeSet<String>,
}

impl Nicolas {
    pub fn register(session: &mut GameSession) {
        session
            .effects_mut()
            .register(RegistrantId::from_static(NICOLAS), Nicolas::default());
    }

    /// Gold gained for playing a card of `card_type`.
    pub fn on_card_played(session: &mut GameSession, card_type: &str) -> u32 {
        let Some(nicolas) = session.effects_mut().get_mut::<Nicolas>(NICOLAS) else {
            return 0;
        };
        if nicolas.played_types.insert(card_type.to_string()) {
            debug!(card_type, "Nicolas gold bonus");
            1
        } else {
            0
        }
    }

    /// Card types already rewarded this turn.
    #[must_use]
    pub fn played_types(&self) -> &BTreeSet<String> {
        &self.played_types
    }
}

impl Resettable for Nicolas {
    fn reset(&mut self) -> Result<(), RegistrantError> {
        self.played_types.clear();
        Ok(())
    }

    fn export_state(&self) -> Option<serde_json::Value> {
        serde_json::to_value(&self.played_types).ok()
    }

    fn import_state(&mut self, data: &serde_json::Value) -> Result<(), RegistrantError> {
        self.played_types = serde_json::from_value(data.clone())
            .map_err(|e| RegistrantError::InvalidState(e.to_string()))?;
        Ok(())
    }
}
