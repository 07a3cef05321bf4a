//! Duel: the two-player hero battler's card handlers.
//!
//! A compact integration showing how card effects use the session:
//! - Future Tech Lamp / Copy Device open modal choices under the
//!   exclusive lock, once per turn each
//! - Heinz, Kyli and Nicolas keep their per-turn bonuses in the registry
//! - `DuelTable` saves the open choice with the session and reopens it on
//!   reconnect
//!
//! ```
//! use duel_session::core::{PeerRole, SessionConfig};
//! use duel_session::games::duel::DuelTable;
//! use duel_session::persistence::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let mut table = DuelTable::new(SessionConfig::default(), PeerRole::Host).unwrap();
//! table.open_lamp(vec!["Fireball".into(), "Heal".into()]).unwrap();
//! table.save(&mut store).unwrap();
//!
//! let (mut table, _) = DuelTable::reconnect(SessionConfig::default(), PeerRole::Host, &store).unwrap();
//! assert_eq!(table.resolve_choice(1).unwrap(), "Heal");
//! ```

mod artifacts;
mod heroes;
mod table;

pub use artifacts::{
    ChoiceError, ModalArtifact, PendingChoice, FUTURE_TECH_COPY_DEVICE, FUTURE_TECH_LAMP,
};
pub use heroes::{Heinz, Kyli, Nicolas, HEINZ, KYLI, KYLI_RECALLS_PER_TURN, NICOLAS};
pub use table::{DuelError, DuelTable};
