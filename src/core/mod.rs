//! Core session types: identifiers, peer roles, turns, configuration.
//!
//! These are the building blocks shared by the lock, the effect registry
//! and the persistence layer.

pub mod ids;
pub mod player;
pub mod turn;
pub mod config;

pub use ids::{EffectId, IdError, RegistrantId};
pub use player::PeerRole;
pub use turn::TurnTracker;
pub use config::{
    apply_env_overrides, apply_overrides_from, ConfigError, PersistenceConfig, SessionConfig,
    TurnConfig,
};
