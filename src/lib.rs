//! # duel-session
//!
//! Session state guards for a two-player hero card battler.
//!
//! ## Design Principles
//!
//! 1. **One Modal at a Time**: Card effects that stop play for a player
//!    choice hold an exclusive lock while the choice is open.
//!
//! 2. **Uniform Turn Reset**: Every "once per turn" bonus lives in one
//!    registry that resets them all at the turn boundary. A failing owner
//!    never blocks the others.
//!
//! 3. **No Globals**: The lock and the registry belong to an explicit
//!    `GameSession`, so sessions can coexist in one process.
//!
//! 4. **Survive Reconnects**: Both are captured as named fields of a flat
//!    state document and restored from it.
//!
//! ## Concurrency
//!
//! Everything here is plain owned state mutated through `&mut self` from a
//! single event loop. The lock is local to one client; host/guest ordering is
//! settled by the authoritative peer, not here.
//!
//! ## Modules
//!
//! - `core`: Identifiers, peer roles, turns, configuration
//! - `lock`: Exclusive-mode lock
//! - `turns`: Turn-scoped effect registry and built-in registrants
//! - `persistence`: State document and stores
//! - `session`: The session that owns all of the above
//! - `games`: Reference card handlers (`duel`)

pub mod core;
pub mod lock;
pub mod turns;
pub mod persistence;
pub mod session;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    EffectId, RegistrantId, IdError,
    PeerRole, TurnTracker,
    SessionConfig, PersistenceConfig, TurnConfig, ConfigError,
};

pub use crate::lock::{ExclusiveModeLock, LockError, LockState};

pub use crate::turns::{
    Resettable, RegistrantError, RegistrantFailure,
    TurnScopedEffectRegistry, OnceFlag, UsageCounter,
};

pub use crate::persistence::{Document, PersistError, StateStore, MemoryStore, FileStore};

pub use crate::session::{GameSession, SessionSnapshot, TurnAdvance, RestoreReport};
