//! Exclusive-mode lock for modal card effects.
//!
//! A modal effect suspends normal play until the player makes a choice
//! ("pick 1 of 3 cards"). Only one may be open at a time. Card handlers
//! acquire the lock before presenting the choice and release it when the
//! choice is resolved or cancelled.
//!
//! ## Example Usage
//!
//! ```
//! use duel_session::core::EffectId;
//! use duel_session::lock::{ExclusiveModeLock, LockError};
//!
//! let lamp = EffectId::new("FutureTechLamp").unwrap();
//! let copier = EffectId::new("FutureTechCopyDevice").unwrap();
//!
//! let mut lock = ExclusiveModeLock::new();
//! lock.acquire(&lamp).unwrap();
//!
//! // A second modal is refused while the lamp's choice is open
//! assert_eq!(lock.acquire(&copier), Err(LockError::AlreadyLocked(lamp.clone())));
//!
//! lock.release(&lamp).unwrap();
//! assert!(lock.acquire(&copier).is_ok());
//! ```
//!
//! ## Persistence
//!
//! `export_state` / `import_state` carry the holder across reconnects, so a
//! reconnecting client knows a modal is still pending and can redisplay it.

mod exclusive;

pub use exclusive::{ExclusiveModeLock, LockError, LockState};
