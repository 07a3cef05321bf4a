//! Turn-scoped effects.
//!
//! Many heroes and artifacts grant a bonus "once per turn". Each owner keeps
//! its own state, and the registry resets all of it at the turn boundary.
//!
//! ## Key Components
//!
//! - [`Resettable`]: What an owner implements
//! - [`TurnScopedEffectRegistry`]: Storage, reset and persistence
//! - [`OnceFlag`], [`UsageCounter`]: Ready-made owners
//!
//! ## Example Usage
//!
//! ```
//! use duel_session::core::RegistrantId;
//! use duel_session::turns::TurnScopedEffectRegistry;
//!
//! let mut registry = TurnScopedEffectRegistry::new();
//! registry.register_flag(RegistrantId::new("Heinz").unwrap());
//!
//! assert!(registry.consume_once("Heinz"));   // bonus applies
//! assert!(!registry.consume_once("Heinz"));  // already used this turn
//!
//! let failures = registry.reset_all();        // turn boundary
//! assert!(failures.is_empty());
//! assert!(registry.consume_once("Heinz"));
//! ```

mod registrants;
mod registry;

pub use registrants::{OnceFlag, UsageCounter};
pub use registry::{
    AsAny, RegistrantError, RegistrantFailure, Resettable, TurnScopedEffectRegistry,
};
