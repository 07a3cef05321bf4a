//! Property tests for the lock and the registry.
//!
//! Random operation sequences are run against a trivial model; the real
//! components must agree with it after every step.

use proptest::prelude::*;

use duel_session::core::{EffectId, RegistrantId};
use duel_session::lock::{ExclusiveModeLock, LockError, LockState};
use duel_session::turns::TurnScopedEffectRegistry;

const EFFECTS: [&str; 3] = ["FutureTechLamp", "FutureTechCopyDevice", "Scry"];
const HEROES: [&str; 4] = ["Heinz", "Kyli", "Beato", "Nicolas"];

#[derive(Clone, Debug)]
enum LockOp {
    Acquire(usize),
    Release(usize),
    ForceRelease,
    Reload,
}

fn lock_op() -> impl Strategy<Value = LockOp> {
    prop_oneof![
        (0..EFFECTS.len()).prop_map(LockOp::Acquire),
        (0..EFFECTS.len()).prop_map(LockOp::Release),
        Just(LockOp::ForceRelease),
        Just(LockOp::Reload),
    ]
}

#[derive(Clone, Debug)]
enum RegistryOp {
    Consume(usize),
    ResetAll,
}

fn registry_op() -> impl Strategy<Value = RegistryOp> {
    prop_oneof![
        3 => (0..HEROES.len()).prop_map(RegistryOp::Consume),
        1 => Just(RegistryOp::ResetAll),
    ]
}

fn effect(index: usize) -> EffectId {
    EffectId::new(EFFECTS[index]).unwrap()
}

proptest! {
    /// The lock matches an `Option<usize>` model: mutual exclusion,
    /// idempotent re-acquire, holder-only release, lossless reload.
    #[test]
    fn lock_agrees_with_model(ops in prop::collection::vec(lock_op(), 1..64)) {
        let mut lock = ExclusiveModeLock::new();
        let mut model: Option<usize> = None;

        for op in ops {
            match op {
                LockOp::Acquire(i) => {
                    let result = lock.acquire(&effect(i));
                    match model {
                        Some(holder) if holder != i => {
                            prop_assert_eq!(result, Err(LockError::AlreadyLocked(effect(holder))));
                        }
                        _ => {
                            prop_assert!(result.is_ok());
                            model = Some(i);
                        }
                    }
                }
                LockOp::Release(i) => {
                    let result = lock.release(&effect(i));
                    if model == Some(i) {
                        prop_assert!(result.is_ok());
                        model = None;
                    } else {
                        let is_not_held = matches!(result, Err(LockError::NotHeld { .. }));
                        prop_assert!(is_not_held);
                    }
                }
                LockOp::ForceRelease => {
                    lock.force_release();
                    model = None;
                }
                LockOp::Reload => {
                    let json = serde_json::to_string(&lock.export_state()).unwrap();
                    let mut reloaded = ExclusiveModeLock::new();
                    reloaded.import_state(serde_json::from_str::<LockState>(&json).unwrap());
                    lock = reloaded;
                }
            }

            prop_assert_eq!(lock.current_holder().cloned(), model.map(effect));
            prop_assert_eq!(lock.is_held(), model.is_some());
        }
    }

    /// Each flag is consumed exactly once between resets.
    #[test]
    fn consume_once_between_resets(ops in prop::collection::vec(registry_op(), 1..128)) {
        let mut registry = TurnScopedEffectRegistry::new();
        for hero in HEROES {
            registry.register_flag(RegistrantId::new(hero).unwrap());
        }
        let mut used = [false; HEROES.len()];

        for op in ops {
            match op {
                RegistryOp::Consume(i) => {
                    let consumed = registry.consume_once(HEROES[i]);
                    prop_assert_eq!(consumed, !used[i]);
                    used[i] = true;
                }
                RegistryOp::ResetAll => {
                    prop_assert!(registry.reset_all().is_empty());
                    used = [false; HEROES.len()];
                }
            }
        }
    }
}
