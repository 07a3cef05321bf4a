//! Exclusive-mode lock integration tests.
//!
//! These tests walk the lock through the artifact scenarios the battler
//! actually produces: one modal blocking another, release and handover,
//! and reconnect re-entry.

use duel_session::core::EffectId;
use duel_session::lock::{ExclusiveModeLock, LockError, LockState};

fn lamp() -> EffectId {
    EffectId::new("FutureTechLamp").unwrap()
}

fn copy_device() -> EffectId {
    EffectId::new("FutureTechCopyDevice").unwrap()
}

/// Lamp is open, so the copy device is refused and told who holds the lock.
#[test]
fn test_lamp_blocks_copy_device() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&lamp()).unwrap();

    assert_eq!(
        lock.acquire(&copy_device()),
        Err(LockError::AlreadyLocked(lamp()))
    );
}

/// Releasing the lamp hands the lock to the copy device.
#[test]
fn test_release_then_handover() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&lamp()).unwrap();
    lock.release(&lamp()).unwrap();

    assert!(lock.acquire(&copy_device()).is_ok());
    assert_eq!(lock.current_holder(), Some(&copy_device()));
}

/// A stale handler cannot release a lock it does not hold.
#[test]
fn test_stale_release_leaves_lock_unchanged() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&lamp()).unwrap();

    let err = lock.release(&copy_device()).unwrap_err();
    assert!(matches!(err, LockError::NotHeld { .. }));
    assert!(lock.is_held_by(&lamp()));

    // The error is user-presentable
    assert!(format!("{}", err).contains("FutureTechCopyDevice"));
}

/// Error recovery clears any holder.
#[test]
fn test_force_release_recovers() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&copy_device()).unwrap();

    lock.force_release();
    assert!(!lock.is_held());
    assert!(lock.acquire(&lamp()).is_ok());
}

/// Reconnect: saved state goes through JSON, the handler re-acquires with
/// the same id and everyone else stays locked out.
#[test]
fn test_reconnect_reentry() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&lamp()).unwrap();

    let saved = serde_json::to_string(&lock.export_state()).unwrap();

    let mut reconnected = ExclusiveModeLock::new();
    reconnected.import_state(serde_json::from_str::<LockState>(&saved).unwrap());

    assert!(reconnected.acquire(&lamp()).is_ok());
    assert_eq!(
        reconnected.acquire(&copy_device()),
        Err(LockError::AlreadyLocked(lamp()))
    );
}

/// Importing a free state clears a local holder.
#[test]
fn test_import_free_state() {
    let mut lock = ExclusiveModeLock::new();
    lock.acquire(&lamp()).unwrap();

    lock.import_state(LockState::default());
    assert!(!lock.is_held());
    assert_eq!(lock.current_holder(), None);
}
