//! Turn-scoped effect registry integration tests.
//!
//! These tests cover the reset contract (every owner once, failures
//! isolated), consume-once semantics and persistence of registrant state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use duel_session::core::RegistrantId;
use duel_session::turns::{
    OnceFlag, RegistrantError, RegistrantFailure, Resettable, TurnScopedEffectRegistry,
    UsageCounter,
};

fn rid(name: &str) -> RegistrantId {
    RegistrantId::new(name).unwrap()
}

/// Registrant that counts its resets and can be told to fail.
struct Tracked {
    resets: Arc<AtomicUsize>,
    failure: Option<&'static str>,
}

impl Tracked {
    fn ok(resets: &Arc<AtomicUsize>) -> Self {
        Self {
            resets: resets.clone(),
            failure: None,
        }
    }

    fn failing(resets: &Arc<AtomicUsize>, reason: &'static str) -> Self {
        Self {
            resets: resets.clone(),
            failure: Some(reason),
        }
    }
}

impl Resettable for Tracked {
    fn reset(&mut self) -> Result<(), RegistrantError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(reason) => Err(RegistrantError::failed(reason)),
            None => Ok(()),
        }
    }
}

/// Heinz: consume, refuse, reset, consume again.
#[test]
fn test_heinz_scenario() {
    let mut registry = TurnScopedEffectRegistry::new();
    registry.register(rid("Heinz"), OnceFlag::new());

    assert!(registry.consume_once("Heinz"));
    assert!(!registry.consume_once("Heinz"));

    registry.reset_all();
    assert!(registry.consume_once("Heinz"));
}

/// "A" fails with "boom", "B" still resets, one failure is reported.
#[test]
fn test_boom_scenario() {
    let resets_a = Arc::new(AtomicUsize::new(0));
    let resets_b = Arc::new(AtomicUsize::new(0));

    let mut registry = TurnScopedEffectRegistry::new();
    registry.register(rid("A"), Tracked::failing(&resets_a, "boom"));
    registry.register(rid("B"), Tracked::ok(&resets_b));

    let failures = registry.reset_all();

    assert_eq!(resets_b.load(Ordering::SeqCst), 1);
    assert_eq!(
        failures,
        vec![RegistrantFailure {
            id: rid("A"),
            error: "boom".to_string(),
        }]
    );
}

/// Owners registered before and after a failing one all reset exactly once.
#[test]
fn test_failure_in_the_middle() {
    let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    let mut registry = TurnScopedEffectRegistry::new();
    registry.register(rid("Y"), Tracked::ok(&counters[0]));
    registry.register(rid("X"), Tracked::failing(&counters[1], "broken"));
    registry.register(rid("Z"), Tracked::ok(&counters[2]));

    let failures = registry.reset_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, rid("X"));

    for counter in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

/// Every failing owner is reported, in id order.
#[test]
fn test_multiple_failures_sorted() {
    let resets = Arc::new(AtomicUsize::new(0));
    let mut registry = TurnScopedEffectRegistry::new();
    for name in ["Vacarn", "Beato", "Semi"] {
        registry.register(rid(name), Tracked::failing(&resets, "no"));
    }

    let failures = registry.reset_all();
    let ids: Vec<_> = failures.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["Beato", "Semi", "Vacarn"]);
    assert_eq!(resets.load(Ordering::SeqCst), 3);
}

/// After unregister, reset no longer reaches the owner.
#[test]
fn test_unregister_removes_participation() {
    let resets = Arc::new(AtomicUsize::new(0));
    let mut registry = TurnScopedEffectRegistry::new();
    registry.register(rid("Beato"), Tracked::ok(&resets));

    registry.reset_all();
    registry.unregister("Beato");
    registry.reset_all();

    assert_eq!(resets.load(Ordering::SeqCst), 1);
}

/// Replacing an owner means only the new one is reset.
#[test]
fn test_replaced_owner_not_reset() {
    let old = Arc::new(AtomicUsize::new(0));
    let new = Arc::new(AtomicUsize::new(0));
    let mut registry = TurnScopedEffectRegistry::new();

    registry.register(rid("Semi"), Tracked::ok(&old));
    registry.register(rid("Semi"), Tracked::ok(&new));
    registry.reset_all();

    assert_eq!(old.load(Ordering::SeqCst), 0);
    assert_eq!(new.load(Ordering::SeqCst), 1);
}

/// Boxed owners register the same way.
#[test]
fn test_register_boxed() {
    let mut registry = TurnScopedEffectRegistry::new();
    let owner: Box<dyn Resettable> = Box::new(OnceFlag::new());
    registry.register_boxed(rid("Vacarn"), owner);

    assert!(registry.consume_once("Vacarn"));
}

/// State survives export, JSON and import into a freshly built registry.
#[test]
fn test_persistence_through_json() {
    let mut registry = TurnScopedEffectRegistry::new();
    registry.register_flag(rid("Heinz"));
    registry.register_flag(rid("Beato"));
    registry.register(rid("Kyli"), UsageCounter::with_limit(2));

    registry.consume_once("Heinz");
    registry.get_mut::<UsageCounter>("Kyli").unwrap().try_use();

    let json = serde_json::to_string(&registry.export_state()).unwrap();
    let data: BTreeMap<RegistrantId, serde_json::Value> = serde_json::from_str(&json).unwrap();

    let mut rebuilt = TurnScopedEffectRegistry::new();
    rebuilt.register_flag(rid("Heinz"));
    rebuilt.register_flag(rid("Beato"));
    rebuilt.register(rid("Kyli"), UsageCounter::with_limit(2));
    assert!(rebuilt.import_state(&data).is_empty());

    assert!(!rebuilt.consume_once("Heinz"));
    assert!(rebuilt.consume_once("Beato"));
    assert_eq!(
        rebuilt.get::<UsageCounter>("Kyli").unwrap().remaining(),
        Some(1)
    );
}

/// Hero manager whose reset trips over its own bookkeeping.
struct Crashing;

impl Resettable for Crashing {
    fn reset(&mut self) -> Result<(), RegistrantError> {
        let picks: Vec<&str> = Vec::new();
        let _ = picks[0];
        Ok(())
    }
}

/// A crash in one owner's reset is reported and the turn still resets the rest.
#[test]
fn test_crashing_owner_does_not_block_turn() {
    let mut session = duel_session::GameSession::new(
        duel_session::SessionConfig::default(),
        duel_session::PeerRole::Host,
    )
    .unwrap();
    session.effects_mut().register_flag(rid("Heinz"));
    session.effects_mut().register(rid("Semi"), Crashing);
    session.effects_mut().register_flag(rid("Vacarn"));
    session.effects_mut().consume_once("Heinz");
    session.effects_mut().consume_once("Vacarn");

    let advance = session.advance_turn();

    assert_eq!(advance.turn, 2);
    assert_eq!(advance.failures.len(), 1);
    assert_eq!(advance.failures[0].id, rid("Semi"));
    assert!(advance.failures[0].error.starts_with("reset panicked: "));
    assert!(session.effects_mut().consume_once("Heinz"));
    assert!(session.effects_mut().consume_once("Vacarn"));
}
