//! End-to-end battle lifecycle through the coordinator.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use battle_content::ContentBundle;
use battle_core::{
    Action, BattleId, BattleSession, CombatantId, EffectTarget, EffectType, EngineError, EventKey,
    Move, MoveCategory, MoveEffect, PayloadValue, Side, TurnPhase, UnitState,
};
use runtime::{
    BattleCoordinator, BattleStateStore, BattleUpdate, ConnectionId, InMemoryBattleStore,
    OracleManager, Roster, RuntimeConfig, RuntimeError, Seat, StaticRosterProvider, StoreError,
    UpdateKind,
};
use tokio::sync::mpsc;

const ALICE: CombatantId = CombatantId(10);
const BOB: CombatantId = CombatantId(20);

fn tackle() -> Move {
    Move {
        id: "tackle".into(),
        name: "Tackle".into(),
        power: 40,
        category: MoveCategory::Damaging,
        affinity: None,
        effects: vec![],
    }
}

fn tank() -> Roster {
    Roster::new(
        vec![UnitState::new(1, "Bulwark", 1000, 10, 200, 50, [tackle()])],
        BTreeMap::new(),
    )
}

fn sleep_on(target: EffectTarget, duration: Option<u32>) -> MoveEffect {
    MoveEffect {
        kind: EffectType::Sleep,
        chance: 1.0,
        target,
        duration,
        magnitude: None,
    }
}

/// Fast tank whose `lullaby` carries `effects`.
fn sleeper(effects: Vec<MoveEffect>) -> Roster {
    let lullaby = Move {
        id: "lullaby".into(),
        name: "Lullaby".into(),
        power: 0,
        category: MoveCategory::Support,
        affinity: None,
        effects,
    };
    Roster::new(
        vec![UnitState::new(3, "Dozer", 1000, 10, 200, 80, [lullaby, tackle()])],
        BTreeMap::new(),
    )
}

fn glass() -> Roster {
    Roster::new(
        vec![UnitState::new(2, "Wisp", 1, 10, 10, 10, [tackle()])],
        BTreeMap::new(),
    )
}

fn seat(combatant: CombatantId, connection: u64) -> Seat {
    Seat::new(combatant, ConnectionId(connection))
}

fn config() -> RuntimeConfig {
    RuntimeConfig {
        rng_seed: Some(7),
        ..RuntimeConfig::default()
    }
}

fn coordinator_with(
    store: Arc<dyn BattleStateStore>,
    rosters: StaticRosterProvider,
) -> (BattleCoordinator, mpsc::Receiver<BattleUpdate>) {
    let oracles = OracleManager::from_content(ContentBundle::bundled().unwrap(), "en");
    BattleCoordinator::builder()
        .config(config())
        .store(store)
        .rosters(rosters)
        .oracles(oracles)
        .build()
        .unwrap()
}

fn memory_store() -> Arc<InMemoryBattleStore> {
    Arc::new(InMemoryBattleStore::new(Duration::from_secs(3600), 64))
}

fn tanks() -> StaticRosterProvider {
    StaticRosterProvider::new().with_fallback(tank())
}

fn drain(rx: &mut mpsc::Receiver<BattleUpdate>) -> Vec<BattleUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

async fn started_pvp(coordinator: &BattleCoordinator) -> BattleId {
    let session = coordinator
        .create_pvp(seat(ALICE, 1), seat(BOB, 2))
        .await
        .unwrap();
    for combatant in [ALICE, BOB] {
        let outcome = coordinator
            .submit(session.id, combatant, Action::SelectStarter { unit_index: 0 })
            .await
            .unwrap();
        assert!(outcome.accepted());
    }
    session.id
}

fn stored(coordinator: &BattleCoordinator, battle: BattleId) -> Option<BattleSession> {
    coordinator.session(battle).unwrap()
}

/// Counts writes and successful deletions.
struct CountingStore {
    inner: InMemoryBattleStore,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBattleStore::new(Duration::from_secs(3600), 64),
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        })
    }
}

impl BattleStateStore for CountingStore {
    fn get(&self, id: BattleId) -> Result<Option<BattleSession>, StoreError> {
        self.inner.get(id)
    }

    fn set(&self, id: BattleId, session: &BattleSession, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(id, session, ttl)
    }

    fn delete(&self, id: BattleId) -> Result<bool, StoreError> {
        let removed = self.inner.delete(id)?;
        if removed {
            self.deletes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    fn list_ids(&self) -> Result<Vec<BattleId>, StoreError> {
        self.inner.list_ids()
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        self.inner.purge_expired()
    }

    fn session_lock(&self, id: BattleId) -> Arc<tokio::sync::Mutex<()>> {
        self.inner.session_lock(id)
    }
}

/// Rejects writes while `failing` is set.
struct FlakyStore {
    inner: InMemoryBattleStore,
    failing: AtomicBool,
}

impl BattleStateStore for FlakyStore {
    fn get(&self, id: BattleId) -> Result<Option<BattleSession>, StoreError> {
        self.inner.get(id)
    }

    fn set(&self, id: BattleId, session: &BattleSession, ttl: Option<Duration>) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("cache offline".into()));
        }
        self.inner.set(id, session, ttl)
    }

    fn delete(&self, id: BattleId) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }

    fn list_ids(&self) -> Result<Vec<BattleId>, StoreError> {
        self.inner.list_ids()
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        self.inner.purge_expired()
    }

    fn session_lock(&self, id: BattleId) -> Arc<tokio::sync::Mutex<()>> {
        self.inner.session_lock(id)
    }
}

#[tokio::test(start_paused = true)]
async fn pvp_battle_starts_after_both_starters() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;

    let session = stored(&coordinator, battle).unwrap();
    assert_eq!(session.phase, TurnPhase::Submission);
    assert_eq!(session.turn, 1);

    let updates = drain(&mut rx);
    assert_eq!(updates[0].kind, UpdateKind::Created);
    assert_eq!(updates[0].events[0].key, EventKey::BattleCreated);
    assert!(updates[1..].iter().all(|u| u.kind == UpdateKind::Step));
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_resolve_exactly_one_turn() {
    let (coordinator, _rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;

    let (a, b) = tokio::join!(
        coordinator.submit(battle, ALICE, Action::attack("tackle")),
        coordinator.submit(battle, BOB, Action::attack("tackle")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(a.accepted() && b.accepted());
    assert_eq!(a.turns_resolved + b.turns_resolved, 1);
    let session = stored(&coordinator, battle).unwrap();
    assert_eq!(session.turn, 2);
    assert!(session.pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn denied_submission_is_published_to_the_submitter_only() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;
    drain(&mut rx);

    coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();
    let second = coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();

    assert!(!second.accepted());
    let updates = drain(&mut rx);
    let denial = updates.last().unwrap();
    assert_eq!(denial.events_for(ALICE).count(), 1);
    assert_eq!(denial.events_for(BOB).count(), 0);
    let view = denial.view_for(BOB).unwrap();
    assert!(view.pending.a);
}

#[tokio::test(start_paused = true)]
async fn undecodable_action_is_a_hard_error() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;
    drain(&mut rx);

    let err = coordinator
        .submit_action(battle, ALICE, "dance", &serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Decode(_)));
    let updates = drain(&mut rx);
    assert_eq!(updates.len(), 1);
    let event = &updates[0].events[0];
    assert_eq!(event.key, EventKey::ActionError);
    assert_eq!(event.target, Some(ALICE));
}

#[tokio::test(start_paused = true)]
async fn wire_actions_drive_the_battle() {
    let (coordinator, _rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;

    let outcome = coordinator
        .submit_action(battle, ALICE, "attack", &serde_json::json!({ "moveId": "tackle" }))
        .await
        .unwrap();

    assert!(outcome.accepted());
    assert!(stored(&coordinator, battle).unwrap().pending.has_submitted(Side::A));
}

#[tokio::test(start_paused = true)]
async fn failed_write_leaves_the_stored_session_untouched() {
    let store = Arc::new(FlakyStore {
        inner: InMemoryBattleStore::new(Duration::from_secs(3600), 64),
        failing: AtomicBool::new(false),
    });
    let (coordinator, _rx) = coordinator_with(store.clone(), tanks());
    let battle = started_pvp(&coordinator).await;

    store.failing.store(true, Ordering::SeqCst);
    let err = coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Store(StoreError::Unavailable(_))));
    assert!(!stored(&coordinator, battle).unwrap().pending.has_submitted(Side::A));
}

#[tokio::test(start_paused = true)]
async fn finished_battle_is_recorded_and_evicted() {
    let rosters = StaticRosterProvider::new()
        .with_roster(ALICE, tank())
        .with_roster(BOB, glass());
    let (coordinator, mut rx) = coordinator_with(memory_store(), rosters);
    let battle = started_pvp(&coordinator).await;

    for _ in 0..20 {
        if stored(&coordinator, battle).is_none() {
            break;
        }
        coordinator
            .submit(battle, ALICE, Action::attack("tackle"))
            .await
            .unwrap();
        coordinator
            .submit(battle, BOB, Action::attack("tackle"))
            .await
            .unwrap();
    }

    assert!(stored(&coordinator, battle).is_none());
    let record = coordinator.records().load(battle).unwrap().unwrap();
    assert_eq!(record.winner, Some(ALICE));

    let finished = drain(&mut rx)
        .into_iter()
        .find(|u| u.kind == UpdateKind::Finished)
        .unwrap();
    assert!(finished.events.iter().any(|e| e.key == EventKey::BattleFinished));
    assert!(coordinator.rooms().members(battle).await.is_empty());

    let err = coordinator
        .submit(battle, BOB, Action::attack("tackle"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn reconnect_within_grace_keeps_the_battle() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;

    coordinator.handle_disconnect(ConnectionId(1)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    let session = coordinator
        .handle_reconnect(battle, seat(ALICE, 3))
        .await
        .unwrap();
    assert_eq!(session.id, battle);

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(stored(&coordinator, battle).is_some());
    assert_eq!(coordinator.pending_timers(), 0);
    let kinds: Vec<_> = drain(&mut rx).into_iter().map(|u| u.kind).collect();
    assert!(kinds.contains(&UpdateKind::Disconnected));
    assert!(kinds.contains(&UpdateKind::Reconnected));
    assert!(!kinds.contains(&UpdateKind::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn grace_expiry_cancels_the_battle_once() {
    let store = CountingStore::new();
    let (coordinator, mut rx) = coordinator_with(store.clone(), tanks());
    let battle = started_pvp(&coordinator).await;
    drain(&mut rx);

    coordinator.handle_disconnect(ConnectionId(1)).await.unwrap();
    coordinator.handle_disconnect(ConnectionId(2)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(stored(&coordinator, battle).is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(stored(&coordinator, battle).is_none());
    assert_eq!(store.deletes.load(Ordering::SeqCst), 1);

    let cancelled: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|u| u.kind == UpdateKind::Cancelled)
        .collect();
    assert_eq!(cancelled.len(), 1);
    assert!(cancelled[0].session.is_none());
    assert_eq!(cancelled[0].events[0].key, EventKey::BattleCancelled);
    assert!(coordinator.records().load(battle).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn single_disconnect_expiry_cancels_for_that_player() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;
    drain(&mut rx);

    coordinator.handle_disconnect(ConnectionId(1)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(stored(&coordinator, battle).is_none());
    let cancelled: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|u| u.kind == UpdateKind::Cancelled)
        .collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(
        cancelled[0].events[0].payload.get("player"),
        Some(&PayloadValue::from(ALICE))
    );
    assert!(coordinator.rooms().members(battle).await.is_empty());
    assert_eq!(coordinator.pending_timers(), 0);

    // the opponent's connection no longer resolves to the battle
    coordinator.handle_disconnect(ConnectionId(2)).await.unwrap();
    assert!(drain(&mut rx).is_empty());
    let err = coordinator
        .submit(battle, BOB, Action::attack("tackle"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn grace_timer_firing_after_finish_is_silent() {
    let store = CountingStore::new();
    let rosters = StaticRosterProvider::new()
        .with_roster(ALICE, tank())
        .with_roster(BOB, glass());
    let (coordinator, mut rx) = coordinator_with(store.clone(), rosters);
    let battle = started_pvp(&coordinator).await;

    coordinator.handle_disconnect(ConnectionId(2)).await.unwrap();
    coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(29_900)).await;
    drain(&mut rx);

    // The finishing submission queues on the battle lock first; the grace
    // timer fires while it waits and queues behind it.
    let lock = store.session_lock(battle);
    let guard = lock.lock().await;
    let finisher = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.submit(battle, BOB, Action::attack("tackle")).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(coordinator.pending_timers(), 0);
    drop(guard);

    finisher.await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    let record = coordinator.records().load(battle).unwrap().unwrap();
    assert_eq!(record.winner, Some(ALICE));
    let kinds: Vec<_> = drain(&mut rx).into_iter().map(|u| u.kind).collect();
    assert_eq!(kinds, vec![UpdateKind::Finished]);
}

#[tokio::test(start_paused = true)]
async fn bot_turn_firing_after_cancellation_is_silent() {
    let store = CountingStore::new();
    let (coordinator, mut rx) = coordinator_with(store.clone(), tanks());
    let battle = coordinator
        .create_bot_battle(seat(ALICE, 1), "jessie")
        .await
        .unwrap()
        .id;
    coordinator
        .submit(battle, ALICE, Action::SelectStarter { unit_index: 0 })
        .await
        .unwrap();

    coordinator.handle_disconnect(ConnectionId(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(29_500)).await;
    coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut rx);

    // Grace expiry (30 s) and the bot turn (30.5 s) both fire while the
    // lock is held; expiry runs first and cancels the battle.
    let lock = store.session_lock(battle);
    let guard = lock.lock().await;
    let writes = store.sets.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1_400)).await;
    assert_eq!(coordinator.pending_timers(), 0);
    drop(guard);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(stored(&coordinator, battle).is_none());
    assert_eq!(store.sets.load(Ordering::SeqCst), writes);
    assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    let kinds: Vec<_> = drain(&mut rx).into_iter().map(|u| u.kind).collect();
    assert_eq!(kinds, vec![UpdateKind::Cancelled]);
}

#[tokio::test(start_paused = true)]
async fn blocked_side_forfeits_its_slot() {
    let rosters = StaticRosterProvider::new()
        .with_roster(ALICE, sleeper(vec![sleep_on(EffectTarget::Enemy, None)]))
        .with_roster(BOB, tank());
    let (coordinator, _rx) = coordinator_with(memory_store(), rosters);
    let battle = started_pvp(&coordinator).await;

    coordinator
        .submit(battle, ALICE, Action::attack("lullaby"))
        .await
        .unwrap();
    let first = coordinator
        .submit(battle, BOB, Action::attack("tackle"))
        .await
        .unwrap();
    assert_eq!(first.turns_resolved, 1);
    assert!(first.events.iter().any(|e| e.key == EventKey::StatusBlock));

    let denied = coordinator
        .submit(battle, BOB, Action::attack("tackle"))
        .await
        .unwrap();
    assert_eq!(denied.rejection.map(|r| r.key), Some(EventKey::StatusBlock));

    let outcome = coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();
    assert_eq!(outcome.turns_resolved, 1);
    assert_eq!(outcome.events[0].key, EventKey::TurnSkipped);
    assert_eq!(
        outcome.events[0].payload.get("player"),
        Some(&PayloadValue::from(BOB))
    );
    let session = stored(&coordinator, battle).unwrap();
    assert_eq!(session.turn, 3);
    assert_eq!(session.phase, TurnPhase::Submission);
}

#[tokio::test(start_paused = true)]
async fn idle_turn_limit_surfaces_and_keeps_the_stored_session() {
    let rosters = StaticRosterProvider::new()
        .with_roster(
            ALICE,
            sleeper(vec![
                sleep_on(EffectTarget::Enemy, Some(40)),
                sleep_on(EffectTarget::SelfUnit, Some(40)),
            ]),
        )
        .with_roster(BOB, tank());
    let (coordinator, mut rx) = coordinator_with(memory_store(), rosters);
    let battle = started_pvp(&coordinator).await;

    coordinator
        .submit(battle, BOB, Action::attack("tackle"))
        .await
        .unwrap();
    drain(&mut rx);
    let err = coordinator
        .submit(battle, ALICE, Action::attack("lullaby"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Engine(EngineError::IdleTurnLimit { .. })
    ));
    let session = stored(&coordinator, battle).unwrap();
    assert_eq!(session.phase, TurnPhase::Submission);
    assert_eq!(session.turn, 1);
    assert!(session.pending.has_submitted(Side::B));
    assert!(!session.pending.has_submitted(Side::A));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn leaving_alone_does_not_cancel() {
    let (coordinator, _rx) = coordinator_with(memory_store(), tanks());
    let battle = started_pvp(&coordinator).await;

    assert!(coordinator.leave(battle, BOB).await);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(stored(&coordinator, battle).is_some());
}

#[tokio::test(start_paused = true)]
async fn bot_answers_after_its_delay() {
    let (coordinator, mut rx) = coordinator_with(memory_store(), tanks());
    let session = coordinator
        .create_bot_battle(seat(ALICE, 1), "jessie")
        .await
        .unwrap();
    let battle = session.id;
    assert!(session.is_bot_battle);
    assert!(session.combatant_b.0 < 0);
    assert!(session.side_b.has_selected_starter);

    coordinator
        .submit(battle, ALICE, Action::SelectStarter { unit_index: 0 })
        .await
        .unwrap();
    coordinator
        .submit(battle, ALICE, Action::attack("tackle"))
        .await
        .unwrap();
    assert_eq!(stored(&coordinator, battle).unwrap().turn, 1);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(stored(&coordinator, battle).unwrap().turn, 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(stored(&coordinator, battle).unwrap().turn, 2);

    let updates = drain(&mut rx);
    assert_eq!(updates[0].kind, UpdateKind::Created);
    assert!(updates[0].events.iter().any(|e| e.key == EventKey::StarterSelected));
    assert!(updates.iter().any(|u| u.events.iter().any(|e| e.key == EventKey::TurnEnd)));
}

#[tokio::test]
async fn unknown_bot_profile_is_rejected() {
    let (coordinator, _rx) = coordinator_with(memory_store(), tanks());
    let err = coordinator
        .create_bot_battle(seat(ALICE, 1), "meowth")
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownBot(_)));
}

#[tokio::test]
async fn builder_requires_oracles_and_rosters() {
    let err = BattleCoordinator::builder()
        .rosters(tanks())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::MissingComponent("oracles")));
}
