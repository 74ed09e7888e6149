//! Battle lifecycle orchestration.
//!
//! [`BattleCoordinator`] owns everything around the rules engine: creating
//! sessions, running submissions under the per-battle lock, finalizing
//! finished battles, driving bot turns and handling disconnects.
//!
//! Every read-modify-write of a session happens while holding the store's
//! [`BattleStateStore::session_lock`]. Updates are published only after the
//! lock is released, and timers are (re)scheduled after the write that made
//! them due.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use battle_content::BotProfile;
use battle_core::{
    Action, BattleEvent, BattleId, BattleSession, BattleStatus, BattleView, CombatantId,
    EventKey, EventNotifier, Notification, PcgRng, Side, StepOutcome, TurnPhase,
    TurnPhaseManager, can_submit, strategy_for,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, trace, warn};

use crate::api::{BattleUpdate, Result, Roster, RosterProvider, RuntimeError, UpdateKind};
use crate::config::RuntimeConfig;
use crate::oracle::OracleManager;
use crate::repository::{
    BattleRecord, BattleRecordRepository, BattleStateStore, InMemoryBattleStore,
    InMemoryRecordRepository,
};
use crate::rooms::{ConnectionId, RoomRegistry, Seat};
use crate::scheduler::{TaskScheduler, TimerKey};

type TimerTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Who is submitting in a step.
enum Submitter {
    Human(CombatantId, Action),
    /// The bot of a bot battle; its action is chosen under the lock.
    Bot,
}

/// Cloneable handle to the battle runtime.
#[derive(Clone)]
pub struct BattleCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    config: RuntimeConfig,
    store: Arc<dyn BattleStateStore>,
    records: Arc<dyn BattleRecordRepository>,
    rosters: Arc<dyn RosterProvider>,
    oracles: OracleManager,
    rooms: RoomRegistry,
    timers: TaskScheduler<TimerKey>,
    updates: mpsc::Sender<BattleUpdate>,
    rng: Mutex<StdRng>,
    next_battle: AtomicU64,
    next_bot: AtomicI64,
}

impl BattleCoordinator {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.inner.oracles
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.inner.rooms
    }

    pub fn records(&self) -> &dyn BattleRecordRepository {
        self.inner.records.as_ref()
    }

    /// Number of pending timers (grace periods and bot turns).
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.pending()
    }

    /// Starts a battle between two human combatants.
    pub async fn create_pvp(&self, a: Seat, b: Seat) -> Result<BattleSession> {
        if a.combatant == b.combatant {
            return Err(RuntimeError::DuplicateCombatant(a.combatant));
        }
        let side_a = self.inner.rosters.roster(a.combatant).await?.into_side();
        let side_b = self.inner.rosters.roster(b.combatant).await?.into_side();

        let id = self.next_battle_id();
        let session = BattleSession::new(id, a.combatant, side_a, b.combatant, side_b, now_ms());
        let created = self.localize(
            &session,
            Notification::broadcast(EventKey::BattleCreated).with("battle", id),
        );

        self.inner
            .store
            .set(id, &session, Some(self.inner.config.session_ttl))?;
        self.inner.rooms.join(id, a).await;
        self.inner.rooms.join(id, b).await;

        info!(
            target: "runtime::coordinator",
            battle = %id,
            a = %a.combatant,
            b = %b.combatant,
            "pvp battle created"
        );
        self.publish(BattleUpdate {
            battle: id,
            kind: UpdateKind::Created,
            session: Some(session.clone()),
            events: vec![created],
        });
        Ok(session)
    }

    /// Starts a battle between `human` and the bot described by `profile_id`.
    ///
    /// The bot always sits on side B and picks its starter immediately.
    pub async fn create_bot_battle(&self, human: Seat, profile_id: &str) -> Result<BattleSession> {
        let profile = self
            .inner
            .oracles
            .bot_profile(profile_id)
            .ok_or_else(|| RuntimeError::UnknownBot(profile_id.to_owned()))?;
        let strategy = strategy_for(&profile.strategy)
            .ok_or_else(|| RuntimeError::UnknownStrategy(profile.strategy.clone()))?;
        let side_b = self.bot_roster(profile)?.into_side();
        let side_a = self.inner.rosters.roster(human.combatant).await?.into_side();

        let id = self.next_battle_id();
        let bot = self.next_bot_id();
        let mut session = BattleSession::new(id, human.combatant, side_a, bot, side_b, now_ms())
            .with_bot(strategy.id());
        let mut events = vec![self.localize(
            &session,
            Notification::broadcast(EventKey::BattleCreated).with("battle", id),
        )];

        let mut rng = self.step_rng();
        let items = self.inner.oracles.items();
        if let Some(starter) = strategy.choose_starter(&session, Side::B, items, &mut rng) {
            let outcome = TurnPhaseManager::new(&mut session).submit(
                self.inner.oracles.env(),
                &mut rng,
                bot,
                starter,
            )?;
            events.extend(outcome.events);
        }

        self.inner
            .store
            .set(id, &session, Some(self.inner.config.session_ttl))?;
        self.inner.rooms.join(id, human).await;

        info!(
            target: "runtime::coordinator",
            battle = %id,
            human = %human.combatant,
            %bot,
            profile = profile_id,
            strategy = strategy.id(),
            "bot battle created"
        );
        self.publish(BattleUpdate {
            battle: id,
            kind: UpdateKind::Created,
            session: Some(session.clone()),
            events,
        });
        Ok(session)
    }

    /// Decodes a wire action and submits it.
    ///
    /// An unknown kind or malformed payload is a hard error; the submitter
    /// also receives an `ACTION_ERROR` event if the battle exists.
    pub async fn submit_action(
        &self,
        battle: BattleId,
        combatant: CombatantId,
        kind: &str,
        payload: &serde_json::Value,
    ) -> Result<StepOutcome> {
        match Action::decode(kind, payload) {
            Ok(action) => self.submit(battle, combatant, action).await,
            Err(error) => {
                self.report_action_error(battle, combatant, &error.to_string());
                Err(error.into())
            }
        }
    }

    /// Runs one submission through the turn engine.
    ///
    /// Denied submissions publish their denial but leave the stored session
    /// untouched. A submission that ends the battle writes the battle record
    /// and removes the live session.
    pub async fn submit(
        &self,
        battle: BattleId,
        combatant: CombatantId,
        action: Action,
    ) -> Result<StepOutcome> {
        self.step(battle, Submitter::Human(combatant, action))
            .await?
            .ok_or(RuntimeError::NotFound(battle))
    }

    /// Marks the combatant behind `connection` as disconnected and starts
    /// the grace period. Unknown connections are ignored.
    pub async fn handle_disconnect(&self, connection: ConnectionId) -> Result<()> {
        let Some((battle, combatant)) = self.inner.rooms.disconnect(connection).await else {
            trace!(target: "runtime::coordinator", %connection, "disconnect of unseated connection");
            return Ok(());
        };
        let Some(session) = self.inner.store.get(battle)? else {
            return Ok(());
        };

        let event = self.localize(
            &session,
            Notification::broadcast(EventKey::PlayerDisconnected).with("player", combatant),
        );
        let task = self.grace_expiry_task(battle, combatant);
        self.inner.timers.schedule(
            TimerKey::Disconnect(battle, combatant),
            self.inner.config.grace_period,
            task,
        );

        info!(
            target: "runtime::coordinator",
            battle = %battle,
            %combatant,
            grace_secs = self.inner.config.grace_period.as_secs(),
            "player disconnected"
        );
        self.publish(BattleUpdate {
            battle,
            kind: UpdateKind::Disconnected,
            session: Some(session),
            events: vec![event],
        });
        Ok(())
    }

    /// Seats `seat` again and stops its grace period.
    ///
    /// Returns the current session so the client can resynchronize.
    pub async fn handle_reconnect(&self, battle: BattleId, seat: Seat) -> Result<BattleSession> {
        let lock = self.inner.store.session_lock(battle);
        let session = {
            let _guard = lock.lock().await;
            let session = self
                .inner
                .store
                .get(battle)?
                .ok_or(RuntimeError::NotFound(battle))?;
            if session.side_of(seat.combatant).is_none() {
                return Err(RuntimeError::NotSeated {
                    battle,
                    combatant: seat.combatant,
                });
            }
            if !self.inner.rooms.reconnect(battle, seat).await {
                self.inner.rooms.join(battle, seat).await;
            }
            self.inner
                .timers
                .cancel(&TimerKey::Disconnect(battle, seat.combatant));
            session
        };

        let event = self.localize(
            &session,
            Notification::broadcast(EventKey::PlayerReconnected).with("player", seat.combatant),
        );
        info!(
            target: "runtime::coordinator",
            battle = %battle,
            combatant = %seat.combatant,
            "player reconnected"
        );
        self.publish(BattleUpdate {
            battle,
            kind: UpdateKind::Reconnected,
            session: Some(session.clone()),
            events: vec![event],
        });
        Ok(session)
    }

    /// Removes `combatant` from the battle's room. The battle keeps running.
    pub async fn leave(&self, battle: BattleId, combatant: CombatantId) -> bool {
        self.inner.rooms.leave(battle, combatant).await
    }

    pub fn session(&self, battle: BattleId) -> Result<Option<BattleSession>> {
        Ok(self.inner.store.get(battle)?)
    }

    /// Current state of `battle` as seen by `viewer`.
    pub fn view(&self, battle: BattleId, viewer: CombatantId) -> Result<BattleView> {
        let session = self
            .inner
            .store
            .get(battle)?
            .ok_or(RuntimeError::NotFound(battle))?;
        Ok(BattleView::for_viewer(&session, &session.event_log, viewer))
    }

    /// Evicts expired sessions from the store.
    pub fn purge_expired(&self) -> Result<usize> {
        let purged = self.inner.store.purge_expired()?;
        if purged > 0 {
            debug!(target: "runtime::coordinator", purged, "expired sessions purged");
        }
        Ok(purged)
    }

    async fn step(&self, battle: BattleId, submitter: Submitter) -> Result<Option<StepOutcome>> {
        let lock = self.inner.store.session_lock(battle);
        let (session, outcome) = {
            let _guard = lock.lock().await;
            let Some(mut session) = self.inner.store.get(battle)? else {
                return match submitter {
                    Submitter::Human(..) => Err(RuntimeError::NotFound(battle)),
                    Submitter::Bot => Ok(None),
                };
            };

            let mut rng = self.step_rng();
            let (combatant, action) = match submitter {
                Submitter::Human(combatant, action) => (combatant, action),
                Submitter::Bot => match self.bot_action(&session, &mut rng)? {
                    Some(choice) => choice,
                    None => return Ok(None),
                },
            };

            let outcome = TurnPhaseManager::new(&mut session).submit(
                self.inner.oracles.env(),
                &mut rng,
                combatant,
                action,
            )?;

            if session.is_finished() {
                let record = BattleRecord::from_session(&session, Utc::now());
                self.inner.records.save(&record)?;
                self.inner.store.delete(battle)?;
            } else if outcome.accepted() {
                self.inner
                    .store
                    .set(battle, &session, Some(self.inner.config.session_ttl))?;
            }
            (session, outcome)
        };

        if session.is_finished() {
            self.inner.timers.cancel_battle(battle);
            self.inner.rooms.release(battle).await;
            info!(
                target: "runtime::coordinator",
                battle = %battle,
                winner = ?session.winner,
                turns = session.turn,
                "battle finished"
            );
            self.publish(BattleUpdate {
                battle,
                kind: UpdateKind::Finished,
                session: Some(session),
                events: outcome.events.clone(),
            });
        } else {
            let bot_due = bot_turn_due(&session);
            self.publish(BattleUpdate {
                battle,
                kind: UpdateKind::Step,
                session: Some(session),
                events: outcome.events.clone(),
            });
            if bot_due {
                self.schedule_bot_turn(battle);
            }
        }
        Ok(Some(outcome))
    }

    fn bot_action(
        &self,
        session: &BattleSession,
        rng: &mut PcgRng,
    ) -> Result<Option<(CombatantId, Action)>> {
        if !bot_turn_due(session) {
            return Ok(None);
        }
        let id = session.bot_strategy.as_deref().unwrap_or_default();
        let strategy =
            strategy_for(id).ok_or_else(|| RuntimeError::UnknownStrategy(id.to_owned()))?;
        let action = strategy.choose_action(session, Side::B, self.inner.oracles.items(), rng);
        Ok(action.map(|action| (session.combatant_b, action)))
    }

    fn schedule_bot_turn(&self, battle: BattleId) {
        trace!(target: "runtime::coordinator", battle = %battle, "bot turn scheduled");
        let task = self.bot_turn_task(battle);
        self.inner
            .timers
            .schedule(TimerKey::BotTurn(battle), self.inner.config.bot_delay, task);
    }

    // Boxed outside of `step` so the recursive future type stays nameable.
    fn bot_turn_task(&self, battle: BattleId) -> TimerTask {
        let coordinator = self.clone();
        Box::pin(async move {
            if let Err(error) = coordinator.step(battle, Submitter::Bot).await {
                warn!(
                    target: "runtime::coordinator",
                    battle = %battle,
                    %error,
                    "bot turn failed"
                );
            }
        })
    }

    fn grace_expiry_task(&self, battle: BattleId, combatant: CombatantId) -> TimerTask {
        let coordinator = self.clone();
        Box::pin(async move {
            if let Err(error) = coordinator.expire_grace(battle, combatant).await {
                warn!(
                    target: "runtime::coordinator",
                    battle = %battle,
                    %combatant,
                    %error,
                    "failed to cancel abandoned battle"
                );
            }
        })
    }

    /// Cancels `battle` if `combatant` is still away once the grace period
    /// ran out. Idempotent: a second expiry finds nothing to delete.
    async fn expire_grace(&self, battle: BattleId, combatant: CombatantId) -> Result<()> {
        let lock = self.inner.store.session_lock(battle);
        let session = {
            let _guard = lock.lock().await;
            if self.inner.rooms.is_connected(battle, combatant).await {
                return Ok(());
            }
            let Some(session) = self.inner.store.get(battle)? else {
                return Ok(());
            };
            if !self.inner.store.delete(battle)? {
                return Ok(());
            }
            session
        };

        self.inner.timers.cancel_battle(battle);
        self.inner.rooms.release(battle).await;

        let event = self.localize(
            &session,
            Notification::broadcast(EventKey::BattleCancelled).with("player", combatant),
        );
        warn!(
            target: "runtime::coordinator",
            battle = %battle,
            %combatant,
            "grace period expired, battle cancelled"
        );
        self.publish(BattleUpdate {
            battle,
            kind: UpdateKind::Cancelled,
            session: None,
            events: vec![event],
        });
        Ok(())
    }

    fn report_action_error(&self, battle: BattleId, combatant: CombatantId, reason: &str) {
        let session = match self.inner.store.get(battle) {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(error) => {
                warn!(target: "runtime::coordinator", battle = %battle, %error, "store read failed");
                return;
            }
        };
        debug!(
            target: "runtime::coordinator",
            battle = %battle,
            %combatant,
            reason,
            "undecodable action"
        );
        let event = self.localize(
            &session,
            Notification::to(EventKey::ActionError, combatant).with("reason", reason),
        );
        self.publish(BattleUpdate {
            battle,
            kind: UpdateKind::Step,
            session: Some(session),
            events: vec![event],
        });
    }

    fn bot_roster(&self, profile: &BotProfile) -> Result<Roster> {
        let units = profile
            .party
            .iter()
            .map(|member| {
                self.inner
                    .oracles
                    .species(member.species)
                    .map(|species| species.unit_at_level(member.level))
                    .ok_or_else(|| RuntimeError::UnknownSpecies {
                        profile: profile.id.clone(),
                        species: member.species,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Roster::new(units, profile.inventory.clone()))
    }

    fn localize(&self, session: &BattleSession, notification: Notification) -> BattleEvent {
        EventNotifier::new(self.inner.oracles.env().translator()).localize(notification, session.turn)
    }

    fn publish(&self, update: BattleUpdate) {
        match self.inner.updates.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(update)) => warn!(
                target: "runtime::coordinator",
                battle = %update.battle,
                kind = ?update.kind,
                "update channel full, dropping update"
            ),
            Err(TrySendError::Closed(_)) => {
                trace!(target: "runtime::coordinator", "no update subscriber")
            }
        }
    }

    fn step_rng(&self) -> PcgRng {
        let seed = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64();
        PcgRng::new(seed)
    }

    fn next_battle_id(&self) -> BattleId {
        BattleId(self.inner.next_battle.fetch_add(1, Ordering::Relaxed))
    }

    fn next_bot_id(&self) -> CombatantId {
        CombatantId(self.inner.next_bot.fetch_sub(1, Ordering::Relaxed))
    }
}

/// True when the bot of a bot battle should act now: its side has not
/// submitted yet and the human has either submitted or cannot act.
fn bot_turn_due(session: &BattleSession) -> bool {
    session.is_bot_battle
        && session.status == BattleStatus::Active
        && session.phase == TurnPhase::Submission
        && !session.pending.has_submitted(Side::B)
        && can_submit(session, Side::B)
        && (session.pending.has_submitted(Side::A) || !can_submit(session, Side::A))
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Builder for [`BattleCoordinator`].
///
/// Oracles and a roster provider are required. The state store and record
/// repository default to in-memory implementations.
pub struct CoordinatorBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn BattleStateStore>>,
    records: Option<Arc<dyn BattleRecordRepository>>,
    rosters: Option<Arc<dyn RosterProvider>>,
    oracles: Option<OracleManager>,
}

impl CoordinatorBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            records: None,
            rosters: None,
            oracles: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn BattleStateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn records(mut self, records: Arc<dyn BattleRecordRepository>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn rosters(mut self, rosters: impl RosterProvider + 'static) -> Self {
        self.rosters = Some(Arc::new(rosters));
        self
    }

    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Builds the coordinator and the receiving end of its update stream.
    pub fn build(self) -> Result<(BattleCoordinator, mpsc::Receiver<BattleUpdate>)> {
        let oracles = self
            .oracles
            .ok_or(RuntimeError::MissingComponent("oracles"))?;
        let rosters = self
            .rosters
            .ok_or(RuntimeError::MissingComponent("roster provider"))?;
        let config = self.config;

        let store = self.store.unwrap_or_else(|| {
            Arc::new(InMemoryBattleStore::new(
                config.session_ttl,
                config.index_capacity,
            ))
        });
        let records = self
            .records
            .unwrap_or_else(|| Arc::new(InMemoryRecordRepository::new()));
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (updates, receiver) = mpsc::channel(config.update_buffer.max(1));

        let coordinator = BattleCoordinator {
            inner: Arc::new(Inner {
                config,
                store,
                records,
                rosters,
                oracles,
                rooms: RoomRegistry::new(),
                timers: TaskScheduler::new(),
                updates,
                rng: Mutex::new(rng),
                next_battle: AtomicU64::new(1),
                next_bot: AtomicI64::new(-1),
            }),
        };
        Ok((coordinator, receiver))
    }
}
