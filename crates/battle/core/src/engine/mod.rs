//! Turn phase state machine.
//!
//! [`TurnPhaseManager`] is the authoritative reducer for a [`BattleSession`].
//! One call to [`TurnPhaseManager::submit`] is one externally visible step:
//! the event log is reset, the action is validated, and the session is
//! advanced through as many phases as the submission unlocks.
mod errors;
mod order;

pub use errors::EngineError;
pub use order::{QueuedAction, resolution_order};

use tracing::{debug, trace};

use crate::action::{self, Action};
use crate::effects::process_turn_end;
use crate::env::{BattleEnv, RngOracle};
use crate::event::{BattleEvent, EventKey, EventNotifier, Notification};
use crate::state::{BattleSession, BattleStatus, CombatantId, Side, TurnPhase};
use crate::validate::{ActionValidator, Rejection, can_submit};

/// Result of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Present when the submission was denied. The session is unchanged
    /// apart from the denial event.
    pub rejection: Option<Rejection>,
    /// Number of turns resolved during this step.
    pub turns_resolved: u32,
    /// Events produced by this step, in order.
    pub events: Vec<BattleEvent>,
}

impl StepOutcome {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

pub struct TurnPhaseManager<'a> {
    session: &'a mut BattleSession,
}

impl<'a> TurnPhaseManager<'a> {
    pub fn new(session: &'a mut BattleSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &BattleSession {
        self.session
    }

    /// Submits `action` for `combatant` and advances the session as far as
    /// it can go.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::BattleFinished`] for a finished session and
    /// [`EngineError::UnknownCombatant`] for an id that is not seated. Other
    /// errors indicate a broken invariant.
    pub fn submit(
        &mut self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        combatant: CombatantId,
        action: Action,
    ) -> Result<StepOutcome, EngineError> {
        if self.session.is_finished() {
            return Err(EngineError::BattleFinished {
                battle: self.session.id,
            });
        }
        let side = self
            .session
            .side_of(combatant)
            .ok_or(EngineError::UnknownCombatant {
                battle: self.session.id,
                combatant,
            })?;

        self.session.event_log.clear();
        let notifier = EventNotifier::new(env.translator());

        if let Err(rejection) = ActionValidator::new(env.items()).validate(self.session, side, &action) {
            debug!(
                target: "battle::engine",
                battle = %self.session.id,
                %combatant,
                reason = %rejection.key,
                "submission denied"
            );
            let note = rejection.clone().into_notification(self.session, side);
            notifier.notify(self.session, [note]);
            return Ok(self.outcome(Some(rejection), 0));
        }

        let turns = if self.session.phase == TurnPhase::Selection {
            self.select_starter(&env, rng, side, &action)?
        } else {
            trace!(
                target: "battle::engine",
                battle = %self.session.id,
                %combatant,
                kind = %action.kind(),
                "action queued"
            );
            self.session.pending.set(side, action);
            self.settle(&env, rng)?
        };

        Ok(self.outcome(None, turns))
    }

    fn outcome(&self, rejection: Option<Rejection>, turns_resolved: u32) -> StepOutcome {
        StepOutcome {
            rejection,
            turns_resolved,
            events: self.session.event_log.clone(),
        }
    }

    fn transition(&mut self, next: TurnPhase) -> Result<(), EngineError> {
        let from = self.session.phase;
        if !from.can_transition_to(next) {
            return Err(EngineError::InvalidTransition { from, to: next });
        }
        self.session.phase = next;
        Ok(())
    }

    fn select_starter(
        &mut self,
        env: &BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        side: Side,
        action: &Action,
    ) -> Result<u32, EngineError> {
        let outcome = action::execute(self.session, env, rng, side, action);
        let notifier = EventNotifier::new(env.translator());
        notifier.notify(self.session, outcome.notifications);

        let both_selected = Side::BOTH
            .into_iter()
            .all(|side| self.session.side(side).has_selected_starter);
        if !both_selected {
            return Ok(0);
        }

        self.transition(TurnPhase::Submission)?;
        let started = Notification::broadcast(EventKey::BattleStarted).with("turn", self.session.turn);
        notifier.notify(self.session, [started]);
        debug!(target: "battle::engine", battle = %self.session.id, "battle started");

        self.settle(env, rng)
    }

    /// Resolves turns while every combatant able to submit has done so.
    ///
    /// A combatant whose active unit is held by a blocking effect cannot
    /// submit; its slot is forfeited for the turn. When neither side can
    /// submit, turns resolve idle until an effect wears off.
    fn settle(&mut self, env: &BattleEnv<'_>, rng: &mut dyn RngOracle) -> Result<u32, EngineError> {
        let mut resolved = 0;
        let mut idle = 0;

        while self.session.phase == TurnPhase::Submission {
            let waiting = Side::BOTH.into_iter().any(|side| {
                !self.session.pending.has_submitted(side) && can_submit(self.session, side)
            });
            if waiting {
                break;
            }

            if self.session.pending.is_empty() {
                idle += 1;
                if idle > env.config().max_idle_turns {
                    return Err(EngineError::IdleTurnLimit {
                        battle: self.session.id,
                        turns: idle - 1,
                    });
                }
            }

            self.resolve_turn(env, rng)?;
            resolved += 1;
        }

        Ok(resolved)
    }

    fn resolve_turn(&mut self, env: &BattleEnv<'_>, rng: &mut dyn RngOracle) -> Result<(), EngineError> {
        let notifier = EventNotifier::new(env.translator());

        let skipped: Vec<Notification> = Side::BOTH
            .into_iter()
            .filter(|&side| !self.session.pending.has_submitted(side))
            .map(|side| {
                Notification::broadcast(EventKey::TurnSkipped).with("player", self.session.combatant(side))
            })
            .collect();
        notifier.notify(self.session, skipped);

        self.transition(TurnPhase::Resolution)?;

        let queue = resolution_order(self.session, rng);
        let initiative = queue.first().map(|entry| entry.side);

        for entry in &queue {
            if self.session.is_decided() {
                trace!(target: "battle::engine", battle = %self.session.id, "battle decided mid-queue");
                break;
            }

            let Some(unit) = self.session.side(entry.side).active() else {
                continue;
            };
            if unit.is_fainted && !entry.action.is_switch() {
                trace!(
                    target: "battle::engine",
                    battle = %self.session.id,
                    side = ?entry.side,
                    "skipping action of fainted unit"
                );
                continue;
            }
            if let Some(effect) = unit.blocking_effect().filter(|_| !unit.is_fainted) {
                let blocked = Notification::to(EventKey::StatusBlock, self.session.combatant(entry.side))
                    .with("unit", unit.display_name.as_str())
                    .with("effect", effect.name());
                notifier.notify(self.session, [blocked]);
                continue;
            }

            let outcome = action::execute(self.session, env, rng, entry.side, &entry.action);
            trace!(
                target: "battle::engine",
                battle = %self.session.id,
                kind = %entry.action.kind(),
                advanced = outcome.advance_turn,
                "action executed"
            );
            notifier.notify(self.session, outcome.notifications);
        }

        self.transition(TurnPhase::EndOfTurn)?;
        self.end_of_turn(&notifier, initiative)
    }

    fn end_of_turn(
        &mut self,
        notifier: &EventNotifier<'_>,
        initiative: Option<Side>,
    ) -> Result<(), EngineError> {
        if !self.session.is_decided() {
            let mut notes = Vec::new();
            for side in Side::BOTH {
                for unit in self.session.side_mut(side).units.iter_mut() {
                    process_turn_end(unit, &mut notes);
                    if unit.mark_fainted_if_down() {
                        notes.push(
                            Notification::broadcast(EventKey::UnitFainted)
                                .with("unit", unit.display_name.as_str()),
                        );
                    }
                }
            }
            notifier.notify(self.session, notes);
        }

        let winner = match (self.session.side_a.is_wiped(), self.session.side_b.is_wiped()) {
            (false, false) => None,
            (true, false) => Some(Side::B),
            (false, true) => Some(Side::A),
            // mutual knockout: initiative holder wins
            (true, true) => Some(initiative.unwrap_or(Side::A)),
        };

        let Some(winner) = winner else {
            let ended = Notification::broadcast(EventKey::TurnEnd).with("turn", self.session.turn);
            notifier.notify(self.session, [ended]);

            self.session.pending.clear();
            for side in Side::BOTH {
                self.session.side_mut(side).has_used_item_this_turn = false;
            }
            self.session.turn += 1;
            return self.transition(TurnPhase::Submission);
        };

        let winner_id = self.session.combatant(winner);
        self.session.status = BattleStatus::Finished;
        self.session.winner = Some(winner_id);
        self.transition(TurnPhase::Finished)?;

        let finished = Notification::broadcast(EventKey::BattleFinished).with("winner", winner_id);
        notifier.notify(self.session, [finished]);
        debug!(
            target: "battle::engine",
            battle = %self.session.id,
            winner = %winner_id,
            turn = self.session.turn,
            "battle finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support::*;
    use crate::effects::{EffectType, apply_effect};
    use crate::env::SequenceRng;
    use crate::error::{BattleError, ErrorSeverity};
    use crate::state::{BattleId, BattleSession, EffectTarget};

    struct Fixture {
        items: TestItems,
        locale: crate::event::LocaleTable,
        config: crate::config::BattleConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                items: TestItems,
                locale: locale(),
                config: config(),
            }
        }

        fn env(&self) -> BattleEnv<'_> {
            BattleEnv::new(&self.items, &self.locale, &self.config)
        }
    }

    fn keys(outcome: &StepOutcome) -> Vec<EventKey> {
        outcome.events.iter().map(|event| event.key).collect()
    }

    fn fresh_session() -> BattleSession {
        let side_a = party(vec![unit(1, "Espresso", 100, 30, vec![tackle()])]);
        let side_b = party(vec![unit(2, "Latte", 100, 10, vec![tackle()])]);
        BattleSession::new(BattleId(1), A, side_a, B, side_b, 0)
    }

    #[test]
    fn selection_moves_to_submission_with_empty_pending() {
        let fx = Fixture::new();
        let mut session = fresh_session();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        let outcome = manager
            .submit(fx.env(), &mut rng, A, Action::SelectStarter { unit_index: 0 })
            .unwrap();
        assert!(outcome.accepted());
        assert_eq!(manager.session().phase, TurnPhase::Selection);

        let outcome = manager
            .submit(fx.env(), &mut rng, B, Action::SelectStarter { unit_index: 0 })
            .unwrap();
        assert_eq!(keys(&outcome), vec![EventKey::StarterSelected, EventKey::BattleStarted]);
        assert_eq!(session.phase, TurnPhase::Submission);
        assert_eq!(session.turn, 1);
        assert!(session.pending.is_empty());
    }

    #[test]
    fn first_submission_waits_for_the_other_side() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        assert!(outcome.accepted());
        assert_eq!(outcome.turns_resolved, 0);
        assert!(outcome.events.is_empty());
        assert_eq!(session.pending.len(), 1);
        assert_eq!(session.phase, TurnPhase::Submission);
    }

    #[test]
    fn double_submission_is_denied_to_the_submitter_only() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, A, Action::switch(1)).unwrap();

        let rejection = outcome.rejection.as_ref().unwrap();
        assert_eq!(rejection.key, EventKey::AlreadySubmitted);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].target, Some(A));
        assert_eq!(session.pending.get(Side::A), Some(&Action::attack("tackle")));
    }

    #[test]
    fn full_turn_resolves_and_opens_next_window() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        assert_eq!(outcome.turns_resolved, 1);
        // A is faster and hits first
        assert_eq!(
            keys(&outcome),
            vec![EventKey::AttackHit, EventKey::AttackHit, EventKey::TurnEnd]
        );
        assert_eq!(outcome.events[0].payload.get("attacker"), Some(&"Espresso".into()));
        assert_eq!(session.turn, 2);
        assert_eq!(session.phase, TurnPhase::Submission);
        assert!(session.pending.is_empty());
        assert_eq!(session.side_a.units[0].current_hp, 80);
        assert_eq!(session.side_b.units[0].current_hp, 80);
    }

    #[test]
    fn knockout_skips_the_rest_of_the_queue_and_finishes() {
        let fx = Fixture::new();
        let mut session = active_session();
        for unit in session.side_b.units.iter_mut() {
            unit.current_hp = 5;
        }
        session.side_b.units[1].current_hp = 0;
        session.side_b.units[1].mark_fainted_if_down();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        assert_eq!(
            keys(&outcome),
            vec![EventKey::AttackHit, EventKey::UnitFainted, EventKey::BattleFinished]
        );
        assert_eq!(session.status, BattleStatus::Finished);
        assert_eq!(session.phase, TurnPhase::Finished);
        assert_eq!(session.winner, Some(A));
        assert_eq!(session.side_a.units[0].current_hp, 100);
        assert_eq!(session.pending.len(), 2);
    }

    #[test]
    fn deciding_turn_skips_status_ticks() {
        let fx = Fixture::new();
        let mut session = active_session();
        session.side_b.units[0].current_hp = 5;
        session.side_b.units[1].current_hp = 0;
        session.side_b.units[1].mark_fainted_if_down();
        // poison would finish the winner at turn end
        session.side_a.units[0].current_hp = 5;
        let mut notes = Vec::new();
        apply_effect(&mut session.side_a.units[0], EffectType::Poison, None, None, Side::B, &mut notes);
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        assert!(!keys(&outcome).contains(&EventKey::StatusDamage));
        assert_eq!(session.winner, Some(A));
        assert_eq!(session.side_a.units[0].current_hp, 5);
        assert!(!session.side_a.units[0].is_fainted);
    }

    #[test]
    fn mutual_knockout_goes_to_initiative_holder() {
        let fx = Fixture::new();
        let mut session = fresh_session();
        session.phase = TurnPhase::Submission;
        for side in Side::BOTH {
            let state = session.side_mut(side);
            state.active_index = Some(0);
            state.has_selected_starter = true;
            state.units[0].current_hp = 5;
        }
        let mut notes = Vec::new();
        apply_effect(&mut session.side_a.units[0], EffectType::Poison, None, None, Side::B, &mut notes);
        apply_effect(&mut session.side_b.units[0], EffectType::Poison, None, None, Side::A, &mut notes);
        // both attacks miss, poison finishes both units
        session.side_a.units[0].modifiers.hit_chance = 0.0;
        session.side_b.units[0].modifiers.hit_chance = 0.0;
        session.side_b.units[0].speed = 99;

        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);
        manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();

        assert!(keys(&outcome).ends_with(&[EventKey::BattleFinished]));
        assert!(session.side_a.is_wiped() && session.side_b.is_wiped());
        // B was faster and held initiative
        assert_eq!(session.winner, Some(B));
    }

    #[test]
    fn blocked_combatant_forfeits_and_turn_resolves_on_single_submission() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut notes = Vec::new();
        apply_effect(&mut session.side_b.units[0], EffectType::Sleep, Some(2), None, Side::A, &mut notes);
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        let denied = manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();
        assert_eq!(denied.rejection.map(|r| r.key), Some(EventKey::StatusBlock));

        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();
        assert_eq!(outcome.turns_resolved, 1);
        assert_eq!(keys(&outcome)[0], EventKey::TurnSkipped);
        assert_eq!(session.turn, 2);
        // still asleep for one more turn
        assert!(session.side_b.units[0].is_blocked());
    }

    #[test]
    fn both_blocked_resolves_idle_turns_until_someone_wakes() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut notes = Vec::new();
        apply_effect(&mut session.side_b.units[0], EffectType::Freeze, Some(3), None, Side::A, &mut notes);
        // A's tackle also puts A to sleep for the default two turns
        session.side_a.units[0].moves[0]
            .effects
            .push(effect(EffectType::Sleep, 1.0, EffectTarget::SelfUnit));
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        // turn 1 on A's submission, turn 2 idle, then A wakes up
        assert_eq!(outcome.turns_resolved, 2);
        assert_eq!(session.turn, 3);
        assert_eq!(session.phase, TurnPhase::Submission);
        assert!(can_submit(&session, Side::A));
        assert!(!can_submit(&session, Side::B));
    }

    #[test]
    fn fainted_active_must_switch_before_anything_else() {
        let fx = Fixture::new();
        let mut session = active_session();
        session.side_b.units[0].current_hp = 0;
        session.side_b.units[0].mark_fainted_if_down();
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        let denied = manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();
        assert_eq!(denied.rejection.map(|r| r.key), Some(EventKey::KnockoutBlock));

        manager.submit(fx.env(), &mut rng, B, Action::switch(1)).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, A, Action::attack("tackle")).unwrap();

        assert_eq!(keys(&outcome)[0], EventKey::SwitchSuccess);
        assert_eq!(session.side_b.active_index, Some(1));
        assert_eq!(session.side_b.units[1].current_hp, 60);
    }

    #[test]
    fn item_flag_resets_at_turn_end() {
        let fx = Fixture::new();
        let mut session = active_session();
        session.side_a.units[0].current_hp = 50;
        let mut rng = SequenceRng::constant(0.5);
        let mut manager = TurnPhaseManager::new(&mut session);

        manager.submit(fx.env(), &mut rng, A, Action::use_item("potion", None)).unwrap();
        let outcome = manager.submit(fx.env(), &mut rng, B, Action::attack("tackle")).unwrap();

        assert_eq!(keys(&outcome)[0], EventKey::ItemHeal);
        assert!(!session.side_a.has_used_item_this_turn);
        assert_eq!(session.side_a.item_count("potion"), 1);
    }

    #[test]
    fn finished_and_unknown_are_hard_errors() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut rng = SequenceRng::constant(0.5);

        let err = TurnPhaseManager::new(&mut session)
            .submit(fx.env(), &mut rng, CombatantId(99), Action::attack("tackle"))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownCombatant { .. }));
        assert_eq!(err.severity(), ErrorSeverity::Validation);

        session.status = BattleStatus::Finished;
        let err = TurnPhaseManager::new(&mut session)
            .submit(fx.env(), &mut rng, A, Action::attack("tackle"))
            .unwrap_err();
        assert_eq!(err.error_code(), "BATTLE_FINISHED");
    }

    #[test]
    fn event_log_is_reset_each_step() {
        let fx = Fixture::new();
        let mut session = active_session();
        let mut rng = SequenceRng::constant(0.5);

        TurnPhaseManager::new(&mut session)
            .submit(fx.env(), &mut rng, A, Action::switch(0))
            .unwrap();
        assert_eq!(session.event_log.len(), 1);

        TurnPhaseManager::new(&mut session)
            .submit(fx.env(), &mut rng, A, Action::attack("tackle"))
            .unwrap();
        assert!(session.event_log.is_empty());
    }
}
