//! AI opponents.
//!
//! A [`BotStrategy`] only ever picks among actions the validator accepts, so
//! a bot submission can never be denied.

use crate::action::Action;
use crate::env::{ItemOracle, RngOracle};
use crate::state::{BattleSession, Side, TurnPhase};
use crate::validate::{ActionValidator, can_submit};

pub trait BotStrategy: Send + Sync {
    fn id(&self) -> &'static str;

    /// Picks the opening unit. `None` if no starter is selectable.
    fn choose_starter(
        &self,
        session: &BattleSession,
        side: Side,
        items: &dyn ItemOracle,
        rng: &mut dyn RngOracle,
    ) -> Option<Action>;

    /// Picks this window's action. `None` when the bot cannot submit.
    fn choose_action(
        &self,
        session: &BattleSession,
        side: Side,
        items: &dyn ItemOracle,
        rng: &mut dyn RngOracle,
    ) -> Option<Action>;
}

/// Uniform choice over every legal action.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    pub const ID: &'static str = "random";
}

impl BotStrategy for RandomStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn choose_starter(
        &self,
        session: &BattleSession,
        side: Side,
        items: &dyn ItemOracle,
        rng: &mut dyn RngOracle,
    ) -> Option<Action> {
        pick(legal_actions(session, side, items), rng)
    }

    fn choose_action(
        &self,
        session: &BattleSession,
        side: Side,
        items: &dyn ItemOracle,
        rng: &mut dyn RngOracle,
    ) -> Option<Action> {
        if !can_submit(session, side) {
            return None;
        }
        pick(legal_actions(session, side, items), rng)
    }
}

fn pick(mut candidates: Vec<Action>, rng: &mut dyn RngOracle) -> Option<Action> {
    if candidates.is_empty() {
        return None;
    }
    let index = rng.pick(candidates.len());
    Some(candidates.swap_remove(index))
}

/// Enumerates every action `side` may submit right now.
///
/// Starters during selection; otherwise moves (one candidate per healthy
/// ally for ally-targeted moves) and switches. Items are not considered.
pub fn legal_actions(session: &BattleSession, side: Side, items: &dyn ItemOracle) -> Vec<Action> {
    let state = session.side(side);
    let unit_count = state.units.len();

    let candidates: Vec<Action> = if session.phase == TurnPhase::Selection {
        (0..unit_count)
            .map(|unit_index| Action::SelectStarter { unit_index })
            .collect()
    } else {
        let mut actions = Vec::new();
        if let Some(active) = state.active() {
            for mv in &active.moves {
                if mv.targets_ally() {
                    actions.extend((0..unit_count).map(|ally| Action::Attack {
                        move_id: mv.id.clone(),
                        target_unit_index: Some(ally),
                    }));
                } else {
                    actions.push(Action::attack(mv.id.clone()));
                }
            }
        }
        actions.extend((0..unit_count).map(Action::switch));
        actions
    };

    let validator = ActionValidator::new(items);
    candidates
        .into_iter()
        .filter(|action| validator.validate(session, side, action).is_ok())
        .collect()
}

/// Resolves a strategy by id.
pub fn strategy_for(id: &str) -> Option<&'static dyn BotStrategy> {
    static RANDOM: RandomStrategy = RandomStrategy;
    match id {
        RandomStrategy::ID => Some(&RANDOM),
        _ => None,
    }
}
