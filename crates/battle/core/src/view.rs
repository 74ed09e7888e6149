//! Per-viewer projection of a session.
//!
//! Events addressed to the other combatant are dropped and the submitted
//! actions are reduced to has-submitted flags, so a view never leaks the
//! opponent's pending choice.

use crate::event::BattleEvent;
use crate::state::{
    BattleId, BattleSession, BattleStatus, CombatantId, PlayerBattleState, Side, TurnPhase,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingStatus {
    pub a: bool,
    pub b: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleView {
    pub battle_id: BattleId,
    pub viewer: CombatantId,
    pub viewer_side: Option<Side>,
    pub combatant_a: CombatantId,
    pub combatant_b: CombatantId,
    pub side_a: PlayerBattleState,
    pub side_b: PlayerBattleState,
    pub turn: u32,
    pub phase: TurnPhase,
    pub status: BattleStatus,
    pub winner: Option<CombatantId>,
    pub pending: PendingStatus,
    pub events: Vec<BattleEvent>,
}

impl BattleView {
    pub fn for_viewer(session: &BattleSession, events: &[BattleEvent], viewer: CombatantId) -> Self {
        Self {
            battle_id: session.id,
            viewer,
            viewer_side: session.side_of(viewer),
            combatant_a: session.combatant_a,
            combatant_b: session.combatant_b,
            side_a: session.side_a.clone(),
            side_b: session.side_b.clone(),
            turn: session.turn,
            phase: session.phase,
            status: session.status,
            winner: session.winner,
            pending: PendingStatus {
                a: session.pending.has_submitted(Side::A),
                b: session.pending.has_submitted(Side::B),
            },
            events: events
                .iter()
                .filter(|event| event.is_visible_to(viewer))
                .cloned()
                .collect(),
        }
    }
}
