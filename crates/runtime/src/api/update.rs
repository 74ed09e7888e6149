//! Outbound notifications published by the coordinator.

use battle_core::{BattleEvent, BattleId, BattleSession, BattleView, CombatantId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Created,
    /// An action was processed (accepted or denied).
    Step,
    Disconnected,
    Reconnected,
    Finished,
    Cancelled,
}

/// One externally visible change to a battle.
///
/// `session` is the post-step snapshot; it is absent only for cancellations,
/// where the session no longer exists.
#[derive(Clone, Debug)]
pub struct BattleUpdate {
    pub battle: BattleId,
    pub kind: UpdateKind,
    pub session: Option<BattleSession>,
    pub events: Vec<BattleEvent>,
}

impl BattleUpdate {
    /// Projection for one participant, if a snapshot is attached.
    pub fn view_for(&self, viewer: CombatantId) -> Option<BattleView> {
        self.session
            .as_ref()
            .map(|session| BattleView::for_viewer(session, &self.events, viewer))
    }

    /// Events `viewer` is allowed to see.
    pub fn events_for(&self, viewer: CombatantId) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter().filter(move |event| event.is_visible_to(viewer))
    }
}
