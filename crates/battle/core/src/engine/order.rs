//! Resolution ordering.
//!
//! Priority descending, then acting unit speed descending, then an
//! unweighted coin flip among entries still tied.

use crate::action::Action;
use crate::env::RngOracle;
use crate::state::{BattleSession, Side};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedAction {
    pub side: Side,
    pub action: Action,
}

fn sort_key(session: &BattleSession, entry: &QueuedAction) -> (u8, u32) {
    let speed = session
        .side(entry.side)
        .active()
        .map(|unit| unit.speed)
        .unwrap_or(0);
    (entry.action.priority(), speed)
}

/// Builds the execution queue from the pending actions of this window.
pub fn resolution_order(session: &BattleSession, rng: &mut dyn RngOracle) -> Vec<QueuedAction> {
    let mut queue: Vec<QueuedAction> = Side::BOTH
        .into_iter()
        .filter_map(|side| {
            session.pending.get(side).map(|action| QueuedAction {
                side,
                action: action.clone(),
            })
        })
        .collect();

    queue.sort_by(|a, b| sort_key(session, b).cmp(&sort_key(session, a)));

    // shuffle each run of equal keys
    let mut start = 0;
    while start < queue.len() {
        let key = sort_key(session, &queue[start]);
        let mut end = start + 1;
        while end < queue.len() && sort_key(session, &queue[end]) == key {
            end += 1;
        }
        for i in (start + 1..end).rev() {
            let j = start + rng.pick(i - start + 1);
            queue.swap(i, j);
        }
        start = end;
    }

    queue
}
