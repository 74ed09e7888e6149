use std::collections::BTreeMap;

use super::{Side, UnitState};
use crate::action::Action;

/// One combatant's half of the battle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerBattleState {
    /// Index into `units`. `None` until a starter has been selected.
    pub active_index: Option<usize>,
    pub has_selected_starter: bool,
    pub has_used_item_this_turn: bool,
    /// Item id to remaining count.
    pub inventory: BTreeMap<String, u32>,
    pub units: Vec<UnitState>,
}

impl PlayerBattleState {
    pub fn new(units: Vec<UnitState>, inventory: BTreeMap<String, u32>) -> Self {
        Self {
            active_index: None,
            has_selected_starter: false,
            has_used_item_this_turn: false,
            inventory,
            units,
        }
    }

    pub fn active(&self) -> Option<&UnitState> {
        self.active_index.and_then(|index| self.units.get(index))
    }

    pub fn active_mut(&mut self) -> Option<&mut UnitState> {
        self.active_index.and_then(|index| self.units.get_mut(index))
    }

    pub fn unit(&self, index: usize) -> Option<&UnitState> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut UnitState> {
        self.units.get_mut(index)
    }

    /// True when every unit in the party has fainted.
    pub fn is_wiped(&self) -> bool {
        !self.units.is_empty() && self.units.iter().all(|unit| unit.is_fainted)
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    /// Consumes one unit of `item_id`. Returns false if none was left.
    pub fn take_item(&mut self, item_id: &str) -> bool {
        match self.inventory.get_mut(item_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Actions submitted in the current window, one slot per side.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingActions {
    pub a: Option<Action>,
    pub b: Option<Action>,
}

impl PendingActions {
    pub fn get(&self, side: Side) -> Option<&Action> {
        match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
    }

    pub fn set(&mut self, side: Side, action: Action) {
        match side {
            Side::A => self.a = Some(action),
            Side::B => self.b = Some(action),
        }
    }

    pub fn has_submitted(&self, side: Side) -> bool {
        self.get(side).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }

    pub fn len(&self) -> usize {
        usize::from(self.a.is_some()) + usize::from(self.b.is_some())
    }

    pub fn clear(&mut self) {
        self.a = None;
        self.b = None;
    }
}
