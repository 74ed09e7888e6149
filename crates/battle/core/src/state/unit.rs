use arrayvec::ArrayVec;

use super::StatusEffects;
use crate::config::BattleConfig;
use crate::effects::{EffectCategories, EffectType};

/// Combat multipliers and chances carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub attack_modifier: f64,
    pub defense_modifier: f64,
    pub dodge_chance: f64,
    pub hit_chance: f64,
    pub crit_chance: f64,
    pub block_chance: f64,
}

impl Modifiers {
    pub const DEFAULT_CRIT_CHANCE: f64 = 0.05;
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            attack_modifier: 1.0,
            defense_modifier: 1.0,
            dodge_chance: 0.0,
            hit_chance: 1.0,
            crit_chance: Self::DEFAULT_CRIT_CHANCE,
            block_chance: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MoveCategory {
    Damaging,
    /// Skips the hit roll and damage; only rolls its effects.
    Support,
}

/// Which unit a move effect lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EffectTarget {
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfUnit,
    Enemy,
    Ally,
}

/// A status effect a move may inflict.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveEffect {
    pub kind: EffectType,
    /// Probability in `[0, 1]`.
    pub chance: f64,
    pub target: EffectTarget,
    pub duration: Option<u32>,
    pub magnitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub id: String,
    pub name: String,
    pub power: u32,
    pub category: MoveCategory,
    pub affinity: Option<String>,
    pub effects: Vec<MoveEffect>,
}

impl Move {
    pub fn targets_ally(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| effect.target == EffectTarget::Ally)
    }
}

/// A single battling unit.
///
/// `current_hp` never goes below zero and `is_fainted` is true exactly when
/// it reaches zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: u32,
    pub display_name: String,
    pub current_hp: u32,
    pub max_hp: u32,
    pub is_fainted: bool,
    /// False while fainted or held by a blocking effect.
    pub can_act: bool,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub modifiers: Modifiers,
    pub status_effects: StatusEffects,
    pub moves: ArrayVec<Move, { BattleConfig::MAX_MOVES }>,
}

impl UnitState {
    /// Creates a healthy unit at full HP. Moves past the equip limit are dropped.
    pub fn new(
        id: u32,
        display_name: impl Into<String>,
        max_hp: u32,
        attack: u32,
        defense: u32,
        speed: u32,
        moves: impl IntoIterator<Item = Move>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            current_hp: max_hp,
            max_hp,
            is_fainted: max_hp == 0,
            can_act: max_hp > 0,
            attack,
            defense,
            speed,
            modifiers: Modifiers::default(),
            status_effects: StatusEffects::empty(),
            moves: moves.into_iter().take(BattleConfig::MAX_MOVES).collect(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn find_move(&self, move_id: &str) -> Option<&Move> {
        self.moves.iter().find(|mv| mv.id == move_id)
    }

    pub fn is_full_hp(&self) -> bool {
        self.current_hp >= self.max_hp
    }

    /// True while a non-fainted unit is held by a blocking effect.
    pub fn is_blocked(&self) -> bool {
        !self.is_fainted && self.blocking_effect().is_some()
    }

    pub fn blocking_effect(&self) -> Option<EffectType> {
        self.status_effects
            .iter()
            .map(|effect| effect.kind)
            .find(|kind| kind.categories().contains(EffectCategories::BLOCKING))
    }

    /// Subtracts HP, clamping at zero. Returns the HP actually removed.
    ///
    /// Does not flip `is_fainted`; callers announce faints through
    /// [`UnitState::mark_fainted_if_down`].
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Adds HP, clamping at `max_hp`. Returns the HP actually restored.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.current_hp));
        self.current_hp += healed;
        healed
    }

    /// Sets the fainted flag if HP is zero. Returns true on the transition.
    pub fn mark_fainted_if_down(&mut self) -> bool {
        if self.current_hp == 0 && !self.is_fainted {
            self.is_fainted = true;
            self.can_act = false;
            return true;
        }
        false
    }

    /// Brings a fainted unit back with `hp` (at least 1).
    pub fn revive(&mut self, hp: u32) {
        self.current_hp = hp.clamp(1, self.max_hp.max(1));
        self.is_fainted = false;
        self.refresh_can_act();
    }

    pub fn refresh_can_act(&mut self) {
        self.can_act = !self.is_fainted && self.blocking_effect().is_none();
    }
}
