//! Battle narration.
//!
//! Handlers and the turn manager describe what happened as [`Notification`]s
//! (a key, a payload, and an optional addressee). The [`EventNotifier`]
//! localizes them into [`BattleEvent`]s and appends them to the session log.
mod locale;
mod notifier;

pub use locale::{LocaleTable, Translator};
pub use notifier::EventNotifier;

use std::collections::BTreeMap;

use crate::state::{BattleId, CombatantId};

/// Every narratable event.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventKey {
    // Lifecycle
    BattleCreated,
    StarterSelected,
    BattleStarted,
    TurnEnd,
    TurnSkipped,
    BattleFinished,
    BattleCancelled,
    PlayerDisconnected,
    PlayerReconnected,

    // Denials (addressed to the offending combatant)
    WrongPhase,
    AlreadySubmitted,
    NoActiveUnit,
    KnockoutBlock,
    StatusBlock,
    InvalidStarter,
    InvalidMove,
    AllyTargetRequired,
    ItemAlreadyUsed,
    ItemNotOwned,
    ItemUnknown,
    ItemNotApplicable,
    ActionError,

    // Switch
    SwitchSuccess,
    SwitchFailedSameUnit,
    SwitchFailedFaintedUnit,
    SwitchFailedInvalidIndex,

    // Attack
    AttackHit,
    AttackMiss,
    AttackCrit,
    AttackBlocked,
    AttackNoTarget,
    MoveUsed,
    LifestealHeal,
    UnitFainted,

    // Status effects
    StatusApplied,
    StatusRefreshed,
    StatusDamage,
    StatusRemoved,

    // Items
    ItemHeal,
    ItemRevive,
    ItemCure,
    ItemCureNoEffect,
}

impl EventKey {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A single payload field value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PayloadValue {
    Int(i64),
    Text(String),
}

impl core::fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PayloadValue::Int(value) => write!(f, "{value}"),
            PayloadValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Int(value)
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        PayloadValue::Int(i64::from(value))
    }
}

impl From<usize> for PayloadValue {
    fn from(value: usize) -> Self {
        PayloadValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<CombatantId> for PayloadValue {
    fn from(value: CombatantId) -> Self {
        PayloadValue::Int(value.0)
    }
}

impl From<BattleId> for PayloadValue {
    fn from(value: BattleId) -> Self {
        PayloadValue::Int(i64::try_from(value.0).unwrap_or(i64::MAX))
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_owned())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

/// Named fields substituted into localized messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EventPayload(BTreeMap<String, PayloadValue>);

impl EventPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: impl Into<PayloadValue>) {
        self.0.insert(field.to_owned(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&PayloadValue> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Un-localized narration produced by rules code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub key: EventKey,
    pub payload: EventPayload,
    /// Addressee. `None` is visible to both combatants.
    pub target: Option<CombatantId>,
}

impl Notification {
    pub fn broadcast(key: EventKey) -> Self {
        Self {
            key,
            payload: EventPayload::new(),
            target: None,
        }
    }

    pub fn to(key: EventKey, combatant: CombatantId) -> Self {
        Self {
            key,
            payload: EventPayload::new(),
            target: Some(combatant),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<PayloadValue>) -> Self {
        self.payload.insert(field, value);
        self
    }
}

/// Localized, typed event as delivered to clients.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEvent {
    pub key: EventKey,
    pub payload: EventPayload,
    pub message: String,
    pub target: Option<CombatantId>,
    pub turn: u32,
}

impl BattleEvent {
    /// True if `viewer` may see this event.
    pub fn is_visible_to(&self, viewer: CombatantId) -> bool {
        self.target.is_none_or(|target| target == viewer)
    }
}
