//! Deterministic battle rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical rules (actions, effects, validation,
//! turn phases) and exposes pure APIs with no I/O and no clocks. All session
//! mutation flows through [`engine::TurnPhaseManager`]; randomness comes in
//! through [`env::RngOracle`] and read-only data through [`env::BattleEnv`].
pub mod action;
pub mod bot;
#[cfg(feature = "serde")]
pub mod codec;
pub mod config;
pub mod effects;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod state;
pub mod validate;
pub mod view;

pub use action::{Action, ActionDecodeError, ActionKind, HandlerOutcome};
pub use bot::{BotStrategy, RandomStrategy, legal_actions, strategy_for};
#[cfg(feature = "serde")]
pub use codec::CodecError;
pub use config::BattleConfig;
pub use effects::{ApplyOutcome, EffectCategories, EffectType};
pub use engine::{EngineError, StepOutcome, TurnPhaseManager};
pub use env::{
    BattleEnv, ItemDefinition, ItemEffect, ItemOracle, PcgRng, RngOracle, SequenceRng,
    compute_seed,
};
pub use error::{BattleError, ErrorSeverity};
pub use event::{
    BattleEvent, EventKey, EventNotifier, EventPayload, LocaleTable, Notification, PayloadValue,
    Translator,
};
pub use state::{
    BattleId, BattleSession, BattleStatus, CombatantId, EffectTarget, Modifiers, Move,
    MoveCategory, MoveEffect, PendingActions, PlayerBattleState, Side, StatusEffect,
    StatusEffects, TurnPhase, UnitState,
};
pub use validate::{ActionValidator, Rejection, can_submit};
pub use view::{BattleView, PendingStatus};
