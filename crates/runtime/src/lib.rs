//! Runtime orchestration for live pet battles.
//!
//! This crate wires the deterministic rules in `battle-core` to the outside
//! world: session storage, rosters, rooms, timers and outbound updates.
//! Consumers embed [`BattleCoordinator`] to create battles, forward player
//! actions and connection changes, and read [`BattleUpdate`]s from the
//! channel returned by the builder.
//!
//! Modules are organized by responsibility:
//! - [`coordinator`] hosts the lifecycle orchestrator and its builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`rooms`] and [`scheduler`] track connections and pending timers
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod api;
pub mod config;
pub mod coordinator;
pub mod oracle;
pub mod repository;
pub mod rooms;
pub mod scheduler;

pub use api::{
    BattleUpdate, RepositoryError, Result, Roster, RosterProvider, RuntimeError,
    StaticRosterProvider, StoreError, UpdateKind,
};
pub use config::RuntimeConfig;
pub use coordinator::{BattleCoordinator, CoordinatorBuilder};
pub use oracle::{ItemOracleImpl, OracleManager};
pub use repository::{
    BattleRecord, BattleRecordRepository, BattleStateStore, FileRecordRepository,
    InMemoryBattleStore, InMemoryRecordRepository,
};
pub use rooms::{ConnectionId, RoomMember, RoomRegistry, Seat};
pub use scheduler::{TaskScheduler, TimerKey};
