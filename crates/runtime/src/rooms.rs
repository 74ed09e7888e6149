//! Battle room bookkeeping.
//!
//! Tracks which transport connection sits in which seat so a dropped
//! connection can be resolved to `(battle, combatant)`. Bots are never
//! members.

use std::collections::HashMap;

use battle_core::{BattleId, CombatantId};
use tokio::sync::RwLock;

/// Transport-level connection identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A human combatant and the connection they play from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seat {
    pub combatant: CombatantId,
    pub connection: ConnectionId,
}

impl Seat {
    pub fn new(combatant: CombatantId, connection: ConnectionId) -> Self {
        Self {
            combatant,
            connection,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomMember {
    pub combatant: CombatantId,
    pub connection: ConnectionId,
    pub connected: bool,
}

#[derive(Default)]
struct Rooms {
    members: HashMap<BattleId, Vec<RoomMember>>,
    connections: HashMap<ConnectionId, (BattleId, CombatantId)>,
}

#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<Rooms>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `seat` in `battle` as connected.
    pub async fn join(&self, battle: BattleId, seat: Seat) {
        let mut rooms = self.inner.write().await;
        let members = rooms.members.entry(battle).or_default();
        members.retain(|member| member.combatant != seat.combatant);
        members.push(RoomMember {
            combatant: seat.combatant,
            connection: seat.connection,
            connected: true,
        });
        rooms
            .connections
            .insert(seat.connection, (battle, seat.combatant));
    }

    /// Marks the member behind `connection` as disconnected and returns its
    /// seat. Unknown connections yield `None`.
    pub async fn disconnect(&self, connection: ConnectionId) -> Option<(BattleId, CombatantId)> {
        let mut rooms = self.inner.write().await;
        let (battle, combatant) = rooms.connections.remove(&connection)?;
        let member = rooms
            .members
            .get_mut(&battle)?
            .iter_mut()
            .find(|member| member.combatant == combatant)?;
        member.connected = false;
        Some((battle, combatant))
    }

    /// Re-attaches `combatant` through a new connection. Returns false if the
    /// combatant has no seat in the room.
    pub async fn reconnect(&self, battle: BattleId, seat: Seat) -> bool {
        let mut rooms = self.inner.write().await;
        let Some(member) = rooms
            .members
            .get_mut(&battle)
            .and_then(|members| members.iter_mut().find(|m| m.combatant == seat.combatant))
        else {
            return false;
        };

        let previous = member.connection;
        member.connection = seat.connection;
        member.connected = true;
        rooms.connections.remove(&previous);
        rooms
            .connections
            .insert(seat.connection, (battle, seat.combatant));
        true
    }

    pub async fn is_connected(&self, battle: BattleId, combatant: CombatantId) -> bool {
        self.inner
            .read()
            .await
            .members
            .get(&battle)
            .and_then(|members| members.iter().find(|m| m.combatant == combatant))
            .is_some_and(|member| member.connected)
    }

    /// Removes one member. Returns whether it was seated.
    pub async fn leave(&self, battle: BattleId, combatant: CombatantId) -> bool {
        let mut rooms = self.inner.write().await;
        let Some(members) = rooms.members.get_mut(&battle) else {
            return false;
        };
        let Some(position) = members.iter().position(|m| m.combatant == combatant) else {
            return false;
        };
        let member = members.remove(position);
        rooms.connections.remove(&member.connection);
        true
    }

    /// Drops the whole room.
    pub async fn release(&self, battle: BattleId) {
        let mut rooms = self.inner.write().await;
        if let Some(members) = rooms.members.remove(&battle) {
            for member in members {
                rooms.connections.remove(&member.connection);
            }
        }
    }

    pub async fn members(&self, battle: BattleId) -> Vec<RoomMember> {
        self.inner
            .read()
            .await
            .members
            .get(&battle)
            .cloned()
            .unwrap_or_default()
    }
}
