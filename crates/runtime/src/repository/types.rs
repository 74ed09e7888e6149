use battle_core::{BattleId, BattleSession, CombatantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable outcome of a finished battle. Written once, at finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle_id: BattleId,
    pub combatant_a: CombatantId,
    pub combatant_b: CombatantId,
    pub winner: Option<CombatantId>,
    pub created_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl BattleRecord {
    pub fn from_session(session: &BattleSession, ended_at: DateTime<Utc>) -> Self {
        let created_at = DateTime::from_timestamp_millis(session.created_at_ms).unwrap_or(ended_at);
        Self {
            battle_id: session.id,
            combatant_a: session.combatant_a,
            combatant_b: session.combatant_b,
            winner: session.winner,
            created_at,
            ended_at,
        }
    }
}
