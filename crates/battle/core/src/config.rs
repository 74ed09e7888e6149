/// Battle tuning constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Global scale applied to every damage roll.
    pub damage_constant: f64,
    pub crit_multiplier: f64,
    pub block_multiplier: f64,
    /// Share of dealt damage returned to the attacker when a lifesteal effect
    /// carries no magnitude of its own.
    pub lifesteal_fraction: f64,
    /// Upper bound on consecutive turns resolved without any submission
    /// (both sides blocked) inside a single step.
    pub max_idle_turns: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_MOVES: usize = 4;
    pub const MAX_STATUS_EFFECTS: usize = 8;
    pub const MAX_PARTY_SIZE: usize = 6;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DAMAGE_CONSTANT: f64 = 0.4;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_BLOCK_MULTIPLIER: f64 = 0.5;
    pub const DEFAULT_LIFESTEAL_FRACTION: f64 = 0.5;
    pub const DEFAULT_MAX_IDLE_TURNS: u32 = 16;

    pub fn new() -> Self {
        Self {
            damage_constant: Self::DEFAULT_DAMAGE_CONSTANT,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            block_multiplier: Self::DEFAULT_BLOCK_MULTIPLIER,
            lifesteal_fraction: Self::DEFAULT_LIFESTEAL_FRACTION,
            max_idle_turns: Self::DEFAULT_MAX_IDLE_TURNS,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
