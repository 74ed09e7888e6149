//! Runtime configuration.

use std::env;
use std::time::Duration;

/// Timers, capacities, and defaults of the battle runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// How long a disconnected player has to come back before the battle
    /// is cancelled.
    pub grace_period: Duration,
    /// Delay before a bot submits its action.
    pub bot_delay: Duration,
    /// Expiry of a live session in the state store.
    pub session_ttl: Duration,
    /// Upper bound on the store's live-id index.
    pub index_capacity: usize,
    /// Capacity of the outbound update channel.
    pub update_buffer: usize,
    /// Fixed seed for reproducible runs. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Language of rendered event messages.
    pub locale: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(30),
            bot_delay: Duration::from_secs(1),
            session_ttl: Duration::from_secs(60 * 60),
            index_capacity: 1024,
            update_buffer: 64,
            rng_seed: None,
            locale: "en".to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_GRACE_PERIOD_SECS` - Disconnect grace period (default: 30)
    /// - `BATTLE_BOT_DELAY_MS` - Bot think delay (default: 1000)
    /// - `BATTLE_SESSION_TTL_SECS` - Live session expiry (default: 3600)
    /// - `BATTLE_INDEX_CAPACITY` - Live-id index bound (default: 1024)
    /// - `BATTLE_UPDATE_BUFFER` - Outbound update channel capacity (default: 64)
    /// - `BATTLE_RNG_SEED` - Fixed RNG seed (default: entropy)
    /// - `BATTLE_LOCALE` - Message language (default: en)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_env::<u64>("BATTLE_GRACE_PERIOD_SECS") {
            config.grace_period = Duration::from_secs(secs);
        }
        if let Some(millis) = read_env::<u64>("BATTLE_BOT_DELAY_MS") {
            config.bot_delay = Duration::from_millis(millis);
        }
        if let Some(secs) = read_env::<u64>("BATTLE_SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(secs.max(1));
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_INDEX_CAPACITY") {
            config.index_capacity = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_UPDATE_BUFFER") {
            config.update_buffer = capacity.max(1);
        }
        if let Some(seed) = read_env::<u64>("BATTLE_RNG_SEED") {
            config.rng_seed = Some(seed);
        }
        if let Ok(locale) = env::var("BATTLE_LOCALE")
            && !locale.trim().is_empty()
        {
            config.locale = locale.trim().to_lowercase();
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
