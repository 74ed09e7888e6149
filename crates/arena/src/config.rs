//! Arena configuration.

use std::env;
use std::path::PathBuf;

use battle_content::PartyMember;

use crate::dirs;

#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Bot profile to fight.
    pub opponent: String,
    /// Party of the autoplayed side.
    pub party: Vec<PartyMember>,
    /// Content directory. `None` uses the bundled data.
    pub data_dir: Option<PathBuf>,
    pub records_dir: PathBuf,
    /// Seed of the autoplayed side's choices.
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            opponent: "jessie".to_owned(),
            party: vec![
                PartyMember { species: 3, level: 6 },
                PartyMember { species: 6, level: 6 },
            ],
            data_dir: None,
            records_dir: dirs::records_dir(),
            seed: 1,
        }
    }
}

impl ArenaConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_OPPONENT` - Bot profile id (default: jessie)
    /// - `ARENA_PARTY` - Comma-separated `species:level` pairs (default: 3:6,6:6)
    /// - `ARENA_DATA_DIR` - Content directory (default: bundled content)
    /// - `ARENA_RECORDS_DIR` - Battle record directory (default: platform data dir)
    /// - `ARENA_SEED` - Seed of the autoplayed side (default: 1)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(opponent) = env::var("ARENA_OPPONENT")
            && !opponent.trim().is_empty()
        {
            config.opponent = opponent.trim().to_owned();
        }
        if let Some(party) = env::var("ARENA_PARTY").ok().and_then(|raw| parse_party(&raw)) {
            config.party = party;
        }
        if let Ok(dir) = env::var("ARENA_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = env::var("ARENA_RECORDS_DIR") {
            config.records_dir = PathBuf::from(dir);
        }
        if let Some(seed) = env::var("ARENA_SEED").ok().and_then(|s| s.parse().ok()) {
            config.seed = seed;
        }

        config
    }
}

/// Parses `"3:6,6:6"` into party members. `None` if any entry is malformed
/// or the party is empty.
fn parse_party(raw: &str) -> Option<Vec<PartyMember>> {
    let party = raw
        .split(',')
        .map(|entry| {
            let (species, level) = entry.trim().split_once(':')?;
            Some(PartyMember {
                species: species.trim().parse().ok()?,
                level: level.trim().parse().ok()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    (!party.is_empty()).then_some(party)
}
