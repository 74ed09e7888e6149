//! Headless bot-versus-bot match.
//!
//! Side A is seated as a "human" whose choices come from a local
//! [`RandomStrategy`], so the whole coordinator path (rooms, bot timers,
//! finalization) is exercised exactly as for a connected player.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use battle_core::{
    BattleSession, BotStrategy, CombatantId, PcgRng, RandomStrategy, Side, TurnPhase, can_submit,
};
use runtime::{
    BattleCoordinator, BattleUpdate, ConnectionId, OracleManager, Roster, Seat, UpdateKind,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ArenaConfig;

pub const PLAYER: CombatantId = CombatantId(1);
const PLAYER_CONNECTION: ConnectionId = ConnectionId(1);

/// Longest quiet period tolerated between updates.
const STALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Roster of the autoplayed side, built from the configured party.
pub fn player_roster(oracles: &OracleManager, config: &ArenaConfig) -> Result<Roster> {
    let units = config
        .party
        .iter()
        .map(|member| {
            oracles
                .species(member.species)
                .map(|species| species.unit_at_level(member.level))
                .with_context(|| format!("unknown species {} in party", member.species))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Roster::new(units, BTreeMap::from([("potion".to_owned(), 2)])))
}

/// Plays one battle to its end and returns the final update.
pub async fn run(
    coordinator: &BattleCoordinator,
    mut updates: mpsc::Receiver<BattleUpdate>,
    config: &ArenaConfig,
) -> Result<BattleUpdate> {
    let session = coordinator
        .create_bot_battle(Seat::new(PLAYER, PLAYER_CONNECTION), &config.opponent)
        .await?;
    info!(
        target: "arena",
        battle = %session.id,
        opponent = %config.opponent,
        "match started"
    );
    let mut rng = PcgRng::new(config.seed);

    loop {
        let update = tokio::time::timeout(STALL_TIMEOUT, updates.recv())
            .await
            .context("battle stalled")?
            .context("update stream closed")?;

        for event in update.events_for(PLAYER) {
            println!("[turn {:>2}] {}", event.turn, event.message);
        }

        match update.kind {
            UpdateKind::Finished | UpdateKind::Cancelled => return Ok(update),
            UpdateKind::Created | UpdateKind::Step => {
                if let Some(session) = &update.session {
                    act(coordinator, session, &mut rng).await?;
                }
            }
            UpdateKind::Disconnected | UpdateKind::Reconnected => {}
        }
    }
}

async fn act(coordinator: &BattleCoordinator, session: &BattleSession, rng: &mut PcgRng) -> Result<()> {
    if session.is_finished() {
        bail!("battle {} already ended", session.id);
    }
    let items = coordinator.oracles().items();
    let action = match session.phase {
        TurnPhase::Selection if !session.side_a.has_selected_starter => {
            RandomStrategy.choose_starter(session, Side::A, items, rng)
        }
        TurnPhase::Submission
            if !session.pending.has_submitted(Side::A) && can_submit(session, Side::A) =>
        {
            RandomStrategy.choose_action(session, Side::A, items, rng)
        }
        _ => None,
    };

    if let Some(action) = action {
        debug!(target: "arena", battle = %session.id, kind = %action.kind(), "submitting");
        coordinator.submit(session.id, PLAYER, action).await?;
    }
    Ok(())
}
