//! Watch BizHawk shared memory and log every state change
//!
//! Usage: `emusync-monitor [config.yaml]`
//!
//! Log verbosity follows `RUST_LOG` (default `emusync=info`).

use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emusync::{EmuSync, IdentityEnricher, SyncConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emusync=info")),
        )
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SyncConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => SyncConfig::default(),
    };

    info!(
        game = %config.game_info.name,
        party = %config.party_info.name,
        interval_ms = config.poll_interval_ms,
        "Starting monitor"
    );

    let sync = EmuSync::start(config, IdentityEnricher).context("Failed to start synchronizers")?;
    let state = sync.state();

    let mut party = Box::pin(state.party_updates());
    let mut opponents = Box::pin(state.opponent_updates());
    let mut trainers = Box::pin(state.trainer_updates());
    let mut last_trainer = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            Some(roster) = party.next() => {
                let checksums: Vec<String> = roster
                    .slots()
                    .map(|slot| slot.map_or_else(|| "-".to_string(), |s| s.checksum().to_string()))
                    .collect();
                info!(size = roster.len(), members = ?checksums, "Party updated");
            }
            Some(roster) = opponents.next() => match roster {
                Some(roster) => info!(count = roster.len(), "Opponents updated"),
                None => info!("Opponents cleared"),
            },
            Some(trainer) = trainers.next() => {
                // Republished on every poll
                if last_trainer.as_ref() != Some(&trainer) {
                    info!(speed = state.emu_speed().factor(), "Trainer: {}", trainer);
                    last_trainer = Some(trainer);
                }
            }
        }
    }

    let report = sync.shutdown().await;
    info!(
        game_polls = report.game.polls,
        game_failed = report.game.failed,
        party_polls = report.party.polls,
        party_failed = report.party.failed,
        "Monitor stopped"
    );
    Ok(())
}
