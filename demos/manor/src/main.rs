//! A self-contained round of murder mystery with scripted bots.
//!
//! Boots a registry with one arena, joins four bots, lets the countdown run,
//! then has the murderer work through the innocents. Watch the lifecycle
//! notices scroll by with `RUST_LOG=info cargo run -p manor`.

use std::sync::Arc;
use std::time::Duration;

use cluework::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ArenaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let registry = ArenaRegistry::from_configs(
        Arc::new(AlwaysOnline),
        vec![ArenaConfig {
            name: "manor".into(),
            world: "manor_world".into(),
            min_players: 2,
            max_players: 8,
            starting_countdown_secs: 5,
            round_duration_secs: 60,
            ending_delay_secs: 3,
            restarting_delay_secs: 3,
            ..ArenaConfig::default()
        }],
    )?;

    let arena = registry.find_by_name("manor").expect("registered above");

    // Relay lifecycle notices to the log, the way a chat/scoreboard layer
    // would consume them.
    let mut notices = arena.subscribe().await?;
    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            match notice {
                ArenaNotice::RoundEnded { result, .. } => {
                    info!(winner = %result.winner, "== round over ==");
                    for delta in &result.deltas {
                        info!(
                            player = %delta.player,
                            role = %delta.role,
                            kills = delta.kills,
                            score = delta.score,
                            "final standing"
                        );
                    }
                }
                other => info!(?other, "notice"),
            }
        }
    });

    let bots: Vec<PlayerId> = (1..=4).map(PlayerId).collect();
    for &bot in &bots {
        arena.join(bot).await?;
    }

    // Wait out the lobby countdown.
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if arena.snapshot().await?.state == ArenaState::InGame {
            break;
        }
    }

    // The murderer hunts: one victim every few seconds, checked through the
    // damage gate first like a real combat event would be.
    loop {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let snapshot = arena.snapshot().await?;
        if snapshot.state != ArenaState::InGame {
            break;
        }
        let token = snapshot.token();
        let murderer = snapshot
            .players
            .iter()
            .find(|s| s.role() == Role::Murderer)
            .expect("live round has a murderer")
            .player();
        let Some(victim) = snapshot
            .players
            .iter()
            .find(|s| s.is_alive() && s.player() != murderer)
            .map(|s| s.player())
        else {
            break;
        };

        if arena
            .report_damage(murderer, victim, Weapon::Blade, token)
            .await?
        {
            arena.report_death(
                victim,
                DeathCause::Slain {
                    killer: murderer,
                    weapon: Weapon::Blade,
                },
                token,
            )?;
        }
    }

    // Let the ending and restart delays play out, then stop.
    tokio::time::sleep(Duration::from_secs(8)).await;
    registry.shutdown_all();
    info!("demo finished");
    Ok(())
}
