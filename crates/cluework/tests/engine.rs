//! Whole-engine test: two full rounds through the public prelude, the way a
//! host server drives it.

use std::sync::Arc;
use std::time::Duration;

use cluework::prelude::*;

fn config(name: &str, seed: u64) -> ArenaConfig {
    ArenaConfig {
        name: name.to_string(),
        world: format!("world_{name}"),
        min_players: 2,
        max_players: 8,
        starting_countdown_secs: 3,
        round_duration_secs: 30,
        ending_delay_secs: 2,
        restarting_delay_secs: 2,
        rng_seed: Some(seed),
        ..ArenaConfig::default()
    }
}

async fn tick(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

async fn join_all(arena: &ArenaHandle, ids: &[u64]) {
    for &id in ids {
        arena.join(PlayerId(id)).await.unwrap();
    }
}

async fn murderer_of(arena: &ArenaHandle) -> PlayerId {
    arena
        .snapshot()
        .await
        .unwrap()
        .players
        .iter()
        .find(|s| s.role() == Role::Murderer)
        .expect("live round has a murderer")
        .player()
}

#[tokio::test(start_paused = true)]
async fn test_two_rounds_end_to_end() {
    let registry = ArenaRegistry::with_tick_config(
        Arc::new(AlwaysOnline),
        TickConfig {
            period: Duration::from_secs(1),
            initial_jitter_us: 0,
        },
    );
    let arena = registry.register(config("manor", 42)).unwrap();
    let mut notices = arena.subscribe().await.unwrap();

    // ---- Round one -------------------------------------------------------
    join_all(&arena, &[1, 2, 3, 4]).await;
    tick(4).await;

    let snapshot = arena.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::InGame);
    assert_eq!(snapshot.round, RoundId(1));

    let first_murderer = murderer_of(&arena).await;
    let token = snapshot.token();

    // An innocent takes the murderer down with the bow.
    let shooter = snapshot
        .players
        .iter()
        .find(|s| s.player() != first_murderer)
        .unwrap()
        .player();
    assert!(arena
        .report_damage(shooter, first_murderer, Weapon::Bow, token)
        .await
        .unwrap());
    arena
        .report_death(
            first_murderer,
            DeathCause::Slain {
                killer: shooter,
                weapon: Weapon::Bow,
            },
            token,
        )
        .unwrap();

    let snapshot = arena.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Ending);

    let result = std::iter::from_fn(|| notices.try_recv().ok())
        .find_map(|n| match n {
            ArenaNotice::RoundEnded { result, .. } => Some(result),
            _ => None,
        })
        .expect("round one result");
    assert_eq!(result.winner, Winner::Innocents);
    assert_eq!(result.round, RoundId(1));
    // The shooter earned the kill credit plus the win bonus.
    let shooter_delta = result.delta_for(shooter).unwrap();
    assert_eq!(shooter_delta.kills, 1);
    assert_eq!(shooter_delta.score, 200);

    // ---- Reset and round two ---------------------------------------------
    tick(6).await;
    let snapshot = arena.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Waiting);
    assert_eq!(snapshot.player_count(), 0);

    join_all(&arena, &[1, 2, 3, 4]).await;
    tick(4).await;

    let snapshot = arena.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::InGame);
    assert_eq!(snapshot.round, RoundId(2));

    let second_murderer = murderer_of(&arena).await;
    assert_ne!(
        second_murderer, first_murderer,
        "history keeps the murderer seat moving"
    );

    // Round two times out instead: the murderer takes it by default.
    tick(31).await;
    let result = std::iter::from_fn(|| notices.try_recv().ok())
        .find_map(|n| match n {
            ArenaNotice::RoundEnded { result, .. } => Some(result),
            _ => None,
        })
        .expect("round two result");
    assert_eq!(result.winner, Winner::Murderer);
    assert_eq!(result.round, RoundId(2));
}

#[tokio::test(start_paused = true)]
async fn test_registry_boots_from_static_configs() {
    let registry = ArenaRegistry::from_configs(
        Arc::new(AlwaysOnline),
        vec![config("manor", 1), config("library", 2)],
    )
    .unwrap();

    assert_eq!(registry.len(), 2);
    let manor = registry.find_by_name("manor").unwrap();
    let library = registry.find_by_world("world_library").unwrap();
    assert_ne!(manor.id(), library.id());

    registry.shutdown_all();
    assert!(registry.is_empty());
    assert!(manor.join(PlayerId(1)).await.is_err(), "shut-down arena is gone");
}
