//! Integration tests for the arena actor and registry.
//!
//! Runs on paused Tokio time: the one-second tick driver advances only when
//! the test sleeps past its deadlines, so every phase change lands on an
//! exact, observable second.

use std::sync::Arc;
use std::time::Duration;

use cluework_arena::{
    ArenaConfig, ArenaHandle, ArenaNotice, ArenaRegistry, ArenaState,
};
use cluework_protocol::{DeathCause, PlayerId, Role, Weapon, Winner};
use cluework_session::AlwaysOnline;
use cluework_tick::TickConfig;

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn fast_config(name: &str) -> ArenaConfig {
    ArenaConfig {
        name: name.to_string(),
        world: format!("world_{name}"),
        min_players: 2,
        max_players: 8,
        starting_countdown_secs: 3,
        round_duration_secs: 20,
        ending_delay_secs: 2,
        restarting_delay_secs: 2,
        rng_seed: Some(42),
        ..ArenaConfig::default()
    }
}

fn registry() -> ArenaRegistry {
    ArenaRegistry::with_tick_config(
        Arc::new(AlwaysOnline),
        TickConfig {
            period: Duration::from_secs(1),
            initial_jitter_us: 0,
        },
    )
}

async fn tick(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

/// Joins players 1..=n and waits out the countdown.
async fn start_round(handle: &ArenaHandle, n: u64) {
    for id in 1..=n {
        handle.join(pid(id)).await.unwrap();
    }
    tick(4).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::InGame);
}

async fn murderer_of(handle: &ArenaHandle) -> PlayerId {
    handle
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
async fn test_two_join_starts_countdown_and_leaves_cancel_it() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();

    handle.join(pid(1)).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().state, ArenaState::Waiting);

    handle.join(pid(2)).await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Starting);
    assert_eq!(snapshot.remaining_secs, Some(3));

    handle.leave(pid(1)).await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Waiting);
    assert_eq!(snapshot.remaining_secs, None);
    assert_eq!(snapshot.player_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_full_cycle_emits_every_transition_and_clears_roster() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    let mut notices = handle.subscribe().await.unwrap();

    for id in 1..=3 {
        handle.join(pid(id)).await.unwrap();
    }
    // Countdown (3s) + round (20s) + ending (2s) + restarting (2s).
    tick(30).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Waiting);
    assert_eq!(snapshot.player_count(), 0, "reset clears the roster");

    let mut transitions = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        if let ArenaNotice::StateChanged { from, to, .. } = notice {
            transitions.push((from, to));
        }
    }
    use ArenaState::*;
    assert_eq!(
        transitions,
        vec![
            (Waiting, Starting),
            (Starting, InGame),
            (InGame, Ending),
            (Ending, Restarting),
            (Restarting, Waiting),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_murderer_elimination_ends_round_before_timer() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    let mut notices = handle.subscribe().await.unwrap();
    start_round(&handle, 4).await;

    let murderer = murderer_of(&handle).await;
    let token = handle.snapshot().await.unwrap().token();

    // Partway through the round the murderer is shot. No waiting out the
    // remaining clock: the arena resolves immediately.
    tick(5).await;
    handle
        .report_death(
            murderer,
            DeathCause::Slain {
                killer: pid(1),
                weapon: Weapon::Bow,
            },
            token,
        )
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ArenaState::Ending);

    let winner = std::iter::from_fn(|| notices.try_recv().ok()).find_map(|n| match n {
        ArenaNotice::RoundEnded { result, .. } => Some(result.winner),
        _ => None,
    });
    assert_eq!(winner, Some(Winner::Innocents));
}

#[tokio::test(start_paused = true)]
async fn test_stale_death_report_is_dropped() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    start_round(&handle, 3).await;
    let old_token = handle.snapshot().await.unwrap().token();

    // Let the whole round play out and start the next one.
    tick(26).await;
    start_round(&handle, 3).await;

    let before = handle.snapshot().await.unwrap();
    handle
        .report_death(pid(2), DeathCause::Environment, old_token)
        .unwrap();

    let after = handle.snapshot().await.unwrap();
    assert_eq!(after.alive_count(), before.alive_count());
    assert_eq!(after.state, ArenaState::InGame);
    assert_eq!(after.stale_events, before.stale_events + 1);
}

#[tokio::test(start_paused = true)]
async fn test_join_rejected_when_full_or_running() {
    let registry = registry();
    let handle = registry
        .register(ArenaConfig {
            max_players: 2,
            ..fast_config("manor")
        })
        .unwrap();

    handle.join(pid(1)).await.unwrap();
    handle.join(pid(2)).await.unwrap();
    assert!(handle.join(pid(3)).await.is_err(), "arena is full");

    tick(4).await;
    assert_eq!(handle.snapshot().await.unwrap().state, ArenaState::InGame);
    assert!(handle.join(pid(3)).await.is_err(), "round already running");
}

#[tokio::test(start_paused = true)]
async fn test_damage_gate_through_intake() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    start_round(&handle, 4).await;

    let murderer = murderer_of(&handle).await;
    let snapshot = handle.snapshot().await.unwrap();
    let token = snapshot.token();
    let innocent = snapshot
        .players
        .iter()
        .find(|s| s.role() == Role::Innocent)
        .unwrap()
        .player();

    assert!(handle
        .report_damage(murderer, innocent, Weapon::Blade, token)
        .await
        .unwrap());
    assert!(!handle
        .report_damage(innocent, murderer, Weapon::Blade, token)
        .await
        .unwrap());
    assert!(handle
        .report_damage(innocent, murderer, Weapon::Bow, token)
        .await
        .unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_role_queries_reflect_assignment() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    start_round(&handle, 5).await;

    let snapshot = handle.snapshot().await.unwrap();
    let murderers = snapshot
        .players
        .iter()
        .filter(|s| s.role() == Role::Murderer)
        .count();
    let detectives = snapshot
        .players
        .iter()
        .filter(|s| s.role().is_detective_like())
        .count();
    assert_eq!(murderers, 1);
    assert_eq!(detectives, 1);
    assert_eq!(snapshot.innocents_left(), 4);

    for s in &snapshot.players {
        assert_eq!(snapshot.role_of(s.player()), Some(s.role()));
    }
    assert_eq!(snapshot.role_of(pid(99)), None);
}

#[tokio::test(start_paused = true)]
async fn test_inventory_stash_sticks_to_the_session() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    handle.join(pid(1)).await.unwrap();

    handle.stash_inventory(pid(1), Some(77)).unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players[0].inventory_ref(), Some(77));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_serializes_for_collaborators() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    start_round(&handle, 3).await;

    // Presentation and statistics layers encode snapshots as they see fit;
    // the whole query surface has to be serializable.
    let snapshot = handle.snapshot().await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["name"], "manor");
    assert_eq!(json["state"], "InGame");
    assert_eq!(json["round"], 1);
    assert_eq!(json["players"].as_array().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_registry_routes_by_name_and_world() {
    let registry = registry();
    let manor = registry.register(fast_config("manor")).unwrap();
    let library = registry.register(fast_config("library")).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.find_by_name("manor").map(|h| h.id()),
        Some(manor.id())
    );
    assert_eq!(
        registry.find_by_world("world_library").map(|h| h.id()),
        Some(library.id())
    );
    assert!(registry.find_by_name("asylum").is_none());

    assert!(matches!(
        registry.register(fast_config("manor")),
        Err(cluework_arena::ArenaError::NameTaken(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_remove_drains_and_kills_the_arena() {
    let registry = registry();
    let handle = registry.register(fast_config("manor")).unwrap();
    handle.join(pid(1)).await.unwrap();

    registry.remove(handle.id()).unwrap();

    // Anything enqueued after the shutdown is discarded; the caller sees
    // the arena as unavailable.
    assert!(handle.snapshot().await.is_err());
    assert!(registry.get(handle.id()).is_none());
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_arenas_run_independently() {
    let registry = registry();
    let manor = registry.register(fast_config("manor")).unwrap();
    let library = registry.register(fast_config("library")).unwrap();

    // A round in the manor; the library stays idle in its lobby.
    start_round(&manor, 3).await;
    library.join(pid(10)).await.unwrap();

    assert_eq!(manor.snapshot().await.unwrap().state, ArenaState::InGame);
    let library_snapshot = library.snapshot().await.unwrap();
    assert_eq!(library_snapshot.state, ArenaState::Waiting);
    assert_eq!(library_snapshot.player_count(), 1);

    // Tearing one down does not disturb the other.
    registry.remove(library.id()).unwrap();
    assert_eq!(manor.snapshot().await.unwrap().state, ArenaState::InGame);
}
