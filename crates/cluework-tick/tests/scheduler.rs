//! Tick driver timing tests, run on paused Tokio time.

use std::time::Duration;

use cluework_tick::{TickConfig, TickScheduler};

fn config_no_jitter() -> TickConfig {
    TickConfig {
        period: Duration::from_secs(1),
        initial_jitter_us: 0,
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_fires_after_one_period() {
    let mut s = TickScheduler::new(config_no_jitter());
    let start = tokio::time::Instant::now();

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_number_monotonically() {
    let mut s = TickScheduler::new(config_no_jitter());
    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(s.tick_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_cadence_is_one_tick_per_period() {
    let mut s = TickScheduler::new(config_no_jitter());
    let start = tokio::time::Instant::now();

    for _ in 0..10 {
        s.wait_for_tick().await;
    }

    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_jitter_delays_only_the_first_tick() {
    let mut s = TickScheduler::new(TickConfig {
        period: Duration::from_secs(1),
        initial_jitter_us: 500_000,
    });
    let start = tokio::time::Instant::now();

    s.wait_for_tick().await;
    let first = start.elapsed();
    assert!(first >= Duration::from_secs(1));
    assert!(first < Duration::from_millis(1600));

    // Subsequent ticks keep a clean one-period cadence.
    s.wait_for_tick().await;
    assert_eq!(start.elapsed(), first + Duration::from_secs(1));
}
