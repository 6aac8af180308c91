//! Countdown timers for arena phases, and the scheduler that drives them.
//!
//! Two pieces:
//!
//! - [`Countdown`]: a plain decreasing-seconds value with one-shot armed
//!   thresholds and a latched zero crossing. Purely synchronous, so state
//!   machine tests can drive it tick by tick without a runtime.
//! - [`TickScheduler`]: the fixed-period (default 1 s) async driver. One per
//!   arena actor, sitting in its `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = receiver.recv() => { /* intake */ }
//!         info = scheduler.wait_for_tick() => {
//!             let notices = machine.tick_second();
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// What one countdown tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownStep {
    /// Seconds left after this tick.
    pub remaining: u32,
    /// Armed thresholds crossed by this tick, each fired at most once.
    pub fired: Vec<u32>,
    /// `true` exactly once per reset: on the tick that reached zero.
    /// Further ticks on an expired countdown report `false`, so observers
    /// ticking the same second can never double-process the crossing.
    pub expired: bool,
}

/// A per-arena decreasing countdown.
///
/// The value never goes negative and the zero crossing is latched: once a
/// reset's countdown has expired, nothing fires again until the next
/// [`Countdown::reset`]. An idle countdown (no phase running) ignores ticks.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<u32>,
    pending: Vec<u32>,
    expired: bool,
}

impl Countdown {
    /// An idle countdown. Ticks are no-ops until `reset` is called.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the countdown at `secs`. Previously armed
    /// thresholds are discarded; callers re-arm for the new phase.
    pub fn reset(&mut self, secs: u32) {
        self.remaining = Some(secs);
        self.pending.clear();
        self.expired = false;
    }

    /// Returns to idle. No further ticks have any effect.
    pub fn clear(&mut self) {
        self.remaining = None;
        self.pending.clear();
        self.expired = false;
    }

    /// Arms a one-shot threshold: the next tick that lands on `threshold`
    /// seconds reports it in [`CountdownStep::fired`]. Thresholds at or above
    /// the current value, duplicates, and arming while idle are ignored.
    pub fn arm(&mut self, threshold: u32) {
        let Some(remaining) = self.remaining else {
            return;
        };
        if threshold < remaining && !self.pending.contains(&threshold) {
            self.pending.push(threshold);
        }
    }

    /// Arms several thresholds at once.
    pub fn arm_all(&mut self, thresholds: &[u32]) {
        for &t in thresholds {
            self.arm(t);
        }
    }

    /// Seconds left, or `None` while idle.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_idle(&self) -> bool {
        self.remaining.is_none()
    }

    /// Advances the countdown by one second.
    ///
    /// Returns `None` while idle or after the zero crossing already fired.
    pub fn tick(&mut self) -> Option<CountdownStep> {
        let remaining = self.remaining?;
        if self.expired {
            return None;
        }

        let now = remaining.saturating_sub(1);
        self.remaining = Some(now);

        let mut fired = Vec::new();
        self.pending.retain(|&t| {
            if t >= now {
                fired.push(t);
                false
            } else {
                true
            }
        });
        fired.sort_unstable_by(|a, b| b.cmp(a));

        let expired = now == 0;
        if expired {
            self.expired = true;
        }

        Some(CountdownStep {
            remaining: now,
            fired,
            expired,
        })
    }
}

// ---------------------------------------------------------------------------
// TickScheduler
// ---------------------------------------------------------------------------

/// Configuration for the tick driver.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Interval between ticks. Arena countdowns assume one second.
    pub period: Duration,
    /// Random jitter (0..max microseconds) added before the first tick so
    /// arenas created in the same instant do not all fire together.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            initial_jitter_us: 50_000,
        }
    }
}

/// Information about a fired tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// Whether the scheduler woke significantly late for this tick.
    pub late: bool,
}

/// Fixed-period tick driver. One per arena actor.
pub struct TickScheduler {
    period: Duration,
    tick_count: u64,
    next_tick: TokioInstant,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };
        Self {
            period: config.period,
            tick_count: 0,
            next_tick: TokioInstant::now() + config.period + jitter,
        }
    }

    /// Waits until the next tick is due.
    ///
    /// If the task fell behind by one or more whole periods, the missed ticks
    /// are skipped and the cadence restarts from now. Countdowns tolerate
    /// this: a slow second delays a transition, it never double-fires one.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        time::sleep_until(self.next_tick).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(self.next_tick);
        let late = late_by > self.period / 10;
        if late {
            let skipped = late_by.as_nanos() / self.period.as_nanos().max(1);
            if skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = skipped as u64,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overran its period, skipping ahead"
                );
            }
            self.next_tick = now + self.period;
        } else {
            self.next_tick += self.period;
        }

        trace!(tick = self.tick_count, late, "tick fired");
        TickInfo {
            tick: self.tick_count,
            late,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
