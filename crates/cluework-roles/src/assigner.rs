//! The draw itself: weighted murderer pick, uniform detective pick.

use cluework_protocol::{PlayerId, Role};
use rand::Rng;

use crate::MurdererHistory;

/// Minimum viable round: a murderer and at least one potential victim.
pub const MIN_ELIGIBLE: usize = 2;

/// Tuning knobs for one assignment draw.
#[derive(Debug, Clone)]
pub struct RoleOptions {
    /// Whether a real detective (with the weapon unlock) may be seated.
    pub detective_enabled: bool,
    /// The repeat penalty only applies when the pool is strictly larger than
    /// this. In a tiny pool, zeroing out recent murderers would make the next
    /// pick predictable, which is worse than a repeat.
    pub repeat_penalty_min_pool: usize,
}

impl Default for RoleOptions {
    fn default() -> Self {
        Self {
            detective_enabled: true,
            repeat_penalty_min_pool: 2,
        }
    }
}

/// A complete role split for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub murderer: PlayerId,
    /// The real detective, if one was seated.
    pub detective: Option<PlayerId>,
    /// The cosmetic stand-in, if no real detective could be seated.
    pub fake_detective: Option<PlayerId>,
    /// Everyone else.
    pub innocents: Vec<PlayerId>,
}

impl RoleAssignment {
    /// Every player with their assigned role, murderer first.
    pub fn roles(&self) -> Vec<(PlayerId, Role)> {
        let mut out = Vec::with_capacity(2 + self.innocents.len());
        out.push((self.murderer, Role::Murderer));
        if let Some(d) = self.detective {
            out.push((d, Role::Detective));
        }
        if let Some(f) = self.fake_detective {
            out.push((f, Role::FakeDetective));
        }
        out.extend(self.innocents.iter().map(|&p| (p, Role::Innocent)));
        out
    }
}

/// Why an assignment was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    /// Not enough eligible players for a viable round.
    #[error("need at least {required} eligible players, have {eligible}")]
    InfeasiblePool { eligible: usize, required: usize },
}

/// Draws a full role split for the given pool.
///
/// `pool` must be the caller's ordered eligibility snapshot (alive, online,
/// non-spectator); this function trusts the order and never reorders it, so a
/// seeded `rng` reproduces the same assignment for the same snapshot.
///
/// The murderer is a weighted draw: weight 1.0 per player, zeroed for players
/// in `history` when the pool is large enough to absorb the penalty. The
/// detective is a uniform draw from the remainder when enabled and at least
/// two players remain; otherwise one remaining player becomes the fake
/// detective so the arena still appears to have one.
pub fn assign<R: Rng>(
    rng: &mut R,
    pool: &[PlayerId],
    history: &MurdererHistory,
    opts: &RoleOptions,
) -> Result<RoleAssignment, AssignError> {
    if pool.len() < MIN_ELIGIBLE {
        return Err(AssignError::InfeasiblePool {
            eligible: pool.len(),
            required: MIN_ELIGIBLE,
        });
    }

    let murderer = draw_murderer(rng, pool, history, opts);

    let mut remaining: Vec<PlayerId> = pool.iter().copied().filter(|&p| p != murderer).collect();

    let mut detective = None;
    let mut fake_detective = None;
    if opts.detective_enabled && remaining.len() >= 2 {
        let idx = rng.random_range(0..remaining.len());
        detective = Some(remaining.swap_remove(idx));
    } else {
        // No weapon unlock goes out, but somebody still has to look like
        // the detective.
        let idx = rng.random_range(0..remaining.len());
        fake_detective = Some(remaining.swap_remove(idx));
    }

    remaining.sort_unstable();
    let assignment = RoleAssignment {
        murderer,
        detective,
        fake_detective,
        innocents: remaining,
    };

    tracing::debug!(
        murderer = %assignment.murderer,
        detective = ?assignment.detective,
        fake_detective = ?assignment.fake_detective,
        innocents = assignment.innocents.len(),
        "roles drawn"
    );

    Ok(assignment)
}

fn draw_murderer<R: Rng>(
    rng: &mut R,
    pool: &[PlayerId],
    history: &MurdererHistory,
    opts: &RoleOptions,
) -> PlayerId {
    let penalize = pool.len() > opts.repeat_penalty_min_pool;
    let weights: Vec<f64> = pool
        .iter()
        .map(|&p| {
            if penalize && history.contains(p) {
                0.0
            } else {
                1.0
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        // Everyone eligible is in the history; fall back to a uniform draw
        // rather than refusing the round.
        return pool[rng.random_range(0..pool.len())];
    }

    let mut mark = rng.random_range(0.0..total);
    for (&player, &weight) in pool.iter().zip(&weights) {
        if weight <= 0.0 {
            continue;
        }
        if mark < weight {
            return player;
        }
        mark -= weight;
    }
    // Floating-point edge: mark landed exactly on total. Take the last
    // weighted player.
    *pool
        .iter()
        .zip(&weights)
        .filter(|(_, &w)| w > 0.0)
        .map(|(p, _)| p)
        .next_back()
        .expect("total weight > 0 implies a weighted player exists")
}
