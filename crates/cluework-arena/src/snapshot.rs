//! Read-only views of arena state.
//!
//! Presentation and statistics collaborators never touch an arena directly;
//! they take an [`ArenaSnapshot`] and format whatever they need from it. The
//! snapshot carries every field the stock scoreboard shows: phase, timer,
//! player counts, innocents left, detective status, and per-player standing.

use cluework_protocol::{ArenaId, PlayerId, Role, RoundId};
use cluework_session::PlayerSession;
use serde::Serialize;

use crate::ArenaState;

/// Validity token attached to round-scoped intake events.
///
/// Producers copy the token out of the snapshot they acted on; the arena
/// compares it against its live state and drops the event as stale on any
/// mismatch. This is what keeps a "player died" report from a finished round
/// out of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntakeToken {
    pub state: ArenaState,
    pub round: RoundId,
}

impl std::fmt::Display for IntakeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.round, self.state)
    }
}

/// A point-in-time copy of one arena's observable state.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaSnapshot {
    pub arena: ArenaId,
    pub name: String,
    pub state: ArenaState,
    pub round: RoundId,
    /// Seconds left in the current phase, `None` while idle in Waiting.
    pub remaining_secs: Option<u32>,
    pub min_players: usize,
    pub max_players: usize,
    /// Every session the arena holds, sorted by player id.
    pub players: Vec<PlayerSession>,
    /// Whether the seated detective has died (or left) this round.
    pub detective_dead: bool,
    /// Whether this round runs with a cosmetic detective stand-in.
    pub fake_detective_seated: bool,
    /// Stale intake events dropped since the arena was created.
    pub stale_events: u64,
}

impl ArenaSnapshot {
    /// The token a producer should attach to round-scoped events derived
    /// from this snapshot.
    pub fn token(&self) -> IntakeToken {
        IntakeToken {
            state: self.state,
            round: self.round,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|s| s.is_alive()).count()
    }

    /// Alive role-holding players other than the murderer.
    pub fn innocents_left(&self) -> usize {
        self.players
            .iter()
            .filter(|s| s.is_alive() && s.role().is_playing() && s.role() != Role::Murderer)
            .count()
    }

    /// The role held by `player`, if they are in the arena.
    pub fn role_of(&self, player: PlayerId) -> Option<Role> {
        self.players
            .iter()
            .find(|s| s.player() == player)
            .map(|s| s.role())
    }
}
