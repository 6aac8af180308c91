//! Identity newtypes, roles, and round outcomes.
//!
//! The id types are newtype wrappers around `u64`: a `PlayerId` can never be
//! passed where an `ArenaId` is expected even though both are plain integers
//! underneath, and `#[serde(transparent)]` keeps them encoding as the bare
//! number for collaborators.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identity for a player.
///
/// The engine never holds a player's live connection. Identity resolution
/// (raw session handle to stable id, online/offline queries) is a collaborator
/// concern; the engine only stores and compares these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for an arena (one independent game instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// A per-arena round counter.
///
/// Incremented each time an arena enters its active phase. Intake events are
/// tagged with the round the producer observed; a mismatch marks the event
/// stale and it is dropped instead of mutating a newer round's state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoundId(pub u64);

impl RoundId {
    /// The round id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// A player's assigned identity for one round.
///
/// `FakeDetective` is a cosmetic stand-in used when no real detective can be
/// seated (role disabled, or too few players): the player is told they are
/// the detective but gets no weapon unlock, which keeps the social-deduction
/// uncertainty alive for everyone else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// No role assigned yet (lobby, countdown).
    #[default]
    None,
    Innocent,
    Murderer,
    Detective,
    FakeDetective,
    /// Watching only; excluded from assignment and win conditions.
    Spectator,
}

impl Role {
    /// Whether this player presents as the detective to the rest of the
    /// arena, real or not.
    pub fn is_detective_like(self) -> bool {
        matches!(self, Self::Detective | Self::FakeDetective)
    }

    /// Whether this role participates in win-condition evaluation.
    pub fn is_playing(self) -> bool {
        !matches!(self, Self::None | Self::Spectator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Innocent => "innocent",
            Self::Murderer => "murderer",
            Self::Detective => "detective",
            Self::FakeDetective => "fake-detective",
            Self::Spectator => "spectator",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Combat tags
// ---------------------------------------------------------------------------

/// Tag describing the weapon behind a damage or death report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    /// The murderer's blade. Lethal only in the murderer's hands.
    Blade,
    /// The detective's bow. Lethal for whoever currently holds it.
    Bow,
    /// Anything else (fists, thrown items). Never lethal in this game mode.
    Other,
}

/// Why a player died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Killed by another player with the tagged weapon.
    Slain { killer: PlayerId, weapon: Weapon },
    /// Environmental death (void, fall, suffocation).
    Environment,
}

// ---------------------------------------------------------------------------
// Round outcome
// ---------------------------------------------------------------------------

/// Which side took the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Murderer,
    Innocents,
    /// Nobody left standing to claim the round.
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Murderer => write!(f, "murderer"),
            Self::Innocents => write!(f, "innocents"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// One player's line in a round result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub player: PlayerId,
    pub role: Role,
    /// Kills credited this round.
    pub kills: u32,
    /// Score earned this round (kill credit plus win bonus).
    pub score: i64,
}

/// The outcome of one finished round.
///
/// Produced when an arena resolves and handed to the statistics collaborator
/// through the notification channel. The engine itself keeps nothing once the
/// arena resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: RoundId,
    pub winner: Winner,
    pub deltas: Vec<ScoreDelta>,
}

impl RoundResult {
    /// The score line for one player, if they were part of the round.
    pub fn delta_for(&self, player: PlayerId) -> Option<&ScoreDelta> {
        self.deltas.iter().find(|d| d.player == player)
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// A point in a named world.
///
/// The engine treats locations as opaque identity data (arena lookup is "which
/// arena owns this world"); no geometry happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}, {:.1}, {:.1})", self.world, self.x, self.y, self.z)
    }
}
