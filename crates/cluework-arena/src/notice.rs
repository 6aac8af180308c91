//! Lifecycle notifications pushed to subscribers.

use cluework_protocol::{ArenaId, PlayerId, Role, RoundId, RoundResult};
use serde::Serialize;

use crate::ArenaState;

/// An event a collaborator may want to react to.
///
/// Delivered over each subscriber's own unbounded channel. The arena never
/// waits on a subscriber: a receiver that has been dropped is pruned on the
/// next send, and a slow one just buffers. A misbehaving listener therefore
/// cannot stall or abort arena processing.
#[derive(Debug, Clone, Serialize)]
pub enum ArenaNotice {
    StateChanged {
        arena: ArenaId,
        from: ArenaState,
        to: ArenaState,
        round: RoundId,
    },
    PlayerJoined {
        arena: ArenaId,
        player: PlayerId,
        players: usize,
    },
    PlayerLeft {
        arena: ArenaId,
        player: PlayerId,
        players: usize,
    },
    /// An armed countdown threshold was crossed ("10 seconds to start").
    CountdownMilestone {
        arena: ArenaId,
        state: ArenaState,
        remaining: u32,
    },
    /// Roles went out for a new round. Consumers decide per recipient what
    /// to reveal; the engine reports the full assignment.
    RolesAssigned {
        arena: ArenaId,
        round: RoundId,
        roles: Vec<(PlayerId, Role)>,
    },
    /// The seated detective died or left; their weapon is up for grabs.
    DetectiveDown { arena: ArenaId, round: RoundId },
    /// Role assignment was refused and the arena fell back to Waiting.
    AssignmentRefused { arena: ArenaId, eligible: usize },
    RoundEnded { arena: ArenaId, result: RoundResult },
}
