//! Error types for the arena layer.
//!
//! Everything here is recoverable at arena scope. The actor logs and drops
//! what it cannot apply; nothing propagates across arenas or into the
//! registry.

use cluework_protocol::{ArenaId, PlayerId};

use crate::{ArenaState, IntakeToken};

/// Errors produced by arena operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArenaError {
    /// No arena with this id is registered.
    #[error("arena {0} not found")]
    NotFound(ArenaId),

    /// An arena with this name already exists in the registry.
    #[error("arena name {0:?} already registered")]
    NameTaken(String),

    /// Join rejected: no player slots left.
    #[error("arena {0} is full")]
    CapacityExceeded(ArenaId),

    /// The player already has a session in this arena.
    #[error("player {0} already joined arena {1}")]
    AlreadyJoined(PlayerId, ArenaId),

    /// The player has no session in this arena.
    #[error("player {0} not in arena {1}")]
    NotInArena(PlayerId, ArenaId),

    /// The operation is not valid in the arena's current state.
    /// Logged and ignored; the state machine is unchanged.
    #[error("cannot {action} while arena is {state}")]
    InvalidTransition {
        action: &'static str,
        state: ArenaState,
    },

    /// The event was produced against an older round or phase. Dropped
    /// without mutating state; the arena counts these for diagnostics.
    #[error("stale event: producer observed {observed}, arena is at {current}")]
    StaleEvent {
        observed: IntakeToken,
        current: IntakeToken,
    },

    /// The arena's intake channel is closed (shutdown in progress).
    #[error("arena {0} is unavailable")]
    Unavailable(ArenaId),
}
