//! Shared types for the Cluework engine.
//!
//! Everything in this crate crosses a boundary between the engine core and
//! one of its collaborators (event translation, presentation, statistics).
//! These are call-level contracts, not a wire format: collaborators receive
//! owned values and are free to serialize them however they like, which is
//! why the types carry serde derives but no codec.

mod types;

pub use types::{
    ArenaId, DeathCause, Location, PlayerId, Role, RoundId, RoundResult, ScoreDelta, Weapon,
    Winner,
};
