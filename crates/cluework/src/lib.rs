//! # Cluework
//!
//! Arena lifecycle and role-assignment engine for murder-mystery minigame
//! servers: many independent arenas, each cycling lobby, countdown, live
//! round, resolution, and reset, with one hidden murderer per round.
//!
//! The engine is platform-agnostic. A host server translates its own events
//! (damage, death, quit) into intake calls on an [`ArenaHandle`] and renders
//! whatever it likes from [`ArenaSnapshot`] queries and [`ArenaNotice`]
//! subscriptions.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cluework::prelude::*;
//!
//! # async fn run() -> Result<(), ArenaError> {
//! let registry = ArenaRegistry::from_configs(
//!     Arc::new(AlwaysOnline),
//!     vec![ArenaConfig { name: "manor".into(), ..ArenaConfig::default() }],
//! )?;
//!
//! let arena = registry.find_by_name("manor").expect("registered above");
//! arena.join(PlayerId(1)).await?;
//! let snapshot = arena.snapshot().await?;
//! println!("{} is {}", snapshot.name, snapshot.state);
//! # Ok(())
//! # }
//! ```

pub use cluework_arena::{
    ArenaConfig, ArenaError, ArenaHandle, ArenaMachine, ArenaNotice, ArenaRegistry,
    ArenaSnapshot, ArenaState, IntakeToken,
};
pub use cluework_protocol::{
    ArenaId, DeathCause, Location, PlayerId, Role, RoundId, RoundResult, ScoreDelta, Weapon,
    Winner,
};
pub use cluework_roles::{assign, AssignError, MurdererHistory, RoleAssignment, RoleOptions};
pub use cluework_session::{AlwaysOnline, IdentityResolver, PlayerSession, Roster};
pub use cluework_tick::{Countdown, TickConfig, TickScheduler};

/// Everything a host server typically needs.
pub mod prelude {
    pub use cluework_arena::{
        ArenaConfig, ArenaError, ArenaHandle, ArenaNotice, ArenaRegistry, ArenaSnapshot,
        ArenaState, IntakeToken,
    };
    pub use cluework_protocol::{
        ArenaId, DeathCause, Location, PlayerId, Role, RoundId, RoundResult, Weapon, Winner,
    };
    pub use cluework_session::{AlwaysOnline, IdentityResolver};
    pub use cluework_tick::TickConfig;
}
