//! Arena lifecycle for Cluework.
//!
//! One arena is one independent murder-mystery instance cycling through
//! lobby, countdown, live round, resolution, and reset. Each runs as an
//! isolated Tokio task owning an [`ArenaMachine`]; the outside world reaches
//! it only through an [`ArenaHandle`], whose command channel serializes every
//! mutation.
//!
//! # Key types
//!
//! - [`ArenaMachine`] — the synchronous state machine (also usable directly
//!   for embedding or testing without a runtime)
//! - [`ArenaHandle`] — the event-intake API for one running arena
//! - [`ArenaRegistry`] — creates/destroys arenas, routes lookups
//! - [`ArenaState`] — the lifecycle state machine
//! - [`ArenaConfig`] — per-arena settings
//! - [`ArenaNotice`] — lifecycle notifications for subscribers

mod arena;
mod config;
mod error;
mod machine;
mod notice;
mod registry;
mod snapshot;

pub use arena::ArenaHandle;
pub use config::{ArenaConfig, ArenaState};
pub use error::ArenaError;
pub use machine::ArenaMachine;
pub use notice::ArenaNotice;
pub use registry::ArenaRegistry;
pub use snapshot::{ArenaSnapshot, IntakeToken};
