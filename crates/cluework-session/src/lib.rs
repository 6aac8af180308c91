//! Player sessions and roster bookkeeping.
//!
//! A session is the arena's transient record of one player for one round:
//! their role, whether they are alive, and their local counters. Sessions are
//! created on join, mutated only through the arena's intake, and destroyed on
//! leave or arena reset. The engine never owns a connection; see
//! [`IdentityResolver`] for the boundary to whatever does.

mod identity;
mod roster;
mod session;

pub use identity::{AlwaysOnline, IdentityResolver};
pub use roster::Roster;
pub use session::PlayerSession;
