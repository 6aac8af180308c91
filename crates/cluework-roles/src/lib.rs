//! Role assignment: who is the murderer this round?
//!
//! Pure algorithm, no arena knowledge. The caller hands in an ordered
//! snapshot of eligible players, the recent-murderer history, and a random
//! source; it gets back a complete role split or a refusal. Nothing here
//! touches ambient randomness, so a seeded [`rand::rngs::StdRng`] reproduces
//! an assignment exactly.

mod assigner;
mod history;

pub use assigner::{assign, AssignError, RoleAssignment, RoleOptions};
pub use history::MurdererHistory;
