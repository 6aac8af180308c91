//! The per-player, per-round session record.

use cluework_protocol::{PlayerId, Role};
use serde::Serialize;

/// One player's transient state within an arena round.
///
/// Serializable so state queries can hand collaborators a copy of the whole
/// standing without a bespoke snapshot type per field.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSession {
    player: PlayerId,
    role: Role,
    alive: bool,
    /// Kills credited this round.
    kills: u32,
    /// Score earned this round.
    score: i64,
    /// Opaque reference to the platform's stashed inventory snapshot for
    /// this player. The engine never interprets it; the kit layer stores it
    /// on join and claims it back when the session is destroyed.
    inventory_ref: Option<u64>,
}

impl PlayerSession {
    /// Creates a fresh session: no role, alive, zero counters.
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            role: Role::None,
            alive: true,
            kills: 0,
            score: 0,
            inventory_ref: None,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the player dead. Returns `false` if they already were, so a
    /// duplicate death report is a visible no-op to the caller.
    pub fn mark_dead(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        true
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Credits a kill plus its score value.
    pub fn credit_kill(&mut self, score: i64) {
        self.kills += 1;
        self.score += score;
    }

    pub fn add_score(&mut self, score: i64) {
        self.score += score;
    }

    pub fn inventory_ref(&self) -> Option<u64> {
        self.inventory_ref
    }

    pub fn set_inventory_ref(&mut self, stash: Option<u64>) {
        self.inventory_ref = stash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_alive_with_no_role() {
        let s = PlayerSession::new(PlayerId(1));
        assert!(s.is_alive());
        assert_eq!(s.role(), Role::None);
        assert_eq!(s.kills(), 0);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_mark_dead_is_idempotent() {
        let mut s = PlayerSession::new(PlayerId(1));
        assert!(s.mark_dead());
        assert!(!s.mark_dead());
        assert!(!s.is_alive());
    }

    #[test]
    fn test_inventory_ref_round_trips() {
        let mut s = PlayerSession::new(PlayerId(1));
        assert_eq!(s.inventory_ref(), None);
        s.set_inventory_ref(Some(9));
        assert_eq!(s.inventory_ref(), Some(9));
    }

    #[test]
    fn test_credit_kill_bumps_both_counters() {
        let mut s = PlayerSession::new(PlayerId(1));
        s.credit_kill(100);
        s.credit_kill(100);
        assert_eq!(s.kills(), 2);
        assert_eq!(s.score(), 200);
    }
}
