//! The roster: every session an arena currently holds.
//!
//! Backed by a `BTreeMap` so iteration is always sorted by player id. That
//! ordering is load-bearing: the role assigner draws from an ordered snapshot,
//! and a seeded RNG must produce the same assignment no matter what order
//! players happened to join in.

use std::collections::BTreeMap;

use cluework_protocol::{PlayerId, Role};

use crate::PlayerSession;

/// All sessions currently associated with one arena.
///
/// The alive/dead pools of the data model are derived views over the `alive`
/// flag, which makes "disjoint, union equals roster" hold by construction
/// rather than by bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    sessions: BTreeMap<PlayerId, PlayerSession>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fresh session. Returns `false` if the player is already present.
    pub fn insert(&mut self, player: PlayerId) -> bool {
        if self.sessions.contains_key(&player) {
            return false;
        }
        self.sessions.insert(player, PlayerSession::new(player));
        true
    }

    /// Removes and returns the player's session.
    pub fn remove(&mut self, player: PlayerId) -> Option<PlayerSession> {
        self.sessions.remove(&player)
    }

    pub fn get(&self, player: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(&player)
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All sessions, sorted by player id.
    pub fn sessions(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values()
    }

    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut PlayerSession> {
        self.sessions.values_mut()
    }

    /// The alive partition, sorted by player id.
    pub fn alive_players(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values().filter(|s| s.is_alive())
    }

    /// The dead partition, sorted by player id.
    pub fn dead_players(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values().filter(|s| !s.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// The session holding the murderer role, dead or alive.
    pub fn murderer(&self) -> Option<&PlayerSession> {
        self.sessions.values().find(|s| s.role() == Role::Murderer)
    }

    /// Alive role-holding players who are not the murderer. This is the
    /// "innocents left" figure presentation layers display, and the count win
    /// conditions watch. Players without a live role (spectators, stragglers
    /// skipped at assignment) do not keep a round open.
    pub fn innocents_left(&self) -> usize {
        self.alive_players()
            .filter(|s| s.role().is_playing() && s.role() != Role::Murderer)
            .count()
    }

    /// Drops every session, ending the round for all of them.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
