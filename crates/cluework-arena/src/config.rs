//! Arena configuration and the lifecycle state machine.

use cluework_protocol::Location;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// Static configuration for one arena, loaded at server start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Unique arena name ("manor", "library").
    pub name: String,

    /// Name of the world this arena occupies.
    pub world: String,

    /// Where players wait during the lobby phase.
    pub lobby_spawn: Location,

    /// Where players are placed when the round begins.
    pub arena_spawn: Location,

    /// Minimum players required to start the countdown.
    pub min_players: usize,

    /// Maximum players allowed in.
    pub max_players: usize,

    /// Lobby countdown length in seconds.
    pub starting_countdown_secs: u32,

    /// Active round length in seconds.
    pub round_duration_secs: u32,

    /// Result-display delay after a round resolves.
    pub ending_delay_secs: u32,

    /// Cleanup delay before the arena returns to the lobby.
    pub restarting_delay_secs: u32,

    /// Whether a real detective (with the weapon unlock) is seated.
    pub detective_enabled: bool,

    /// How many recent murderers are penalized in the next draw.
    pub murderer_history_depth: usize,

    /// Fixed seed for the role-draw RNG. `None` seeds from the OS; set it in
    /// tests to make every draw reproducible.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            name: "arena".to_string(),
            world: "world".to_string(),
            lobby_spawn: Location::new("world", 0.0, 64.0, 0.0),
            arena_spawn: Location::new("world", 0.0, 64.0, 100.0),
            min_players: 2,
            max_players: 16,
            starting_countdown_secs: 30,
            round_duration_secs: 300,
            ending_delay_secs: 5,
            restarting_delay_secs: 5,
            detective_enabled: true,
            murderer_history_depth: 1,
            rng_seed: None,
        }
    }
}

impl ArenaConfig {
    /// Clamps out-of-range values so the config is safe to run.
    ///
    /// Called by the machine on construction. Rules: at least two players to
    /// have a murderer and a victim, `max_players >= min_players`, and no
    /// zero-length timed phases.
    pub fn validated(mut self) -> Self {
        if self.min_players < 2 {
            tracing::warn!(
                arena = %self.name,
                min_players = self.min_players,
                "min_players below 2, clamping"
            );
            self.min_players = 2;
        }
        if self.max_players < self.min_players {
            tracing::warn!(
                arena = %self.name,
                max_players = self.max_players,
                min_players = self.min_players,
                "max_players below min_players, clamping"
            );
            self.max_players = self.min_players;
        }
        self.starting_countdown_secs = self.starting_countdown_secs.max(1);
        self.round_duration_secs = self.round_duration_secs.max(1);
        self.ending_delay_secs = self.ending_delay_secs.max(1);
        self.restarting_delay_secs = self.restarting_delay_secs.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// ArenaState
// ---------------------------------------------------------------------------

/// The lifecycle state of an arena.
///
/// ```text
///            +--------------------- Restarting <---+
///            v                                     |
/// Waiting -> Starting -> InGame -> Ending ---------+
///    ^          |
///    +----------+  (roster dropped below minimum, or assignment refused)
/// ```
///
/// - **Waiting**: lobby open, not enough players to start.
/// - **Starting**: countdown running. Falls back to Waiting if the roster
///   drops below the minimum before it fires.
/// - **InGame**: roles assigned, round clock running.
/// - **Ending**: round resolved, result on display.
/// - **Restarting**: cleanup delay; roster cleared on exit.
///
/// Role assignment happens on the single Starting -> InGame edge. InGame is
/// reachable from nowhere else, which is what makes "exactly one live
/// assignment per round" a structural guarantee rather than a convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaState {
    Waiting,
    Starting,
    InGame,
    Ending,
    Restarting,
}

impl ArenaState {
    /// Whether the lobby is open to new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting | Self::Starting)
    }

    /// Whether a round's roles are live (the one-murderer invariant holds).
    pub fn is_live(self) -> bool {
        matches!(self, Self::InGame | Self::Ending)
    }

    /// Returns `true` if transitioning to `target` is allowed by the table.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Starting)
                | (Self::Starting, Self::InGame)
                | (Self::Starting, Self::Waiting)
                | (Self::InGame, Self::Ending)
                | (Self::Ending, Self::Restarting)
                | (Self::Restarting, Self::Waiting)
        )
    }
}

impl std::fmt::Display for ArenaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Starting => write!(f, "Starting"),
            Self::InGame => write!(f, "InGame"),
            Self::Ending => write!(f, "Ending"),
            Self::Restarting => write!(f, "Restarting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table_matches_lifecycle() {
        use ArenaState::*;
        assert!(Waiting.can_transition_to(Starting));
        assert!(Starting.can_transition_to(InGame));
        assert!(Starting.can_transition_to(Waiting));
        assert!(InGame.can_transition_to(Ending));
        assert!(Ending.can_transition_to(Restarting));
        assert!(Restarting.can_transition_to(Waiting));
    }

    #[test]
    fn test_in_game_unreachable_except_from_starting() {
        use ArenaState::*;
        for from in [Waiting, InGame, Ending, Restarting] {
            assert!(!from.can_transition_to(InGame), "{from} -> InGame must be rejected");
        }
    }

    #[test]
    fn test_no_state_skipping_out_of_a_round() {
        use ArenaState::*;
        assert!(!InGame.can_transition_to(Restarting));
        assert!(!InGame.can_transition_to(Waiting));
        assert!(!Ending.can_transition_to(Waiting));
    }

    #[test]
    fn test_is_joinable_and_is_live_split_the_states() {
        use ArenaState::*;
        assert!(Waiting.is_joinable());
        assert!(Starting.is_joinable());
        assert!(!InGame.is_joinable());
        assert!(!Ending.is_joinable());
        assert!(!Restarting.is_joinable());

        assert!(InGame.is_live());
        assert!(Ending.is_live());
        assert!(!Waiting.is_live());
        assert!(!Starting.is_live());
        assert!(!Restarting.is_live());
    }

    #[test]
    fn test_config_validated_clamps_degenerate_values() {
        let config = ArenaConfig {
            min_players: 0,
            max_players: 1,
            ending_delay_secs: 0,
            ..ArenaConfig::default()
        }
        .validated();

        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 2);
        assert_eq!(config.ending_delay_secs, 1);
    }
}
