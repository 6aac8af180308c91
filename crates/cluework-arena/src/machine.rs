//! The arena state machine.
//!
//! `ArenaMachine` is deliberately synchronous: every mutation is a plain
//! method call that returns the notices it produced. The actor in
//! [`crate::arena`] owns one and is the only caller at runtime, which gives
//! the "single active owner" guarantee; tests drive the machine directly,
//! tick by tick, with no runtime underneath.

use std::sync::Arc;

use cluework_protocol::{
    ArenaId, DeathCause, PlayerId, Role, RoundId, RoundResult, ScoreDelta, Weapon, Winner,
};
use cluework_roles::{assign, AssignError, MurdererHistory, RoleOptions};
use cluework_session::{IdentityResolver, Roster};
use cluework_tick::Countdown;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::{ArenaConfig, ArenaError, ArenaNotice, ArenaSnapshot, ArenaState, IntakeToken};

/// Score for a credited kill (murderer blade kill, or taking down the
/// murderer with the bow).
const KILL_SCORE: i64 = 100;

/// Bonus paid to every member of the winning side at round end.
const WIN_BONUS: i64 = 100;

/// Countdown seconds announced to subscribers during timed phases.
const MILESTONES: [u32; 7] = [15, 10, 5, 4, 3, 2, 1];

/// One arena's complete state and transition logic.
pub struct ArenaMachine {
    id: ArenaId,
    config: ArenaConfig,
    state: ArenaState,
    round: RoundId,
    roster: Roster,
    countdown: Countdown,
    history: MurdererHistory,
    resolver: Arc<dyn IdentityResolver>,
    rng: StdRng,
    detective_dead: bool,
    fake_detective_seated: bool,
    /// Murderer of the round currently being played or wound down. Pushed
    /// into the history when the arena resets.
    last_murderer: Option<PlayerId>,
    stale_events: u64,
}

impl ArenaMachine {
    pub fn new(id: ArenaId, config: ArenaConfig, resolver: Arc<dyn IdentityResolver>) -> Self {
        let config = config.validated();
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let history = MurdererHistory::new(config.murderer_history_depth);
        Self {
            id,
            config,
            state: ArenaState::Waiting,
            round: RoundId::default(),
            roster: Roster::new(),
            countdown: Countdown::idle(),
            history,
            resolver,
            rng,
            detective_dead: false,
            fake_detective_seated: false,
            last_murderer: None,
            stale_events: 0,
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn world(&self) -> &str {
        &self.config.world
    }

    pub fn state(&self) -> ArenaState {
        self.state
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    /// The token round-scoped events must currently carry.
    pub fn token(&self) -> IntakeToken {
        IntakeToken {
            state: self.state,
            round: self.round,
        }
    }

    // -----------------------------------------------------------------------
    // Intake operations
    // -----------------------------------------------------------------------

    /// Adds a player to the lobby.
    pub fn join(&mut self, player: PlayerId) -> Result<Vec<ArenaNotice>, ArenaError> {
        if !self.state.is_joinable() {
            return Err(ArenaError::InvalidTransition {
                action: "join",
                state: self.state,
            });
        }
        if self.roster.contains(player) {
            return Err(ArenaError::AlreadyJoined(player, self.id));
        }
        if self.roster.len() >= self.config.max_players {
            return Err(ArenaError::CapacityExceeded(self.id));
        }

        self.roster.insert(player);
        info!(
            arena_id = %self.id,
            %player,
            players = self.roster.len(),
            "player joined"
        );

        let mut notices = vec![ArenaNotice::PlayerJoined {
            arena: self.id,
            player,
            players: self.roster.len(),
        }];

        if self.state == ArenaState::Waiting && self.roster.len() >= self.config.min_players {
            self.set_state(ArenaState::Starting, &mut notices);
            self.countdown.reset(self.config.starting_countdown_secs);
            self.countdown.arm_all(&MILESTONES);
        }

        Ok(notices)
    }

    /// Removes a player.
    ///
    /// In the lobby phases the session is destroyed outright. While a round
    /// is live the session is detached instead: it stays in the roster, dead,
    /// so role accounting (and the round result) still covers the player.
    pub fn leave(&mut self, player: PlayerId) -> Result<Vec<ArenaNotice>, ArenaError> {
        if !self.roster.contains(player) {
            return Err(ArenaError::NotInArena(player, self.id));
        }

        let mut notices = Vec::new();
        match self.state {
            ArenaState::Waiting | ArenaState::Starting => {
                self.roster.remove(player);
                notices.push(ArenaNotice::PlayerLeft {
                    arena: self.id,
                    player,
                    players: self.roster.len(),
                });
                if self.state == ArenaState::Starting
                    && self.roster.len() < self.config.min_players
                {
                    self.set_state(ArenaState::Waiting, &mut notices);
                    self.countdown.clear();
                }
            }
            ArenaState::InGame | ArenaState::Ending | ArenaState::Restarting => {
                let session = self
                    .roster
                    .get_mut(player)
                    .ok_or(ArenaError::NotInArena(player, self.id))?;
                let role = session.role();
                session.mark_dead();
                notices.push(ArenaNotice::PlayerLeft {
                    arena: self.id,
                    player,
                    players: self.roster.len(),
                });
                if self.state == ArenaState::InGame {
                    if role == Role::Detective && !self.detective_dead {
                        self.detective_dead = true;
                        notices.push(ArenaNotice::DetectiveDown {
                            arena: self.id,
                            round: self.round,
                        });
                    }
                    self.check_win(&mut notices);
                }
            }
        }

        info!(
            arena_id = %self.id,
            %player,
            players = self.roster.len(),
            "player left"
        );
        Ok(notices)
    }

    /// Applies a death report.
    ///
    /// Idempotent for players already dead. Stale or out-of-phase reports
    /// are rejected without touching any state.
    pub fn death(
        &mut self,
        player: PlayerId,
        cause: DeathCause,
        token: IntakeToken,
    ) -> Result<Vec<ArenaNotice>, ArenaError> {
        self.check_token(token)?;
        if self.state != ArenaState::InGame {
            return Err(ArenaError::InvalidTransition {
                action: "apply a death",
                state: self.state,
            });
        }

        let victim_role = {
            let session = self
                .roster
                .get_mut(player)
                .ok_or(ArenaError::NotInArena(player, self.id))?;
            if !session.mark_dead() {
                debug!(arena_id = %self.id, %player, "duplicate death report ignored");
                return Ok(Vec::new());
            }
            session.role()
        };

        debug!(arena_id = %self.id, %player, role = %victim_role, ?cause, "player died");

        if let DeathCause::Slain { killer, weapon } = cause {
            self.credit_kill(killer, player, victim_role, weapon);
        }

        let mut notices = Vec::new();
        if victim_role == Role::Detective && !self.detective_dead {
            self.detective_dead = true;
            notices.push(ArenaNotice::DetectiveDown {
                arena: self.id,
                round: self.round,
            });
        }

        self.check_win(&mut notices);
        Ok(notices)
    }

    /// Records the platform's inventory stash reference for a player. The
    /// kit layer owns the stash itself; the session just remembers which one
    /// belongs to this player until they detach.
    pub fn stash_inventory(
        &mut self,
        player: PlayerId,
        stash: Option<u64>,
    ) -> Result<(), ArenaError> {
        let session = self
            .roster
            .get_mut(player)
            .ok_or(ArenaError::NotInArena(player, self.id))?;
        session.set_inventory_ref(stash);
        Ok(())
    }

    /// Answers whether a hit is allowed to deal lethal damage.
    ///
    /// Only the murderer's blade kills, and the bow kills for whoever holds
    /// it. Pure query: the platform applies (or cancels) the damage and
    /// reports any resulting death separately.
    pub fn damage(
        &mut self,
        attacker: PlayerId,
        victim: PlayerId,
        weapon: Weapon,
        token: IntakeToken,
    ) -> Result<bool, ArenaError> {
        self.check_token(token)?;
        if self.state != ArenaState::InGame {
            return Err(ArenaError::InvalidTransition {
                action: "apply damage",
                state: self.state,
            });
        }

        let both_alive = self
            .roster
            .get(attacker)
            .is_some_and(|s| s.is_alive())
            && self.roster.get(victim).is_some_and(|s| s.is_alive());
        if !both_alive || attacker == victim {
            return Ok(false);
        }

        let allowed = match weapon {
            Weapon::Blade => self
                .roster
                .get(attacker)
                .is_some_and(|s| s.role() == Role::Murderer),
            Weapon::Bow => true,
            Weapon::Other => false,
        };
        Ok(allowed)
    }

    /// Advances the arena by one second.
    pub fn tick_second(&mut self) -> Vec<ArenaNotice> {
        let Some(step) = self.countdown.tick() else {
            return Vec::new();
        };

        let mut notices: Vec<ArenaNotice> = step
            .fired
            .iter()
            .map(|&remaining| ArenaNotice::CountdownMilestone {
                arena: self.id,
                state: self.state,
                remaining,
            })
            .collect();

        if !step.expired {
            return notices;
        }

        match self.state {
            ArenaState::Starting => self.begin_round(&mut notices),
            // The round clock ran out with the murderer still standing:
            // the murderer takes the round by default.
            ArenaState::InGame => self.conclude(Winner::Murderer, &mut notices),
            ArenaState::Ending => {
                self.set_state(ArenaState::Restarting, &mut notices);
                // Roles are no longer live once the result display is over.
                for session in self.roster.sessions_mut() {
                    session.set_role(Role::None);
                }
                self.countdown.reset(self.config.restarting_delay_secs);
            }
            ArenaState::Restarting => self.reset_round(&mut notices),
            ArenaState::Waiting => {}
        }

        notices
    }

    /// External escape hatch: abandon whatever is happening and return to an
    /// empty lobby. Used by admin commands and registry shutdown.
    pub fn force_reset(&mut self) -> Vec<ArenaNotice> {
        warn!(arena_id = %self.id, state = %self.state, "arena force-reset");
        let mut notices = Vec::new();
        if self.state != ArenaState::Waiting {
            notices.push(ArenaNotice::StateChanged {
                arena: self.id,
                from: self.state,
                to: ArenaState::Waiting,
                round: self.round,
            });
            self.state = ArenaState::Waiting;
        }
        self.roster.clear();
        self.countdown.clear();
        self.detective_dead = false;
        self.fake_detective_seated = false;
        self.last_murderer = None;
        notices
    }

    /// A point-in-time copy of the observable state.
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            arena: self.id,
            name: self.config.name.clone(),
            state: self.state,
            round: self.round,
            remaining_secs: self.countdown.remaining(),
            min_players: self.config.min_players,
            max_players: self.config.max_players,
            players: self.roster.sessions().cloned().collect(),
            detective_dead: self.detective_dead,
            fake_detective_seated: self.fake_detective_seated,
            stale_events: self.stale_events,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_token(&mut self, token: IntakeToken) -> Result<(), ArenaError> {
        let current = self.token();
        if token != current {
            self.stale_events += 1;
            debug!(
                arena_id = %self.id,
                observed = %token,
                current = %current,
                dropped = self.stale_events,
                "stale event dropped"
            );
            return Err(ArenaError::StaleEvent {
                observed: token,
                current,
            });
        }
        Ok(())
    }

    fn set_state(&mut self, to: ArenaState, notices: &mut Vec<ArenaNotice>) {
        if !self.state.can_transition_to(to) {
            warn!(
                arena_id = %self.id,
                from = %self.state,
                %to,
                "invalid transition ignored"
            );
            return;
        }
        let from = self.state;
        self.state = to;
        info!(arena_id = %self.id, %from, %to, round = %self.round, "state changed");
        notices.push(ArenaNotice::StateChanged {
            arena: self.id,
            from,
            to,
            round: self.round,
        });
    }

    /// The Starting countdown expired: assign roles and open the round, or
    /// refuse and fall back to Waiting.
    fn begin_round(&mut self, notices: &mut Vec<ArenaNotice>) {
        let eligible: Vec<PlayerId> = self
            .roster
            .alive_players()
            .filter(|s| s.role() != Role::Spectator)
            .map(|s| s.player())
            .filter(|&p| self.resolver.is_online(p))
            .collect();

        let opts = RoleOptions {
            detective_enabled: self.config.detective_enabled,
            ..RoleOptions::default()
        };

        let assignment = match assign(&mut self.rng, &eligible, &self.history, &opts) {
            Ok(assignment) => assignment,
            Err(AssignError::InfeasiblePool { eligible, .. }) => {
                warn!(
                    arena_id = %self.id,
                    eligible,
                    "role assignment infeasible, returning to lobby"
                );
                self.set_state(ArenaState::Waiting, notices);
                self.countdown.clear();
                notices.push(ArenaNotice::AssignmentRefused {
                    arena: self.id,
                    eligible,
                });
                return;
            }
        };

        self.round = self.round.next();
        self.detective_dead = false;
        self.fake_detective_seated = assignment.fake_detective.is_some();
        self.last_murderer = Some(assignment.murderer);

        let roles = assignment.roles();
        for &(player, role) in &roles {
            if let Some(session) = self.roster.get_mut(player) {
                session.set_role(role);
            }
        }
        // Anyone in the roster but outside the eligibility snapshot (offline
        // at the draw) sits this round out.
        for session in self.roster.sessions_mut() {
            if session.role() == Role::None {
                session.set_role(Role::Spectator);
            }
        }

        info!(
            arena_id = %self.id,
            round = %self.round,
            players = roles.len(),
            "round started"
        );

        notices.push(ArenaNotice::RolesAssigned {
            arena: self.id,
            round: self.round,
            roles,
        });
        self.set_state(ArenaState::InGame, notices);
        self.countdown.reset(self.config.round_duration_secs);
        self.countdown.arm_all(&MILESTONES);
    }

    fn credit_kill(&mut self, killer: PlayerId, victim: PlayerId, victim_role: Role, weapon: Weapon) {
        if killer == victim {
            return;
        }
        let killer_is_murderer = self
            .roster
            .get(killer)
            .is_some_and(|s| s.role() == Role::Murderer);

        let credited = (killer_is_murderer && weapon == Weapon::Blade)
            || (victim_role == Role::Murderer && weapon == Weapon::Bow);
        if !credited {
            return;
        }
        if let Some(session) = self.roster.get_mut(killer) {
            session.credit_kill(KILL_SCORE);
        }
    }

    /// Evaluates the win conditions after a liveness mutation.
    fn check_win(&mut self, notices: &mut Vec<ArenaNotice>) {
        if self.state != ArenaState::InGame {
            return;
        }
        let murderer_alive = self.roster.murderer().is_some_and(|s| s.is_alive());
        let innocents_left = self.roster.innocents_left();

        let winner = match (murderer_alive, innocents_left) {
            (true, 1..) => return,
            (false, 1..) => Winner::Innocents,
            (true, 0) => Winner::Murderer,
            (false, 0) => Winner::Draw,
        };
        self.conclude(winner, notices);
    }

    /// Resolves the round: pays out, publishes the result, and moves to
    /// Ending. Any remaining round time is bypassed.
    fn conclude(&mut self, winner: Winner, notices: &mut Vec<ArenaNotice>) {
        debug_assert_eq!(self.state, ArenaState::InGame);

        for session in self.roster.sessions_mut() {
            let on_winning_side = match winner {
                Winner::Murderer => session.role() == Role::Murderer,
                Winner::Innocents => {
                    session.role().is_playing() && session.role() != Role::Murderer
                }
                Winner::Draw => false,
            };
            if on_winning_side {
                session.add_score(WIN_BONUS);
            }
        }

        let deltas: Vec<ScoreDelta> = self
            .roster
            .sessions()
            .filter(|s| s.role().is_playing())
            .map(|s| ScoreDelta {
                player: s.player(),
                role: s.role(),
                kills: s.kills(),
                score: s.score(),
            })
            .collect();

        let result = RoundResult {
            round: self.round,
            winner,
            deltas,
        };

        info!(arena_id = %self.id, round = %self.round, %winner, "round over");

        self.set_state(ArenaState::Ending, notices);
        self.countdown.reset(self.config.ending_delay_secs);
        notices.push(ArenaNotice::RoundEnded {
            arena: self.id,
            result,
        });
    }

    /// The Restarting delay expired: remember the murderer, drop every
    /// session, and reopen the lobby.
    fn reset_round(&mut self, notices: &mut Vec<ArenaNotice>) {
        if let Some(murderer) = self.last_murderer.take() {
            self.history.record(murderer);
        }
        self.roster.clear();
        self.detective_dead = false;
        self.fake_detective_seated = false;
        self.set_state(ArenaState::Waiting, notices);
        self.countdown.clear();
        info!(arena_id = %self.id, "arena reset, lobby open");
    }
}
