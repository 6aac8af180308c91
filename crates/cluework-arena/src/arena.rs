//! Arena actor: an isolated Tokio task that owns one [`ArenaMachine`].
//!
//! Each arena runs in its own task and is mutated only by draining its
//! command channel. Platform event handlers, admin commands, and queries all
//! enqueue; the actor applies them strictly serially, interleaved with its
//! own one-second ticks. That channel IS the event intake queue: enqueueing
//! never blocks a producer, and no producer ever holds a reference to arena
//! state.

use std::sync::Arc;

use cluework_protocol::{ArenaId, DeathCause, PlayerId, Weapon};
use cluework_session::IdentityResolver;
use cluework_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};

use crate::{ArenaConfig, ArenaError, ArenaMachine, ArenaNotice, ArenaSnapshot, IntakeToken};

/// Commands sent to an arena actor through its intake channel.
pub(crate) enum ArenaCommand {
    Join {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },
    /// A death report from the platform layer. Fire-and-forget: stale or
    /// malformed reports are dropped, never bounced.
    Death {
        player: PlayerId,
        cause: DeathCause,
        token: IntakeToken,
    },
    /// "May this hit deal lethal damage?" The platform waits for the verdict.
    Damage {
        attacker: PlayerId,
        victim: PlayerId,
        weapon: Weapon,
        token: IntakeToken,
        reply: oneshot::Sender<Result<bool, ArenaError>>,
    },
    /// Remember which stashed inventory belongs to a player.
    StashInventory {
        player: PlayerId,
        stash: Option<u64>,
    },
    Snapshot {
        reply: oneshot::Sender<ArenaSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<ArenaNotice>>,
    },
    ForceReset,
    Shutdown,
}

/// Handle to a running arena actor.
///
/// Cheap to clone (a channel sender plus identity); the registry hands these
/// out. Every method enqueues onto the actor's intake channel, so any number
/// of producers can call concurrently without touching arena state.
#[derive(Clone)]
pub struct ArenaHandle {
    id: ArenaId,
    name: Arc<str>,
    world: Arc<str>,
    sender: mpsc::UnboundedSender<ArenaCommand>,
}

impl ArenaHandle {
    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    /// Asks the arena to admit a player.
    pub async fn join(&self, player: PlayerId) -> Result<(), ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Join {
            player,
            reply: reply_tx,
        })?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable(self.id))?
    }

    /// Removes a player (voluntary quit or platform disconnect).
    pub async fn leave(&self, player: PlayerId) -> Result<(), ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Leave {
            player,
            reply: reply_tx,
        })?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable(self.id))?
    }

    /// Reports a death. Synchronous and non-blocking: the producer only
    /// enqueues, it never waits on the arena.
    pub fn report_death(
        &self,
        player: PlayerId,
        cause: DeathCause,
        token: IntakeToken,
    ) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Death {
            player,
            cause,
            token,
        })
    }

    /// Asks whether a hit may deal lethal damage.
    pub async fn report_damage(
        &self,
        attacker: PlayerId,
        victim: PlayerId,
        weapon: Weapon,
        token: IntakeToken,
    ) -> Result<bool, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Damage {
            attacker,
            victim,
            weapon,
            token,
            reply: reply_tx,
        })?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable(self.id))?
    }

    /// Records which stashed inventory belongs to a player. Fire-and-forget,
    /// like the stash operation itself on the platform side.
    pub fn stash_inventory(&self, player: PlayerId, stash: Option<u64>) -> Result<(), ArenaError> {
        self.send(ArenaCommand::StashInventory { player, stash })
    }

    /// Takes a point-in-time snapshot of the arena's observable state.
    pub async fn snapshot(&self) -> Result<ArenaSnapshot, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Snapshot { reply: reply_tx })?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable(self.id))
    }

    /// Subscribes to lifecycle notices. Each subscriber gets its own
    /// unbounded receiver; dropping it unsubscribes.
    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<ArenaNotice>, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Subscribe { reply: reply_tx })?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable(self.id))
    }

    /// Abandons the current round and reopens an empty lobby.
    pub fn force_reset(&self) -> Result<(), ArenaError> {
        self.send(ArenaCommand::ForceReset)
    }

    /// Tells the arena to shut down. Terminal: pending commands are drained
    /// and discarded, sessions released, the tick stopped.
    pub fn shutdown(&self) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Shutdown)
    }

    fn send(&self, cmd: ArenaCommand) -> Result<(), ArenaError> {
        self.sender
            .send(cmd)
            .map_err(|_| ArenaError::Unavailable(self.id))
    }
}

/// The actor loop state.
struct ArenaActor {
    machine: ArenaMachine,
    receiver: mpsc::UnboundedReceiver<ArenaCommand>,
    scheduler: TickScheduler,
    subscribers: Vec<mpsc::UnboundedSender<ArenaNotice>>,
}

impl ArenaActor {
    async fn run(mut self) {
        tracing::info!(arena_id = %self.machine.id(), name = self.machine.name(), "arena started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(ArenaCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = self.scheduler.wait_for_tick() => {
                    let notices = self.machine.tick_second();
                    self.publish(notices);
                }
            }
        }

        // Terminal teardown: refuse new commands, discard whatever is still
        // queued (their reply channels drop, so callers see Unavailable),
        // and release every session.
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
        self.machine.force_reset();
        self.subscribers.clear();

        tracing::info!(arena_id = %self.machine.id(), "arena stopped");
    }

    fn handle_command(&mut self, cmd: ArenaCommand) {
        match cmd {
            ArenaCommand::Join { player, reply } => {
                let result = self.machine.join(player);
                match result {
                    Ok(notices) => {
                        let _ = reply.send(Ok(()));
                        self.publish(notices);
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                    }
                }
            }
            ArenaCommand::Leave { player, reply } => {
                let result = self.machine.leave(player);
                match result {
                    Ok(notices) => {
                        let _ = reply.send(Ok(()));
                        self.publish(notices);
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                    }
                }
            }
            ArenaCommand::Death {
                player,
                cause,
                token,
            } => match self.machine.death(player, cause, token) {
                Ok(notices) => self.publish(notices),
                Err(err) => {
                    tracing::debug!(
                        arena_id = %self.machine.id(),
                        %player,
                        %err,
                        "death report dropped"
                    );
                }
            },
            ArenaCommand::Damage {
                attacker,
                victim,
                weapon,
                token,
                reply,
            } => {
                let _ = reply.send(self.machine.damage(attacker, victim, weapon, token));
            }
            ArenaCommand::StashInventory { player, stash } => {
                if let Err(err) = self.machine.stash_inventory(player, stash) {
                    tracing::debug!(
                        arena_id = %self.machine.id(),
                        %player,
                        %err,
                        "inventory stash dropped"
                    );
                }
            }
            ArenaCommand::Snapshot { reply } => {
                let _ = reply.send(self.machine.snapshot());
            }
            ArenaCommand::Subscribe { reply } => {
                let (tx, rx) = mpsc::unbounded_channel();
                if reply.send(rx).is_ok() {
                    self.subscribers.push(tx);
                }
            }
            ArenaCommand::ForceReset => {
                let notices = self.machine.force_reset();
                self.publish(notices);
            }
            // Handled by the loop.
            ArenaCommand::Shutdown => {}
        }
    }

    /// Fans notices out to subscribers, pruning the ones that hung up.
    fn publish(&mut self, notices: Vec<ArenaNotice>) {
        if notices.is_empty() || self.subscribers.is_empty() {
            return;
        }
        self.subscribers
            .retain(|sub| notices.iter().all(|n| sub.send(n.clone()).is_ok()));
    }
}

/// Spawns an arena actor and returns the handle to reach it.
pub(crate) fn spawn_arena(
    id: ArenaId,
    config: ArenaConfig,
    resolver: Arc<dyn IdentityResolver>,
    tick_config: TickConfig,
) -> ArenaHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let name: Arc<str> = config.name.as_str().into();
    let world: Arc<str> = config.world.as_str().into();

    let actor = ArenaActor {
        machine: ArenaMachine::new(id, config, resolver),
        receiver: rx,
        scheduler: TickScheduler::new(tick_config),
        subscribers: Vec::new(),
    };
    tokio::spawn(actor.run());

    ArenaHandle {
        id,
        name,
        world,
        sender: tx,
    }
}
