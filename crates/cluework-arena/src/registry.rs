//! Arena registry: creates, tracks, and routes lookups to arenas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use cluework_protocol::ArenaId;
use cluework_session::IdentityResolver;
use cluework_tick::TickConfig;

use crate::arena::spawn_arena;
use crate::{ArenaConfig, ArenaError, ArenaHandle};

/// Owns every arena on the server.
///
/// Lookups clone handles out from behind a read lock, so event translation
/// and presentation layers can resolve arenas concurrently; registration and
/// removal are rare and take the write lock. There is no registry-level
/// coupling between arenas: each handle leads to an independent actor.
pub struct ArenaRegistry {
    arenas: RwLock<HashMap<ArenaId, ArenaHandle>>,
    next_id: AtomicU64,
    resolver: Arc<dyn IdentityResolver>,
    tick_config: TickConfig,
}

impl ArenaRegistry {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self::with_tick_config(resolver, TickConfig::default())
    }

    pub fn with_tick_config(resolver: Arc<dyn IdentityResolver>, tick_config: TickConfig) -> Self {
        Self {
            arenas: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            resolver,
            tick_config,
        }
    }

    /// Builds a registry and registers every configured arena, the server
    /// start path.
    pub fn from_configs(
        resolver: Arc<dyn IdentityResolver>,
        configs: impl IntoIterator<Item = ArenaConfig>,
    ) -> Result<Self, ArenaError> {
        let registry = Self::new(resolver);
        for config in configs {
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// Spawns a new arena from its configuration.
    pub fn register(&self, config: ArenaConfig) -> Result<ArenaHandle, ArenaError> {
        let mut arenas = self.arenas.write().expect("registry lock poisoned");
        if arenas.values().any(|h| h.name() == config.name) {
            return Err(ArenaError::NameTaken(config.name));
        }

        let id = ArenaId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_arena(
            id,
            config,
            Arc::clone(&self.resolver),
            self.tick_config.clone(),
        );
        arenas.insert(id, handle.clone());
        tracing::info!(arena_id = %id, name = handle.name(), "arena registered");
        Ok(handle)
    }

    pub fn get(&self, id: ArenaId) -> Option<ArenaHandle> {
        self.arenas
            .read()
            .expect("registry lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Looks an arena up by its configured name.
    pub fn find_by_name(&self, name: &str) -> Option<ArenaHandle> {
        self.arenas
            .read()
            .expect("registry lock poisoned")
            .values()
            .find(|h| h.name() == name)
            .cloned()
    }

    /// Looks an arena up by the world it occupies.
    pub fn find_by_world(&self, world: &str) -> Option<ArenaHandle> {
        self.arenas
            .read()
            .expect("registry lock poisoned")
            .values()
            .find(|h| h.world() == world)
            .cloned()
    }

    /// Cloned handles to every registered arena.
    pub fn handles(&self) -> Vec<ArenaHandle> {
        self.arenas
            .read()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<ArenaId> {
        self.arenas
            .read()
            .expect("registry lock poisoned")
            .keys()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arenas.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes an arena and shuts its actor down. Terminal for that arena:
    /// queued events are discarded and all sessions released.
    pub fn remove(&self, id: ArenaId) -> Result<(), ArenaError> {
        let handle = self
            .arenas
            .write()
            .expect("registry lock poisoned")
            .remove(&id)
            .ok_or(ArenaError::NotFound(id))?;
        let _ = handle.shutdown();
        tracing::info!(arena_id = %id, "arena removed");
        Ok(())
    }

    /// Shuts every arena down, the server stop path.
    pub fn shutdown_all(&self) {
        let mut arenas = self.arenas.write().expect("registry lock poisoned");
        for (id, handle) in arenas.drain() {
            let _ = handle.shutdown();
            tracing::debug!(arena_id = %id, "arena shut down");
        }
    }
}
