//! Lazily populated map of actor states.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::{ActorId, EngineConfig};

use super::actor::ActorState;

/// Owns every `ActorState`. Entries appear on first access and leave only
/// through `remove`, which hosts call when an actor leaves the world.
#[derive(Debug)]
pub struct ActorStateStore {
    states: FxHashMap<ActorId, ActorState>,
    config: EngineConfig,
}

impl ActorStateStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            states: FxHashMap::default(),
            config,
        }
    }

    /// Get the state for `actor`, creating it on first access.
    pub fn get_or_create(&mut self, actor: ActorId) -> &mut ActorState {
        let config = &self.config;
        self.states.entry(actor).or_insert_with(|| {
            debug!(actor = %actor, "creating actor state");
            ActorState::new(actor, config)
        })
    }

    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorState> {
        self.states.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut ActorState> {
        self.states.get_mut(&actor)
    }

    /// Insert a state built elsewhere (e.g. restored from a snapshot).
    pub fn insert(&mut self, state: ActorState) -> Option<ActorState> {
        self.states.insert(state.actor(), state)
    }

    /// Lifecycle hook: drop everything known about `actor`.
    pub fn remove(&mut self, actor: ActorId) -> Option<ActorState> {
        let removed = self.states.remove(&actor);
        if removed.is_some() {
            debug!(actor = %actor, "removed actor state");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, actor: ActorId) -> bool {
        self.states.contains_key(&actor)
    }

    /// Tracked actors in ascending id order.
    #[must_use]
    pub fn actors(&self) -> Vec<ActorId> {
        let mut actors: Vec<_> = self.states.keys().copied().collect();
        actors.sort_unstable();
        actors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
