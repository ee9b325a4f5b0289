//! Everything effects can reach besides the registry.

use tracing::debug;

use crate::bridge::{ActorHost, ModuleView, ResourceBridge};
use crate::core::{ActorId, EngineConfig, GameClock, GameRng};
use crate::state::{ActorStateStore, ExpiredState, ExpiryScope, HistorySnapshot};

/// Actor states, the boxed collaborators, clock and RNG.
pub struct World {
    pub(crate) states: ActorStateStore,
    pub(crate) resources: Box<dyn ResourceBridge>,
    pub(crate) modules: Box<dyn ModuleView>,
    pub(crate) host: Box<dyn ActorHost>,
    pub(crate) clock: GameClock,
    pub(crate) rng: GameRng,
}

impl World {
    pub fn new(
        config: EngineConfig,
        resources: Box<dyn ResourceBridge>,
        modules: Box<dyn ModuleView>,
        host: Box<dyn ActorHost>,
    ) -> Self {
        let rng = GameRng::new(config.rng_seed);
        Self {
            states: ActorStateStore::new(config),
            resources,
            modules,
            host,
            clock: GameClock::default(),
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.states.config()
    }

    #[must_use]
    pub fn states(&self) -> &ActorStateStore {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut ActorStateStore {
        &mut self.states
    }

    #[must_use]
    pub fn resources(&self) -> &dyn ResourceBridge {
        self.resources.as_ref()
    }

    pub fn resources_mut(&mut self) -> &mut dyn ResourceBridge {
        self.resources.as_mut()
    }

    #[must_use]
    pub fn modules(&self) -> &dyn ModuleView {
        self.modules.as_ref()
    }

    /// Swap the module view, e.g. after the host rebuilt its module index.
    pub fn set_modules(&mut self, modules: Box<dyn ModuleView>) {
        self.modules = modules;
    }

    #[must_use]
    pub fn host(&self) -> &dyn ActorHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn ActorHost {
        self.host.as_mut()
    }

    #[must_use]
    pub fn clock(&self) -> GameClock {
        self.clock
    }

    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Record the actor's current position and health into its history and
    /// update its standing-still counter. Returns false if the host has no body.
    pub fn record_history(&mut self, actor: ActorId) -> bool {
        let (Some(position), Some(health)) = (self.host.position(actor), self.host.health(actor)) else {
            return false;
        };
        let tick = self.clock.tick();
        let epsilon = self.config().standing_epsilon;
        let state = self.states.get_or_create(actor);
        state.history.record(HistorySnapshot::new(tick, position, health));
        state.update_standing(position, epsilon);
        true
    }

    /// Remove the actor's expired timed states and run their callbacks.
    ///
    /// Returns the expired ids in sweep order.
    pub fn sweep_timed_states(&mut self, actor: ActorId) -> Vec<String> {
        let tick = self.clock.tick();
        let now_ms = self.clock.now_ms();
        let World { states, host, resources, .. } = self;
        let Some(state) = states.get_mut(actor) else {
            return Vec::new();
        };

        let expired = state.timed.sweep(tick);
        let mut ids = Vec::with_capacity(expired.len());
        for ExpiredState { id, on_expire, .. } in expired {
            debug!(actor = %actor, state_id = %id, tick, "timed state expired");
            if let Some(callback) = on_expire {
                let mut scope = ExpiryScope {
                    actor,
                    tick,
                    now_ms,
                    state: &mut *state,
                    host: host.as_mut(),
                    resources: resources.as_mut(),
                };
                callback(&mut scope);
            }
            ids.push(id);
        }
        ids
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("actors", &self.states.len())
            .field("clock", &self.clock)
            .finish()
    }
}
