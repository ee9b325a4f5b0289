//! Host-facing engine facade.
//!
//! The host's event layer calls `dispatch` for each tick, damage and kill
//! occurrence, and `tick_actor` once per actor per simulation step for
//! housekeeping. Nothing here blocks: cooldowns and timed states are polled
//! and swept, never waited on.
//!
//! ```
//! use rust_synergy::bridge::{EnergyPool, InstalledModules, SimulatedActors};
//! use rust_synergy::core::{ActorId, EngineConfig, Position};
//! use rust_synergy::dispatch::{DispatchRequest, SynergyEngine};
//! use rust_synergy::effects::{DamageReduction, EventHandle, EventKind, HostEvent};
//!
//! let actor = ActorId::new(1);
//! let mut engine = SynergyEngine::new(
//!     EngineConfig::default(),
//!     Box::new(EnergyPool::new().with_account(actor, 500, 1_000)),
//!     Box::new(InstalledModules::new().with_module(actor, "armor", 1)),
//!     Box::new(SimulatedActors::new().with_actor(actor, Position::default(), 20.0)),
//! )
//! .unwrap();
//!
//! engine.register_effect(Box::new(DamageReduction::new("plating", 25.0))).unwrap();
//!
//! let mut event = HostEvent::new(8.0);
//! let report = engine.dispatch(
//!     DispatchRequest::new(EventKind::IncomingDamage, actor).with_amount(8.0),
//!     &mut event,
//! );
//! assert_eq!(report.applied, 1);
//! assert_eq!(event.amount(), 6.0);
//! ```

use smallvec::SmallVec;
use tracing::debug;

use crate::bridge::{ActorHost, ModuleView, ResourceBridge};
use crate::core::{ActorId, EngineConfig, GameRng, GameRngState};
use crate::effects::{Effect, EffectContext, EventHandle, EventKind, HostEvent};
use crate::error::{ConfigError, RegistryError};
use crate::state::{ActorState, ActorStateSnapshot};

use super::dispatcher::{DispatchFrame, DispatchReport, DispatchRequest, EffectDispatcher};
use super::registry::EffectRegistry;
use super::world::World;

/// Result of `SynergyEngine::charge_maintenance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    /// Nothing active, nothing charged.
    Idle,
    /// Upkeep paid.
    Charged(u64),
    /// Not enough energy; nothing consumed. The host should switch modules off.
    Insufficient { needed: u64, available: u64 },
}

/// What `tick_actor` did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Whether a history entry was recorded.
    pub recorded: bool,
    /// Timed states that expired this tick.
    pub expired: Vec<String>,
    /// The `Tick` dispatch, when this tick was a dispatch tick.
    pub dispatch: Option<DispatchReport>,
}

/// Registry plus world: the single entry point for the host.
pub struct SynergyEngine {
    registry: EffectRegistry,
    world: World,
}

impl SynergyEngine {
    pub fn new(
        config: EngineConfig,
        resources: Box<dyn ResourceBridge>,
        modules: Box<dyn ModuleView>,
        host: Box<dyn ActorHost>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: EffectRegistry::new(),
            world: World::new(config, resources, modules, host),
        })
    }

    #[must_use]
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.world.config()
    }

    // === Registration ===

    pub fn register_effect(&mut self, effect: Box<dyn Effect>) -> Result<(), RegistryError> {
        self.registry.register(effect)
    }

    pub fn unregister_effect(&mut self, id: &str) -> Option<Box<dyn Effect>> {
        self.registry.unregister(id)
    }

    pub fn set_effect_enabled(&mut self, id: &str, enabled: bool) -> bool {
        self.registry.set_enabled(id, enabled)
    }

    // === Dispatch ===

    /// Apply every enabled registered effect to this event.
    pub fn dispatch(&mut self, request: DispatchRequest, event: &mut dyn EventHandle) -> DispatchReport {
        let effects = self.registry.ordered_effects();
        Self::run_root(&self.registry, &mut self.world, &effects, request, event, false)
    }

    /// Apply an explicit list of effects, sorted by priority first.
    ///
    /// Nested dispatches started by these effects still go through the registry.
    pub fn dispatch_effects(
        &mut self,
        effects: &[&dyn Effect],
        request: DispatchRequest,
        event: &mut dyn EventHandle,
    ) -> DispatchReport {
        Self::run_root(&self.registry, &mut self.world, effects, request, event, true)
    }

    fn run_root(
        registry: &EffectRegistry,
        world: &mut World,
        effects: &[&dyn Effect],
        request: DispatchRequest,
        event: &mut dyn EventHandle,
        sort: bool,
    ) -> DispatchReport {
        let mut frame = DispatchFrame::root();
        let mut ctx = EffectContext::new(request, event, world, registry, &mut frame);
        if sort {
            EffectDispatcher::dispatch(effects, &mut ctx)
        } else {
            EffectDispatcher::run(effects, &mut ctx)
        }
    }

    // === Time ===

    pub fn set_time(&mut self, tick: u64, now_ms: u64) {
        self.world.clock.set(tick, now_ms);
    }

    /// Advance one tick of `ms_per_tick`.
    pub fn advance_tick(&mut self) -> u64 {
        let ms = self.world.config().ms_per_tick;
        self.world.clock.advance(ms);
        self.world.clock.tick()
    }

    /// Per-actor housekeeping for the current tick.
    ///
    /// Records history, decays rejection, expires the combo, purges stale
    /// cooldowns, sweeps timed states (running their callbacks) and, every
    /// `tick_dispatch_interval` ticks, dispatches `Tick`.
    pub fn tick_actor(&mut self, actor: ActorId) -> TickReport {
        let clock = self.world.clock;
        let decay = self.world.config().rejection_decay_per_tick;
        let interval = self.world.config().tick_dispatch_interval.max(1);

        let recorded = self.world.record_history(actor);
        {
            let state = self.world.states.get_or_create(actor);
            state.rejection.decay(decay);
            state.expire_combo(clock.now_ms());
            state.cooldowns.purge_expired(clock.now_ms());
        }
        let expired = self.world.sweep_timed_states(actor);

        let dispatch = if clock.tick() % interval == 0 {
            let mut event = HostEvent::passive();
            Some(self.dispatch(DispatchRequest::new(EventKind::Tick, actor), &mut event))
        } else {
            None
        };

        TickReport {
            tick: clock.tick(),
            recorded,
            expired,
            dispatch,
        }
    }

    // === Lifecycle ===

    /// Drop all state for an actor that left the world.
    pub fn remove_actor(&mut self, actor: ActorId) -> bool {
        self.world.states.remove(actor).is_some()
    }

    #[must_use]
    pub fn actor_state(&self, actor: ActorId) -> Option<&ActorState> {
        self.world.states.get(actor)
    }

    pub fn actor_state_mut(&mut self, actor: ActorId) -> &mut ActorState {
        self.world.states.get_or_create(actor)
    }

    // === Upkeep ===

    /// Charge upkeep for `active_count` active modules. All or nothing.
    pub fn charge_maintenance(&mut self, actor: ActorId, active_count: u64) -> MaintenanceOutcome {
        let needed = self.world.config().maintenance.cost_for(active_count);
        if needed == 0 {
            return MaintenanceOutcome::Idle;
        }
        let outcome = if self.world.resources.consume_energy(actor, needed) {
            MaintenanceOutcome::Charged(needed)
        } else {
            MaintenanceOutcome::Insufficient {
                needed,
                available: self.world.resources.current_energy(actor),
            }
        };
        debug!(actor = %actor, active_count, ?outcome, "maintenance charged");
        outcome
    }

    // === Persistence ===

    #[must_use]
    pub fn snapshot_actor(&self, actor: ActorId) -> Option<ActorStateSnapshot> {
        self.world.states.get(actor).map(|state| state.snapshot(self.world.clock))
    }

    /// Replace the actor's state with a restored one and re-apply its ledger
    /// modifier on the host.
    pub fn restore_actor(&mut self, snapshot: &ActorStateSnapshot) {
        let state = ActorState::restore(snapshot, self.world.config(), self.world.clock);
        let actor = state.actor();
        state.max_health.apply(actor, self.world.host.as_mut());
        self.world.states.insert(state);
    }

    /// Position of the shared RNG, for saving alongside actor snapshots.
    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.world.rng.state()
    }

    /// Resume chance rolls from a saved position.
    pub fn restore_rng(&mut self, state: &GameRngState) {
        self.world.rng = GameRng::from_state(state);
    }
}

impl std::fmt::Debug for SynergyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynergyEngine")
            .field("registry", &self.registry)
            .field("world", &self.world)
            .finish()
    }
}

/// Collect effects from a slice of boxes for `dispatch_effects`.
pub fn effect_refs(effects: &[Box<dyn Effect>]) -> SmallVec<[&dyn Effect; 16]> {
    effects.iter().map(|e| e.as_ref()).collect()
}
