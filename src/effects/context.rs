//! The data bag handed to every effect invocation.
//!
//! One `EffectContext` is shared by every effect in a dispatch. Its event
//! kind, actor, target, original amount and active module set are fixed for
//! the whole pass. Effects communicate through the two mutable channels:
//! the custom data bag and the host event (amount and cancellation).
//!
//! The context also borrows the engine world, so an effect can reach its
//! actor's state, the energy economy, the host's actors, and (within the
//! configured depth) start a nested dispatch.

use rustc_hash::FxHashSet;
use tracing::error;

use crate::bridge::{normalize_module_id, ActorHost, ModuleView, ResourceBridge};
use crate::core::{ActorId, EngineConfig, GameClock, GameRng, MAX_DISPATCH_DEPTH};
use crate::dispatch::dispatcher::{DispatchFrame, DispatchReport, DispatchRequest, EffectDispatcher};
use crate::dispatch::registry::EffectRegistry;
use crate::dispatch::world::World;
use crate::error::{DispatchError, EffectError};
use crate::state::{ActorState, HistorySnapshot};

use super::event::{CustomData, CustomValue, EventHandle, EventKind};

/// Context for one dispatch pass.
pub struct EffectContext<'a> {
    kind: EventKind,
    actor: ActorId,
    target: Option<ActorId>,
    original_amount: f32,
    active_modules: FxHashSet<String>,
    custom_data: CustomData,
    event: &'a mut dyn EventHandle,
    world: &'a mut World,
    registry: &'a EffectRegistry,
    frame: &'a mut DispatchFrame,
}

impl<'a> EffectContext<'a> {
    pub(crate) fn new(
        request: DispatchRequest,
        event: &'a mut dyn EventHandle,
        world: &'a mut World,
        registry: &'a EffectRegistry,
        frame: &'a mut DispatchFrame,
    ) -> Self {
        let active_modules = world.modules.active_module_ids(request.actor);
        Self {
            kind: request.kind,
            actor: request.actor,
            target: request.target,
            original_amount: request.amount,
            active_modules,
            custom_data: request.custom_data,
            event,
            world,
            registry,
            frame,
        }
    }

    // === Fixed for the dispatch ===

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The subject of the dispatch.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    #[must_use]
    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// The amount as the host reported it, before any effect touched it.
    #[must_use]
    pub fn original_amount(&self) -> f32 {
        self.original_amount
    }

    /// Upper-cased ids of the actor's active modules, queried at dispatch start.
    #[must_use]
    pub fn active_modules(&self) -> &FxHashSet<String> {
        &self.active_modules
    }

    #[must_use]
    pub fn has_module(&self, module_id: &str) -> bool {
        self.active_modules.contains(&normalize_module_id(module_id))
    }

    #[must_use]
    pub fn module_level(&self, module_id: &str) -> u32 {
        self.world.modules.level(self.actor, module_id)
    }

    /// Nesting depth; the root dispatch is 0.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.frame.depth
    }

    // === Custom data ===

    #[must_use]
    pub fn custom(&self, key: &str) -> Option<&CustomValue> {
        self.custom_data.get(key)
    }

    /// True only for a stored `Bool(true)`.
    #[must_use]
    pub fn custom_flag(&self, key: &str) -> bool {
        self.custom(key).and_then(CustomValue::as_bool).unwrap_or(false)
    }

    /// Store a value. Last write wins.
    pub fn set_custom(&mut self, key: &str, value: impl Into<CustomValue>) {
        self.custom_data.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    // === Host event ===

    #[must_use]
    pub fn amount(&self) -> f32 {
        self.event.amount()
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.event.set_amount(amount);
    }

    /// Cancel the event. Lower-priority effects in this dispatch are skipped.
    pub fn cancel(&mut self) {
        self.event.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.event.is_cancelled()
    }

    // === World access ===

    /// The actor's state, created on first access.
    pub fn state(&mut self) -> &mut ActorState {
        self.world.states.get_or_create(self.actor)
    }

    /// Another actor's state (usually the target's), created on first access.
    pub fn state_of(&mut self, actor: ActorId) -> &mut ActorState {
        self.world.states.get_or_create(actor)
    }

    /// The actor's state if it already exists. Never creates one.
    #[must_use]
    pub fn existing_state(&self) -> Option<&ActorState> {
        self.world.states.get(self.actor)
    }

    pub fn resources(&mut self) -> &mut dyn ResourceBridge {
        self.world.resources.as_mut()
    }

    pub fn host(&mut self) -> &mut dyn ActorHost {
        self.world.host.as_mut()
    }

    #[must_use]
    pub fn modules(&self) -> &dyn ModuleView {
        self.world.modules.as_ref()
    }

    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.world.rng
    }

    #[must_use]
    pub fn clock(&self) -> GameClock {
        self.world.clock
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.world.clock.now_ms()
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.world.clock.tick()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.world.config()
    }

    // === State shortcuts ===

    pub fn is_on_cooldown(&mut self, id: &str) -> bool {
        let now = self.now_ms();
        self.state().cooldowns.is_on_cooldown(id, now)
    }

    pub fn set_cooldown(&mut self, id: &str, duration_ms: u64) {
        let now = self.now_ms();
        self.state().cooldowns.set_cooldown(id, duration_ms, now);
    }

    pub fn is_state_active(&mut self, id: &str) -> bool {
        let tick = self.tick();
        self.state().timed.is_active(id, tick)
    }

    /// History entry `ticks_ago` ticks before the current tick.
    pub fn history_snapshot(&mut self, ticks_ago: u64) -> Option<HistorySnapshot> {
        let tick = self.tick();
        self.state().history.snapshot_at(ticks_ago, tick).copied()
    }

    /// Add to the actor's max-health ledger and re-apply its modifier.
    pub fn add_max_health_percent(&mut self, delta: f32) -> Result<f32, EffectError> {
        let actor = self.actor;
        let World { states, host, .. } = &mut *self.world;
        states.get_or_create(actor).max_health.add_percent(delta, actor, host.as_mut())
    }

    // === Fault bookkeeping ===

    pub(crate) fn is_faulted(&self, id: &str) -> bool {
        self.frame.faulted.contains(id)
    }

    /// Returns true the first time `id` is marked in this root dispatch.
    pub(crate) fn mark_faulted(&mut self, id: &str) -> bool {
        self.frame.faulted.insert(id.to_string())
    }

    // === Nested dispatch ===

    /// A request for `kind` on `actor` that inherits this dispatch's custom data.
    #[must_use]
    pub fn nested_request(&self, kind: EventKind, actor: ActorId) -> DispatchRequest {
        DispatchRequest::new(kind, actor).with_custom_data(self.custom_data.clone())
    }

    /// Dispatch registered effects for another event from inside an effect.
    ///
    /// Faults recorded in the enclosing dispatch carry over. Cancelling the
    /// nested event does not cancel this one. Going deeper than
    /// `max_dispatch_depth` (never more than `MAX_DISPATCH_DEPTH`) aborts
    /// only the nested dispatch; the first overflow per actor is logged.
    pub fn dispatch_nested(
        &mut self,
        request: DispatchRequest,
        event: &mut dyn EventHandle,
    ) -> Result<DispatchReport, DispatchError> {
        let max_depth = self.world.config().max_dispatch_depth.min(MAX_DISPATCH_DEPTH);
        if self.frame.depth >= max_depth {
            let depth = self.frame.depth.saturating_add(1);
            let state = self.world.states.get_or_create(self.actor);
            if !state.overflow_reported {
                state.overflow_reported = true;
                error!(
                    actor = %self.actor,
                    depth,
                    max_depth,
                    kind = %request.kind,
                    "dispatch depth exceeded; aborting nested dispatch"
                );
            }
            return Err(DispatchError::DepthExceeded {
                actor: self.actor,
                depth,
                max_depth,
            });
        }

        let depth = self.frame.depth + 1;
        let registry = self.registry;
        let effects = registry.ordered_effects();
        self.frame.depth = depth;
        let report = {
            let mut nested = EffectContext::new(request, event, &mut *self.world, registry, &mut *self.frame);
            EffectDispatcher::run(&effects, &mut nested)
        };
        self.frame.depth = depth - 1;
        Ok(report)
    }
}
