//! Effect registration and dispatch.
//!
//! ## Design Philosophy
//!
//! The host event layer calls one entry point, `SynergyEngine::dispatch`,
//! for every tick, damage or kill occurrence. The engine owns effect
//! ordering and fault isolation; effects own their own relevance checks.
//!
//! - `EffectRegistry`: effects in ascending priority, stable on ties
//! - `EffectDispatcher`: applies an ordered list against one context
//! - `World`: actor states plus the boxed collaborators effects reach
//! - `SynergyEngine`: registry + world, time, lifecycle, persistence
//!
//! No effect fault propagates out of a dispatch. Faults are logged and the
//! effect is skipped; depth overflow aborts only the nested dispatch.

pub mod dispatcher;
pub mod engine;
pub mod registry;
pub mod world;

pub use dispatcher::{DispatchReport, DispatchRequest, EffectDispatcher};
pub use engine::{effect_refs, MaintenanceOutcome, SynergyEngine, TickReport};
pub use registry::EffectRegistry;
pub use world::World;
