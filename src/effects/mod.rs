//! Effects: composable, prioritized units of gameplay behavior.
//!
//! ## Design Philosophy
//!
//! The engine doesn't know what "lifesteal" or "overclock" means. It knows
//! the `Effect` trait: an id, a priority, and `apply` against an
//! `EffectContext`. Everything else is an implementation of that trait:
//!
//! - Built-in variants for the common shapes (damage scaling, healing,
//!   energy transfer, timed buffs, max-health shifts, rewinds)
//! - Wrappers that gate another effect (`CooldownGate`, `EnergyCost`, `Chance`)
//! - `Synergy`, which runs inner effects when a module combination is active
//! - `FnEffect`, for anything else
//!
//! There is exactly one call convention. Data an effect needs beyond the
//! fixed context fields travels in the context's custom data.

pub mod builtin;
pub mod condition;
pub mod context;
pub mod effect;
pub mod event;
pub mod synergy;

pub use builtin::{
    CancelEvent, Chance, ComboCounter, CooldownGate, DamageMultiplier, DamageReduction, EnergyCost,
    EnergyGain, Heal, MaxHealthShift, RejectionShift, Rewind, RewindFallback, TimedBuff, COMBO_KEY,
    ENERGY_ADDED_KEY, HEALED_KEY,
};
pub use condition::Condition;
pub use context::EffectContext;
pub use effect::{Effect, EffectOutcome, EffectResult, FnEffect, DEFAULT_PRIORITY};
pub use event::{CustomData, CustomValue, EventHandle, EventKind, EventTypeId, HostEvent};
pub use synergy::Synergy;
