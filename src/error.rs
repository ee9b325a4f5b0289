//! Error types.
//!
//! Preconditions that are simply not met (no target, not enough energy,
//! cooldown still running) are *not* errors: effects report them through
//! [`EffectOutcome`](crate::effects::EffectOutcome). The types here cover
//! programming faults and misconfiguration only.

use thiserror::Error;

use crate::core::ActorId;

/// A fault raised from inside an effect.
///
/// The dispatcher catches these at its boundary, logs them once, and skips
/// the offending effect for the rest of the current dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// A collaborator the effect relies on is absent (e.g. unknown actor body).
    #[error("missing collaborator: {0}")]
    MissingCollaborator(String),

    /// A percentage parameter is outside its valid range or not finite.
    #[error("malformed percentage for {what}: {value}")]
    MalformedPercent { what: &'static str, value: f32 },

    /// Any other invalid effect parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A nested dispatch started by this effect was rejected.
    #[error("nested dispatch failed: {0}")]
    Nested(#[from] DispatchError),
}

/// Errors returned by the dispatch machinery itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Re-entrant dispatch went deeper than `EngineConfig::max_dispatch_depth`.
    #[error("dispatch depth {depth} exceeds maximum {max_depth} for {actor}")]
    DepthExceeded {
        actor: ActorId,
        depth: u8,
        max_depth: u8,
    },
}

/// Errors from effect registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("effect id must not be empty")]
    EmptyId,

    #[error("effect already registered: {0}")]
    Duplicate(String),
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} is {value}, above the limit of {max}")]
    TooLarge { field: &'static str, value: u64, max: u64 },
}

/// Failure to encode or decode persisted actor state.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),
}
