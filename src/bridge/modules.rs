//! Read-only view of the modules an actor has installed.
//!
//! Modules (the capabilities whose combinations form synergies) are
//! installed, levelled and toggled by another subsystem. The engine queries
//! them once per dispatch through `ModuleView`. Module ids are compared
//! upper-cased.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::ActorId;

/// Normalize a module id for comparison.
pub fn normalize_module_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// A module installed on an actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModule {
    /// Upper-cased module id.
    pub id: String,
    pub level: u32,
    /// Inactive modules are installed but switched off.
    pub active: bool,
}

impl InstalledModule {
    pub fn new(id: &str, level: u32) -> Self {
        Self {
            id: normalize_module_id(id),
            level,
            active: true,
        }
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Read-only module query surface.
pub trait ModuleView {
    fn installed(&self, actor: ActorId) -> Vec<InstalledModule>;

    /// Level of an installed module, 0 when absent.
    fn level(&self, actor: ActorId, module_id: &str) -> u32 {
        let id = normalize_module_id(module_id);
        self.installed(actor)
            .into_iter()
            .find(|m| m.id == id)
            .map_or(0, |m| m.level)
    }

    fn is_active(&self, actor: ActorId, module_id: &str) -> bool {
        let id = normalize_module_id(module_id);
        self.installed(actor).iter().any(|m| m.active && m.id == id)
    }

    /// Ids of all active modules. Queried once per dispatch.
    fn active_module_ids(&self, actor: ActorId) -> FxHashSet<String> {
        self.installed(actor)
            .into_iter()
            .filter(|m| m.active)
            .map(|m| m.id)
            .collect()
    }
}

/// In-memory `ModuleView`.
#[derive(Clone, Debug, Default)]
pub struct InstalledModules {
    by_actor: FxHashMap<ActorId, Vec<InstalledModule>>,
}

impl InstalledModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or re-level) a module. Re-installing replaces the old entry.
    pub fn install(&mut self, actor: ActorId, module: InstalledModule) {
        let modules = self.by_actor.entry(actor).or_default();
        match modules.iter_mut().find(|m| m.id == module.id) {
            Some(existing) => *existing = module,
            None => modules.push(module),
        }
    }

    #[must_use]
    pub fn with_module(mut self, actor: ActorId, module_id: &str, level: u32) -> Self {
        self.install(actor, InstalledModule::new(module_id, level));
        self
    }

    pub fn uninstall(&mut self, actor: ActorId, module_id: &str) -> bool {
        let id = normalize_module_id(module_id);
        let Some(modules) = self.by_actor.get_mut(&actor) else {
            return false;
        };
        let before = modules.len();
        modules.retain(|m| m.id != id);
        modules.len() != before
    }

    pub fn set_active(&mut self, actor: ActorId, module_id: &str, active: bool) -> bool {
        let id = normalize_module_id(module_id);
        match self
            .by_actor
            .get_mut(&actor)
            .and_then(|modules| modules.iter_mut().find(|m| m.id == id))
        {
            Some(module) => {
                module.active = active;
                true
            }
            None => false,
        }
    }

    /// Number of active modules, used for upkeep.
    #[must_use]
    pub fn active_count(&self, actor: ActorId) -> u64 {
        self.by_actor
            .get(&actor)
            .map_or(0, |modules| modules.iter().filter(|m| m.active).count() as u64)
    }
}

impl ModuleView for InstalledModules {
    fn installed(&self, actor: ActorId) -> Vec<InstalledModule> {
        self.by_actor.get(&actor).cloned().unwrap_or_default()
    }
}
