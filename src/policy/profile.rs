//! Profile data model: verbosity, per-category debounce, backend selection

use crate::narration::NarrationCategory;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default debounce window applied to every category
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// A concrete speech backend the scheduler can be pointed at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Route through a running screen reader
    ScreenReader,

    /// Use an installed speech synthesizer
    Synthesizer,
}

/// How the scheduler picks its backend on profile application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendMode {
    /// Probe registered backends in declared order, adopt the first available
    Auto,

    /// Probe exactly the named backend, fall back to silence if unavailable
    Fixed(BackendKind),
}

impl Default for BackendMode {
    fn default() -> Self {
        BackendMode::Auto
    }
}

/// Enable flag and debounce window for one narration category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// Whether events in this category are spoken at all
    pub enabled: bool,

    /// Minimum gap before an identical utterance for the same key repeats
    pub debounce_ms: u64,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl CategoryPolicy {
    /// Debounce window as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Per-category policy table, replaced wholesale on profile change
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPolicies {
    pub hud: CategoryPolicy,
    pub inventory: CategoryPolicy,
    pub ui: CategoryPolicy,
    pub world: CategoryPolicy,
    pub combat: CategoryPolicy,
    pub dialog: CategoryPolicy,
    pub notifications: CategoryPolicy,
}

impl CategoryPolicies {
    /// Look up the policy for a category
    pub fn get(&self, category: NarrationCategory) -> &CategoryPolicy {
        match category {
            NarrationCategory::Hud => &self.hud,
            NarrationCategory::Inventory => &self.inventory,
            NarrationCategory::Ui => &self.ui,
            NarrationCategory::World => &self.world,
            NarrationCategory::Combat => &self.combat,
            NarrationCategory::Dialog => &self.dialog,
            NarrationCategory::Notifications => &self.notifications,
        }
    }

    /// Mutable lookup, used by hosts editing a profile in place
    pub fn get_mut(&mut self, category: NarrationCategory) -> &mut CategoryPolicy {
        match category {
            NarrationCategory::Hud => &mut self.hud,
            NarrationCategory::Inventory => &mut self.inventory,
            NarrationCategory::Ui => &mut self.ui,
            NarrationCategory::World => &mut self.world,
            NarrationCategory::Combat => &mut self.combat,
            NarrationCategory::Dialog => &mut self.dialog,
            NarrationCategory::Notifications => &mut self.notifications,
        }
    }
}

/// One named narration profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyProfile {
    /// Profile name, unique within a store (case-insensitive)
    pub name: String,

    /// Spoken detail level, 1 (name only) through 5 (everything)
    pub verbosity: u8,

    /// Per-category enable and debounce table
    pub categories: CategoryPolicies,

    /// Whether a strictly more urgent request may cut off the current one
    pub allow_priority_preemption: bool,

    /// Backend selection mode
    pub backend_mode: BackendMode,
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            verbosity: 3,
            categories: CategoryPolicies::default(),
            allow_priority_preemption: true,
            backend_mode: BackendMode::Auto,
        }
    }
}

impl PolicyProfile {
    /// Create a named profile with default policy
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Clamp fields into their valid ranges after deserialization or edits
    pub fn normalize(&mut self) {
        if self.name.trim().is_empty() {
            self.name = "Default".to_string();
        }
        self.verbosity = self.verbosity.clamp(1, 5);
    }
}
