//! Narration events submitted by producers
//!
//! An event carries either a structured element snapshot or a literal
//! message. Events are transient: created by a producer, consumed by exactly
//! one engine pass, never persisted.

use crate::element::AccessibleElement;
use crate::speech::SpeechPriority;
use serde::{Deserialize, Serialize};

/// Dedup key used when an event carries no path and no message
pub const GLOBAL_DEDUP_KEY: &str = "Global";

/// Source category of a narration event; each carries its own policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NarrationCategory {
    Hud,
    Inventory,
    Ui,
    World,
    Combat,
    Dialog,
    Notifications,
}

/// One notice competing for the audio channel
#[derive(Clone, Debug)]
pub struct NarrationEvent {
    pub category: NarrationCategory,

    /// Structured content; takes precedence over `message` when present
    pub element: Option<AccessibleElement>,

    /// Literal content, spoken trimmed
    pub message: String,

    pub priority: SpeechPriority,

    /// Cut off the in-progress utterance when this one is accepted
    pub interrupt: bool,

    /// Render diagnostic detail (element path) at top verbosity
    pub include_diagnostics: bool,

    /// Explicit dedup path for events without an element
    pub element_path: String,
}

impl NarrationEvent {
    /// Event carrying a literal message
    pub fn message(category: NarrationCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            element: None,
            message: message.into(),
            priority: SpeechPriority::Normal,
            interrupt: false,
            include_diagnostics: false,
            element_path: String::new(),
        }
    }

    /// Event carrying a structured element snapshot
    pub fn element(category: NarrationCategory, element: AccessibleElement) -> Self {
        Self {
            category,
            element: Some(element),
            message: String::new(),
            priority: SpeechPriority::Normal,
            interrupt: false,
            include_diagnostics: false,
            element_path: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: SpeechPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_interrupt(mut self, interrupt: bool) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_diagnostics(mut self, include_diagnostics: bool) -> Self {
        self.include_diagnostics = include_diagnostics;
        self
    }

    /// Set an explicit dedup path for message events
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.element_path = path.into();
        self
    }

    /// Resolve the dedup key: element path, explicit path, message text,
    /// then the category-wide fallback key
    pub fn dedup_key(&self) -> String {
        if let Some(element) = &self.element {
            if !element.path.trim().is_empty() {
                return element.path.clone();
            }
        }
        if !self.element_path.trim().is_empty() {
            return self.element_path.clone();
        }
        if !self.message.trim().is_empty() {
            return self.message.trim().to_string();
        }
        GLOBAL_DEDUP_KEY.to_string()
    }
}
