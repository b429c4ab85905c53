//! Accessible element snapshots produced by the UI introspection layer
//!
//! The narration engine never walks the UI itself; it consumes flat
//! [`AccessibleElement`] snapshots from a [`FocusProbe`] collaborator and
//! renders them to speech strings at the active verbosity level.

use serde::{Deserialize, Serialize};

/// A flat description of one focusable UI control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibleElement {
    /// Control role ("Button", "Slider", ...)
    pub role: String,

    /// Visible label
    pub name: String,

    /// Current value, if the control carries one
    pub value: String,

    /// State text ("checked", "disabled", ...)
    pub state: String,

    /// Usage hint, spoken only at the highest verbosity
    pub hint: String,

    /// Stable hierarchy path, used as the dedup key
    pub path: String,
}

impl Default for AccessibleElement {
    fn default() -> Self {
        Self {
            role: "Unknown".to_string(),
            name: String::new(),
            value: String::new(),
            state: String::new(),
            hint: String::new(),
            path: String::new(),
        }
    }
}

impl AccessibleElement {
    /// Create an element with the required role and name
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the current value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the state text
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the usage hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Set the hierarchy path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Render the element to a speech string.
    ///
    /// Verbosity gates the spoken fields: 1 speaks the name only, 2 adds the
    /// role, 3 adds the state, 4 adds the value, 5 adds the hint. With
    /// `include_diagnostics` the hierarchy path is appended at verbosity 5.
    pub fn to_speech_string(&self, verbosity: u8, include_diagnostics: bool) -> String {
        let mut parts: Vec<&str> = Vec::new();

        if !self.name.trim().is_empty() {
            parts.push(self.name.trim());
        }

        if verbosity >= 2 && !self.role.trim().is_empty() {
            parts.push(self.role.trim());
        }

        if verbosity >= 3 && !self.state.trim().is_empty() {
            parts.push(self.state.trim());
        }

        if verbosity >= 4 && !self.value.trim().is_empty() {
            parts.push(self.value.trim());
        }

        if verbosity >= 5 && !self.hint.trim().is_empty() {
            parts.push(self.hint.trim());
        }

        if include_diagnostics && verbosity >= 5 && !self.path.trim().is_empty() {
            parts.push(self.path.trim());
        }

        parts.join(", ")
    }
}

/// Introspection collaborator queried once per tick for the focused control
pub trait FocusProbe: Send + Sync {
    /// Snapshot of the currently focused element, if any
    fn focused_element(&self) -> Option<AccessibleElement>;

    /// Free-form summary of the visible screen, spoken on request
    fn screen_summary(&self) -> String {
        String::new()
    }

    /// Free-form summary of application status, spoken on request
    fn status_summary(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessibleElement {
        AccessibleElement::new("Button", "Start Game")
            .with_value("50%")
            .with_state("disabled")
            .with_hint("press enter to activate")
            .with_path("MainMenu/Start")
    }

    #[test]
    fn test_verbosity_gates_fields() {
        let element = sample();
        assert_eq!(element.to_speech_string(1, false), "Start Game");
        assert_eq!(element.to_speech_string(2, false), "Start Game, Button");
        assert_eq!(
            element.to_speech_string(3, false),
            "Start Game, Button, disabled"
        );
        assert_eq!(
            element.to_speech_string(4, false),
            "Start Game, Button, disabled, 50%"
        );
        assert_eq!(
            element.to_speech_string(5, false),
            "Start Game, Button, disabled, 50%, press enter to activate"
        );
    }

    #[test]
    fn test_diagnostics_appends_path_at_top_verbosity() {
        let element = sample();
        assert!(element.to_speech_string(5, true).ends_with("MainMenu/Start"));
        assert!(!element.to_speech_string(3, true).contains("MainMenu/Start"));
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let element = AccessibleElement::new("Button", "");
        assert_eq!(element.to_speech_string(5, false), "Button");
    }
}
