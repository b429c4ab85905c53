//! Narration: turning raw UI/state notices into deduplicated speech requests
//!
//! This module provides:
//! - [`NarrationEvent`] and its category taxonomy
//! - [`NarrationEngine`], the settle / debounce / dedup state machine

pub mod engine;
pub mod event;

// Re-export commonly used types
pub use engine::{EnginePolicyHandle, NarrationEngine};
pub use event::{NarrationCategory, NarrationEvent, GLOBAL_DEDUP_KEY};
