//! Speech output: backend contract and the priority-preemptive scheduler
//!
//! This module provides:
//! - The [`SpeechBackend`] capability contract adapters implement
//! - The [`SpeechScheduler`] owning the single active-utterance slot

pub mod backend;
pub mod scheduler;

// Re-export commonly used types
pub use backend::{BackendFactory, NullBackend, SpeechBackend, TraceBackend};
pub use scheduler::{
    BackendProbe, CompletionHandle, SchedulerDiagnostics, SpeechPriority, SpeechScheduler,
    SELF_TEST_UTTERANCE,
};
