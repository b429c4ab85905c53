//! Hot-reloadable narration policy
//!
//! A [`PolicyProfile`] parameterizes both the narration engine (per-category
//! enable flags and debounce windows, verbosity) and the speech scheduler
//! (interrupt policy, backend mode). Profiles live in a [`ProfileStore`]
//! which notifies subscribers whenever the active profile changes.

pub mod profile;
pub mod store;

pub use profile::{
    BackendKind, BackendMode, CategoryPolicies, CategoryPolicy, PolicyProfile,
    DEFAULT_DEBOUNCE_MS,
};
pub use store::ProfileStore;
