//! In-memory store of named profiles with change notification
//!
//! Persistence and file watching are host concerns; the store only owns the
//! profile list, the active selection, and the subscriber list.

use crate::policy::PolicyProfile;
use crate::{NarratorError, Result};
use parking_lot::Mutex;
use tracing::info;

/// Callback invoked with a snapshot of the newly active profile.
///
/// Listeners run with the store lock held and must not call back into the
/// store.
pub type ProfileListener = Box<dyn Fn(&PolicyProfile) + Send>;

/// Named profile list plus the active selection
pub struct ProfileStore {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    profiles: Vec<PolicyProfile>,
    active: String,
    listeners: Vec<ProfileListener>,
}

impl ProfileStore {
    /// Create a store holding a single default profile
    pub fn new() -> Self {
        let mut profile = PolicyProfile::default();
        profile.normalize();
        let active = profile.name.clone();
        Self {
            inner: Mutex::new(StoreInner {
                profiles: vec![profile],
                active,
                listeners: Vec::new(),
            }),
        }
    }

    /// Create a store from an explicit profile list and active name
    pub fn with_profiles(profiles: Vec<PolicyProfile>, active: &str) -> Result<Self> {
        let store = Self {
            inner: Mutex::new(StoreInner {
                profiles: Vec::new(),
                active: String::new(),
                listeners: Vec::new(),
            }),
        };

        {
            let mut inner = store.inner.lock();
            for mut profile in profiles {
                profile.normalize();
                inner.profiles.push(profile);
            }
            if inner.profiles.is_empty() {
                inner.profiles.push(PolicyProfile::default());
            }
            let found = find_profile(&inner.profiles, active)
                .ok_or_else(|| {
                    NarratorError::ConfigError(format!("Unknown profile: {}", active))
                })?
                .name
                .clone();
            inner.active = found;
        }

        Ok(store)
    }

    /// Snapshot of the active profile
    pub fn active(&self) -> PolicyProfile {
        let inner = self.inner.lock();
        find_profile(&inner.profiles, &inner.active)
            .cloned()
            .unwrap_or_default()
    }

    /// Switch the active profile by name (case-insensitive).
    ///
    /// Fails without touching state when no profile carries that name.
    pub fn set_active(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let profile = find_profile(&inner.profiles, name)
            .cloned()
            .ok_or_else(|| NarratorError::ConfigError(format!("Unknown profile: {}", name)))?;

        inner.active = profile.name.clone();
        info!("Active profile switched to '{}'", profile.name);
        notify(&inner, &profile);
        Ok(())
    }

    /// Replace a profile by name, or add it when the name is new.
    ///
    /// Editing the active profile re-notifies subscribers with the new
    /// snapshot.
    pub fn upsert_profile(&self, mut profile: PolicyProfile) {
        profile.normalize();
        let mut inner = self.inner.lock();

        let position = inner
            .profiles
            .iter()
            .position(|existing| existing.name.eq_ignore_ascii_case(&profile.name));
        match position {
            Some(index) => inner.profiles[index] = profile.clone(),
            None => inner.profiles.push(profile.clone()),
        }

        if inner.active.eq_ignore_ascii_case(&profile.name) {
            notify(&inner, &profile);
        }
    }

    /// Names of all stored profiles, in insertion order
    pub fn profile_names(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner.profiles.iter().map(|p| p.name.clone()).collect()
    }

    /// Register a change callback invoked on every activation or active edit
    pub fn subscribe(&self, listener: ProfileListener) {
        self.inner.lock().listeners.push(listener);
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

fn find_profile<'a>(profiles: &'a [PolicyProfile], name: &str) -> Option<&'a PolicyProfile> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    profiles
        .iter()
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
}

fn notify(inner: &StoreInner, profile: &PolicyProfile) {
    for listener in &inner.listeners {
        listener(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn two_profile_store() -> ProfileStore {
        ProfileStore::with_profiles(
            vec![PolicyProfile::named("Default"), PolicyProfile::named("Quiet")],
            "Default",
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_profile_switch_fails_unchanged() {
        let store = two_profile_store();
        let result = store.set_active("Missing");
        assert!(result.is_err());
        assert_eq!(store.active().name, "Default");
    }

    #[test]
    fn test_switch_notifies_subscribers() {
        let store = two_profile_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(Box::new(move |profile| {
            assert_eq!(profile.name, "Quiet");
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        store.set_active("quiet").unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(store.active().name, "Quiet");
    }

    #[test]
    fn test_upsert_active_profile_renotifies() {
        let store = two_profile_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(Box::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let mut edited = PolicyProfile::named("Default");
        edited.verbosity = 5;
        store.upsert_profile(edited);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(store.active().verbosity, 5);
    }

    #[test]
    fn test_upsert_new_profile_does_not_notify() {
        let store = two_profile_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(Box::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        store.upsert_profile(PolicyProfile::named("Verbose"));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(store.profile_names().len(), 3);
    }
}
