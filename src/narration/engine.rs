//! Narration engine: settle, debounce and dedup ahead of the scheduler
//!
//! Per tick the engine derives the focused element from the introspection
//! collaborator and applies the settle delay that absorbs rapid focus churn;
//! independently it drains the producer event queue, passing each event
//! through the same dedup step without the settle delay. At most one speech
//! request per processed event reaches the scheduler.

use crate::element::{AccessibleElement, FocusProbe};
use crate::narration::{NarrationCategory, NarrationEvent};
use crate::policy::{CategoryPolicies, PolicyProfile};
use crate::speech::SpeechScheduler;
use crate::{NarratorError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Dedup map size past which stale entries are swept on insert
const DEDUP_SWEEP_THRESHOLD: usize = 512;

/// Age past which a dedup entry is considered stale
const DEDUP_MAX_AGE: Duration = Duration::from_secs(600);

/// Last utterance spoken for one (category, key) pair
struct DedupRecord {
    utterance: String,
    spoken_at: Instant,
    verbosity: u8,
}

struct PendingFocus {
    element: AccessibleElement,
    since: Instant,
}

/// Policy fields the engine reads each tick
struct EnginePolicy {
    verbosity: u8,
    categories: CategoryPolicies,
}

/// Cloneable handle the profile-change subscription writes through
#[derive(Clone)]
pub struct EnginePolicyHandle {
    shared: Arc<Mutex<EnginePolicy>>,
}

impl EnginePolicyHandle {
    /// Adopt a profile's verbosity and category tables
    pub fn apply_profile(&self, profile: &PolicyProfile) {
        let mut policy = self.shared.lock();
        policy.verbosity = profile.verbosity.clamp(1, 5);
        policy.categories = profile.categories.clone();
    }
}

/// Settle / debounce / dedup state machine feeding the speech scheduler
pub struct NarrationEngine {
    scheduler: SpeechScheduler,
    policy: Arc<Mutex<EnginePolicy>>,
    event_tx: Sender<NarrationEvent>,
    event_rx: Receiver<NarrationEvent>,
    last_spoken: HashMap<(NarrationCategory, String), DedupRecord>,
    pending_focus: Option<PendingFocus>,
    announced: Option<AccessibleElement>,
    announced_verbosity: u8,
}

impl NarrationEngine {
    /// Create an engine that submits accepted utterances to `scheduler`
    pub fn new(scheduler: SpeechScheduler) -> Self {
        let (event_tx, event_rx) = unbounded();
        let policy = Arc::new(Mutex::new(EnginePolicy {
            verbosity: 3,
            categories: CategoryPolicies::default(),
        }));
        let announced_verbosity = policy.lock().verbosity;

        Self {
            scheduler,
            policy,
            event_tx,
            event_rx,
            last_spoken: HashMap::new(),
            pending_focus: None,
            announced: None,
            announced_verbosity,
        }
    }

    /// Handle used to push profile changes into the engine
    pub fn policy_handle(&self) -> EnginePolicyHandle {
        EnginePolicyHandle {
            shared: Arc::clone(&self.policy),
        }
    }

    /// Cloneable sender producers use to queue events for the next drain
    pub fn event_sender(&self) -> Sender<NarrationEvent> {
        self.event_tx.clone()
    }

    /// Queue an event for the next drain
    pub fn submit_event(&self, event: NarrationEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|e| NarratorError::ChannelError(format!("Failed to submit event: {}", e)))
    }

    /// Process one tick at the current time
    pub fn tick(&mut self, probe: &dyn FocusProbe) {
        self.tick_at(probe, Instant::now());
    }

    /// Process one tick at an explicit time; public for temporal tests
    pub fn tick_at(&mut self, probe: &dyn FocusProbe, now: Instant) {
        let focused = probe.focused_element();
        self.handle_focus(focused, now);
        self.drain_queued(now);
    }

    fn drain_queued(&mut self, now: Instant) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.emit(event, false, now);
        }
    }

    fn handle_focus(&mut self, focused: Option<AccessibleElement>, now: Instant) {
        let Some(element) = focused.filter(|e| !e.path.trim().is_empty()) else {
            self.pending_focus = None;
            self.announced = None;
            return;
        };

        let matches_pending = self
            .pending_focus
            .as_ref()
            .map_or(false, |pending| pending.element.path == element.path);
        if !matches_pending {
            // Focus moved again; restart the settle window on the new path
            self.pending_focus = Some(PendingFocus {
                element,
                since: now,
            });
            return;
        }

        let (settle, verbosity) = {
            let policy = self.policy.lock();
            (
                policy.categories.get(NarrationCategory::Ui).debounce(),
                policy.verbosity,
            )
        };
        let since = self.pending_focus.as_ref().map_or(now, |p| p.since);
        if now.duration_since(since) < settle {
            return;
        }

        let focus_changed = self.announced.as_ref() != Some(&element);
        let verbosity_changed = verbosity != self.announced_verbosity;
        if !focus_changed && !verbosity_changed {
            return;
        }

        let event = NarrationEvent::element(NarrationCategory::Ui, element.clone())
            .with_interrupt(true)
            .with_diagnostics(true);
        self.emit(event, verbosity_changed, now);
        self.announced = Some(element);
        self.announced_verbosity = verbosity;
    }

    /// Dedup and hand off one event; `force` bypasses the debounce window
    fn emit(&mut self, event: NarrationEvent, force: bool, now: Instant) {
        let (setting, verbosity) = {
            let policy = self.policy.lock();
            (policy.categories.get(event.category).clone(), policy.verbosity)
        };
        if !setting.enabled {
            return;
        }

        let utterance = match &event.element {
            Some(element) => element.to_speech_string(verbosity, event.include_diagnostics),
            None => event.message.trim().to_string(),
        };
        if utterance.is_empty() {
            return;
        }

        let key = (event.category, event.dedup_key());
        if !force {
            if let Some(record) = self.last_spoken.get(&key) {
                let unchanged = record.utterance == utterance;
                let within_debounce = now.duration_since(record.spoken_at) < setting.debounce();
                if unchanged && within_debounce {
                    debug!("Dropped duplicate utterance for {:?}/{}", key.0, key.1);
                    return;
                }
            }
        }

        self.scheduler
            .speak(&utterance, event.priority, event.interrupt);
        self.insert_record(
            key,
            DedupRecord {
                utterance,
                spoken_at: now,
                verbosity,
            },
            now,
        );
    }

    fn insert_record(
        &mut self,
        key: (NarrationCategory, String),
        record: DedupRecord,
        now: Instant,
    ) {
        if self.last_spoken.len() >= DEDUP_SWEEP_THRESHOLD {
            self.last_spoken
                .retain(|_, existing| now.duration_since(existing.spoken_at) < DEDUP_MAX_AGE);
        }
        self.last_spoken.insert(key, record);
    }
}
