//! Priority-preemptive speech scheduler
//!
//! Serializes every utterance in the process onto one backend. All state
//! (pending queue, speaking flag, current priority, last-spoken text, active
//! backend) sits behind a single mutex; every entry point — [`speak`],
//! [`stop`], [`try_repeat_last`], [`apply_profile`], backend completion —
//! takes that lock for its full critical section and never waits on the
//! backend inside it.
//!
//! [`speak`]: SpeechScheduler::speak
//! [`stop`]: SpeechScheduler::stop
//! [`try_repeat_last`]: SpeechScheduler::try_repeat_last
//! [`apply_profile`]: SpeechScheduler::apply_profile

use crate::policy::{BackendKind, BackendMode, PolicyProfile};
use crate::speech::backend::{BackendFactory, NullBackend, SpeechBackend};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Spoken once through the normal `speak` path on the first successful
/// profile application in a scheduler's lifetime
pub const SELF_TEST_UTTERANCE: &str = "Narration ready";

/// Urgency of a speech request; variants are ordered most urgent first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SpeechPriority {
    Critical,
    High,
    Normal,
    Low,
}

/// One queued utterance
struct SpeechRequest {
    text: String,
    priority: SpeechPriority,
}

/// Availability result for one probed backend
#[derive(Clone, Debug, Serialize)]
pub struct BackendProbe {
    pub kind: BackendKind,
    pub available: bool,
}

/// Read-only snapshot of the current backend selection
#[derive(Clone, Debug, Serialize)]
pub struct SchedulerDiagnostics {
    pub mode: BackendMode,
    pub backend_name: String,
    pub available: bool,
    pub probes: Vec<BackendProbe>,
    pub details: String,
}

impl Default for SchedulerDiagnostics {
    fn default() -> Self {
        Self {
            mode: BackendMode::Auto,
            backend_name: "NullBackend".to_string(),
            available: false,
            probes: Vec::new(),
            details: "No speech backend available.".to_string(),
        }
    }
}

struct SchedulerInner {
    queue: VecDeque<SpeechRequest>,
    is_speaking: bool,
    current_priority: SpeechPriority,
    last_spoken: Option<String>,
    allow_priority_preemption: bool,
    backend_mode: BackendMode,
    backend: Box<dyn SpeechBackend>,
    has_self_tested: bool,
    diagnostics: SchedulerDiagnostics,
}

struct SchedulerShared {
    inner: Mutex<SchedulerInner>,
    factories: Vec<BackendFactory>,
}

/// Handle a backend raises when an utterance finishes playing.
///
/// Carries a weak reference to the scheduler, so a detached backend raising
/// a stale completion after a backend swap is a no-op rather than a crash.
#[derive(Clone)]
pub struct CompletionHandle {
    shared: Weak<SchedulerShared>,
}

impl CompletionHandle {
    /// Mark the current utterance complete and drain the next queued item.
    ///
    /// Must be raised from the backend's own execution context, never from
    /// inside `speak`.
    pub fn notify_complete(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        inner.is_speaking = false;
        drain_locked(&mut inner);
    }
}

/// Cloneable handle to the single speech scheduler instance
#[derive(Clone)]
pub struct SpeechScheduler {
    shared: Arc<SchedulerShared>,
}

impl SpeechScheduler {
    /// Create a scheduler over the registered backend factories.
    ///
    /// The factory order is the automatic-mode fallback chain. The scheduler
    /// starts on the silent fallback until the first profile application.
    pub fn new(factories: Vec<BackendFactory>) -> Self {
        Self {
            shared: Arc::new(SchedulerShared {
                inner: Mutex::new(SchedulerInner {
                    queue: VecDeque::new(),
                    is_speaking: false,
                    current_priority: SpeechPriority::Normal,
                    last_spoken: None,
                    allow_priority_preemption: true,
                    backend_mode: BackendMode::Auto,
                    backend: Box::new(NullBackend::new()),
                    has_self_tested: false,
                    diagnostics: SchedulerDiagnostics::default(),
                }),
                factories,
            }),
        }
    }

    /// Submit an utterance.
    ///
    /// Whitespace-only text and total backend unavailability are silent
    /// no-ops. Otherwise the text is recorded as the last spoken utterance,
    /// the current utterance is preempted when the interrupt flag is set or
    /// a strictly more urgent request arrives under a preemption-friendly
    /// policy, and the request is queued at its priority position. Returns
    /// as soon as the decision is made, never when speech finishes.
    pub fn speak(&self, text: &str, priority: SpeechPriority, interrupt: bool) {
        let mut inner = self.shared.inner.lock();
        speak_locked(&mut inner, text, priority, interrupt);
    }

    /// Drop the pending queue and cancel in-flight speech.
    ///
    /// The last spoken utterance stays recorded for [`try_repeat_last`].
    ///
    /// [`try_repeat_last`]: SpeechScheduler::try_repeat_last
    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        stop_locked(&mut inner);
    }

    /// Re-speak the last recorded utterance at normal priority, interrupting.
    ///
    /// Returns false when no utterance has ever been accepted.
    pub fn try_repeat_last(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        let Some(text) = inner.last_spoken.clone() else {
            return false;
        };
        speak_locked(&mut inner, &text, SpeechPriority::Normal, true);
        true
    }

    /// Whether the selected backend currently reports available
    pub fn is_available(&self) -> bool {
        self.shared.inner.lock().backend.is_available()
    }

    /// The last accepted utterance, if any
    pub fn last_spoken(&self) -> Option<String> {
        self.shared.inner.lock().last_spoken.clone()
    }

    /// Snapshot of the current backend selection for external reporting
    pub fn diagnostics(&self) -> SchedulerDiagnostics {
        self.shared.inner.lock().diagnostics.clone()
    }

    /// Apply a profile: adopt its interrupt policy and reselect the backend.
    ///
    /// Stops current speech, clears the queue, releases the old backend,
    /// probes per the profile's backend mode and attaches completion to the
    /// adopted backend. The first application in this scheduler's lifetime
    /// speaks one self-test utterance through the normal `speak` path.
    pub fn apply_profile(&self, profile: &PolicyProfile) {
        let mut inner = self.shared.inner.lock();
        inner.allow_priority_preemption = profile.allow_priority_preemption;
        inner.backend_mode = profile.backend_mode;
        info!(
            "Applying profile '{}' (backend mode {:?})",
            profile.name, profile.backend_mode
        );

        self.apply_backend_locked(&mut inner);

        if !inner.has_self_tested {
            inner.has_self_tested = true;
            speak_locked(&mut inner, SELF_TEST_UTTERANCE, SpeechPriority::Normal, true);
        }
    }

    fn completion_handle(&self) -> CompletionHandle {
        CompletionHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn apply_backend_locked(&self, inner: &mut SchedulerInner) {
        stop_locked(inner);
        inner.backend.set_completion_handle(None);
        inner.backend = Box::new(NullBackend::new());

        let mut probes = Vec::new();
        let mut selected: Option<Box<dyn SpeechBackend>> = None;

        for factory in &self.shared.factories {
            let wanted = match inner.backend_mode {
                BackendMode::Auto => true,
                BackendMode::Fixed(kind) => factory.kind() == kind,
            };
            if !wanted {
                continue;
            }

            let candidate = factory.create();
            let available = candidate.is_available();
            probes.push(BackendProbe {
                kind: factory.kind(),
                available,
            });
            if available && selected.is_none() {
                selected = Some(candidate);
            }
        }

        let mut backend = selected.unwrap_or_else(|| Box::new(NullBackend::new()));
        backend.set_completion_handle(Some(self.completion_handle()));

        info!(
            "Speech backend selected: {} (available={})",
            backend.name(),
            backend.is_available()
        );

        inner.diagnostics = SchedulerDiagnostics {
            mode: inner.backend_mode,
            backend_name: backend.name().to_string(),
            available: backend.is_available(),
            probes,
            details: backend.diagnostics(),
        };
        inner.backend = backend;
    }
}

fn speak_locked(
    inner: &mut SchedulerInner,
    text: &str,
    priority: SpeechPriority,
    interrupt: bool,
) {
    if text.trim().is_empty() {
        return;
    }
    if !inner.backend.is_available() {
        debug!("Dropping utterance, no backend available: {}", text);
        return;
    }

    inner.last_spoken = Some(text.to_string());
    debug!(?priority, interrupt, "speak: {}", text);

    let preempt = interrupt
        || (inner.allow_priority_preemption && priority < inner.current_priority);
    if inner.is_speaking && preempt {
        stop_locked(inner);
    }

    enqueue(inner, text, priority);
    drain_locked(inner);
}

/// Stable priority insertion: before the first strictly less urgent entry
fn enqueue(inner: &mut SchedulerInner, text: &str, priority: SpeechPriority) {
    let request = SpeechRequest {
        text: text.to_string(),
        priority,
    };
    let index = inner
        .queue
        .iter()
        .position(|existing| priority < existing.priority);
    match index {
        Some(index) => inner.queue.insert(index, request),
        None => inner.queue.push_back(request),
    }
}

/// Work-loop form of "dispatch next": runs until speaking or empty.
///
/// Non-notifying backends are treated as immediately complete, which makes
/// this loop dispatch their queue back-to-back without recursion.
fn drain_locked(inner: &mut SchedulerInner) {
    while !inner.is_speaking {
        let Some(request) = inner.queue.pop_front() else {
            break;
        };
        inner.is_speaking = true;
        inner.current_priority = request.priority;

        if let Err(error) = inner.backend.speak(&request.text) {
            warn!("Backend speak failed: {}", error);
            inner.is_speaking = false;
            continue;
        }

        if !inner.backend.notifies_completion() {
            inner.is_speaking = false;
        }
    }
}

fn stop_locked(inner: &mut SchedulerInner) {
    inner.queue.clear();
    if let Err(error) = inner.backend.stop() {
        warn!("Backend stop failed: {}", error);
    }
    inner.is_speaking = false;
}
