//! Top-level wiring of engine, scheduler, policy store and command bus
//!
//! A [`Narrator`] is the single object a host embeds: it owns the narration
//! engine and speech scheduler, keeps both subscribed to the profile store,
//! and registers the default command handlers. Producers interact through
//! cloned event senders and the public `speak`/`stop`/`dispatch` surface.

use crate::commands::{Command, CommandBus};
use crate::element::FocusProbe;
use crate::narration::{NarrationEngine, NarrationEvent};
use crate::policy::ProfileStore;
use crate::speech::{
    BackendFactory, SchedulerDiagnostics, SpeechPriority, SpeechScheduler,
};
use crate::Result;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Narration system facade
pub struct Narrator {
    scheduler: SpeechScheduler,
    engine: Mutex<NarrationEngine>,
    bus: Mutex<CommandBus>,
    probe: Arc<dyn FocusProbe>,
    store: Arc<ProfileStore>,
}

impl Narrator {
    /// Build and wire the narration system.
    ///
    /// Subscribes engine and scheduler to the store, applies the active
    /// profile (which selects the backend and triggers the one-time
    /// self-test utterance) and registers the default command handlers.
    pub fn new(
        probe: Arc<dyn FocusProbe>,
        factories: Vec<BackendFactory>,
        store: Arc<ProfileStore>,
    ) -> Self {
        let scheduler = SpeechScheduler::new(factories);
        let engine = NarrationEngine::new(scheduler.clone());
        let policy_handle = engine.policy_handle();

        {
            let scheduler = scheduler.clone();
            let policy_handle = policy_handle.clone();
            store.subscribe(Box::new(move |profile| {
                policy_handle.apply_profile(profile);
                scheduler.apply_profile(profile);
            }));
        }

        let profile = store.active();
        policy_handle.apply_profile(&profile);
        scheduler.apply_profile(&profile);

        let narrator = Self {
            scheduler,
            engine: Mutex::new(engine),
            bus: Mutex::new(CommandBus::new()),
            probe,
            store,
        };
        narrator.register_default_handlers();
        narrator
    }

    fn register_default_handlers(&self) {
        let mut bus = self.bus.lock();

        let scheduler = self.scheduler.clone();
        bus.register(Command::StopSpeech, move || scheduler.stop());

        let scheduler = self.scheduler.clone();
        bus.register(Command::RepeatLast, move || {
            if !scheduler.try_repeat_last() {
                info!("Nothing to repeat yet");
            }
        });

        let scheduler = self.scheduler.clone();
        let probe = Arc::clone(&self.probe);
        bus.register(Command::ReadScreen, move || {
            scheduler.speak(&probe.screen_summary(), SpeechPriority::Normal, true);
        });

        let scheduler = self.scheduler.clone();
        let probe = Arc::clone(&self.probe);
        bus.register(Command::ReadStatusSummary, move || {
            scheduler.speak(&probe.status_summary(), SpeechPriority::Normal, true);
        });

        let scheduler = self.scheduler.clone();
        bus.register(Command::DumpDiagnostics, move || {
            match serde_json::to_string(&scheduler.diagnostics()) {
                Ok(json) => info!("Speech diagnostics: {}", json),
                Err(error) => warn!("Failed to serialize diagnostics: {}", error),
            }
            scheduler.speak("Diagnostics captured", SpeechPriority::Normal, true);
        });
    }

    /// Run one narration tick: focus settle pass plus queued-event drain
    pub fn tick(&self) {
        self.engine.lock().tick(self.probe.as_ref());
    }

    /// Tick at an explicit time; public for temporal tests
    pub fn tick_at(&self, now: Instant) {
        self.engine.lock().tick_at(self.probe.as_ref(), now);
    }

    /// Cloneable sender producers use to queue narration events
    pub fn event_sender(&self) -> Sender<NarrationEvent> {
        self.engine.lock().event_sender()
    }

    /// Queue a narration event for the next tick's drain
    pub fn submit_event(&self, event: NarrationEvent) -> Result<()> {
        self.engine.lock().submit_event(event)
    }

    /// Submit an utterance directly to the speech scheduler
    pub fn speak(&self, text: &str, priority: SpeechPriority, interrupt: bool) {
        self.scheduler.speak(text, priority, interrupt);
    }

    /// Cancel current speech and drop the pending queue
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Re-speak the last accepted utterance; false when there is none
    pub fn try_repeat_last(&self) -> bool {
        self.scheduler.try_repeat_last()
    }

    /// Append a handler for a command
    pub fn register_handler(&self, command: Command, handler: impl Fn() + Send + 'static) {
        self.bus.lock().register(command, handler);
    }

    /// Dispatch a command to every registered handler, in order
    pub fn dispatch(&self, command: Command) {
        self.bus.lock().dispatch(command);
    }

    /// Switch the active profile by name; fails on unknown names
    pub fn switch_profile(&self, name: &str) -> Result<()> {
        self.store.set_active(name)
    }

    /// Snapshot of the current backend selection
    pub fn diagnostics(&self) -> SchedulerDiagnostics {
        self.scheduler.diagnostics()
    }

    /// The last utterance accepted by the scheduler, if any
    pub fn last_spoken(&self) -> Option<String> {
        self.scheduler.last_spoken()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::AccessibleElement;
    use crate::narration::NarrationCategory;
    use crate::policy::{BackendKind, PolicyProfile};
    use crate::speech::{TraceBackend, SELF_TEST_UTTERANCE};

    struct SilentProbe;

    impl FocusProbe for SilentProbe {
        fn focused_element(&self) -> Option<AccessibleElement> {
            None
        }

        fn screen_summary(&self) -> String {
            "Main menu, 4 items".to_string()
        }

        fn status_summary(&self) -> String {
            "All systems nominal".to_string()
        }
    }

    fn narrator() -> Narrator {
        let factory = BackendFactory::new(BackendKind::Synthesizer, || {
            Box::new(TraceBackend::new())
        });
        Narrator::new(
            Arc::new(SilentProbe),
            vec![factory],
            Arc::new(ProfileStore::new()),
        )
    }

    #[test]
    fn test_startup_speaks_self_test() {
        let narrator = narrator();
        assert_eq!(narrator.last_spoken(), Some(SELF_TEST_UTTERANCE.to_string()));
        assert!(narrator.diagnostics().available);
    }

    #[test]
    fn test_read_screen_command_speaks_probe_summary() {
        let narrator = narrator();
        narrator.dispatch(Command::ReadScreen);
        assert_eq!(narrator.last_spoken(), Some("Main menu, 4 items".to_string()));

        narrator.dispatch(Command::ReadStatusSummary);
        assert_eq!(narrator.last_spoken(), Some("All systems nominal".to_string()));
    }

    #[test]
    fn test_repeat_last_after_startup() {
        let narrator = narrator();
        assert!(narrator.try_repeat_last());
    }

    #[test]
    fn test_submitted_event_spoken_on_tick() {
        let narrator = narrator();
        narrator
            .submit_event(NarrationEvent::message(
                NarrationCategory::Notifications,
                "Journal updated",
            ))
            .unwrap();
        narrator.tick();
        assert_eq!(narrator.last_spoken(), Some("Journal updated".to_string()));
    }

    #[test]
    fn test_switch_to_unknown_profile_fails() {
        let narrator = narrator();
        assert!(narrator.switch_profile("Missing").is_err());
    }

    #[test]
    fn test_profile_edit_reaches_engine_and_scheduler() {
        let factory = BackendFactory::new(BackendKind::Synthesizer, || {
            Box::new(TraceBackend::new())
        });
        let store = Arc::new(ProfileStore::new());
        let narrator = Narrator::new(Arc::new(SilentProbe), vec![factory], Arc::clone(&store));

        let mut edited = PolicyProfile::default();
        edited.categories.notifications.enabled = false;
        store.upsert_profile(edited);

        narrator
            .submit_event(NarrationEvent::message(
                NarrationCategory::Notifications,
                "Should stay silent",
            ))
            .unwrap();
        narrator.tick();
        assert_eq!(narrator.last_spoken(), Some(SELF_TEST_UTTERANCE.to_string()));
    }
}
