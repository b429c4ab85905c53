//! End-to-end scenarios: profile switches across live speech

use narrator::element::{AccessibleElement, FocusProbe};
use narrator::narration::{NarrationCategory, NarrationEvent};
use narrator::integration::Narrator;
use narrator::policy::{BackendKind, BackendMode, PolicyProfile, ProfileStore};
use narrator::speech::{
    BackendFactory, CompletionHandle, SpeechBackend, SpeechPriority, SELF_TEST_UTTERANCE,
};
use parking_lot::Mutex;
use std::sync::Arc;

struct SilentProbe;

impl FocusProbe for SilentProbe {
    fn focused_element(&self) -> Option<AccessibleElement> {
        None
    }
}

/// Shared view into one backend kind's dispatched utterances
#[derive(Clone, Default)]
struct BackendTap {
    spoken: Arc<Mutex<Vec<String>>>,
    completion: Arc<Mutex<Option<CompletionHandle>>>,
}

impl BackendTap {
    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    /// Raise completion the way a real backend thread would
    fn complete(&self) {
        let handle = self.completion.lock().clone();
        if let Some(handle) = handle {
            handle.notify_complete();
        }
    }
}

struct TappedBackend {
    tap: BackendTap,
    available: bool,
}

impl SpeechBackend for TappedBackend {
    fn name(&self) -> &'static str {
        "TappedBackend"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, text: &str) -> narrator::Result<()> {
        self.tap.spoken.lock().push(text.to_string());
        Ok(())
    }

    fn stop(&mut self) -> narrator::Result<()> {
        Ok(())
    }

    fn diagnostics(&self) -> String {
        "tapped".to_string()
    }

    fn set_completion_handle(&mut self, handle: Option<CompletionHandle>) {
        *self.tap.completion.lock() = handle;
    }

    fn notifies_completion(&self) -> bool {
        true
    }
}

fn tapped_factory(kind: BackendKind, tap: &BackendTap, available: bool) -> BackendFactory {
    let tap = tap.clone();
    BackendFactory::new(kind, move || {
        Box::new(TappedBackend {
            tap: tap.clone(),
            available,
        })
    })
}

fn two_backend_store() -> Arc<ProfileStore> {
    let mut desktop = PolicyProfile::named("Desktop");
    desktop.backend_mode = BackendMode::Fixed(BackendKind::Synthesizer);
    Arc::new(
        ProfileStore::with_profiles(vec![PolicyProfile::named("Default"), desktop], "Default")
            .unwrap(),
    )
}

#[test]
fn test_profile_switch_drops_queued_speech_and_self_tests_once() {
    let reader_tap = BackendTap::default();
    let synth_tap = BackendTap::default();
    let store = two_backend_store();

    let narrator = Narrator::new(
        Arc::new(SilentProbe),
        vec![
            tapped_factory(BackendKind::ScreenReader, &reader_tap, true),
            tapped_factory(BackendKind::Synthesizer, &synth_tap, true),
        ],
        Arc::clone(&store),
    );

    // Auto mode adopted the screen reader; self-test played there
    assert_eq!(reader_tap.spoken(), vec![SELF_TEST_UTTERANCE]);

    // One utterance playing, one queued behind it
    narrator.speak("reading item", SpeechPriority::Normal, true);
    narrator.speak("queued item", SpeechPriority::Normal, false);
    assert_eq!(
        reader_tap.spoken(),
        vec![SELF_TEST_UTTERANCE, "reading item"]
    );

    // Switching profiles mid-utterance flushes the queue; the stale item
    // never plays on either backend and the self-test does not repeat
    narrator.switch_profile("Desktop").unwrap();
    synth_tap.complete();
    reader_tap.complete();

    assert_eq!(
        reader_tap.spoken(),
        vec![SELF_TEST_UTTERANCE, "reading item"]
    );
    assert!(synth_tap.spoken().is_empty());

    narrator.speak("fresh item", SpeechPriority::Normal, false);
    assert_eq!(synth_tap.spoken(), vec!["fresh item"]);

    let diagnostics = narrator.diagnostics();
    assert_eq!(diagnostics.mode, BackendMode::Fixed(BackendKind::Synthesizer));
    assert!(diagnostics.available);
}

#[test]
fn test_totally_unavailable_chain_is_silently_mute() {
    let reader_tap = BackendTap::default();
    let synth_tap = BackendTap::default();

    let narrator = Narrator::new(
        Arc::new(SilentProbe),
        vec![
            tapped_factory(BackendKind::ScreenReader, &reader_tap, false),
            tapped_factory(BackendKind::Synthesizer, &synth_tap, false),
        ],
        Arc::new(ProfileStore::new()),
    );

    narrator.speak("nobody hears this", SpeechPriority::Critical, true);
    assert!(reader_tap.spoken().is_empty());
    assert!(synth_tap.spoken().is_empty());
    assert_eq!(narrator.last_spoken(), None);

    // Mute state is discoverable only through diagnostics
    let diagnostics = narrator.diagnostics();
    assert!(!diagnostics.available);
    assert_eq!(diagnostics.backend_name, "NullBackend");
    assert_eq!(diagnostics.probes.len(), 2);
    assert!(diagnostics.probes.iter().all(|probe| !probe.available));
}

#[test]
fn test_submitted_events_flow_through_engine_to_backend() {
    let synth_tap = BackendTap::default();
    let narrator = Narrator::new(
        Arc::new(SilentProbe),
        vec![tapped_factory(BackendKind::Synthesizer, &synth_tap, true)],
        Arc::new(ProfileStore::new()),
    );
    synth_tap.complete();

    let events = narrator.event_sender();
    events
        .send(
            NarrationEvent::message(NarrationCategory::Combat, "Bear nearby")
                .with_priority(SpeechPriority::High)
                .with_interrupt(true),
        )
        .unwrap();
    events
        .send(NarrationEvent::message(
            NarrationCategory::Combat,
            "Bear nearby",
        ))
        .unwrap();
    narrator.tick();

    // The duplicate within the debounce window was dropped by the engine
    let spoken = synth_tap.spoken();
    assert_eq!(
        spoken.iter().filter(|text| *text == "Bear nearby").count(),
        1
    );
}
