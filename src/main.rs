use anyhow::Result;
use narrator::commands::Command;
use narrator::element::{AccessibleElement, FocusProbe};
use narrator::narration::{NarrationCategory, NarrationEvent};
use narrator::integration::Narrator;
use narrator::policy::{BackendKind, ProfileStore};
use narrator::speech::{BackendFactory, SpeechPriority, TraceBackend};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo probe that walks focus through a fixed menu
struct DemoProbe {
    step: Mutex<usize>,
}

impl DemoProbe {
    fn new() -> Self {
        Self {
            step: Mutex::new(0),
        }
    }

    fn advance(&self) {
        *self.step.lock() += 1;
    }
}

impl FocusProbe for DemoProbe {
    fn focused_element(&self) -> Option<AccessibleElement> {
        let items = ["Continue", "New Game", "Options", "Quit"];
        let step = *self.step.lock();
        let index = (step / 8).min(items.len() - 1);
        Some(
            AccessibleElement::new("MenuItem", items[index])
                .with_path(format!("MainMenu/{}", items[index])),
        )
    }

    fn screen_summary(&self) -> String {
        "Main menu, 4 items".to_string()
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "narrator=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting narrator demo");

    let probe = Arc::new(DemoProbe::new());
    let factories = vec![BackendFactory::new(BackendKind::Synthesizer, || {
        Box::new(TraceBackend::new())
    })];
    let narrator = Narrator::new(
        Arc::clone(&probe) as Arc<dyn FocusProbe>,
        factories,
        Arc::new(ProfileStore::new()),
    );

    let events = narrator.event_sender();

    for step in 0..40 {
        narrator.tick();
        probe.advance();

        if step == 20 {
            events
                .send(
                    NarrationEvent::message(NarrationCategory::Notifications, "Autosave complete")
                        .with_priority(SpeechPriority::Low),
                )
                .ok();
        }

        thread::sleep(Duration::from_millis(50));
    }

    narrator.dispatch(Command::ReadScreen);
    narrator.dispatch(Command::RepeatLast);
    narrator.dispatch(Command::DumpDiagnostics);

    info!("Demo finished");
    Ok(())
}
