//! Speech backend capability contract
//!
//! Real adapters (screen reader bridges, system synthesizers) live outside
//! this crate; the scheduler consumes them through [`SpeechBackend`] and
//! constructs them through registered [`BackendFactory`] entries. The crate
//! ships two built-ins: [`NullBackend`], the silent fallback adopted when
//! nothing probes available, and [`TraceBackend`], a development adapter that
//! routes utterances into the log.

use crate::policy::BackendKind;
use crate::speech::scheduler::CompletionHandle;
use crate::Result;
use tracing::info;

/// Capability contract for one speech output backend.
///
/// `speak` and `stop` are fire-and-forget: they must return as soon as the
/// work is handed off, never when playback finishes. A backend that can tell
/// when an utterance finished overrides [`notifies_completion`] and raises
/// the [`CompletionHandle`] from its own execution context — never from
/// inside `speak`, which runs under the scheduler lock.
///
/// [`notifies_completion`]: SpeechBackend::notifies_completion
pub trait SpeechBackend: Send {
    /// Short stable name used in diagnostics
    fn name(&self) -> &'static str;

    /// Cheap availability probe, re-checked on every backend selection
    fn is_available(&self) -> bool;

    /// Queue the text for playback and return immediately
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Cancel in-flight playback
    fn stop(&mut self) -> Result<()>;

    /// One-line human-readable state for the diagnostics snapshot
    fn diagnostics(&self) -> String;

    /// Attach or detach the scheduler's completion handle.
    ///
    /// Non-notifying backends keep the default no-op; the scheduler then
    /// treats every dispatch as immediately complete.
    fn set_completion_handle(&mut self, _handle: Option<CompletionHandle>) {}

    /// Whether this backend raises the completion handle after playback
    fn notifies_completion(&self) -> bool {
        false
    }
}

/// Constructor for one backend kind, probed during selection
pub struct BackendFactory {
    kind: BackendKind,
    make: Box<dyn Fn() -> Box<dyn SpeechBackend> + Send + Sync>,
}

impl BackendFactory {
    /// Register a constructor for the given backend kind
    pub fn new(
        kind: BackendKind,
        make: impl Fn() -> Box<dyn SpeechBackend> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            make: Box::new(make),
        }
    }

    /// The kind this factory produces
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Build a fresh backend instance for probing
    pub(crate) fn create(&self) -> Box<dyn SpeechBackend> {
        (self.make)()
    }
}

/// Silent fallback backend; always reports unavailable
#[derive(Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechBackend for NullBackend {
    fn name(&self) -> &'static str {
        "NullBackend"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn diagnostics(&self) -> String {
        "No speech backend available.".to_string()
    }
}

/// Development backend that logs utterances instead of speaking them
#[derive(Default)]
pub struct TraceBackend {
    spoken_count: usize,
}

impl TraceBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechBackend for TraceBackend {
    fn name(&self) -> &'static str {
        "TraceBackend"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken_count += 1;
        info!("[speech] {}", text);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn diagnostics(&self) -> String {
        format!("Logged {} utterances.", self.spoken_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_backend_is_unavailable() {
        let mut backend = NullBackend::new();
        assert!(!backend.is_available());
        assert!(!backend.notifies_completion());
        assert!(backend.speak("ignored").is_ok());
        assert!(backend.stop().is_ok());
    }

    #[test]
    fn test_trace_backend_counts_utterances() {
        let mut backend = TraceBackend::new();
        assert!(backend.is_available());
        backend.speak("one").unwrap();
        backend.speak("two").unwrap();
        assert!(backend.diagnostics().contains('2'));
    }

    #[test]
    fn test_factory_builds_named_kind() {
        let factory = BackendFactory::new(BackendKind::Synthesizer, || {
            Box::new(TraceBackend::new())
        });
        assert_eq!(factory.kind(), BackendKind::Synthesizer);
        assert_eq!(factory.create().name(), "TraceBackend");
    }
}
