//! Command dispatch registry
//!
//! Maps abstract command ids to ordered handler lists. Dispatch is
//! synchronous on the calling thread; a panicking handler is caught and
//! logged so it cannot starve the handlers registered after it.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};

/// User-initiated commands routed through the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    RepeatLast,
    StopSpeech,
    ReadScreen,
    ReadStatusSummary,
    DumpDiagnostics,
}

type Handler = Box<dyn Fn() + Send>;

/// Ordered, append-only handler registry
#[derive(Default)]
pub struct CommandBus {
    handlers: HashMap<Command, Vec<Handler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for the command; handlers are never replaced or
    /// removed
    pub fn register(&mut self, command: Command, handler: impl Fn() + Send + 'static) {
        self.handlers
            .entry(command)
            .or_default()
            .push(Box::new(handler));
    }

    /// Invoke every handler for the command in registration order.
    ///
    /// A command without handlers is a no-op.
    pub fn dispatch(&self, command: Command) {
        let Some(handlers) = self.handlers.get(&command) else {
            debug!("No handlers registered for {:?}", command);
            return;
        };

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                error!("Handler panicked while dispatching {:?}; continuing", command);
            }
        }
    }

    /// Number of handlers registered for a command
    pub fn handler_count(&self, command: Command) -> usize {
        self.handlers.get(&command).map_or(0, Vec::len)
    }
}
