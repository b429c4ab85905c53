pub mod commands;
pub mod element;
pub mod integration;
pub mod narration;
pub mod policy;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum NarratorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Speech backend error: {0}")]
    BackendError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl NarratorError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Bad profile names or malformed policy need user intervention
            NarratorError::ConfigError(_) => false,
            // A faulting backend is retried on the next selection cycle
            NarratorError::BackendError(_) => true,
            NarratorError::ChannelError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NarratorError>;
