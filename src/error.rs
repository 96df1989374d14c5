//! Library error types
//!
//! Network-level failures are never errors here — they travel through the
//! dispatcher as data inside events. [`StatsError`] covers only
//! construction and lifecycle failures of the crate itself.

use thiserror::Error;

/// Errors surfaced by dispatcher construction and lifecycle operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    /// Dispatcher configuration failed validation
    #[error("invalid dispatcher config: {reason}")]
    InvalidConfig { reason: String },

    /// The dispatch queue is closed (dispatcher was shut down)
    #[error("stats dispatch queue is closed")]
    ChannelClosed,

    /// The dispatch worker thread could not be joined
    #[error("dispatch worker thread panicked")]
    WorkerPanicked,

    /// The dispatch worker thread could not be spawned
    #[error("failed to spawn dispatch worker thread")]
    Spawn(#[from] std::io::Error),
}

impl StatsError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
