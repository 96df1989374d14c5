//! Dispatcher configuration

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Name given to the dispatch worker thread when none is configured
pub const DEFAULT_THREAD_NAME: &str = "reqmon-dispatch";

/// Tunables for [`StatsDispatcher`](crate::dispatch::StatsDispatcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// OS thread name of the dispatch worker
    pub thread_name: String,

    /// Bounded queue capacity; `None` means unbounded
    ///
    /// With a bound, producers block while the queue is full instead of
    /// growing it without limit.
    pub queue_capacity: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            queue_capacity: None,
        }
    }
}

impl DispatcherConfig {
    /// Check the configuration before spawning a dispatcher
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.thread_name.trim().is_empty() {
            return Err(StatsError::invalid_config("thread name must not be empty"));
        }
        if self.queue_capacity == Some(0) {
            return Err(StatsError::invalid_config(
                "queue capacity must be non-zero; use None for an unbounded queue",
            ));
        }
        Ok(())
    }
}
