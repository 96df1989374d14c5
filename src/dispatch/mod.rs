//! Stats aggregation and listener fan-out
//!
//! [`StatsDispatcher`] is the single point of truth for who is listening and
//! what has been observed. Producers (interceptor threads) enqueue terminal
//! exchange events onto an ordered channel and never wait for listener
//! execution; a dedicated worker thread consumes the queue, resolves the
//! current connectivity once per event, updates the per-connectivity
//! aggregate counters, and invokes every registered listener in
//! registration order. Because a single consumer drains a FIFO queue,
//! dispatch order equals enqueue order across all producers, listeners are
//! only ever called on the worker thread, and the counters need no locks.

mod listener;
mod registry;

pub use listener::{LoggingListener, StatsListener};
pub use registry::ListenerRegistry;

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, error, warn};

use crate::config::DispatcherConfig;
use crate::connectivity::ConnectivityResolver;
use crate::error::StatsError;
use crate::metrics::{UsageCounters, UsageSnapshot};
use crate::stats::RequestStats;

/// Receiver of built stat records, one call per terminal exchange event
///
/// Implemented by [`StatsDispatcher`]; the seam exists so an
/// [`EventReporter`](crate::report::EventReporter) can be pointed at a test
/// double.
pub trait StatsSink {
    /// An exchange completed with a fully read response
    fn on_response_received(&self, stats: RequestStats);

    /// An exchange failed before a response arrived
    fn on_http_exchange_error(&self, stats: RequestStats, error: io::Error);

    /// A response arrived but reading its body failed
    fn on_response_stream_error(&self, stats: RequestStats, error: io::Error);
}

/// One terminal exchange outcome travelling through the queue
enum ExchangeEvent {
    Success {
        stats: Arc<RequestStats>,
    },
    ExchangeError {
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    },
    StreamError {
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    },
}

impl ExchangeEvent {
    fn stats(&self) -> &Arc<RequestStats> {
        match self {
            Self::Success { stats }
            | Self::ExchangeError { stats, .. }
            | Self::StreamError { stats, .. } => stats,
        }
    }
}

enum Command {
    Dispatch(ExchangeEvent),
    Snapshot(Sender<UsageSnapshot>),
    Flush(Sender<()>),
    Shutdown,
}

/// Aggregates exchange outcomes and fans them out to listeners
///
/// Cheap to clone; clones share the worker thread, the listener registry
/// and the counters. The worker is spawned at construction and owned by the
/// dispatcher: call [`shutdown`](Self::shutdown) to stop and join it, or
/// drop every clone to let it drain and exit on its own.
#[derive(Clone)]
pub struct StatsDispatcher {
    shared: Arc<Shared>,
}

struct Shared {
    tx: Sender<Command>,
    registry: Arc<ListenerRegistry>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StatsDispatcher {
    /// Spawn a dispatcher with the default configuration
    pub fn new(resolver: impl ConnectivityResolver + 'static) -> Result<Self, StatsError> {
        Self::with_config(DispatcherConfig::default(), resolver)
    }

    /// Spawn a dispatcher with an explicit configuration
    ///
    /// Fails on an invalid configuration or if the worker thread cannot be
    /// spawned. A bounded queue capacity makes producers block while the
    /// queue is full (backpressure); the default is unbounded.
    pub fn with_config(
        config: DispatcherConfig,
        resolver: impl ConnectivityResolver + 'static,
    ) -> Result<Self, StatsError> {
        config.validate()?;

        let (tx, rx) = match config.queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let registry = Arc::new(ListenerRegistry::new());

        let worker = Worker {
            rx,
            resolver: Box::new(resolver),
            registry: Arc::clone(&registry),
            counters: UsageCounters::new(),
        };
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker.run())?;

        Ok(Self {
            shared: Arc::new(Shared {
                tx,
                registry,
                worker: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Register a listener for every event dispatched after this call
    ///
    /// Append semantics: registering the same instance twice delivers every
    /// event to it twice. An event already in flight when the listener is
    /// added may or may not reach it; all later events will.
    pub fn add_listener(&self, listener: Arc<dyn StatsListener>) {
        self.shared.registry.add(listener);
    }

    /// Deregister every registration of this listener instance
    ///
    /// A no-op if the instance was never registered. A dispatch already in
    /// progress against a snapshot containing the listener still completes.
    pub fn remove_listener(&self, listener: &Arc<dyn StatsListener>) {
        self.shared.registry.remove(listener);
    }

    /// Number of current listener registrations
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Point-in-time copy of the aggregate counters
    ///
    /// The request round-trips through the dispatch queue, so the snapshot
    /// reflects every event enqueued before this call.
    pub fn usage_snapshot(&self) -> Result<UsageSnapshot, StatsError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.recv().map_err(|_| StatsError::ChannelClosed)
    }

    /// Block until every event enqueued before this call has been dispatched
    pub fn flush(&self) -> Result<(), StatsError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(Command::Flush(reply_tx))?;
        reply_rx.recv().map_err(|_| StatsError::ChannelClosed)
    }

    /// Stop the worker after it has drained everything enqueued so far
    ///
    /// Idempotent: the first call joins the worker, later calls return
    /// `Ok(())`. Events enqueued concurrently with shutdown may be dropped.
    pub fn shutdown(&self) -> Result<(), StatsError> {
        let handle = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return Ok(());
        };
        // The worker may already have exited; the join below still settles it.
        let _ = self.shared.tx.send(Command::Shutdown);
        handle.join().map_err(|_| StatsError::WorkerPanicked)
    }

    fn send(&self, command: Command) -> Result<(), StatsError> {
        self.shared
            .tx
            .send(command)
            .map_err(|_| StatsError::ChannelClosed)
    }

    fn submit(&self, event: ExchangeEvent) {
        if self.send(Command::Dispatch(event)).is_err() {
            warn!("stats event dropped: dispatcher is shut down");
        }
    }
}

impl StatsSink for StatsDispatcher {
    fn on_response_received(&self, stats: RequestStats) {
        self.submit(ExchangeEvent::Success {
            stats: Arc::new(stats),
        });
    }

    fn on_http_exchange_error(&self, stats: RequestStats, error: io::Error) {
        self.submit(ExchangeEvent::ExchangeError {
            stats: Arc::new(stats),
            error: Arc::new(error),
        });
    }

    fn on_response_stream_error(&self, stats: RequestStats, error: io::Error) {
        self.submit(ExchangeEvent::StreamError {
            stats: Arc::new(stats),
            error: Arc::new(error),
        });
    }
}

impl std::fmt::Debug for StatsDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsDispatcher")
            .field("listeners", &self.shared.registry.len())
            .finish()
    }
}

/// State confined to the designated dispatch thread
struct Worker {
    rx: Receiver<Command>,
    resolver: Box<dyn ConnectivityResolver>,
    registry: Arc<ListenerRegistry>,
    counters: UsageCounters,
}

impl Worker {
    fn run(mut self) {
        debug!("dispatch worker started");
        while let Ok(command) = self.rx.recv() {
            match command {
                Command::Dispatch(event) => self.dispatch(event),
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.counters.snapshot());
                }
                Command::Flush(reply) => {
                    let _ = reply.send(());
                }
                Command::Shutdown => break,
            }
        }
        debug!("dispatch worker stopped");
    }

    fn dispatch(&mut self, event: ExchangeEvent) {
        let network = self.resolver.current();
        let stats = Arc::clone(event.stats());

        self.counters
            .record(network.connection(), stats.total_bytes());

        for target in self.registry.snapshot() {
            let delivery = catch_unwind(AssertUnwindSafe(|| match &event {
                ExchangeEvent::Success { stats } => {
                    target.on_response_success(&network, Arc::clone(stats));
                }
                ExchangeEvent::ExchangeError { stats, error } => {
                    target.on_response_error(&network, Arc::clone(stats), Arc::clone(error));
                }
                ExchangeEvent::StreamError { stats, error } => {
                    target.on_response_stream_error(&network, Arc::clone(stats), Arc::clone(error));
                }
            }));
            if delivery.is_err() {
                // Fault channel: isolate the failing listener, keep going.
                error!(
                    request_id = %stats.request_id(),
                    "listener panicked during dispatch; continuing with remaining listeners"
                );
            }
        }
    }
}
