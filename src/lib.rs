//! Per-request network stats capture and listener dispatch for HTTP clients
//!
//! `reqmon` is a passive observation layer. An HTTP interceptor reports the
//! terminal outcome of each exchange (response received, exchange error, or
//! response-body read error) through an [`EventReporter`]; the reporter
//! builds an immutable [`RequestStats`] record and hands it to a
//! [`StatsDispatcher`], which resolves the current connectivity, updates
//! per-connectivity aggregate counters, and fans the event out to every
//! registered [`StatsListener`] — always on one designated worker thread,
//! in FIFO order, regardless of how many interceptor threads produce
//! events concurrently.
//!
//! ```no_run
//! use std::sync::Arc;
//! use reqmon::connectivity::{ConnectivityType, StaticConnectivity};
//! use reqmon::dispatch::{LoggingListener, StatsDispatcher};
//! use reqmon::report::EventReporter;
//!
//! # fn main() -> Result<(), reqmon::error::StatsError> {
//! let dispatcher = StatsDispatcher::new(StaticConnectivity::of(ConnectivityType::Wifi))?;
//! dispatcher.add_listener(Arc::new(LoggingListener));
//!
//! // Hand the reporter to the interceptor; it calls the three
//! // terminal-event methods from its I/O threads.
//! let reporter = EventReporter::new(dispatcher.clone());
//! # let _ = reporter;
//!
//! // Later: inspect cumulative per-connectivity usage.
//! let usage = dispatcher.usage_snapshot()?;
//! println!("total bytes observed: {}", usage.total_bytes());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connectivity;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod stats;
pub mod stream;
pub mod types;

pub use config::DispatcherConfig;
pub use connectivity::{
    ConnectivityInfo, ConnectivityResolver, ConnectivityType, SharedConnectivity,
    StaticConnectivity,
};
pub use dispatch::{ListenerRegistry, LoggingListener, StatsDispatcher, StatsListener, StatsSink};
pub use error::StatsError;
pub use metrics::{TypeUsage, UsageSnapshot};
pub use report::{EventReporter, RequestFacts, ResponseFacts};
pub use stats::{RequestStats, RequestStatsBuilder};
pub use stream::{CountingBody, CountingReader, StreamCounter, StreamObserver};
pub use types::{BytesReceived, BytesSent, BytesTransferred, RequestCount, RequestId};
