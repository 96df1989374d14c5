//! Listener capability interface and the stock logging consumer

use std::io;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::connectivity::ConnectivityInfo;
use crate::stats::RequestStats;

/// Observer of dispatched exchange outcomes
///
/// All three callbacks run on the dispatch worker thread, one event at a
/// time, in submission order — implementations need no synchronization of
/// their own. A callback that panics is isolated and reported; it never
/// suppresses delivery to the remaining listeners.
///
/// The `stats` record is immutable and shared; clone the `Arc` to retain it.
pub trait StatsListener: Send + Sync {
    /// A response arrived and its body was fully read
    fn on_response_success(&self, network: &ConnectivityInfo, stats: Arc<RequestStats>);

    /// The exchange failed before a response arrived
    fn on_response_error(
        &self,
        network: &ConnectivityInfo,
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    );

    /// The response arrived but reading its body failed
    fn on_response_stream_error(
        &self,
        network: &ConnectivityInfo,
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    );
}

/// Listener that emits every outcome as a tracing event
///
/// Useful as a first consumer while wiring up an interceptor, and as the
/// default listener of the simulate binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl StatsListener for LoggingListener {
    fn on_response_success(&self, network: &ConnectivityInfo, stats: Arc<RequestStats>) {
        debug!(
            request_id = %stats.request_id(),
            network = %network,
            status = stats.status().map(|s| s.as_u16()),
            bytes = stats.total_bytes().as_u64(),
            duration_ms = stats.duration().map(|d| d.as_millis() as u64),
            "exchange completed"
        );
    }

    fn on_response_error(
        &self,
        network: &ConnectivityInfo,
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    ) {
        warn!(
            request_id = %stats.request_id(),
            network = %network,
            host = stats.host(),
            error = %error,
            "exchange failed"
        );
    }

    fn on_response_stream_error(
        &self,
        network: &ConnectivityInfo,
        stats: Arc<RequestStats>,
        error: Arc<io::Error>,
    ) {
        warn!(
            request_id = %stats.request_id(),
            network = %network,
            status = stats.status().map(|s| s.as_u16()),
            error = %error,
            "response body read failed"
        );
    }
}
