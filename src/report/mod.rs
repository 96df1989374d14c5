//! Interceptor event translation
//!
//! [`EventReporter`] is the boundary the HTTP interceptor talks to. It turns
//! the three terminal exchange events into populated
//! [`RequestStats`](crate::stats::RequestStats) records and forwards each to
//! the stats sink exactly once. Pure translation: no retries, no mutation of
//! inputs, no other side effects.

use std::io;
use std::time::SystemTime;

use http::{Method, StatusCode};
use url::Url;

use crate::dispatch::StatsSink;
use crate::stats::RequestStats;
use crate::types::{BytesReceived, BytesSent, RequestId};

/// Request-side facts supplied by the interceptor
#[derive(Debug, Clone)]
pub struct RequestFacts {
    pub id: RequestId,
    pub url: Url,
    pub method: Method,
    pub host: String,
    pub size: BytesSent,
}

/// Response-side facts supplied by the interceptor
#[derive(Debug, Clone)]
pub struct ResponseFacts {
    pub id: RequestId,
    pub size: BytesReceived,
    pub status: StatusCode,
    pub started_at: SystemTime,
    pub ended_at: SystemTime,
}

/// Translates terminal interceptor events into stat records
///
/// Absent request or response descriptors make the call a silent no-op —
/// nothing is forwarded. That guard mirrors interceptor pipelines that can
/// surface a terminal callback without a usable descriptor; it is not an
/// error path.
#[derive(Debug, Clone)]
pub struct EventReporter<S> {
    sink: S,
}

impl<S: StatsSink> EventReporter<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// A response arrived: build the full record and forward it as a success
    pub fn response_received(
        &self,
        request: Option<&RequestFacts>,
        response: Option<&ResponseFacts>,
    ) {
        let (Some(request), Some(response)) = (request, response) else {
            return;
        };
        let stats = RequestStats::builder(response.id)
            .url(request.url.clone())
            .method(request.method.clone())
            .host(request.host.clone())
            .request_size(request.size)
            .response_size(response.size)
            .status(response.status)
            .started_at(response.started_at)
            .ended_at(response.ended_at)
            .build();
        self.sink.on_response_received(stats);
    }

    /// The exchange failed before a response arrived
    ///
    /// The record carries request-side facts only.
    pub fn http_exchange_error(&self, request: Option<&RequestFacts>, error: io::Error) {
        let Some(request) = request else {
            return;
        };
        let stats = RequestStats::builder(request.id)
            .url(request.url.clone())
            .method(request.method.clone())
            .host(request.host.clone())
            .request_size(request.size)
            .build();
        self.sink.on_http_exchange_error(stats, error);
    }

    /// Reading the response body failed
    ///
    /// Status and timestamps are known; the response size is not recorded
    /// because the stream died before the total was measured.
    pub fn response_stream_error(
        &self,
        request: Option<&RequestFacts>,
        response: Option<&ResponseFacts>,
        error: io::Error,
    ) {
        let (Some(request), Some(response)) = (request, response) else {
            return;
        };
        let stats = RequestStats::builder(response.id)
            .url(request.url.clone())
            .method(request.method.clone())
            .host(request.host.clone())
            .request_size(request.size)
            .status(response.status)
            .started_at(response.started_at)
            .ended_at(response.ended_at)
            .build();
        self.sink.on_response_stream_error(stats, error);
    }
}
