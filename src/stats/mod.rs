//! Immutable per-exchange stat records
//!
//! A [`RequestStats`] captures the measured facts of one request/response
//! exchange. It is built once, at the moment a terminal event occurs, and is
//! never mutated afterwards; the dispatcher hands the same record to every
//! listener behind an `Arc`.

use std::time::{Duration, SystemTime};

use http::{Method, StatusCode};
use url::Url;

use crate::types::{BytesReceived, BytesSent, BytesTransferred, RequestId};

/// Measured facts of one request/response exchange
///
/// Fields other than the id are optional: an exchange that failed before a
/// response arrived has no status code or response size. Unset byte counters
/// read as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStats {
    request_id: RequestId,
    url: Option<Url>,
    method: Option<Method>,
    host: Option<String>,
    request_size: BytesSent,
    response_size: BytesReceived,
    status: Option<StatusCode>,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
}

impl RequestStats {
    /// Start building a record for the exchange with this id
    #[must_use]
    pub fn builder(request_id: RequestId) -> RequestStatsBuilder {
        RequestStatsBuilder {
            stats: RequestStats {
                request_id,
                url: None,
                method: None,
                host: None,
                request_size: BytesSent::ZERO,
                response_size: BytesReceived::ZERO,
                status: None,
                started_at: None,
                ended_at: None,
            },
        }
    }

    #[must_use]
    #[inline]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[must_use]
    #[inline]
    pub const fn request_size(&self) -> BytesSent {
        self.request_size
    }

    #[must_use]
    #[inline]
    pub const fn response_size(&self) -> BytesReceived {
        self.response_size
    }

    #[must_use]
    #[inline]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    #[inline]
    pub const fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    #[must_use]
    #[inline]
    pub const fn ended_at(&self) -> Option<SystemTime> {
        self.ended_at
    }

    /// Request plus response bytes known for this exchange
    #[must_use]
    pub fn total_bytes(&self) -> BytesTransferred {
        BytesTransferred::from(self.request_size)
            .saturating_add_u64(self.response_size.as_u64())
    }

    /// Wall-clock duration of the exchange, when both timestamps are known
    ///
    /// Returns `None` if either timestamp is missing or the clock went
    /// backwards between them.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.duration_since(start).ok(),
            _ => None,
        }
    }
}

/// Build-then-freeze constructor for [`RequestStats`]
///
/// Each setter populates one field; `build` freezes the record. There is no
/// way to mutate a record after `build`, which is what makes sharing it
/// across threads without locks sound.
#[derive(Debug)]
pub struct RequestStatsBuilder {
    stats: RequestStats,
}

impl RequestStatsBuilder {
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.stats.url = Some(url);
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.stats.method = Some(method);
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.stats.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn request_size(mut self, size: BytesSent) -> Self {
        self.stats.request_size = size;
        self
    }

    #[must_use]
    pub fn response_size(mut self, size: BytesReceived) -> Self {
        self.stats.response_size = size;
        self
    }

    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.stats.status = Some(status);
        self
    }

    #[must_use]
    pub fn started_at(mut self, at: SystemTime) -> Self {
        self.stats.started_at = Some(at);
        self
    }

    #[must_use]
    pub fn ended_at(mut self, at: SystemTime) -> Self {
        self.stats.ended_at = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> RequestStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_url() -> Url {
        Url::parse("https://api.example.com/v1/items").expect("static url")
    }

    #[test]
    fn test_builder_populates_all_fields() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let end = start + Duration::from_millis(250);
        let stats = RequestStats::builder(RequestId::new(42))
            .url(sample_url())
            .method(Method::GET)
            .host("api.example.com")
            .request_size(BytesSent::new(128))
            .response_size(BytesReceived::new(4096))
            .status(StatusCode::OK)
            .started_at(start)
            .ended_at(end)
            .build();

        assert_eq!(stats.request_id(), RequestId::new(42));
        assert_eq!(stats.url(), Some(&sample_url()));
        assert_eq!(stats.method(), Some(&Method::GET));
        assert_eq!(stats.host(), Some("api.example.com"));
        assert_eq!(stats.request_size().as_u64(), 128);
        assert_eq!(stats.response_size().as_u64(), 4096);
        assert_eq!(stats.status(), Some(StatusCode::OK));
        assert_eq!(stats.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_minimal_record_has_defaults() {
        let stats = RequestStats::builder(RequestId::new(1)).build();

        assert_eq!(stats.request_id(), RequestId::new(1));
        assert_eq!(stats.url(), None);
        assert_eq!(stats.method(), None);
        assert_eq!(stats.host(), None);
        assert_eq!(stats.status(), None);
        assert_eq!(stats.request_size(), BytesSent::ZERO);
        assert_eq!(stats.response_size(), BytesReceived::ZERO);
        assert_eq!(stats.duration(), None);
    }

    #[test]
    fn test_total_bytes_sums_both_directions() {
        let stats = RequestStats::builder(RequestId::new(2))
            .request_size(BytesSent::new(100))
            .response_size(BytesReceived::new(900))
            .build();
        assert_eq!(stats.total_bytes().as_u64(), 1000);
    }

    #[test]
    fn test_total_bytes_with_unknown_response_size() {
        let stats = RequestStats::builder(RequestId::new(3))
            .request_size(BytesSent::new(77))
            .build();
        assert_eq!(stats.total_bytes().as_u64(), 77);
    }

    #[test]
    fn test_duration_requires_both_timestamps() {
        let stats = RequestStats::builder(RequestId::new(4))
            .started_at(SystemTime::UNIX_EPOCH)
            .build();
        assert_eq!(stats.duration(), None);
    }

    #[test]
    fn test_duration_clock_skew_is_none() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let end = SystemTime::UNIX_EPOCH + Duration::from_secs(50);
        let stats = RequestStats::builder(RequestId::new(5))
            .started_at(start)
            .ended_at(end)
            .build();
        assert_eq!(stats.duration(), None);
    }
}
