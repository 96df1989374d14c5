//! Connectivity classification and the resolver seam
//!
//! The dispatcher asks a [`ConnectivityResolver`] for the network state once
//! per dispatched event, so every listener for that event observes the same
//! snapshot and the aggregate counters key on the connectivity that was
//! active at dispatch time. The crate never probes the platform itself; the
//! host supplies whatever resolver matches its environment.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Coarse network classification used to key aggregate counters
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityType {
    /// Wi-Fi or other unmetered LAN
    Wifi,
    /// Cellular data
    Mobile,
    /// No network available
    None,
    /// Connectivity state could not be determined
    #[default]
    Unknown,
}

impl ConnectivityType {
    /// Number of distinct connectivity types (arena size for counters)
    pub const COUNT: usize = 4;

    /// All types, in counter-arena order
    pub const ALL: [Self; Self::COUNT] = [Self::Wifi, Self::Mobile, Self::None, Self::Unknown];

    /// Stable arena index for this type
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Wifi => 0,
            Self::Mobile => 1,
            Self::None => 2,
            Self::Unknown => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Mobile => "mobile",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConnectivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the network state at one dispatch
///
/// Carries the coarse type plus an optional subtype or carrier detail
/// (e.g. "LTE", "5G", an SSID) the host resolver chooses to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityInfo {
    connection: ConnectivityType,
    detail: Option<String>,
}

impl ConnectivityInfo {
    #[must_use]
    pub const fn new(connection: ConnectivityType) -> Self {
        Self {
            connection,
            detail: None,
        }
    }

    /// Attach a subtype/carrier detail string
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    #[inline]
    pub const fn connection(&self) -> ConnectivityType {
        self.connection
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Whether any network is currently reachable
    #[must_use]
    #[inline]
    pub const fn is_connected(&self) -> bool {
        !matches!(self.connection, ConnectivityType::None)
    }
}

impl Default for ConnectivityInfo {
    fn default() -> Self {
        Self::new(ConnectivityType::Unknown)
    }
}

impl fmt::Display for ConnectivityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({})", self.connection, detail),
            None => self.connection.fmt(f),
        }
    }
}

/// Source of the current network state, queried once per dispatch
///
/// Implementations must be cheap and non-blocking: the dispatcher calls
/// [`current`](Self::current) on its worker thread before every fan-out.
pub trait ConnectivityResolver: Send {
    fn current(&self) -> ConnectivityInfo;
}

/// Resolver that always reports the same connectivity
///
/// For hosts with a fixed network environment and for tests.
#[derive(Debug, Clone)]
pub struct StaticConnectivity {
    info: ConnectivityInfo,
}

impl StaticConnectivity {
    #[must_use]
    pub const fn new(info: ConnectivityInfo) -> Self {
        Self { info }
    }

    /// Shorthand for a resolver with no detail string
    #[must_use]
    pub const fn of(connection: ConnectivityType) -> Self {
        Self::new(ConnectivityInfo::new(connection))
    }
}

impl ConnectivityResolver for StaticConnectivity {
    fn current(&self) -> ConnectivityInfo {
        self.info.clone()
    }
}

/// Shared slot the host updates from its own connectivity-change hooks
///
/// Clone one handle into the dispatcher and keep another wherever the
/// platform delivers network-change notifications; `set` is safe from any
/// thread and dispatch reads the latest value.
#[derive(Debug, Clone, Default)]
pub struct SharedConnectivity {
    slot: Arc<Mutex<ConnectivityInfo>>,
}

impl SharedConnectivity {
    #[must_use]
    pub fn new(initial: ConnectivityInfo) -> Self {
        Self {
            slot: Arc::new(Mutex::new(initial)),
        }
    }

    /// Replace the current connectivity state
    pub fn set(&self, info: ConnectivityInfo) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = info;
    }
}

impl ConnectivityResolver for SharedConnectivity {
    fn current(&self) -> ConnectivityInfo {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_indices_cover_arena() {
        for (position, connectivity) in ConnectivityType::ALL.iter().enumerate() {
            assert_eq!(connectivity.index(), position);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectivityType::Wifi.to_string(), "wifi");
        assert_eq!(
            ConnectivityInfo::new(ConnectivityType::Mobile)
                .with_detail("LTE")
                .to_string(),
            "mobile (LTE)"
        );
    }

    #[test]
    fn test_is_connected() {
        assert!(ConnectivityInfo::new(ConnectivityType::Wifi).is_connected());
        assert!(ConnectivityInfo::new(ConnectivityType::Unknown).is_connected());
        assert!(!ConnectivityInfo::new(ConnectivityType::None).is_connected());
    }

    #[test]
    fn test_static_resolver() {
        let resolver = StaticConnectivity::of(ConnectivityType::Mobile);
        assert_eq!(resolver.current().connection(), ConnectivityType::Mobile);
        assert_eq!(resolver.current(), resolver.current());
    }

    #[test]
    fn test_shared_resolver_observes_updates() {
        let shared = SharedConnectivity::new(ConnectivityInfo::new(ConnectivityType::Wifi));
        let reader = shared.clone();
        assert_eq!(reader.current().connection(), ConnectivityType::Wifi);

        shared.set(ConnectivityInfo::new(ConnectivityType::None));
        assert_eq!(reader.current().connection(), ConnectivityType::None);
    }

    #[test]
    fn test_shared_resolver_default_is_unknown() {
        let shared = SharedConnectivity::default();
        assert_eq!(shared.current().connection(), ConnectivityType::Unknown);
    }
}
