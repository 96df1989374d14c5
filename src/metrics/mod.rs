//! Per-connectivity aggregate counters
//!
//! Cumulative request and byte totals keyed by connectivity type. The
//! counter arena is owned by the dispatch worker and mutated only there, so
//! plain integers suffice; everyone else sees immutable [`UsageSnapshot`]
//! copies.

use serde::Serialize;

use crate::connectivity::ConnectivityType;
use crate::types::{BytesTransferred, RequestCount};

/// Cumulative totals for a single connectivity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeUsage {
    pub connectivity: ConnectivityType,
    pub requests: RequestCount,
    pub bytes: BytesTransferred,
}

impl TypeUsage {
    #[must_use]
    pub fn has_traffic(&self) -> bool {
        self.requests.get() > 0
    }
}

/// Counter arena: one row per connectivity type
///
/// Single-writer by construction — only the dispatch worker calls
/// [`record`](Self::record). Reads from other threads go through
/// [`snapshot`](Self::snapshot) copies requested over the dispatch queue.
#[derive(Debug, Default)]
pub struct UsageCounters {
    slots: [Slot; ConnectivityType::COUNT],
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    requests: RequestCount,
    bytes: BytesTransferred,
}

impl UsageCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dispatched exchange: +1 request, + its known bytes
    pub fn record(&mut self, connectivity: ConnectivityType, bytes: BytesTransferred) {
        let slot = &mut self.slots[connectivity.index()];
        slot.requests.increment();
        slot.bytes += bytes;
    }

    /// Point-in-time copy of all counters
    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        let rows = ConnectivityType::ALL.map(|connectivity| {
            let slot = self.slots[connectivity.index()];
            TypeUsage {
                connectivity,
                requests: slot.requests,
                bytes: slot.bytes,
            }
        });
        UsageSnapshot { rows }
    }
}

/// Immutable copy of the aggregate counters (for display/reporting)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    rows: [TypeUsage; ConnectivityType::COUNT],
}

impl UsageSnapshot {
    /// Row for one connectivity type
    #[must_use]
    pub fn for_connectivity(&self, connectivity: ConnectivityType) -> TypeUsage {
        self.rows[connectivity.index()]
    }

    /// All rows, in arena order
    #[must_use]
    pub fn rows(&self) -> &[TypeUsage] {
        &self.rows
    }

    /// Total requests across every connectivity type
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.rows.iter().map(|row| row.requests.get()).sum()
    }

    /// Total bytes across every connectivity type
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.rows.iter().map(|row| row.bytes.as_u64()).sum()
    }

    /// Rows that saw at least one request
    pub fn active_rows(&self) -> impl Iterator<Item = &TypeUsage> + '_ {
        self.rows.iter().filter(|row| row.has_traffic())
    }
}

impl Default for UsageSnapshot {
    fn default() -> Self {
        UsageCounters::default().snapshot()
    }
}
