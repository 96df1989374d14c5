//! Type-safe identifiers and measurement types
//!
//! All counter values are wrapped in newtypes so request sizes, response
//! sizes and request counts cannot be mixed up at call sites.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Define a simple u64-based counter newtype with standard operations
macro_rules! counter_type {
    ($name:ident, $unit:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            #[inline]
            pub fn increment(&mut self) {
                self.0 += 1;
            }

            #[must_use]
            #[inline]
            pub const fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("{} ", $unit), self.0)
            }
        }
    };
}

/// Define a u64-based byte counter newtype with accumulation operations
macro_rules! byte_counter_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[must_use]
            pub const fn new(bytes: u64) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            #[inline]
            pub fn add(&mut self, bytes: usize) {
                self.0 += bytes as u64;
            }

            #[must_use]
            #[inline]
            pub const fn saturating_add_u64(self, bytes: u64) -> Self {
                Self(self.0.saturating_add(bytes))
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(bytes: u64) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for u64 {
            #[inline]
            fn from(bytes: $name) -> Self {
                bytes.0
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, other: Self) -> Self {
                Self(self.0 + other.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, other: Self) {
                self.0 += other.0;
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} bytes", self.0)
            }
        }
    };
}

/// Identity of one request/response exchange
///
/// Assigned by the interceptor when the request leaves the client; never
/// generated inside this crate. The id stays fixed for the lifetime of the
/// exchange and of the stat record built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Request body bytes sent to the server
byte_counter_type!(BytesSent);

// Response body bytes received from the server
byte_counter_type!(BytesReceived);

// Combined traffic in either direction
byte_counter_type!(BytesTransferred);

counter_type!(RequestCount, "requests");

impl From<BytesSent> for BytesTransferred {
    #[inline]
    fn from(bytes: BytesSent) -> Self {
        Self(bytes.as_u64())
    }
}

impl From<BytesReceived> for BytesTransferred {
    #[inline]
    fn from(bytes: BytesReceived) -> Self {
        Self(bytes.as_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: new() and as_u64() round-trip correctly
        #[test]
        fn prop_byte_counters_roundtrip(value in 0u64..=u64::MAX / 2) {
            prop_assert_eq!(BytesSent::new(value).as_u64(), value);
            prop_assert_eq!(BytesReceived::new(value).as_u64(), value);
            prop_assert_eq!(BytesTransferred::new(value).as_u64(), value);
        }

        /// Property: add() accumulates usize increments
        #[test]
        fn prop_bytes_add(initial in 0u64..1_000_000, increment in 0usize..1_000_000) {
            let mut bytes = BytesReceived::new(initial);
            BytesReceived::add(&mut bytes, increment);
            prop_assert_eq!(bytes.as_u64(), initial + increment as u64);
        }

        /// Property: addition operator is commutative
        #[test]
        fn prop_bytes_add_commutative(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let x = BytesTransferred::new(a);
            let y = BytesTransferred::new(b);
            prop_assert_eq!(x + y, y + x);
        }

        /// Property: saturating_add_u64 never overflows
        #[test]
        fn prop_bytes_saturating(a in 0u64..=u64::MAX, b in 0u64..=u64::MAX) {
            let sum = BytesTransferred::new(a).saturating_add_u64(b);
            prop_assert_eq!(sum.as_u64(), a.saturating_add(b));
        }

        /// Property: request count increments one at a time
        #[test]
        fn prop_request_count_increment(initial in 0u64..1_000_000) {
            let mut count = RequestCount::new(initial);
            count.increment();
            prop_assert_eq!(count.get(), initial + 1);
        }

        /// Property: From<u64> conversions hold for all value types
        #[test]
        fn prop_from_u64_conversions(value in 0u64..1_000_000) {
            prop_assert_eq!(RequestId::from(value).get(), value);
            prop_assert_eq!(BytesSent::from(value).as_u64(), value);
            prop_assert_eq!(BytesReceived::from(value).as_u64(), value);
            prop_assert_eq!(RequestCount::from(value).get(), value);
        }
    }

    #[test]
    fn test_zero_constants() {
        assert_eq!(BytesSent::ZERO.as_u64(), 0);
        assert_eq!(BytesReceived::ZERO.as_u64(), 0);
        assert_eq!(BytesTransferred::ZERO.as_u64(), 0);
        assert_eq!(RequestCount::ZERO.get(), 0);
    }

    #[test]
    fn test_add_assign() {
        let mut total = BytesTransferred::new(100);
        total += BytesTransferred::new(50);
        assert_eq!(total.as_u64(), 150);
    }

    #[test]
    fn test_directional_conversions() {
        let sent = BytesSent::new(512);
        let received = BytesReceived::new(1024);
        assert_eq!(BytesTransferred::from(sent).as_u64(), 512);
        assert_eq!(BytesTransferred::from(received).as_u64(), 1024);
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId::new(7).to_string(), "#7");
    }
}
