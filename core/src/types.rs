//! Shared primitive types used across the tracker.

use chrono::{DateTime, Utc};

/// A listing identifier. Unique within a realm at any instant; one logical
/// listing keeps its id for its entire lifetime.
pub type ListingId = i64;

/// A realm identifier, e.g. "eu:fordragon". Listings and lifecycle state
/// never cross realm boundaries.
pub type RealmId = String;

/// All observation and deadline times are UTC instants.
pub type Timestamp = DateTime<Utc>;
