//! Closure classification and the immutable output record.
//!
//! Classification is a fixed decision table; first matching rule wins:
//!   1. deadline strictly before the closing snapshot time -> bought
//!      (the natural expiry window had already passed unobserved, so a
//!      buyout must have consumed the listing), profit = buyout;
//!   2. a bid raise was observed -> auctioned, profit = last seen bid;
//!   3. otherwise -> expired, profit = 0.
//! The ordering means a raised-then-bought listing classifies as bought.
//! That precedence is deliberate and documented; do not reorder.

use crate::{
    error::TrackResult,
    lifecycle::LifecycleRecord,
    listing::Listing,
    types::{ListingId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Bought,
    Auctioned,
    Expired,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bought => "bought",
            Self::Auctioned => "auctioned",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The immutable fact emitted once per closed listing. Never mutated or
/// re-read by the tracker after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub listing_id: ListingId,
    pub opened_at: Timestamp,
    pub closed_at: Timestamp,
    pub outcome: Outcome,
    pub profit: i64,
}

/// Classify a tracked listing that vanished from the snapshot taken at
/// `closed_at`.
pub fn classify(record: &LifecycleRecord, closed_at: Timestamp) -> ClosureRecord {
    let (outcome, profit) = if record.deadline < closed_at {
        (Outcome::Bought, record.listing.buyout)
    } else if record.raised {
        (Outcome::Auctioned, record.last_bid)
    } else {
        (Outcome::Expired, 0)
    };
    ClosureRecord {
        listing_id: record.listing.auc,
        opened_at: record.created,
        closed_at,
        outcome,
        profit,
    }
}

/// The append-only output sink for closed listings. One call appends the
/// closure record and the full listing to their companion logs in
/// lock-step: both appends are durable together or not at all. Returns
/// the record's position in the closure log.
pub trait ClosureSink {
    fn append(
        &mut self,
        realm: &str,
        record: &ClosureRecord,
        listing: &Listing,
    ) -> TrackResult<i64>;
}
