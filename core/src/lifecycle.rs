//! Per-realm lifecycle state: the work set of currently open listings and
//! the realm's high-water mark.
//!
//! RULE: A LifecycleRecord exists in the work set if and only if the
//! listing was present in the most recently processed snapshot that
//! included it and has not yet been classified as closed. Closure removes
//! the record and emits a ClosureRecord in the same operation.

use crate::{
    listing::Listing,
    types::{ListingId, RealmId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The mutable lifecycle of one open listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    /// Latest observed listing fields.
    pub listing: Listing,
    pub created: Timestamp,
    pub deadline: Timestamp,
    pub last_seen: Timestamp,
    pub first_bid: i64,
    pub last_bid: i64,
    /// A bid increase was observed at some point.
    #[serde(default)]
    pub raised: bool,
    /// The owner name or owner realm changed at some point.
    #[serde(default)]
    pub moved: bool,
}

/// The full tracked state of one realm. Exclusively owned by whichever
/// batch run is processing the realm; never shared across realms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PersistedRealmState", from = "PersistedRealmState")]
pub struct RealmState {
    pub realm: RealmId,
    /// High-water mark: the time of the most recently processed snapshot.
    /// `None` until the first snapshot is processed. Monotonically
    /// non-decreasing for the lifetime of the state.
    pub last_time: Option<Timestamp>,
    pub work_set: HashMap<ListingId, LifecycleRecord>,
}

impl RealmState {
    pub fn new(realm: impl Into<RealmId>) -> Self {
        Self {
            realm: realm.into(),
            last_time: None,
            work_set: HashMap::new(),
        }
    }

    /// Whether a snapshot taken at `at` still needs processing.
    pub fn snapshot_needed(&self, at: Timestamp) -> bool {
        match self.last_time {
            Some(last) => last < at,
            None => true,
        }
    }

    pub fn open_count(&self) -> usize {
        self.work_set.len()
    }
}

/// The serialized form: the work set flattened to a list, keyed back by
/// listing id on load. Round trip preserves the high-water mark and the
/// open-record set, independent of list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRealmState {
    realm: RealmId,
    last_time: Option<Timestamp>,
    records: Vec<LifecycleRecord>,
}

impl From<RealmState> for PersistedRealmState {
    fn from(state: RealmState) -> Self {
        Self {
            realm: state.realm,
            last_time: state.last_time,
            records: state.work_set.into_values().collect(),
        }
    }
}

impl From<PersistedRealmState> for RealmState {
    fn from(persisted: PersistedRealmState) -> Self {
        let work_set = persisted
            .records
            .into_iter()
            .map(|r| (r.listing.auc, r))
            .collect();
        Self {
            realm: persisted.realm,
            last_time: persisted.last_time,
            work_set,
        }
    }
}
