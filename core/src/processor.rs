//! The snapshot diff engine: one snapshot applied against the work set.
//!
//! RULES:
//!   - Snapshots apply strictly in ascending timestamp order; the
//!     precondition rejects anything at or before the high-water mark.
//!   - A snapshot is applied to completion or not at all. No I/O happens
//!     mid-diff except the per-closure sink append.
//!   - All counters are returned in DiffResult, never held in shared
//!     state, so independent realms can run in parallel safely.

use crate::{
    closure::{classify, ClosureSink, Outcome},
    deadline,
    error::{TrackError, TrackResult},
    lifecycle::{LifecycleRecord, RealmState},
    listing::Listing,
    types::{ListingId, Timestamp},
};
use std::collections::HashSet;

/// Counters for one processed snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub created: u64,
    /// Listings with at least one observed field change this snapshot.
    pub modified: u64,
    pub bid_raised: u64,
    pub bucket_adjusted: u64,
    pub owner_moved: u64,
    pub closed: u64,
    pub bought: u64,
    pub auctioned: u64,
    pub expired: u64,
}

/// Apply one snapshot to the realm's work set.
///
/// Every incoming listing is either created or updated and marked seen;
/// every tracked listing not seen is classified, emitted through `sink`,
/// and removed. On success the high-water mark advances to
/// `snapshot_time`.
pub fn process_snapshot(
    state: &mut RealmState,
    snapshot_time: Timestamp,
    listings: &[Listing],
    sink: &mut dyn ClosureSink,
) -> TrackResult<DiffResult> {
    if let Some(last) = state.last_time {
        if snapshot_time <= last {
            return Err(TrackError::OutOfOrderSnapshot {
                realm: state.realm.clone(),
                snapshot: snapshot_time,
                last,
            });
        }
    }

    let mut diff = DiffResult::default();
    let mut seen: HashSet<ListingId> = HashSet::with_capacity(listings.len());

    for listing in listings {
        if state.work_set.contains_key(&listing.auc) {
            apply_entry(state, snapshot_time, listing, &mut diff);
        } else {
            create_entry(state, snapshot_time, listing, &mut diff);
        }
        seen.insert(listing.auc);
    }

    let vanished: Vec<ListingId> = state
        .work_set
        .keys()
        .filter(|id| !seen.contains(id))
        .copied()
        .collect();

    for id in vanished {
        // Ownership moves out of the work set before emission; the record
        // either becomes a durable ClosureRecord or the whole run errors.
        let record = state
            .work_set
            .remove(&id)
            .ok_or_else(|| anyhow::anyhow!("work set entry {id} vanished mid-diff"))?;
        let closure = classify(&record, snapshot_time);
        sink.append(&state.realm, &closure, &record.listing)?;
        diff.closed += 1;
        match closure.outcome {
            Outcome::Bought => diff.bought += 1,
            Outcome::Auctioned => diff.auctioned += 1,
            Outcome::Expired => diff.expired += 1,
        }
    }

    state.last_time = Some(snapshot_time);

    log::info!(
        "{} @ {}: {} open, created {}, changed {} [bids:{}, adj:{}, moves:{}], closed {}",
        state.realm,
        snapshot_time,
        state.open_count(),
        diff.created,
        diff.modified,
        diff.bid_raised,
        diff.bucket_adjusted,
        diff.owner_moved,
        diff.closed,
    );

    Ok(diff)
}

fn create_entry(
    state: &mut RealmState,
    snapshot_time: Timestamp,
    listing: &Listing,
    diff: &mut DiffResult,
) {
    // The prior high-water mark bounds the deadline from above: the
    // listing did not exist when the previous snapshot was taken.
    let deadline = deadline::estimate(listing.time_left, snapshot_time, state.last_time);
    let record = LifecycleRecord {
        listing: listing.clone(),
        created: snapshot_time,
        deadline,
        last_seen: snapshot_time,
        first_bid: listing.bid,
        last_bid: listing.bid,
        raised: false,
        moved: false,
    };
    state.work_set.insert(listing.auc, record);
    diff.created += 1;
}

fn apply_entry(
    state: &mut RealmState,
    snapshot_time: Timestamp,
    listing: &Listing,
    diff: &mut DiffResult,
) {
    let Some(record) = state.work_set.get_mut(&listing.auc) else {
        return;
    };
    record.last_seen = snapshot_time;
    let mut changed = false;

    if listing.bid != record.last_bid {
        record.last_bid = listing.bid;
        record.listing.bid = listing.bid;
        record.raised = true;
        diff.bid_raised += 1;
        changed = true;
    }
    if listing.time_left != record.listing.time_left {
        record.listing.time_left = listing.time_left;
        record.deadline = deadline::reset_estimate(listing.time_left, snapshot_time);
        diff.bucket_adjusted += 1;
        changed = true;
    }
    if listing.owner != record.listing.owner || listing.owner_realm != record.listing.owner_realm {
        record.listing.owner = listing.owner.clone();
        record.listing.owner_realm = listing.owner_realm.clone();
        record.moved = true;
        diff.owner_moved += 1;
        changed = true;
    }

    if changed {
        diff.modified += 1;
    }
}
