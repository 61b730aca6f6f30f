//! Batch driver: replay every pending snapshot for a realm.
//!
//! One run loads the realm state once, walks the pending snapshots in
//! order, and saves the state once at the end. Snapshots at or before the
//! high-water mark are skipped, so re-running over the same directory is
//! idempotent. A snapshot that fails to decode is recorded and skipped;
//! the listings it would have closed are simply picked up by the next good
//! snapshot. Store failures abort the run with no state save. Closure
//! appends committed before such an abort stay durable while the
//! high-water mark does not advance, so a re-run closes those listings
//! again: across aborted runs the closure log is at-least-once, not
//! exactly-once.

use crate::{
    error::{TrackError, TrackResult},
    processor::{process_snapshot, DiffResult},
    source::{split_realm, SnapshotSource},
    store::TrackStore,
};
use uuid::Uuid;

/// The outcome of one realm's batch run.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub run_id: Uuid,
    pub realm: String,
    pub snapshots_processed: u64,
    pub snapshots_skipped: u64,
    /// File names of snapshots that could not be decoded.
    pub failed: Vec<String>,
    pub totals: DiffResult,
}

impl RunStatistics {
    fn new(realm: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            realm: realm.to_string(),
            snapshots_processed: 0,
            snapshots_skipped: 0,
            failed: Vec::new(),
            totals: DiffResult::default(),
        }
    }

    fn absorb(&mut self, diff: DiffResult) {
        self.totals.created += diff.created;
        self.totals.modified += diff.modified;
        self.totals.bid_raised += diff.bid_raised;
        self.totals.bucket_adjusted += diff.bucket_adjusted;
        self.totals.owner_moved += diff.owner_moved;
        self.totals.closed += diff.closed;
        self.totals.bought += diff.bought;
        self.totals.auctioned += diff.auctioned;
        self.totals.expired += diff.expired;
    }
}

/// Process every pending snapshot `source` holds for `realm`.
pub fn run_batch(
    store: &mut TrackStore,
    source: &dyn SnapshotSource,
    realm: &str,
) -> TrackResult<RunStatistics> {
    split_realm(realm)?;
    let mut stats = RunStatistics::new(realm);
    let mut state = store.load_realm_state(realm)?;
    let snapshots = source.list(realm)?;
    log::info!(
        "run {}: {} snapshots on disk for {realm}",
        stats.run_id,
        snapshots.len(),
    );

    for meta in &snapshots {
        if !state.snapshot_needed(meta.taken_at) {
            stats.snapshots_skipped += 1;
            continue;
        }
        let data = match source.decode(meta) {
            Ok(data) => data,
            Err(TrackError::Serialization(e)) => {
                log::warn!("skipping malformed snapshot {}: {e}", meta.path.display());
                stats.failed.push(meta.path.display().to_string());
                continue;
            }
            Err(TrackError::Io(e)) => {
                log::warn!("skipping unreadable snapshot {}: {e}", meta.path.display());
                stats.failed.push(meta.path.display().to_string());
                continue;
            }
            Err(other) => return Err(other),
        };
        let diff = process_snapshot(&mut state, meta.taken_at, &data.auctions, &mut *store)?;
        stats.absorb(diff);
        stats.snapshots_processed += 1;
    }

    store.save_realm_state(&state)?;
    log::info!(
        "run {} for {realm}: processed {}, skipped {}, failed {}, closed {} (bought {}, auctioned {}, expired {})",
        stats.run_id,
        stats.snapshots_processed,
        stats.snapshots_skipped,
        stats.failed.len(),
        stats.totals.closed,
        stats.totals.bought,
        stats.totals.auctioned,
        stats.totals.expired,
    );
    Ok(stats)
}
