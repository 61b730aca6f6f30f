//! Auction listing lifecycle tracker.
//!
//! Replays realm snapshot files in timestamp order against a persistent
//! work set of open listings, estimates each listing's expiry deadline
//! from the coarse time-left buckets, and classifies every listing that
//! vanishes between snapshots as bought, auctioned or expired.

pub mod batch;
pub mod closure;
pub mod config;
pub mod deadline;
pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod processor;
pub mod source;
pub mod store;
pub mod types;

pub use batch::{run_batch, RunStatistics};
pub use closure::{classify, ClosureRecord, ClosureSink, Outcome};
pub use config::TrackerConfig;
pub use error::{TrackError, TrackResult};
pub use lifecycle::{LifecycleRecord, RealmState};
pub use listing::{Listing, SnapshotData, TimeLeft};
pub use processor::{process_snapshot, DiffResult};
pub use source::{DirectorySource, SnapshotMeta, SnapshotSource};
pub use store::TrackStore;
