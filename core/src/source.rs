//! Snapshot discovery and decoding.
//!
//! Snapshots live on disk as JSON files named
//! `{region}-{slug}-{YYYYMMDD_HHMMSS}.json`, where `{region}-{slug}`
//! identifies the realm (the realm id proper is `region:slug`) and the
//! trailing stamp is the capture time in UTC. Listing order comes from the
//! filename stamps, never from file mtimes.

use crate::{
    error::{TrackError, TrackResult},
    listing::SnapshotData,
    types::Timestamp,
};
use chrono::{NaiveDateTime, TimeZone, Utc};
use std::fs;
use std::path::PathBuf;

/// One discovered snapshot, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub path: PathBuf,
    pub taken_at: Timestamp,
}

/// Where snapshots come from. The directory source below is the only
/// production implementation; tests substitute in-memory sources.
pub trait SnapshotSource {
    /// All snapshots for `realm`, ascending by capture time.
    fn list(&self, realm: &str) -> TrackResult<Vec<SnapshotMeta>>;
    fn decode(&self, meta: &SnapshotMeta) -> TrackResult<SnapshotData>;
}

pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotSource for DirectorySource {
    fn list(&self, realm: &str) -> TrackResult<Vec<SnapshotMeta>> {
        let prefix = format!("{}-", realm.replace(':', "-"));
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) {
                continue;
            }
            if let Some(taken_at) = parse_stamp(name, &prefix) {
                found.push(SnapshotMeta {
                    path: entry.path(),
                    taken_at,
                });
            } else {
                log::warn!("ignoring unparseable snapshot name {name}");
            }
        }
        found.sort_by_key(|m| m.taken_at);
        Ok(found)
    }

    fn decode(&self, meta: &SnapshotMeta) -> TrackResult<SnapshotData> {
        let raw = fs::read_to_string(&meta.path)?;
        let data: SnapshotData = serde_json::from_str(&raw)?;
        Ok(data)
    }
}

/// Extract the capture time from `{prefix}{YYYYMMDD_HHMMSS}.json`.
fn parse_stamp(name: &str, prefix: &str) -> Option<Timestamp> {
    let stamp = name.strip_prefix(prefix)?.strip_suffix(".json")?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok()?;
    Utc.from_local_datetime(&naive).single()
}

/// Render the canonical file name for a realm's snapshot. Inverse of the
/// parsing in [`DirectorySource::list`].
pub fn snapshot_file_name(realm: &str, taken_at: Timestamp) -> String {
    format!(
        "{}-{}.json",
        realm.replace(':', "-"),
        taken_at.format("%Y%m%d_%H%M%S"),
    )
}

/// Split a `region:slug` realm id. Errors on anything else.
pub fn split_realm(realm: &str) -> TrackResult<(&str, &str)> {
    realm
        .split_once(':')
        .filter(|(region, slug)| !region.is_empty() && !slug.is_empty())
        .ok_or_else(|| {
            TrackError::Other(anyhow::anyhow!(
                "realm '{realm}' is not of the form region:slug"
            ))
        })
}
