//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. The processor and the batch
//! driver go through load/save and the ClosureSink trait, they never
//! execute SQL directly.
//!
//! Realm state is persisted whole (the full work set serialized per save),
//! never incrementally. The two output logs are append-only and written in
//! lock-step inside one transaction per closure.

use crate::{
    closure::{ClosureRecord, ClosureSink, Outcome},
    error::{TrackError, TrackResult},
    lifecycle::RealmState,
    listing::Listing,
    types::Timestamp,
};
use chrono::DateTime;
use rusqlite::{params, Connection};

pub struct TrackStore {
    conn: Connection,
}

impl TrackStore {
    pub fn open(path: &str) -> TrackResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> TrackResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> TrackResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Realm state ────────────────────────────────────────────

    /// Load a realm's state. A realm with no persisted state yields an
    /// empty work set and no high-water mark, which is not an error.
    pub fn load_realm_state(&self, realm: &str) -> TrackResult<RealmState> {
        let row: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM realm_state WHERE realm = ?1",
                params![realm],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match row {
            Some(json) => {
                let state: RealmState = serde_json::from_str(&json)?;
                log::info!(
                    "loaded state for {}: {} open listings, high-water mark {:?}",
                    realm,
                    state.open_count(),
                    state.last_time,
                );
                Ok(state)
            }
            None => {
                log::info!("no prior state for {realm}, starting empty");
                Ok(RealmState::new(realm))
            }
        }
    }

    /// Persist a realm's state whole. Only valid between batch iterations,
    /// never while a snapshot diff is in progress.
    pub fn save_realm_state(&self, state: &RealmState) -> TrackResult<()> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO realm_state (realm, last_time, state_json)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(realm) DO UPDATE SET
                 last_time = excluded.last_time,
                 state_json = excluded.state_json",
            params![
                state.realm,
                state.last_time.map(|t| t.timestamp()),
                json
            ],
        )?;
        log::info!(
            "saved state for {}: {} open listings",
            state.realm,
            state.open_count(),
        );
        Ok(())
    }

    // ── Closure log read-back (tests and run summaries) ────────

    pub fn closure_count(&self, realm: &str) -> TrackResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM closure_log WHERE realm = ?1",
                params![realm],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn closures_for_realm(&self, realm: &str) -> TrackResult<Vec<ClosureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT listing_id, opened_at, closed_at, outcome, profit
             FROM closure_log WHERE realm = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![realm], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(listing_id, opened, closed, outcome, profit)| {
                Ok(ClosureRecord {
                    listing_id,
                    opened_at: from_unix(opened)?,
                    closed_at: from_unix(closed)?,
                    outcome: parse_outcome(&outcome)?,
                    profit,
                })
            })
            .collect()
    }

    /// Listings logged alongside closures, in append order.
    pub fn logged_listings(&self, realm: &str) -> TrackResult<Vec<Listing>> {
        let mut stmt = self.conn.prepare(
            "SELECT listing_json FROM listing_log WHERE realm = ?1 ORDER BY id ASC",
        )?;
        let rows: Vec<String> = stmt
            .query_map(params![realm], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }

    pub fn logged_listing_count(&self, realm: &str) -> TrackResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM listing_log WHERE realm = ?1",
                params![realm],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

impl ClosureSink for TrackStore {
    /// Append the closure record and the full listing in lock-step. The
    /// transaction guarantees both rows land at the same ordinal position
    /// or neither is durable.
    fn append(
        &mut self,
        realm: &str,
        record: &ClosureRecord,
        listing: &Listing,
    ) -> TrackResult<i64> {
        let listing_json = serde_json::to_string(listing)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO closure_log (realm, listing_id, opened_at, closed_at, outcome, profit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                realm,
                record.listing_id,
                record.opened_at.timestamp(),
                record.closed_at.timestamp(),
                record.outcome.as_str(),
                record.profit,
            ],
        )?;
        let position = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO listing_log (realm, closure_id, listing_json) VALUES (?1, ?2, ?3)",
            params![realm, position, listing_json],
        )?;
        tx.commit()?;
        Ok(position)
    }
}

fn from_unix(secs: i64) -> TrackResult<Timestamp> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TrackError::Other(anyhow::anyhow!("timestamp {secs} out of range")))
}

fn parse_outcome(s: &str) -> TrackResult<Outcome> {
    match s {
        "bought" => Ok(Outcome::Bought),
        "auctioned" => Ok(Outcome::Auctioned),
        "expired" => Ok(Outcome::Expired),
        other => Err(TrackError::Other(anyhow::anyhow!(
            "unknown outcome '{other}' in closure log"
        ))),
    }
}
