use crate::types::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown time-left bucket \"{value}\"")]
    UnknownBucket { value: String },

    #[error("snapshot {snapshot} for realm '{realm}' is not after high-water mark {last}")]
    OutOfOrderSnapshot {
        realm: String,
        snapshot: Timestamp,
        last: Timestamp,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TrackResult<T> = Result<T, TrackError>;
