//! The listing model: one canonical record with optional attribute groups.
//!
//! RULE: There is exactly one Listing type. The base / bonus / modifier /
//! pet "shapes" of the upstream dump are expressed by which optional groups
//! are populated, and serialization omits absent groups, so the emitted
//! shape follows the data rather than a type hierarchy.

use crate::{
    error::TrackError,
    types::ListingId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The coarse time-remaining field. The taxonomy is closed: the four
/// variants are the only legal values, and anything else is rejected at
/// decode time as `UnknownBucket`; deadline inference depends on this
/// never being guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeLeft {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl TimeLeft {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "SHORT",
            Self::Medium => "MEDIUM",
            Self::Long => "LONG",
            Self::VeryLong => "VERY_LONG",
        }
    }
}

impl FromStr for TimeLeft {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHORT" => Ok(Self::Short),
            "MEDIUM" => Ok(Self::Medium),
            "LONG" => Ok(Self::Long),
            "VERY_LONG" => Ok(Self::VeryLong),
            other => Err(TrackError::UnknownBucket {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TimeLeft {
    type Error = TrackError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeLeft> for String {
    fn from(t: TimeLeft) -> String {
        t.as_str().to_string()
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item modifier (type/value pair), carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "type")]
    pub kind: i32,
    pub value: i32,
}

/// A bonus-list reference, carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "bonusListId")]
    pub bonus_list_id: i32,
}

/// Pet attributes. Present as a whole or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetInfo {
    #[serde(rename = "petSpeciesId")]
    pub species_id: i32,
    #[serde(rename = "petBreedId")]
    pub breed_id: i32,
    #[serde(rename = "petLevel")]
    pub level: i32,
    #[serde(rename = "petQualityId")]
    pub quality_id: i32,
}

/// One open listing as observed in a snapshot. Field names follow the
/// upstream dump format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub auc: ListingId,
    pub item: i64,
    #[serde(default)]
    pub owner: String,
    #[serde(rename = "ownerRealm", default)]
    pub owner_realm: String,
    pub bid: i64,
    pub buyout: i64,
    pub quantity: i32,
    #[serde(rename = "timeLeft")]
    pub time_left: TimeLeft,
    #[serde(default)]
    pub rand: i64,
    #[serde(default)]
    pub seed: i64,
    #[serde(default)]
    pub context: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<Modifier>>,
    #[serde(rename = "bonusLists", default, skip_serializing_if = "Option::is_none")]
    pub bonus_lists: Option<Vec<Bonus>>,
    #[serde(flatten)]
    pub pet: Option<PetInfo>,
}

/// A realm as named in the snapshot header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmInfo {
    pub name: String,
    pub slug: String,
}

/// The decoded form of one snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub realms: Vec<RealmInfo>,
    pub auctions: Vec<Listing>,
}
