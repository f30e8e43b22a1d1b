//! Newtype wrappers for store identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing an
//! `AccountId` where a `ParticipationId` is expected). All of them are integer
//! primary keys on the store side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A campaign primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub i64);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CampaignId {
    fn from(n: i64) -> Self {
        CampaignId(n)
    }
}

/// A participation primary key.
///
/// Also serves as the tie-break when two participations declare the same threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipationId(pub i64);

impl fmt::Display for ParticipationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticipationId {
    fn from(n: i64) -> Self {
        ParticipationId(n)
    }
}

/// An account primary key (the owner of a participation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(n: i64) -> Self {
        AccountId(n)
    }
}
