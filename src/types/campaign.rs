//! Campaign and participation records as the worker sees them.
//!
//! These are read fresh from the store every poll cycle. The worker never
//! creates or deletes them; the only field it writes back is
//! `condition_is_fulfilled`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::{AccountId, CampaignId, ParticipationId};

/// A campaign together with the participations of non-deleted accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    /// Participations in store order (threshold ascending, as requested by the query).
    pub participations: Vec<Participation>,
}

/// One account's pledge to act on a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub account_id: AccountId,
    pub campaign_id: CampaignId,
    /// Title of the owning campaign, echoed into notification content.
    pub campaign_title: String,
    /// The threshold as declared by the account.
    ///
    /// Kept signed because the store column is a plain integer; use
    /// [`Participation::validated_threshold`] before ranking.
    pub threshold: i64,
    pub condition_is_fulfilled: bool,
    /// Owned by the confirmation workflow. Read-only here.
    pub confirmed: bool,
}

impl Participation {
    /// Returns the threshold if it is a valid non-negative count.
    pub fn validated_threshold(&self) -> Result<Threshold, InvalidThreshold> {
        Threshold::try_from(self.threshold).map_err(|_| InvalidThreshold {
            participation: self.id,
            campaign: self.campaign_id,
            value: self.threshold,
        })
    }
}

/// The minimum number of other ranked participants an account requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(u32);

impl Threshold {
    pub fn new(value: u32) -> Self {
        Threshold(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether this threshold is satisfied at the given 1-based rank.
    pub fn satisfied_at_rank(self, rank: usize) -> bool {
        (self.0 as usize) < rank
    }
}

impl TryFrom<i64> for Threshold {
    type Error = std::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Threshold)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participation whose declared threshold cannot be ranked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("participation {participation} in campaign {campaign} has invalid threshold {value}")]
pub struct InvalidThreshold {
    pub participation: ParticipationId,
    pub campaign: CampaignId,
    pub value: i64,
}
