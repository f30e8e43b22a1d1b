//! Effects-as-data for store operations.
//!
//! The reconciler never talks to the store directly. It describes each read
//! and write as a [`StoreEffect`] and hands it to a [`StoreInterpreter`]. This
//! keeps the evaluation and scheduling logic testable against an in-memory
//! interpreter, and gives every store call a loggable shape.

use serde::{Deserialize, Serialize};

pub mod interpreter;
pub mod notification;

pub use interpreter::StoreInterpreter;
pub use notification::{Direction, notification_content};

use crate::types::{AccountId, Campaign, CampaignId, ParticipationId};

/// A store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEffect {
    // ─── Queries ──────────────────────────────────────────────────────────────
    /// Fetch every campaign with its visible participations.
    FetchCampaigns,

    // ─── Mutations ────────────────────────────────────────────────────────────
    /// Insert one notification record for an account.
    InsertNotification {
        campaign_id: CampaignId,
        account_id: AccountId,
        content: String,
    },

    /// Set `condition_is_fulfilled` on exactly one participation.
    SetConditionFulfilled {
        participation_id: ParticipationId,
        fulfilled: bool,
    },
}

impl StoreEffect {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StoreEffect::FetchCampaigns => "fetch_campaigns",
            StoreEffect::InsertNotification { .. } => "insert_notification",
            StoreEffect::SetConditionFulfilled { .. } => "set_condition_fulfilled",
        }
    }

    /// Whether this effect mutates the store.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, StoreEffect::FetchCampaigns)
    }
}

/// The response to a [`StoreEffect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoreResponse {
    /// Response to `FetchCampaigns`.
    Campaigns(Vec<Campaign>),

    /// Response to a mutation: how many rows it touched.
    AffectedRows(u64),
}

impl StoreResponse {
    /// Short name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StoreResponse::Campaigns(_) => "campaigns",
            StoreResponse::AffectedRows(_) => "affected_rows",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_serialize_with_type_tag() {
        let effect = StoreEffect::SetConditionFulfilled {
            participation_id: ParticipationId(9),
            fulfilled: true,
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "set_condition_fulfilled");
        assert_eq!(json["participation_id"], 9);
        assert_eq!(json["fulfilled"], true);
    }

    #[test]
    fn only_fetch_is_not_a_mutation() {
        assert!(!StoreEffect::FetchCampaigns.is_mutation());
        assert!(
            StoreEffect::InsertNotification {
                campaign_id: CampaignId(1),
                account_id: AccountId(1),
                content: String::new(),
            }
            .is_mutation()
        );
    }
}
