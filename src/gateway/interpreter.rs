//! Store effect interpreter backed by the GraphQL gateway.
//!
//! Key implementation details:
//! - One query fetches every campaign with its participations, already
//!   filtered to non-deleted accounts and ordered by threshold
//! - Mutations report `affected_rows`, which the applier checks
//! - No retries here: a failed call fails the poll cycle, and the scheduler's
//!   long delay is the retry policy

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::effects::{StoreEffect, StoreInterpreter, StoreResponse};
use crate::types::{AccountId, Campaign, CampaignId, Participation, ParticipationId};

use super::client::GraphQlClient;
use super::error::GatewayError;

// ─── GraphQL Documents ────────────────────────────────────────────────────────

/// Every campaign with the participations of accounts that are not soft-deleted.
const CAMPAIGNS_QUERY: &str = r#"
query GetParticipations {
    campaigns(order_by: [{id: asc}]) {
        id
        title
        participations(
            order_by: [{threshold: asc}, {id: asc}]
            where: {account: {smazano: {_eq: false}}}
        ) {
            id
            account_id
            campaign_id
            campaign {
                title
            }
            threshold
            condition_is_fulfilled
            confirmed
        }
    }
}
"#;

const INSERT_NOTIFICATION_MUTATION: &str = r#"
mutation InsertNotification($campaign_id: Int, $account_id: Int, $content: String) {
    insert_campaign_notifications(
        objects: {campaign_id: $campaign_id, account_id: $account_id, content: $content}
    ) {
        affected_rows
    }
}
"#;

const UPDATE_FULFILLMENT_MUTATION: &str = r#"
mutation UpdateFulfillment($id: Int, $condition_is_fulfilled: Boolean) {
    update_participations(
        where: {id: {_eq: $id}}
        _set: {condition_is_fulfilled: $condition_is_fulfilled}
    ) {
        affected_rows
    }
}
"#;

// ─── Wire Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CampaignsData {
    campaigns: Vec<WireCampaign>,
}

#[derive(Debug, Deserialize)]
struct WireCampaign {
    id: i64,
    title: String,
    #[serde(default)]
    participations: Vec<WireParticipation>,
}

#[derive(Debug, Deserialize)]
struct WireParticipation {
    id: i64,
    account_id: i64,
    campaign_id: i64,
    campaign: Option<WireCampaignRef>,
    threshold: Option<i64>,
    condition_is_fulfilled: Option<bool>,
    #[serde(default)]
    confirmed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireCampaignRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct InsertNotificationData {
    insert_campaign_notifications: Option<AffectedRows>,
}

#[derive(Debug, Deserialize)]
struct UpdateParticipationsData {
    update_participations: Option<AffectedRows>,
}

#[derive(Debug, Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

impl WireCampaign {
    fn into_campaign(self) -> Campaign {
        let campaign_id = CampaignId(self.id);
        let title = self.title;

        let participations = self
            .participations
            .into_iter()
            .filter_map(|p| {
                // A null threshold cannot be ranked; skip it like a negative one.
                let Some(threshold) = p.threshold else {
                    warn!(
                        participation = p.id,
                        campaign = %campaign_id,
                        "Skipping participation without a threshold"
                    );
                    return None;
                };
                Some(Participation {
                    id: ParticipationId(p.id),
                    account_id: AccountId(p.account_id),
                    campaign_id: CampaignId(p.campaign_id),
                    campaign_title: p.campaign.map_or_else(|| title.clone(), |c| c.title),
                    threshold,
                    condition_is_fulfilled: p.condition_is_fulfilled.unwrap_or(false),
                    confirmed: p.confirmed.unwrap_or(false),
                })
            })
            .collect();

        Campaign {
            id: campaign_id,
            title,
            participations,
        }
    }
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl StoreInterpreter for GraphQlClient {
    type Error = GatewayError;

    async fn interpret(&self, effect: StoreEffect) -> Result<StoreResponse, Self::Error> {
        match effect {
            StoreEffect::FetchCampaigns => {
                fetch_campaigns(self).await.map(StoreResponse::Campaigns)
            }
            StoreEffect::InsertNotification {
                campaign_id,
                account_id,
                content,
            } => insert_notification(self, campaign_id, account_id, &content)
                .await
                .map(StoreResponse::AffectedRows),
            StoreEffect::SetConditionFulfilled {
                participation_id,
                fulfilled,
            } => set_condition_fulfilled(self, participation_id, fulfilled)
                .await
                .map(StoreResponse::AffectedRows),
        }
    }
}

async fn fetch_campaigns(client: &GraphQlClient) -> Result<Vec<Campaign>, GatewayError> {
    let data: CampaignsData = client
        .execute("fetch_campaigns", CAMPAIGNS_QUERY, json!({}))
        .await?;

    Ok(data
        .campaigns
        .into_iter()
        .map(WireCampaign::into_campaign)
        .collect())
}

async fn insert_notification(
    client: &GraphQlClient,
    campaign_id: CampaignId,
    account_id: AccountId,
    content: &str,
) -> Result<u64, GatewayError> {
    let data: InsertNotificationData = client
        .execute(
            "insert_notification",
            INSERT_NOTIFICATION_MUTATION,
            json!({
                "campaign_id": campaign_id,
                "account_id": account_id,
                "content": content,
            }),
        )
        .await?;

    data.insert_campaign_notifications
        .map(|r| r.affected_rows)
        .ok_or_else(|| {
            GatewayError::malformed("insert_campaign_notifications missing from response")
        })
}

async fn set_condition_fulfilled(
    client: &GraphQlClient,
    participation_id: ParticipationId,
    fulfilled: bool,
) -> Result<u64, GatewayError> {
    let data: UpdateParticipationsData = client
        .execute(
            "set_condition_fulfilled",
            UPDATE_FULFILLMENT_MUTATION,
            json!({
                "id": participation_id,
                "condition_is_fulfilled": fulfilled,
            }),
        )
        .await?;

    data.update_participations
        .map(|r| r.affected_rows)
        .ok_or_else(|| GatewayError::malformed("update_participations missing from response"))
}
