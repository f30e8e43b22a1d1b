//! Finding the next fulfillment transition.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::effects::{Direction, StoreEffect, notification_content};
use crate::types::{AccountId, Campaign, CampaignId, ParticipationId, Threshold};

use super::ranking::{critical_mass_rank, rank_participations};

/// A participation whose stored flag disagrees with its desired flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub participation_id: ParticipationId,
    pub account_id: AccountId,
    pub threshold: Threshold,
    /// 1-based rank of the participation at evaluation time.
    pub rank: usize,
    /// The flag the store should hold after this transition.
    pub fulfilled: bool,
}

impl Transition {
    pub fn direction(&self) -> Direction {
        Direction::towards(self.fulfilled)
    }

    /// The notification insert announcing this transition to the account.
    pub fn notification_effect(&self) -> StoreEffect {
        StoreEffect::InsertNotification {
            campaign_id: self.campaign_id,
            account_id: self.account_id,
            content: notification_content(&self.campaign_title, self.threshold, self.direction()),
        }
    }

    /// The flag update that makes the store match the evaluation.
    pub fn update_effect(&self) -> StoreEffect {
        StoreEffect::SetConditionFulfilled {
            participation_id: self.participation_id,
            fulfilled: self.fulfilled,
        }
    }
}

/// Outcome of evaluating a single campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignEvaluation {
    pub campaign_id: CampaignId,
    /// Participations that took part in ranking.
    pub evaluated: usize,
    /// Participations dropped for an invalid threshold.
    pub excluded: usize,
    /// Rank of the last qualifying participation (0 if none).
    pub critical_mass_rank: usize,
    /// The first participation, in rank order, whose stored flag is wrong.
    pub transition: Option<Transition>,
}

/// Evaluates one campaign and returns its first required transition, if any.
pub fn evaluate_campaign(campaign: &Campaign) -> CampaignEvaluation {
    let ranking = rank_participations(campaign);
    let last_qualifying = critical_mass_rank(&ranking.ranked);

    let transition = ranking.ranked.iter().find_map(|entry| {
        let desired = entry.rank <= last_qualifying;
        let participation = entry.participation;
        (participation.condition_is_fulfilled != desired).then(|| Transition {
            campaign_id: campaign.id,
            campaign_title: participation.campaign_title.clone(),
            participation_id: participation.id,
            account_id: participation.account_id,
            threshold: entry.threshold,
            rank: entry.rank,
            fulfilled: desired,
        })
    });

    CampaignEvaluation {
        campaign_id: campaign.id,
        evaluated: ranking.ranked.len(),
        excluded: ranking.excluded,
        critical_mass_rank: last_qualifying,
        transition,
    }
}

/// Returns the first transition across campaigns, in the given order.
///
/// Campaigns after the first one with a transition are not evaluated.
pub fn find_transition(campaigns: &[Campaign]) -> Option<Transition> {
    campaigns.iter().find_map(|campaign| {
        let evaluation = evaluate_campaign(campaign);
        trace!(
            campaign = %campaign.id,
            title = %campaign.title,
            evaluated = evaluation.evaluated,
            excluded = evaluation.excluded,
            critical_mass_rank = evaluation.critical_mass_rank,
            has_transition = evaluation.transition.is_some(),
            "Evaluated campaign"
        );
        evaluation.transition
    })
}
