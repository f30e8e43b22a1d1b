//! Shared test utilities: campaign builders, proptest strategies and an
//! in-memory store interpreter.

use std::collections::VecDeque;
use std::sync::Mutex;

use proptest::prelude::*;
use thiserror::Error;

use crate::effects::{StoreEffect, StoreInterpreter, StoreResponse};
use crate::types::{AccountId, Campaign, CampaignId, Participation, ParticipationId};

// ─── Builders ───

/// Builds campaign 1 with one participation per `(threshold, fulfilled)` pair.
///
/// Participation ids are 101, 102, ... and account ids 1001, 1002, ... in the
/// given order.
pub fn campaign_with_flags(entries: &[(i64, bool)]) -> Campaign {
    build_campaign(CampaignId(1), 100, entries)
}

/// Builds campaign 1 with every flag unset.
pub fn campaign_with_thresholds(thresholds: &[i64]) -> Campaign {
    let entries: Vec<(i64, bool)> = thresholds.iter().map(|t| (*t, false)).collect();
    campaign_with_flags(&entries)
}

/// Builds a campaign whose participation ids start after `id_base`.
pub fn build_campaign(id: CampaignId, id_base: i64, entries: &[(i64, bool)]) -> Campaign {
    let title = format!("Campaign {}", id.0);
    let participations = entries
        .iter()
        .enumerate()
        .map(|(idx, (threshold, fulfilled))| {
            let n = idx as i64 + 1;
            Participation {
                id: ParticipationId(id_base + n),
                account_id: AccountId(1000 + n),
                campaign_id: id,
                campaign_title: title.clone(),
                threshold: *threshold,
                condition_is_fulfilled: *fulfilled,
                confirmed: false,
            }
        })
        .collect();

    Campaign {
        id,
        title,
        participations,
    }
}

// ─── Strategies ───

pub fn arb_threshold() -> impl Strategy<Value = i64> {
    0i64..10
}

pub fn arb_entries() -> impl Strategy<Value = Vec<(i64, bool)>> {
    prop::collection::vec((arb_threshold(), any::<bool>()), 0..12)
}

pub fn arb_campaign() -> impl Strategy<Value = Campaign> {
    arb_entries().prop_map(|entries| campaign_with_flags(&entries))
}

/// Several campaigns with ids 1..=n and globally unique participation ids.
pub fn arb_campaigns() -> impl Strategy<Value = Vec<Campaign>> {
    prop::collection::vec(arb_entries(), 0..5).prop_map(|all| {
        all.iter()
            .enumerate()
            .map(|(idx, entries)| {
                let n = idx as i64 + 1;
                build_campaign(CampaignId(n), n * 1000, entries)
            })
            .collect()
    })
}

// ─── Mock store ───

/// Error returned by [`MockStore`] for scripted failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock store failure: {0}")]
pub struct MockStoreError(pub String);

/// A scripted outcome for the next call of one effect kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Fail,
    AffectNothing,
}

#[derive(Debug, Default)]
struct MockState {
    campaigns: Vec<Campaign>,
    executed: Vec<StoreEffect>,
    fetch_script: VecDeque<Script>,
    notify_script: VecDeque<Script>,
    update_script: VecDeque<Script>,
}

/// In-memory store that applies flag updates to its campaigns and records
/// every effect it executes.
#[derive(Debug, Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn new(campaigns: Vec<Campaign>) -> Self {
        MockStore {
            state: Mutex::new(MockState {
                campaigns,
                ..MockState::default()
            }),
        }
    }

    pub fn script_fetch(&self, script: Script) {
        self.state.lock().unwrap().fetch_script.push_back(script);
    }

    pub fn script_notify(&self, script: Script) {
        self.state.lock().unwrap().notify_script.push_back(script);
    }

    pub fn script_update(&self, script: Script) {
        self.state.lock().unwrap().update_script.push_back(script);
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.state.lock().unwrap().campaigns.clone()
    }

    /// Every effect that reached the store, including failed ones.
    pub fn executed(&self) -> Vec<StoreEffect> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Mutations only, in execution order.
    pub fn writes(&self) -> Vec<StoreEffect> {
        self.executed()
            .into_iter()
            .filter(StoreEffect::is_mutation)
            .collect()
    }

    /// Contents of every notification insert, in execution order.
    pub fn notifications(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter_map(|effect| match effect {
                StoreEffect::InsertNotification { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Stored flag of a participation, if it exists.
    pub fn flag(&self, id: ParticipationId) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .campaigns
            .iter()
            .flat_map(|c| c.participations.iter())
            .find(|p| p.id == id)
            .map(|p| p.condition_is_fulfilled)
    }

    fn execute(&self, effect: StoreEffect) -> Result<StoreResponse, MockStoreError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(effect.clone());

        match effect {
            StoreEffect::FetchCampaigns => match state.fetch_script.pop_front() {
                Some(Script::Fail) => Err(MockStoreError("fetch failed".into())),
                _ => Ok(StoreResponse::Campaigns(state.campaigns.clone())),
            },
            StoreEffect::InsertNotification { .. } => match state.notify_script.pop_front() {
                Some(Script::Fail) => Err(MockStoreError("notification insert failed".into())),
                Some(Script::AffectNothing) => Ok(StoreResponse::AffectedRows(0)),
                None => Ok(StoreResponse::AffectedRows(1)),
            },
            StoreEffect::SetConditionFulfilled {
                participation_id,
                fulfilled,
            } => match state.update_script.pop_front() {
                Some(Script::Fail) => Err(MockStoreError("update failed".into())),
                Some(Script::AffectNothing) => Ok(StoreResponse::AffectedRows(0)),
                None => {
                    let target = state
                        .campaigns
                        .iter_mut()
                        .flat_map(|c| c.participations.iter_mut())
                        .find(|p| p.id == participation_id);
                    match target {
                        Some(p) => {
                            p.condition_is_fulfilled = fulfilled;
                            Ok(StoreResponse::AffectedRows(1))
                        }
                        None => Ok(StoreResponse::AffectedRows(0)),
                    }
                }
            },
        }
    }
}

impl StoreInterpreter for MockStore {
    type Error = MockStoreError;

    async fn interpret(&self, effect: StoreEffect) -> Result<StoreResponse, Self::Error> {
        self.execute(effect)
    }
}
