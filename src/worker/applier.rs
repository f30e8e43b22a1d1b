//! Applying a single fulfillment transition.
//!
//! A transition is two store writes, always in this order:
//!
//! 1. Insert the notification for the participant
//! 2. Set the participation's `condition_is_fulfilled` flag
//!
//! The writes are not transactional. If step 1 succeeds and step 2 fails, the
//! flag stays stale and the next cycle re-derives and re-applies the same
//! transition, sending the notification again. That duplicate is accepted:
//! delivery is at-least-once.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::effects::{StoreEffect, StoreInterpreter, StoreResponse};
use crate::evaluator::Transition;
use crate::types::ParticipationId;

/// The two writes of a transition, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    Notify,
    Update,
}

impl ApplyStep {
    pub fn name(self) -> &'static str {
        match self {
            ApplyStep::Notify => "insert_notification",
            ApplyStep::Update => "set_condition_fulfilled",
        }
    }
}

impl fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from applying a transition.
#[derive(Debug, Error)]
pub enum ApplyError<E> {
    /// The notification insert failed; the flag was not touched.
    #[error("notification insert failed for participation {participation}: {source}")]
    Notify {
        participation: ParticipationId,
        #[source]
        source: E,
    },

    /// The flag update failed after the notification was sent.
    #[error("fulfillment update failed for participation {participation}: {source}")]
    Update {
        participation: ParticipationId,
        #[source]
        source: E,
    },

    /// A write succeeded but touched no rows.
    #[error("{step} for participation {participation} affected no rows")]
    NotApplied {
        step: ApplyStep,
        participation: ParticipationId,
    },

    /// The store answered a write with something other than a row count.
    #[error("unexpected {response} response to {step}")]
    UnexpectedResponse {
        step: ApplyStep,
        response: &'static str,
    },
}

impl<E> ApplyError<E> {
    /// The step that failed.
    pub fn step(&self) -> ApplyStep {
        match self {
            ApplyError::Notify { .. } => ApplyStep::Notify,
            ApplyError::Update { .. } => ApplyStep::Update,
            ApplyError::NotApplied { step, .. } | ApplyError::UnexpectedResponse { step, .. } => {
                *step
            }
        }
    }

    /// Whether the notification went out before the failure, leaving the
    /// flag stale until the next cycle re-applies the transition.
    pub fn notification_sent(&self) -> bool {
        self.step() == ApplyStep::Update
    }
}

/// Sends the notification for `transition`, then persists its flag.
///
/// Stops at the first failing step and reports it; nothing is retried here.
#[instrument(
    skip(store, transition),
    fields(
        campaign = %transition.campaign_id,
        participation = %transition.participation_id,
        direction = %transition.direction(),
    )
)]
pub async fn apply_transition<S>(
    store: &S,
    transition: &Transition,
) -> Result<(), ApplyError<S::Error>>
where
    S: StoreInterpreter,
{
    let participation = transition.participation_id;

    // Step 1: notify
    let notify = transition.notification_effect();
    debug!(effect = notify.name(), "Sending notification");
    let response = store
        .interpret(notify)
        .await
        .map_err(|source| ApplyError::Notify {
            participation,
            source,
        })?;
    expect_rows::<S::Error>(ApplyStep::Notify, participation, response)?;

    // Step 2: persist the flag
    let update = transition.update_effect();
    debug!(
        effect = update.name(),
        fulfilled = transition.fulfilled,
        "Updating fulfillment"
    );
    let response = store
        .interpret(update)
        .await
        .map_err(|source| ApplyError::Update {
            participation,
            source,
        })?;
    expect_rows::<S::Error>(ApplyStep::Update, participation, response)?;

    info!(
        account = %transition.account_id,
        threshold = %transition.threshold,
        rank = transition.rank,
        fulfilled = transition.fulfilled,
        "Applied critical-mass transition"
    );

    Ok(())
}

fn expect_rows<E>(
    step: ApplyStep,
    participation: ParticipationId,
    response: StoreResponse,
) -> Result<(), ApplyError<E>> {
    match response {
        StoreResponse::AffectedRows(0) => Err(ApplyError::NotApplied {
            step,
            participation,
        }),
        StoreResponse::AffectedRows(_) => Ok(()),
        other => Err(ApplyError::UnexpectedResponse {
            step,
            response: other.name(),
        }),
    }
}
