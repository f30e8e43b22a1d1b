//! The reconciliation loop.
//!
//! Each poll cycle walks `Idle -> Fetching -> Evaluating -> (Applying)? ->
//! Sleeping` and then starts over:
//!
//! 1. Check the shutdown token (top of `Idle`)
//! 2. Fetch every campaign fresh from the store
//! 3. Evaluate campaigns in store order, stopping at the first transition
//! 4. Apply at most that one transition
//! 5. Sleep the short interval on success, the long one on any failure
//!
//! The loop is level-triggered: it keeps no state between cycles, so it can be
//! restarted at any time. Convergence takes one cycle per outstanding
//! transition.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::effects::{StoreEffect, StoreInterpreter, StoreResponse};
use crate::evaluator::{Transition, find_transition};

use super::applier::{ApplyError, apply_transition};
use super::poll::PollConfig;

/// Where a poll cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Evaluating,
    Applying,
    Sleeping,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Fetching => "fetching",
            CyclePhase::Evaluating => "evaluating",
            CyclePhase::Applying => "applying",
            CyclePhase::Sleeping => "sleeping",
        };
        f.write_str(name)
    }
}

/// Why a poll cycle failed.
#[derive(Debug, Error)]
pub enum CycleError<E> {
    /// The campaign fetch failed.
    #[error("campaign fetch failed: {0}")]
    Fetch(#[source] E),

    /// The store answered the fetch with something other than campaigns.
    #[error("unexpected {0} response to campaign fetch")]
    UnexpectedResponse(&'static str),

    /// Applying the transition failed.
    #[error(transparent)]
    Apply(#[from] ApplyError<E>),
}

impl<E> CycleError<E> {
    /// The phase the cycle was in when it failed.
    pub fn phase(&self) -> CyclePhase {
        match self {
            CycleError::Fetch(_) | CycleError::UnexpectedResponse(_) => CyclePhase::Fetching,
            CycleError::Apply(_) => CyclePhase::Applying,
        }
    }

    /// Whether a notification was sent for a flag that is still stale.
    pub fn notification_sent(&self) -> bool {
        match self {
            CycleError::Apply(e) => e.notification_sent(),
            CycleError::Fetch(_) | CycleError::UnexpectedResponse(_) => false,
        }
    }
}

/// What a poll cycle did.
#[derive(Debug)]
pub enum CycleOutcome<E> {
    /// Every flag already matched; nothing was written.
    Converged,

    /// Exactly one transition was applied.
    Applied(Transition),

    /// The cycle failed; the next one waits the failure delay.
    Failed(CycleError<E>),
}

impl<E> CycleOutcome<E> {
    pub fn is_failure(&self) -> bool {
        matches!(self, CycleOutcome::Failed(_))
    }
}

/// Summary of one poll cycle.
#[derive(Debug)]
pub struct CycleReport<E> {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome<E>,
    /// How long to sleep before the next cycle.
    pub next_delay: Duration,
}

/// Drives the fetch, evaluate, apply, sleep cycle against a store.
pub struct Reconciler<S> {
    store: S,
    config: PollConfig,
}

impl<S> Reconciler<S>
where
    S: StoreInterpreter,
{
    pub fn new(store: S, config: PollConfig) -> Self {
        Reconciler { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Runs until `shutdown` is cancelled and returns the number of cycles run.
    ///
    /// Cancellation is checked before each cycle and raced against the sleep
    /// between cycles. A cycle that has started runs to completion, so the two
    /// writes of a transition are never split by a shutdown.
    pub async fn run(&self, shutdown: CancellationToken) -> u64 {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            failure_delay_secs = self.config.failure_delay.as_secs(),
            "Reconciler started"
        );

        let mut cycles = 0u64;

        loop {
            debug!(phase = %CyclePhase::Idle, cycles, "Checking for shutdown");
            if shutdown.is_cancelled() {
                break;
            }

            let report = self.run_cycle().await;
            cycles += 1;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(report.next_delay) => {}
            }
        }

        info!(cycles, "Reconciler stopped");
        cycles
    }

    /// Runs one cycle: fetch, evaluate, apply at most one transition.
    ///
    /// Never fails; errors are logged and reported in the outcome.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport<S::Error> {
        let started_at = Utc::now();

        let outcome = match self.fetch_evaluate_apply().await {
            Ok(None) => {
                debug!("All participations converged");
                CycleOutcome::Converged
            }
            Ok(Some(transition)) => CycleOutcome::Applied(transition),
            Err(e) => {
                error!(
                    error = %e,
                    phase = %e.phase(),
                    notification_sent = e.notification_sent(),
                    "Poll cycle failed"
                );
                CycleOutcome::Failed(e)
            }
        };

        let next_delay = self.config.delay_after(outcome.is_failure());
        let finished_at = Utc::now();
        debug!(
            phase = %CyclePhase::Sleeping,
            completed_at = %finished_at.to_rfc3339(),
            next_delay_ms = next_delay.as_millis() as u64,
            "Poll cycle done"
        );

        CycleReport {
            started_at,
            finished_at,
            outcome,
            next_delay,
        }
    }

    async fn fetch_evaluate_apply(&self) -> Result<Option<Transition>, CycleError<S::Error>> {
        debug!(phase = %CyclePhase::Fetching, "Fetching campaigns");
        let campaigns = match self
            .store
            .interpret(StoreEffect::FetchCampaigns)
            .await
            .map_err(CycleError::Fetch)?
        {
            StoreResponse::Campaigns(campaigns) => campaigns,
            other => return Err(CycleError::UnexpectedResponse(other.name())),
        };

        debug!(
            phase = %CyclePhase::Evaluating,
            campaigns = campaigns.len(),
            "Evaluating campaigns"
        );
        let Some(transition) = find_transition(&campaigns) else {
            return Ok(None);
        };

        debug!(
            phase = %CyclePhase::Applying,
            campaign = %transition.campaign_id,
            participation = %transition.participation_id,
            "Applying transition"
        );
        apply_transition(&self.store, &transition).await?;

        Ok(Some(transition))
    }
}

impl<S> fmt::Debug for Reconciler<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}
