//! Poll-driven reconciliation worker.
//!
//! The worker repeatedly fetches every campaign, finds the first participation
//! whose fulfillment flag disagrees with its campaign's critical mass, and
//! applies that single correction. It holds no state between cycles; the store
//! is the only source of truth.
//!
//! # Module Structure
//!
//! - [`poll`]: The two poll delays and their environment overrides
//! - [`applier`]: Notification then flag update for one transition
//! - [`scheduler`]: The fetch, evaluate, apply, sleep loop

mod applier;
mod poll;
mod scheduler;


pub use applier::{ApplyError, ApplyStep, apply_transition};
pub use poll::PollConfig;
pub use scheduler::{CycleError, CycleOutcome, CyclePhase, CycleReport, Reconciler};
