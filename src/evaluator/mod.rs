//! Critical-mass evaluation.
//!
//! Given one campaign's participations, decide which of them currently have
//! critical mass and find the first one whose stored flag disagrees.
//!
//! # Algorithm
//!
//! 1. Drop participations with an invalid threshold (logged, not fatal).
//! 2. Sort the rest by `(threshold, participation id)` and give each a 1-based rank.
//! 3. Scan every rank; the last rank `i` with `threshold < i` is the
//!    critical-mass rank (0 if none).
//! 4. Ranks at or below the critical-mass rank should be fulfilled; the first
//!    participation whose stored flag differs is the campaign's transition.
//!
//! Everything here is pure: no I/O, no clocks. The scheduler decides what to
//! do with the transition.

mod ranking;
mod transition;


pub use ranking::{
    RankedParticipation, Ranking, critical_mass_rank, desired_flags, rank_participations,
};
pub use transition::{CampaignEvaluation, Transition, evaluate_campaign, find_transition};
