//! Core domain types for the critical-mass reconciler.

pub mod campaign;
pub mod ids;

pub use campaign::{Campaign, InvalidThreshold, Participation, Threshold};
pub use ids::{AccountId, CampaignId, ParticipationId};
