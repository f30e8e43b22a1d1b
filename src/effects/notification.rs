//! Notification content for fulfillment transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Threshold;

/// Which way a participation's fulfillment flag is flipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `false -> true`: the campaign reached the account's critical mass.
    Reached,
    /// `true -> false`: the campaign dropped below the account's critical mass.
    Unreached,
}

impl Direction {
    /// The direction that results in the given desired flag.
    pub fn towards(fulfilled: bool) -> Self {
        if fulfilled {
            Direction::Reached
        } else {
            Direction::Unreached
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Reached => write!(f, "reached"),
            Direction::Unreached => write!(f, "un-reached"),
        }
    }
}

/// Builds the free-text notification for a transition.
pub fn notification_content(
    campaign_title: &str,
    threshold: Threshold,
    direction: Direction,
) -> String {
    match direction {
        Direction::Reached => format!(
            "Heads up! \"{campaign_title}\" just reached your defined critical mass of {threshold}! Start acting now!"
        ),
        Direction::Unreached => format!(
            "Heads up! \"{campaign_title}\" just un-reached your defined critical mass of {threshold}! Go back home now, it's pointless!"
        ),
    }
}
