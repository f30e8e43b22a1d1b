//! Ranking and the critical-mass prefix scan.
//!
//! Pure functions; the only side effect is a warning log for participations
//! whose threshold cannot be ranked.

use tracing::warn;

use crate::types::{Campaign, Participation, Threshold};

/// A participation with its validated threshold and 1-based rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedParticipation<'a> {
    /// 1-based position in threshold order.
    pub rank: usize,
    pub threshold: Threshold,
    pub participation: &'a Participation,
}

/// Result of ranking a campaign's participations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<'a> {
    /// Valid participations sorted by `(threshold, id)` ascending.
    pub ranked: Vec<RankedParticipation<'a>>,
    /// Number of participations dropped because of an invalid threshold.
    pub excluded: usize,
}

/// Validates and ranks a campaign's participations.
///
/// Participations with an invalid threshold are logged and left out; ranks are
/// assigned among the remaining ones. Equal thresholds are ordered by
/// participation id so the result does not depend on store order.
pub fn rank_participations(campaign: &Campaign) -> Ranking<'_> {
    let mut valid = Vec::with_capacity(campaign.participations.len());
    let mut excluded = 0;

    for participation in &campaign.participations {
        match participation.validated_threshold() {
            Ok(threshold) => valid.push((threshold, participation)),
            Err(e) => {
                warn!(
                    participation = %e.participation,
                    campaign = %e.campaign,
                    threshold = e.value,
                    "Excluding participation with invalid threshold from evaluation"
                );
                excluded += 1;
            }
        }
    }

    valid.sort_by_key(|(threshold, participation)| (*threshold, participation.id));

    let ranked = valid
        .into_iter()
        .enumerate()
        .map(|(idx, (threshold, participation))| RankedParticipation {
            rank: idx + 1,
            threshold,
            participation,
        })
        .collect();

    Ranking { ranked, excluded }
}

/// Returns the rank of the last participation whose threshold is below its rank.
///
/// Returns 0 when no participation qualifies. The scan always runs to the end
/// of the list: a non-qualifying participation neither resets the result nor
/// stops the scan, so a later qualifying rank still extends the prefix.
pub fn critical_mass_rank(ranked: &[RankedParticipation<'_>]) -> usize {
    ranked.iter().fold(0, |last_qualifying, entry| {
        if entry.threshold.satisfied_at_rank(entry.rank) {
            entry.rank
        } else {
            last_qualifying
        }
    })
}

/// Desired fulfillment flag for each ranked participation, in rank order.
pub fn desired_flags(ranked: &[RankedParticipation<'_>]) -> Vec<bool> {
    let last_qualifying = critical_mass_rank(ranked);
    ranked
        .iter()
        .map(|entry| entry.rank <= last_qualifying)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::campaign_with_thresholds;

    fn thresholds_in_rank_order(ranking: &Ranking<'_>) -> Vec<u32> {
        ranking.ranked.iter().map(|r| r.threshold.get()).collect()
    }

    #[test]
    fn simple_cascade_qualifies_everyone() {
        let campaign = campaign_with_thresholds(&[0, 1, 2]);
        let ranking = rank_participations(&campaign);

        assert_eq!(critical_mass_rank(&ranking.ranked), 3);
        assert_eq!(desired_flags(&ranking.ranked), vec![true, true, true]);
    }

    #[test]
    fn stalled_cascade_qualifies_only_the_prefix() {
        let campaign = campaign_with_thresholds(&[0, 5]);
        let ranking = rank_participations(&campaign);

        assert_eq!(critical_mass_rank(&ranking.ranked), 1);
        assert_eq!(desired_flags(&ranking.ranked), vec![true, false]);
    }

    #[test]
    fn nobody_qualifies_without_a_zero_threshold() {
        let campaign = campaign_with_thresholds(&[1, 1, 3]);
        let ranking = rank_participations(&campaign);

        // rank 1: 1<1 no; rank 2: 1<2 yes; rank 3: 3<3 no
        assert_eq!(critical_mass_rank(&ranking.ranked), 2);
        assert_eq!(desired_flags(&ranking.ranked), vec![true, true, false]);
    }

    #[test]
    fn scan_continues_past_a_non_qualifying_rank() {
        // rank 2 (threshold 4) fails, but rank 5 (threshold 4) qualifies again.
        let campaign = campaign_with_thresholds(&[0, 4, 4, 4, 4]);
        let ranking = rank_participations(&campaign);

        assert_eq!(critical_mass_rank(&ranking.ranked), 5);
        assert!(desired_flags(&ranking.ranked).iter().all(|f| *f));
    }

    #[test]
    fn empty_campaign_has_zero_critical_mass() {
        let campaign = campaign_with_thresholds(&[]);
        let ranking = rank_participations(&campaign);

        assert!(ranking.ranked.is_empty());
        assert_eq!(critical_mass_rank(&ranking.ranked), 0);
        assert!(desired_flags(&ranking.ranked).is_empty());
    }

    #[test]
    fn ranking_sorts_by_threshold_then_id() {
        let mut campaign = campaign_with_thresholds(&[3, 1, 1, 0]);
        // Give the two threshold-1 entries ids in reverse store order.
        campaign.participations[1].id = crate::types::ParticipationId(50);
        campaign.participations[2].id = crate::types::ParticipationId(20);

        let ranking = rank_participations(&campaign);

        assert_eq!(thresholds_in_rank_order(&ranking), vec![0, 1, 1, 3]);
        let ids: Vec<i64> = ranking.ranked.iter().map(|r| r.participation.id.0).collect();
        assert_eq!(ids[1..3], [20, 50]);
        let ranks: Vec<usize> = ranking.ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn invalid_thresholds_are_excluded_before_ranking() {
        let campaign = campaign_with_thresholds(&[0, -2, 1]);
        let ranking = rank_participations(&campaign);

        assert_eq!(ranking.excluded, 1);
        assert_eq!(thresholds_in_rank_order(&ranking), vec![0, 1]);
        // The remaining two form a full cascade on their own.
        assert_eq!(critical_mass_rank(&ranking.ranked), 2);
    }
}
