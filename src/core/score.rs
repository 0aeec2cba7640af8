//! Weekly execution scoring.
//!
//! The execution score is the share of a week's tactics that got done. 85% is the
//! conventional bar for a week that keeps the cycle on track.

use crate::core::tactic::{Tactic, TacticStatus};

/// Score at or above which a week counts as on track
pub const DEFAULT_SCORE_THRESHOLD: f64 = 85.0;

/// Computes the execution score for a set of tactics, rounded to one decimal.
///
/// An empty set scores 0. A tactic counts as done when its completion flag is set
/// or its status is `Completed`; the status check keeps data migrated from the
/// string-status format (where `"Complete"` was the done marker) scoring the same.
pub fn compute_weekly_score<'a, I>(tactics: I) -> f64
where
    I: IntoIterator<Item = &'a Tactic>,
{
    let (completed, total) = tactics
        .into_iter()
        .fold((0_usize, 0_usize), |(completed, total), t| {
            let done = t.is_completed() || t.status() == TacticStatus::Completed;
            (completed + usize::from(done), total + 1)
        });

    if total == 0 {
        return 0.0;
    }

    // Tactic counts are tiny; no meaningful precision loss
    #[allow(clippy::cast_precision_loss)]
    let percent = 100.0 * completed as f64 / total as f64;
    round_to_tenth(percent)
}

/// Rounds half away from zero to one decimal place
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether a score falls short of the threshold
#[must_use]
pub fn is_below_threshold(score: f64, threshold: f64) -> bool {
    score < threshold
}

/// How a week is going relative to the score threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreStatus {
    /// Score meets the threshold
    OnTrack,
    /// Score is below the threshold
    AtRisk,
}

impl ScoreStatus {
    /// Classifies a score against `threshold`
    #[must_use]
    pub fn classify(score: f64, threshold: f64) -> Self {
        if is_below_threshold(score, threshold) {
            Self::AtRisk
        } else {
            Self::OnTrack
        }
    }

    /// Display label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::AtRisk => "At Risk",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::tactic::BlockType;
    use proptest::prelude::*;

    fn tactics(done: usize, total: usize) -> Vec<Tactic> {
        (0..total)
            .map(|i| {
                let mut t = Tactic::new(format!("t{i}"), "work", 1, BlockType::None).unwrap();
                t.set_completed(i < done);
                t
            })
            .collect()
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(compute_weekly_score(&Vec::<Tactic>::new()), 0.0);
    }

    #[test]
    fn test_partial_completion_rounds_to_tenth() {
        assert_eq!(compute_weekly_score(&tactics(1, 3)), 33.3);
        assert_eq!(compute_weekly_score(&tactics(2, 3)), 66.7);
        assert_eq!(compute_weekly_score(&tactics(3, 3)), 100.0);
        assert_eq!(compute_weekly_score(&tactics(0, 4)), 0.0);
    }

    #[test]
    fn test_other_statuses_do_not_count() {
        let mut list = tactics(0, 2);
        list[0].set_status(TacticStatus::InProgress);
        list[1].set_status(TacticStatus::Deferred);
        assert_eq!(compute_weekly_score(&list), 0.0);
    }

    #[test]
    fn test_threshold_classification() {
        assert_eq!(ScoreStatus::classify(85.0, DEFAULT_SCORE_THRESHOLD), ScoreStatus::OnTrack);
        assert_eq!(ScoreStatus::classify(84.9, DEFAULT_SCORE_THRESHOLD), ScoreStatus::AtRisk);
        assert!(is_below_threshold(0.0, DEFAULT_SCORE_THRESHOLD));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Score is bounded and matches the rounded completion ratio
        #[test]
        fn prop_score_matches_ratio((done, total) in (1_usize..60).prop_flat_map(|t| (0..=t, Just(t)))) {
            let score = compute_weekly_score(&tactics(done, total));
            prop_assert!((0.0..=100.0).contains(&score));
            #[allow(clippy::cast_precision_loss)]
            let expected = round_to_tenth(100.0 * done as f64 / total as f64);
            prop_assert_eq!(score, expected);
        }
    }
}
