//! Positive-run ("feeding") detection.
//!
//! Maximal runs of strictly positive combo values are run-length encoded. A level that
//! keeps handing out combos card after card is feeding the player; a run of seven or
//! more means the playthrough was effectively automatic.
//!
//! | run length | effect                              |
//! |------------|-------------------------------------|
//! | `>= 7`     | automation flag (red line)          |
//! | `5..=6`    | tier-2 feeding, counter `f2`        |
//! | `4`        | tier-1 feeding, counter `f1`        |
//! | `< 4`      | none                                |
//!
//! Every run is evaluated, not only the longest.

use serde::{Deserialize, Serialize};

use crate::config::FeedingPenalties;

/// Runs at least this long mark the playthrough as automatic.
pub const AUTOMATION_RUN_LENGTH: usize = 7;

/// Lengths of the maximal runs of strictly positive values, in order.
///
/// ```
/// # use tripeaks_evaluator::sequence::run_length::positive_runs;
/// assert_eq!(positive_runs(&[1, 2, 0, 0, 3, 0, 1, 1]), vec![2, 1, 2]);
/// assert!(positive_runs(&[0, 0]).is_empty());
/// ```
#[must_use]
pub fn positive_runs(sequence: &[u32]) -> Vec<usize> {
    sequence
        .split(|value| *value == 0)
        .map(<[u32]>::len)
        .filter(|len| *len > 0)
        .collect()
}

/// Feeding counters and automation flag of one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingSummary {
    /// Tier 1 feeding runs (f1).
    pub tier1: u32,
    /// Tier 2 feeding runs (f2).
    pub tier2: u32,
    pub automation: bool,
    /// Accumulated penalty (positive magnitude).
    pub penalty: i32,
}

impl FeedingSummary {
    #[must_use]
    pub fn from_sequence(sequence: &[u32], penalties: &FeedingPenalties) -> Self {
        let mut summary = Self::default();
        for len in positive_runs(sequence) {
            match len {
                AUTOMATION_RUN_LENGTH.. => summary.automation = true,
                5..=6 => {
                    summary.tier2 += 1;
                    summary.penalty += penalties.tier2;
                }
                4 => {
                    summary.tier1 += 1;
                    summary.penalty += penalties.tier1;
                }
                _ => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_run() {
        let summary = FeedingSummary::from_sequence(&[1; 7], &FeedingPenalties::default());
        assert!(summary.automation);
        assert_eq!(summary.tier1, 0);
        assert_eq!(summary.tier2, 0);
        assert_eq!(summary.penalty, 0);
    }

    #[test]
    fn test_all_runs_accumulate() {
        // runs: 4, 5, 6, 3, 4
        let sequence = [
            1, 1, 1, 1, 0, 2, 2, 2, 2, 2, 0, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0, 3, 3, 3, 3,
        ];
        let summary = FeedingSummary::from_sequence(&sequence, &FeedingPenalties::default());
        assert!(!summary.automation);
        assert_eq!(summary.tier1, 2);
        assert_eq!(summary.tier2, 2);
        assert_eq!(summary.penalty, 3 + 3 + 9 + 9);
    }

    #[test]
    fn test_automation_is_or_across_runs() {
        let mut sequence = vec![1; 8];
        sequence.push(0);
        sequence.extend([1; 5]);
        let summary = FeedingSummary::from_sequence(&sequence, &FeedingPenalties::default());
        assert!(summary.automation);
        assert_eq!(summary.tier2, 1);
    }
}
