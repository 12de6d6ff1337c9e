//! Barren interval segmentation.
//!
//! Boundaries are `-1`, every anchor index, and the sequence length. Each interval is
//! the run of cards strictly between two consecutive boundaries, so the intervals
//! partition the non-anchor cards: their lengths always sum to
//! `sequence.len() - anchors.len()`.
//!
//! For an interval of length `L` containing `Z` zeros:
//!
//! | tier            | condition                                | penalty                       |
//! |-----------------|------------------------------------------|-------------------------------|
//! | 3 severe drought| `L >= 6` or (`L >= 4` and `Z >= 3`)      | opening / regular drought     |
//! | 2 blockage      | `L == 5` or (`3 <= L <= 4` and `Z == 2`) | blockage                      |
//! | 1 mediocre      | `L >= 3`, not tier 2 or 3                | mediocre                      |
//!
//! Tiers are checked from 3 down to 1 and at most one applies per interval. Every
//! interval of the sequence is evaluated.

use serde::{Deserialize, Serialize};

use crate::config::BarrenPenalties;

/// Severity of a barren interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrenTier {
    Mediocre,
    Blockage,
    SevereDrought,
}

impl BarrenTier {
    /// Classifies an interval of `len` cards containing `zeros` zero-combo cards.
    #[must_use]
    pub fn classify(len: usize, zeros: usize) -> Option<Self> {
        if len >= 6 || (len >= 4 && zeros >= 3) {
            Some(BarrenTier::SevereDrought)
        } else if len == 5 || ((3..=4).contains(&len) && zeros == 2) {
            Some(BarrenTier::Blockage)
        } else if len >= 3 {
            Some(BarrenTier::Mediocre)
        } else {
            None
        }
    }
}

/// A maximal run of non-anchor cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrenInterval {
    /// Index of the first card of the interval.
    pub start: usize,
    pub len: usize,
    pub zeros: usize,
    pub tier: Option<BarrenTier>,
}

impl BarrenInterval {
    /// Score penalty (positive magnitude) of this interval.
    #[must_use]
    pub fn penalty(&self, penalties: &BarrenPenalties) -> i32 {
        match self.tier {
            Some(BarrenTier::SevereDrought) if self.start <= penalties.opening_start_max => {
                penalties.severe_drought_opening
            }
            Some(BarrenTier::SevereDrought) => penalties.severe_drought,
            Some(BarrenTier::Blockage) => penalties.blockage,
            Some(BarrenTier::Mediocre) => penalties.mediocre,
            None => 0,
        }
    }
}

/// Splits `sequence` into the non-empty intervals between `anchors`.
///
/// `anchors` must be the ascending anchor indices of `sequence`.
#[must_use]
pub fn segment(sequence: &[u32], anchors: &[usize]) -> Vec<BarrenInterval> {
    debug_assert!(anchors.is_sorted_by(|a, b| a < b));

    let mut intervals = Vec::with_capacity(anchors.len() + 1);
    let mut start = 0;
    for end in anchors.iter().copied().chain([sequence.len()]) {
        if end > start {
            let cards = &sequence[start..end];
            let len = cards.len();
            let zeros = cards.iter().filter(|v| **v == 0).count();
            intervals.push(BarrenInterval {
                start,
                len,
                zeros,
                tier: BarrenTier::classify(len, zeros),
            });
        }
        start = end + 1;
    }
    intervals
}

/// Per-tier interval counts and the accumulated penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrenCounts {
    /// Tier 1 count (c1).
    pub mediocre: u32,
    /// Tier 2 count (c2).
    pub blockage: u32,
    /// Tier 3 count (c3).
    pub severe_drought: u32,
    pub penalty: i32,
}

impl BarrenCounts {
    #[must_use]
    pub fn tally(intervals: &[BarrenInterval], penalties: &BarrenPenalties) -> Self {
        let mut counts = Self::default();
        for interval in intervals {
            match interval.tier {
                Some(BarrenTier::SevereDrought) => counts.severe_drought += 1,
                Some(BarrenTier::Blockage) => counts.blockage += 1,
                Some(BarrenTier::Mediocre) => counts.mediocre += 1,
                None => continue,
            }
            counts.penalty += interval.penalty(penalties);
        }
        counts
    }
}
