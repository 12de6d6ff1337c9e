//! Sliding-window burst concentration.
//!
//! A run whose eliminations are concentrated in one short window is a burst: the rest
//! of the playthrough contributed next to nothing. For a window width `W`, every
//! contiguous window's share of the total combo sum is computed and the maximum kept.
//!
//! The check is degenerate (ratio `0`, never flagged) when the total is zero or the
//! sequence is shorter than `W`.

use serde::{Deserialize, Serialize};

use crate::config::BurstRule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BurstWindow {
    /// Largest `window_sum / total` over all windows.
    pub max_ratio: f64,
    pub flagged: bool,
}

impl BurstWindow {
    #[must_use]
    pub fn scan(sequence: &[u32], rule: &BurstRule) -> Self {
        let width = rule.window_width;
        let total = sequence.iter().map(|v| u64::from(*v)).sum::<u64>();
        if total == 0 || width == 0 || sequence.len() < width {
            return Self::default();
        }

        let max_sum = sequence
            .windows(width)
            .map(|window| window.iter().map(|v| u64::from(*v)).sum::<u64>())
            .max()
            .unwrap_or(0);
        #[expect(clippy::cast_precision_loss)]
        let max_ratio = max_sum as f64 / total as f64;

        Self {
            max_ratio,
            flagged: max_ratio >= rule.threshold_pct / 100.0,
        }
    }
}
