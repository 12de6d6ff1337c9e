//! Structural analysis of a combo sequence.
//!
//! A combo sequence is read through four independent lenses:
//!
//! - **Anchors and barren intervals** ([`interval`]): cards with a combo of at least the
//!   anchor value split the sequence into intervals; long or zero-heavy intervals are
//!   droughts the player had to sit through.
//! - **Relays** ([`relay`]): anchors close to each other form a chain of payoffs.
//! - **Positive runs** ([`run_length`]): long unbroken streaks of positive combos mean the
//!   level feeds the player, and very long ones indicate the run plays itself.
//! - **Burst windows** ([`burst`]): a single short window holding most of the run's
//!   eliminations.
//!
//! [`SequenceAnalysis`] runs all of them once so that the scorer and the red-line
//! classifier share a single pass over the data.

use crate::config::ScoringConfig;

pub use self::{
    burst::BurstWindow,
    interval::{BarrenCounts, BarrenInterval, BarrenTier},
    run_length::FeedingSummary,
};

pub mod burst;
pub mod interval;
pub mod relay;
pub mod run_length;

/// Indices of the cards whose combo value is at least `anchor_value`.
#[must_use]
pub fn anchors(sequence: &[u32], anchor_value: u32) -> Vec<usize> {
    sequence
        .iter()
        .enumerate()
        .filter(|(_, value)| **value >= anchor_value)
        .map(|(i, _)| i)
        .collect()
}

/// Result of every sequence analyzer for one combo sequence.
#[derive(Debug, Clone)]
pub struct SequenceAnalysis {
    pub anchors: Vec<usize>,
    pub intervals: Vec<BarrenInterval>,
    pub barren: BarrenCounts,
    pub relay_count: usize,
    pub feeding: FeedingSummary,
    /// `None` when the burst family is disabled.
    pub burst: Option<BurstWindow>,
}

impl SequenceAnalysis {
    #[must_use]
    pub fn new(sequence: &[u32], config: &ScoringConfig) -> Self {
        let anchors = anchors(sequence, config.anchor_value);
        let intervals = interval::segment(sequence, &anchors);
        let barren = BarrenCounts::tally(&intervals, &config.barren);
        let relay_count = relay::relay_count(&anchors, config.relay.max_gap);
        let feeding = FeedingSummary::from_sequence(sequence, &config.feeding);
        let burst = config
            .red_lines
            .burst
            .as_ref()
            .map(|rule| BurstWindow::scan(sequence, rule));

        Self {
            anchors,
            intervals,
            barren,
            relay_count,
            feeding,
            burst,
        }
    }
}
