//! Per-run scoring.
//!
//! ```text
//! score = base_score
//!       + opening bonus   (first 3 cards sum to >= 4)
//!       + closing bonus   (any of the last 5 cards >= 3)
//!       + comeback bonus  (the maximum is reached at card 7 or later)
//!       + relay bonus
//!       - barren interval penalties
//!       - feeding penalties
//! ```
//!
//! All magnitudes and windows come from [`ScoringConfig`]. The score and the red-line
//! set are computed side by side from one [`SequenceAnalysis`] but never influence each
//! other.

use serde::{Deserialize, Serialize};

use crate::{
    config::ScoringConfig,
    record::{self, CohortKey, ParseError, RawRow, RunRecord},
    red_line::{self, RedLine, RedLineSet},
    sequence::{BarrenCounts, FeedingSummary, SequenceAnalysis, relay},
};

/// How a run's score was put together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub opening_bonus: i32,
    pub closing_bonus: i32,
    pub comeback_bonus: i32,
    pub relay_count: usize,
    pub relay_bonus: i32,
    pub barren: BarrenCounts,
    pub feeding: FeedingSummary,
    /// Largest burst window share; `0` when the burst family is disabled or degenerate.
    pub max_burst_ratio: f64,
}

/// A scored run. Produced once per input row and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRun {
    pub key: CohortKey,
    pub score: i32,
    pub red_lines: RedLineSet,
    pub breakdown: ScoreBreakdown,
    /// Set on sentinel runs for rows that failed to parse.
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub parse_error: Option<ParseError>,
}

impl ScoredRun {
    /// Sentinel for a row that could not be parsed: score `0`, tagged `parse_failure`.
    #[must_use]
    pub fn parse_failure(key: CohortKey, error: ParseError) -> Self {
        Self {
            key,
            score: 0,
            red_lines: [RedLine::ParseFailure].into_iter().collect(),
            breakdown: ScoreBreakdown::default(),
            parse_error: Some(error),
        }
    }

    #[must_use]
    pub fn has_red_line(&self) -> bool {
        !self.red_lines.is_empty()
    }
}

/// Scores runs against a fixed [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunScorer {
    config: ScoringConfig,
}

impl RunScorer {
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Parses and scores one raw row.
    ///
    /// Never fails: unparseable rows become [`ScoredRun::parse_failure`] sentinels.
    #[must_use]
    pub fn score_row(&self, row: &RawRow) -> ScoredRun {
        match record::parse_row(row) {
            Ok(record) => self.score_record(&record),
            Err(error) => {
                let key = CohortKey::of_row(row);
                log::warn!("{key}: {error}");
                ScoredRun::parse_failure(key, error)
            }
        }
    }

    #[must_use]
    pub fn score_record(&self, record: &RunRecord) -> ScoredRun {
        let config = &self.config;
        let sequence = record.sequence.as_slice();
        let analysis = SequenceAnalysis::new(sequence, config);

        let breakdown = ScoreBreakdown {
            opening_bonus: opening_bonus(sequence, config),
            closing_bonus: closing_bonus(sequence, config),
            comeback_bonus: comeback_bonus(sequence, config),
            relay_count: analysis.relay_count,
            relay_bonus: relay::relay_bonus(analysis.relay_count, &config.relay),
            barren: analysis.barren,
            feeding: analysis.feeding,
            max_burst_ratio: analysis.burst.map_or(0.0, |burst| burst.max_ratio),
        };
        let score = config.base_score
            + breakdown.opening_bonus
            + breakdown.closing_bonus
            + breakdown.comeback_bonus
            + breakdown.relay_bonus
            - breakdown.barren.penalty
            - breakdown.feeding.penalty;

        ScoredRun {
            key: record.cohort_key(),
            score,
            red_lines: red_line::classify(record, &analysis, &config.red_lines),
            breakdown,
            parse_error: None,
        }
    }
}

fn opening_bonus(sequence: &[u32], config: &ScoringConfig) -> i32 {
    let opening = &config.opening;
    let sum = sequence
        .iter()
        .take(opening.window)
        .map(|value| u64::from(*value))
        .sum::<u64>();
    if sum >= u64::from(opening.min_sum) {
        opening.bonus
    } else {
        0
    }
}

fn closing_bonus(sequence: &[u32], config: &ScoringConfig) -> i32 {
    let closing = &config.closing;
    let tail = &sequence[sequence.len().saturating_sub(closing.window)..];
    if tail.iter().any(|value| *value >= closing.min_value) {
        closing.bonus
    } else {
        0
    }
}

fn comeback_bonus(sequence: &[u32], config: &ScoringConfig) -> i32 {
    let comeback = &config.comeback;
    let Some(max) = sequence.iter().copied().max() else {
        return 0;
    };
    let late = sequence
        .iter()
        .skip(comeback.min_position.saturating_sub(1))
        .any(|value| *value == max);
    if late { comeback.bonus } else { 0 }
}
