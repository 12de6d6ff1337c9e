//! The cohort fact table.
//!
//! Scored runs are grouped by their [`CohortKey`] (source, hand count, solution set,
//! difficulty). Each group is reduced exactly once into a [`JudgmentFact`]: trimmed
//! statistics, red-line rates, mean diagnostic counters and the final [`Decision`].
//!
//! The resulting [`FactTable`] is write-once. It exposes no mutation, and every
//! downstream count (see [`crate::summary`]) is read from it instead of being
//! recomputed from runs.
//!
//! # Example
//!
//! ```
//! use tripeaks_analysis::{config::JudgmentConfig, fact_table::FactTableBuilder};
//! use tripeaks_evaluator::{
//!     record::{Outcome, RunRecord},
//!     run_scorer::RunScorer,
//! };
//!
//! let scorer = RunScorer::default();
//! let mut builder = FactTableBuilder::new();
//! for _ in 0..10 {
//!     let record = RunRecord {
//!         source: "generator-a".into(),
//!         solution_set_id: "S-001".into(),
//!         hand_count: 24,
//!         difficulty: 35,
//!         desk_size: 52,
//!         outcome: Outcome::Win,
//!         sequence: vec![2, 1, 1, 0, 0, 0, 0, 2, 1, 3],
//!     };
//!     builder.push(scorer.score_record(&record));
//! }
//!
//! let table = builder.build(&JudgmentConfig::default());
//! assert_eq!(table.len(), 1);
//! let fact = table.iter().next().unwrap();
//! assert_eq!(fact.sample_count, 10);
//! assert!(fact.decision.is_pass());
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tripeaks_evaluator::{record::CohortKey, red_line::RedLine, run_scorer::ScoredRun};
use tripeaks_stats::trimmed::TrimmedStats;

use crate::{
    config::JudgmentConfig,
    decision::{self, Decision, RedLineProfile},
};

/// Mean per-run diagnostic counters of a cohort's parsed runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MeanCounters {
    /// Tier 1 barren intervals (c1).
    pub mediocre: f64,
    /// Tier 2 barren intervals (c2).
    pub blockage: f64,
    /// Tier 3 barren intervals (c3).
    pub severe_drought: f64,
    pub relay_count: f64,
    /// Tier 1 feeding runs (f1).
    pub feeding_tier1: f64,
    /// Tier 2 feeding runs (f2).
    pub feeding_tier2: f64,
    pub max_burst_ratio: f64,
}

impl MeanCounters {
    /// Averages the counters of runs that parsed; `None` if there are none.
    #[expect(clippy::cast_precision_loss)]
    fn from_runs(runs: &[ScoredRun]) -> Option<Self> {
        let mut sum = Self::default();
        let mut count = 0_u32;
        for run in runs.iter().filter(|run| run.parse_error.is_none()) {
            let breakdown = &run.breakdown;
            sum.mediocre += f64::from(breakdown.barren.mediocre);
            sum.blockage += f64::from(breakdown.barren.blockage);
            sum.severe_drought += f64::from(breakdown.barren.severe_drought);
            sum.relay_count += breakdown.relay_count as f64;
            sum.feeding_tier1 += f64::from(breakdown.feeding.tier1);
            sum.feeding_tier2 += f64::from(breakdown.feeding.tier2);
            sum.max_burst_ratio += breakdown.max_burst_ratio;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = f64::from(count);
        Some(Self {
            mediocre: sum.mediocre / n,
            blockage: sum.blockage / n,
            severe_drought: sum.severe_drought / n,
            relay_count: sum.relay_count / n,
            feeding_tier1: sum.feeding_tier1 / n,
            feeding_tier2: sum.feeding_tier2 / n,
            max_burst_ratio: sum.max_burst_ratio / n,
        })
    }
}

/// The judgment of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgmentFact {
    pub key: CohortKey,
    /// Number of runs, parse failures included.
    pub sample_count: usize,
    pub parse_failures: usize,
    /// Trimmed score statistics; `None` for an empty cohort.
    pub stats: Option<TrimmedStats>,
    /// Fraction of runs with at least one red line.
    pub redline_rate: f64,
    /// Trigger rate of every category that fired at least once.
    pub red_line_rates: BTreeMap<RedLine, f64>,
    pub mean_counters: Option<MeanCounters>,
    pub decision: Decision,
}

impl JudgmentFact {
    /// Reduces the runs of one cohort.
    #[must_use]
    pub fn from_runs(key: CohortKey, runs: &[ScoredRun], config: &JudgmentConfig) -> Self {
        let stats = TrimmedStats::new(
            runs.iter().map(|run| f64::from(run.score)),
            config.trim_percentage,
        );
        let profile = RedLineProfile::from_tag_sets(runs.iter().map(|run| &run.red_lines));
        let decision = decision::judge(stats.as_ref(), &profile, config);
        let red_line_rates = RedLine::ALL
            .into_iter()
            .filter(|tag| profile.category_counts[*tag as usize] > 0)
            .map(|tag| (tag, profile.category_rate(tag)))
            .collect();

        log::debug!(
            "{key}: n={} mean={:?} redline_rate={:.3} => {decision}",
            runs.len(),
            stats.map(|stats| stats.mean),
            profile.rate()
        );

        Self {
            key,
            sample_count: runs.len(),
            parse_failures: runs.iter().filter(|run| run.parse_error.is_some()).count(),
            stats,
            redline_rate: profile.rate(),
            red_line_rates,
            mean_counters: MeanCounters::from_runs(runs),
            decision,
        }
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.stats.map(|stats| stats.mean)
    }
}

/// One [`JudgmentFact`] per cohort key, in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactTable {
    facts: BTreeMap<CohortKey, JudgmentFact>,
}

impl FactTable {
    #[must_use]
    pub fn get(&self, key: &CohortKey) -> Option<&JudgmentFact> {
        self.facts.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JudgmentFact> + '_ {
        self.facts.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl Serialize for FactTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.facts.values())
    }
}

/// Collects scored runs and reduces them into a [`FactTable`].
#[derive(Debug, Clone, Default)]
pub struct FactTableBuilder {
    groups: BTreeMap<CohortKey, Vec<ScoredRun>>,
}

impl FactTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, run: ScoredRun) {
        self.groups.entry(run.key.clone()).or_default().push(run);
    }

    /// Registers a cohort that may end up without runs.
    ///
    /// For callers that know their cohorts in advance, such as a planned grid of
    /// solution sets and difficulties. A declared cohort that receives no run is
    /// reported as insufficient data instead of silently disappearing from the table.
    /// Rows always produce a run, even when they fail to parse, so cohorts seen in
    /// the input never need declaring.
    pub fn declare(&mut self, key: CohortKey) {
        self.groups.entry(key).or_default();
    }

    /// Number of runs collected so far.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn build(self, config: &JudgmentConfig) -> FactTable {
        let facts = self
            .groups
            .into_iter()
            .map(|(key, runs)| {
                let fact = JudgmentFact::from_runs(key.clone(), &runs, config);
                (key, fact)
            })
            .collect();
        FactTable { facts }
    }
}

impl Extend<ScoredRun> for FactTableBuilder {
    fn extend<T: IntoIterator<Item = ScoredRun>>(&mut self, iter: T) {
        for run in iter {
            self.push(run);
        }
    }
}

impl FromIterator<ScoredRun> for FactTableBuilder {
    fn from_iter<T: IntoIterator<Item = ScoredRun>>(iter: T) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

#[cfg(test)]
mod tests {
    use tripeaks_evaluator::{
        record::{ParseError, RawField, RawRow},
        run_scorer::{RunScorer, ScoreBreakdown},
    };

    use super::*;
    use crate::decision::RejectionReason;

    fn key(source: &str, solution_set_id: &str, difficulty: u32) -> CohortKey {
        CohortKey {
            source: source.into(),
            hand_count: Some(24),
            solution_set_id: Some(solution_set_id.into()),
            difficulty: Some(difficulty),
        }
    }

    fn run(key: &CohortKey, score: i32, tags: &[RedLine]) -> ScoredRun {
        ScoredRun {
            key: key.clone(),
            score,
            red_lines: tags.iter().copied().collect(),
            breakdown: ScoreBreakdown::default(),
            parse_error: None,
        }
    }

    #[test]
    fn test_all_pass_cohort() {
        let key = key("gen", "S1", 35);
        let builder = (0..10).map(|_| run(&key, 50, &[])).collect::<FactTableBuilder>();
        let table = builder.build(&JudgmentConfig::default());

        let fact = table.get(&key).unwrap();
        assert_eq!(fact.sample_count, 10);
        let stats = fact.stats.unwrap();
        assert_eq!(stats.mean, 50.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.cv, 0.0);
        assert_eq!(fact.redline_rate, 0.0);
        assert!(fact.red_line_rates.is_empty());
        assert_eq!(fact.decision, Decision::Pass);
    }

    #[test]
    fn test_one_fact_per_key() {
        let a = key("gen", "S1", 20);
        let b = key("gen", "S1", 30);
        let mut builder = FactTableBuilder::new();
        builder.extend([run(&a, 60, &[]), run(&b, 60, &[]), run(&a, 62, &[])]);
        assert_eq!(builder.run_count(), 3);

        let table = builder.build(&JudgmentConfig::default());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&a).unwrap().sample_count, 2);
        assert_eq!(table.get(&b).unwrap().sample_count, 1);
        let keys = table.iter().map(|fact| fact.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys, vec![a, b]);
    }

    #[test]
    fn test_same_solution_set_in_two_sources_stays_apart() {
        let left = key("gen-a", "S1", 20);
        let right = key("gen-b", "S1", 20);
        let table = [run(&left, 60, &[]), run(&right, 10, &[])]
            .into_iter()
            .collect::<FactTableBuilder>()
            .build(&JudgmentConfig::default());
        assert_eq!(table.len(), 2);
        assert!(table.get(&left).unwrap().decision.is_pass());
        assert_eq!(
            table.get(&right).unwrap().decision,
            Decision::Reject(RejectionReason::ScoreTooLow)
        );
    }

    #[test]
    fn test_declared_empty_cohort_is_insufficient() {
        let key = key("gen", "S9", 50);
        let mut builder = FactTableBuilder::new();
        builder.declare(key.clone());
        let table = builder.build(&JudgmentConfig::default());
        let fact = table.get(&key).unwrap();
        assert_eq!(fact.sample_count, 0);
        assert_eq!(fact.stats, None);
        assert_eq!(fact.mean_counters, None);
        assert!(fact.decision.is_insufficient_data());
    }

    #[test]
    fn test_parse_failures_count_toward_red_lines() {
        let key = key("gen", "S1", 35);
        let mut builder = FactTableBuilder::new();
        builder.extend((0..8).map(|_| run(&key, 60, &[])));
        builder.extend(
            (0..2).map(|_| ScoredRun::parse_failure(key.clone(), ParseError::EmptySequence)),
        );
        let table = builder.build(&JudgmentConfig::default());
        let fact = table.get(&key).unwrap();
        assert_eq!(fact.sample_count, 10);
        assert_eq!(fact.parse_failures, 2);
        assert_eq!(fact.redline_rate, 0.2);
        assert_eq!(fact.red_line_rates.get(&RedLine::ParseFailure), Some(&0.2));
        assert_eq!(
            fact.decision,
            Decision::Reject(RejectionReason::RedLine(RedLine::ParseFailure))
        );
    }

    #[test]
    fn test_mean_counters_ignore_sentinels() {
        let scorer = RunScorer::default();
        let row = RawRow {
            source: "gen".into(),
            solution_set_id: Some("S1".into()),
            hand_count: Some(RawField::Integer(24)),
            difficulty: Some(RawField::Integer(35)),
            combo_sequence: Some("3,3,3,3,0,0,0,0,0,0,0,0".into()),
            desk_size: Some(RawField::Integer(52)),
            outcome: Some("win".into()),
        };
        let broken = RawRow {
            combo_sequence: Some("3,x".into()),
            ..row.clone()
        };
        let table = [scorer.score_row(&row), scorer.score_row(&broken)]
            .into_iter()
            .collect::<FactTableBuilder>()
            .build(&JudgmentConfig::default());
        let fact = table.iter().next().unwrap();
        let counters = fact.mean_counters.unwrap();
        assert_eq!(counters.relay_count, 3.0);
        assert_eq!(counters.feeding_tier1, 1.0);
        assert_eq!(counters.severe_drought, 1.0);
    }

    #[test]
    fn test_table_serializes_as_list() {
        let key = key("gen", "S1", 35);
        let table = [run(&key, 50, &[])]
            .into_iter()
            .collect::<FactTableBuilder>()
            .build(&JudgmentConfig::default());
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["key"]["source"], "gen");
        assert_eq!(value[0]["decision"]["status"], "pass");
    }
}
