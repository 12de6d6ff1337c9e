//! Audit summaries derived from a [`FactTable`].
//!
//! Nothing here looks at runs: every count is read off the judgment facts, so the
//! summary can never disagree with the table it was built from.
//!
//! - overall decision counts and pass rate
//! - breakdown per difficulty tier
//! - per-source comparison (decision counts, solution-set coverage, spread of cohort means)
//! - reason histogram over rejected cohorts
//!
//! A *solution set* is identified by `(source, solution_set_id)`; the same id produced
//! by two sources is two different solution sets. A solution set is *accepted* when
//! every one of its cohorts passed.
//! Cohorts of rows without an id still count as cohorts but belong to no solution set.

use std::collections::BTreeMap;

use serde::Serialize;
use tripeaks_stats::descriptive::DescriptiveStats;

use crate::{
    decision::{Decision, RejectionReason},
    fact_table::{FactTable, JudgmentFact},
};

/// Cohort counts by decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub cohorts: usize,
    pub passed: usize,
    pub rejected: usize,
    pub insufficient: usize,
}

impl DecisionCounts {
    fn record(&mut self, decision: &Decision) {
        self.cohorts += 1;
        match decision {
            Decision::Pass => self.passed += 1,
            Decision::Reject(_) => self.rejected += 1,
            Decision::InsufficientData => self.insufficient += 1,
        }
    }

    /// Passed cohorts over all cohorts; `0` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.cohorts == 0 {
            return 0.0;
        }
        self.passed as f64 / self.cohorts as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolutionSetCoverage {
    /// Distinct `(source, solution_set_id)` pairs.
    pub distinct: usize,
    /// Solution sets whose cohorts all passed.
    pub accepted: usize,
}

impl SolutionSetCoverage {
    fn from_facts<'a, I>(facts: I) -> Self
    where
        I: IntoIterator<Item = &'a JudgmentFact>,
    {
        let mut all_passed = BTreeMap::<(&str, &str), bool>::new();
        for fact in facts {
            let Some(id) = fact.key.solution_set_id.as_deref() else {
                continue;
            };
            let passed = all_passed
                .entry((fact.key.source.as_str(), id))
                .or_insert(true);
            *passed &= fact.decision.is_pass();
        }
        Self {
            distinct: all_passed.len(),
            accepted: all_passed.values().filter(|passed| **passed).count(),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.distinct == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.distinct as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyBreakdown {
    /// `None` collects cohorts whose difficulty could not be read.
    pub difficulty: Option<u32>,
    pub counts: DecisionCounts,
}

/// How one source (generator) fared compared to the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceComparison {
    pub source: String,
    pub run_count: usize,
    pub counts: DecisionCounts,
    pub solution_sets: SolutionSetCoverage,
    /// Spread of the trimmed cohort means; `None` if no cohort had data.
    pub cohort_means: Option<DescriptiveStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: RejectionReason,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub run_count: usize,
    pub parse_failures: usize,
    pub counts: DecisionCounts,
    pub solution_sets: SolutionSetCoverage,
    pub by_difficulty: Vec<DifficultyBreakdown>,
    pub by_source: Vec<SourceComparison>,
    /// Rejection reasons, most frequent first.
    pub reasons: Vec<ReasonCount>,
}

impl AuditSummary {
    #[must_use]
    pub fn from_table(table: &FactTable) -> Self {
        let mut counts = DecisionCounts::default();
        let mut by_difficulty = BTreeMap::<Option<u32>, DecisionCounts>::new();
        let mut by_source = BTreeMap::<&str, Vec<&JudgmentFact>>::new();
        let mut reasons = BTreeMap::<RejectionReason, usize>::new();

        for fact in table.iter() {
            counts.record(&fact.decision);
            by_difficulty
                .entry(fact.key.difficulty)
                .or_default()
                .record(&fact.decision);
            by_source
                .entry(fact.key.source.as_str())
                .or_default()
                .push(fact);
            if let Some(reason) = fact.decision.reason() {
                *reasons.entry(reason).or_default() += 1;
            }
        }

        let mut reasons = reasons
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect::<Vec<_>>();
        // Stable sort keeps the canonical reason order among equal counts.
        reasons.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            run_count: table.iter().map(|fact| fact.sample_count).sum(),
            parse_failures: table.iter().map(|fact| fact.parse_failures).sum(),
            counts,
            solution_sets: SolutionSetCoverage::from_facts(table.iter()),
            by_difficulty: by_difficulty
                .into_iter()
                .map(|(difficulty, counts)| DifficultyBreakdown { difficulty, counts })
                .collect(),
            by_source: by_source
                .into_iter()
                .map(|(source, facts)| SourceComparison::from_facts(source, &facts))
                .collect(),
            reasons,
        }
    }
}

impl SourceComparison {
    fn from_facts(source: &str, facts: &[&JudgmentFact]) -> Self {
        let mut counts = DecisionCounts::default();
        for fact in facts {
            counts.record(&fact.decision);
        }
        Self {
            source: source.to_owned(),
            run_count: facts.iter().map(|fact| fact.sample_count).sum(),
            counts,
            solution_sets: SolutionSetCoverage::from_facts(facts.iter().copied()),
            cohort_means: DescriptiveStats::new(facts.iter().filter_map(|fact| fact.mean())),
        }
    }
}
