//! End-to-end audit: raw rows in, scored runs and fact table out.
//!
//! Scoring is an embarrassingly parallel map. Rows are split into contiguous chunks,
//! each chunk is scored on its own scoped thread, and the chunks are concatenated in
//! order, so the output order matches the input order regardless of the thread count.
//! Aggregation is a barrier after the map and runs on the calling thread.

use std::{num::NonZeroUsize, thread};

use tripeaks_evaluator::{
    record::RawRow,
    run_scorer::{RunScorer, ScoredRun},
};

use crate::{
    config::AuditConfig,
    fact_table::{FactTable, FactTableBuilder},
};

/// Scores every row, one output per input row and in the same order.
#[must_use]
pub fn score_rows(scorer: &RunScorer, rows: &[RawRow], threads: NonZeroUsize) -> Vec<ScoredRun> {
    if rows.is_empty() {
        return vec![];
    }
    let chunk_size = rows.len().div_ceil(threads.get());
    let mut outputs = vec![Vec::new(); rows.len().div_ceil(chunk_size)];

    thread::scope(|s| {
        for (chunk, output) in rows.chunks(chunk_size).zip(&mut outputs) {
            s.spawn(move || {
                *output = chunk.iter().map(|row| scorer.score_row(row)).collect();
            });
        }
    });

    outputs.into_iter().flatten().collect()
}

/// Scores `rows` and reduces them into a fact table.
///
/// Returns the scored runs, one per row in input order, along with the table.
/// `config` is expected to be validated by the caller.
#[must_use]
pub fn audit(
    rows: &[RawRow],
    config: &AuditConfig,
    threads: NonZeroUsize,
) -> (Vec<ScoredRun>, FactTable) {
    let scorer = RunScorer::new(config.scoring.clone());
    let runs = score_rows(&scorer, rows, threads);
    let failures = runs.iter().filter(|run| run.parse_error.is_some()).count();
    if failures > 0 {
        log::warn!("{failures} of {} rows failed to parse", runs.len());
    }

    let builder = runs.iter().cloned().collect::<FactTableBuilder>();
    let table = builder.build(&config.judgment);
    log::info!("judged {} cohorts from {} rows", table.len(), rows.len());
    (runs, table)
}

#[cfg(test)]
mod tests {
    use tripeaks_evaluator::record::RawField;

    use super::*;
    use crate::summary::AuditSummary;

    fn row(source: &str, solution_set_id: &str, sequence: &str, difficulty: i64, outcome: &str) -> RawRow {
        RawRow {
            source: source.into(),
            solution_set_id: Some(solution_set_id.into()),
            hand_count: Some(RawField::Integer(24)),
            difficulty: Some(RawField::Integer(difficulty)),
            combo_sequence: Some(sequence.into()),
            desk_size: Some(RawField::Integer(52)),
            outcome: Some(outcome.into()),
        }
    }

    fn threads(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_order_is_preserved_for_any_thread_count() {
        let rows = (0..23)
            .map(|i| row("gen", &format!("S{i}"), "2,1,1,0,3", 35, "win"))
            .collect::<Vec<_>>();
        let scorer = RunScorer::default();
        let sequential = score_rows(&scorer, &rows, threads(1));
        assert_eq!(sequential.len(), rows.len());
        for n in [2, 4, 7, 64] {
            assert_eq!(score_rows(&scorer, &rows, threads(n)), sequential);
        }
        assert!(score_rows(&scorer, &[], threads(4)).is_empty());
    }

    #[test]
    fn test_audit_end_to_end() {
        let mut rows = Vec::new();
        for _ in 0..10 {
            rows.push(row("gen-a", "S1", "2,1,1,0,0,0,0,2,1,3", 35, "win"));
            // Loses on an easy tier: every run is a logic reversal.
            rows.push(row("gen-a", "S2", "2,1,1,0,0,0,0,2,1,3", 20, "loss"));
        }
        rows.push(row("gen-b", "S1", "1,?,2", 35, "win"));

        let (runs, table) = audit(&rows, &AuditConfig::default(), threads(3));
        assert_eq!(runs.len(), rows.len());
        assert_eq!(runs[1].key.solution_set_id.as_deref(), Some("S2"));
        let summary = AuditSummary::from_table(&table);
        assert_eq!(table.len(), 3);
        assert_eq!(summary.run_count, 21);
        assert_eq!(summary.parse_failures, 1);
        assert_eq!(summary.counts.passed, 1);
        assert_eq!(summary.counts.rejected, 2);
        assert_eq!(summary.solution_sets.distinct, 3);
        assert_eq!(summary.solution_sets.accepted, 1);
    }

    #[test]
    fn test_rows_without_solution_set_id_are_parse_failures() {
        let mut rows = vec![row("gen", "S1", "2,1,1,0,0,0,0,2,1,3", 35, "win")];
        for id in [None, Some(RawField::Text(" ".into()))] {
            rows.push(RawRow {
                solution_set_id: id,
                ..rows[0].clone()
            });
        }

        let (runs, table) = audit(&rows, &AuditConfig::default(), threads(2));
        assert!(runs[1].parse_error.is_some());
        assert!(runs[2].parse_error.is_some());

        let summary = AuditSummary::from_table(&table);
        assert_eq!(table.len(), 2);
        assert_eq!(summary.parse_failures, 2);
        assert_eq!(summary.solution_sets.distinct, 1);
        assert_eq!(summary.solution_sets.accepted, 1);

        let unidentified = table.iter().find(|fact| fact.key.solution_set_id.is_none()).unwrap();
        assert_eq!(unidentified.sample_count, 2);
        assert_eq!(unidentified.parse_failures, 2);
        assert!(unidentified.decision.is_reject());
    }
}
