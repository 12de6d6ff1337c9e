//! Audit report output
//!
//! The JSON report bundles everything needed to reproduce a decision: the
//! configuration, the input sources, every judgment fact and the summary derived
//! from them. Per-run results are included on request. The text tables print the
//! same summary for a terminal.

use std::{cmp::Ordering, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripeaks_analysis::{
    config::AuditConfig,
    fact_table::{FactTable, JudgmentFact},
    summary::{AuditSummary, DecisionCounts, SolutionSetCoverage},
};
use tripeaks_evaluator::run_scorer::ScoredRun;
use tripeaks_stats::descriptive::DescriptiveStats;

/// One input source of an audit.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct AuditReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub sources: &'a [SourceInfo],
    pub config: &'a AuditConfig,
    pub summary: &'a AuditSummary,
    pub cohorts: &'a FactTable,
    /// Every scored run in input order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs: Option<&'a [ScoredRun]>,
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn counts_columns(counts: &DecisionCounts) -> String {
    format!(
        "{:>8} {:>8} {:>8} {:>8} {:>8}",
        counts.cohorts,
        counts.passed,
        counts.rejected,
        counts.insufficient,
        percent(counts.pass_rate()),
    )
}

fn coverage(coverage: &SolutionSetCoverage) -> String {
    format!(
        "{}/{} ({})",
        coverage.accepted,
        coverage.distinct,
        percent(coverage.rate())
    )
}

fn mean_spread(stats: Option<&DescriptiveStats>) -> String {
    stats.map_or_else(
        || "N/A".to_owned(),
        |stats| {
            format!(
                "{:.1} [{:.1}, {:.1}] sd {:.1}",
                stats.mean, stats.min, stats.max, stats.std_dev
            )
        },
    )
}

/// Print the legend explaining the decision columns
pub fn print_legend() {
    println!("Legend:");
    println!("  Cohort   : one solution set at one hand count and difficulty in one source");
    println!("  Pass%    : passed cohorts over all cohorts");
    println!("  Accepted : solution sets whose cohorts all passed");
    println!("  Mean     : trimmed mean score (spread of cohort means per source)");
}

pub fn print_overview(summary: &AuditSummary) {
    println!("Overview");
    println!("--------");
    println!("  Runs              : {}", summary.run_count);
    println!("  Parse failures    : {}", summary.parse_failures);
    println!("  Cohorts           : {}", summary.counts.cohorts);
    println!(
        "  Passed            : {} ({})",
        summary.counts.passed,
        percent(summary.counts.pass_rate())
    );
    println!("  Rejected          : {}", summary.counts.rejected);
    println!("  Insufficient data : {}", summary.counts.insufficient);
    println!("  Accepted sets     : {}", coverage(&summary.solution_sets));
}

fn print_counts_header(label_col: &str) {
    println!(
        "  {:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
        label_col, "Cohorts", "Passed", "Rejected", "NoData", "Pass%"
    );
    // label(20) + 5 columns(8) + spaces(5)
    println!("  {}", "-".repeat(65));
}

pub fn print_by_difficulty(summary: &AuditSummary) {
    println!("By difficulty");
    print_counts_header("Difficulty");
    for row in &summary.by_difficulty {
        let label = row
            .difficulty
            .map_or_else(|| "?".to_owned(), |difficulty| difficulty.to_string());
        println!("  {:<20} {}", label, counts_columns(&row.counts));
    }
}

pub fn print_source_comparison(summary: &AuditSummary) {
    println!("Source comparison");
    println!(
        "  {:<20} {:>8} {:>8} {:>8} {:>8} {:>8} {:>18}  Mean",
        "Source", "Cohorts", "Passed", "Rejected", "NoData", "Pass%", "Accepted"
    );
    println!("  {}", "-".repeat(110));
    for source in &summary.by_source {
        println!(
            "  {:<20} {} {:>18}  {}",
            source.source,
            counts_columns(&source.counts),
            coverage(&source.solution_sets),
            mean_spread(source.cohort_means.as_ref()),
        );
    }
}

pub fn print_reasons(summary: &AuditSummary) {
    println!("Rejection reasons");
    if summary.reasons.is_empty() {
        println!("  (none)");
        return;
    }
    for reason in &summary.reasons {
        println!("  {:<24} {:>8}", reason.reason.to_string(), reason.count);
    }
}

/// Cohorts by trimmed mean, highest first; cohorts without data go last.
fn ranked(table: &FactTable) -> Vec<&JudgmentFact> {
    let mut facts = table.iter().collect::<Vec<_>>();
    facts.sort_by(|a, b| match (a.mean(), b.mean()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    facts
}

fn print_cohort_row(fact: &JudgmentFact) {
    let [kept, mean, var, cv] = fact.stats.map_or_else(
        || ["N/A".to_owned(), "N/A".to_owned(), "N/A".to_owned(), "N/A".to_owned()],
        |stats| {
            [
                stats.retained_count().to_string(),
                format!("{:.1}", stats.mean),
                format!("{:.1}", stats.variance),
                format!("{:.3}", stats.cv),
            ]
        },
    );
    println!(
        "  {:<36} {:>6} {:>6} {:>8} {:>8} {:>7} {:>8}  {}",
        fact.key.to_string(),
        fact.sample_count,
        kept,
        mean,
        var,
        cv,
        percent(fact.redline_rate),
        fact.decision,
    );
}

/// Prints one line per cohort, in key order or ranked by mean score.
pub fn print_cohorts(table: &FactTable, rank: bool) {
    println!("{}", if rank { "Cohort ranking" } else { "Cohorts" });
    println!(
        "  {:<36} {:>6} {:>6} {:>8} {:>8} {:>7} {:>8}  Decision",
        "Cohort", "Runs", "Kept", "Mean", "Var", "CV", "RedLine"
    );
    println!("  {}", "-".repeat(107));
    let facts = if rank {
        ranked(table)
    } else {
        table.iter().collect()
    };
    for fact in facts {
        print_cohort_row(fact);
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use tripeaks_analysis::{config::JudgmentConfig, fact_table::FactTableBuilder, pipeline};
    use tripeaks_evaluator::{
        record::{CohortKey, RawField, RawRow},
        red_line::RedLineSet,
        run_scorer::ScoreBreakdown,
    };

    use super::*;

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(percent(0.25), "25.0%");
        assert_eq!(
            coverage(&SolutionSetCoverage {
                distinct: 4,
                accepted: 1,
            }),
            "1/4 (25.0%)"
        );
        assert_eq!(mean_spread(None), "N/A");
        let stats = DescriptiveStats::new([50.0, 70.0]).unwrap();
        assert_eq!(mean_spread(Some(&stats)), "60.0 [50.0, 70.0] sd 10.0");
    }

    #[test]
    fn test_report_serializes() {
        let config = AuditConfig::default();
        let table = FactTable::default();
        let summary = AuditSummary::from_table(&table);
        let sources = [SourceInfo {
            name: "gen".into(),
            path: PathBuf::from("gen.json"),
            rows: 0,
        }];
        let report = AuditReport {
            generated_at: Utc::now(),
            sources: &sources,
            config: &config,
            summary: &summary,
            cohorts: &table,
            runs: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["sources"][0]["name"], "gen");
        assert_eq!(value["config"]["version"], 1);
        assert_eq!(value["cohorts"], serde_json::json!([]));
        assert!(value["generated_at"].is_string());
        assert!(value.get("runs").is_none());
    }

    fn rows(sequences: &[(&str, i64)]) -> Vec<RawRow> {
        sequences
            .iter()
            .map(|(sequence, difficulty)| RawRow {
                source: "gen".into(),
                solution_set_id: Some("S1".into()),
                hand_count: Some(RawField::Integer(24)),
                difficulty: Some(RawField::Integer(*difficulty)),
                combo_sequence: Some((*sequence).into()),
                desk_size: Some(RawField::Integer(52)),
                outcome: Some("win".into()),
            })
            .collect()
    }

    #[test]
    fn test_report_includes_runs() {
        let config = AuditConfig::default();
        let rows = rows(&[("2,1,1,0,0,0,0,2,1,3", 35), ("1,x", 35)]);
        let (runs, table) = pipeline::audit(&rows, &config, NonZeroUsize::MIN);
        let summary = AuditSummary::from_table(&table);
        let report = AuditReport {
            generated_at: Utc::now(),
            sources: &[],
            config: &config,
            summary: &summary,
            cohorts: &table,
            runs: Some(&runs),
        };
        let value = serde_json::to_value(&report).unwrap();
        let runs = value["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["score"], 50);
        assert_eq!(runs[0]["key"]["solution_set_id"], "S1");
        assert!(runs[0]["breakdown"]["barren"].is_object());
        assert!(runs[0].get("parse_error").is_none());
        assert_eq!(runs[1]["score"], 0);
        assert_eq!(runs[1]["parse_error"]["kind"], "invalid_sequence_token");
    }

    #[test]
    fn test_ranked_by_mean_score() {
        let key = |difficulty| CohortKey {
            source: "gen".into(),
            hand_count: Some(24),
            solution_set_id: Some("S1".into()),
            difficulty: Some(difficulty),
        };
        let run = |difficulty, score| ScoredRun {
            key: key(difficulty),
            score,
            red_lines: RedLineSet::default(),
            breakdown: ScoreBreakdown::default(),
            parse_error: None,
        };
        let mut builder = [run(20, 40), run(30, 75), run(40, 55), run(40, 65)]
            .into_iter()
            .collect::<FactTableBuilder>();
        builder.declare(key(10));
        let table = builder.build(&JudgmentConfig::default());

        let ranking = ranked(&table)
            .iter()
            .map(|fact| (fact.key.difficulty, fact.mean()))
            .collect::<Vec<_>>();
        assert_eq!(
            ranking,
            vec![
                (Some(30), Some(75.0)),
                (Some(40), Some(60.0)),
                (Some(20), Some(40.0)),
                (Some(10), None),
            ]
        );
    }
}
