//! Audit command
//!
//! Loads one or more source tables (one per generator), scores every run in
//! parallel, judges every cohort and prints the summary tables. The full JSON report
//! is written with `--output`, per-run results included with `--include-runs`.

use std::{
    collections::BTreeSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
};

use chrono::Utc;
use clap::Args;
use tripeaks_analysis::{pipeline, summary::AuditSummary};
use tripeaks_evaluator::record::RawRow;

use crate::{
    ingest,
    report::{self, AuditReport, SourceInfo},
    util::{self, Output},
};

/// A source given on the command line: `name=path`, or a path named by its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceArg {
    name: String,
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid source `{arg}`: expected `name=path` or a file path")]
pub(crate) struct SourceArgError {
    arg: String,
}

impl FromStr for SourceArg {
    type Err = SourceArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceArgError { arg: s.to_owned() };
        let (name, path) = match s.split_once('=') {
            Some((name, path)) => (name.trim().to_owned(), PathBuf::from(path)),
            None => {
                let path = PathBuf::from(s);
                let name = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(invalid)?
                    .to_owned();
                (name, path)
            }
        };
        if name.is_empty() || path.as_os_str().is_empty() {
            return Err(invalid());
        }
        Ok(Self { name, path })
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AuditArg {
    /// Source tables (JSON arrays of run rows), as `name=path` or `path`
    #[arg(required = true)]
    sources: Vec<SourceArg>,

    /// Audit configuration JSON file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of scoring threads (defaults to the available parallelism)
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Hand count for sources without a hand-count column
    #[arg(long)]
    hand_count: Option<u32>,

    /// Skip sources with missing columns instead of aborting
    #[arg(long)]
    skip_invalid_sources: bool,

    /// Print one line per cohort
    #[arg(long)]
    show_cohorts: bool,

    /// Rank the cohort lines by mean score, highest first
    #[arg(long, requires = "show_cohorts")]
    rank: bool,

    /// Include every scored run in the JSON report
    #[arg(long, requires = "output")]
    include_runs: bool,
}

pub(crate) fn run(arg: &AuditArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_deref())?;
    let (rows, sources) = load_sources(arg)?;

    let threads = arg
        .threads
        .unwrap_or_else(|| thread::available_parallelism().unwrap_or(NonZeroUsize::MIN));
    eprintln!("Scoring {} rows on {threads} threads...", rows.len());
    let (runs, table) = pipeline::audit(&rows, &config, threads);
    let summary = AuditSummary::from_table(&table);

    report::print_legend();
    println!();
    report::print_overview(&summary);
    println!();
    report::print_by_difficulty(&summary);
    println!();
    report::print_source_comparison(&summary);
    println!();
    report::print_reasons(&summary);
    if arg.show_cohorts {
        println!();
        report::print_cohorts(&table, arg.rank);
    }

    if let Some(path) = &arg.output {
        let report = AuditReport {
            generated_at: Utc::now(),
            sources: &sources,
            config: &config,
            summary: &summary,
            cohorts: &table,
            runs: arg.include_runs.then_some(runs.as_slice()),
        };
        let mut output = Output::open(Some(path))?;
        output.write_json(&report)?;
        eprintln!("Report saved to: {}", output.label());
    }

    Ok(())
}

/// Reads every source given on the command line, in order.
fn load_sources(arg: &AuditArg) -> anyhow::Result<(Vec<RawRow>, Vec<SourceInfo>)> {
    let mut names = BTreeSet::new();
    for source in &arg.sources {
        if !names.insert(source.name.as_str()) {
            anyhow::bail!("Source name `{}` is given more than once", source.name);
        }
    }

    let mut rows = Vec::new();
    let mut sources = Vec::new();
    for source in &arg.sources {
        let Some(source_rows) = load_source(&source.name, &source.path, arg)? else {
            continue;
        };
        eprintln!(
            "Loaded {} rows from {} ({})",
            source_rows.len(),
            source.name,
            source.path.display()
        );
        sources.push(SourceInfo {
            name: source.name.clone(),
            path: source.path.clone(),
            rows: source_rows.len(),
        });
        rows.extend(source_rows);
    }
    if sources.is_empty() {
        anyhow::bail!("No usable source");
    }
    Ok((rows, sources))
}

/// Reads and normalizes one source; `None` when it is skipped.
fn load_source(
    name: &str,
    path: &Path,
    arg: &AuditArg,
) -> anyhow::Result<Option<Vec<RawRow>>> {
    let table = util::read_source_file(path)?;
    match ingest::read_rows(name, &table, arg.hand_count) {
        Ok(rows) => Ok(Some(rows)),
        Err(err) if arg.skip_invalid_sources => {
            log::warn!("skipping {}: {err}", path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
