//! Single-run scoring
//!
//! Scores one combo sequence with the same engine and configuration the audit uses,
//! and prints the [`ScoredRun`](tripeaks_evaluator::run_scorer::ScoredRun) as JSON.
//! Handy for checking how a rule change affects one known playthrough.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tripeaks_evaluator::{
    record::{self, RawField, RawRow},
    run_scorer::RunScorer,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ScoreArg {
    /// Comma-separated combo count per drawn hand card, e.g. "2,1,1,0,3"
    #[arg(long)]
    sequence: String,
    /// Number of cards initially on the desk
    #[arg(long)]
    desk_size: u32,
    /// Difficulty tier of the level
    #[arg(long)]
    difficulty: u32,
    /// Outcome marker (win/loss, 胜利/失败, ...)
    #[arg(long)]
    outcome: String,
    /// Hand count variant, only used to label the result
    #[arg(long, default_value_t = 0)]
    hand_count: u32,
    /// Audit configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ScoreArg {
    fn to_row(&self) -> RawRow {
        RawRow {
            source: "cli".to_owned(),
            solution_set_id: Some(RawField::Text("-".to_owned())),
            hand_count: Some(RawField::Integer(self.hand_count.into())),
            difficulty: Some(RawField::Integer(self.difficulty.into())),
            combo_sequence: Some(RawField::Text(self.sequence.clone())),
            desk_size: Some(RawField::Integer(self.desk_size.into())),
            outcome: Some(RawField::Text(self.outcome.clone())),
        }
    }
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_deref())?;
    let record = record::parse_row(&arg.to_row()).context("Failed to parse the run")?;
    let scored = RunScorer::new(config.scoring).score_record(&record);
    if scored.has_red_line() {
        log::info!("red lines: {}", scored.red_lines);
    }
    Output::save_json(&scored, arg.output.as_deref())
}
