//! Run scoring engine for auditing generated Tripeaks solutions.
//!
//! Every simulated playthrough of a generated level produces a *combo sequence*: one
//! non-negative combo count per drawn hand card. This crate turns one such run into a
//! heuristic experience score and a set of disqualifying *red lines*.
//!
//! # Architecture
//!
//! ```text
//! RawRow ── record::parse_row ──► RunRecord
//!                                    │
//!                                    ▼
//!                         sequence::SequenceAnalysis
//!            (anchors, barren intervals, relays, positive runs, burst window)
//!                   │                                   │
//!                   ▼                                   ▼
//!        run_scorer (bonuses, penalties)      red_line (tag classification)
//!                   └──────────────┬────────────────────┘
//!                                  ▼
//!                              ScoredRun
//! ```
//!
//! - [`record`] - typed run records and the row parser ([`record::ParseError`])
//! - [`sequence`] - the sequence analyzers: interval segmentation, relays, run lengths
//!   and burst windows
//! - [`red_line`] - red-line tags and their classifier
//! - [`run_scorer`] - composes everything into a [`run_scorer::ScoredRun`]
//! - [`config`] - every threshold, bonus and penalty the engine uses
//!
//! # Design Principles
//!
//! Scoring is a pure function of a row and a [`config::ScoringConfig`]: no I/O, no global
//! state. Rows never fail the pipeline; a row that cannot be parsed becomes a sentinel
//! run with score `0` and the `parse_failure` tag, so cohort sample sizes stay honest.
//!
//! # Example
//!
//! ```
//! use tripeaks_evaluator::{
//!     config::ScoringConfig,
//!     red_line::RedLine,
//!     record::{Outcome, RunRecord},
//!     run_scorer::RunScorer,
//! };
//!
//! let record = RunRecord {
//!     source: "generator-a".into(),
//!     solution_set_id: "S-001".into(),
//!     hand_count: 24,
//!     difficulty: 20,
//!     desk_size: 10,
//!     outcome: Outcome::Loss,
//!     sequence: vec![2, 1, 1, 0, 0, 0, 0, 2, 1, 3],
//! };
//! let scorer = RunScorer::new(ScoringConfig::default());
//! let scored = scorer.score_record(&record);
//! assert!(scored.red_lines.contains(RedLine::LogicReversal));
//! assert!(!scored.red_lines.contains(RedLine::ValueCollapse));
//! ```

pub mod config;
pub mod record;
pub mod red_line;
pub mod run_scorer;
pub mod sequence;
