//! Cohort judgment for Tripeaks solution audits.
//!
//! A generator produces solution sets; each is simulated many times per hand-count
//! variant and difficulty tier. This crate groups the scored runs of those repeated
//! trials into cohorts and decides, per cohort, whether the solution is admitted.
//!
//! # Pipeline
//!
//! ```text
//! RawRow ─► RunScorer (parallel, pipeline) ─► ScoredRun
//!                                               │ group by CohortKey
//!                                               ▼
//!                        TrimmedStats + RedLineProfile ─► decision::judge
//!                                               │
//!                                               ▼
//!                                    FactTable (write-once)
//!                                               │
//!                                               ▼
//!                                         AuditSummary
//! ```
//!
//! # Modules
//!
//! - [`config`]: the versioned [`config::AuditConfig`] and judgment thresholds
//! - [`decision`]: admission gate and ranked rejection reasons
//! - [`fact_table`]: one [`fact_table::JudgmentFact`] per cohort
//! - [`summary`]: totals, per-difficulty and per-source views of a fact table
//! - [`pipeline`]: parallel scoring and the end-to-end [`pipeline::audit`]

pub mod config;
pub mod decision;
pub mod fact_table;
pub mod pipeline;
pub mod summary;
