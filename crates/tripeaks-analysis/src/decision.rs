//! Cohort admission decisions.
//!
//! A cohort is judged twice over the same inputs:
//!
//! - [`admission_gate`] is the plain boolean rule: the trimmed mean reaches the pass
//!   line, the dispersion is acceptable and the red-line rate stays under its limit.
//! - [`judge`] walks a ranked list of rejection reasons and reports the first that
//!   applies, so every rejected cohort carries exactly one canonical reason.
//!
//! The two always agree on pass versus reject. Cohorts without any run never reach
//! either rule and are reported as [`Decision::InsufficientData`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tripeaks_evaluator::red_line::{RED_LINE_COUNT, RedLine, RedLineSet};
use tripeaks_stats::trimmed::TrimmedStats;

use crate::config::{DispersionRule, JudgmentConfig};

/// Why a cohort was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Too many runs carry red lines; holds the most frequent category.
    RedLine(RedLine),
    ScoreTooLow,
    Instability,
    ExcessVariance,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::RedLine(tag) => fmt::Display::fmt(tag, f),
            RejectionReason::ScoreTooLow => f.write_str("score too low"),
            RejectionReason::Instability => f.write_str("instability"),
            RejectionReason::ExcessVariance => f.write_str("excess variance"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Pass,
    Reject(RejectionReason),
    /// The cohort has no runs to judge.
    InsufficientData,
}

impl Decision {
    #[must_use]
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Decision::Reject(reason) => Some(*reason),
            Decision::Pass | Decision::InsufficientData => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Pass => f.write_str("pass"),
            Decision::Reject(reason) => write!(f, "reject ({reason})"),
            Decision::InsufficientData => f.write_str("insufficient data"),
        }
    }
}

/// Red-line statistics of one cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedLineProfile {
    pub run_count: usize,
    /// Runs with a non-empty tag set.
    pub flagged_count: usize,
    /// Runs carrying each category, indexed like [`RedLine::ALL`].
    pub category_counts: [usize; RED_LINE_COUNT],
}

impl RedLineProfile {
    pub fn from_tag_sets<'a, I>(tag_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a RedLineSet>,
    {
        let mut profile = Self::default();
        for tags in tag_sets {
            profile.run_count += 1;
            if !tags.is_empty() {
                profile.flagged_count += 1;
            }
            for tag in tags.iter() {
                profile.category_counts[tag as usize] += 1;
            }
        }
        profile
    }

    /// Fraction of runs with at least one red line; `0` for an empty cohort.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.run_count == 0 {
            return 0.0;
        }
        self.flagged_count as f64 / self.run_count as f64
    }

    /// Fraction of runs carrying `tag`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn category_rate(&self, tag: RedLine) -> f64 {
        if self.run_count == 0 {
            return 0.0;
        }
        self.category_counts[tag as usize] as f64 / self.run_count as f64
    }

    /// Most frequent category among flagged runs.
    ///
    /// Ties go to the category that comes first in [`RedLine::ALL`].
    #[must_use]
    pub fn dominant(&self) -> Option<RedLine> {
        let mut best: Option<(RedLine, usize)> = None;
        for tag in RedLine::ALL {
            let count = self.category_counts[tag as usize];
            if count > 0 && best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((tag, count));
            }
        }
        best.map(|(tag, _)| tag)
    }
}

fn dispersion_ok(stats: &TrimmedStats, config: &JudgmentConfig) -> bool {
    let cv_ok = stats.cv <= config.cv_limit;
    let var_ok = stats.variance <= config.var_limit;
    match config.dispersion {
        DispersionRule::Either => cv_ok || var_ok,
        DispersionRule::Both => cv_ok && var_ok,
    }
}

/// Boolean admission rule.
#[must_use]
pub fn admission_gate(stats: &TrimmedStats, redline_rate: f64, config: &JudgmentConfig) -> bool {
    stats.mean >= config.mu_threshold
        && dispersion_ok(stats, config)
        && redline_rate < config.redline_rate_limit
}

/// Judges a cohort and reports the highest ranked rejection reason.
///
/// `stats` is `None` for an empty cohort.
#[must_use]
pub fn judge(
    stats: Option<&TrimmedStats>,
    profile: &RedLineProfile,
    config: &JudgmentConfig,
) -> Decision {
    let Some(stats) = stats else {
        return Decision::InsufficientData;
    };

    let decision = ranked_decision(stats, profile, config);
    debug_assert_eq!(
        decision.is_pass(),
        admission_gate(stats, profile.rate(), config),
        "ranked reasons disagree with the admission gate"
    );
    decision
}

fn ranked_decision(stats: &TrimmedStats, profile: &RedLineProfile, config: &JudgmentConfig) -> Decision {
    // A positive limit guarantees at least one flagged run here.
    if profile.rate() >= config.redline_rate_limit
        && let Some(tag) = profile.dominant()
    {
        return Decision::Reject(RejectionReason::RedLine(tag));
    }
    if stats.mean < config.mu_threshold {
        return Decision::Reject(RejectionReason::ScoreTooLow);
    }
    if !dispersion_ok(stats, config) {
        if stats.cv > config.cv_limit {
            return Decision::Reject(RejectionReason::Instability);
        }
        return Decision::Reject(RejectionReason::ExcessVariance);
    }
    Decision::Pass
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn stats(mean: f64, variance: f64) -> TrimmedStats {
        TrimmedStats {
            sample_count: 10,
            trimmed_per_side: 1,
            mean,
            variance,
            cv: if mean > 0.0 { variance.sqrt() / mean } else { 0.0 },
        }
    }

    fn tag_sets(flagged: &[&[RedLine]], clean: usize) -> Vec<RedLineSet> {
        flagged
            .iter()
            .map(|tags| tags.iter().copied().collect())
            .chain(std::iter::repeat_with(RedLineSet::new).take(clean))
            .collect()
    }

    #[test]
    fn test_zero_variance_cohort_at_threshold_passes() {
        let config = JudgmentConfig::default();
        let profile = RedLineProfile::from_tag_sets(&tag_sets(&[], 10));
        let stats = stats(50.0, 0.0);
        assert!(admission_gate(&stats, profile.rate(), &config));
        assert_eq!(judge(Some(&stats), &profile, &config), Decision::Pass);
    }

    #[test]
    fn test_empty_cohort_is_insufficient() {
        let config = JudgmentConfig::default();
        let decision = judge(None, &RedLineProfile::default(), &config);
        assert!(decision.is_insufficient_data());
        assert_eq!(decision.reason(), None);
    }

    #[test]
    fn test_red_lines_outrank_low_score() {
        let config = JudgmentConfig::default();
        let sets = tag_sets(
            &[
                &[RedLine::Automation, RedLine::LogicReversal],
                &[RedLine::LogicReversal],
            ],
            8,
        );
        let profile = RedLineProfile::from_tag_sets(&sets);
        assert_eq!(profile.rate(), 0.2);
        assert_eq!(profile.category_rate(RedLine::LogicReversal), 0.2);
        assert_eq!(
            judge(Some(&stats(10.0, 0.0)), &profile, &config),
            Decision::Reject(RejectionReason::RedLine(RedLine::LogicReversal))
        );
    }

    #[test]
    fn test_dominant_tie_uses_canonical_order() {
        let sets = tag_sets(&[&[RedLine::LogicReversal], &[RedLine::ValueCollapse]], 0);
        let profile = RedLineProfile::from_tag_sets(&sets);
        assert_eq!(profile.dominant(), Some(RedLine::ValueCollapse));
        assert_eq!(RedLineProfile::default().dominant(), None);
    }

    #[test]
    fn test_rate_just_under_limit_is_tolerated() {
        let config = JudgmentConfig::default();
        // 1 of 10 flagged: 0.1 < 0.15
        let profile = RedLineProfile::from_tag_sets(&tag_sets(&[&[RedLine::Automation]], 9));
        assert_eq!(judge(Some(&stats(60.0, 4.0)), &profile, &config), Decision::Pass);
    }

    #[test]
    fn test_score_too_low() {
        let config = JudgmentConfig::default();
        let profile = RedLineProfile::from_tag_sets(&tag_sets(&[], 5));
        assert_eq!(
            judge(Some(&stats(49.9, 0.0)), &profile, &config),
            Decision::Reject(RejectionReason::ScoreTooLow)
        );
    }

    #[test]
    fn test_dispersion_rules() {
        let profile = RedLineProfile::from_tag_sets(&tag_sets(&[], 5));
        // cv = 0.3 > 0.2 and var = 900 > 150
        let unstable = stats(100.0, 900.0);
        // cv = 0.15 <= 0.2 but var = 225 > 150
        let wide = stats(100.0, 225.0);

        let either = JudgmentConfig::default();
        assert_eq!(
            judge(Some(&unstable), &profile, &either),
            Decision::Reject(RejectionReason::Instability)
        );
        assert_eq!(judge(Some(&wide), &profile, &either), Decision::Pass);

        let both = JudgmentConfig {
            dispersion: DispersionRule::Both,
            ..JudgmentConfig::default()
        };
        assert_eq!(
            judge(Some(&unstable), &profile, &both),
            Decision::Reject(RejectionReason::Instability)
        );
        assert_eq!(
            judge(Some(&wide), &profile, &both),
            Decision::Reject(RejectionReason::ExcessVariance)
        );
    }

    #[test]
    fn test_gate_and_reasons_agree() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x7219);
        for _ in 0..2000 {
            let config = JudgmentConfig {
                mu_threshold: rng.random_range(0.0..100.0),
                trim_percentage: 10.0,
                cv_limit: rng.random_range(0.0..1.0),
                var_limit: rng.random_range(0.0..400.0),
                dispersion: if rng.random_bool(0.5) {
                    DispersionRule::Either
                } else {
                    DispersionRule::Both
                },
                redline_rate_limit: rng.random_range(0.01..=1.0),
            };
            let run_count = rng.random_range(1..20);
            let sets = (0..run_count)
                .map(|_| {
                    RedLine::ALL
                        .into_iter()
                        .filter(|_| rng.random_bool(0.1))
                        .collect::<RedLineSet>()
                })
                .collect::<Vec<_>>();
            let profile = RedLineProfile::from_tag_sets(&sets);
            let stats = stats(rng.random_range(0.0..100.0), rng.random_range(0.0..400.0));

            let decision = judge(Some(&stats), &profile, &config);
            assert_eq!(
                decision.is_pass(),
                admission_gate(&stats, profile.rate(), &config),
                "{config:?} {stats:?} {profile:?}"
            );
            assert_eq!(decision.is_reject(), decision.reason().is_some());
        }
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(
            serde_json::to_string(&Decision::Pass).unwrap(),
            r#"{"status":"pass"}"#
        );
        assert_eq!(
            serde_json::to_string(&Decision::Reject(RejectionReason::ScoreTooLow)).unwrap(),
            r#"{"status":"reject","reason":"score_too_low"}"#
        );
        assert_eq!(
            Decision::Reject(RejectionReason::RedLine(RedLine::Automation)).to_string(),
            "reject (automation)"
        );
    }
}
