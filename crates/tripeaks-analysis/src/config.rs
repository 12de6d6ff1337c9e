//! Versioned audit configuration.
//!
//! [`AuditConfig`] bundles the run scoring rules ([`ScoringConfig`]) with the cohort
//! judgment rules ([`JudgmentConfig`]). Both sides are plain values passed into every
//! call; there is no global configuration state.
//!
//! ```json
//! {
//!   "version": 1,
//!   "scoring": { "base_score": 60 },
//!   "judgment": { "mu_threshold": 50.0, "dispersion": "either" }
//! }
//! ```
//!
//! Omitted fields take their defaults.

use serde::{Deserialize, Serialize};
use tripeaks_evaluator::config::{ConfigError, ScoringConfig};

/// Configuration format version understood by this build.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AuditConfigError {
    #[display("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[display("invalid scoring config: {_0}")]
    Scoring(ConfigError),
    #[display("trim percentage must be within [0, 100), got {value}")]
    TrimPercentageOutOfRange { value: f64 },
    #[display("red-line rate limit must be within (0, 1], got {value}")]
    RedLineRateLimitOutOfRange { value: f64 },
    #[display("{name} must be a non-negative number, got {value}")]
    InvalidLimit { name: &'static str, value: f64 },
}

impl From<ConfigError> for AuditConfigError {
    fn from(error: ConfigError) -> Self {
        AuditConfigError::Scoring(error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub version: u32,
    pub scoring: ScoringConfig,
    pub judgment: JudgmentConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            scoring: ScoringConfig::default(),
            judgment: JudgmentConfig::default(),
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<(), AuditConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(AuditConfigError::UnsupportedVersion {
                found: self.version,
                supported: CONFIG_VERSION,
            });
        }
        self.scoring.validate()?;
        self.judgment.validate()
    }
}

/// How the coefficient-of-variation and variance limits combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispersionRule {
    /// Dispersion is acceptable if either the CV or the variance is within its limit.
    #[default]
    Either,
    /// Both the CV and the variance must be within their limits.
    Both,
}

/// Thresholds of the cohort admission decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgmentConfig {
    /// Minimum trimmed mean score for admission.
    pub mu_threshold: f64,
    /// Percentage of the sorted scores dropped from each tail.
    pub trim_percentage: f64,
    pub cv_limit: f64,
    pub var_limit: f64,
    pub dispersion: DispersionRule,
    /// Cohorts reject once this fraction of runs carries a red line.
    pub redline_rate_limit: f64,
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            mu_threshold: 50.0,
            trim_percentage: 10.0,
            cv_limit: 0.2,
            var_limit: 150.0,
            dispersion: DispersionRule::Either,
            redline_rate_limit: 0.15,
        }
    }
}

impl JudgmentConfig {
    pub fn validate(&self) -> Result<(), AuditConfigError> {
        if !(0.0..100.0).contains(&self.trim_percentage) {
            return Err(AuditConfigError::TrimPercentageOutOfRange {
                value: self.trim_percentage,
            });
        }
        let limit = self.redline_rate_limit;
        if limit.is_nan() || limit <= 0.0 || limit > 1.0 {
            return Err(AuditConfigError::RedLineRateLimitOutOfRange { value: limit });
        }
        for (name, value) in [("cv_limit", self.cv_limit), ("var_limit", self.var_limit)] {
            if value.is_nan() || value < 0.0 {
                return Err(AuditConfigError::InvalidLimit { name, value });
            }
        }
        if !self.mu_threshold.is_finite() {
            return Err(AuditConfigError::InvalidLimit {
                name: "mu_threshold",
                value: self.mu_threshold,
            });
        }
        Ok(())
    }
}
