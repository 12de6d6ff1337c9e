//! Scoring configuration.
//!
//! All thresholds, bonuses and penalties of the run scoring engine live here, so a
//! rule change is a configuration edit rather than a new code path. Every struct
//! deserializes with `#[serde(default)]`: a JSON file only needs the values it
//! overrides.
//!
//! Penalties are stored as positive magnitudes and subtracted from the score.

use serde::{Deserialize, Serialize};

/// Invalid scoring configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("burst window width must be at least 1")]
    ZeroBurstWindow,
    #[display("burst threshold must be within (0, 100], got {threshold_pct}")]
    BurstThresholdOutOfRange { threshold_pct: f64 },
    #[display("value collapse factor must be positive, got {factor}")]
    NonPositiveCollapseFactor { factor: f64 },
    #[display("{name} must be at least 1")]
    ZeroWindow { name: &'static str },
}

/// Complete configuration of the run scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score every run starts from.
    pub base_score: i32,
    /// Combo value at or above which a card is an anchor.
    pub anchor_value: u32,
    pub opening: OpeningBonus,
    pub closing: ClosingBonus,
    pub comeback: ComebackBonus,
    pub relay: RelayBonus,
    pub barren: BarrenPenalties,
    pub feeding: FeedingPenalties,
    pub red_lines: RedLineRules,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 60,
            anchor_value: 3,
            opening: OpeningBonus::default(),
            closing: ClosingBonus::default(),
            comeback: ComebackBonus::default(),
            relay: RelayBonus::default(),
            barren: BarrenPenalties::default(),
            feeding: FeedingPenalties::default(),
            red_lines: RedLineRules::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opening.window == 0 {
            return Err(ConfigError::ZeroWindow {
                name: "opening window",
            });
        }
        if self.closing.window == 0 {
            return Err(ConfigError::ZeroWindow {
                name: "closing window",
            });
        }
        let factor = self.red_lines.collapse_factor;
        if factor.is_nan() || factor <= 0.0 {
            return Err(ConfigError::NonPositiveCollapseFactor { factor });
        }
        if let Some(burst) = &self.red_lines.burst {
            if burst.window_width == 0 {
                return Err(ConfigError::ZeroBurstWindow);
            }
            let pct = burst.threshold_pct;
            if pct.is_nan() || pct <= 0.0 || pct > 100.0 {
                return Err(ConfigError::BurstThresholdOutOfRange {
                    threshold_pct: burst.threshold_pct,
                });
            }
        }
        Ok(())
    }
}

/// Bonus for a strong start: the first `window` cards sum to at least `min_sum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningBonus {
    pub window: usize,
    pub min_sum: u32,
    pub bonus: i32,
}

impl Default for OpeningBonus {
    fn default() -> Self {
        Self {
            window: 3,
            min_sum: 4,
            bonus: 5,
        }
    }
}

/// Bonus for a strong finish: any of the last `window` cards reaches `min_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosingBonus {
    pub window: usize,
    pub min_value: u32,
    pub bonus: i32,
}

impl Default for ClosingBonus {
    fn default() -> Self {
        Self {
            window: 5,
            min_value: 3,
            bonus: 5,
        }
    }
}

/// Bonus when the sequence maximum is reached at card `min_position` (1-based) or later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComebackBonus {
    pub min_position: usize,
    pub bonus: i32,
}

impl Default for ComebackBonus {
    fn default() -> Self {
        Self {
            min_position: 7,
            bonus: 5,
        }
    }
}

/// Bonus for chained anchors, keyed by the relay count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayBonus {
    /// Largest number of cards between two anchors that still counts as a relay.
    pub max_gap: usize,
    pub single: i32,
    pub double: i32,
    /// Applied for three or more relays.
    pub chain: i32,
}

impl Default for RelayBonus {
    fn default() -> Self {
        Self {
            max_gap: 1,
            single: 5,
            double: 7,
            chain: 10,
        }
    }
}

/// Penalties for barren intervals between anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrenPenalties {
    /// Intervals starting at or before this index are opening intervals.
    pub opening_start_max: usize,
    pub severe_drought_opening: i32,
    pub severe_drought: i32,
    pub blockage: i32,
    pub mediocre: i32,
}

impl Default for BarrenPenalties {
    fn default() -> Self {
        Self {
            opening_start_max: 2,
            severe_drought_opening: 25,
            severe_drought: 20,
            blockage: 9,
            mediocre: 5,
        }
    }
}

/// Penalties for long streaks of positive combo values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedingPenalties {
    pub tier1: i32,
    pub tier2: i32,
}

impl Default for FeedingPenalties {
    fn default() -> Self {
        Self { tier1: 3, tier2: 9 }
    }
}

/// Configuration of the red-line classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedLineRules {
    /// Value collapse fires when `max(sequence) >= desk_size * collapse_factor`.
    pub collapse_factor: f64,
    pub logic_reversal: LogicReversalRule,
    /// Burst concentration family; `None` disables it.
    pub burst: Option<BurstRule>,
}

impl Default for RedLineRules {
    fn default() -> Self {
        Self {
            collapse_factor: 0.4,
            logic_reversal: LogicReversalRule::default(),
            burst: Some(BurstRule::default()),
        }
    }
}

/// Difficulty/outcome combinations that contradict the difficulty tier.
///
/// A loss on an easy tier or a win on a hard tier is a logic reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicReversalRule {
    /// Tiers on which a loss is a reversal.
    pub loss_on: DifficultySet,
    /// Tiers on which a win is a reversal.
    pub win_on: DifficultySet,
}

impl Default for LogicReversalRule {
    fn default() -> Self {
        Self {
            loss_on: DifficultySet::AtMost(30),
            win_on: DifficultySet::AtLeast(40),
        }
    }
}

/// A set of difficulty tiers, either as a cutoff or enumerated.
///
/// ```
/// # use tripeaks_evaluator::config::DifficultySet;
/// let low: DifficultySet = serde_json::from_str(r#"{"one_of": [10, 20, 30]}"#).unwrap();
/// assert!(low.contains(20));
/// assert!(!low.contains(25));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultySet {
    AtMost(u32),
    AtLeast(u32),
    OneOf(Vec<u32>),
}

impl DifficultySet {
    #[must_use]
    pub fn contains(&self, difficulty: u32) -> bool {
        match self {
            DifficultySet::AtMost(max) => difficulty <= *max,
            DifficultySet::AtLeast(min) => difficulty >= *min,
            DifficultySet::OneOf(tiers) => tiers.contains(&difficulty),
        }
    }
}

/// Sliding-window elimination concentration check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstRule {
    pub window_width: usize,
    /// Share of the total combo sum (percent) a single window may not reach.
    pub threshold_pct: f64,
}

impl Default for BurstRule {
    fn default() -> Self {
        Self {
            window_width: 5,
            threshold_pct: 75.0,
        }
    }
}
