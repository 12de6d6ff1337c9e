//! Red lines: hard disqualifying flags on a single run.
//!
//! Each red line is evaluated independently and the results are unioned into a
//! [`RedLineSet`]. The numeric score plays no part here: a run with a perfect score can
//! still carry red lines, and an empty set means no red line fired.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize, Serializer};

use crate::{config::RedLineRules, record::RunRecord, sequence::SequenceAnalysis};

/// Category of a red line.
///
/// The declaration order is the canonical order used for display and for breaking
/// ties between equally frequent categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedLine {
    /// The largest combo reaches a large share of the desk: the level collapses at once.
    ValueCollapse,
    /// A positive streak long enough that the run played itself.
    Automation,
    /// The outcome contradicts the difficulty tier.
    LogicReversal,
    /// Most eliminations happened inside one short window.
    BurstConcentration,
    /// The row could not be parsed.
    ParseFailure,
}

/// Number of red-line categories.
pub const RED_LINE_COUNT: usize = 5;

impl RedLine {
    pub const ALL: [RedLine; RED_LINE_COUNT] = [
        RedLine::ValueCollapse,
        RedLine::Automation,
        RedLine::LogicReversal,
        RedLine::BurstConcentration,
        RedLine::ParseFailure,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RedLine::ValueCollapse => "value collapse",
            RedLine::Automation => "automation",
            RedLine::LogicReversal => "logic reversal",
            RedLine::BurstConcentration => "burst concentration",
            RedLine::ParseFailure => "parse_failure",
        }
    }
}

impl fmt::Display for RedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// A set of red lines, kept in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedLineSet {
    tags: ArrayVec<RedLine, RED_LINE_COUNT>,
}

impl RedLineSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tag`; returns `false` if it was already present.
    pub fn insert(&mut self, tag: RedLine) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(index) => {
                self.tags.insert(index, tag);
                true
            }
        }
    }

    #[must_use]
    pub fn contains(&self, tag: RedLine) -> bool {
        self.tags.binary_search(&tag).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RedLine> + '_ {
        self.tags.iter().copied()
    }
}

impl FromIterator<RedLine> for RedLineSet {
    fn from_iter<T: IntoIterator<Item = RedLine>>(iter: T) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl fmt::Display for RedLineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(&tag, f)?;
        }
        Ok(())
    }
}

impl Serialize for RedLineSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RedLineSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tags = Vec::<RedLine>::deserialize(deserializer)?;
        Ok(tags.into_iter().collect())
    }
}

/// Derives the red lines of a parsed run.
#[must_use]
pub fn classify(record: &RunRecord, analysis: &SequenceAnalysis, rules: &RedLineRules) -> RedLineSet {
    let mut tags = RedLineSet::new();

    let max_value = record.sequence.iter().copied().max().unwrap_or(0);
    if f64::from(max_value) >= f64::from(record.desk_size) * rules.collapse_factor {
        tags.insert(RedLine::ValueCollapse);
    }

    if analysis.feeding.automation {
        tags.insert(RedLine::Automation);
    }

    let reversal = &rules.logic_reversal;
    let reversed = if record.outcome.is_win() {
        reversal.win_on.contains(record.difficulty)
    } else {
        reversal.loss_on.contains(record.difficulty)
    };
    if reversed {
        tags.insert(RedLine::LogicReversal);
    }

    if analysis.burst.is_some_and(|burst| burst.flagged) {
        tags.insert(RedLine::BurstConcentration);
    }

    tags
}
