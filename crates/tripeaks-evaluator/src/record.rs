//! Typed run records and the row parser.
//!
//! Ingestion hands the engine one [`RawRow`] per simulated run, with the scoring
//! fields still untyped ([`RawField`]: text or number, exactly as they came out of a
//! spreadsheet export). [`parse_row`] validates them into an immutable [`RunRecord`].
//!
//! The cohort identity of a row ([`CohortKey`]) is extracted leniently and separately
//! from the strict parse: a row whose combo sequence is garbage still belongs to its
//! solution set and must be counted there.

use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// A field value as delivered by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_owned())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

impl From<i64> for RawField {
    fn from(value: i64) -> Self {
        RawField::Integer(value)
    }
}

impl RawField {
    /// Returns the value as text, rendering numbers the way they were written.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawField::Integer(n) => Cow::Owned(n.to_string()),
            RawField::Float(x) => Cow::Owned(x.to_string()),
            RawField::Text(s) => Cow::Borrowed(s.trim()),
        }
    }

    /// Interprets the value as a non-negative integer.
    ///
    /// Integral floats (`52.0`) are accepted, as spreadsheet exports produce them.
    pub fn to_u32(&self, field: Field) -> Result<u32, ParseError> {
        let invalid = || ParseError::InvalidNumber {
            field,
            value: self.as_text().into_owned(),
        };
        match self {
            RawField::Integer(n) => u32::try_from(*n).map_err(|_| invalid()),
            RawField::Float(x) => integral_u32(*x).ok_or_else(invalid),
            RawField::Text(s) => {
                let s = s.trim();
                s.parse::<u32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral_u32))
                    .ok_or_else(invalid)
            }
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_u32(x: f64) -> Option<u32> {
    (x.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&x)).then_some(x as u32)
}

/// Names of the row fields the parser reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[display("solution set id")]
    SolutionSetId,
    #[display("combo sequence")]
    ComboSequence,
    #[display("desk size")]
    DeskSize,
    #[display("difficulty")]
    Difficulty,
    #[display("outcome")]
    Outcome,
    #[display("hand count")]
    HandCount,
}

/// A row that could not be turned into a [`RunRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display, derive_more::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    #[display("missing {field}")]
    MissingField { field: Field },
    #[display("invalid {field} value {value:?}")]
    InvalidNumber { field: Field, value: String },
    #[display("invalid combo token {token:?} at position {position}")]
    InvalidSequenceToken { position: usize, token: String },
    #[display("empty combo sequence")]
    EmptySequence,
    #[display("unrecognized outcome {value:?}")]
    AmbiguousOutcome { value: String },
}

/// Final result of a simulated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
}

const WIN_MARKERS: &[&str] = &["win", "won", "success", "pass", "true", "1", "胜利", "成功", "通关"];
const LOSS_MARKERS: &[&str] = &[
    "loss", "lose", "lost", "fail", "failure", "false", "0", "失败", "未通关",
];

impl Outcome {
    /// Parses an outcome marker, case-insensitively.
    ///
    /// ```
    /// # use tripeaks_evaluator::record::Outcome;
    /// assert_eq!(Outcome::parse(" WIN "), Ok(Outcome::Win));
    /// assert_eq!(Outcome::parse("失败"), Ok(Outcome::Loss));
    /// assert!(Outcome::parse("draw").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let marker = text.trim().to_lowercase();
        if WIN_MARKERS.contains(&marker.as_str()) {
            Ok(Outcome::Win)
        } else if LOSS_MARKERS.contains(&marker.as_str()) {
            Ok(Outcome::Loss)
        } else {
            Err(ParseError::AmbiguousOutcome {
                value: text.to_owned(),
            })
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("win"),
            Outcome::Loss => f.write_str("loss"),
        }
    }
}

/// One normalized input row, as produced by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub source: String,
    pub solution_set_id: Option<RawField>,
    pub hand_count: Option<RawField>,
    pub difficulty: Option<RawField>,
    pub combo_sequence: Option<RawField>,
    pub desk_size: Option<RawField>,
    pub outcome: Option<RawField>,
}

/// Identity of a repeated-trial group: one generator configuration on one difficulty.
///
/// Solution set, hand count and difficulty are `None` only when the row's value could
/// not be read; such rows still form a cohort of their own instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CohortKey {
    pub source: String,
    pub hand_count: Option<u32>,
    pub solution_set_id: Option<String>,
    pub difficulty: Option<u32>,
}

impl CohortKey {
    /// Extracts the cohort identity of a row without validating its scoring fields.
    #[must_use]
    pub fn of_row(row: &RawRow) -> Self {
        Self {
            source: row.source.clone(),
            hand_count: row
                .hand_count
                .as_ref()
                .and_then(|f| f.to_u32(Field::HandCount).ok()),
            solution_set_id: row.solution_set_id.as_ref().and_then(trimmed_id),
            difficulty: row
                .difficulty
                .as_ref()
                .and_then(|f| f.to_u32(Field::Difficulty).ok()),
        }
    }
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: Option<u32>) -> String {
            value.map_or_else(|| "?".to_owned(), |v| v.to_string())
        }
        write!(
            f,
            "{}/h{}/{}/d{}",
            self.source,
            opt(self.hand_count),
            self.solution_set_id.as_deref().unwrap_or("?"),
            opt(self.difficulty)
        )
    }
}

/// A validated simulated run. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub source: String,
    pub solution_set_id: String,
    pub hand_count: u32,
    pub difficulty: u32,
    /// Number of cards initially on the desk.
    pub desk_size: u32,
    pub outcome: Outcome,
    /// Combo count per drawn hand card; never empty.
    pub sequence: Vec<u32>,
}

impl RunRecord {
    #[must_use]
    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            source: self.source.clone(),
            hand_count: Some(self.hand_count),
            solution_set_id: Some(self.solution_set_id.clone()),
            difficulty: Some(self.difficulty),
        }
    }
}

/// Parses a comma-separated combo sequence.
///
/// Whitespace around tokens is ignored and empty tokens are skipped, so trailing
/// commas are harmless. At least one value is required.
///
/// ```
/// # use tripeaks_evaluator::record::{parse_sequence, ParseError};
/// assert_eq!(parse_sequence("2, 1,0,,3,"), Ok(vec![2, 1, 0, 3]));
/// assert_eq!(parse_sequence(" , "), Err(ParseError::EmptySequence));
/// ```
pub fn parse_sequence(text: &str) -> Result<Vec<u32>, ParseError> {
    let sequence = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            token
                .parse::<u32>()
                .map_err(|_| ParseError::InvalidSequenceToken {
                    position,
                    token: token.to_owned(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if sequence.is_empty() {
        return Err(ParseError::EmptySequence);
    }
    Ok(sequence)
}

/// The trimmed id text, `None` when blank.
fn trimmed_id(field: &RawField) -> Option<String> {
    let id = field.as_text();
    (!id.is_empty()).then(|| id.into_owned())
}

fn require(field: Field, value: Option<&RawField>) -> Result<&RawField, ParseError> {
    value.ok_or(ParseError::MissingField { field })
}

/// Validates a raw row into a [`RunRecord`].
pub fn parse_row(row: &RawRow) -> Result<RunRecord, ParseError> {
    let solution_set_id = row
        .solution_set_id
        .as_ref()
        .and_then(trimmed_id)
        .ok_or(ParseError::MissingField {
            field: Field::SolutionSetId,
        })?;
    let sequence = match require(Field::ComboSequence, row.combo_sequence.as_ref())? {
        RawField::Text(text) => parse_sequence(text)?,
        // a single-card run exported as a bare number
        number => vec![number.to_u32(Field::ComboSequence)?],
    };
    let desk_size = require(Field::DeskSize, row.desk_size.as_ref())?.to_u32(Field::DeskSize)?;
    let difficulty =
        require(Field::Difficulty, row.difficulty.as_ref())?.to_u32(Field::Difficulty)?;
    let hand_count = require(Field::HandCount, row.hand_count.as_ref())?.to_u32(Field::HandCount)?;
    let outcome = Outcome::parse(&require(Field::Outcome, row.outcome.as_ref())?.as_text())?;

    Ok(RunRecord {
        source: row.source.clone(),
        solution_set_id,
        hand_count,
        difficulty,
        desk_size,
        outcome,
        sequence,
    })
}
