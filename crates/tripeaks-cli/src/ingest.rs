//! Source table ingestion.
//!
//! A source file is a JSON array of row objects, one per simulated run, as exported
//! from the run spreadsheet. Header names vary between exports, so columns are
//! resolved once per source against a list of accepted names; the rows are then
//! normalized into [`RawRow`]s for the scoring engine.
//!
//! Header matching ignores case, whitespace, `_` and `-`, and treats full-width
//! brackets like ASCII ones, so `全部连击(每张手牌的连击数)` and
//! `全部连击（每张手牌的连击数）` are the same column.

use std::{collections::BTreeSet, fmt};

use serde_json::{Map, Value};
use tripeaks_evaluator::record::{RawField, RawRow};

pub type SourceTable = Vec<Map<String, Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    SolutionSetId,
    HandCount,
    Difficulty,
    ComboSequence,
    DeskSize,
    Outcome,
}

const COLUMN_COUNT: usize = 6;

impl Column {
    const ALL: [Column; COLUMN_COUNT] = [
        Column::SolutionSetId,
        Column::HandCount,
        Column::Difficulty,
        Column::ComboSequence,
        Column::DeskSize,
        Column::Outcome,
    ];

    fn accepted_names(self) -> &'static [&'static str] {
        match self {
            Column::SolutionSetId => &["solution_set_id", "solution_set", "solution_id", "解集id", "解集"],
            Column::HandCount => &["hand_count", "hand_cards", "hands", "手牌数", "手牌数量"],
            Column::Difficulty => &["difficulty", "难度"],
            Column::ComboSequence => &[
                "combo_sequence",
                "combos",
                "sequence",
                "全部连击（每张手牌的连击数）",
                "全部连击",
            ],
            Column::DeskSize => &["desk_size", "initial_desk_cards", "desk_cards", "初始桌面牌"],
            Column::Outcome => &["outcome", "result", "actual_result", "实际结果"],
        }
    }

    fn matches(self, header: &str) -> bool {
        let header = normalize_header(header);
        self.accepted_names()
            .iter()
            .any(|name| normalize_header(name) == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.accepted_names()[0])
    }
}

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| match c {
            '（' => '(',
            '）' => ')',
            c => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// A source table lacks a column the engine cannot work without.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("source `{source_name}` has no `{column}` column (accepted names: {accepted})")]
pub struct SourceSchemaError {
    source_name: String,
    column: String,
    accepted: String,
}

impl SourceSchemaError {
    fn new(source_name: &str, column: Column) -> Self {
        Self {
            source_name: source_name.to_owned(),
            column: column.to_string(),
            accepted: column.accepted_names().join(", "),
        }
    }
}

/// Header of each column in one source table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    headers: [Option<String>; COLUMN_COUNT],
}

impl ColumnMap {
    fn resolve(table: &SourceTable) -> Self {
        let headers = table
            .iter()
            .flat_map(|row| row.keys())
            .collect::<BTreeSet<_>>();
        Self {
            headers: Column::ALL.map(|column| {
                headers
                    .iter()
                    .find(|header| column.matches(header))
                    .map(|header| (*header).clone())
            }),
        }
    }

    fn header(&self, column: Column) -> Option<&str> {
        self.headers[column as usize].as_deref()
    }

    fn field(&self, row: &Map<String, Value>, column: Column) -> Option<RawField> {
        self.header(column)
            .and_then(|header| row.get(header))
            .and_then(raw_field)
    }
}

fn raw_field(value: &Value) -> Option<RawField> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(RawField::Text(flag.to_string())),
        Value::Number(number) => Some(match number.as_i64() {
            Some(n) => RawField::Integer(n),
            None => RawField::Float(number.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(RawField::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => Some(RawField::Text(value.to_string())),
    }
}

/// Normalizes the rows of one source.
///
/// `default_hand_count` is used when the table has no hand-count column; without it
/// such a table is rejected. Every other column is required. Individual cells may
/// still be missing or malformed: those rows become parse failures downstream.
pub fn read_rows(
    source_name: &str,
    table: &SourceTable,
    default_hand_count: Option<u32>,
) -> Result<Vec<RawRow>, SourceSchemaError> {
    let columns = ColumnMap::resolve(table);
    for column in Column::ALL {
        if columns.header(column).is_some() {
            continue;
        }
        if column == Column::HandCount
            && let Some(hand_count) = default_hand_count
        {
            log::info!("{source_name}: no hand-count column, using {hand_count}");
            continue;
        }
        return Err(SourceSchemaError::new(source_name, column));
    }

    let rows = table
        .iter()
        .map(|row| RawRow {
            source: source_name.to_owned(),
            solution_set_id: columns.field(row, Column::SolutionSetId),
            hand_count: match columns.header(Column::HandCount) {
                Some(_) => columns.field(row, Column::HandCount),
                None => default_hand_count.map(|n| RawField::Integer(i64::from(n))),
            },
            difficulty: columns.field(row, Column::Difficulty),
            combo_sequence: columns.field(row, Column::ComboSequence),
            desk_size: columns.field(row, Column::DeskSize),
            outcome: columns.field(row, Column::Outcome),
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(value: Value) -> SourceTable {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_chinese_headers() {
        let table = table(json!([
            {
                "解集ID": "S-7",
                "手牌数": 24,
                "全部连击(每张手牌的连击数)": "2,1,1,0,0,0,0,2,1,3",
                "初始桌面牌": 28.0,
                "难度": 20,
                "实际结果": "失败"
            }
        ]));
        let rows = read_rows("gen", &table, None).unwrap();
        assert_eq!(
            rows,
            vec![RawRow {
                source: "gen".into(),
                solution_set_id: Some("S-7".into()),
                hand_count: Some(RawField::Integer(24)),
                difficulty: Some(RawField::Integer(20)),
                combo_sequence: Some("2,1,1,0,0,0,0,2,1,3".into()),
                desk_size: Some(RawField::Float(28.0)),
                outcome: Some("失败".into()),
            }]
        );
    }

    #[test]
    fn test_header_normalization() {
        assert_eq!(normalize_header(" Desk-Size "), "desksize");
        assert_eq!(
            normalize_header("全部连击（每张手牌的连击数）"),
            normalize_header("全部连击 (每张手牌的连击数)")
        );
        assert!(Column::ComboSequence.matches("Combo Sequence"));
        assert!(!Column::ComboSequence.matches("combo"));
    }

    #[test]
    fn test_missing_column_is_a_schema_error() {
        let table = table(json!([
            { "solution_set_id": "S1", "hand_count": 24, "combos": "1,2", "difficulty": 20, "outcome": "win" }
        ]));
        let err = read_rows("gen", &table, None).unwrap_err();
        assert_eq!(err.column, "desk_size");
        assert!(err.to_string().contains("初始桌面牌"));
    }

    #[test]
    fn test_default_hand_count() {
        let table = table(json!([
            { "solution_set_id": 12, "sequence": 4, "desk_size": 28, "difficulty": 20, "outcome": true }
        ]));
        assert!(read_rows("gen", &table, None).is_err());

        let rows = read_rows("gen", &table, Some(30)).unwrap();
        assert_eq!(rows[0].hand_count, Some(RawField::Integer(30)));
        assert_eq!(rows[0].solution_set_id, Some(RawField::Integer(12)));
        assert_eq!(rows[0].combo_sequence, Some(RawField::Integer(4)));
        assert_eq!(rows[0].outcome, Some("true".into()));
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let table = table(json!([
            { "solution_set_id": "S1", "hand_count": 24, "combos": "  ", "desk_size": null, "difficulty": 20, "outcome": "win" },
            { "solution_set_id": "S1", "hand_count": 24, "difficulty": 20, "outcome": "win" }
        ]));
        let rows = read_rows("gen", &table, None).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.combo_sequence, None);
            assert_eq!(row.desk_size, None);
        }
    }
}
