// Schema-on-read loading of the three input tables.
//
// Each table is a JSON array of row objects. Required columns are checked
// row by row and a missing or mistyped column fails the whole load with the
// table, column and row named. Nothing is passed downstream as null.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use super::records::{ItemRecord, LevelParser, StandardRecord};
use crate::error::{AlignError, Result};

/// Load the standards table (`domain`, `standard_text`).
pub fn load_standards(path: &Path) -> Result<Vec<StandardRecord>> {
    let standards = parse_standards(&read_table(path)?)?;
    info!(rows = standards.len(), path = %path.display(), "Loaded standards");
    Ok(standards)
}

/// Load the supplementary stop-word table (`word`).
pub fn load_stopwords(path: &Path) -> Result<Vec<String>> {
    let words = parse_stopwords(&read_table(path)?)?;
    info!(rows = words.len(), path = %path.display(), "Loaded stop-word supplement");
    Ok(words)
}

/// Load the items table (`item_id`, `prompt`), parsing each id's level.
pub fn load_items(path: &Path, levels: &LevelParser) -> Result<Vec<ItemRecord>> {
    let items = parse_items(&read_table(path)?, levels)?;
    info!(rows = items.len(), path = %path.display(), "Loaded items");
    Ok(items)
}

pub fn parse_standards(json: &str) -> Result<Vec<StandardRecord>> {
    rows("standards", json)?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(StandardRecord {
                domain: string_column("standards", row, "domain", i)?,
                standard_text: string_column("standards", row, "standard_text", i)?,
            })
        })
        .collect()
}

pub fn parse_stopwords(json: &str) -> Result<Vec<String>> {
    rows("stopwords", json)?
        .iter()
        .enumerate()
        .map(|(i, row)| string_column("stopwords", row, "word", i))
        .collect()
}

pub fn parse_items(json: &str, levels: &LevelParser) -> Result<Vec<ItemRecord>> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (i, row) in rows("items", json)?.iter().enumerate() {
        // Ids may be spreadsheet integers; normalize them to strings.
        let item_id = match row.get("item_id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(missing("items", "item_id", i)),
        };
        if !seen.insert(item_id.clone()) {
            return Err(AlignError::Input(format!(
                "Duplicate item_id '{item_id}' at row {i}"
            )));
        }
        let level = levels.parse(&item_id)?;
        items.push(ItemRecord {
            prompt: string_column("items", row, "prompt", i)?,
            item_id,
            level,
        });
    }

    Ok(items)
}

fn read_table(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| AlignError::io(path.display().to_string(), e))
}

fn rows(table: &str, json: &str) -> Result<Vec<Map<String, Value>>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(rows) = value else {
        return Err(AlignError::Input(format!(
            "Table '{table}' must be a JSON array of row objects"
        )));
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(map) => Ok(map),
            _ => Err(AlignError::Input(format!(
                "Table '{table}' row {i} is not an object"
            ))),
        })
        .collect()
}

fn string_column(
    table: &str,
    row: &Map<String, Value>,
    column: &str,
    index: usize,
) -> Result<String> {
    match row.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(missing(table, column, index)),
    }
}

fn missing(table: &str, column: &str, row: usize) -> AlignError {
    AlignError::MissingColumn {
        table: table.to_string(),
        column: column.to_string(),
        row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::records::Level;

    #[test]
    fn test_parse_standards() {
        let json = r#"[
            {"domain": "PS", "standard_text": "Plan an investigation of forces."},
            {"domain": "LS", "standard_text": "Construct an explanation.", "extra": 1}
        ]"#;
        let standards = parse_standards(json).unwrap();
        assert_eq!(standards.len(), 2);
        assert_eq!(standards[0].domain, "PS");
        assert_eq!(standards[1].standard_text, "Construct an explanation.");
    }

    #[test]
    fn test_missing_column_is_named() {
        let json = r#"[{"domain": "PS", "text": "renamed column"}]"#;
        match parse_standards(json).unwrap_err() {
            AlignError::MissingColumn { table, column, row } => {
                assert_eq!(table, "standards");
                assert_eq!(column, "standard_text");
                assert_eq!(row, 0);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_null_column_rejected() {
        let json = r#"[{"word": null}]"#;
        assert!(matches!(
            parse_stopwords(json).unwrap_err(),
            AlignError::MissingColumn { .. }
        ));
    }

    #[test]
    fn test_items_with_numeric_and_string_ids() {
        let levels = LevelParser::new("[LMH]").unwrap();
        let json = r#"[
            {"item_id": "G8_H_01", "prompt": "Which force acts?"},
            {"item_id": "L2", "prompt": "Name the organ."}
        ]"#;
        let items = parse_items(json, &levels).unwrap();
        assert_eq!(items[0].level, Level::High);
        assert_eq!(items[1].item_id, "L2");
    }

    #[test]
    fn test_duplicate_item_id_rejected() {
        let levels = LevelParser::new("[LMH]").unwrap();
        let json = r#"[
            {"item_id": "M1", "prompt": "a"},
            {"item_id": "M1", "prompt": "b"}
        ]"#;
        assert!(matches!(
            parse_items(json, &levels).unwrap_err(),
            AlignError::Input(_)
        ));
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(matches!(
            parse_stopwords(r#"{"word": "x"}"#).unwrap_err(),
            AlignError::Input(_)
        ));
    }
}
