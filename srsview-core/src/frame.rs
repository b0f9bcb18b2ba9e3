//! Tabular input normalization
//!
//! Host payloads arrive in one of two shapes: an ordered sequence of row
//! records, or a column-oriented mapping of column name to value sequence
//! (the reporting environment's data-frame export). The shape is resolved
//! once at this boundary into a uniform ordered row sequence; every
//! downstream component sees only rows.
//!
//! Pure and deterministic: output order equals the input's positional order.

use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::model::{RiskRow, SiteSummary};

/// Tagged input shape, resolved from a raw payload value
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Already row-oriented: ordered sequence of records
    Rows(Vec<Map<String, Value>>),
    /// Column-oriented: column name -> equal-length value sequences
    Columns(Map<String, Value>),
}

impl Frame {
    /// Classify a payload value into one of the two supported shapes.
    ///
    /// Fails with `RenderError::Format` when the value is neither an array
    /// of objects nor an object whose every value is an array.
    pub fn classify(value: &Value) -> Result<Frame, RenderError> {
        match value {
            Value::Array(items) => {
                let mut rows = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::Object(map) => rows.push(map.clone()),
                        other => {
                            return Err(RenderError::Format(format!(
                                "row {index} is {} rather than an object",
                                kind_name(other)
                            )))
                        }
                    }
                }
                Ok(Frame::Rows(rows))
            }
            Value::Object(columns) => {
                for (name, column) in columns {
                    if !column.is_array() {
                        return Err(RenderError::Format(format!(
                            "column {name:?} is {} rather than a value sequence",
                            kind_name(column)
                        )));
                    }
                }
                Ok(Frame::Columns(columns.clone()))
            }
            other => Err(RenderError::Format(format!(
                "expected rows or columns, got {}",
                kind_name(other)
            ))),
        }
    }

    /// Resolve the frame into a uniform ordered row sequence.
    ///
    /// For column-oriented input this is the column-to-row transposition;
    /// mismatched sequence lengths fail with `RenderError::Format`.
    pub fn into_rows(self) -> Result<Vec<Map<String, Value>>, RenderError> {
        match self {
            Frame::Rows(rows) => Ok(rows),
            Frame::Columns(columns) => transpose(&columns),
        }
    }
}

/// Normalize a payload value straight to rows (classify + resolve)
pub fn to_rows(value: &Value) -> Result<Vec<Map<String, Value>>, RenderError> {
    Frame::classify(value)?.into_rows()
}

fn column_values<'a>(name: &str, column: &'a Value) -> Result<&'a Vec<Value>, RenderError> {
    column.as_array().ok_or_else(|| {
        RenderError::Format(format!(
            "column {name:?} is {} rather than a value sequence",
            kind_name(column)
        ))
    })
}

fn transpose(columns: &Map<String, Value>) -> Result<Vec<Map<String, Value>>, RenderError> {
    let mut length: Option<usize> = None;
    for (name, column) in columns {
        let values = column_values(name, column)?;
        match length {
            None => length = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(RenderError::Format(format!(
                    "column {name:?} has {} values, expected {expected}",
                    values.len()
                )))
            }
            Some(_) => {}
        }
    }

    let length = length.unwrap_or(0);
    let mut rows = Vec::with_capacity(length);
    for index in 0..length {
        let mut row = Map::new();
        for (name, column) in columns {
            let values = column_values(name, column)?;
            row.insert(name.clone(), values[index].clone());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Decode rows into typed site summaries
pub fn summaries_from(value: &Value) -> Result<Vec<SiteSummary>, RenderError> {
    typed_rows(value)
}

/// Decode rows into typed study-level risk rows
pub fn risk_rows_from(value: &Value) -> Result<Vec<RiskRow>, RenderError> {
    typed_rows(value)
}

fn typed_rows<T: serde::de::DeserializeOwned>(value: &Value) -> Result<Vec<T>, RenderError> {
    to_rows(value)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(Value::Object(row))
                .map_err(|e| RenderError::Format(format!("row {index}: {e}")))
        })
        .collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_oriented_input_passes_through_in_order() {
        let value = json!([
            {"GroupID": "B", "NumStudies": 2},
            {"GroupID": "A", "NumStudies": 1}
        ]);
        let rows = to_rows(&value).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["GroupID"], json!("B"));
        assert_eq!(rows[1]["GroupID"], json!("A"));
    }

    #[test]
    fn column_oriented_input_transposes_to_n_rows() {
        let value = json!({
            "GroupID": ["S1", "S2", "S3"],
            "NumStudies": [1, 2, 3]
        });
        let rows = to_rows(&value).expect("transposed rows");
        assert_eq!(rows.len(), 3);
        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row["GroupID"], json!(format!("S{}", index + 1)));
            assert_eq!(row["NumStudies"], json!(index + 1));
        }
    }

    #[test]
    fn mismatched_column_lengths_fail_with_format_error() {
        let value = json!({
            "GroupID": ["S1", "S2"],
            "NumStudies": [1]
        });
        match to_rows(&value) {
            Err(RenderError::Format(detail)) => assert!(detail.contains("NumStudies")),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn scalar_input_is_neither_shape() {
        assert!(matches!(
            to_rows(&json!("not tabular")),
            Err(RenderError::Format(_))
        ));
        assert!(matches!(to_rows(&json!(42)), Err(RenderError::Format(_))));
    }

    #[test]
    fn array_of_scalars_is_rejected() {
        assert!(matches!(
            to_rows(&json!([1, 2, 3])),
            Err(RenderError::Format(_))
        ));
    }

    #[test]
    fn typed_decode_reports_offending_row() {
        let value = json!([
            {"GroupID": "S1", "StudyID": "A"},
            {"StudyID": "B"}
        ]);
        match risk_rows_from(&value) {
            Err(RenderError::Format(detail)) => assert!(detail.starts_with("row 1")),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn empty_columns_give_empty_rows() {
        let rows = to_rows(&json!({"GroupID": []})).expect("empty");
        assert!(rows.is_empty());
    }
}
