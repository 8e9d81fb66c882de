//! JSON row-record decoding

use std::borrow::Cow;

use indexmap::IndexSet;
use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::model::{CellValue, Column, Table};

/// Build a table from a list of row objects
///
/// Columns are the union of all object keys in first-seen order; keys
/// missing from an object become nulls.
pub fn table_from_records(records: &[Value]) -> Result<Table> {
    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<&str> = IndexSet::new();
    for (i, item) in records.iter().enumerate() {
        match item {
            Value::Object(obj) => {
                for key in obj.keys() {
                    column_names.insert(key.as_str());
                }
            }
            _ => {
                return Err(TransformError::invalid(format!(
                    "Row {} is not an object",
                    i + 1
                )))
            }
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(*name, i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, item) in records.iter().enumerate() {
        if let Value::Object(obj) = item {
            let cells = column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(*key)))
                .collect::<Result<Vec<_>>>()?;
            table.add_row(cells, line_num + 1);
        }
    }

    Ok(table)
}

/// Decode a JSON document holding an array of row objects (or one object)
pub fn parse_records(input: &[u8]) -> Result<Table> {
    let value: Value = serde_json::from_slice(input)?;

    // Handle both arrays and single objects
    match value {
        Value::Array(arr) => table_from_records(&arr),
        Value::Object(_) => table_from_records(std::slice::from_ref(&value)),
        _ => Err(TransformError::invalid(
            "JSON must be an array of row objects",
        )),
    }
}

/// Convert one JSON value into a cell
///
/// Strings are kept verbatim; nested arrays and objects become their JSON
/// text. Integers outside the `i64` range are rejected rather than rounded.
pub fn json_value_to_cell(value: Option<&Value>) -> Result<CellValue> {
    let cell = match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None if n.is_u64() => {
                return Err(TransformError::invalid(format!(
                    "Integer {} is out of range",
                    n
                )))
            }
            None => n.as_f64().map(CellValue::Float).ok_or_else(|| {
                TransformError::invalid(format!("Unsupported number {}", n))
            })?,
        },
        Some(Value::String(s)) => CellValue::String(Cow::Owned(s.clone())),
        Some(nested) => CellValue::String(Cow::Owned(nested.to_string())),
    };
    Ok(cell)
}
