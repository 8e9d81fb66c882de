//! CREATE TABLE and INSERT generation

use crate::infer::TypeInferrer;
use crate::model::{CellValue, Table};

/// Generated SQL for one table
#[derive(Debug, Clone, PartialEq)]
pub struct SqlScript {
    pub create_table: String,
    pub inserts: Vec<String>,
}

/// Generates a generic backtick-quoted SQL dialect
///
/// Identifiers are wrapped in backticks but not escaped, so a name that
/// itself contains a backtick produces invalid SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGenerator {
    inferrer: TypeInferrer,
}

impl SqlGenerator {
    pub fn new(inferrer: TypeInferrer) -> Self {
        Self { inferrer }
    }

    /// CREATE TABLE plus INSERTs of `batch_size` rows each (one per row when <= 1)
    pub fn generate(&self, table: &Table, table_name: &str, batch_size: i64) -> SqlScript {
        SqlScript {
            create_table: self.create_table(table, table_name),
            inserts: insert_statements(table, table_name, batch_size),
        }
    }

    /// CREATE TABLE statement with column types from type inference
    pub fn create_table(&self, table: &Table, table_name: &str) -> String {
        let columns: Vec<String> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let kind = self.inferrer.classify(table, i);
                format!("`{}` {}", col.name, kind.sql_type())
            })
            .collect();

        format!(
            "CREATE TABLE `{}` (\n  {}\n);",
            table_name,
            columns.join(",\n  ")
        )
    }
}

/// INSERT statements for every row, in row order
pub fn insert_statements(table: &Table, table_name: &str, batch_size: i64) -> Vec<String> {
    let column_list = table
        .columns
        .iter()
        .map(|c| format!("`{}`", c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let tuple = |cells: &[CellValue]| -> String {
        let values: Vec<String> = cells.iter().map(sql_literal).collect();
        format!("({})", values.join(", "))
    };

    if batch_size <= 1 {
        return table
            .rows
            .iter()
            .map(|row| {
                format!(
                    "INSERT INTO `{}` ({}) VALUES {};",
                    table_name,
                    column_list,
                    tuple(&row.cells)
                )
            })
            .collect();
    }

    table
        .rows
        .chunks(batch_size as usize)
        .map(|batch| {
            let tuples: Vec<String> = batch.iter().map(|row| tuple(&row.cells)).collect();
            format!(
                "INSERT INTO `{}` ({}) VALUES\n{};",
                table_name,
                column_list,
                tuples.join(",\n")
            )
        })
        .collect()
}

/// Render a cell as a SQL literal
///
/// An empty string renders as NULL, so it cannot be told apart from a
/// null in the generated SQL.
pub fn sql_literal(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "NULL".to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) if f.is_finite() => format!("{:?}", f),
        CellValue::Float(_) => "NULL".to_string(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::String(s) if s.is_empty() => "NULL".to_string(),
        other => format!("'{}'", other.display().replace('\'', "''")),
    }
}
