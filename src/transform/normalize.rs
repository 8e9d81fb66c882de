//! Min-max normalization of numeric columns

use tracing::debug;

use crate::model::{CellValue, Table};

use super::numeric_column;

/// Result of normalizing a table
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: Table,
    pub row_count: usize,
}

/// Rescale every numeric column to [0, 1]
///
/// Constant columns and non-numeric columns are returned unchanged; nulls
/// stay null.
pub fn normalize(table: &Table) -> Normalized {
    let mut out = table.clone();

    for col_idx in 0..out.column_count() {
        let Some(values) = numeric_column(&out, col_idx) else {
            continue;
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > min) {
            debug!(column = %out.columns[col_idx].name, "constant column left unchanged");
            continue;
        }

        let range = max - min;
        for row in &mut out.rows {
            if let Some(cell) = row.cells.get_mut(col_idx) {
                if let Some(v) = cell.as_f64() {
                    *cell = CellValue::Float((v - min) / range);
                }
            }
        }
    }

    let row_count = out.row_count();
    Normalized {
        table: out,
        row_count,
    }
}
