//! Table transformations

mod normalize;
mod nulls;

use crate::model::Table;

pub use normalize::{normalize, Normalized};
pub use nulls::{handle_nulls, NullStrategy};

/// Non-null values of a column whose every non-null cell is a number
///
/// Returns `None` for columns with no values or any non-numeric value.
pub(crate) fn numeric_column(table: &Table, col_idx: usize) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for cell in table.column_cells(col_idx).flatten() {
        if cell.is_null() {
            continue;
        }
        values.push(cell.as_f64()?);
    }

    (!values.is_empty()).then_some(values)
}
