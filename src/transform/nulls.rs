//! Null-value imputation and removal

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::model::{CellValue, Table};

use super::numeric_column;

/// How nulls in a selected column are handled
#[derive(Debug, Clone, PartialEq)]
pub enum NullStrategy {
    /// Remove rows null in the column
    Drop,
    /// Fill with the mean of a numeric column
    Mean,
    /// Fill with the median of a numeric column
    Median,
    /// Fill with the most frequent value
    Mode,
    /// Fill with 0
    Zero,
    /// Fill with a caller-supplied literal
    Value(CellValue),
}

impl NullStrategy {
    /// Parse a strategy name; `value` requires a fill value
    pub fn parse(name: &str, fill_value: Option<CellValue>) -> Result<Self> {
        match name {
            "drop" => Ok(NullStrategy::Drop),
            "mean" => Ok(NullStrategy::Mean),
            "median" => Ok(NullStrategy::Median),
            "mode" => Ok(NullStrategy::Mode),
            "zero" => Ok(NullStrategy::Zero),
            "value" => fill_value.map(NullStrategy::Value).ok_or_else(|| {
                TransformError::invalid("Strategy 'value' requires a fill value")
            }),
            other => Err(TransformError::invalid(format!(
                "Unknown null handling strategy: {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NullStrategy::Drop => "drop",
            NullStrategy::Mean => "mean",
            NullStrategy::Median => "median",
            NullStrategy::Mode => "mode",
            NullStrategy::Zero => "zero",
            NullStrategy::Value(_) => "value",
        }
    }
}

/// Apply `strategy` to each selected column in order
///
/// `columns` defaults to every column; unknown names are skipped. Under
/// `drop` each column sees the rows left by the previous one, so the
/// column order can change the final row count.
pub fn handle_nulls(table: &Table, strategy: &NullStrategy, columns: Option<&[String]>) -> Table {
    let mut out = table.clone();
    let selected = match columns {
        Some(names) => names.to_vec(),
        None => table.column_names(),
    };

    for name in &selected {
        let Some(col_idx) = out.column_index(name) else {
            debug!(column = %name, "skipping unknown column");
            continue;
        };

        match strategy {
            NullStrategy::Drop => {
                out.rows
                    .retain(|row| row.get(col_idx).map_or(false, |cell| !cell.is_null()));
            }
            NullStrategy::Mean => {
                if let Some(values) = numeric_column(&out, col_idx) {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    fill_column(&mut out, col_idx, &CellValue::Float(mean));
                }
            }
            NullStrategy::Median => {
                if let Some(values) = numeric_column(&out, col_idx) {
                    fill_column(&mut out, col_idx, &CellValue::Float(median(values)));
                }
            }
            NullStrategy::Mode => {
                if let Some(mode) = mode(&out, col_idx) {
                    fill_column(&mut out, col_idx, &mode);
                }
            }
            NullStrategy::Zero => fill_column(&mut out, col_idx, &CellValue::Int(0)),
            NullStrategy::Value(fill) => fill_column(&mut out, col_idx, fill),
        }
    }

    out
}

fn fill_column(table: &mut Table, col_idx: usize, fill: &CellValue) {
    for row in &mut table.rows {
        if let Some(cell) = row.cells.get_mut(col_idx) {
            if cell.is_null() {
                *cell = fill.clone();
            }
        }
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Most frequent non-null value; ties go to the smallest value
fn mode(table: &Table, col_idx: usize) -> Option<CellValue> {
    let mut counts: FxHashMap<&CellValue, usize> = FxHashMap::default();
    for cell in table.column_cells(col_idx).flatten() {
        if !cell.is_null() {
            *counts.entry(cell).or_insert(0) += 1;
        }
    }

    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .filter(|(_, count)| *count == best)
        .map(|(cell, _)| cell)
        .min_by(|a, b| a.sort_cmp(b))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        let mut table = Table::with_column_names(columns.iter().copied());
        for (i, cells) in rows.into_iter().enumerate() {
            table.add_row(cells, i + 1);
        }
        table
    }

    fn column(table: &Table, idx: usize) -> Vec<CellValue> {
        table.rows.iter().map(|r| r.cells[idx].clone()).collect()
    }

    fn one_column(values: Vec<CellValue>) -> Table {
        table(&["v"], values.into_iter().map(|v| vec![v]).collect())
    }

    #[test]
    fn test_zero_fill() {
        let input = one_column(vec![CellValue::Int(1), CellValue::Null, CellValue::Int(3)]);
        let out = handle_nulls(&input, &NullStrategy::Zero, None);
        assert_eq!(
            column(&out, 0),
            vec![CellValue::Int(1), CellValue::Int(0), CellValue::Int(3)]
        );
    }

    #[test]
    fn test_zero_fill_ignores_column_type() {
        let input = one_column(vec![CellValue::from("a"), CellValue::Null]);
        let out = handle_nulls(&input, &NullStrategy::Zero, None);
        assert_eq!(column(&out, 0)[1], CellValue::Int(0));
    }

    #[test]
    fn test_drop_is_sequential_union() {
        let input = table(
            &["a", "b"],
            vec![
                vec![CellValue::Int(1), CellValue::Int(1)],
                vec![CellValue::Null, CellValue::Int(2)],
                vec![CellValue::Int(3), CellValue::Null],
                vec![CellValue::Int(4), CellValue::Int(4)],
            ],
        );
        let cols = vec!["a".to_string(), "b".to_string()];
        let out = handle_nulls(&input, &NullStrategy::Drop, Some(cols.as_slice()));
        assert_eq!(out.row_count(), 2);
        assert_eq!(column(&out, 0), vec![CellValue::Int(1), CellValue::Int(4)]);
    }

    #[test]
    fn test_drop_only_selected_columns() {
        let input = table(
            &["a", "b"],
            vec![
                vec![CellValue::Int(1), CellValue::Null],
                vec![CellValue::Null, CellValue::Int(2)],
            ],
        );
        let cols = vec!["b".to_string(), "missing".to_string()];
        let out = handle_nulls(&input, &NullStrategy::Drop, Some(cols.as_slice()));
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].cells[1], CellValue::Int(2));
    }

    #[test]
    fn test_mean_and_median() {
        let input = one_column(vec![
            CellValue::Int(1),
            CellValue::Null,
            CellValue::Int(2),
            CellValue::Int(9),
        ]);
        let mean = handle_nulls(&input, &NullStrategy::Mean, None);
        assert_eq!(column(&mean, 0)[1], CellValue::Float(4.0));

        let median = handle_nulls(&input, &NullStrategy::Median, None);
        assert_eq!(column(&median, 0)[1], CellValue::Float(2.0));
    }

    #[test]
    fn test_even_median() {
        let input = one_column(vec![
            CellValue::Int(1),
            CellValue::Int(4),
            CellValue::Null,
            CellValue::Int(2),
            CellValue::Int(3),
        ]);
        let out = handle_nulls(&input, &NullStrategy::Median, None);
        assert_eq!(column(&out, 0)[2], CellValue::Float(2.5));
    }

    #[test]
    fn test_mean_skips_non_numeric() {
        let input = one_column(vec![CellValue::from("a"), CellValue::Null]);
        let out = handle_nulls(&input, &NullStrategy::Mean, None);
        assert!(column(&out, 0)[1].is_null());
    }

    #[test]
    fn test_mode_with_tie_picks_smallest() {
        let input = one_column(vec![
            CellValue::from("b"),
            CellValue::from("a"),
            CellValue::Null,
            CellValue::from("b"),
            CellValue::from("a"),
        ]);
        let out = handle_nulls(&input, &NullStrategy::Mode, None);
        assert_eq!(column(&out, 0)[2], CellValue::from("a"));
    }

    #[test]
    fn test_mode_of_all_null_column_is_noop() {
        let input = one_column(vec![CellValue::Null, CellValue::Null]);
        let out = handle_nulls(&input, &NullStrategy::Mode, None);
        assert_eq!(out, input);
    }

    #[test]
    fn test_value_fill() {
        let input = one_column(vec![CellValue::Null, CellValue::from("x")]);
        let strategy = NullStrategy::parse("value", Some(CellValue::from("n/a"))).unwrap();
        let out = handle_nulls(&input, &strategy, None);
        assert_eq!(column(&out, 0)[0], CellValue::from("n/a"));
    }

    #[test]
    fn test_parse_strategy_errors() {
        assert!(matches!(
            NullStrategy::parse("interpolate", None),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(
            NullStrategy::parse("value", None),
            Err(TransformError::InvalidInput(_))
        ));
        assert_eq!(NullStrategy::parse("mode", None).unwrap(), NullStrategy::Mode);
    }
}
