//! Column type inference
//!
//! Each column is classified by attempting a numeric coercion, then a
//! datetime coercion, accepting the first one that introduces fewer new
//! nulls than the configured fraction of the row count. With the default
//! 10% threshold a column that is 15% malformed numbers is a string column.

pub mod coerce;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::warn;

use crate::config::Config;
use crate::error::{Result, TransformError};
use crate::model::{CellValue, ColumnKind, ColumnTypeInfo, Table};

pub use coerce::{coerce_datetime, coerce_numeric, parse_datetime};

/// Classifies table columns as integer, float, datetime, or string
#[derive(Debug, Clone, Copy)]
pub struct TypeInferrer {
    threshold: f64,
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl TypeInferrer {
    /// Create an inferrer accepting coercions below `threshold` excess nulls
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.numeric_null_threshold)
    }

    /// Infer every column; a failing column degrades to string with 0 nulls
    pub fn infer(&self, table: &Table) -> IndexMap<String, ColumnTypeInfo> {
        let infos: Vec<ColumnTypeInfo> = (0..table.column_count())
            .into_par_iter()
            .map(|col_idx| {
                self.analyze_column(table, col_idx).unwrap_or_else(|e| {
                    warn!(error = %e, "column analysis failed, classifying as string");
                    ColumnTypeInfo::new(ColumnKind::String, 0)
                })
            })
            .collect();

        table
            .columns
            .iter()
            .zip(infos)
            .map(|(col, info)| (col.name.clone(), info))
            .collect()
    }

    /// Detected kind of one column, string when analysis fails
    pub fn classify(&self, table: &Table, col_idx: usize) -> ColumnKind {
        self.analyze_column(table, col_idx)
            .map(|info| info.detected)
            .unwrap_or(ColumnKind::String)
    }

    /// Analyze a single column
    pub fn analyze_column(&self, table: &Table, col_idx: usize) -> Result<ColumnTypeInfo> {
        let column = table.columns.get(col_idx).ok_or_else(|| {
            TransformError::Internal(format!("column index {} out of range", col_idx))
        })?;

        let cells: Vec<&CellValue> = table
            .rows
            .iter()
            .map(|row| {
                row.get(col_idx).ok_or_else(|| TransformError::ColumnAnalysis {
                    column: column.name.clone(),
                    reason: format!("row {} has no value for this column", row.source_line),
                })
            })
            .collect::<Result<_>>()?;

        let allowance = cells.len() as f64 * self.threshold;
        let pre_existing = cells.iter().filter(|c| c.is_null()).count();

        let numeric: Vec<Option<f64>> = cells.iter().map(|c| coerce_numeric(c)).collect();
        let numeric_failed = numeric.iter().filter(|v| v.is_none()).count();

        if (numeric_failed.saturating_sub(pre_existing) as f64) < allowance {
            let integral = numeric.iter().flatten().all(|v| v.fract() == 0.0);
            let kind = if integral {
                ColumnKind::Integer
            } else {
                ColumnKind::Float
            };
            return Ok(ColumnTypeInfo::new(kind, numeric_failed));
        }

        let datetime_failed = cells
            .iter()
            .filter(|c| coerce_datetime(c).is_none())
            .count();

        if (datetime_failed.saturating_sub(pre_existing) as f64) < allowance {
            Ok(ColumnTypeInfo::new(ColumnKind::Datetime, datetime_failed))
        } else {
            Ok(ColumnTypeInfo::new(ColumnKind::String, pre_existing))
        }
    }
}

/// Infer column types using the configured threshold
pub fn infer_types(table: &Table, config: &Config) -> IndexMap<String, ColumnTypeInfo> {
    TypeInferrer::from_config(config).infer(table)
}
