//! Data model for tabular data representation

mod schema;
mod table;

pub use schema::{Column, ColumnKind, ColumnTypeInfo};
pub use table::{CellValue, Row, Table};
