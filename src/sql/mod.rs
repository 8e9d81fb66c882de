//! SQL generation and script splitting

mod chunker;
mod generator;

pub use chunker::{split_sql, split_statements, SqlSplit};
pub use generator::{insert_statements, sql_literal, SqlGenerator, SqlScript};
