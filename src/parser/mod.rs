//! Parser layer turning uploaded bytes into tables

mod csv;
mod json;

use crate::config::IngestMode;
use crate::error::Result;
use crate::model::Table;

pub use self::csv::{detect_delimiter, ingest_csv, Ingested, ParseStrategy, NULL_MARKERS};
pub use self::json::{json_value_to_cell, parse_records, table_from_records};

/// Input formats accepted for row data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

/// Detect the format of row data from its content
pub fn detect_format(input: &[u8]) -> InputFormat {
    let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
    match input.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') | Some(b'{') => InputFormat::Json,
        _ => InputFormat::Csv,
    }
}

/// Parse row data in whichever format it arrives in
///
/// CSV input goes through the fallback ladder; the returned warning is set
/// when a fallback strategy was needed.
pub fn parse_rows(input: &[u8]) -> Result<(Table, Option<String>)> {
    match detect_format(input) {
        InputFormat::Json => Ok((parse_records(input)?, None)),
        InputFormat::Csv => {
            let ingested = ingest_csv(input, IngestMode::Typed)?;
            let warning = ingested.warning();
            Ok((ingested.table, warning))
        }
    }
}
