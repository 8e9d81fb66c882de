//! CSV ingestion with a strict → skip-malformed → permissive fallback ladder

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::config::IngestMode;
use crate::error::{Result, TransformError};
use crate::model::{CellValue, Table};

/// Raw field values read as null in every ingest mode
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One rung of the parsing ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Comma delimiter, valid UTF-8, no over-long rows
    Strict,
    /// Comma delimiter, over-long and undecodable rows are skipped
    SkipMalformed,
    /// Sniffed delimiter, lossy decoding, over-long rows skipped
    Permissive,
}

impl ParseStrategy {
    /// Strategies in the order they are attempted
    pub const LADDER: [ParseStrategy; 3] = [
        ParseStrategy::Strict,
        ParseStrategy::SkipMalformed,
        ParseStrategy::Permissive,
    ];

    /// Whether rows may have been dropped under this strategy
    pub fn is_fallback(self) -> bool {
        self != ParseStrategy::Strict
    }

    fn read(self, input: &[u8]) -> Result<RawTable> {
        let (data, delimiter): (Cow<'_, [u8]>, u8) = match self {
            ParseStrategy::Permissive => {
                let text = String::from_utf8_lossy(input);
                let delimiter = detect_delimiter(&text);
                (Cow::Owned(text.into_owned().into_bytes()), delimiter)
            }
            _ => (Cow::Borrowed(input), b','),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(data.as_ref());

        let headers = reader.headers()?.clone();
        let width = headers.len();
        let headers = unique_headers(headers.iter());

        let mut records = Vec::new();
        let mut seen = 0usize;

        for (record_num, result) in reader.records().enumerate() {
            seen += 1;
            let line = record_num + 2; // +2 for 1-indexing and header

            let record = match result {
                Ok(record) => record,
                Err(e) if self == ParseStrategy::Strict => return Err(e.into()),
                Err(e) => {
                    debug!(line, error = %e, "skipping undecodable CSV record");
                    continue;
                }
            };

            if record.len() > width {
                let message = format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                );
                if self == ParseStrategy::Strict {
                    return Err(TransformError::Parse(message));
                }
                debug!(line, "skipping malformed CSV line: {}", message);
                continue;
            }

            let fields = record
                .iter()
                .map(|field| {
                    if NULL_MARKERS.contains(&field) {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            records.push((line, fields));
        }

        if seen > 0 && records.is_empty() {
            return Err(TransformError::Parse(format!(
                "all {} data lines were malformed",
                seen
            )));
        }

        Ok(RawTable { headers, records })
    }
}

/// Untyped parse result: headers plus optional raw field values
struct RawTable {
    headers: Vec<String>,
    records: Vec<(usize, Vec<Option<String>>)>,
}

impl RawTable {
    fn into_table(self, mode: IngestMode) -> Table {
        let width = self.headers.len();
        let kinds: Vec<FieldKind> = match mode {
            IngestMode::TextOnly => vec![FieldKind::Text; width],
            IngestMode::Typed => (0..width)
                .map(|i| {
                    infer_field_type(
                        self.records
                            .iter()
                            .filter_map(|(_, fields)| fields.get(i).and_then(|f| f.as_deref())),
                    )
                })
                .collect(),
        };

        let mut table = Table::with_column_names(self.headers);
        for (line, fields) in self.records {
            let cells = fields
                .into_iter()
                .zip(kinds.iter())
                .map(|(field, kind)| convert_field(field, *kind))
                .collect();
            table.add_row(cells, line);
        }

        table
    }
}

/// CSV ingestion result
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Parsed table
    pub table: Table,
    /// Strategy that produced the table
    pub strategy: ParseStrategy,
}

impl Ingested {
    /// Non-fatal warning when a fallback strategy was needed
    pub fn warning(&self) -> Option<String> {
        self.strategy.is_fallback().then(|| {
            "The CSV file contained malformed lines; some rows may have been skipped".to_string()
        })
    }
}

/// Parse raw CSV bytes into a table, walking the fallback ladder
pub fn ingest_csv(input: &[u8], mode: IngestMode) -> Result<Ingested> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(TransformError::invalid("Uploaded file is empty"));
    }

    let mut last_error = None;
    for strategy in ParseStrategy::LADDER {
        match strategy.read(input) {
            Ok(raw) => {
                if strategy.is_fallback() {
                    warn!(?strategy, "CSV parsed with fallback strategy");
                }
                return Ok(Ingested {
                    table: raw.into_table(mode),
                    strategy,
                });
            }
            Err(e) => {
                debug!(?strategy, error = %e, "CSV parse strategy failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| TransformError::Parse("no parse strategy available".to_string())))
}

/// Pick the delimiter with the most consistent field count over the first lines
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<_> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    if sample_lines.is_empty() {
        return best_delimiter;
    }

    for &delimiter in &candidates {
        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        // Score by consistency (low standard deviation) and frequency
        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

/// Name blank headers positionally and suffix repeated ones with `.1`, `.2`, ...
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, header) in headers.enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

/// Storage type chosen for one CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Narrowest kind every non-null raw value of a column parses as
fn infer_field_type<'a>(values: impl Iterator<Item = &'a str>) -> FieldKind {
    let values: Vec<&str> = values.collect();
    if values.is_empty() {
        return FieldKind::Text;
    }

    if values.iter().all(|v| v.trim().parse::<i64>().is_ok()) {
        FieldKind::Int
    } else if values.iter().all(|v| v.trim().parse::<f64>().is_ok()) {
        FieldKind::Float
    } else if values
        .iter()
        .all(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"))
    {
        FieldKind::Bool
    } else {
        FieldKind::Text
    }
}

fn convert_field(field: Option<String>, kind: FieldKind) -> CellValue {
    let Some(raw) = field else {
        return CellValue::Null;
    };

    let converted = match kind {
        FieldKind::Int => raw.trim().parse::<i64>().ok().map(CellValue::Int),
        FieldKind::Float => raw.trim().parse::<f64>().ok().map(CellValue::Float),
        FieldKind::Bool => Some(CellValue::Bool(raw.eq_ignore_ascii_case("true"))),
        FieldKind::Text => None,
    };

    converted.unwrap_or_else(|| CellValue::String(Cow::Owned(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_typed_ingest() {
        let csv = "id,name,score,active\n1,Alice,1.5,true\n2,Bob,,false\n";
        let ingested = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap();
        let table = &ingested.table;

        assert_eq!(ingested.strategy, ParseStrategy::Strict);
        assert!(ingested.warning().is_none());
        assert_eq!(table.column_names(), vec!["id", "name", "score", "active"]);
        assert_eq!(table.rows[0].cells[0], CellValue::Int(1));
        assert_eq!(table.rows[0].cells[1], CellValue::from("Alice"));
        assert_eq!(table.rows[0].cells[2], CellValue::Float(1.5));
        assert_eq!(table.rows[1].cells[2], CellValue::Null);
        assert_eq!(table.rows[1].cells[3], CellValue::Bool(false));
        assert_eq!(infer_field_type(["1", "2.5"].into_iter()), FieldKind::Float);
    }

    #[test]
    fn test_text_only_keeps_strings() {
        let csv = "a,b\n1,NA\n2.5,x\n";
        let table = ingest_csv(csv.as_bytes(), IngestMode::TextOnly).unwrap().table;
        assert_eq!(table.rows[0].cells[0], CellValue::from("1"));
        assert!(table.rows[0].cells[1].is_null());
        assert_eq!(table.rows[1].cells[0], CellValue::from("2.5"));
    }

    #[test]
    fn test_int_column_with_float_widens() {
        let csv = "v\n1\n2.5\n";
        let table = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap().table;
        assert_eq!(table.rows[0].cells[0], CellValue::Float(1.0));
        assert_eq!(table.rows[1].cells[0], CellValue::Float(2.5));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "a,b,c\n1,2\n";
        let ingested = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap();
        assert_eq!(ingested.strategy, ParseStrategy::Strict);
        assert!(ingested.table.rows[0].cells[2].is_null());
    }

    #[test]
    fn test_ragged_rows_fall_back_to_skipping() {
        let csv = "a,b\n1,2\n3,4,5\n6,7\n";
        let ingested = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap();
        assert_eq!(ingested.strategy, ParseStrategy::SkipMalformed);
        assert!(ingested.warning().is_some());
        assert_eq!(ingested.table.row_count(), 2);
        assert_eq!(ingested.table.rows[1].cells[0], CellValue::Int(6));
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let input = b"a,b\n1,2\n\xff\xfe,3\n";
        let ingested = ingest_csv(input, IngestMode::Typed).unwrap();
        assert_eq!(ingested.strategy, ParseStrategy::SkipMalformed);
        assert_eq!(ingested.table.row_count(), 1);
    }

    #[test]
    fn test_permissive_detects_delimiter() {
        let csv = "x;y\n1,5;2,5,9\n3,1;4,2,0\n";
        let ingested = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap();
        assert_eq!(ingested.strategy, ParseStrategy::Permissive);
        assert_eq!(ingested.table.column_names(), vec!["x", "y"]);
        assert_eq!(ingested.table.row_count(), 2);
        assert_eq!(ingested.table.rows[0].cells[0], CellValue::from("1,5"));
    }

    #[test]
    fn test_every_strategy_failing_is_parse_error() {
        let err = ingest_csv(b"a,b\n1,2,3\n4,5,6\n", IngestMode::Typed).unwrap_err();
        assert_eq!(
            err,
            TransformError::Parse("all 2 data lines were malformed".to_string())
        );
        assert_eq!(err.outcome().status_code(), 500);
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let err = ingest_csv(b"  \n", IngestMode::Typed).unwrap_err();
        assert!(matches!(err, TransformError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let csv = "a,a,,a\n1,2,3,4\n";
        let table = ingest_csv(csv.as_bytes(), IngestMode::Typed).unwrap().table;
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn test_bom_is_stripped() {
        let input = b"\xEF\xBB\xBFid\n1\n";
        let table = ingest_csv(input, IngestMode::Typed).unwrap().table;
        assert_eq!(table.column_names(), vec!["id"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(detect_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(detect_delimiter("a,b\n1,2\n"), b',');
    }
}
