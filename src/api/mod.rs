//! Request/response contracts and the operation boundary
//!
//! Every operation takes decoded input, runs exactly one component, and
//! returns a serializable response or a [`TransformError`]. Panics inside a
//! component are caught here and reported as internal errors, so one bad
//! request never takes down its caller.

mod types;

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info};

use crate::config::{Config, IngestMode};
use crate::error::{Result, TransformError};
use crate::infer::{infer_types, TypeInferrer};
use crate::parser::{ingest_csv, json_value_to_cell, table_from_records};
use crate::sql::{split_sql, SqlGenerator};
use crate::transform::{handle_nulls, normalize, NullStrategy};

pub use types::{
    records_json, CsvToSqlRequest, CsvToSqlResponse, ErrorBody, HandleNullsRequest,
    HandleNullsResponse, InspectResponse, NormalizeResponse, SqlSplitRequest, SqlSplitResponse,
    TypeInferenceResponse,
};

/// Run an operation, converting a panic into an internal error
pub fn guarded<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected failure".to_string());
            error!(operation, %message, "operation panicked");
            Err(TransformError::Internal(message))
        }
    }
}

fn require_upload(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(TransformError::invalid("No file uploaded"));
    }
    Ok(())
}

/// Row/column counts, column names, and a preview of an uploaded CSV
pub fn inspect(bytes: &[u8], config: &Config) -> Result<InspectResponse> {
    guarded("inspect", || {
        require_upload(bytes)?;
        let ingested = ingest_csv(bytes, IngestMode::Typed)?;
        let table = &ingested.table;
        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "inspected CSV"
        );

        Ok(InspectResponse {
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns: table.column_names(),
            preview_data: records_json(&table.head(config.preview_rows))?,
            warning: ingested.warning(),
        })
    })
}

/// Min-max normalize the numeric columns of an uploaded CSV
pub fn normalize_csv(bytes: &[u8], _config: &Config) -> Result<NormalizeResponse> {
    guarded("normalize", || {
        require_upload(bytes)?;
        let ingested = ingest_csv(bytes, IngestMode::Typed)?;
        let normalized = normalize(&ingested.table);
        info!(rows = normalized.row_count, "normalized CSV");

        Ok(NormalizeResponse {
            normalized_data: records_json(&normalized.table)?,
            row_count: normalized.row_count,
            warning: ingested.warning(),
        })
    })
}

/// Fill or drop nulls in JSON row data
pub fn process_nulls(
    request: &HandleNullsRequest,
    _config: &Config,
) -> Result<HandleNullsResponse> {
    guarded("handle_nulls", || {
        let fill_value = request
            .fill_value
            .as_ref()
            .map(|v| json_value_to_cell(Some(v)))
            .transpose()?;
        let strategy = NullStrategy::parse(&request.strategy, fill_value)?;
        let table = table_from_records(&request.csv_data)?;

        let processed = handle_nulls(&table, &strategy, request.columns.as_deref());
        info!(
            strategy = strategy.name(),
            rows_before = table.row_count(),
            rows_after = processed.row_count(),
            "handled nulls"
        );

        Ok(HandleNullsResponse {
            processed_data: records_json(&processed)?,
            row_count: processed.row_count(),
        })
    })
}

/// Detect per-column types of an uploaded CSV read as text
pub fn determine_types(bytes: &[u8], config: &Config) -> Result<TypeInferenceResponse> {
    guarded("determine_types", || {
        require_upload(bytes)?;
        let ingested = ingest_csv(bytes, IngestMode::TextOnly)?;
        let table = &ingested.table;
        let type_info = infer_types(table, config);
        info!(columns = table.column_count(), "determined column types");

        Ok(TypeInferenceResponse {
            type_info,
            row_count: table.row_count(),
            column_count: table.column_count(),
            preview_data: records_json(&table.head(config.preview_rows))?,
            warning: ingested.warning(),
        })
    })
}

/// CREATE TABLE and INSERT statements for JSON row data
pub fn csv_to_sql(request: &CsvToSqlRequest, config: &Config) -> Result<CsvToSqlResponse> {
    guarded("csv_to_sql", || {
        if request.table_name.is_empty() {
            return Err(TransformError::invalid("tableName must not be empty"));
        }
        let table = table_from_records(&request.csv_data)?;
        let batch_size = request.batch_size.unwrap_or(config.default_batch_size);

        let script = SqlGenerator::new(TypeInferrer::from_config(config)).generate(
            &table,
            &request.table_name,
            batch_size,
        );
        info!(
            table = %request.table_name,
            rows = table.row_count(),
            statements = script.inserts.len(),
            "generated SQL"
        );

        Ok(CsvToSqlResponse {
            create_table_statement: script.create_table,
            insert_statements: script.inserts,
            row_count: table.row_count(),
            column_count: table.column_count(),
        })
    })
}

/// Split a SQL script into statement-aligned chunks
pub fn sql_splitter(request: &SqlSplitRequest, config: &Config) -> Result<SqlSplitResponse> {
    guarded("sql_splitter", || {
        let max_lines = request
            .max_chunk_size
            .unwrap_or(config.default_max_chunk_lines);
        let split = split_sql(&request.sql_content, max_lines);
        info!(
            statements = split.statement_count,
            chunks = split.chunks.len(),
            max_lines,
            "split SQL script"
        );

        Ok(SqlSplitResponse {
            chunk_count: split.chunks.len(),
            chunks: split.chunks,
            original_statement_count: split.statement_count,
        })
    })
}
