//! Wire types for the six operations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::model::{ColumnTypeInfo, Table};

/// Table rows as JSON objects keyed by column name
pub fn records_json(table: &Table) -> Result<Vec<Value>> {
    table
        .records()
        .iter()
        .map(|record| {
            serde_json::to_value(record)
                .map_err(|e| TransformError::Internal(format!("failed to serialize row: {}", e)))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub preview_data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResponse {
    pub normalized_data: Vec<Value>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleNullsRequest {
    /// Rows as JSON objects
    pub csv_data: Vec<Value>,
    /// One of drop, mean, median, mode, zero, value
    pub strategy: String,
    /// Columns to process, in order; all columns when absent
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Literal used by the `value` strategy
    #[serde(default)]
    pub fill_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleNullsResponse {
    pub processed_data: Vec<Value>,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInferenceResponse {
    pub type_info: IndexMap<String, ColumnTypeInfo>,
    pub row_count: usize,
    pub column_count: usize,
    pub preview_data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvToSqlRequest {
    /// Rows as JSON objects
    pub csv_data: Vec<Value>,
    pub table_name: String,
    /// Rows per INSERT; one statement per row when <= 1
    #[serde(default)]
    pub batch_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvToSqlResponse {
    pub create_table_statement: String,
    pub insert_statements: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlSplitRequest {
    pub sql_content: String,
    /// Maximum lines per chunk
    #[serde(default)]
    pub max_chunk_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlSplitResponse {
    pub chunks: Vec<String>,
    pub chunk_count: usize,
    pub original_statement_count: usize,
}

/// Body of every failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
