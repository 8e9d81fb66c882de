//! Column metadata and type information

use serde::{Deserialize, Serialize};

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header or record key)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
}

impl Column {
    /// Create a new column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Logical kind detected by type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Datetime,
    String,
}

impl ColumnKind {
    /// SQL column type used by the generator
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Float => "FLOAT",
            ColumnKind::Datetime => "DATETIME",
            ColumnKind::String => "TEXT",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Datetime => write!(f, "datetime"),
            ColumnKind::String => write!(f, "string"),
        }
    }
}

/// Per-column result of type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTypeInfo {
    pub detected: ColumnKind,
    pub null_count: usize,
}

impl ColumnTypeInfo {
    pub fn new(detected: ColumnKind, null_count: usize) -> Self {
        Self {
            detected,
            null_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_info_serializes_camel_case() {
        let info = ColumnTypeInfo::new(ColumnKind::Integer, 2);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json, serde_json::json!({"detected": "integer", "nullCount": 2}));
    }
}
