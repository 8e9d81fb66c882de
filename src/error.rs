//! Error taxonomy for transformation operations

use thiserror::Error;

/// Errors produced by the transformation components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Missing or empty upload, missing field, unknown strategy
    #[error("{0}")]
    InvalidInput(String),

    /// CSV could not be parsed by any strategy of the fallback ladder
    #[error("failed to parse CSV: {0}")]
    Parse(String),

    /// Analysis of a single column failed during type inference
    #[error("failed to analyze column '{column}': {reason}")]
    ColumnAnalysis { column: String, reason: String },

    /// Anything unexpected
    #[error("{0}")]
    Internal(String),
}

/// Observable result class of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ClientError,
    ServerError,
}

impl Outcome {
    /// HTTP status code for this outcome
    pub fn status_code(self) -> u16 {
        match self {
            Outcome::ClientError => 400,
            Outcome::ServerError => 500,
        }
    }
}

impl TransformError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid(msg: impl Into<String>) -> Self {
        TransformError::InvalidInput(msg.into())
    }

    /// Map the error kind to the outcome the caller observes
    pub fn outcome(&self) -> Outcome {
        match self {
            TransformError::InvalidInput(_) => Outcome::ClientError,
            TransformError::Parse(_)
            | TransformError::ColumnAnalysis { .. }
            | TransformError::Internal(_) => Outcome::ServerError,
        }
    }
}

impl From<csv::Error> for TransformError {
    fn from(err: csv::Error) -> Self {
        TransformError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::InvalidInput(format!("Invalid JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            TransformError::invalid("No file part").outcome(),
            Outcome::ClientError
        );
        assert_eq!(
            TransformError::Parse("bad".into()).outcome().status_code(),
            500
        );
        assert_eq!(
            TransformError::Internal("boom".into()).outcome(),
            Outcome::ServerError
        );
    }

    #[test]
    fn test_messages() {
        let err = TransformError::ColumnAnalysis {
            column: "age".into(),
            reason: "row 3 has no value".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to analyze column 'age': row 3 has no value"
        );
        assert_eq!(
            TransformError::Parse("found record with 3 fields".into()).to_string(),
            "failed to parse CSV: found record with 3 fields"
        );
    }
}
