//! Error types for the mofa-pipeline library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MofaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Input file not found at '{}'", .0.display())]
    MissingInput(PathBuf),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value '{value}' at row {row}, column {col}")]
    InvalidValue {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Duplicate entry in view '{view}' for sample '{sample}', feature '{feature}'")]
    DuplicateCell {
        view: String,
        sample: String,
        feature: String,
    },

    #[error("Sample '{sample}' has conflicting {field}: '{first}' vs '{second}'")]
    ConflictingMetadata {
        sample: String,
        field: String,
        first: String,
        second: String,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: String, id: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MofaError>;
