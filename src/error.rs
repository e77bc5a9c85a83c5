use crate::artifact::Mode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid or missing fields: {}", .fields.join(", "))]
    SchemaValidation { fields: Vec<String> },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("column mismatch - expected: [{}], actual: [{}]", .expected.join(", "), .actual.join(", "))]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("no fitted artifact available for {mode} mode")]
    ArtifactUnavailable { mode: Mode },

    #[error("model contract violation: {detail}")]
    ModelContract { detail: String },

    #[error("result not found: {id}")]
    NotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable kind, used in failure payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::SchemaValidation { .. } => "schema_validation",
            Error::MalformedInput { .. } => "malformed_input",
            Error::ColumnMismatch { .. } => "column_mismatch",
            Error::ArtifactUnavailable { .. } => "artifact_unavailable",
            Error::ModelContract { .. } => "model_contract_violation",
            Error::NotFound { .. } => "not_found",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Csv(_) => "csv",
            Error::Config(_) => "config",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::SchemaValidation { .. } => 422,
            Error::MalformedInput { .. } => 400,
            Error::ColumnMismatch { .. } => 422,
            Error::ArtifactUnavailable { .. } => 503,
            Error::ModelContract { .. } => 500,
            Error::NotFound { .. } => 404,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Csv(_) => 500,
            Error::Config(_) => 500,
        }
    }
}
