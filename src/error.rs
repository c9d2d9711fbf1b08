use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading a job file and finishing
/// the last command in its queue.
#[derive(Debug, Error)]
pub enum Error {
    #[error("job description violates schema at '{path}': {detail} (constraint {constraint})")]
    SchemaViolation {
        constraint: String,
        path: String,
        detail: String,
    },

    #[error("invalid job schema: {0}")]
    InvalidSchema(String),

    #[error("task '{0}' not found")]
    UnknownTask(String),

    #[error("input repository at '{0}' has no mapper")]
    MissingMapper(String),

    #[error("'{field}' is present but contains no files")]
    EmptyDataSet { field: &'static str },

    #[error("incomplete calibration metadata for '{pfn}': {detail}")]
    IncompleteCalibrationMetadata { pfn: String, detail: String },

    #[error("malformed calibration file name '{name}': expected 5 or 7 '-' separated tokens, got {tokens}")]
    MalformedCalibrationFilename { name: String, tokens: usize },

    #[error("template '{template}' references missing or unsupported metadata key '{key}'")]
    TemplateKey { template: String, key: String },

    #[error("task '{task}' failed: {detail}")]
    TaskExecutionFailure { task: String, detail: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
