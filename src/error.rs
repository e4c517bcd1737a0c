// Error types for the alignment pipeline.
//
// Every failure aborts the run. Empty documents and zero-overlap items are
// not errors and never show up here.

use thiserror::Error;

/// Unified error type for the alignment library.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Filesystem error while reading inputs or writing artifacts
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input table (wrong shape, duplicate ids, unparseable level)
    #[error("Input error: {0}")]
    Input(String),

    /// A required column is absent or has the wrong type
    #[error("Input error: table '{table}' row {row} is missing required column '{column}'")]
    MissingColumn {
        table: String,
        column: String,
        row: usize,
    },

    /// Setup error: bad K, empty vocabulary, bad environment value, bad labels
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;

impl AlignError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AlignError::Io {
            path: path.into(),
            source,
        }
    }
}
