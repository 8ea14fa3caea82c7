use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table is missing required column '{column}'")]
    SchemaMismatch { column: String },

    #[error("invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}
