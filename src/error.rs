//! Failure taxonomy for the conversion pipeline.
//!
//! Only run-fatal conditions surface here. Row-local conditions (unsupported
//! question kinds, failed media fetches) are handled inside the per-row
//! processing step and never become a `ConvertError`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input yielded no rows at all.
    #[error("input contained no rows")]
    EmptyInput,

    /// Every row was skipped or failed normalization, leaving nothing to package.
    #[error("no rows produced a question; check the input format")]
    NoAcceptedRows,

    /// The delimited-text tokenizer rejected the input.
    #[error("failed to parse input: {0}")]
    Csv(#[from] csv::Error),

    /// The archive writer failed.
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An XML document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Xml(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Reading input or writing output failed at the filesystem level.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An options file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ConfigRead {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },

    /// An options file could not be parsed.
    #[error("failed to parse {}: {source}", .path.display())]
    ConfigParse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
}
