// nc_loader/src/error.rs
// Defines the error taxonomy for a loader run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error,)]
pub enum LoaderError {
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String,),
    #[error("Unknown collection '{name}': no source file is registered under that name")]
    UnknownCollection { name: String, },
    #[error("Source file '{}' is unavailable: {source}", .path.display())]
    SourceUnavailable {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Source file '{}' has an empty or malformed header: {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String, },
    #[error("Projection references fields missing from the header: {}", .missing.join(", "))]
    FieldNotFound { missing: Vec<String,>, },
    #[error("Row {row} has {actual} fields, expected {expected}")]
    RowShape {
        row:      u64,
        expected: usize,
        actual:   usize,
    },
    #[error("Failed to read row {row} of '{}': {message}", .path.display())]
    SourceRead {
        path:    PathBuf,
        row:     u64,
        message: String,
    },
    #[error(
        "Bulk insert into '{collection}' failed ({failed} of {attempted} documents rejected): {cause}"
    )]
    WriteError {
        collection: String,
        attempted:  usize,
        failed:     usize,
        cause:      String,
    },
    #[error("Failed to clear collection '{collection}': {cause}")]
    ClearError {
        collection: String,
        cause:      String,
    },
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String,),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error,),
    #[error("Other error: {0}")]
    Other(String,),
}

impl LoaderError {
    pub fn is_transient(&self,) -> bool {
        match self {
            LoaderError::ConnectionError(msg,) => {
                let m = msg.to_lowercase();
                !m.contains("authentication",) && !m.contains("invalid",)
            },
            _ => false,
        }
    }

    /// Short name of the failing stage, used in logs and the run report.
    pub fn stage(&self,) -> &'static str {
        match self {
            LoaderError::ConfigurationError(_,) => "configuration",
            LoaderError::UnknownCollection { .. } => "target",
            LoaderError::SourceUnavailable { .. } | LoaderError::MalformedHeader { .. } => "header",
            LoaderError::FieldNotFound { .. } => "projection",
            LoaderError::RowShape { .. } | LoaderError::SourceRead { .. } => "streaming",
            LoaderError::ClearError { .. } => "clear",
            LoaderError::WriteError { .. } => "write",
            LoaderError::ConnectionError(_,) => "connection",
            LoaderError::IoError(_,) | LoaderError::Other(_,) => "other",
        }
    }
}

pub type Result<T,> = std::result::Result<T, LoaderError,>;
