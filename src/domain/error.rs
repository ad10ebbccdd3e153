use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of a single CSV import run. Any of these aborts the run and
/// leaves the destination table as it was before the run started.
#[derive(Debug)]
pub enum ImportError {
    SourceNotFound(PathBuf),
    EmptyHeader,
    SourceUnreadable(String),
    StorageFailure(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::SourceNotFound(path) => write!(f, "CSV not found: {}", path.display()),
            ImportError::EmptyHeader => write!(f, "CSV has no header row."),
            ImportError::SourceUnreadable(msg) => write!(f, "Failed to read CSV: {}", msg),
            ImportError::StorageFailure(msg) => {
                write!(f, "SQLite error while importing: {}", msg)
            }
        }
    }
}

impl std::error::Error for ImportError {}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        ImportError::StorageFailure(err.to_string())
    }
}

/// Outcomes of a county lookup that are not a list of rows.
///
/// The `Display` text is exactly what callers see in the `error` field, so
/// `Storage` deliberately drops its detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    InvalidBody,
    MissingField,
    InvalidZip,
    UnknownMeasure,
    StorageUnavailable,
    NotFound,
    Storage(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InvalidBody => write!(f, "JSON body required"),
            LookupError::MissingField => write!(f, "Both zip and measure_name are required"),
            LookupError::InvalidZip => write!(f, "zip must be a 5-digit string"),
            LookupError::UnknownMeasure | LookupError::NotFound => write!(f, "Not found"),
            LookupError::StorageUnavailable => write!(f, "Database not found"),
            LookupError::Storage(_) => write!(f, "Database error"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<sqlx::Error> for LookupError {
    fn from(err: sqlx::Error) -> Self {
        LookupError::Storage(err.to_string())
    }
}
