//! Unified error hierarchy for WorkloadRS
//!
//! Configuration problems are the only failures the simulator itself can raise;
//! everything else comes from the export and config layers around it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all WorkloadRS operations
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Rejected simulator or application parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Config file errors
    #[error("Config file error: {0}")]
    Config(String),
}

/// Errors raised while writing a dataset out
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported output format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Nothing to export
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Writing to the target path failed
    #[error("Export failed to {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },
}

/// Result type alias for WorkloadRS operations
pub type Result<T> = std::result::Result<T, WorkloadError>;

impl WorkloadError {
    /// Shorthand for building an `InvalidConfiguration` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        WorkloadError::InvalidConfiguration(reason.into())
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WorkloadError::InvalidConfiguration(_) => ErrorSeverity::Error,
            WorkloadError::Config(_) => ErrorSeverity::Warning,
            WorkloadError::Export(ExportError::EmptyDataset) => ErrorSeverity::Warning,
            WorkloadError::Export(_) | WorkloadError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            WorkloadError::InvalidConfiguration(reason) => {
                format!("Cannot start the simulation: {}", reason)
            }
            WorkloadError::Export(ExportError::ExportFailed { path, .. }) => {
                format!("Could not write output to {}", path.display())
            }
            WorkloadError::Export(ExportError::UnsupportedFormat { format }) => {
                format!("Unknown export format '{}'. Use csv or json.", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
