use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::dataset::InjuryDataset;
pub use crate::error::ExportError;

pub mod csv;
pub mod json;
pub mod ml;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Write the full table in the requested format
pub fn export_dataset<P: AsRef<Path>>(
    dataset: &InjuryDataset,
    output_path: P,
    format: ExportFormat,
) -> Result<(), ExportError> {
    if dataset.is_empty() {
        return Err(ExportError::EmptyDataset);
    }

    let path = output_path.as_ref();
    match format {
        ExportFormat::Csv => csv::export_dataset_csv(dataset, path)?,
        ExportFormat::Json => json::export_json(dataset, path)?,
    }

    info!(
        player = %dataset.player,
        rows = dataset.len(),
        path = %path.display(),
        format = format.extension(),
        "Dataset exported"
    );
    Ok(())
}
