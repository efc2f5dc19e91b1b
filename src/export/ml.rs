//! Machine Learning Export Module
//!
//! Writes the classifier-facing columns only: the seven features, the label
//! and the chronological split each row belongs to.

use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::ExportError;
use crate::dataset::InjuryDataset;
use crate::features::{feature_vector, SplitConfig, FEATURE_COLUMNS, LABEL_COLUMN};

/// ML-optimized CSV exporter
pub struct MlCsvExporter {
    split_config: SplitConfig,
}

impl MlCsvExporter {
    /// Exporter with the default 70/30 chronological split
    pub fn new() -> Self {
        Self::with_split(SplitConfig::default())
    }

    pub fn with_split(split_config: SplitConfig) -> Self {
        Self { split_config }
    }

    /// Write features, label and split to any writer
    pub fn write_features<W: Write>(
        &self,
        dataset: &InjuryDataset,
        writer: W,
    ) -> Result<(), ExportError> {
        if dataset.is_empty() {
            return Err(ExportError::EmptyDataset);
        }

        let mut writer = Writer::from_writer(writer);

        let mut header: Vec<&str> = vec!["Date"];
        header.extend(FEATURE_COLUMNS);
        header.push(LABEL_COLUMN);
        header.push("split");
        writer.write_record(&header)?;

        let total = dataset.len();
        for (idx, row) in dataset.rows.iter().enumerate() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            record.push(row.date.to_string());
            record.extend(feature_vector(row).iter().map(|v| format_feature(*v)));
            record.push(u8::from(row.injury).to_string());
            record.push(
                self.split_config
                    .determine_split(idx, total)
                    .as_str()
                    .to_string(),
            );
            writer.write_record(&record)?;
        }

        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Export features to an ML-ready CSV file
    pub fn export_with_features<P: AsRef<Path>>(
        &self,
        dataset: &InjuryDataset,
        output_path: P,
    ) -> Result<(), ExportError> {
        let path = output_path.as_ref();
        let file = File::create(path).map_err(|e| ExportError::ExportFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.write_features(dataset, file)
    }
}

impl Default for MlCsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest text that parses back to the same value; whole numbers print
/// without a fraction
fn format_feature(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkloadRow;
    use chrono::{Days, NaiveDate};

    fn dataset(days: u64) -> InjuryDataset {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let rows = (0..days)
            .map(|i| WorkloadRow {
                player: "Alex".to_string(),
                date: start + Days::new(i),
                practice_hours: 2,
                gym_hours: 0,
                match_hours: 0,
                intensity: 6,
                workload: 12,
                fatigue: 1.2,
                acute: 12.0,
                chronic: 12.0,
                acwr: 0.9999999,
                high_intensity_streak: 0,
                injury: i == days - 1,
            })
            .collect();
        InjuryDataset::new("Alex".to_string(), 35, 0.0, rows)
    }

    #[test]
    fn test_format_feature() {
        assert_eq!(format_feature(12.0), "12");
        assert_eq!(format_feature(1.25), "1.25");
        assert_eq!(format_feature(0.999999958), "0.999999958");
    }

    #[test]
    fn test_features_reparse_exactly() {
        let data = dataset(5);
        let mut buffer = Vec::new();
        MlCsvExporter::new().write_features(&data, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        for (line, row) in text.lines().skip(1).zip(&data.rows) {
            let fields: Vec<&str> = line.split(',').collect();
            let parsed: Vec<f64> = fields[1..=FEATURE_COLUMNS.len()]
                .iter()
                .map(|f| f.parse().unwrap())
                .collect();
            assert_eq!(parsed, feature_vector(row).to_vec());
        }
    }

    #[test]
    fn test_ml_export_layout() {
        let exporter = MlCsvExporter::new();
        let mut buffer = Vec::new();
        exporter.write_features(&dataset(10), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Date,Acute,Chronic,ACWR,Intensity,Workload,HighIntensityStreak,Fatigue,Injury,split"
        );
        assert_eq!(lines.len(), 11);
        assert!(lines[1].ends_with(",0,train"));
        assert!(lines[7].ends_with(",0,train"));
        assert!(lines[8].ends_with(",0,test"));
        assert!(lines[10].ends_with(",1,test"));
    }

    #[test]
    fn test_export_with_features_file() {
        let exporter = MlCsvExporter::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");

        exporter.export_with_features(&dataset(3), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let exporter = MlCsvExporter::new();
        let empty = InjuryDataset::new("Alex".to_string(), 35, 0.0, Vec::new());
        let result = exporter.write_features(&empty, Vec::new());
        assert!(matches!(result, Err(ExportError::EmptyDataset)));
    }
}
