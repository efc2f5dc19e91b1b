use super::ExportError;
use std::io::Write;
use std::path::Path;

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)?;

    let path = output_path.as_ref();
    let mut file = std::fs::File::create(path).map_err(|e| ExportError::ExportFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    file.write_all(json_data.as_bytes())
        .map_err(|e| ExportError::ExportFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InjuryDataset;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_dataset_json() {
        let dataset = InjuryDataset::new("Alex".to_string(), 35, 0.1, Vec::new());
        let temp_file = NamedTempFile::new().unwrap();

        export_json(&dataset, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["player"], "Alex");
        assert_eq!(parsed["seed"], 35);
        assert!(parsed["rows"].as_array().unwrap().is_empty());
    }
}
