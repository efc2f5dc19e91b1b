use csv::{Reader, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::ExportError;
use crate::dataset::InjuryDataset;
use crate::models::WorkloadRow;
use crate::simulator::injury_proneness_for_seed;

/// Write the full table as CSV with a header row
pub fn write_dataset<W: Write>(dataset: &InjuryDataset, writer: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(writer);
    for row in &dataset.rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Export the full table to a CSV file
pub fn export_dataset_csv<P: AsRef<Path>>(
    dataset: &InjuryDataset,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    let file = File::create(path).map_err(|e| ExportError::ExportFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    write_dataset(dataset, file)
}

/// Read rows previously written by [`write_dataset`]
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<WorkloadRow>, ExportError> {
    let mut reader = Reader::from_reader(reader);
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<WorkloadRow>, csv::Error>>()?;
    Ok(rows)
}

/// Load a CSV table back into a dataset
///
/// Proneness is not a column, so it is re-derived from the seed the table was
/// simulated with.
pub fn import_dataset_csv<P: AsRef<Path>>(
    input_path: P,
    seed: u64,
) -> Result<InjuryDataset, ExportError> {
    let file = File::open(input_path.as_ref()).map_err(csv::Error::from)?;
    let rows = read_rows(file)?;
    let player = rows
        .first()
        .map(|r| r.player.clone())
        .ok_or(ExportError::EmptyDataset)?;
    Ok(InjuryDataset::new(
        player,
        seed,
        injury_proneness_for_seed(seed),
        rows,
    ))
}
