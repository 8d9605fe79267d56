use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;

use super::clean::clean_columns;
use super::config::CleaningConfig;
use super::error::IngestionError;
use super::model::CleanedTable;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a comma-separated file and return the cleaned table.
///
/// The first row is the header. Fails only when the file cannot be read or
/// is not well-formed delimited text; bad cells become missing values.
pub fn load_and_clean(
    path: &Path,
    config: &CleaningConfig,
) -> Result<CleanedTable, IngestionError> {
    let file = File::open(path).map_err(|source| IngestionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_and_clean_reader(file, config)?;
    info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Same as [`load_and_clean`] over any UTF-8 reader.
pub fn load_and_clean_reader<R: Read>(
    reader: R,
    config: &CleaningConfig,
) -> Result<CleanedTable, IngestionError> {
    config.validate()?;
    let (labels, raw_columns) = read_raw(reader)?;
    clean_columns(&labels, raw_columns, config)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Parse into header labels plus column-oriented raw cells.
///
/// Rows whose field count differs from the header are malformed input.
fn read_raw<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<String>>), IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let labels: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if labels.is_empty() {
        return Err(IngestionError::Empty);
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); labels.len()];
    for result in reader.records() {
        let record = result?;
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    Ok((labels, columns))
}
