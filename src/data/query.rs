use super::error::QueryError;
use super::model::{CleanedTable, SemanticType};

/// Rows shown by the raw-data view unless the caller asks otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// The first `n` rows as a new table; `n` is clamped to the row count.
pub fn preview(table: &CleanedTable, n: usize) -> CleanedTable {
    let end = n.min(table.len());
    let indices: Vec<usize> = (0..end).collect();
    table.take(&indices)
}

/// `(row_index, value)` points of a numeric column for line charts.
/// Missing cells are skipped.
pub fn series(table: &CleanedTable, column: &str) -> Result<Vec<(usize, f64)>, QueryError> {
    let col = table.require(column)?;
    if col.semantic_type != SemanticType::Numeric {
        return Err(QueryError::NotNumeric {
            column: column.to_string(),
            actual: col.semantic_type,
        });
    }
    Ok(col
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_f64().map(|x| (i, x)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::CleaningConfig;
    use crate::data::loader::load_and_clean_reader;

    fn table() -> CleanedTable {
        let text = "License Class,Trips Per Day\nYellow,10\nGreen,-\nFHV,\"1,500\"\n";
        load_and_clean_reader(text.as_bytes(), &CleaningConfig::default()).unwrap()
    }

    #[test]
    fn preview_clamps_to_row_count() {
        let t = table();
        assert_eq!(preview(&t, 2).len(), 2);
        assert_eq!(preview(&t, DEFAULT_PREVIEW_ROWS).len(), 3);
        assert_eq!(preview(&t, 0).len(), 0);
        assert_eq!(preview(&t, 2).columns().len(), 2);
    }

    #[test]
    fn series_skips_missing_and_keeps_row_index() {
        let t = table();
        assert_eq!(
            series(&t, "Trips Per Day").unwrap(),
            vec![(0, 10.0), (2, 1500.0)]
        );
    }

    #[test]
    fn series_rejects_non_numeric_and_unknown() {
        let t = table();
        assert_eq!(
            series(&t, "License Class").unwrap_err(),
            QueryError::NotNumeric {
                column: "License Class".into(),
                actual: SemanticType::Categorical,
            }
        );
        assert_eq!(
            series(&t, "Fares").unwrap_err(),
            QueryError::UnknownColumn("Fares".into())
        );
    }
}
