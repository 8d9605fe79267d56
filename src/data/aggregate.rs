use std::collections::BTreeMap;

use super::error::QueryError;
use super::model::{CleanedTable, Column, SemanticType, Value};

/// One group of an [`Aggregation`]: the key and the mean of each value
/// column, `None` where the group has no non-missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Value,
    pub means: Vec<Option<f64>>,
}

/// Grouped means, ascending by group key.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub group_column: String,
    pub value_columns: Vec<String>,
    pub groups: Vec<GroupRow>,
}

impl Aggregation {
    /// Mean of `value_column` for the group keyed `key`.
    pub fn mean(&self, key: &Value, value_column: &str) -> Option<f64> {
        let pos = self.value_columns.iter().position(|c| c == value_column)?;
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .and_then(|g| g.means[pos])
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean of each value column per distinct value of `group_column`.
///
/// Rows with a missing group key are left out. Every value column must be
/// numeric.
pub fn aggregate(
    table: &CleanedTable,
    group_column: &str,
    value_columns: &[&str],
) -> Result<Aggregation, QueryError> {
    let group = table.require(group_column)?;
    let values: Vec<&Column> = value_columns
        .iter()
        .map(|&name| {
            let column = table.require(name)?;
            if column.semantic_type != SemanticType::Numeric {
                return Err(QueryError::NotNumeric {
                    column: name.to_string(),
                    actual: column.semantic_type,
                });
            }
            Ok(column)
        })
        .collect::<Result<_, _>>()?;

    let mut groups: BTreeMap<&Value, Vec<Accumulator>> = BTreeMap::new();
    for (row, key) in group.values.iter().enumerate() {
        if key.is_missing() {
            continue;
        }
        let accs = groups
            .entry(key)
            .or_insert_with(|| vec![Accumulator::default(); values.len()]);
        for (acc, column) in accs.iter_mut().zip(&values) {
            if let Some(v) = column.values[row].as_f64() {
                acc.sum += v;
                acc.count += 1;
            }
        }
    }

    Ok(Aggregation {
        group_column: group_column.to_string(),
        value_columns: value_columns.iter().map(|s| s.to_string()).collect(),
        groups: groups
            .into_iter()
            .map(|(key, accs)| GroupRow {
                key: key.clone(),
                means: accs.into_iter().map(Accumulator::mean).collect(),
            })
            .collect(),
    })
}
