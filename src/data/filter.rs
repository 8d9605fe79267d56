use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use super::error::QueryError;
use super::model::{CleanedTable, Column, SemanticType, Value};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// A constraint on one column. Ranges are closed on both ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `lo <= value <= hi` on a numeric column.
    NumericRange { lo: f64, hi: f64 },
    /// `start <= value <= end` on a datetime column.
    DateRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Value is one of the allowed texts on a categorical column. An empty
    /// set does not constrain the column.
    OneOf(BTreeSet<String>),
}

/// column_name → predicate. Columns without an entry are unconstrained and
/// all entries must hold (logical AND).
pub type PredicateSet = BTreeMap<String, Predicate>;

impl Predicate {
    fn check_applies(&self, column: &Column) -> Result<(), QueryError> {
        let expected = match self {
            Predicate::NumericRange { lo, hi } => {
                if lo > hi {
                    return Err(QueryError::InvalidRange {
                        column: column.name.clone(),
                    });
                }
                SemanticType::Numeric
            }
            Predicate::DateRange { start, end } => {
                if start > end {
                    return Err(QueryError::InvalidRange {
                        column: column.name.clone(),
                    });
                }
                SemanticType::Datetime
            }
            Predicate::OneOf(_) => SemanticType::Categorical,
        };
        if column.semantic_type != expected {
            return Err(QueryError::PredicateMismatch {
                column: column.name.clone(),
                actual: column.semantic_type,
            });
        }
        Ok(())
    }

    /// Missing values never satisfy a range or a non-empty set.
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Predicate::OneOf(allowed), _) if allowed.is_empty() => true,
            (Predicate::NumericRange { lo, hi }, Value::Number(v)) => lo <= v && v <= hi,
            (Predicate::DateRange { start, end }, Value::Timestamp(t)) => start <= t && t <= end,
            (Predicate::OneOf(allowed), Value::Text(s)) => allowed.contains(s),
            _ => false,
        }
    }
}

/// Return indices of rows that pass all predicates, in table order.
pub fn filtered_indices(
    table: &CleanedTable,
    predicates: &PredicateSet,
) -> Result<Vec<usize>, QueryError> {
    let active: Vec<(&Column, &Predicate)> = predicates
        .iter()
        .map(|(name, predicate)| -> Result<_, QueryError> {
            let column = table.require(name)?;
            predicate.check_applies(column)?;
            Ok((column, predicate))
        })
        .collect::<Result<_, _>>()?;

    Ok((0..table.len())
        .filter(|&row| {
            active
                .iter()
                .all(|(column, predicate)| predicate.matches(&column.values[row]))
        })
        .collect())
}

/// The rows of `table` passing `predicates`, as a new table.
pub fn filter(table: &CleanedTable, predicates: &PredicateSet) -> Result<CleanedTable, QueryError> {
    let indices = filtered_indices(table, predicates)?;
    Ok(table.take(&indices))
}

/// Sorted distinct non-missing texts of a categorical column, for building a
/// [`Predicate::OneOf`] selection.
pub fn distinct_texts(column: &Column) -> BTreeSet<String> {
    column
        .values
        .iter()
        .filter_map(|v| v.as_text().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::CleaningConfig;
    use crate::data::loader::load_and_clean_reader;
    use chrono::NaiveDate;

    fn table() -> CleanedTable {
        let text = "\
Month/Year,License Class,Trips Per Day
2020-01,Yellow,\"647,819\"
2020-02,Green,120
2020-03,Yellow,-
2020-04,FHV,480
";
        load_and_clean_reader(text.as_bytes(), &CleaningConfig::default()).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn numeric_range_excludes_out_of_range_and_missing() {
        let t = table();
        let preds = PredicateSet::from([(
            "Trips Per Day".to_string(),
            Predicate::NumericRange { lo: 0.0, hi: 500.0 },
        )]);
        assert_eq!(filtered_indices(&t, &preds).unwrap(), vec![1, 3]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let t = table();
        let preds = PredicateSet::from([
            (
                "Month/Year".to_string(),
                Predicate::DateRange {
                    start: day(2020, 1, 1),
                    end: day(2020, 3, 1),
                },
            ),
            (
                "License Class".to_string(),
                Predicate::OneOf(BTreeSet::from(["Yellow".to_string()])),
            ),
        ]);
        assert_eq!(filtered_indices(&t, &preds).unwrap(), vec![0, 2]);
    }

    #[test]
    fn empty_allowed_set_keeps_everything() {
        let t = table();
        let preds = PredicateSet::from([(
            "License Class".to_string(),
            Predicate::OneOf(BTreeSet::new()),
        )]);
        assert_eq!(filter(&t, &preds).unwrap(), t);
    }

    #[test]
    fn filter_is_idempotent() {
        let t = table();
        let preds = PredicateSet::from([(
            "License Class".to_string(),
            Predicate::OneOf(BTreeSet::from(["Yellow".to_string(), "FHV".to_string()])),
        )]);
        let once = filter(&t, &preds).unwrap();
        let twice = filter(&once, &preds).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn mismatched_predicate_is_an_error() {
        let t = table();
        let preds = PredicateSet::from([(
            "License Class".to_string(),
            Predicate::NumericRange { lo: 0.0, hi: 1.0 },
        )]);
        assert_eq!(
            filter(&t, &preds).unwrap_err(),
            QueryError::PredicateMismatch {
                column: "License Class".into(),
                actual: SemanticType::Categorical,
            }
        );
    }

    #[test]
    fn inverted_range_and_unknown_column_are_errors() {
        let t = table();
        let inverted = PredicateSet::from([(
            "Trips Per Day".to_string(),
            Predicate::NumericRange { lo: 5.0, hi: 1.0 },
        )]);
        assert!(matches!(
            filter(&t, &inverted),
            Err(QueryError::InvalidRange { .. })
        ));

        let unknown = PredicateSet::from([(
            "Fare".to_string(),
            Predicate::OneOf(BTreeSet::new()),
        )]);
        assert_eq!(
            filter(&t, &unknown).unwrap_err(),
            QueryError::UnknownColumn("Fare".into())
        );
    }

    #[test]
    fn distinct_texts_skip_missing() {
        let t = table();
        let values = distinct_texts(t.column("License Class").unwrap());
        assert_eq!(
            values.into_iter().collect::<Vec<_>>(),
            vec!["FHV".to_string(), "Green".to_string(), "Yellow".to_string()]
        );
    }
}
