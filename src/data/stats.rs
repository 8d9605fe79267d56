use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::model::{CleanedTable, Column, SemanticType, Value};

/// Table-level description: shape, memory estimate and per-column stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub memory_bytes: usize,
    pub columns: Vec<ColumnSummary>,
}

impl Summary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub semantic_type: SemanticType,
    pub non_missing: usize,
    pub missing: usize,
    pub stats: ColumnStats,
}

/// Statistics matching the column's semantic type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Datetime(DatetimeStats),
    Categorical(CategoricalStats),
}

/// `None` fields are undefined for the sample size (no values, or one value
/// for `std`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatetimeStats {
    pub count: usize,
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
    pub range_seconds: Option<i64>,
}

impl DatetimeStats {
    pub fn range(&self) -> Option<Duration> {
        self.range_seconds.map(Duration::seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: usize,
}

/// Describe every column of `table`.
pub fn summarize(table: &CleanedTable) -> Summary {
    Summary {
        row_count: table.len(),
        memory_bytes: table.memory_footprint(),
        columns: table.columns().iter().map(summarize_column).collect(),
    }
}

fn summarize_column(column: &Column) -> ColumnSummary {
    let non_missing = column.non_missing();
    let stats = match column.semantic_type {
        SemanticType::Numeric => ColumnStats::Numeric(numeric_stats(column)),
        SemanticType::Datetime => ColumnStats::Datetime(datetime_stats(column)),
        SemanticType::Categorical => ColumnStats::Categorical(categorical_stats(column)),
    };
    ColumnSummary {
        name: column.name.clone(),
        semantic_type: column.semantic_type,
        non_missing,
        missing: column.values.len() - non_missing,
        stats,
    }
}

fn numeric_stats(column: &Column) -> NumericStats {
    let mut sorted: Vec<f64> = column.numbers().collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let mean = (n > 0).then(|| sorted.iter().sum::<f64>() / n as f64);
    let std = mean.filter(|_| n > 1).map(|m| {
        let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    NumericStats {
        count: n,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks over sorted data.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

fn datetime_stats(column: &Column) -> DatetimeStats {
    let min = column.timestamps().min();
    let max = column.timestamps().max();
    DatetimeStats {
        count: column.non_missing(),
        min,
        max,
        range_seconds: min.zip(max).map(|(lo, hi)| (hi - lo).num_seconds()),
    }
}

fn categorical_stats(column: &Column) -> CategoricalStats {
    // value → (count, first row seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, value) in column.values.iter().enumerate() {
        if let Value::Text(s) = value {
            counts.entry(s.as_str()).or_insert((0, row)).0 += 1;
        }
    }
    let top = counts
        .iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(value, (freq, _))| (value.to_string(), *freq));

    CategoricalStats {
        count: column.non_missing(),
        unique: counts.len(),
        freq: top.as_ref().map_or(0, |(_, f)| *f),
        top: top.map(|(v, _)| v),
    }
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
2020-01,Green,1
2020-03,Yellow,2
2020-02,Yellow,-
2020-02,Green,3
2020-04,Yellow,4
";
        load_and_clean_reader(text.as_bytes(), &CleaningConfig::default()).unwrap()
    }

    #[test]
    fn numeric_summary_matches_hand_computation() {
        let summary = summarize(&table());
        let trips = summary.column("Trips Per Day").unwrap();
        assert_eq!(trips.non_missing, 4);
        assert_eq!(trips.missing, 1);

        let ColumnStats::Numeric(stats) = &trips.stats else {
            panic!("expected numeric stats");
        };
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(4.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.median, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        let std = stats.std.unwrap();
        assert!((std - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn categorical_summary_top_is_in_value_set() {
        let summary = summarize(&table());
        let ColumnStats::Categorical(stats) = &summary.column("License Class").unwrap().stats
        else {
            panic!("expected categorical stats");
        };
        assert_eq!(stats.count, 5);
        assert_eq!(stats.unique, 2);
        assert!(stats.unique <= summary.row_count);
        assert_eq!(stats.top.as_deref(), Some("Yellow"));
        assert_eq!(stats.freq, 3);
    }

    #[test]
    fn categorical_ties_go_to_first_seen() {
        let text = "Base\nB2\nB1\nB1\nB2\n";
        let t = load_and_clean_reader(text.as_bytes(), &CleaningConfig::default()).unwrap();
        let ColumnStats::Categorical(stats) = &summarize(&t).columns[0].stats else {
            panic!("expected categorical stats");
        };
        assert_eq!(stats.top.as_deref(), Some("B2"));
    }

    #[test]
    fn datetime_summary_has_range() {
        let summary = summarize(&table());
        let ColumnStats::Datetime(stats) = &summary.column("Month/Year").unwrap().stats else {
            panic!("expected datetime stats");
        };
        let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let apr = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(stats.min, Some(jan));
        assert_eq!(stats.max, Some(apr));
        assert_eq!(stats.range(), Some(apr - jan));
    }

    #[test]
    fn empty_numeric_column_has_no_moments() {
        let t = load_and_clean_reader("Trips\n-\n".as_bytes(), &CleaningConfig::default()).unwrap();
        let ColumnStats::Numeric(stats) = &summarize(&t).columns[0].stats else {
            panic!("expected numeric stats");
        };
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, None);
    }

    #[test]
    fn summary_reports_memory_and_serializes() {
        let summary = summarize(&table());
        assert_eq!(summary.row_count, 5);
        assert!(summary.memory_bytes > 0);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["columns"][2]["stats"]["kind"], "numeric");
    }
}
