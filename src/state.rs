use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use taxi_explorer::data::filter::distinct_texts;
use taxi_explorer::data::{
    aggregate, filter, summarize, Aggregation, CleanedTable, CleaningConfig, ColumnStats,
    Predicate, PredicateSet, QueryError, SemanticType, Summary, TableCache,
};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Operations offered in the side panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RawData,
    Summary,
    Filter,
    Aggregate,
    Plot,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::RawData,
        Operation::Summary,
        Operation::Filter,
        Operation::Aggregate,
        Operation::Plot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Operation::RawData => "View raw data",
            Operation::Summary => "Data summary",
            Operation::Filter => "Filter rows",
            Operation::Aggregate => "Group & aggregate",
            Operation::Plot => "Plot numeric column",
        }
    }
}

// ---------------------------------------------------------------------------
// Filter widget state
// ---------------------------------------------------------------------------

/// The control matching the chosen column's semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    Numeric {
        bounds: (f64, f64),
        range: (f64, f64),
    },
    Dates {
        bounds: (NaiveDate, NaiveDate),
        range: (NaiveDate, NaiveDate),
    },
    Values {
        all: BTreeSet<String>,
        selected: BTreeSet<String>,
    },
    /// Column without any non-missing value.
    Unavailable,
}

impl FilterControl {
    fn for_column(table: &CleanedTable, summary: &Summary, column: &str) -> Self {
        let (Some(col), Some(col_summary)) = (table.column(column), summary.column(column)) else {
            return FilterControl::Unavailable;
        };
        match &col_summary.stats {
            ColumnStats::Numeric(stats) => match stats.min.zip(stats.max) {
                Some(bounds) => FilterControl::Numeric {
                    bounds,
                    range: bounds,
                },
                None => FilterControl::Unavailable,
            },
            ColumnStats::Datetime(stats) => match stats.min.zip(stats.max) {
                Some((lo, hi)) => {
                    let bounds = (lo.date(), hi.date());
                    FilterControl::Dates {
                        bounds,
                        range: bounds,
                    }
                }
                None => FilterControl::Unavailable,
            },
            ColumnStats::Categorical(_) => FilterControl::Values {
                all: distinct_texts(col),
                selected: BTreeSet::new(),
            },
        }
    }

    /// Translate the widget state into a predicate; dates cover whole days.
    fn predicate(&self) -> Option<Predicate> {
        match self {
            FilterControl::Numeric { range, .. } => Some(Predicate::NumericRange {
                lo: range.0,
                hi: range.1,
            }),
            FilterControl::Dates { range, .. } => Some(Predicate::DateRange {
                start: range.0.and_hms_opt(0, 0, 0)?,
                end: range.1.and_hms_opt(23, 59, 59)?,
            }),
            FilterControl::Values { selected, .. } => Some(Predicate::OneOf(selected.clone())),
            FilterControl::Unavailable => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: TableCache,

    /// File the current table was loaded from.
    pub source: Option<PathBuf>,

    /// Cleaned table (None until a file loads successfully).
    pub table: Option<Arc<CleanedTable>>,

    /// Summary of `table`, computed once per load.
    pub summary: Option<Summary>,

    pub operation: Operation,

    pub filter_column: Option<String>,
    pub filter_control: FilterControl,
    pub filtered: Option<Result<CleanedTable, QueryError>>,

    pub group_column: Option<String>,
    pub mean_column: Option<String>,
    pub aggregation: Option<Result<Aggregation, QueryError>>,
    pub color_map: Option<ColorMap>,

    pub plot_column: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: CleaningConfig) -> Self {
        Self {
            cache: TableCache::new(config),
            source: None,
            table: None,
            summary: None,
            operation: Operation::RawData,
            filter_column: None,
            filter_control: FilterControl::Unavailable,
            filtered: None,
            group_column: None,
            mean_column: None,
            aggregation: None,
            color_map: None,
            plot_column: None,
            status_message: None,
        }
    }

    /// Load (or fetch from cache) the table at `path`. On failure nothing of
    /// the previous or the new file is shown.
    pub fn open(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(table) => {
                log::info!(
                    "showing {} rows with columns {:?}",
                    table.len(),
                    table.column_names().collect::<Vec<_>>()
                );
                self.source = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.source = None;
                self.table = None;
                self.summary = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-open the current source; a no-op parse if the file is unchanged.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.open(&path);
        }
    }

    /// Ingest a newly loaded table and reset the per-view selections.
    pub fn set_table(&mut self, table: Arc<CleanedTable>) {
        if self.table.as_ref().is_some_and(|t| Arc::ptr_eq(t, &table)) {
            self.status_message = None;
            return;
        }

        let summary = summarize(&table);
        let numeric = table.columns_of(SemanticType::Numeric);
        let first = table.column_names().next().map(str::to_string);

        self.mean_column = numeric.first().map(|s| s.to_string());
        self.plot_column = self.mean_column.clone();
        self.group_column = first.clone();

        self.table = Some(table);
        self.summary = Some(summary);
        self.status_message = None;

        self.set_filter_column(first);
        self.regroup();
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|t| {
                t.columns_of(SemanticType::Numeric)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_filter_column(&mut self, column: Option<String>) {
        self.filter_control = match (&self.table, &self.summary, &column) {
            (Some(t), Some(s), Some(c)) => FilterControl::for_column(t, s, c),
            _ => FilterControl::Unavailable,
        };
        self.filter_column = column;
        self.refilter();
    }

    /// Recompute `filtered` after a widget change.
    pub fn refilter(&mut self) {
        self.filtered = match (&self.table, &self.filter_column) {
            (Some(table), Some(column)) => {
                let predicates: PredicateSet = self
                    .filter_control
                    .predicate()
                    .map(|p| (column.clone(), p))
                    .into_iter()
                    .collect();
                Some(filter(table, &predicates))
            }
            _ => None,
        };
    }

    /// Recompute `aggregation` and its colours after a selection change.
    pub fn regroup(&mut self) {
        self.aggregation = match (&self.table, &self.group_column, &self.mean_column) {
            (Some(table), Some(group), Some(mean)) => {
                Some(aggregate(table, group, &[mean.as_str()]))
            }
            _ => None,
        };
        self.color_map = match &self.aggregation {
            Some(Ok(agg)) => Some(ColorMap::new(agg.groups.iter().map(|g| &g.key))),
            _ => None,
        };
    }

    /// How many times a source was actually parsed from disk.
    pub fn parse_count(&self) -> usize {
        self.cache.parse_count()
    }
}
