//! Column-type inference and value coercion.
//!
//! Runs once per load over column-oriented raw text: labels are trimmed,
//! each column is classified, then every cell is coerced to the column's
//! type. Cells that fail coercion become [`Value::Missing`]; nothing in here
//! fails except a duplicate label.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};

use super::config::CleaningConfig;
use super::error::IngestionError;
use super::model::{CleanedTable, Column, SemanticType, Value};

/// Formats for month-granularity dates; parsed as the first of the month.
const MONTH_FORMATS: &[&str] = &[
    "%Y-%m", "%Y/%m", "%m/%Y", "%m-%Y", "%B %Y", "%b %Y", "%b-%Y",
];

/// Trim labels and reject collisions. Blank labels get a positional name.
pub fn normalize_labels(raw: &[String]) -> Result<Vec<String>, IngestionError> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .enumerate()
        .map(|(i, label)| {
            let trimmed = label.trim();
            let label = if trimmed.is_empty() {
                format!("unnamed_{i}")
            } else {
                trimmed.to_string()
            };
            if !seen.insert(label.clone()) {
                return Err(IngestionError::DuplicateColumn { label });
            }
            Ok(label)
        })
        .collect()
}

/// Decide a column's type from its label and raw cells.
///
/// Only informative cells (not blank, not a placeholder) are counted. A
/// column without any informative cell passes every check vacuously.
pub fn classify_column(label: &str, raw: &[String], config: &CleaningConfig) -> SemanticType {
    let informative: Vec<&str> = raw
        .iter()
        .map(String::as_str)
        .filter(|r| !config.is_placeholder(r))
        .collect();

    let passes = |parse: &dyn Fn(&str) -> bool| -> bool {
        if informative.is_empty() {
            return true;
        }
        let ok = informative.iter().filter(|&&r| parse(r)).count();
        ok as f64 / informative.len() as f64 >= config.inference_threshold
    };

    let bare_years = config.is_year_label(label);
    let datetime = |r: &str| parse_cell_datetime(r, bare_years, config).is_some();
    if config.is_datetime_label(label) && passes(&datetime) {
        SemanticType::Datetime
    } else if passes(&|r: &str| parse_number(r, config).is_some()) {
        SemanticType::Numeric
    } else {
        SemanticType::Categorical
    }
}

/// Parse numeric-looking text: thousands separators are dropped, placeholders
/// and non-finite results give `None`. `-0` reads as `0`.
pub fn parse_number(raw: &str, config: &CleaningConfig) -> Option<f64> {
    if config.is_placeholder(raw) {
        return None;
    }
    let digits: String = raw
        .trim()
        .chars()
        .filter(|&c| c != config.thousands_separator)
        .collect();
    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| if v == 0.0 { 0.0 } else { v })
}

/// Best-effort date/time parse: RFC 3339, then the configured formats, then
/// month-only forms. Bare years are left to [`parse_year`].
pub fn parse_datetime(raw: &str, config: &CleaningConfig) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if config.is_placeholder(s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in &config.datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    let with_day = format!("{s} 01");
    for fmt in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&with_day, &format!("{fmt} %d")) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// A bare four-digit year, as January 1st of that year.
pub fn parse_year(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Datetime parse for a cell of a column; bare years only count when the
/// column label names a year.
fn parse_cell_datetime(
    raw: &str,
    bare_years: bool,
    config: &CleaningConfig,
) -> Option<NaiveDateTime> {
    parse_datetime(raw, config).or_else(|| if bare_years { parse_year(raw) } else { None })
}

pub fn coerce_numeric(raw: &[String], config: &CleaningConfig) -> Vec<Value> {
    raw.iter()
        .map(|r| parse_number(r, config).map_or(Value::Missing, Value::Number))
        .collect()
}

pub fn coerce_datetime(label: &str, raw: &[String], config: &CleaningConfig) -> Vec<Value> {
    let bare_years = config.is_year_label(label);
    raw.iter()
        .map(|r| {
            parse_cell_datetime(r, bare_years, config).map_or(Value::Missing, Value::Timestamp)
        })
        .collect()
}

pub fn coerce_text(raw: &[String], config: &CleaningConfig) -> Vec<Value> {
    raw.iter()
        .map(|r| {
            if config.is_placeholder(r) {
                Value::Missing
            } else {
                Value::Text(r.trim().to_string())
            }
        })
        .collect()
}

/// Classify and coerce every column. `raw_columns[i]` holds the cells under
/// `raw_labels[i]`; all columns have the same length.
pub fn clean_columns(
    raw_labels: &[String],
    raw_columns: Vec<Vec<String>>,
    config: &CleaningConfig,
) -> Result<CleanedTable, IngestionError> {
    let labels = normalize_labels(raw_labels)?;

    let columns = labels
        .into_iter()
        .zip(raw_columns)
        .map(|(label, raw)| {
            let semantic_type = classify_column(&label, &raw, config);
            let values = match semantic_type {
                SemanticType::Numeric => coerce_numeric(&raw, config),
                SemanticType::Datetime => coerce_datetime(&label, &raw, config),
                SemanticType::Categorical => coerce_text(&raw, config),
            };

            let informative = raw.iter().filter(|r| !config.is_placeholder(r)).count();
            let recovered = informative - values.iter().filter(|v| !v.is_missing()).count();
            debug!(
                "column '{label}' classified as {semantic_type} \
                 ({recovered} cells coerced to missing)"
            );
            if recovered > 0 && semantic_type != SemanticType::Categorical {
                warn!(
                    "column '{label}': {recovered} of {informative} cells \
                     did not parse as {semantic_type}"
                );
            }

            Column::new(label, semantic_type, values)
        })
        .collect();

    Ok(CleanedTable::from_columns(columns))
}
