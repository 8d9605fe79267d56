use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::QueryError;

// ---------------------------------------------------------------------------
// Value – a single cleaned cell
// ---------------------------------------------------------------------------

/// A typed cell of the cleaned table.
///
/// `Missing` is the only representation of absent data; no placeholder text
/// survives cleaning. Values are `Ord` so they can key `BTreeMap`s
/// (grouping, distinct-value sets).
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
    Missing,
}

// -- Manual Eq/Ord so we can put Value in BTreeMap / BTreeSet --

/// `-0.0` and `0.0` are the same number for equality, ordering and hashing.
fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                Timestamp(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Number(a), Number(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(f) => canonical(*f).to_bits().hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Bytes owned by this value, including heap text.
    pub(crate) fn footprint(&self) -> usize {
        let heap = match self {
            Value::Text(s) => s.capacity(),
            _ => 0,
        };
        std::mem::size_of::<Value>() + heap
    }
}

// ---------------------------------------------------------------------------
// SemanticType
// ---------------------------------------------------------------------------

/// The type a column is classified as, once, at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Numeric,
    Datetime,
    Categorical,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Datetime => "datetime",
            SemanticType::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named, typed column. Every value matches `semantic_type` or is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub semantic_type: SemanticType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            values,
        }
    }

    pub fn non_missing(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }

    /// Non-missing numeric values in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }

    /// Non-missing timestamps in row order.
    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.values.iter().filter_map(Value::as_timestamp)
    }

    pub(crate) fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            semantic_type: self.semantic_type,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// CleanedTable – the loaded dataset
// ---------------------------------------------------------------------------

/// The cleaned, column-oriented dataset. Immutable once built; every query
/// result is a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    columns: Vec<Column>,
    row_count: usize,
    positions: HashMap<String, usize>,
}

impl CleanedTable {
    /// Build a table from columns of equal length with unique names.
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        let positions = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            columns,
            row_count,
            positions,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.positions.get(name).map(|&i| &self.columns[i])
    }

    /// Like [`column`](Self::column) but reports an unknown name as an error.
    pub fn require(&self, name: &str) -> Result<&Column, QueryError> {
        self.column(name)
            .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))
    }

    /// Names of the columns classified as `semantic_type`, in table order.
    pub fn columns_of(&self, semantic_type: SemanticType) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.semantic_type == semantic_type)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.row_count).map(move |index| Row { table: self, index })
    }

    /// New table holding the given rows, in the given order.
    pub(crate) fn take(&self, indices: &[usize]) -> CleanedTable {
        CleanedTable::from_columns(self.columns.iter().map(|c| c.take(indices)).collect())
    }

    /// Rough in-memory size of the table in bytes.
    pub fn memory_footprint(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.name.capacity() + c.values.iter().map(Value::footprint).sum::<usize>())
            .sum()
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a CleanedTable,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table
            .column(column)
            .map(|c| &c.values[self.index])
    }

    /// `(label, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let (table, index) = (self.table, self.index);
        table
            .columns
            .iter()
            .map(move |c| (c.name.as_str(), &c.values[index]))
    }
}
