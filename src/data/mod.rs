//! Data layer: ingestion, cleaning, caching and queries.
//!
//! Architecture:
//! ```text
//!   .csv
//!     │
//!     ▼
//!   ┌──────────┐
//!   │  loader   │  parse delimited text → raw columns
//!   └──────────┘
//!     │
//!     ▼
//!   ┌──────────┐
//!   │  clean    │  trim labels, classify, coerce → CleanedTable
//!   └──────────┘
//!     │            (latest source memoized by `cache`)
//!     ▼
//!   ┌──────────────────────────────────────┐
//!   │ query / filter / aggregate / stats    │  read-only, new results
//!   └──────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod clean;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
pub mod stats;

pub use aggregate::{aggregate, Aggregation, GroupRow};
pub use cache::{SourceIdentity, TableCache};
pub use config::CleaningConfig;
pub use error::{IngestionError, QueryError};
pub use filter::{filter, filtered_indices, Predicate, PredicateSet};
pub use loader::{load_and_clean, load_and_clean_reader};
pub use model::{CleanedTable, Column, Row, SemanticType, Value};
pub use query::{preview, series, DEFAULT_PREVIEW_ROWS};
pub use stats::{summarize, ColumnStats, ColumnSummary, Summary};
