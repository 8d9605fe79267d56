use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use taxi_explorer::data::{
    aggregate, filter, load_and_clean, preview, series, summarize, CleaningConfig, ColumnStats,
    IngestionError, Predicate, PredicateSet, QueryError, SemanticType, TableCache, Value,
};

fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

const STATS: &str = "\
Month/Year, License Class ,Trips Per Day,Farebox Per Day
2020-01,Yellow,\"647,819\",-
2020-01,Green,120,\"1,800\"
2020-02,Yellow,100,\"2,000\"
2020-02,Green,-,-
2020-03,Yellow,,\"3,100\"
";

#[test]
fn cleaned_row_matches_expected_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "one.csv",
        "License Class,Trips Per Day,Farebox Per Day\nYellow,\"647,819\",-\n",
    );

    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();
    let row: Vec<(&str, &Value)> = table.row(0).unwrap().iter().collect();
    assert_eq!(
        row,
        vec![
            ("License Class", &Value::Text("Yellow".into())),
            ("Trips Per Day", &Value::Number(647819.0)),
            ("Farebox Per Day", &Value::Missing),
        ]
    );
}

#[test]
fn column_types_are_inferred_once_per_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();

    let types: Vec<(&str, SemanticType)> = table
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.semantic_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("Month/Year", SemanticType::Datetime),
            ("License Class", SemanticType::Categorical),
            ("Trips Per Day", SemanticType::Numeric),
            ("Farebox Per Day", SemanticType::Numeric),
        ]
    );

    // No placeholder or separator text survives in numeric columns.
    for name in table.columns_of(SemanticType::Numeric) {
        for value in &table.column(name).unwrap().values {
            assert!(matches!(value, Value::Number(v) if v.is_finite()) || value.is_missing());
        }
    }
}

#[test]
fn range_filter_excludes_large_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();

    let predicates = PredicateSet::from([(
        "Trips Per Day".to_string(),
        Predicate::NumericRange { lo: 0.0, hi: 500.0 },
    )]);
    let filtered = filter(&table, &predicates).unwrap();

    let trips: Vec<f64> = filtered.column("Trips Per Day").unwrap().numbers().collect();
    assert_eq!(trips, vec![120.0, 100.0]);
    assert_eq!(filter(&filtered, &predicates).unwrap(), filtered);
    // The source table is untouched.
    assert_eq!(table.len(), 5);
}

#[test]
fn aggregate_means_over_non_missing_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();

    let agg = aggregate(&table, "License Class", &["Trips Per Day", "Farebox Per Day"]).unwrap();
    let keys: Vec<String> = agg.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, vec!["Green".to_string(), "Yellow".to_string()]);

    let green = Value::Text("Green".into());
    let yellow = Value::Text("Yellow".into());
    assert_eq!(agg.mean(&green, "Trips Per Day"), Some(120.0));
    assert_eq!(agg.mean(&yellow, "Trips Per Day"), Some((647819.0 + 100.0) / 2.0));
    assert_eq!(agg.mean(&green, "Farebox Per Day"), Some(1800.0));
    assert_eq!(agg.mean(&yellow, "Farebox Per Day"), Some(2550.0));

    let by_month = aggregate(&table, "Month/Year", &["Trips Per Day"]).unwrap();
    assert_eq!(by_month.groups.len(), 3);
    assert_eq!(by_month.groups[2].means, vec![None]);
}

#[test]
fn query_contract_violations_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();

    assert_eq!(
        aggregate(&table, "License Class", &["Month/Year"]).unwrap_err(),
        QueryError::NotNumeric {
            column: "Month/Year".into(),
            actual: SemanticType::Datetime,
        }
    );
    assert_eq!(
        series(&table, "Drivers").unwrap_err(),
        QueryError::UnknownColumn("Drivers".into())
    );
    let predicates = PredicateSet::from([(
        "Month/Year".to_string(),
        Predicate::OneOf(BTreeSet::from(["2020-01".to_string()])),
    )]);
    assert!(matches!(
        filter(&table, &predicates),
        Err(QueryError::PredicateMismatch { .. })
    ));
}

#[test]
fn summary_and_preview_over_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let table = load_and_clean(&path, &CleaningConfig::default()).unwrap();

    assert_eq!(preview(&table, 2).len(), 2);
    assert_eq!(preview(&table, 500).len(), 5);

    let summary = summarize(&table);
    let class = summary.column("License Class").unwrap();
    assert_eq!(class.non_missing, 5);
    let ColumnStats::Categorical(stats) = &class.stats else {
        panic!("expected categorical stats");
    };
    assert_eq!(stats.unique, 2);
    assert_eq!(stats.top.as_deref(), Some("Yellow"));

    assert_eq!(
        series(&table, "Trips Per Day").unwrap(),
        vec![(0, 647819.0), (1, 120.0), (2, 100.0)]
    );
}

#[test]
fn malformed_file_fails_without_partial_data() {
    let dir = tempfile::tempdir().unwrap();
    let ragged = write_csv(dir.path(), "ragged.csv", "a,b\n1,2\n3\n");
    let empty = write_csv(dir.path(), "empty.csv", "");
    let dupes = write_csv(dir.path(), "dupes.csv", "Trips, Trips\n1,2\n");

    let config = CleaningConfig::default();
    assert!(matches!(load_and_clean(&ragged, &config), Err(IngestionError::Csv(_))));
    assert!(matches!(load_and_clean(&empty, &config), Err(IngestionError::Empty)));
    assert!(matches!(
        load_and_clean(&dupes, &config),
        Err(IngestionError::DuplicateColumn { .. })
    ));
}

#[test]
fn cache_reload_returns_equal_table_without_reparsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "stats.csv", STATS);
    let cache = TableCache::default();

    let first = cache.load(&path).unwrap();
    let second = cache.load(&path).unwrap();

    assert_eq!(*first, *second);
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn bundled_sample_loads_cleanly() {
    let table = load_and_clean(Path::new("data/sample_data.csv"), &CleaningConfig::default())
        .unwrap();
    assert_eq!(
        table.columns_of(SemanticType::Numeric),
        vec![
            "Trips Per Day",
            "Farebox Per Day",
            "Unique Drivers",
            "Unique Vehicles",
            "Avg Minutes Per Trip",
        ]
    );
    assert_eq!(table.columns_of(SemanticType::Datetime), vec!["Month/Year"]);
    assert_eq!(table.columns_of(SemanticType::Categorical), vec!["License Class"]);
}
