use std::path::PathBuf;

use orderlens::catalog::Catalog;
use orderlens::chart::{ChartError, ChartKind, ChartSpec};
use orderlens::store::{MemoryStore, QueryStore};

fn sample_store() -> MemoryStore {
    let samples = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples");
    MemoryStore::load(&samples.join("orders.csv"), &samples.join("products.csv"))
        .expect("failed to load sample datasets")
}

#[test]
fn test_bar_chart_from_category_profit() {
    let store = sample_store();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Total Profit by Category").unwrap();
    let table = store.execute_sql(&named.sql).unwrap();

    let spec = ChartSpec {
        kind: ChartKind::Bar,
        x: "category".to_string(),
        y: "total_profit".to_string(),
    };
    let data = spec.build(&table).unwrap();

    assert_eq!(data.points.len(), 3);
    assert!(data.points.iter().all(|(label, _)| !label.is_empty()));
    assert!(data.max_value() > 0.0);
}

#[test]
fn test_line_and_pie_kinds_share_the_series() {
    let store = sample_store();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Annual Revenue").unwrap();
    let table = store.execute_sql(&named.sql).unwrap();

    let line = ChartSpec {
        kind: ChartKind::Line,
        x: "order_year".to_string(),
        y: "revenue".to_string(),
    }
    .build(&table)
    .unwrap();

    let pie = ChartSpec {
        kind: ChartKind::Pie,
        x: "order_year".to_string(),
        y: "revenue".to_string(),
    }
    .build(&table)
    .unwrap();

    assert_eq!(line.points, pie.points);

    let fractions = pie.pie_fractions();
    let total: f64 = fractions.iter().map(|(_, f)| f).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_unknown_axis_is_column_not_found() {
    let store = sample_store();
    let table = store
        .execute_sql("SELECT region, SUM(profit) AS total_profit FROM orders GROUP BY region")
        .unwrap();

    let spec = ChartSpec {
        kind: ChartKind::Bar,
        x: "region".to_string(),
        y: "revenue".to_string(),
    };

    match spec.build(&table) {
        Err(ChartError::ColumnNotFound(column)) => assert_eq!(column, "revenue"),
        other => panic!("expected ColumnNotFound, got {other:?}"),
    }
}

#[test]
fn test_axis_lookup_is_case_insensitive() {
    let store = sample_store();
    let table = store
        .execute_sql("SELECT segment, SUM(quantity) AS total_quantity FROM orders GROUP BY segment")
        .unwrap();

    let spec = ChartSpec {
        kind: ChartKind::Bar,
        x: "Segment".to_string(),
        y: "Total_Quantity".to_string(),
    };
    assert!(spec.build(&table).is_ok());
}
