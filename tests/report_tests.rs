use std::path::PathBuf;

use orderlens::catalog::{Catalog, NamedQuery, Page};
use orderlens::report::run_page;
use orderlens::store::{MemoryStore, QueryStore};
use orderlens::table::Value;

fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples")
}

fn sample_store() -> MemoryStore {
    let samples = samples_dir();
    MemoryStore::load(&samples.join("orders.csv"), &samples.join("products.csv"))
        .expect("failed to load sample datasets")
}

#[test]
fn test_every_builtin_query_returns_a_table() {
    let store = sample_store();
    let catalog = Catalog::builtin();

    for page in &catalog.pages {
        let results = run_page(&store, page);
        assert_eq!(results.len(), page.queries.len());

        for section in &results {
            let table = section
                .outcome
                .as_ref()
                .unwrap_or_else(|e| panic!("'{}' failed: {}", section.description, e));
            assert!(
                table.column_count() > 0,
                "'{}' returned no columns",
                section.description
            );
        }
    }
}

#[test]
fn test_selected_expression_column_sets() {
    let store = sample_store();
    let catalog = Catalog::builtin();

    let cases: &[(&str, &[&str])] = &[
        ("Annual Revenue", &["order_year", "revenue"]),
        ("Total Profit by Category", &["category", "total_profit"]),
        (
            "Top-Selling Products",
            &["product_id", "sub_category", "total_sales", "sales_rank"],
        ),
        (
            "Regional Sales",
            &[
                "region",
                "total_orders",
                "total_sales",
                "total_profit",
                "profit_margin",
                "sales_rank",
            ],
        ),
        (
            "Monthly Sales Growth",
            &["order_month", "growth_pct", "growth_rank"],
        ),
    ];

    for (description, expected_columns) in cases {
        let named = catalog
            .find_query(description)
            .unwrap_or_else(|| panic!("missing query '{description}'"));
        let table = store.execute_sql(&named.sql).unwrap();
        assert_eq!(
            table.column_names(),
            expected_columns.to_vec(),
            "column set mismatch for '{description}'"
        );
    }
}

#[test]
fn test_total_profit_by_category_values() {
    let store = sample_store();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Total Profit by Category").unwrap();

    let table = store.execute_sql(&named.sql).unwrap();
    assert_eq!(table.row_count(), 3);

    let furniture = table
        .rows
        .iter()
        .find(|row| row.values[0] == Value::String("Furniture".to_string()))
        .expect("no Furniture row");
    let profit = furniture.values[1].as_float().unwrap();
    assert!((profit - 312.75).abs() < 1e-6, "got {profit}");
}

#[test]
fn test_annual_revenue_covers_both_years() {
    let store = sample_store();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Annual Revenue").unwrap();

    let table = store.execute_sql(&named.sql).unwrap();
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_discount_impact_filters_low_discount_products() {
    let store = sample_store();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Discount Impact").unwrap();

    let table = store.execute_sql(&named.sql).unwrap();
    // P-400 (10.0 total) and P-600 (0.0) fall under the HAVING threshold
    assert_eq!(table.row_count(), 4);
    for row in &table.rows {
        assert_ne!(row.values[0], Value::String("P-400".to_string()));
        assert_ne!(row.values[0], Value::String("P-600".to_string()));
    }
}

#[test]
fn test_malformed_query_does_not_abort_the_page() {
    let store = sample_store();
    let page = Page {
        title: "Mixed".to_string(),
        queries: vec![
            NamedQuery {
                description: "good before".to_string(),
                sql: "SELECT region FROM orders GROUP BY region".to_string(),
            },
            NamedQuery {
                description: "broken".to_string(),
                sql: "SELEC region FORM orders".to_string(),
            },
            NamedQuery {
                description: "good after".to_string(),
                sql: "SELECT segment FROM orders GROUP BY segment".to_string(),
            },
        ],
    };

    let results = run_page(&store, &page);
    assert_eq!(results.len(), 3);
    assert!(results[0].outcome.is_ok());
    assert!(results[1].outcome.is_err());
    assert!(results[2].outcome.is_ok());
}

#[test]
fn test_missing_column_is_a_recoverable_query_error() {
    let store = sample_store();
    let result = store.execute_sql("SELECT no_such_column FROM orders");
    assert!(result.is_err());
    assert!(store.execute_sql("SELECT order_id FROM orders").is_ok());
}

#[test]
fn test_empty_result_is_distinct_from_failure() {
    let store = sample_store();
    let table = store
        .execute_sql("SELECT region, profit FROM orders WHERE profit > 1000000")
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(table.column_names(), vec!["region", "profit"]);
}

#[test]
fn test_reload_yields_identical_cache() {
    let first = sample_store();
    let second = sample_store();

    assert_eq!(first.orders_row_count(), second.orders_row_count());
    assert_eq!(first.products_row_count(), second.products_row_count());

    let a = first.execute_sql("SELECT * FROM orders").unwrap();
    let b = second.execute_sql("SELECT * FROM orders").unwrap();
    assert_eq!(a.row_count(), b.row_count());
    assert_eq!(a.column_names(), b.column_names());
}

#[test]
fn test_total_profit_by_category_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let orders = dir.path().join("orders.csv");
    let products = dir.path().join("products.csv");

    std::fs::write(
        &orders,
        "order_id,product_id,sale_price,profit,region\n1,P1,100,20,West\n",
    )
    .unwrap();
    std::fs::write(&products, "product_id,category,sub_category\nP1,Furniture,Chairs\n").unwrap();

    let store = MemoryStore::load(&orders, &products).unwrap();
    let catalog = Catalog::builtin();
    let named = catalog.find_query("Total Profit by Category").unwrap();

    let table = store.execute_sql(&named.sql).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows[0].values[0], Value::String("Furniture".to_string()));
    assert_eq!(table.rows[0].values[1].as_float(), Some(20.0));
}
