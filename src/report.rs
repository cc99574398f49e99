//! Page rendering pipeline.
//!
//! A page is rendered by executing every named query of its catalogue
//! entry, in insertion order, against the store. A failing section is
//! captured and reported; it never aborts the rest of the page.

use tracing::warn;

use crate::catalog::Page;
use crate::store::{QueryStore, StoreError};
use crate::table::ResultTable;

pub struct SectionResult {
    pub description: String,
    pub sql: String,
    pub outcome: Result<ResultTable, StoreError>,
}

impl SectionResult {
    pub fn is_err(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Executes all sections of one page. Results are not cached: every
/// page view recomputes from the store.
pub fn run_page(store: &dyn QueryStore, page: &Page) -> Vec<SectionResult> {
    page.queries
        .iter()
        .map(|named| {
            let outcome = store.execute_sql(&named.sql);
            if let Err(ref e) = outcome {
                warn!(section = %named.description, error = %e, "section failed");
            }
            SectionResult {
                description: named.description.clone(),
                sql: named.sql.clone(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NamedQuery;
    use crate::store::Result as StoreResult;
    use crate::table::{Column, DataType, ResultTable, Schema};

    /// Store stub that fails on a marker string and otherwise returns a
    /// one-column empty table.
    struct StubStore;

    impl QueryStore for StubStore {
        fn execute_sql(&self, sql: &str) -> StoreResult<ResultTable> {
            if sql.contains("boom") {
                return Err(StoreError::Query("synthetic failure".to_string()));
            }
            Ok(ResultTable::new(Schema::new(vec![Column::new(
                "region",
                DataType::String,
            )])))
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn page_with(sqls: &[&str]) -> Page {
        Page {
            title: "Test".to_string(),
            queries: sqls
                .iter()
                .enumerate()
                .map(|(i, sql)| NamedQuery {
                    description: format!("section {i}"),
                    sql: sql.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_sections_run_in_insertion_order() {
        let page = page_with(&["SELECT 1", "SELECT 2", "SELECT 3"]);
        let results = run_page(&StubStore, &page);

        let descriptions: Vec<_> = results.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["section 0", "section 1", "section 2"]);
    }

    #[test]
    fn test_failed_section_does_not_abort_the_page() {
        let page = page_with(&["SELECT 1", "boom", "SELECT 3"]);
        let results = run_page(&StubStore, &page);

        assert_eq!(results.len(), 3);
        assert!(results[0].outcome.is_ok());
        assert!(results[1].is_err());
        assert!(results[2].outcome.is_ok());
    }

    #[test]
    fn test_section_keeps_verbatim_sql() {
        let page = page_with(&["SELECT region\nFROM orders"]);
        let results = run_page(&StubStore, &page);
        assert_eq!(results[0].sql, "SELECT region\nFROM orders");
    }
}
