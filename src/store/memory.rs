//! In-memory store backed by DataFusion.
//!
//! The two CSV files are read once at startup and cached as Arrow record
//! batches for the process lifetime. Every query gets a fresh
//! `SessionContext` seeded from the cache, so repeated page renders never
//! touch the disk again and queries cannot observe each other's state.

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::{CsvReadOptions, SessionConfig, SessionContext};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::table::ResultTable;

use super::conversion::{batches_to_table, convert_schema};
use super::error::{Result, StoreError};
use super::QueryStore;

pub const ORDERS_TABLE: &str = "orders";
pub const PRODUCTS_TABLE: &str = "products";

struct CachedTable {
    name: &'static str,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl CachedTable {
    fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

pub struct MemoryStore {
    runtime: Arc<Runtime>,
    orders: CachedTable,
    products: CachedTable,
}

impl MemoryStore {
    /// Reads the two datasets into the cache. A missing or unreadable
    /// file is fatal; there is no recovery path at load time.
    pub fn load(orders_path: &Path, products_path: &Path) -> Result<Self> {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(StoreError::Io)?,
        );

        let orders = read_csv(&runtime, ORDERS_TABLE, orders_path)?;
        let products = read_csv(&runtime, PRODUCTS_TABLE, products_path)?;

        info!(
            orders = orders.row_count(),
            products = products.row_count(),
            "loaded datasets"
        );

        Ok(Self {
            runtime,
            orders,
            products,
        })
    }

    pub fn orders_row_count(&self) -> usize {
        self.orders.row_count()
    }

    pub fn products_row_count(&self) -> usize {
        self.products.row_count()
    }

    /// Fresh session seeded with the cached batches. One per query, so
    /// the store behaves like the ephemeral engine it stands in for.
    fn session(&self) -> Result<SessionContext> {
        let config = SessionConfig::new()
            .with_information_schema(true)
            .with_batch_size(8192);
        let ctx = SessionContext::new_with_config(config);

        for cached in [&self.orders, &self.products] {
            let provider = MemTable::try_new(cached.schema.clone(), vec![cached.batches.clone()])?;
            ctx.register_table(cached.name, Arc::new(provider))?;
        }

        Ok(ctx)
    }
}

impl QueryStore for MemoryStore {
    fn execute_sql(&self, sql: &str) -> Result<ResultTable> {
        debug!(sql, "executing against memory store");

        let (schema, batches) = self.runtime.block_on(async {
            let ctx = self.session()?;
            let df = ctx.sql(sql).await?;
            let schema = df.schema().clone();
            let batches = df.collect().await?;
            Ok::<_, StoreError>((schema, batches))
        })?;

        // An empty result still carries the query's output schema
        if batches.is_empty() {
            let arrow_schema: arrow::datatypes::Schema = schema.into();
            return Ok(ResultTable::new(convert_schema(&arrow_schema)));
        }

        batches_to_table(&batches)
    }

    fn describe(&self) -> String {
        format!(
            "memory ({}: {} rows, {}: {} rows)",
            ORDERS_TABLE,
            self.orders.row_count(),
            PRODUCTS_TABLE,
            self.products.row_count()
        )
    }
}

fn read_csv(runtime: &Runtime, name: &'static str, path: &Path) -> Result<CachedTable> {
    if !path.is_file() {
        return Err(StoreError::FileNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| StoreError::Conversion("invalid UTF-8 in path".to_string()))?;

    runtime.block_on(async {
        let ctx = SessionContext::new();
        let df = ctx.read_csv(path_str, CsvReadOptions::new()).await?;
        let df_schema = df.schema().clone();
        let batches = df.collect().await?;

        let schema: SchemaRef = match batches.first() {
            Some(batch) => batch.schema(),
            None => Arc::new(arrow::datatypes::Schema::from(df_schema)),
        };

        Ok(CachedTable {
            name,
            schema,
            batches,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
        let orders = dir.join("orders.csv");
        let products = dir.join("products.csv");
        fs::write(
            &orders,
            "order_id,product_id,sale_price,profit,region\n\
             1,P1,100.0,20.0,West\n\
             2,P1,50.0,5.0,East\n",
        )
        .unwrap();
        fs::write(&products, "product_id,category,sub_category\nP1,Furniture,Chairs\n").unwrap();
        (orders, products)
    }

    #[test]
    fn test_load_caches_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, products) = write_fixture(dir.path());

        let store = MemoryStore::load(&orders, &products).unwrap();
        assert_eq!(store.orders_row_count(), 2);
        assert_eq!(store.products_row_count(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, _) = write_fixture(dir.path());

        let result = MemoryStore::load(&orders, &dir.path().join("nope.csv"));
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[test]
    fn test_reload_yields_identical_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, products) = write_fixture(dir.path());

        let first = MemoryStore::load(&orders, &products).unwrap();
        let second = MemoryStore::load(&orders, &products).unwrap();

        assert_eq!(first.orders_row_count(), second.orders_row_count());
        assert_eq!(first.products_row_count(), second.products_row_count());
        assert_eq!(
            first.orders.schema.fields().len(),
            second.orders.schema.fields().len()
        );
    }

    #[test]
    fn test_join_query_runs_against_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, products) = write_fixture(dir.path());
        let store = MemoryStore::load(&orders, &products).unwrap();

        let table = store
            .execute_sql(
                "SELECT p.category, SUM(o.profit) AS total_profit \
                 FROM products p JOIN orders o ON p.product_id = o.product_id \
                 GROUP BY p.category",
            )
            .unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_names(), vec!["category", "total_profit"]);
        assert_eq!(table.rows[0].values[1].as_float(), Some(25.0));
    }

    #[test]
    fn test_malformed_sql_is_a_recoverable_error() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, products) = write_fixture(dir.path());
        let store = MemoryStore::load(&orders, &products).unwrap();

        assert!(store.execute_sql("SELEC nonsense FROM nowhere").is_err());
        // The store is still usable afterwards
        assert!(store.execute_sql("SELECT * FROM orders").is_ok());
    }

    #[test]
    fn test_empty_result_keeps_output_schema() {
        let dir = tempfile::tempdir().unwrap();
        let (orders, products) = write_fixture(dir.path());
        let store = MemoryStore::load(&orders, &products).unwrap();

        let table = store
            .execute_sql("SELECT region FROM orders WHERE profit > 9999")
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["region"]);
    }
}
