//! Query stores.
//!
//! A store materializes the loaded datasets into a relational engine and
//! executes literal SQL against it. The engine is a black box to the rest
//! of the application: callers hand over a query string and get back a
//! [`ResultTable`](crate::table::ResultTable) or a [`StoreError`].

mod conversion;
mod error;
mod memory;
mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::table::ResultTable;

/// Executes literal SQL strings against a relational store.
///
/// A query failure is recoverable: the page render loop reports it and
/// moves on to the next section.
pub trait QueryStore {
    fn execute_sql(&self, sql: &str) -> Result<ResultTable>;

    /// Short human-readable description of the backend, shown in the
    /// TUI header.
    fn describe(&self) -> String;
}
