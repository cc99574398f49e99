pub mod catalog;
pub mod chart;
pub mod cli;
pub mod config;
pub mod export;
pub mod logging;
pub mod report;
pub mod store;
pub mod table;
pub mod tui;

pub use catalog::{Catalog, NamedQuery, Page};
pub use store::{MemoryStore, PostgresStore, QueryStore, StoreError};
pub use table::{Column, DataType, ResultTable, Row, Schema, Value};
