//! Remote Postgres store.
//!
//! Mirrors the in-memory store's contract against a remote relational
//! endpoint: one connection is opened per query and closed afterwards.
//! No pooling, no retry, no timeout handling. Credentials come from the
//! environment with hardcoded fallback defaults.

use std::sync::Arc;

use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, TypeInfo};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::table::{Column, DataType, ResultTable, Row, Schema, Value};

use super::error::{Result, StoreError};
use super::QueryStore;

pub struct PostgresStore {
    runtime: Arc<Runtime>,
    config: RemoteConfig,
}

impl PostgresStore {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(StoreError::Io)?,
        );

        Ok(Self { runtime, config })
    }
}

impl QueryStore for PostgresStore {
    fn execute_sql(&self, sql: &str) -> Result<ResultTable> {
        debug!(sql, host = %self.config.host, "executing against postgres");

        self.runtime.block_on(async {
            let mut conn = PgConnection::connect(&self.config.connection_string())
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let fetched = sqlx::query(sql)
                .fetch_all(&mut conn)
                .await
                .map_err(|e| StoreError::Query(format_query_error(e)));

            conn.close().await.ok();

            rows_to_table(&fetched?)
        })
    }

    fn describe(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.config.user, self.config.host, self.config.port, self.config.database
        )
    }
}

/// Without a row there is no column metadata to report, so an empty
/// result set comes back with an empty schema.
fn rows_to_table(rows: &[PgRow]) -> Result<ResultTable> {
    let Some(first) = rows.first() else {
        return Ok(ResultTable::new(Schema::empty()));
    };

    let columns = first
        .columns()
        .iter()
        .map(|col| Column::new(col.name(), map_pg_type(col.type_info().name())))
        .collect();
    let schema = Schema::new(columns);

    let converted = rows
        .iter()
        .map(|row| {
            let values = row
                .columns()
                .iter()
                .enumerate()
                .map(|(i, col)| convert_value(row, i, col.type_info().name()))
                .collect();
            Row::new(values)
        })
        .collect();

    Ok(ResultTable::with_rows(schema, converted))
}

fn map_pg_type(type_name: &str) -> DataType {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => DataType::Boolean,
        "INT2" | "SMALLINT" | "INT4" | "INT" | "INTEGER" | "INT8" | "BIGINT" => DataType::Integer,
        "FLOAT4" | "REAL" | "FLOAT8" | "DOUBLE PRECISION" => DataType::Float,
        _ => DataType::String,
    }
}

fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Boolean)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Integer(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Integer(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Integer)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // Everything else decodes as text if it can
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
