//! MySQL Database Engine Implementation
//!
//! This module implements the [`Database`] trait for MySQL (including MariaDB).
//!
//! # Implementation Notes
//! - Uses `mysql_async` (async driver, requires tokio runtime)
//! - One `Pool` per process, created by the application root and disconnected at shutdown
//! - Each operation checks out one pooled `Conn`; dropping it returns it to the pool
//! - Table names come from `SHOW TABLES` on every call
//! - BLOB data is Base64-encoded, dates and times become strings

use mysql_async::{prelude::*, Conn, OptsBuilder, Pool, Row, Value};
use tracing::{debug, info};

use crate::capability::ValidatedQuery;
use crate::engine::{ConnectionConfig, Database, QueryResult, TableName};
use crate::error::{AskSqlError, Result};

/// MySQL database engine backed by a connection pool
pub struct MySqlDatabase {
    pool: Pool,
}

impl MySqlDatabase {
    /// Create the pool and verify the server answers
    ///
    /// Fails with `ConnectionFailed` if the server cannot be reached; the pool
    /// is torn down before returning in that case.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let opts = build_mysql_opts(config)?;
        let database = Self { pool: Pool::new(opts) };

        if let Err(err) = database.ping().await {
            // Best effort; the connect error is what the operator needs to see.
            let _ = database.pool.disconnect().await;
            return Err(err);
        }

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to MySQL"
        );
        Ok(database)
    }

    /// Disconnect every pooled connection
    ///
    /// Called once at shutdown.
    pub async fn close(self) -> Result<()> {
        self.pool.disconnect().await.map_err(|e| {
            AskSqlError::engine_error("mysql", format!("Failed to disconnect pool: {e}"))
        })?;
        info!("MySQL connection closed");
        Ok(())
    }

    async fn get_conn(&self) -> Result<Conn> {
        self.pool.get_conn().await.map_err(|e| {
            AskSqlError::connection_failed(format!("Failed to connect to MySQL: {e}"))
        })
    }
}

impl Database for MySqlDatabase {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;

        let row: Row = conn
            .query_first("SELECT 1")
            .await
            .map_err(|e| AskSqlError::connection_failed(format!("Failed to query MySQL: {e}")))?
            .ok_or_else(|| AskSqlError::connection_failed("No row returned for SELECT 1"))?;

        match row.get::<i64, _>(0) {
            Some(1) => Ok(()),
            _ => Err(AskSqlError::connection_failed("Unexpected reply to SELECT 1")),
        }
    }

    async fn list_tables(&self) -> Result<Vec<TableName>> {
        let mut conn = self.get_conn().await?;

        let rows: Vec<Row> = conn.query("SHOW TABLES").await.map_err(|e| {
            AskSqlError::engine_error("mysql", format!("Failed to query tables: {e}"))
        })?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let table_name: String = row.get(0).ok_or_else(|| {
                AskSqlError::engine_error("mysql", "Failed to extract table name")
            })?;
            tables.push(TableName::new(table_name));
        }

        debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    async fn fetch_rows(&self, query: &ValidatedQuery) -> Result<QueryResult> {
        let mut conn = self.get_conn().await?;

        let rows: Vec<Row> = conn
            .query(query.as_str())
            .await
            .map_err(|e| AskSqlError::query_failed(e.to_string()))?;

        let mut rows_data = Vec::with_capacity(rows.len());
        for row in &rows {
            rows_data.push(row_to_json(row)?);
        }

        Ok(QueryResult::new(rows_data))
    }
}

/// Build MySQL connection options from ConnectionConfig
fn build_mysql_opts(config: &ConnectionConfig) -> Result<OptsBuilder> {
    if config.host.trim().is_empty() {
        return Err(AskSqlError::invalid_input("MySQL requires a 'host' parameter"));
    }

    if config.database.trim().is_empty() {
        return Err(AskSqlError::invalid_input("MySQL requires a 'database' parameter"));
    }

    let opts = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()));

    Ok(opts)
}

/// Convert a MySQL row to an ordered column map
fn row_to_json(row: &Row) -> Result<crate::engine::Row> {
    let mut map = crate::engine::Row::new();

    for (idx, column) in row.columns_ref().iter().enumerate() {
        let value = mysql_value_to_json(row, idx)?;
        map.insert(column.name_str().to_string(), value);
    }

    Ok(map)
}

/// Convert MySQL value to JSON value
fn mysql_value_to_json(row: &Row, idx: usize) -> Result<serde_json::Value> {
    let value = row.as_ref(idx).ok_or_else(|| {
        AskSqlError::query_failed(format!("Failed to get value at index {idx}"))
    })?;

    Ok(value_to_json(value))
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::NULL => serde_json::Value::Null,

        Value::Bytes(bytes) => {
            if let Ok(s) = std::str::from_utf8(bytes) {
                serde_json::Value::String(s.to_string())
            } else {
                use base64::Engine;
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }

        Value::Int(i) => serde_json::Value::Number((*i).into()),

        Value::UInt(u) => serde_json::json!(*u),

        // NaN/Infinity have no JSON form
        Value::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map_or(serde_json::Value::Null, serde_json::Value::Number),

        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),

        Value::Date(year, month, day, hour, minute, second, micro) => {
            serde_json::Value::String(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micro:06}"
            ))
        }

        Value::Time(is_negative, days, hours, minutes, seconds, microseconds) => {
            let sign = if *is_negative { "-" } else { "" };
            let total_hours = days * 24 + u32::from(*hours);
            serde_json::Value::String(format!(
                "{sign}{total_hours}:{minutes:02}:{seconds:02}.{microseconds:06}"
            ))
        }
    }
}
