//! Database Engine Trait and Core Types
//!
//! This module defines the database collaborator used by the translator and
//! the executor. [`mysql::MySqlDatabase`] is the production implementation.
//!
//! # Pooled Design
//! An engine owns a connection pool created once by the application root.
//! Every trait method acquires one connection for the duration of that single
//! operation and releases it when done, error paths included.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::capability::ValidatedQuery;
use crate::error::Result;

pub mod mysql;

/// Name of a table in the connected database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection configuration for the MySQL engine
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Hostname
    pub host: String,

    /// Port number
    pub port: u16,

    /// Username
    pub user: String,

    /// Password
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: String,

    /// Database (schema) name
    pub database: String,
}

impl ConnectionConfig {
    /// Create a new `MySQL` connection config
    #[must_use]
    pub const fn mysql(
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    ) -> Self {
        Self { host, port, user, password, database }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// One result row: column name to value, in column order
pub type Row = IndexMap<String, serde_json::Value>;

/// Query execution result
///
/// Holds every fetched row; display truncation happens in the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result rows (each row is an ordered map of column name to value)
    pub rows: Vec<Row>,
}

impl QueryResult {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Column names, taken from the first row
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// True number of rows fetched
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Database engine trait
///
/// Implementations must be usable by shared reference; each call is an
/// independent, scoped use of the underlying pool.
pub trait Database {
    /// Verify the database answers a trivial query
    fn ping(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// List the tables of the connected database as they exist right now
    ///
    /// No caching: the schema may change between questions.
    fn list_tables(&self) -> impl std::future::Future<Output = Result<Vec<TableName>>> + Send;

    /// Run a validated query and fetch all of its rows
    fn fetch_rows(
        &self,
        query: &ValidatedQuery,
    ) -> impl std::future::Future<Output = Result<QueryResult>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn test_connection_config_constructor() {
        let config = ConnectionConfig::mysql(
            "localhost".to_string(),
            3306,
            "root".to_string(),
            "secret".to_string(),
            "test".to_string(),
        );
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, "test");
    }

    #[test]
    fn test_connection_config_debug_redacts_password() {
        let config = ConnectionConfig::mysql(
            "localhost".to_string(),
            3306,
            "root".to_string(),
            "hunter2".to_string(),
            "test".to_string(),
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_columns_follow_insertion_order() {
        let result = QueryResult::new(vec![row(&[
            ("zeta", json!(1)),
            ("alpha", json!("a")),
            ("mid", json!(null)),
        ])]);
        assert_eq!(result.columns(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::default();
        assert!(result.is_empty());
        assert_eq!(result.total_rows(), 0);
        assert!(result.columns().is_empty());
    }

    #[test]
    fn test_table_name_serializes_as_string() {
        let name = TableName::new("users");
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""users""#);
        assert_eq!(name.to_string(), "users");
    }
}
