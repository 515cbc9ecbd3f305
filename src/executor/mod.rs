//! Query execution and result rendering
//!
//! The executor is the last line of defense: it re-checks the safe prefix
//! before anything reaches the database. Every outcome, including backend
//! faults, comes back as display text.

use std::time::Duration;

use tracing::{debug, warn};

use crate::capability::{self, ValidatedQuery};
use crate::engine::{Database, QueryResult};
use crate::error::AskSqlError;

/// Rows shown before truncating
pub const DEFAULT_MAX_DISPLAY_ROWS: usize = 20;

/// Returned when a query yields no rows
pub const NO_ROWS_FOUND: &str = "No rows found.";

/// Returned when the safe-prefix re-check fails
pub const ONLY_READ_STATEMENTS: &str = "Only SELECT, SHOW, DESCRIBE are allowed.";

/// Separator width per column
const SEPARATOR_WIDTH_PER_COLUMN: usize = 15;

/// Runs validated queries and formats their results
pub struct QueryExecutor<'a, D> {
    db: &'a D,
    max_display_rows: usize,
    timeout: Option<Duration>,
}

impl<'a, D: Database> QueryExecutor<'a, D> {
    pub fn new(db: &'a D) -> Self {
        Self { db, max_display_rows: DEFAULT_MAX_DISPLAY_ROWS, timeout: None }
    }

    #[must_use]
    pub fn with_max_display_rows(mut self, max_display_rows: usize) -> Self {
        self.max_display_rows = max_display_rows;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute a query and render the outcome
    pub async fn execute(&self, query: &ValidatedQuery) -> String {
        if !capability::is_read_only_prefix(query.as_str()) {
            warn!(sql = %query, "refusing query without a safe prefix");
            return ONLY_READ_STATEMENTS.to_string();
        }

        match self.fetch(query).await {
            Ok(result) => {
                debug!(rows = result.total_rows(), "query executed");
                render(&result, self.max_display_rows)
            }
            Err(err) => {
                warn!(error_code = err.error_code(), error = %err, "query failed");
                render_error(&err)
            }
        }
    }

    async fn fetch(&self, query: &ValidatedQuery) -> crate::error::Result<QueryResult> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.db.fetch_rows(query))
                .await
                .map_err(|_| {
                    AskSqlError::query_failed(format!(
                        "Query exceeded timeout of {}ms",
                        timeout.as_millis()
                    ))
                })?,
            None => self.db.fetch_rows(query).await,
        }
    }
}

/// Render a result as a pipe-separated table with a row count
#[must_use]
pub fn render(result: &QueryResult, max_display_rows: usize) -> String {
    if result.is_empty() {
        return NO_ROWS_FOUND.to_string();
    }

    let columns = result.columns();
    let mut lines = Vec::with_capacity(result.total_rows().min(max_display_rows) + 4);

    lines.push(columns.join(" | "));
    lines.push("-".repeat(columns.len() * SEPARATOR_WIDTH_PER_COLUMN));

    for row in result.rows.iter().take(max_display_rows) {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| row.get(*column).map_or_else(|| "NULL".to_string(), display_value))
            .collect();
        lines.push(cells.join(" | "));
    }

    let total = result.total_rows();
    if total > max_display_rows {
        lines.push(format!("\n... and {} more rows", total - max_display_rows));
    }
    lines.push(format!("\nTotal rows: {total}"));

    lines.join("\n")
}

/// Render an execution fault as an answer
#[must_use]
pub fn render_error(err: &AskSqlError) -> String {
    match err {
        AskSqlError::QueryFailed(detail) => format!("SQL Error: {detail}"),
        other => format!("SQL Error: {}", other.message()),
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
