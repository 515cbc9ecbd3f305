//! Shared test doubles for the database and the generation backend

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use asksql::engine::Row;
use asksql::{
    AskSqlError, Database, QueryResult, RetryPolicy, TableName, TextGenerator, ValidatedQuery,
};

/// In-memory database: a mutable table list and a fixed result per query
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Vec<String>>,
    results: Mutex<Vec<(String, QueryResult)>>,
    unreachable: bool,
    executed: Mutex<Vec<String>>,
}

impl MemoryDatabase {
    pub fn with_tables(tables: &[&str]) -> Self {
        Self {
            tables: Mutex::new(tables.iter().map(|t| (*t).to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::default() }
    }

    pub fn set_tables(&self, tables: &[&str]) {
        *self.tables.lock().unwrap() = tables.iter().map(|t| (*t).to_string()).collect();
    }

    pub fn add_result(&self, sql: &str, result: QueryResult) {
        self.results.lock().unwrap().push((sql.to_string(), result));
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Database for MemoryDatabase {
    async fn ping(&self) -> asksql::Result<()> {
        if self.unreachable {
            return Err(AskSqlError::connection_failed("connection refused"));
        }
        Ok(())
    }

    async fn list_tables(&self) -> asksql::Result<Vec<TableName>> {
        if self.unreachable {
            return Err(AskSqlError::connection_failed("connection refused"));
        }
        Ok(self.tables.lock().unwrap().iter().map(TableName::new).collect())
    }

    async fn fetch_rows(&self, query: &ValidatedQuery) -> asksql::Result<QueryResult> {
        self.executed.lock().unwrap().push(query.as_str().to_string());

        if query.is_sentinel() {
            // What MySQL returns for SELECT '<message>'
            let message = query.as_str().trim_start_matches("SELECT '").trim_end_matches("';");
            let mut row = Row::new();
            row.insert(message.to_string(), serde_json::Value::String(message.to_string()));
            return Ok(QueryResult::new(vec![row]));
        }

        self.results
            .lock()
            .unwrap()
            .iter()
            .find(|(sql, _)| sql == query.as_str())
            .map(|(_, result)| result.clone())
            .ok_or_else(|| AskSqlError::query_failed(format!("Unknown query: {}", query.as_str())))
    }
}

/// Generator that replays scripted replies and records prompts
pub struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

pub struct GeneratorProbe {
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<AtomicUsize>,
}

impl GeneratorProbe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl ScriptedGenerator {
    /// Replies are returned in order; the last one repeats
    pub fn new(replies: &[&str]) -> (Self, GeneratorProbe) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Self {
            replies: Mutex::new(replies.iter().rev().map(|r| (*r).to_string()).collect()),
            prompts: Arc::clone(&prompts),
            calls: Arc::clone(&calls),
        };
        (generator, GeneratorProbe { prompts, calls })
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, _model: &str, prompt: &str) -> asksql::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 { replies.pop() } else { replies.last().cloned() };
        Ok(reply.unwrap_or_default())
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, delay: Duration::ZERO }
}

pub fn rows(n: usize) -> QueryResult {
    QueryResult::new(
        (1..=n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("id".to_string(), serde_json::json!(i));
                row.insert("name".to_string(), serde_json::json!(format!("user{i}")));
                row
            })
            .collect(),
    )
}
