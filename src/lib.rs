//! asksql - Ask a MySQL database questions in plain language
//!
//! asksql turns a natural-language question into a read-only SQL query with a
//! text-generation model, runs it, and prints the rows.
//!
//! # Core Principles
//! - Read-only, always: generated SQL is untrusted until validated
//! - Errors are answers: nothing inside a question/answer cycle ends the process
//! - Live schema: table names are read fresh for every question
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`capability`] - Read-only validation and sentinel queries
//! - [`engine`] - Database trait and the MySQL engine
//! - [`schema`] - Table snapshot used to ground prompts
//! - [`completion`] - Text-generation client with retry
//! - [`translator`] - Question to validated query
//! - [`executor`] - Query execution and rendering
//! - [`session`] - Interactive loop
//! - [`output`] - Answer printing
//! - [`config`] - Flags and environment
//! - [`logging`] - tracing subscriber setup

pub mod capability;
pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod schema;
pub mod session;
pub mod translator;

// Re-export commonly used types for convenience
pub use capability::{
    contains_forbidden_keyword, is_read_only_prefix, validate, RejectionReason, ValidatedQuery,
};
pub use completion::{CompletionClient, GeminiGenerator, RetryPolicy, TextGenerator};
pub use config::{ConfigArgs, Settings};
pub use engine::{mysql::MySqlDatabase, ConnectionConfig, Database, QueryResult, TableName};
pub use error::{AskSqlError, Result};
pub use executor::QueryExecutor;
pub use output::{Answer, OutputFormat};
pub use schema::SchemaSnapshot;
pub use session::Session;
pub use translator::Translator;
