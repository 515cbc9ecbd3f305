//! Natural language to SQL translation
//!
//! Model output is untrusted free-form text. It moves through
//! `raw text → candidate lines → selected candidate → validated | rejected`,
//! each step a pure function so it can be tested without a backend.
//! Rejections never surface as errors: they become sentinel queries that the
//! executor runs and displays like any other result.

use tracing::{debug, info};

use crate::capability::{self, RejectionReason, ValidatedQuery, FORBIDDEN_KEYWORDS};
use crate::completion::{CompletionClient, TextGenerator};
use crate::engine::Database;
use crate::error::Result;
use crate::schema::SchemaSnapshot;

/// Turns questions into validated read-only queries
pub struct Translator<'a, D, G> {
    db: &'a D,
    completion: &'a CompletionClient<G>,
}

impl<'a, D: Database, G: TextGenerator> Translator<'a, D, G> {
    pub fn new(db: &'a D, completion: &'a CompletionClient<G>) -> Self {
        Self { db, completion }
    }

    /// Translate a question into a query that is safe to run
    ///
    /// Fails only if the table list cannot be read.
    pub async fn translate(&self, question: &str) -> Result<ValidatedQuery> {
        let schema = SchemaSnapshot::capture(self.db).await?;
        let prompt = build_prompt(&schema, question);

        let response = self.completion.complete(&prompt).await;
        let query = finalize(select_candidate(&candidate_lines(&response)));

        info!(sql = %query, sentinel = query.is_sentinel(), "translated question");
        Ok(query)
    }
}

/// Build the constrained prompt sent to the model
#[must_use]
pub fn build_prompt(schema: &SchemaSnapshot, question: &str) -> String {
    format!(
        "You are a MySQL assistant. Write one SAFE SQL query using only the tables in this database: {tables}.\n\
         - Only use SELECT, SHOW, DESCRIBE statements.\n\
         - Never modify data (no {forbidden}).\n\
         - Return ONLY the SQL query. Do not include explanations or placeholders.\n\
         - Use only real table and column names from this database.\n\
         \n\
         User question:\n\
         {question}\n",
        tables = schema.table_list(),
        forbidden = FORBIDDEN_KEYWORDS.join(", "),
    )
}

/// Split raw model output into lines stripped of backtick and whitespace decoration
#[must_use]
pub fn candidate_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(|line| line.trim_matches(|c: char| c == '`' || c.is_whitespace()))
        .collect()
}

/// First line that starts with a safe keyword, in original order
#[must_use]
pub fn select_candidate<'r>(lines: &[&'r str]) -> Option<&'r str> {
    lines.iter().copied().find(|line| capability::is_read_only_prefix(line))
}

/// Validate the selected line, substituting a sentinel on rejection
#[must_use]
pub fn finalize(candidate: Option<&str>) -> ValidatedQuery {
    let Some(candidate) = candidate else {
        debug!("no SQL line in model output");
        return ValidatedQuery::could_not_generate();
    };

    match capability::validate(candidate) {
        Ok(query) => query,
        Err(reason) => {
            debug!(candidate, reason = reason.code(), "candidate rejected");
            match reason {
                RejectionReason::ForbiddenKeywordPresent => ValidatedQuery::forbidden_keyword(),
                RejectionReason::NotSafePrefix => ValidatedQuery::could_not_generate(),
            }
        }
    }
}
