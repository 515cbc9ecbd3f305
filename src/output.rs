//! Answer Output
//!
//! Every question produces exactly one [`Answer`], success or not. Answers are
//! written to stdout as text for people or as one JSON object per line for
//! scripts. Logs never go to stdout.
//!
//! # Output Contract
//! - Text: `SQL Generated: <sql>` followed by `Result: <result>`
//! - JSON: `{"question": "...", "sql": "...", "result": "..."}`

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// One question/answer cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Question as the user typed it
    pub question: String,

    /// Query that was executed (possibly a sentinel error-query)
    pub sql: String,

    /// Rendered result, or an error message rendered as a result
    pub result: String,
}

impl Answer {
    pub fn new(
        question: impl Into<String>,
        sql: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self { question: question.into(), sql: sql.into(), result: result.into() }
    }
}

/// How answers are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One compact JSON object per answer
    Json,
}

impl OutputFormat {
    /// Format an answer for printing
    #[must_use]
    pub fn format(self, answer: &Answer) -> String {
        match self {
            Self::Text => format!("\nSQL Generated: {}\n\nResult: {}", answer.sql, answer.result),
            // Serializing three strings cannot fail
            Self::Json => serde_json::to_string(answer).unwrap_or_default(),
        }
    }

    /// Write an answer followed by a newline
    pub fn write(self, out: &mut impl Write, answer: &Answer) -> io::Result<()> {
        writeln!(out, "{}", self.format(answer))?;
        out.flush()
    }
}
