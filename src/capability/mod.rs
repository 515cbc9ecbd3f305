//! Query Validation for Read-Only Operations
//!
//! This module decides whether a SQL string may run against the database.
//! asksql never writes: generated SQL is untrusted until it passes [`validate`].
//!
//! # Validation Strategy
//! - Leading keyword must be one of `SELECT`, `SHOW`, `DESCRIBE`, `DESC`
//! - No occurrence of `INSERT`, `UPDATE`, `DELETE`, `DROP`, `ALTER`, `CREATE`
//!   anywhere in the text, as a plain case-insensitive substring
//!
//! The substring scan is deliberately coarse. It rejects a keyword inside a
//! string literal or an identifier such as `created_at`, and it does not see
//! through comments that split a keyword. Both behaviors are relied upon.

use std::fmt;

use thiserror::Error;

/// Statement keywords permitted to execute
pub const SAFE_PREFIXES: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "DESC"];

/// Mutation keywords whose presence rejects a query
pub const FORBIDDEN_KEYWORDS: [&str; 6] = ["INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE"];

/// Sentinel query returned when no SQL line could be extracted from the model output
pub const COULD_NOT_GENERATE_SQL: &str = "SELECT 'Error: Could not generate SQL';";

/// Sentinel query returned when the extracted SQL contains a forbidden keyword
pub const FORBIDDEN_KEYWORD_DETECTED: &str = "SELECT 'Error: Forbidden SQL keyword detected';";

/// Why a query was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Query does not start with a safe statement keyword
    #[error("query does not start with SELECT, SHOW, DESCRIBE or DESC")]
    NotSafePrefix,

    /// Query contains a mutation keyword somewhere in its text
    #[error("query contains a forbidden keyword")]
    ForbiddenKeywordPresent,
}

impl RejectionReason {
    /// Stable code for this rejection
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotSafePrefix => "NOT_SAFE_PREFIX",
            Self::ForbiddenKeywordPresent => "FORBIDDEN_KEYWORD_PRESENT",
        }
    }
}

/// A query that passed read-only validation
///
/// The only ways to obtain one are [`validate`] and the sentinel constructors
/// below, which hold queries that themselves pass [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery(String);

impl ValidatedQuery {
    /// The sentinel used when the model output held no SQL-looking line
    #[must_use]
    pub fn could_not_generate() -> Self {
        Self(COULD_NOT_GENERATE_SQL.to_string())
    }

    /// The sentinel used when the selected line contained a forbidden keyword
    #[must_use]
    pub fn forbidden_keyword() -> Self {
        Self(FORBIDDEN_KEYWORD_DETECTED.to_string())
    }

    /// Query text, exactly as validated
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the error-carrying sentinel queries
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.0 == COULD_NOT_GENERATE_SQL || self.0 == FORBIDDEN_KEYWORD_DETECTED
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidatedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// True iff the trimmed, uppercased query starts with a safe keyword
#[must_use]
pub fn is_read_only_prefix(sql: &str) -> bool {
    let upper = sql.trim().to_uppercase();
    SAFE_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}

/// True iff the uppercased query contains any forbidden keyword as a substring
#[must_use]
pub fn contains_forbidden_keyword(sql: &str) -> bool {
    let upper = sql.to_uppercase();
    FORBIDDEN_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

/// Validate a query is read-only
///
/// The prefix check runs first, so a query failing both checks reports
/// [`RejectionReason::NotSafePrefix`]. The accepted text is kept unchanged.
pub fn validate(sql: &str) -> Result<ValidatedQuery, RejectionReason> {
    if !is_read_only_prefix(sql) {
        return Err(RejectionReason::NotSafePrefix);
    }

    if contains_forbidden_keyword(sql) {
        return Err(RejectionReason::ForbiddenKeywordPresent);
    }

    Ok(ValidatedQuery(sql.to_string()))
}
