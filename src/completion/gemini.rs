//! Gemini `generateContent` backend
//!
//! Blocking HTTP client, meant to run on a blocking worker thread. The client
//! is built per call so it is created and dropped on that thread.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::completion::TextGenerator;
use crate::error::{AskSqlError, Result};

/// Public Gemini API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Text generator backed by the Gemini REST API
pub struct GeminiGenerator {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: DEFAULT_BASE_URL.to_string(), timeout: None }
    }

    /// Point the generator at another endpoint (proxies, test servers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bound each HTTP request
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_path(model)
        )
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            AskSqlError::completion_failed(format!("failed to build http client: {e}"))
        })?;

        let request = GenerateRequest {
            contents: vec![Content { parts: vec![RequestPart { text: prompt }] }],
        };

        let response = client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| AskSqlError::completion_failed(http_error_detail(&e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(AskSqlError::completion_failed(format!(
                "Gemini API error {status}: {text}"
            )));
        }

        let body: GenerateResponse = response.json().map_err(|e| {
            AskSqlError::completion_failed(format!("Gemini returned invalid JSON: {e}"))
        })?;

        extract_text(body)
    }
}

/// Model ids are addressed as `models/<name>`
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn extract_text(body: GenerateResponse) -> Result<String> {
    let content = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| AskSqlError::completion_failed("Empty response from Gemini"))?;

    Ok(content.parts.into_iter().map(|part| part.text).collect())
}

fn http_error_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timeout: {err}")
    } else if err.is_connect() {
        format!("Connection failed: {err}")
    } else {
        err.to_string()
    }
}
