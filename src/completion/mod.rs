//! Completion Client
//!
//! Wraps one call to a text-generation backend with bounded retry.
//!
//! # Retry Behavior
//! An attempt fails when the backend returns an error, when the blocking
//! worker running it panics, or when the returned text starts with
//! [`FAILURE_MARKER`]. Errors are turned into a marker-prefixed payload, so
//! callers only ever see text. After the last attempt the final failure
//! payload is returned as-is; callers must inspect content.
//!
//! Attempts are separated by a fixed delay. Backends are synchronous and run
//! on tokio's blocking pool so a slow call never stalls the runtime.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;

pub mod gemini;

pub use gemini::GeminiGenerator;

/// Prefix marking a failed completion payload
pub const FAILURE_MARKER: &str = "❌";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// Text-generation backend
///
/// `generate` blocks the calling thread until the backend answers.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Retry bound and delay for completion calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Wait between a failed attempt and the next one
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, delay: Duration::from_secs(2) }
    }
}

/// True iff the payload is a failure report rather than model output
#[must_use]
pub fn is_failure(payload: &str) -> bool {
    payload.starts_with(FAILURE_MARKER)
}

fn failure_payload(detail: impl std::fmt::Display) -> String {
    format!("{FAILURE_MARKER} Completion API error: {detail}")
}

/// Text-generation client with bounded retry
pub struct CompletionClient<G> {
    generator: Arc<G>,
    model: String,
    policy: RetryPolicy,
}

impl<G: TextGenerator> CompletionClient<G> {
    pub fn new(generator: G, model: impl Into<String>, policy: RetryPolicy) -> Self {
        Self { generator: Arc::new(generator), model: model.into(), policy }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete a prompt, retrying failed attempts
    pub async fn complete(&self, prompt: &str) -> String {
        let attempts = self.policy.max_attempts.max(1);
        let mut payload = String::new();

        for attempt in 1..=attempts {
            payload = self.attempt(prompt).await;
            if !is_failure(&payload) {
                debug!(attempt, chars = payload.len(), "completion succeeded");
                return payload;
            }

            if attempt < attempts {
                warn!(attempt, max_attempts = attempts, "model busy or API error, retrying");
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        warn!(attempts, "completion retries exhausted");
        payload
    }

    async fn attempt(&self, prompt: &str) -> String {
        let generator = Arc::clone(&self.generator);
        let model = self.model.clone();
        let prompt = prompt.to_owned();

        match tokio::task::spawn_blocking(move || generator.generate(&model, &prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => failure_payload(err),
            Err(join_err) => failure_payload(format!("completion worker failed: {join_err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AskSqlError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted outcomes, then repeats the last one
    struct ScriptedGenerator {
        outcomes: Mutex<Vec<std::result::Result<String, String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedGenerator {
        fn new(outcomes: Vec<std::result::Result<&str, &str>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let outcomes = outcomes
                .into_iter()
                .rev()
                .map(|o| o.map(str::to_string).map_err(str::to_string))
                .collect();
            (Self { outcomes: Mutex::new(outcomes), calls: Arc::clone(&calls) }, calls)
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            let outcome = if outcomes.len() > 1 {
                outcomes.pop().unwrap()
            } else {
                outcomes.last().cloned().unwrap()
            };
            outcome.map_err(AskSqlError::completion_failed)
        }
    }

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy { max_attempts, delay: Duration::ZERO }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_is_failure() {
        assert!(is_failure("❌ quota exceeded"));
        assert!(!is_failure("SELECT 1"));
        assert!(!is_failure(" ❌ leading space is model output"));
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let (generator, calls) = ScriptedGenerator::new(vec![Ok("SELECT 1")]);
        let client = CompletionClient::new(generator, DEFAULT_MODEL, no_delay(3));

        assert_eq!(client.complete("prompt").await, "SELECT 1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_always_failing_called_exactly_max_attempts() {
        let (generator, calls) = ScriptedGenerator::new(vec![Ok("❌ model overloaded")]);
        let client = CompletionClient::new(generator, DEFAULT_MODEL, no_delay(3));

        let payload = client.complete("prompt").await;
        assert_eq!(payload, "❌ model overloaded");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_faults_are_retried_and_returned_as_text() {
        let (generator, calls) = ScriptedGenerator::new(vec![Err("503 Service Unavailable")]);
        let client = CompletionClient::new(generator, DEFAULT_MODEL, no_delay(4));

        let payload = client.complete("prompt").await;
        assert!(is_failure(&payload));
        assert!(payload.contains("503 Service Unavailable"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let (generator, calls) =
            ScriptedGenerator::new(vec![Err("timeout"), Ok("❌ busy"), Ok("SHOW TABLES")]);
        let client = CompletionClient::new(generator, DEFAULT_MODEL, no_delay(3));

        assert_eq!(client.complete("prompt").await, "SHOW TABLES");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let (generator, calls) = ScriptedGenerator::new(vec![Ok("SELECT 1")]);
        let client = CompletionClient::new(generator, DEFAULT_MODEL, no_delay(0));

        assert_eq!(client.complete("prompt").await, "SELECT 1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_backend_becomes_failure_payload() {
        struct Panicking;
        impl TextGenerator for Panicking {
            fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
                panic!("backend bug");
            }
        }

        let client = CompletionClient::new(Panicking, DEFAULT_MODEL, no_delay(2));
        let payload = client.complete("prompt").await;
        assert!(is_failure(&payload));
        assert!(payload.contains("completion worker failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts_only() {
        let (generator, _calls) = ScriptedGenerator::new(vec![Ok("❌ busy")]);
        let policy = RetryPolicy { max_attempts: 3, delay: Duration::from_secs(2) };
        let client = CompletionClient::new(generator, DEFAULT_MODEL, policy);

        let start = tokio::time::Instant::now();
        client.complete("prompt").await;
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}
