//! Single-endpoint retry wrapper: "is this one model callable via
//! `/responses`?"
//!
//! A simplified convenience path next to the full sweep. Attempts are
//! bounded with a fixed inter-attempt delay; the delay function is
//! injectable so tests run without real time passing.

use crate::diag::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::time::Duration;

/// Terminal failure taxonomy, classified by ordered substring match on the
/// last error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ModelNotFoundOrNotAllowed,
    AuthFailed,
    EndpointNotSupported,
    Timeout,
    OtherError,
}

impl ErrorKind {
    /// Classify an error message. Match order matters: "model" outranks the
    /// status-code buckets.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("model") {
            ErrorKind::ModelNotFoundOrNotAllowed
        } else if msg.contains("401") || msg.contains("403") {
            ErrorKind::AuthFailed
        } else if msg.contains("404") {
            ErrorKind::EndpointNotSupported
        } else if msg.contains("timeout") || msg.contains("timed out") {
            ErrorKind::Timeout
        } else {
            ErrorKind::OtherError
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ModelNotFoundOrNotAllowed => "model_not_found_or_not_allowed",
            ErrorKind::AuthFailed => "auth_failed",
            ErrorKind::EndpointNotSupported => "endpoint_not_supported",
            ErrorKind::Timeout => "timeout",
            ErrorKind::OtherError => "other_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt bounds for the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts.
    pub retries: u32,
    /// Fixed delay between attempts.
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            wait: Duration::from_secs(2),
        }
    }
}

/// Result record of one model test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTestReport {
    pub model: String,
    pub ok: bool,
    /// Endpoint the wrapper exercised.
    pub endpoint: String,
    /// Empty on success; `"<kind>: <raw message>"` on exhaustion.
    pub error: String,
}

/// Test whether `model` answers on `<base>/responses`, with retries.
///
/// Blocking, including the inter-attempt sleep. Callers needing
/// cancellation run the whole loop on a background task and stop awaiting
/// it; the wrapper carries no cancellation token of its own.
#[must_use]
pub fn test_model(
    transport: &dyn Transport,
    base_url: &str,
    model: &str,
    policy: RetryPolicy,
) -> ModelTestReport {
    test_model_with(transport, base_url, model, policy, std::thread::sleep)
}

/// [`test_model`] with an injectable delay function.
#[must_use]
pub fn test_model_with(
    transport: &dyn Transport,
    base_url: &str,
    model: &str,
    policy: RetryPolicy,
    mut sleep: impl FnMut(Duration),
) -> ModelTestReport {
    let url = format!("{}/responses", base_url.trim_end_matches('/'));
    let payload = json!({"model": model, "input": "ping"});

    let mut last_err = String::new();
    for attempt in 1..=policy.retries {
        match transport.post_json(&url, &payload) {
            Ok(_) => {
                return ModelTestReport {
                    model: model.to_owned(),
                    ok: true,
                    endpoint: "responses".to_owned(),
                    error: String::new(),
                };
            }
            Err(error) => last_err = error,
        }
        if attempt < policy.retries {
            sleep(policy.wait);
        }
    }

    ModelTestReport {
        model: model.to_owned(),
        ok: false,
        endpoint: "responses".to_owned(),
        error: format!("{}: {last_err}", ErrorKind::classify(&last_err)),
    }
}
