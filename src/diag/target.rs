//! Probe target: the credential tuple a diagnosis runs against.

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default per-call timeout for endpoint requests.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable input for one probing run.
///
/// Supplied by the credential-store collaborator; the engine itself never
/// touches files or the environment. The base URL is trimmed of trailing
/// slashes at construction, before any URL derivation happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTarget {
    base_url: String,
    host: String,
    api_key: String,
    org_id: Option<String>,
    model: String,
    #[serde(default = "default_timeout")]
    timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}

impl ProbeTarget {
    /// Create a probe target, validating the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Target`] when the base URL cannot be parsed or
    /// has no host. This is the input-error class: it fires synchronously,
    /// before any network I/O.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        let host = extract_host(&base_url)?;
        Ok(Self {
            base_url,
            host,
            api_key: api_key.into(),
            org_id: None,
            model: model.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    /// Attach an organization id (sent as `OpenAI-Organization`).
    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        let org_id = org_id.into();
        self.org_id = if org_id.trim().is_empty() {
            None
        } else {
            Some(org_id)
        };
        self
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cleaned base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hostname extracted from the base URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// API key (may be empty; the bearer header is attached regardless).
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Optional organization id.
    #[must_use]
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    /// Target model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Extract the hostname from a base URL.
///
/// # Errors
///
/// Returns [`RelayError::Target`] when the URL does not parse or carries no
/// host component (e.g. `"not-a-url"`).
pub fn extract_host(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url)
        .map_err(|e| RelayError::Target(format!("invalid base URL '{base_url}': {e}")))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_owned()),
        _ => Err(RelayError::Target(format!(
            "base URL '{base_url}' has no host"
        ))),
    }
}
