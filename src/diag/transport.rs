//! HTTP transport seam for the probing engine.
//!
//! The engine talks to relays through the [`Transport`] trait so the sweep
//! and its downstream stages can be exercised against synthetic relays in
//! tests. [`HttpTransport`] is the production implementation on the blocking
//! reqwest client — the engine is synchronous by contract (relays frequently
//! rate-limit concurrent load from one key), and callers run a whole pass
//! off their event loop instead.

use crate::diag::target::ProbeTarget;
use crate::error::{RelayError, Result};

/// Browser-like User-Agent attached to every probe request. Several relays
/// serve different (or no) responses to obvious non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of one HTTP exchange, before semantic validation: the response
/// body on a 2xx status, the error text otherwise. Transport failures
/// (timeout, DNS, TLS, reset) and non-2xx statuses both land in `Err` — the
/// latter as `"HTTP <code>: <body-or-reason>"`.
pub type WireResult = std::result::Result<String, String>;

/// Minimal HTTP surface the engine needs.
pub trait Transport {
    fn get(&self, url: &str) -> WireResult;
    fn post_json(&self, url: &str, payload: &serde_json::Value) -> WireResult;
}

/// Production transport: blocking reqwest with the target's credentials.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    api_key: String,
    org_id: Option<String>,
}

impl HttpTransport {
    /// Build a transport for one probing run.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] when the HTTP client cannot be
    /// constructed (wrapper-level failure; propagates to the caller).
    pub fn new(target: &ProbeTarget) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(target.timeout())
            .build()
            .map_err(|e| RelayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: target.api_key().to_owned(),
            org_id: target.org_id().map(str::to_owned),
        })
    }

    fn apply_headers(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        let req = req
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match &self.org_id {
            Some(org) => req.header("OpenAI-Organization", org),
            None => req,
        }
    }

    fn run(&self, req: reqwest::blocking::RequestBuilder) -> WireResult {
        match req.send() {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().unwrap_or_default();
                if status.is_success() {
                    Ok(body)
                } else {
                    let reason = if body.is_empty() {
                        status.canonical_reason().unwrap_or_default().to_owned()
                    } else {
                        body
                    };
                    Err(format!("HTTP {}: {reason}", status.as_u16()))
                }
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> WireResult {
        self.run(self.apply_headers(self.client.get(url)))
    }

    fn post_json(&self, url: &str, payload: &serde_json::Value) -> WireResult {
        self.run(self.apply_headers(self.client.post(url)).json(payload))
    }
}
