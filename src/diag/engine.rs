//! Diagnosis orchestration: the sequential candidate sweep.

use crate::diag::candidates::{EndpointCandidate, build_candidates};
use crate::diag::catalog::RequestPlan;
use crate::diag::latency;
use crate::diag::outcome::{OutcomeStatus, ProbeOutcome};
use crate::diag::report::DiagnosisReport;
use crate::diag::target::ProbeTarget;
use crate::diag::transport::{HttpTransport, Transport, WireResult};
use crate::diag::validate::validate_success_body;
use crate::error::{RelayError, Result};
use tracing::{debug, info};

/// Run a full diagnosis pass against the target.
///
/// Blocking: latency measurements plus one sequential sweep over every
/// candidate. Candidates are probed strictly one at a time — relays
/// frequently rate-limit or misbehave under concurrent load from the same
/// key — and a pass has no internal cancellation; it either completes the
/// sweep or fails on an input error before any I/O.
///
/// # Errors
///
/// Returns [`RelayError::Target`] for an invalid base URL (before any
/// network I/O) and [`RelayError::Transport`] when the HTTP client cannot
/// be built. Per-candidate failures never surface here.
pub fn diagnose_blocking(target: &ProbeTarget) -> Result<DiagnosisReport> {
    let candidates = build_candidates(target.base_url())?;
    info!(
        base = target.base_url(),
        model = target.model(),
        candidates = candidates.len(),
        "starting diagnosis sweep"
    );

    let latency = latency::measure(target);
    let transport = HttpTransport::new(target)?;
    let outcomes = sweep(&transport, &candidates, target.model());
    let report = DiagnosisReport::assemble(target, latency, outcomes);
    info!(conclusion = %report.conclusion, "diagnosis complete");
    Ok(report)
}

/// Run a diagnosis pass without blocking the caller's event loop.
///
/// The pass itself stays synchronous and sequential; it is moved onto a
/// blocking worker thread.
///
/// # Errors
///
/// Everything [`diagnose_blocking`] returns, plus [`RelayError::Task`] when
/// the worker cannot be joined.
pub async fn diagnose(target: ProbeTarget) -> Result<DiagnosisReport> {
    tokio::task::spawn_blocking(move || diagnose_blocking(&target))
        .await
        .map_err(|e| RelayError::Task(format!("diagnosis task failed: {e}")))?
}

/// Probe every candidate in order, producing exactly one outcome each.
#[must_use]
pub fn sweep(
    transport: &dyn Transport,
    candidates: &[EndpointCandidate],
    model: &str,
) -> Vec<ProbeOutcome> {
    candidates
        .iter()
        .map(|candidate| {
            let status = dispatch(transport, candidate, model);
            let outcome = ProbeOutcome {
                candidate: candidate.clone(),
                status,
            };
            debug!(url = %outcome.candidate.url, ok = ?outcome.ok(), "candidate probed");
            outcome
        })
        .collect()
}

fn dispatch(
    transport: &dyn Transport,
    candidate: &EndpointCandidate,
    model: &str,
) -> OutcomeStatus {
    match candidate.key.request_plan(model) {
        RequestPlan::Skip(reason) => OutcomeStatus::Skipped {
            reason: reason.to_owned(),
        },
        RequestPlan::Get => settle(candidate, transport.get(&candidate.url)),
        RequestPlan::Post(payload) => {
            settle(candidate, transport.post_json(&candidate.url, &payload))
        }
    }
}

/// Apply semantic validation to a transport-successful exchange.
fn settle(candidate: &EndpointCandidate, wire: WireResult) -> OutcomeStatus {
    match wire {
        Ok(body) => match validate_success_body(candidate.key, &body) {
            Ok(()) => OutcomeStatus::Passed { body },
            Err(reason) => OutcomeStatus::Failed {
                error: format!("HTTP 200 but response content invalid: {reason}"),
            },
        },
        Err(error) => OutcomeStatus::Failed { error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::catalog::EndpointKey;
    use crate::diag::latency::LatencyReport;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Synthetic relay keyed by URL suffix; everything else is a 404.
    struct FakeRelay {
        routes: HashMap<&'static str, WireResult>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRelay {
        fn new(routes: HashMap<&'static str, WireResult>) -> Self {
            Self {
                routes,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn answer(&self, url: &str) -> WireResult {
            self.calls.borrow_mut().push(url.to_owned());
            self.routes
                .iter()
                .find(|(suffix, _)| url.ends_with(*suffix))
                .map(|(_, result)| result.clone())
                .unwrap_or_else(|| Err("HTTP 404: Not Found".to_owned()))
        }
    }

    impl Transport for FakeRelay {
        fn get(&self, url: &str) -> WireResult {
            self.answer(url)
        }

        fn post_json(&self, url: &str, _payload: &serde_json::Value) -> WireResult {
            self.answer(url)
        }
    }

    fn run(base: &str, model: &str, relay: &FakeRelay) -> DiagnosisReport {
        let target = ProbeTarget::new(base, "sk-test", model).expect("target");
        let candidates = build_candidates(target.base_url()).expect("candidates");
        let outcomes = sweep(relay, &candidates, target.model());
        DiagnosisReport::assemble(&target, LatencyReport::unavailable(), outcomes)
    }

    #[test]
    fn healthy_chat_relay_scenario() {
        let relay = FakeRelay::new(HashMap::from([(
            "/v1/chat/completions",
            Ok(r#"{"choices":[{"text":"hi"}]}"#.to_owned()) as WireResult,
        )]));
        let report = run("https://api.example.com/v1", "gpt-4", &relay);

        assert!(
            report.conclusion
                .contains("link is healthy (request succeeded via /v1/chat/completions)")
        );
        assert_eq!(report.verdict.supported(), Some(true));
        assert_eq!(report.verdict.source(), "/chat/completions");
        assert_eq!(report.supported_urls, vec![
            "https://api.example.com/v1/chat/completions".to_owned()
        ]);
    }

    #[test]
    fn models_only_relay_scenario() {
        let relay = FakeRelay::new(HashMap::from([(
            "/v1/models",
            Ok(r#"{"data":[{"id":"gpt-4"}]}"#.to_owned()) as WireResult,
        )]));
        let report = run("https://api.example.com/v1", "gpt-5", &relay);

        assert_eq!(report.verdict.model_in_list(), Some(false));
        assert_eq!(report.verdict.supported(), Some(false));
        assert_eq!(report.verdict.source(), "/models");
        assert_eq!(
            report.conclusion,
            "only /models is reachable; API access may be restricted"
        );
    }

    #[test]
    fn all_forbidden_relay_scenario() {
        struct Forbidden;
        impl Transport for Forbidden {
            fn get(&self, _url: &str) -> WireResult {
                Err("HTTP 403: Forbidden".to_owned())
            }
            fn post_json(&self, _url: &str, _payload: &serde_json::Value) -> WireResult {
                Err("HTTP 403: Forbidden".to_owned())
            }
        }

        let target = ProbeTarget::new("https://api.example.com/v1", "sk-bad", "gpt-4")
            .expect("target");
        let candidates = build_candidates(target.base_url()).expect("candidates");
        let outcomes = sweep(&Forbidden, &candidates, target.model());
        let report =
            DiagnosisReport::assemble(&target, LatencyReport::unavailable(), outcomes);
        assert_eq!(report.conclusion, "credentials/key are likely wrong");
        assert_eq!(report.verdict.supported(), None);
    }

    #[test]
    fn semantic_failure_downgrades_a_200() {
        let relay = FakeRelay::new(HashMap::from([(
            "/v1/chat/completions",
            Ok("<html>gateway</html>".to_owned()) as WireResult,
        )]));
        let report = run("https://api.example.com/v1", "gpt-4", &relay);

        let chat = report
            .outcomes
            .iter()
            .find(|o| o.candidate.key == EndpointKey::ChatCompletions)
            .expect("chat outcome");
        assert_eq!(
            chat.error(),
            Some("HTTP 200 but response content invalid: response body is not valid JSON")
        );
        assert_ne!(report.conclusion, "link is healthy");
    }

    #[test]
    fn skipped_endpoints_are_never_dispatched() {
        let relay = FakeRelay::new(HashMap::new());
        let report = run("https://api.example.com/v1", "gpt-4", &relay);

        for outcome in &report.outcomes {
            if outcome.candidate.key.skip_reason().is_some() {
                assert_eq!(outcome.ok(), None, "{}", outcome.candidate.label);
            }
        }
        let calls = relay.calls.borrow();
        assert!(calls.iter().all(|url| !url.contains("/realtime")));
        assert_eq!(calls.len(), 6);
    }

    #[test]
    fn sweep_probes_in_candidate_order() {
        let relay = FakeRelay::new(HashMap::new());
        let _ = run("https://api.example.com/v1", "gpt-4", &relay);
        let calls = relay.calls.borrow();
        assert_eq!(calls[0], "https://api.example.com/v1/responses");
        assert_eq!(calls[1], "https://api.example.com/v1/chat/completions");
        assert_eq!(calls[2], "https://api.example.com/v1/completions");
        assert_eq!(calls[3], "https://api.example.com/v1/models");
    }
}
