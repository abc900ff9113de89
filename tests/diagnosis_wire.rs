//! Wire-level integration tests for the diagnosis engine.
//!
//! These exercise the real blocking transport against a mock relay, not
//! the in-process `Transport` fakes: header attachment, status mapping,
//! SSE body recovery, and the retry wrapper all run over actual HTTP.

use relayscope::diag::{
    HttpTransport, ProbeTarget, RetryPolicy, build_candidates, diagnose, sweep, test_model_with,
};
use relayscope::diag::{DiagnosisReport, LatencyReport};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run a sweep against a live mock server on a blocking worker, skipping
/// the latency probes.
async fn sweep_against(server_uri: String, model: &str) -> DiagnosisReport {
    let model = model.to_owned();
    tokio::task::spawn_blocking(move || {
        let target = ProbeTarget::new(server_uri, "sk-test", model).expect("target");
        let candidates = build_candidates(target.base_url()).expect("candidates");
        let transport = HttpTransport::new(&target).expect("transport");
        let outcomes = sweep(&transport, &candidates, target.model());
        DiagnosisReport::assemble(&target, LatencyReport::unavailable(), outcomes)
    })
    .await
    .expect("sweep task")
}

#[tokio::test]
async fn healthy_chat_relay_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4-relay",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}],
        })))
        .mount(&server)
        .await;

    let report = sweep_against(server.uri(), "gpt-4").await;

    assert_eq!(
        report.conclusion,
        "link is healthy (request succeeded via /v1/chat/completions)"
    );
    assert_eq!(report.verdict.supported(), Some(true));
    assert_eq!(report.verdict.source(), "/chat/completions");
    assert_eq!(report.response_model.as_deref(), Some("gpt-4-relay"));
    assert_eq!(report.response_model_source.as_deref(), Some("/chat/completions"));
    assert_eq!(report.supported_labels, vec!["/v1/chat/completions"]);
    assert!(report.detail.contains("- /v1/chat/completions: OK"));
}

#[tokio::test]
async fn models_only_relay_restricts_access() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "gpt-4"}, {"id": "gpt-4o-mini"}],
        })))
        .mount(&server)
        .await;

    let report = sweep_against(server.uri(), "gpt-5").await;

    assert_eq!(
        report.conclusion,
        "only /models is reachable; API access may be restricted"
    );
    assert_eq!(report.verdict.model_in_list(), Some(false));
    assert_eq!(report.verdict.supported(), Some(false));
    assert_eq!(report.verdict.source(), "/models");
}

#[tokio::test]
async fn forbidden_relay_blames_credentials() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let report = sweep_against(server.uri(), "gpt-4").await;

    assert_eq!(report.conclusion, "credentials/key are likely wrong");
    assert_eq!(report.verdict.supported(), None);
    assert!(report.detail.contains("FAIL (HTTP 403: Forbidden)"));
}

#[tokio::test]
async fn streamed_response_body_is_recovered() {
    let server = MockServer::start().await;

    let sse_body = "data: {\"id\":\"resp-1\",\"model\":\"gpt-4o\"}\n\ndata: [DONE]\n";
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sse_body)
                .insert_header("Content-Type", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let report = sweep_against(server.uri(), "gpt-4o").await;

    assert_eq!(report.verdict.supported(), Some(true));
    assert_eq!(report.verdict.source(), "/responses");
    assert_eq!(report.response_model.as_deref(), Some("gpt-4o"));
    assert!(report.conclusion.contains("/v1/responses"));
}

#[tokio::test]
async fn error_field_downgrades_a_200() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"message": "upstream exploded"},
        })))
        .mount(&server)
        .await;

    let report = sweep_against(server.uri(), "gpt-4").await;

    let chat = report
        .outcomes
        .iter()
        .find(|o| o.candidate.label == "/v1/chat/completions")
        .expect("chat outcome");
    assert_eq!(
        chat.error(),
        Some("HTTP 200 but response content invalid: response contains an error field")
    );
    assert!(!report.conclusion.contains("link is healthy"));
}

#[tokio::test]
async fn organization_header_is_attached_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("OpenAI-Organization", "org-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "gpt-4"}],
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let report = tokio::task::spawn_blocking(move || {
        let target = ProbeTarget::new(uri, "sk-test", "gpt-4")
            .expect("target")
            .with_org_id("org-42");
        let candidates = build_candidates(target.base_url()).expect("candidates");
        let transport = HttpTransport::new(&target).expect("transport");
        let outcomes = sweep(&transport, &candidates, target.model());
        DiagnosisReport::assemble(&target, LatencyReport::unavailable(), outcomes)
    })
    .await
    .expect("sweep task");

    // The mount only matches when the org header is sent.
    assert!(report.supported_labels.contains(&"/v1/models".to_owned()));
}

#[tokio::test]
async fn retry_wrapper_classifies_a_missing_route() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let base = format!("{}/v1", server.uri());
    let report = tokio::task::spawn_blocking(move || {
        let target = ProbeTarget::new(base.clone(), "sk-test", "gpt-4").expect("target");
        let transport = HttpTransport::new(&target).expect("transport");
        let mut sleeps = 0u32;
        let report = test_model_with(&transport, &base, "gpt-4", RetryPolicy::default(), |_| {
            sleeps += 1;
        });
        (report, sleeps)
    })
    .await
    .expect("retry task");

    let (report, sleeps) = report;
    assert!(!report.ok);
    assert_eq!(sleeps, 2);
    assert!(report.error.starts_with("endpoint_not_supported: HTTP 404"));
    server.verify().await;
}

#[tokio::test]
async fn async_entry_point_runs_a_full_pass() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "model": "gpt-4",
            "choices": [{"text": "hi"}],
        })))
        .mount(&server)
        .await;

    let target = ProbeTarget::new(server.uri(), "sk-test", "gpt-4").expect("target");
    let report = diagnose(target).await.expect("diagnosis");

    assert_eq!(report.verdict.supported(), Some(true));
    assert_eq!(report.verdict.source(), "/completions");
    // Latency probing really ran; HEAD against the mock succeeds.
    assert!(report.summary.contains("Base connectivity:"));
}

#[tokio::test]
async fn invalid_base_url_fails_before_any_request() {
    let target = ProbeTarget::new("https://", "sk-test", "gpt-4");
    assert!(target.is_err());

    let err = build_candidates("not-a-url").unwrap_err();
    assert!(err.to_string().contains("target error"));
}
