//! The aggregate diagnosis report and its rendered transcript.

use crate::diag::catalog::{EMBEDDING_PROBE_MODEL, MODERATION_PROBE_MODEL};
use crate::diag::conclusion::{first_generation_success_label, synthesize_conclusion};
use crate::diag::inference::{ModelSupportVerdict, extract_echoed_model, infer_model_support};
use crate::diag::latency::LatencyReport;
use crate::diag::outcome::{OutcomeStatus, ProbeOutcome};
use crate::diag::target::ProbeTarget;
use serde::{Deserialize, Serialize};

/// Longest slice of a failure body quoted in the transcript.
const FAIL_BRIEF_CHARS: usize = 200;

/// Everything one probing run produced. Built once per invocation,
/// immutable afterward; the caller renders or persists it as it sees fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub base_url: String,
    pub base_host: String,
    pub latency: LatencyReport,
    /// Ordered per-candidate outcomes, exactly one per candidate.
    pub outcomes: Vec<ProbeOutcome>,
    pub verdict: ModelSupportVerdict,
    /// Model name a successful generation response echoed back, if any.
    pub response_model: Option<String>,
    /// Endpoint key the echoed model came from.
    pub response_model_source: Option<String>,
    /// Label of the first successful generation candidate.
    pub success_endpoint: Option<String>,
    /// Labels of all candidates that passed, in probing order.
    pub supported_labels: Vec<String>,
    /// URLs of all candidates that passed, deduplicated, in probing order.
    pub supported_urls: Vec<String>,
    pub conclusion: String,
    /// Short header block (base, connectivity, reachable endpoints).
    pub summary: String,
    /// Full multi-line transcript for logging and audit.
    pub detail: String,
}

impl DiagnosisReport {
    /// Assemble the report from a finished sweep. Pure: no I/O, so tests
    /// can feed synthetic outcomes and an [`LatencyReport::unavailable`].
    #[must_use]
    pub fn assemble(
        target: &ProbeTarget,
        latency: LatencyReport,
        outcomes: Vec<ProbeOutcome>,
    ) -> Self {
        let verdict = infer_model_support(&outcomes, target.model());
        let echoed = extract_echoed_model(&outcomes);
        let success_endpoint = first_generation_success_label(&outcomes).map(str::to_owned);
        let conclusion = synthesize_conclusion(&outcomes);

        let supported_labels: Vec<String> = outcomes
            .iter()
            .filter(|o| o.passed())
            .map(|o| o.candidate.label.clone())
            .collect();
        let mut supported_urls: Vec<String> = Vec::new();
        for outcome in outcomes.iter().filter(|o| o.passed()) {
            if !supported_urls.contains(&outcome.candidate.url) {
                supported_urls.push(outcome.candidate.url.clone());
            }
        }

        let (response_model, response_model_source) = match echoed {
            Some((model, key)) => (Some(model), Some(key.path().to_owned())),
            None => (None, None),
        };

        let mut report = Self {
            base_url: target.base_url().to_owned(),
            base_host: target.host().to_owned(),
            latency,
            outcomes,
            verdict,
            response_model,
            response_model_source,
            success_endpoint,
            supported_labels,
            supported_urls,
            conclusion,
            summary: String::new(),
            detail: String::new(),
        };
        report.summary = report.render_summary(target.model());
        report.detail = report.render_detail(target.model());
        report
    }

    fn render_summary(&self, model: &str) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Base URL: {}", self.base_url));
        lines.push(format!("Base Host: {}", self.base_host));
        lines.push(format!(
            "Base connectivity: Ping={} / HTTP={} / Port={}",
            fmt_ms(self.latency.ping_avg_ms),
            fmt_ms(self.latency.http_head_ms),
            match self.latency.tcp_ok {
                Some(true) => "OK",
                Some(false) => "FAIL",
                None => "unavailable",
            }
        ));
        lines.push(String::new());
        let supported = if self.supported_labels.is_empty() {
            "none".to_owned()
        } else {
            self.supported_labels.join(", ")
        };
        lines.push(format!("Reachable endpoints: {supported}"));
        if !self.supported_urls.is_empty() {
            lines.push("Reachable endpoint URLs:".to_owned());
            for url in &self.supported_urls {
                lines.push(format!("- {url}"));
            }
        }
        lines.push(format!(
            "Model listed ({model}): {}",
            fmt_tri(self.verdict.model_in_list(), "yes", "no")
        ));
        if let Some(response_model) = &self.response_model {
            lines.push(format!(
                "Actual returned model: {response_model} (source: {})",
                self.response_model_source.as_deref().unwrap_or("unknown")
            ));
        }
        lines.join("\n")
    }

    fn render_detail(&self, model: &str) -> String {
        let mut lines = vec![self.summary.clone()];
        let source_hint = if self.verdict.source().is_empty() {
            String::new()
        } else {
            format!(" (source: {})", self.verdict.source())
        };
        lines.push(format!(
            "Model availability ({model}): {}{source_hint}",
            fmt_tri(self.verdict.supported(), "usable", "unusable")
        ));
        lines.push(format!("Embedding probe model: {EMBEDDING_PROBE_MODEL}"));
        lines.push(format!("Moderation probe model: {MODERATION_PROBE_MODEL}"));
        lines.push(String::new());
        lines.push("Endpoint probe results:".to_owned());
        for outcome in &self.outcomes {
            let label = &outcome.candidate.label;
            match &outcome.status {
                OutcomeStatus::Passed { .. } => lines.push(format!("- {label}: OK")),
                OutcomeStatus::Failed { error } => {
                    lines.push(format!("- {label}: FAIL ({})", fail_brief(error)));
                }
                OutcomeStatus::Skipped { reason } => {
                    lines.push(format!("- {label}: SKIP: {reason}"));
                }
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "API request result: {}",
            if self.success_endpoint.is_some() {
                "success"
            } else {
                "failure"
            }
        ));
        lines.join("\n")
    }
}

/// `"{:.0}ms"` or `"unavailable"`.
#[must_use]
pub fn fmt_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{ms:.0}ms"),
        None => "unavailable".to_owned(),
    }
}

fn fmt_tri(value: Option<bool>, yes: &str, no: &str) -> String {
    match value {
        Some(true) => yes.to_owned(),
        Some(false) => no.to_owned(),
        None => "unknown".to_owned(),
    }
}

fn fail_brief(error: &str) -> String {
    let first_line = error.lines().next().unwrap_or("-");
    if first_line.is_empty() {
        "-".to_owned()
    } else {
        first_line.chars().take(FAIL_BRIEF_CHARS).collect()
    }
}
