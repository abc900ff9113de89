//! Model-support inference: fusing independent signals into one verdict.

use crate::diag::catalog::EndpointKey;
use crate::diag::outcome::ProbeOutcome;
use crate::diag::validate::parse_json_payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Keyword list for the negative error-text classifier. Substring match on
/// the lower-cased error body, alongside the word "model". Known to miss
/// localized or custom relay messages; kept narrow on purpose.
const MODEL_ERROR_KEYWORDS: [&str; 5] = [
    "not found",
    "not allowed",
    "not supported",
    "does not exist",
    "invalid",
];

/// Tri-state model-availability verdict plus its provenance.
///
/// Updates follow "first True wins, otherwise first False wins": a `True`
/// verdict, once recorded, is never overwritten — optimistic confirmation
/// beats pessimistic guesses. `model_in_list` is recorded independently,
/// because a relay may make a model callable without listing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSupportVerdict {
    supported: Option<bool>,
    source: String,
    model_in_list: Option<bool>,
}

impl ModelSupportVerdict {
    /// `Some(true)` usable, `Some(false)` unusable, `None` undetermined.
    #[must_use]
    pub fn supported(&self) -> Option<bool> {
        self.supported
    }

    /// Endpoint key the verdict came from, empty while undetermined.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the target model appeared in a `/models` listing.
    #[must_use]
    pub fn model_in_list(&self) -> Option<bool> {
        self.model_in_list
    }

    fn record(&mut self, supported: bool, source: &str) {
        if self.supported == Some(true) {
            return;
        }
        if supported {
            self.supported = Some(true);
            self.source = source.to_owned();
        } else if self.supported.is_none() {
            self.supported = Some(false);
            self.source = source.to_owned();
        }
    }
}

/// Fold the ordered outcome list into a verdict.
///
/// Signals in priority order: validated success on a generation-shaped
/// endpoint; membership in the first non-empty `/models` listing; the
/// error-text classifier over failed generation endpoints.
#[must_use]
pub fn infer_model_support(outcomes: &[ProbeOutcome], model: &str) -> ModelSupportVerdict {
    let mut verdict = ModelSupportVerdict::default();

    for outcome in outcomes {
        if outcome.candidate.key.is_generation() && outcome.passed() {
            verdict.record(true, outcome.candidate.key.path());
        }
    }

    for outcome in outcomes {
        if outcome.candidate.key != EndpointKey::Models || !outcome.passed() {
            continue;
        }
        if verdict.model_in_list.is_some() {
            break;
        }
        let ids = parse_model_ids(outcome.body().unwrap_or_default());
        if !ids.is_empty() {
            let member = ids.contains(model);
            verdict.model_in_list = Some(member);
            verdict.record(member, EndpointKey::Models.path());
        }
    }

    if verdict.supported.is_none() {
        for outcome in outcomes {
            if !outcome.candidate.key.is_generation() {
                continue;
            }
            if let Some(error) = outcome.error()
                && is_model_error(error)
            {
                verdict.record(false, outcome.candidate.key.path());
            }
        }
    }

    verdict
}

/// Extract the id set from a `/models` listing body.
#[must_use]
pub fn parse_model_ids(body: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    let Some(data) = parse_json_payload(body) else {
        return ids;
    };
    let Some(items) = data.get("data").and_then(Value::as_array) else {
        return ids;
    };
    for item in items {
        if let Some(id) = item.get("id").and_then(Value::as_str) {
            ids.insert(id.to_owned());
        }
    }
    ids
}

/// The `model` field a generation response echoed back, with a nested
/// `response.model` fallback. Informational only; never feeds the verdict.
#[must_use]
pub fn extract_response_model(body: &str) -> Option<String> {
    let data = parse_json_payload(body)?;
    if let Some(model) = data.get("model").and_then(Value::as_str) {
        return Some(model.to_owned());
    }
    data.get("response")
        .and_then(|r| r.get("model"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// First successful generation outcome that echoed a model name, paired
/// with the endpoint key it came from.
#[must_use]
pub fn extract_echoed_model(outcomes: &[ProbeOutcome]) -> Option<(String, EndpointKey)> {
    outcomes
        .iter()
        .filter(|o| o.candidate.key.is_generation() && o.passed())
        .find_map(|o| {
            extract_response_model(o.body().unwrap_or_default())
                .filter(|m| !m.is_empty())
                .map(|m| (m, o.candidate.key))
        })
}

/// The negative classifier: does this failure text look like "model not
/// usable" rather than a transport or auth problem?
#[must_use]
pub fn is_model_error(text: &str) -> bool {
    let msg = text.to_lowercase();
    if !msg.contains("model") {
        return false;
    }
    MODEL_ERROR_KEYWORDS.iter().any(|k| msg.contains(k))
}
