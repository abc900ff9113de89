//! Conclusion synthesis: one ranked, human-readable verdict per run.

use crate::diag::catalog::EndpointKey;
use crate::diag::outcome::ProbeOutcome;

/// Label of the first successful generation-shaped candidate, in probing
/// order. Drives both the healthy conclusion and the transcript footer.
#[must_use]
pub fn first_generation_success_label(outcomes: &[ProbeOutcome]) -> Option<&str> {
    outcomes
        .iter()
        .find(|o| o.candidate.key.is_generation() && o.passed())
        .map(|o| o.candidate.label.as_str())
}

/// Turn the full candidate result set into one conclusion string.
///
/// Priority, first match wins: generation success; `/models`-only
/// reachability; then a scan of the concatenated lower-cased failure text
/// for auth, not-found, and everything-else buckets.
#[must_use]
pub fn synthesize_conclusion(outcomes: &[ProbeOutcome]) -> String {
    if let Some(label) = first_generation_success_label(outcomes) {
        return format!("link is healthy (request succeeded via {label})");
    }

    if outcomes
        .iter()
        .any(|o| o.candidate.key == EndpointKey::Models && o.passed())
    {
        return "only /models is reachable; API access may be restricted".to_owned();
    }

    let errors = outcomes
        .iter()
        .filter_map(ProbeOutcome::error)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    if ["401", "403", "auth"].iter().any(|n| errors.contains(n)) {
        "credentials/key are likely wrong".to_owned()
    } else if errors.contains("404") || errors.contains("not found") {
        "endpoint likely unsupported (try a different diagnostic endpoint)".to_owned()
    } else {
        "suspected relay-side malfunction".to_owned()
    }
}
