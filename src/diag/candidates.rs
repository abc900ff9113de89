//! Candidate builder: base URL variants × endpoint catalog.

use crate::diag::catalog::EndpointKey;
use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// One concrete URL to probe, tagged with its catalog key and a display
/// label (`<base-path><endpoint>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub label: String,
    pub key: EndpointKey,
    pub url: String,
}

/// Expand a base URL into the ordered, deduplicated candidate list.
///
/// Two base variants are derived: the URL as given, and a `/v1`-normalized
/// sibling — `/v1` appended when the path does not already end in it, or the
/// path stripped back to `scheme://host/v1` when it ends in `/v1` at a
/// deeper nesting (`/proxy/v1` → `/v1`). Variants and final URLs are
/// deduplicated with first-seen-wins ordering, so the given base is probed
/// before its sibling and generation endpoints before auxiliary ones.
///
/// # Errors
///
/// Returns [`RelayError::Target`] for an unparseable or hostless base URL,
/// before any network I/O.
pub fn build_candidates(base_url: &str) -> Result<Vec<EndpointCandidate>> {
    let clean = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(clean)
        .map_err(|e| RelayError::Target(format!("invalid base URL '{clean}': {e}")))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| RelayError::Target(format!("base URL '{clean}' has no host")))?;

    let mut bases: Vec<String> = vec![clean.to_owned()];
    let path = parsed.path().trim_end_matches('/');
    if path.ends_with("/v1") {
        if path != "/v1" {
            let netloc = match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            };
            bases.push(format!("{}://{netloc}/v1", parsed.scheme()));
        }
    } else {
        bases.push(format!("{clean}/v1"));
    }
    dedup_preserving_order(&mut bases);

    let mut candidates = Vec::with_capacity(bases.len() * EndpointKey::CATALOG.len());
    for base in &bases {
        let prefix = Url::parse(base)
            .map(|u| u.path().trim_end_matches('/').to_owned())
            .unwrap_or_default();
        for key in EndpointKey::CATALOG {
            candidates.push(EndpointCandidate {
                label: format!("{prefix}{}", key.path()),
                key,
                url: format!("{}{}", base.trim_end_matches('/'), key.path()),
            });
        }
    }

    // Final dedup by URL, first occurrence wins.
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.url.clone()));
    Ok(candidates)
}

fn dedup_preserving_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
