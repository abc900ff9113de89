//! Per-candidate probe outcomes.

use crate::diag::candidates::EndpointCandidate;
use serde::{Deserialize, Serialize};

/// Result of exercising one candidate. Created once per candidate per run,
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub candidate: EndpointCandidate,
    pub status: OutcomeStatus,
}

/// Tri-state candidate status. `Skipped` means "deliberately not attempted"
/// — distinct from "attempted and failed."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Transport succeeded and the body passed semantic validation.
    Passed { body: String },
    /// Transport, protocol, or semantic failure.
    Failed { error: String },
    /// Endpoint needs resources the engine cannot synthesize.
    Skipped { reason: String },
}

impl ProbeOutcome {
    /// Tri-state view: `Some(true)` passed, `Some(false)` failed, `None`
    /// deliberately skipped.
    #[must_use]
    pub fn ok(&self) -> Option<bool> {
        match self.status {
            OutcomeStatus::Passed { .. } => Some(true),
            OutcomeStatus::Failed { .. } => Some(false),
            OutcomeStatus::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Passed { .. })
    }

    /// Validated response body, if the candidate passed.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Passed { body } => Some(body),
            _ => None,
        }
    }

    /// Error text, if the candidate failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}
