//! Relayscope: endpoint diagnostics for OpenAI-compatible relays.
//!
//! This crate is the probing core of a credential-profile switcher: it
//! takes one credential tuple (base URL, API key, optional organization,
//! model, timeout) and answers the question a relay user actually has —
//! "does this endpoint serve my model, and if not, what is broken?"
//!
//! # Architecture
//!
//! One diagnosis pass runs these stages in order:
//! - **Candidate building**: the base URL and its `/v1`-normalized sibling
//!   × a fixed catalog of sixteen endpoint keys
//! - **Dispatch**: the right verb and payload per key, one candidate at a
//!   time (relays misbehave under concurrent load from a single key)
//! - **Validation**: HTTP 200 is not success; bodies must parse (JSON, SSE
//!   frames, or brace-slice recovery) and carry the endpoint's structure
//! - **Inference**: generation successes, `/models` listings, and an
//!   error-text classifier fuse into a tri-state model-support verdict
//! - **Conclusion**: one ranked, human-readable verdict string
//!
//! Latency figures (ICMP, HTTP HEAD, TCP 443) are measured independently
//! and merged into the final [`diag::DiagnosisReport`].
//!
//! The surrounding application (GUI, profile store, config writers) talks
//! to this crate only through [`diag::ProbeTarget`] in and
//! [`diag::DiagnosisReport`] / [`diag::ModelTestReport`] out.

pub mod diag;
pub mod error;

pub use diag::{DiagnosisReport, ModelSupportVerdict, ModelTestReport, ProbeTarget};
pub use error::{RelayError, Result};
