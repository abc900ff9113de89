//! Endpoint diagnostics and model-availability probing.
//!
//! Given a base URL, an API key, and a target model, the engine determines
//! — without a documented, uniform API surface across third-party relays —
//! which endpoints exist, whether they behave correctly, and whether the
//! model is genuinely usable, then produces one authoritative conclusion
//! and a machine-usable support verdict.
//!
//! # Pipeline
//!
//! [`candidates::build_candidates`] expands the base URL into an ordered
//! candidate list; [`engine::sweep`] exercises each candidate through a
//! [`transport::Transport`], validating 200s semantically
//! ([`validate`]); [`report::DiagnosisReport::assemble`] fuses the
//! outcomes with [`inference`] and [`conclusion`] and the independent
//! [`latency`] figures. [`retry::test_model`] is the simplified
//! one-endpoint variant.
//!
//! The engine is synchronous and strictly sequential across candidates;
//! [`engine::diagnose`] bridges a whole pass onto a blocking worker for
//! callers on an async runtime.

pub mod candidates;
pub mod catalog;
pub mod conclusion;
pub mod engine;
pub mod inference;
pub mod latency;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod target;
pub mod transport;
pub mod validate;

pub use candidates::{EndpointCandidate, build_candidates};
pub use catalog::{EMBEDDING_PROBE_MODEL, EndpointKey, MODERATION_PROBE_MODEL, RequestPlan};
pub use engine::{diagnose, diagnose_blocking, sweep};
pub use inference::ModelSupportVerdict;
pub use latency::LatencyReport;
pub use outcome::{OutcomeStatus, ProbeOutcome};
pub use report::DiagnosisReport;
pub use retry::{ErrorKind, ModelTestReport, RetryPolicy, test_model, test_model_with};
pub use target::{DEFAULT_PROBE_TIMEOUT, ProbeTarget};
pub use transport::{BROWSER_USER_AGENT, HttpTransport, Transport, WireResult};
