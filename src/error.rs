//! Error types for the relayscope diagnostics engine.

/// Top-level error type for the probing engine.
///
/// Per-candidate failures (transport, protocol, semantic) never surface
/// here — they are recorded on the candidate's outcome and the sweep
/// continues. Only errors that abort a whole pass do.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Probe target is invalid (unparseable base URL, missing host).
    /// Raised before any network I/O.
    #[error("target error: {0}")]
    Target(String),

    /// HTTP client construction or wrapper-level transport stack failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Background task failure (async bridge).
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RelayError>;
