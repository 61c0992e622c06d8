//! # Upstream Errors
//!
//! Failures reported by a collaborator (orchestration API or storage engine)
//! rather than by the core itself. Components wrap this in their own error type.

/// Errors raised while talking to a backend service.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Service closed")]
    Closed,
    #[error("Service dropped response channel")]
    Dropped,
    #[error("Request rejected: {0}")]
    Rejected(String),
}
