//! Error types for actor resolution.

use crate::framework::UpstreamError;
use thiserror::Error;

/// Errors returned by [`ActorResolver::resolve`](super::ActorResolver::resolve).
///
/// Nothing is retried internally; each variant tells the caller what happened so
/// it can decide whether to try again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No actor satisfies the query.
    #[error("Actor not found: {0}")]
    NotFound(String),

    /// The actor exists but is not public.
    #[error("Actor with ID {actor_id} is private")]
    Forbidden { actor_id: String },

    /// The actor exists but has been destroyed.
    #[error("Actor with ID {actor_id} already destroyed")]
    AlreadyDestroyed { actor_id: String },

    /// No current public build exists for the requested name.
    #[error("Build not found with tags or is private: name={name}")]
    BuildNotFound { name: String },

    /// The query itself is malformed (e.g. a create request without `name`).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The orchestration API failed.
    #[error("Orchestration API failure: {0}")]
    Upstream(#[from] UpstreamError),
}
