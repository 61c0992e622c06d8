//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a `tracing-subscriber` formatter for the binary and
//! for ad-hoc debugging in tests. Levels come from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Service lifecycle**: the orchestrator and storage engine log start and
//!   shutdown with their record counts
//! - **Resolution**: each query runs in a `resolve` span tagged with the query kind
//!   and environment; the outcome is logged at `debug`
//! - **Creation**: build selection and the create call are logged at `info`
//! - **Storage**: every client call runs in a span carrying its key or batch size;
//!   `delete_all` always logs at `warn`
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle and creations only
//! RUST_LOG=info cargo run
//!
//! # Full queries and every service request
//! RUST_LOG=debug cargo run
//!
//! # Resolver detail only
//! RUST_LOG=actor_manager::resolver=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a get-or-create that misses looks like:
//!
//! ```text
//! DEBUG resolve: Query query=GetOrCreateForTags { tags: {"name": "chat"}, create: Some(..) } kind="getOrCreateForTags" env=demo/dev
//! DEBUG resolve:resolve_current_build: Current build build_id="build_1"
//! INFO resolve:create: Creating actor body=CreateActorRequest { .. }
//! INFO Created actor_id="actor_1" env=demo/dev
//! INFO resolve:create: Actor created actor_id="actor_1"
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
