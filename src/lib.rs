//! # Actor Manager
//!
//! > **Query resolution and structured storage for platform actors.**
//!
//! This crate is the client-side core an actor platform ships to its users:
//!
//! - an **actor query resolver** that turns an abstract request ("an actor tagged
//!   `name=chat`, creating one if none exists") into a concrete, reachable, public
//!   actor with a derivable endpoint;
//! - a **structured-key storage client** that reads and writes an actor's durable
//!   state under multi-part keys whose byte encoding preserves their order.
//!
//! ## 🏗️ Design
//!
//! ### Collaborators behind traits
//! The resolver only talks to the platform through
//! [`OrchestrationApi`](orchestrator::OrchestrationApi); the storage client only
//! talks to an engine through [`KvDriver`](kv::KvDriver). Both seams are `async`
//! request/response calls with no internal retries or timeouts; a caller cancels by
//! dropping the future.
//!
//! ### In-memory collaborators as actors
//! The bundled orchestrator and storage engine are [`Backend`](framework::Backend)s
//! driven by a generic [`ServiceActor`](framework::ServiceActor): one Tokio task owns
//! the state and processes requests sequentially, so no locks are needed.
//! [`ServiceClient`](framework::ServiceClient) is a cheap, cloneable handle.
//!
//! ### Type-safe errors
//! Each component has its own error enum ([`ResolveError`](resolver::ResolveError),
//! [`KvError`](kv::KvError), [`ConfigError`](lifecycle::ConfigError)); collaborator
//! failures arrive as [`UpstreamError`](framework::UpstreamError) and convert with `?`.
//!
//! ### Observability
//! `tracing` spans wrap every resolution and storage call. See
//! [`lifecycle::tracing`] for the log layout.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: The request loop, the client handle and the scripted [`MockClient`](framework::mock::MockClient).
//! - **Key items**: [`Backend`](framework::Backend), [`ServiceActor`](framework::ServiceActor), [`ServiceClient`](framework::ServiceClient).
//!
//! ### 2. The Records ([`model`])
//! - **Role**: Actors, builds, tags, environments and the query protocol.
//! - **Key items**: [`Actor`](model::Actor), [`ActorQuery`](model::ActorQuery), [`Actor::endpoint`](model::Actor::endpoint).
//!
//! ### 3. The Resolver ([`resolver`], [`orchestrator`])
//! - **Role**: Selection rules over the orchestration API, plus an in-memory platform.
//! - **Key items**: [`ActorResolver::resolve`](resolver::ActorResolver::resolve), [`MemoryOrchestrator`](orchestrator::MemoryOrchestrator).
//!
//! ### 4. The Storage Client ([`kv`])
//! - **Role**: Key codec, record formats, list validation and the typed client.
//! - **Key items**: [`KvClient`](kv::KvClient), [`Key`](kv::Key), [`encode`](kv::encode).
//!
//! ### 5. The Wiring ([`lifecycle`])
//! - **Role**: Configuration, tracing setup and the [`ManagerSystem`](lifecycle::ManagerSystem) that starts everything.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! ACTOR_MANAGER_PROJECT=demo ACTOR_MANAGER_ENVIRONMENT=dev RUST_LOG=info cargo run
//! ```
//!
//! ```bash
//! cargo test
//! ```

pub mod framework;
pub mod kv;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod resolver;
