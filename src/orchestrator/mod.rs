//! # Orchestration Collaborator
//!
//! The resolver reaches the platform through the [`OrchestrationApi`] trait. This
//! module defines that seam and ships an in-memory implementation that runs as a
//! service actor.
//!
//! ## Structure
//!
//! - [`api`] - [`OrchestrationApi`] trait and request types
//! - [`memory`] - [`MemoryOrchestrator`] backend and its client
//! - [`mock`] - Expectation builders for [`MockClient`](crate::framework::mock::MockClient)
//! - [`new()`] - Factory function that creates the service and client
//!
//! ## Usage
//!
//! ```rust
//! use actor_manager::model::{tags, Environment};
//! use actor_manager::orchestrator::{self, ActorFilter, OrchestrationApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (service, client) = orchestrator::new(32);
//!     tokio::spawn(service.run());
//!
//!     let env = Environment::new("demo", "dev");
//!     client.upload_build(&env, tags([("name", "echo")])).await?;
//!     let actors = client.list_actors(&env, &ActorFilter::all()).await?;
//!     assert!(actors.is_empty());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod memory;
pub mod mock;

pub use api::*;
pub use memory::*;

use crate::framework::ServiceActor;

/// Creates a new in-memory orchestrator service and its client.
pub fn new(buffer_size: usize) -> (ServiceActor<MemoryOrchestrator>, OrchestratorClient) {
    ServiceActor::new(buffer_size, MemoryOrchestrator::new())
}
