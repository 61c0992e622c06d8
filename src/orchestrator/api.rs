//! # Orchestration API
//!
//! The collaborator the resolver lists, fetches and creates actors through.
//! Transport is not this crate's concern: anything that can answer these four
//! calls (an HTTP client, the in-memory [`MemoryOrchestrator`](super::MemoryOrchestrator),
//! a scripted mock) plugs in here.

use crate::framework::UpstreamError;
use crate::model::{Actor, Build, Environment, Protocol, Tags};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-side filter for actor listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorFilter {
    /// Actors must carry every one of these tags.
    pub tags: Tags,
    /// Destroyed actors are only listed when set.
    pub include_destroyed: bool,
}

impl ActorFilter {
    pub fn tagged(tags: Tags) -> Self {
        Self {
            tags,
            include_destroyed: false,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn including_destroyed(mut self) -> Self {
        self.include_destroyed = true;
        self
    }
}

/// Body of an actor create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActorRequest {
    pub tags: Tags,
    pub build: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub network: NetworkRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub ports: BTreeMap<String, PortRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRequest {
    pub protocol: Protocol,
    pub routing: Routing,
}

/// How traffic reaches a port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    /// TLS is terminated by the platform's edge proxy.
    #[default]
    Guard,
    /// The port is exposed directly on the host.
    Host,
}

/// Request/response interface of the orchestration service.
#[async_trait]
pub trait OrchestrationApi: Send + Sync {
    /// Fetch a single actor; `None` when the id is unknown in this environment.
    async fn get_actor(&self, env: &Environment, id: &str)
        -> Result<Option<Actor>, UpstreamError>;

    /// List actors matching `filter`, in the service's list order.
    async fn list_actors(
        &self,
        env: &Environment,
        filter: &ActorFilter,
    ) -> Result<Vec<Actor>, UpstreamError>;

    /// List builds carrying every tag in `tags`.
    async fn list_builds(&self, env: &Environment, tags: &Tags)
        -> Result<Vec<Build>, UpstreamError>;

    /// Create an actor and return its record.
    async fn create_actor(
        &self,
        env: &Environment,
        request: CreateActorRequest,
    ) -> Result<Actor, UpstreamError>;
}
