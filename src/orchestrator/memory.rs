//! # In-Memory Orchestrator
//!
//! A [`Backend`] that keeps actor and build records per [`Environment`] and answers
//! the [`OrchestrationApi`] over a [`ServiceClient`]. It also accepts the
//! administrative calls the real platform performs out-of-band (build upload,
//! actor destruction, network provisioning) so tests and the demo binary can
//! drive every lifecycle transition.

use super::api::{ActorFilter, CreateActorRequest, OrchestrationApi, PortRequest};
use crate::framework::{Backend, Response, ServiceClient, UpstreamError};
use crate::model::{
    tags_superset, Actor, Build, Environment, Network, Port, Protocol, Tags, ACCESS_PUBLIC,
    CURRENT_TRUE, TAG_ACCESS, TAG_CURRENT, TAG_NAME,
};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Client half of a running [`MemoryOrchestrator`].
pub type OrchestratorClient = ServiceClient<MemoryOrchestrator>;

/// Requests understood by the [`MemoryOrchestrator`].
#[derive(Debug)]
pub enum OrchestratorRequest {
    GetActor {
        env: Environment,
        id: String,
        respond_to: Response<Option<Actor>>,
    },
    ListActors {
        env: Environment,
        filter: ActorFilter,
        respond_to: Response<Vec<Actor>>,
    },
    ListBuilds {
        env: Environment,
        tags: Tags,
        respond_to: Response<Vec<Build>>,
    },
    CreateActor {
        env: Environment,
        request: CreateActorRequest,
        respond_to: Response<Actor>,
    },
    InsertActor {
        env: Environment,
        actor: Actor,
        respond_to: Response<()>,
    },
    UploadBuild {
        env: Environment,
        tags: Tags,
        respond_to: Response<Build>,
    },
    DestroyActor {
        env: Environment,
        id: String,
        respond_to: Response<Actor>,
    },
    ReadyPorts {
        env: Environment,
        id: String,
        respond_to: Response<Actor>,
    },
}

#[derive(Default)]
struct Namespace {
    /// Insertion order is the list order.
    actors: Vec<Actor>,
    builds: Vec<Build>,
    /// Placement region of each created actor.
    regions: HashMap<String, String>,
}

const DEFAULT_REGION: &str = "local";

/// Actor and build records for every environment.
pub struct MemoryOrchestrator {
    namespaces: HashMap<Environment, Namespace>,
    next_actor_id: u64,
    next_build_id: u64,
    defer_networking: bool,
    clock: Box<dyn FnMut() -> String + Send>,
}

impl Default for MemoryOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrchestrator {
    pub fn new() -> Self {
        Self {
            namespaces: HashMap::new(),
            next_actor_id: 1,
            next_build_id: 1,
            defer_networking: false,
            clock: Box::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// New actors start with unprovisioned ports until
    /// [`ready_ports`](ServiceClient::ready_ports) is called.
    pub fn with_deferred_networking(mut self) -> Self {
        self.defer_networking = true;
        self
    }

    /// Replaces the wall clock used for `created_at` / `destroyed_at`.
    pub fn with_clock(mut self, clock: impl FnMut() -> String + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn namespace(&mut self, env: &Environment) -> &mut Namespace {
        self.namespaces.entry(env.clone()).or_default()
    }

    fn list_actors(&self, env: &Environment, filter: &ActorFilter) -> Vec<Actor> {
        self.namespaces
            .get(env)
            .map(|ns| {
                ns.actors
                    .iter()
                    .filter(|a| filter.include_destroyed || !a.is_destroyed())
                    .filter(|a| tags_superset(&a.tags, &filter.tags))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn list_builds(&self, env: &Environment, tags: &Tags) -> Vec<Build> {
        self.namespaces
            .get(env)
            .map(|ns| {
                ns.builds
                    .iter()
                    .filter(|b| tags_superset(&b.tags, tags))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn provision(id: &str, region: &str, name: &str, request: &PortRequest, ready: bool) -> Port {
        let default_port = match request.protocol {
            Protocol::Https | Protocol::TcpTls => 443,
            Protocol::Http => 80,
            Protocol::Tcp | Protocol::Udp => 9000,
        };
        Port {
            protocol: request.protocol,
            hostname: ready.then(|| format!("{id}-{name}.{region}.actors.local")),
            port: ready.then_some(default_port),
            path: None,
        }
    }

    fn create_actor(
        &mut self,
        env: &Environment,
        request: CreateActorRequest,
    ) -> Result<Actor, UpstreamError> {
        let known_build = self
            .namespaces
            .get(env)
            .is_some_and(|ns| ns.builds.iter().any(|b| b.id == request.build));
        if !known_build {
            return Err(UpstreamError::Rejected(format!(
                "build `{}` not found in {env}",
                request.build
            )));
        }

        let id = format!("actor_{}", self.next_actor_id);
        self.next_actor_id += 1;

        let region = request
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let ready = !self.defer_networking;
        let ports = request
            .network
            .ports
            .iter()
            .map(|(name, port)| {
                (name.clone(), Self::provision(&id, &region, name, port, ready))
            })
            .collect();

        let actor = Actor {
            id,
            tags: request.tags,
            build: request.build,
            network: Network { ports },
            created_at: (self.clock)(),
            destroyed_at: None,
        };
        let ns = self.namespace(env);
        ns.regions.insert(actor.id.clone(), region);
        ns.actors.push(actor.clone());
        info!(actor_id = %actor.id, %env, "Created");
        Ok(actor)
    }

    fn upload_build(&mut self, env: &Environment, mut tags: Tags) -> Build {
        let id = format!("build_{}", self.next_build_id);
        self.next_build_id += 1;

        tags.entry(TAG_ACCESS.to_string())
            .or_insert_with(|| ACCESS_PUBLIC.to_string());
        tags.insert(TAG_CURRENT.to_string(), CURRENT_TRUE.to_string());

        let created_at = (self.clock)();
        let ns = self.namespace(env);
        if let Some(name) = tags.get(TAG_NAME) {
            for previous in ns
                .builds
                .iter_mut()
                .filter(|b| b.tags.get(TAG_NAME) == Some(name))
            {
                previous.tags.remove(TAG_CURRENT);
            }
        }

        let build = Build {
            id,
            tags,
            created_at,
        };
        ns.builds.push(build.clone());
        info!(build_id = %build.id, %env, "Uploaded build");
        build
    }

    fn actor_mut(&mut self, env: &Environment, id: &str) -> Result<&mut Actor, UpstreamError> {
        self.namespaces
            .get_mut(env)
            .and_then(|ns| ns.actors.iter_mut().find(|a| a.id == id))
            .ok_or_else(|| UpstreamError::Rejected(format!("actor `{id}` not found in {env}")))
    }

    fn destroy_actor(&mut self, env: &Environment, id: &str) -> Result<Actor, UpstreamError> {
        let now = (self.clock)();
        let actor = self.actor_mut(env, id)?;
        // Destruction is terminal; a second destroy keeps the first timestamp.
        if actor.destroyed_at.is_none() {
            actor.destroyed_at = Some(now);
            info!(actor_id = %id, "Destroyed");
        }
        Ok(actor.clone())
    }

    fn ready_ports(&mut self, env: &Environment, id: &str) -> Result<Actor, UpstreamError> {
        let region = self
            .namespaces
            .get(env)
            .and_then(|ns| ns.regions.get(id))
            .cloned()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let actor = self.actor_mut(env, id)?;
        let actor_id = actor.id.clone();
        for (name, port) in actor.network.ports.iter_mut() {
            if !port.is_ready() {
                let request = PortRequest {
                    protocol: port.protocol,
                    routing: Default::default(),
                };
                *port = Self::provision(&actor_id, &region, name, &request, true);
            }
        }
        Ok(actor.clone())
    }
}

impl Backend for MemoryOrchestrator {
    type Request = OrchestratorRequest;
    const NAME: &'static str = "orchestrator";

    fn handle(&mut self, request: OrchestratorRequest) {
        match request {
            OrchestratorRequest::GetActor {
                env,
                id,
                respond_to,
            } => {
                let actor = self
                    .namespaces
                    .get(&env)
                    .and_then(|ns| ns.actors.iter().find(|a| a.id == id))
                    .cloned();
                let _ = respond_to.send(Ok(actor));
            }
            OrchestratorRequest::ListActors {
                env,
                filter,
                respond_to,
            } => {
                let _ = respond_to.send(Ok(self.list_actors(&env, &filter)));
            }
            OrchestratorRequest::ListBuilds {
                env,
                tags,
                respond_to,
            } => {
                let _ = respond_to.send(Ok(self.list_builds(&env, &tags)));
            }
            OrchestratorRequest::CreateActor {
                env,
                request,
                respond_to,
            } => {
                let result = self.create_actor(&env, request);
                if let Err(e) = &result {
                    warn!(error = %e, "Create failed");
                }
                let _ = respond_to.send(result);
            }
            OrchestratorRequest::InsertActor {
                env,
                actor,
                respond_to,
            } => {
                let ns = self.namespace(&env);
                match ns.actors.iter_mut().find(|a| a.id == actor.id) {
                    Some(existing) => *existing = actor,
                    None => ns.actors.push(actor),
                }
                let _ = respond_to.send(Ok(()));
            }
            OrchestratorRequest::UploadBuild {
                env,
                tags,
                respond_to,
            } => {
                let _ = respond_to.send(Ok(self.upload_build(&env, tags)));
            }
            OrchestratorRequest::DestroyActor {
                env,
                id,
                respond_to,
            } => {
                let _ = respond_to.send(self.destroy_actor(&env, &id));
            }
            OrchestratorRequest::ReadyPorts {
                env,
                id,
                respond_to,
            } => {
                let _ = respond_to.send(self.ready_ports(&env, &id));
            }
        }
    }

    fn size(&self) -> usize {
        self.namespaces.values().map(|ns| ns.actors.len()).sum()
    }
}

#[async_trait]
impl OrchestrationApi for ServiceClient<MemoryOrchestrator> {
    async fn get_actor(
        &self,
        env: &Environment,
        id: &str,
    ) -> Result<Option<Actor>, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::GetActor {
            env: env.clone(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn list_actors(
        &self,
        env: &Environment,
        filter: &ActorFilter,
    ) -> Result<Vec<Actor>, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::ListActors {
            env: env.clone(),
            filter: filter.clone(),
            respond_to,
        })
        .await
    }

    async fn list_builds(
        &self,
        env: &Environment,
        tags: &Tags,
    ) -> Result<Vec<Build>, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::ListBuilds {
            env: env.clone(),
            tags: tags.clone(),
            respond_to,
        })
        .await
    }

    async fn create_actor(
        &self,
        env: &Environment,
        request: CreateActorRequest,
    ) -> Result<Actor, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::CreateActor {
            env: env.clone(),
            request,
            respond_to,
        })
        .await
    }
}

/// Administrative calls performed outside the resolver.
impl ServiceClient<MemoryOrchestrator> {
    /// Uploads a build, marking it current for its `name` and demoting the
    /// previous current build of that name.
    #[instrument(skip(self))]
    pub async fn upload_build(&self, env: &Environment, tags: Tags) -> Result<Build, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::UploadBuild {
            env: env.clone(),
            tags,
            respond_to,
        })
        .await
    }

    /// Inserts (or replaces) a record verbatim. Used to seed fixtures.
    pub async fn insert_actor(&self, env: &Environment, actor: Actor) -> Result<(), UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::InsertActor {
            env: env.clone(),
            actor,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn destroy_actor(&self, env: &Environment, id: &str) -> Result<Actor, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::DestroyActor {
            env: env.clone(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    /// Provisions hostname and port number for every unready port of an actor.
    pub async fn ready_ports(&self, env: &Environment, id: &str) -> Result<Actor, UpstreamError> {
        self.call(|respond_to| OrchestratorRequest::ReadyPorts {
            env: env.clone(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::ServiceActor;
    use crate::model::{tags, PORT_NAME};
    use crate::orchestrator::api::{NetworkRequest, Routing};
    use std::collections::BTreeMap;

    fn env() -> Environment {
        Environment::new("proj", "prod")
    }

    fn spawn(backend: MemoryOrchestrator) -> OrchestratorClient {
        let (actor, client) = ServiceActor::new(16, backend);
        tokio::spawn(actor.run());
        client
    }

    fn http_request(build: &str, tags: Tags) -> CreateActorRequest {
        CreateActorRequest {
            tags,
            build: build.to_string(),
            region: Some("eu".into()),
            network: NetworkRequest {
                ports: BTreeMap::from([(
                    PORT_NAME.to_string(),
                    PortRequest {
                        protocol: Protocol::Https,
                        routing: Routing::Guard,
                    },
                )]),
            },
        }
    }

    #[tokio::test]
    async fn test_upload_build_demotes_previous_current() {
        let client = spawn(MemoryOrchestrator::new());
        let first = client.upload_build(&env(), tags([("name", "echo")])).await.unwrap();
        let second = client.upload_build(&env(), tags([("name", "echo")])).await.unwrap();
        assert!(first.is_current() && second.is_current());

        let current = client
            .list_builds(&env(), &tags([("name", "echo"), ("current", "true")]))
            .await
            .unwrap();
        assert_eq!(current, vec![second.clone()]);
        assert!(second.is_public());
    }

    #[tokio::test]
    async fn test_create_requires_known_build() {
        let client = spawn(MemoryOrchestrator::new());
        let err = client
            .create_actor(&env(), http_request("build_404", tags([("name", "echo")])))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_deferred_networking_and_destroy() {
        let client = spawn(MemoryOrchestrator::new().with_deferred_networking());
        let build = client.upload_build(&env(), tags([("name", "echo")])).await.unwrap();
        let actor = client
            .create_actor(&env(), http_request(&build.id, tags([("name", "echo")])))
            .await
            .unwrap();
        assert!(!actor.ports_ready());

        let ready = client.ready_ports(&env(), &actor.id).await.unwrap();
        assert!(ready.ports_ready());
        let hostname = ready.network.ports[PORT_NAME].hostname.as_deref().unwrap();
        assert_eq!(hostname, format!("{}-{PORT_NAME}.eu.actors.local", actor.id));

        let destroyed = client.destroy_actor(&env(), &actor.id).await.unwrap();
        let again = client.destroy_actor(&env(), &actor.id).await.unwrap();
        assert_eq!(destroyed.destroyed_at, again.destroyed_at);

        let live = client.list_actors(&env(), &ActorFilter::all()).await.unwrap();
        assert!(live.is_empty());
        let all = client
            .list_actors(&env(), &ActorFilter::all().including_destroyed())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_environments_are_isolated() {
        let client = spawn(MemoryOrchestrator::new());
        let build = client.upload_build(&env(), tags([("name", "echo")])).await.unwrap();
        client
            .create_actor(&env(), http_request(&build.id, tags([("name", "echo")])))
            .await
            .unwrap();

        let other = Environment::new("proj", "staging");
        let listed = client.list_actors(&other, &ActorFilter::all()).await.unwrap();
        assert!(listed.is_empty());
    }
}
