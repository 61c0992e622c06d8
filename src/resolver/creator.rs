use super::builds::BuildResolver;
use super::error::ResolveError;
use crate::model::{Actor, CreateRequest, Environment, Protocol, ACCESS_PUBLIC, PORT_NAME, TAG_ACCESS, TAG_NAME};
use crate::orchestrator::{CreateActorRequest, NetworkRequest, OrchestrationApi, PortRequest, Routing};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Creates actors running the current build for their `name` tag.
#[derive(Clone)]
pub struct ActorCreator<A> {
    api: A,
    builds: BuildResolver<A>,
}

impl<A: OrchestrationApi + Clone> ActorCreator<A> {
    pub fn new(api: A) -> Self {
        Self {
            builds: BuildResolver::new(api.clone()),
            api,
        }
    }

    /// Submits a create call for `request`.
    ///
    /// The created actor is always public and exposes a single TLS-terminated
    /// [`PORT_NAME`] port.
    #[instrument(skip(self, request), fields(tags = ?request.tags))]
    pub async fn create(
        &self,
        env: &Environment,
        request: CreateRequest,
    ) -> Result<Actor, ResolveError> {
        let name = request
            .tags
            .get(TAG_NAME)
            .cloned()
            .ok_or_else(|| ResolveError::InvalidQuery("create request tags must include `name`".into()))?;
        let build = self.builds.resolve_current_build(env, &name).await?;

        let mut tags = request.tags;
        tags.insert(TAG_ACCESS.to_string(), ACCESS_PUBLIC.to_string());

        let body = CreateActorRequest {
            tags,
            build: build.id,
            region: request.region,
            network: NetworkRequest {
                ports: BTreeMap::from([(
                    PORT_NAME.to_string(),
                    PortRequest {
                        protocol: Protocol::Https,
                        routing: Routing::Guard,
                    },
                )]),
            },
        };
        info!(?body, "Creating actor");

        let actor = self.api.create_actor(env, body).await?;
        info!(actor_id = %actor.id, "Actor created");
        Ok(actor)
    }
}
