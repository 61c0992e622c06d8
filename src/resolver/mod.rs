//! # Actor Query Resolver
//!
//! Turns an abstract [`ActorQuery`] into a concrete, reachable [`Actor`], creating
//! one when a get-or-create lookup misses.
//!
//! ## Structure
//!
//! - [`ActorResolver`] - Entry point; dispatches on the query variant
//! - [`creator`] - [`ActorCreator`] submits create calls for the current build
//! - [`builds`] - [`BuildResolver`] finds the build marked current for a name
//! - [`select`] - Filtering and tie-break rules
//! - [`error`] - [`ResolveError`]
//!
//! ## Selection rules
//!
//! | Query | Candidates | Winner |
//! |-------|------------|--------|
//! | `getForId` | the id | itself, unless private or destroyed |
//! | `getOrCreateForTags` | public, ready, tag superset | smallest id, else create |
//! | `getLatestByName` | public, ready, `name` | newest `createdAt`, then smallest id |
//! | `getByRegion` | public, `name` | first with `region`, list order |
//! | `getByBuild` | public, build id | smallest id |
//! | `getAllPublicByName` | public, ready, `name` | all of them |
//! | `getDestroyedActorsByTag` | destroyed, public, tag | first, list order |
//! | `getByExactTags` | public, ready, tag superset | smallest id |
//! | `getMostRecentByRegion` | public, `region` | newest `createdAt`, then smallest id |
//!
//! Apart from `getDestroyedActorsByTag`, candidates with a `destroyedAt` are
//! dropped here even when the listing should already have excluded them.
//!
//! ## Concurrency
//!
//! Get-or-create is list-then-create with no lock in between. Two callers racing on
//! an empty candidate set can both create an actor; the smallest-id rule only makes
//! later lookups agree on one of them.

pub mod builds;
pub mod creator;
pub mod error;
pub mod select;

pub use builds::BuildResolver;
pub use creator::ActorCreator;
pub use error::ResolveError;

use crate::model::{
    tags, tags_superset, Actor, ActorQuery, CreateRequest, Environment, Tags, ACCESS_PUBLIC,
    TAG_ACCESS, TAG_NAME, TAG_REGION,
};
use crate::orchestrator::{ActorFilter, OrchestrationApi};
use tracing::{debug, instrument, warn};

/// Outcome of a resolution.
///
/// Every query yields a single actor except `getAllPublicByName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Single(Actor),
    All(Vec<Actor>),
}

impl Resolution {
    /// The resolved actor, or the first of many.
    pub fn into_actor(self) -> Option<Actor> {
        match self {
            Resolution::Single(actor) => Some(actor),
            Resolution::All(actors) => actors.into_iter().next(),
        }
    }

    pub fn into_actors(self) -> Vec<Actor> {
        match self {
            Resolution::Single(actor) => vec![actor],
            Resolution::All(actors) => actors,
        }
    }
}

/// Resolves actor queries against an [`OrchestrationApi`].
#[derive(Clone)]
pub struct ActorResolver<A> {
    api: A,
    creator: ActorCreator<A>,
}

impl<A: OrchestrationApi + Clone> ActorResolver<A> {
    pub fn new(api: A) -> Self {
        Self {
            creator: ActorCreator::new(api.clone()),
            api,
        }
    }

    /// Resolves `query` within `env`.
    ///
    /// Never returns an actor whose `access` tag is not `"public"`.
    #[instrument(skip(self, query), fields(kind = query.kind(), %env))]
    pub async fn resolve(
        &self,
        query: ActorQuery,
        env: &Environment,
    ) -> Result<Resolution, ResolveError> {
        debug!(?query, "Query");

        let result = match query {
            ActorQuery::GetForId { actor_id } => self.get_for_id(env, &actor_id).await,
            ActorQuery::GetOrCreateForTags { tags, create } => {
                self.get_or_create_for_tags(env, tags, create).await
            }
            ActorQuery::Create(request) => self.creator.create(env, request).await,
            ActorQuery::GetLatestByName { name } => self.get_latest_by_name(env, &name).await,
            ActorQuery::GetByRegion { name, region } => {
                self.get_by_region(env, &name, &region).await
            }
            ActorQuery::GetByBuild { build_id } => self.get_by_build(env, &build_id).await,
            ActorQuery::GetAllPublicByName { name } => {
                return self.get_all_public_by_name(env, &name).await.map(Resolution::All);
            }
            ActorQuery::GetDestroyedActorsByTag { tag_key, tag_value } => {
                self.get_destroyed_by_tag(env, &tag_key, &tag_value).await
            }
            ActorQuery::GetByExactTags { tags } => self.get_by_exact_tags(env, &tags).await,
            ActorQuery::GetMostRecentByRegion { region } => {
                self.get_most_recent_by_region(env, &region).await
            }
        };

        match &result {
            Ok(actor) => debug!(actor_id = %actor.id, "Resolved"),
            Err(e) => debug!(error = %e, "Resolution failed"),
        }
        result.map(Resolution::Single)
    }

    async fn list(&self, env: &Environment, filter: ActorFilter) -> Result<Vec<Actor>, ResolveError> {
        Ok(self.api.list_actors(env, &filter).await?)
    }

    async fn get_for_id(&self, env: &Environment, id: &str) -> Result<Actor, ResolveError> {
        let actor = self
            .api
            .get_actor(env, id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(format!("no actor with ID {id}")))?;

        if !actor.is_public() {
            return Err(ResolveError::Forbidden {
                actor_id: id.to_string(),
            });
        }
        if actor.is_destroyed() {
            return Err(ResolveError::AlreadyDestroyed {
                actor_id: id.to_string(),
            });
        }
        Ok(actor)
    }

    async fn get_or_create_for_tags(
        &self,
        env: &Environment,
        wanted: Tags,
        create: Option<CreateRequest>,
    ) -> Result<Actor, ResolveError> {
        let mut filter = wanted.clone();
        filter.insert(TAG_ACCESS.to_string(), ACCESS_PUBLIC.to_string());

        let listed = self.list(env, ActorFilter::tagged(filter)).await?;
        if let Some(stray) = listed.iter().find(|a| !a.is_public()) {
            warn!(actor_id = %stray.id, "Listing for public actors returned a private actor");
        }
        let candidates = select::reachable(listed)
            .into_iter()
            .filter(|a| tags_superset(&a.tags, &wanted))
            .collect();

        if let Some(actor) = select::smallest_id(candidates) {
            return Ok(actor);
        }

        match create {
            Some(request) => self.creator.create(env, request).await,
            None => Err(ResolveError::NotFound(format!(
                "no public actor with tags {wanted:?}"
            ))),
        }
    }

    async fn get_latest_by_name(&self, env: &Environment, name: &str) -> Result<Actor, ResolveError> {
        let candidates = self.public_by_name(env, name).await?;
        select::most_recent(select::reachable(candidates))
            .ok_or_else(|| ResolveError::NotFound(format!("no public actors found with name {name:?}")))
    }

    async fn get_by_region(
        &self,
        env: &Environment,
        name: &str,
        region: &str,
    ) -> Result<Actor, ResolveError> {
        self.public_by_name(env, name)
            .await?
            .into_iter()
            .find(|a| select::live_public(a) && a.tag(TAG_REGION) == Some(region))
            .ok_or_else(|| {
                ResolveError::NotFound(format!("no actor found with name {name:?} in region {region:?}"))
            })
    }

    async fn get_by_build(&self, env: &Environment, build_id: &str) -> Result<Actor, ResolveError> {
        let candidates = self
            .list(env, ActorFilter::all())
            .await?
            .into_iter()
            .filter(|a| select::live_public(a) && a.build == build_id)
            .collect();
        select::smallest_id(candidates)
            .ok_or_else(|| ResolveError::NotFound(format!("no public actors found for build ID {build_id:?}")))
    }

    async fn get_all_public_by_name(
        &self,
        env: &Environment,
        name: &str,
    ) -> Result<Vec<Actor>, ResolveError> {
        let candidates = self.public_by_name(env, name).await?;
        Ok(select::reachable(candidates))
    }

    async fn get_destroyed_by_tag(
        &self,
        env: &Environment,
        key: &str,
        value: &str,
    ) -> Result<Actor, ResolveError> {
        let filter = ActorFilter::tagged(tags([(key, value)])).including_destroyed();
        self.list(env, filter)
            .await?
            .into_iter()
            .find(|a| a.is_destroyed() && a.is_public() && a.tag(key) == Some(value))
            .ok_or_else(|| {
                ResolveError::NotFound(format!("no destroyed actors found with tag {key}={value}"))
            })
    }

    async fn get_by_exact_tags(&self, env: &Environment, wanted: &Tags) -> Result<Actor, ResolveError> {
        let candidates = select::reachable(self.list(env, ActorFilter::tagged(wanted.clone())).await?)
            .into_iter()
            .filter(|a| tags_superset(&a.tags, wanted))
            .collect();
        select::smallest_id(candidates)
            .ok_or_else(|| ResolveError::NotFound("no public actors found with matching tags".into()))
    }

    async fn get_most_recent_by_region(
        &self,
        env: &Environment,
        region: &str,
    ) -> Result<Actor, ResolveError> {
        let candidates = self
            .list(env, ActorFilter::all())
            .await?
            .into_iter()
            .filter(|a| select::live_public(a) && a.tag(TAG_REGION) == Some(region))
            .collect();
        select::most_recent(candidates)
            .ok_or_else(|| ResolveError::NotFound(format!("no public actors found in region {region:?}")))
    }

    /// Lists live actors tagged `{name, access: public}` and re-checks the name.
    async fn public_by_name(&self, env: &Environment, name: &str) -> Result<Vec<Actor>, ResolveError> {
        let filter = ActorFilter::tagged(tags([(TAG_NAME, name), (TAG_ACCESS, ACCESS_PUBLIC)]));
        Ok(self
            .list(env, filter)
            .await?
            .into_iter()
            .filter(|a| a.tag(TAG_NAME) == Some(name))
            .collect())
    }
}
