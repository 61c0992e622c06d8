//! Picks the build a new actor runs.

use super::error::ResolveError;
use crate::model::{tags, Build, Environment, ACCESS_PUBLIC, CURRENT_TRUE, TAG_ACCESS, TAG_CURRENT, TAG_NAME};
use crate::orchestrator::OrchestrationApi;
use tracing::{debug, instrument, warn};

/// Resolves the build currently marked live for an actor name.
#[derive(Clone)]
pub struct BuildResolver<A> {
    api: A,
}

impl<A: OrchestrationApi> BuildResolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the public build tagged `current: "true"` for `name`.
    ///
    /// If the upload pipeline left several current builds behind, the one with
    /// the smallest id wins so every caller agrees.
    #[instrument(skip(self))]
    pub async fn resolve_current_build(
        &self,
        env: &Environment,
        name: &str,
    ) -> Result<Build, ResolveError> {
        let filter = tags([
            (TAG_NAME, name),
            (TAG_CURRENT, CURRENT_TRUE),
            (TAG_ACCESS, ACCESS_PUBLIC),
        ]);
        let builds: Vec<Build> = self
            .api
            .list_builds(env, &filter)
            .await?
            .into_iter()
            .filter(Build::is_public)
            .collect();

        if builds.len() > 1 {
            let ids: Vec<&str> = builds.iter().map(|b| b.id.as_str()).collect();
            warn!(name, ?ids, "Multiple current builds");
        }

        let build = builds
            .into_iter()
            .min_by(|a, b| a.id.cmp(&b.id))
            .ok_or_else(|| ResolveError::BuildNotFound {
                name: name.to_string(),
            })?;
        debug!(build_id = %build.id, "Current build");
        Ok(build)
    }
}
