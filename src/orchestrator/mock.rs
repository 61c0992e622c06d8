//! Expectation builders for scripting the orchestration API.
//!
//! ```ignore
//! let mut mock = MockClient::<MemoryOrchestrator>::new();
//! mock.expect_list_actors()
//!     .with_filter(ActorFilter::all())
//!     .return_ok(vec![actor]);
//! mock.expect_create_actor().return_err(UpstreamError::Rejected("quota".into()));
//! ```

use super::api::ActorFilter;
use super::memory::{MemoryOrchestrator, OrchestratorRequest};
use crate::framework::mock::MockClient;
use crate::framework::UpstreamError;
use crate::model::{Actor, Build, Tags};

impl MockClient<MemoryOrchestrator> {
    /// Expects a `get_actor` call for `id`.
    pub fn expect_get_actor(&mut self, id: impl Into<String>) -> GetActorExpectation<'_> {
        GetActorExpectation {
            mock: self,
            id: id.into(),
        }
    }

    /// Expects a `list_actors` call.
    pub fn expect_list_actors(&mut self) -> ListActorsExpectation<'_> {
        ListActorsExpectation {
            mock: self,
            filter: None,
        }
    }

    /// Expects a `list_builds` call.
    pub fn expect_list_builds(&mut self) -> ListBuildsExpectation<'_> {
        ListBuildsExpectation {
            mock: self,
            tags: None,
        }
    }

    /// Expects a `create_actor` call. `return_with` sees the submitted request.
    pub fn expect_create_actor(&mut self) -> CreateActorExpectation<'_> {
        CreateActorExpectation { mock: self }
    }
}

fn mismatch(expected: &str, got: &OrchestratorRequest) -> Result<(), String> {
    Err(format!("expected {expected}, got {got:?}"))
}

/// Builder for `get_actor` expectations.
pub struct GetActorExpectation<'a> {
    mock: &'a mut MockClient<MemoryOrchestrator>,
    id: String,
}

impl GetActorExpectation<'_> {
    pub fn return_ok(self, actor: Option<Actor>) {
        self.respond(Ok(actor));
    }

    pub fn return_err(self, error: UpstreamError) {
        self.respond(Err(error));
    }

    fn respond(self, response: Result<Option<Actor>, UpstreamError>) {
        let expected_id = self.id;
        self.mock.expect(move |request| match request {
            OrchestratorRequest::GetActor { id, respond_to, .. } => {
                let _ = respond_to.send(response);
                if id == expected_id {
                    Ok(())
                } else {
                    Err(format!("get_actor: expected id {expected_id}, got {id}"))
                }
            }
            other => mismatch("GetActor", &other),
        });
    }
}

/// Builder for `list_actors` expectations.
pub struct ListActorsExpectation<'a> {
    mock: &'a mut MockClient<MemoryOrchestrator>,
    filter: Option<ActorFilter>,
}

impl ListActorsExpectation<'_> {
    /// Also require the pushed-down filter to equal `filter`.
    pub fn with_filter(mut self, filter: ActorFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn return_ok(self, actors: Vec<Actor>) {
        self.respond(Ok(actors));
    }

    pub fn return_err(self, error: UpstreamError) {
        self.respond(Err(error));
    }

    fn respond(self, response: Result<Vec<Actor>, UpstreamError>) {
        let expected = self.filter;
        self.mock.expect(move |request| match request {
            OrchestratorRequest::ListActors {
                filter, respond_to, ..
            } => {
                let _ = respond_to.send(response);
                match expected {
                    Some(expected) if expected != filter => Err(format!(
                        "list_actors: expected filter {expected:?}, got {filter:?}"
                    )),
                    _ => Ok(()),
                }
            }
            other => mismatch("ListActors", &other),
        });
    }
}

/// Builder for `list_builds` expectations.
pub struct ListBuildsExpectation<'a> {
    mock: &'a mut MockClient<MemoryOrchestrator>,
    tags: Option<Tags>,
}

impl ListBuildsExpectation<'_> {
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn return_ok(self, builds: Vec<Build>) {
        let expected = self.tags;
        self.mock.expect(move |request| match request {
            OrchestratorRequest::ListBuilds {
                tags, respond_to, ..
            } => {
                let _ = respond_to.send(Ok(builds));
                match expected {
                    Some(expected) if expected != tags => Err(format!(
                        "list_builds: expected tags {expected:?}, got {tags:?}"
                    )),
                    _ => Ok(()),
                }
            }
            other => mismatch("ListBuilds", &other),
        });
    }
}

/// Builder for `create_actor` expectations.
pub struct CreateActorExpectation<'a> {
    mock: &'a mut MockClient<MemoryOrchestrator>,
}

impl CreateActorExpectation<'_> {
    /// Answers with an actor derived from the submitted request.
    pub fn return_with(
        self,
        respond: impl FnOnce(&super::api::CreateActorRequest) -> Actor + Send + 'static,
    ) {
        self.mock.expect(move |request| match request {
            OrchestratorRequest::CreateActor {
                request,
                respond_to,
                ..
            } => {
                let _ = respond_to.send(Ok(respond(&request)));
                Ok(())
            }
            other => mismatch("CreateActor", &other),
        });
    }

    pub fn return_err(self, error: UpstreamError) {
        self.mock.expect(move |request| match request {
            OrchestratorRequest::CreateActor { respond_to, .. } => {
                let _ = respond_to.send(Err(error));
                Ok(())
            }
            other => mismatch("CreateActor", &other),
        });
    }
}
