use actor_manager::framework::mock::MockClient;
use actor_manager::framework::UpstreamError;
use actor_manager::model::{
    tags, Actor, ActorQuery, Build, CreateRequest, Environment, Network, Protocol, PORT_NAME,
};
use actor_manager::orchestrator::{ActorFilter, CreateActorRequest, MemoryOrchestrator, Routing};
use actor_manager::resolver::{ActorResolver, ResolveError, Resolution};
use std::sync::{Arc, Mutex};

fn env() -> Environment {
    Environment::new("acme", "prod")
}

fn build(id: &str, pairs: &[(&str, &str)]) -> Build {
    Build {
        id: id.to_string(),
        tags: tags(pairs.iter().copied()),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

/// Tests the resolver's collaborator calls with a mocked orchestration API.
#[tokio::test]
async fn test_get_or_create_pushes_down_filters_and_creates() {
    let mut mock = MockClient::<MemoryOrchestrator>::new();
    mock.expect_list_actors()
        .with_filter(ActorFilter::tagged(tags([("name", "echo"), ("access", "public")])))
        .return_ok(vec![]);
    mock.expect_list_builds()
        .with_tags(tags([("name", "echo"), ("current", "true"), ("access", "public")]))
        .return_ok(vec![
            build("build_9", &[("name", "echo"), ("current", "true"), ("access", "public")]),
            build("build_4", &[("name", "echo"), ("current", "true"), ("access", "public")]),
        ]);

    let submitted: Arc<Mutex<Option<CreateActorRequest>>> = Arc::default();
    let slot = submitted.clone();
    mock.expect_create_actor().return_with(move |request| {
        *slot.lock().unwrap() = Some(request.clone());
        Actor {
            id: "actor_1".into(),
            tags: request.tags.clone(),
            build: request.build.clone(),
            network: Network::default(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            destroyed_at: None,
        }
    });

    let resolver = ActorResolver::new(mock.client());
    let actor = resolver
        .resolve(
            ActorQuery::GetOrCreateForTags {
                tags: tags([("name", "echo")]),
                create: Some(CreateRequest::new(tags([("name", "echo")])).in_region("eu")),
            },
            &env(),
        )
        .await
        .unwrap()
        .into_actor()
        .unwrap();
    assert_eq!(actor.id, "actor_1");

    let request = submitted.lock().unwrap().take().expect("create was called");
    assert_eq!(request.build, "build_4");
    assert_eq!(request.region.as_deref(), Some("eu"));
    assert_eq!(request.tags, tags([("name", "echo"), ("access", "public")]));
    let port = &request.network.ports[PORT_NAME];
    assert_eq!(port.protocol, Protocol::Https);
    assert_eq!(port.routing, Routing::Guard);

    mock.verify();
}

#[tokio::test]
async fn test_private_actor_in_listing_is_skipped() {
    let mut mock = MockClient::<MemoryOrchestrator>::new();
    mock.expect_list_actors().return_ok(vec![Actor {
        id: "actor_1".into(),
        tags: tags([("name", "echo"), ("access", "private")]),
        build: "build_1".into(),
        network: Network::default(),
        created_at: "t".into(),
        destroyed_at: None,
    }]);

    let resolver = ActorResolver::new(mock.client());
    let err = resolver
        .resolve(
            ActorQuery::GetOrCreateForTags {
                tags: tags([("name", "echo")]),
                create: None,
            },
            &env(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(_)));
    mock.verify();
}

fn listed(id: &str, pairs: &[(&str, &str)], created_at: &str, destroyed_at: Option<&str>) -> Actor {
    Actor {
        id: id.into(),
        tags: tags(pairs.iter().copied()),
        build: "build_1".into(),
        network: Network::default(),
        created_at: created_at.into(),
        destroyed_at: destroyed_at.map(str::to_string),
    }
}

#[tokio::test]
async fn test_destroyed_actor_in_live_listing_is_skipped() {
    let destroyed = listed(
        "actor_1",
        &[("name", "echo"), ("region", "eu"), ("access", "public")],
        "2024-01-01T00:00:00.000Z",
        Some("2024-01-02T00:00:00.000Z"),
    );
    let queries = vec![
        ActorQuery::GetOrCreateForTags {
            tags: tags([("name", "echo")]),
            create: None,
        },
        ActorQuery::GetLatestByName { name: "echo".into() },
        ActorQuery::GetByRegion {
            name: "echo".into(),
            region: "eu".into(),
        },
        ActorQuery::GetByBuild { build_id: "build_1".into() },
        ActorQuery::GetAllPublicByName { name: "echo".into() },
        ActorQuery::GetByExactTags { tags: tags([("name", "echo")]) },
        ActorQuery::GetMostRecentByRegion { region: "eu".into() },
    ];

    let mut mock = MockClient::<MemoryOrchestrator>::new();
    for _ in &queries {
        mock.expect_list_actors().return_ok(vec![destroyed.clone()]);
    }

    let resolver = ActorResolver::new(mock.client());
    for query in queries {
        let kind = query.kind();
        match resolver.resolve(query, &env()).await {
            Err(ResolveError::NotFound(_)) => {}
            Ok(Resolution::All(actors)) => assert!(actors.is_empty(), "{kind}"),
            other => panic!("{kind}: expected no live actor, got {other:?}"),
        }
    }
    mock.verify();
}

#[tokio::test]
async fn test_latest_by_name_ignores_list_order_on_ties() {
    let public = [("name", "chat"), ("access", "public")];
    let c = listed("actor_c", &public, "2024-03-01T00:00:00.000Z", None);
    let a = listed("actor_a", &public, "2024-03-01T00:00:00.000Z", None);

    let mut mock = MockClient::<MemoryOrchestrator>::new();
    mock.expect_list_actors().return_ok(vec![c.clone(), a.clone()]);
    mock.expect_list_actors().return_ok(vec![a, c]);

    let resolver = ActorResolver::new(mock.client());
    for _ in 0..2 {
        let winner = resolver
            .resolve(ActorQuery::GetLatestByName { name: "chat".into() }, &env())
            .await
            .unwrap()
            .into_actor()
            .unwrap();
        assert_eq!(winner.id, "actor_a");
    }
    mock.verify();
}

#[tokio::test]
async fn test_destroyed_lookup_includes_destroyed_actors() {
    let mut mock = MockClient::<MemoryOrchestrator>::new();
    mock.expect_list_actors()
        .with_filter(ActorFilter::tagged(tags([("room", "lobby")])).including_destroyed())
        .return_ok(vec![]);

    let resolver = ActorResolver::new(mock.client());
    let err = resolver
        .resolve(
            ActorQuery::GetDestroyedActorsByTag {
                tag_key: "room".into(),
                tag_value: "lobby".into(),
            },
            &env(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(_)));
    mock.verify();
}

#[tokio::test]
async fn test_upstream_failures_surface() {
    let mut mock = MockClient::<MemoryOrchestrator>::new();
    mock.expect_get_actor("actor_1")
        .return_err(UpstreamError::Rejected("unauthorized".into()));
    mock.expect_list_actors().return_ok(vec![]);
    mock.expect_list_builds()
        .return_ok(vec![build("build_1", &[("name", "echo"), ("current", "true"), ("access", "public")])]);
    mock.expect_create_actor()
        .return_err(UpstreamError::Rejected("quota exceeded".into()));

    let resolver = ActorResolver::new(mock.client());

    let err = resolver
        .resolve(ActorQuery::GetForId { actor_id: "actor_1".into() }, &env())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::Upstream(UpstreamError::Rejected("unauthorized".into()))
    );

    let err = resolver
        .resolve(
            ActorQuery::GetOrCreateForTags {
                tags: tags([("name", "echo")]),
                create: Some(CreateRequest::new(tags([("name", "echo")]))),
            },
            &env(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::Upstream(UpstreamError::Rejected("quota exceeded".into()))
    );

    mock.verify();
}

#[tokio::test]
async fn test_unscripted_call_is_reported() {
    let mock = MockClient::<MemoryOrchestrator>::new();
    let resolver = ActorResolver::new(mock.client());

    let err = resolver
        .resolve(ActorQuery::GetLatestByName { name: "chat".into() }, &env())
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::Upstream(UpstreamError::Dropped));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mock.verify()));
    assert!(result.is_err());
}
