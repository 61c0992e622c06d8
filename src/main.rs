use actor_manager::kv::{Key, ListOptions, PutOptions, Value};
use actor_manager::lifecycle::{setup_tracing, ManagerConfig, ManagerSystem};
use actor_manager::model::{tags, ActorQuery, CreateRequest};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = ManagerConfig::from_env().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default configuration");
        ManagerConfig::default()
    });
    let system = ManagerSystem::new(config);
    let env = system.environment();

    let build = system
        .orchestrator()
        .upload_build(&env, tags([("name", "chat")]))
        .await?;
    info!(build_id = %build.id, "Build uploaded");

    let span = tracing::info_span!("room_lookup");
    let actor = async {
        let wanted = tags([("name", "chat"), ("room", "lobby")]);
        let query = ActorQuery::GetOrCreateForTags {
            tags: wanted.clone(),
            create: Some(CreateRequest::new(wanted).in_region("eu")),
        };
        let resolver = system.resolver();
        let first = resolver.resolve(query.clone(), &env).await?;
        let second = resolver.resolve(query, &env).await?;
        info!(same = first == second, "Resolved twice");
        Ok::<_, Box<dyn std::error::Error>>(first.into_actor())
    }
    .instrument(span)
    .await?;

    if let Some(actor) = actor {
        match actor.endpoint() {
            Ok(endpoint) => info!(actor_id = %actor.id, %endpoint, "Actor reachable"),
            Err(e) => warn!(actor_id = %actor.id, error = %e, "No endpoint"),
        }
    }

    let kv = system.kv();
    let span = tracing::info_span!("storage");
    async {
        for (user, score) in [("ada", 36), ("bob", 41), ("cy", 12)] {
            kv.put(Key::from(["scores", user]), Value::from(score), PutOptions::default())
                .await?;
        }
        let top = kv
            .list(ListOptions::new().prefix(Key::single("scores")).reverse().limit(2))
            .await?;
        for (key, entry) in top.iter() {
            info!(%key, value = %entry.clone().into_value(), "Listed");
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    drop(kv);
    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
