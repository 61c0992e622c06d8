use super::config::ManagerConfig;
use crate::framework::ServiceActor;
use crate::kv::{self, MemoryKvClient};
use crate::model::Environment;
use crate::orchestrator::{MemoryOrchestrator, OrchestratorClient};
use crate::resolver::ActorResolver;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Runs the in-memory orchestrator and storage engine and hands out clients.
///
/// # Example
///
/// ```ignore
/// let system = ManagerSystem::new(ManagerConfig::from_env()?);
/// let env = system.environment();
///
/// system.orchestrator().upload_build(&env, tags([("name", "chat")])).await?;
/// let actor = system
///     .resolver()
///     .resolve(ActorQuery::GetOrCreateForTags { tags, create: Some(request) }, &env)
///     .await?;
///
/// system.shutdown().await?;
/// ```
pub struct ManagerSystem {
    config: ManagerConfig,
    orchestrator: OrchestratorClient,
    kv: MemoryKvClient,
    handles: Vec<JoinHandle<()>>,
}

impl ManagerSystem {
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_orchestrator(config, MemoryOrchestrator::new())
    }

    /// Starts the system around a preconfigured orchestrator backend.
    pub fn with_orchestrator(config: ManagerConfig, backend: MemoryOrchestrator) -> Self {
        let (orchestrator_actor, orchestrator) =
            ServiceActor::new(config.channel_capacity, backend);
        let (kv_engine, kv) = kv::new(config.channel_capacity);

        let handles = vec![
            tokio::spawn(orchestrator_actor.run()),
            tokio::spawn(kv_engine.run()),
        ];
        info!(env = %config.environment(), "Manager system started");

        Self {
            config,
            orchestrator,
            kv,
            handles,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment()
    }

    pub fn resolver(&self) -> ActorResolver<OrchestratorClient> {
        ActorResolver::new(self.orchestrator.clone())
    }

    /// Administrative access: build uploads, destruction, port provisioning.
    pub fn orchestrator(&self) -> OrchestratorClient {
        self.orchestrator.clone()
    }

    pub fn kv(&self) -> MemoryKvClient {
        self.kv.clone()
    }

    /// Drops the system's clients and waits for both services to stop.
    ///
    /// Services stop once every client is gone, so clones handed out by
    /// [`resolver`](Self::resolver), [`orchestrator`](Self::orchestrator) and
    /// [`kv`](Self::kv) must be dropped first.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down system...");
        drop(self.orchestrator);
        drop(self.kv);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(e);
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
