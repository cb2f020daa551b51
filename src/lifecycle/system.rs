use std::sync::Arc;
use tracing::{error, info};

use crate::assessment::AssessmentService;
use crate::clients::OlcaClient;
use crate::config::LcaConfig;
use crate::framework::{Engine, EngineActor, EngineError};
use crate::ipc::IpcEngine;

/// Requests that may queue in front of the engine actor.
const ENGINE_QUEUE: usize = 64;

/// The running engine actor and everything wired on top of it.
///
/// `LcaSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the engine actor
/// - **Dependency Wiring**: Building the client and the assessment service on the actor's handle
///
/// # Example
///
/// ```ignore
/// let config = LcaConfig::from_env()?;
/// let system = LcaSystem::connect(&config)?;
///
/// let report = system.assessment.assess(&input).await?;
///
/// // Drop every clone of the client/service first, then:
/// system.shutdown().await?;
/// ```
pub struct LcaSystem {
    pub client: OlcaClient,
    pub assessment: Arc<AssessmentService>,
    handle: tokio::task::JoinHandle<()>,
}

impl LcaSystem {
    /// Spawns the engine actor around `engine` and wires the client and service.
    pub fn start<E: Engine>(engine: E, config: &LcaConfig) -> Self {
        let (actor, engine_handle) = EngineActor::new(engine, ENGINE_QUEUE, config.call_timeout);
        let handle = tokio::spawn(actor.run());

        let client = OlcaClient::new(
            engine_handle,
            config.poll_interval,
            config.calculation_timeout,
        );
        let assessment = Arc::new(AssessmentService::new(
            client.clone(),
            config.assessment_settings(),
        ));

        Self {
            client,
            assessment,
            handle,
        }
    }

    /// Starts the system against the engine's IPC endpoint.
    pub fn connect(config: &LcaConfig) -> Result<Self, EngineError> {
        let endpoint = config.ipc_endpoint();
        let engine = IpcEngine::new(&endpoint, config.call_timeout)?;
        info!(%endpoint, "Engine connection configured");
        Ok(Self::start(engine, config))
    }

    /// Gracefully shuts down the engine actor.
    ///
    /// Dropping the client and service closes the actor's channel, provided no
    /// other clone is still alive. Returns an error if the actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.client);
        drop(self.assessment);

        if let Err(e) = self.handle.await {
            error!("Engine actor failed: {:?}", e);
            return Err(format!("Engine actor failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::FakeEngine;
    use crate::model::Key;

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let engine = FakeEngine::new();
        let system = LcaSystem::start(engine.clone(), &LcaConfig::default());

        let err = system.client.get_process(Key::name("Tomate")).await.unwrap_err();
        assert!(matches!(err, EngineError::LookupMiss { .. }));

        system.shutdown().await.unwrap();
        assert_eq!(engine.calls().gets, 1);
    }

    #[tokio::test]
    async fn test_connect_builds_ipc_engine() {
        let system = LcaSystem::connect(&LcaConfig::default()).unwrap();
        system.shutdown().await.unwrap();
    }
}
