//! # Engine Handle
//!
//! The cloneable sending half of the [`EngineActor`](super::EngineActor).

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::error::EngineError;
use super::message::{EngineRequest, Response};
use crate::model::{
    CalculationSetup, ImpactValue, Key, LinkingConfig, Ref, RefType, ResultState, TechFlow,
    TechFlowValue,
};

/// Async, untyped access to the engine through its actor.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Ordered** – all clones share one queue in front of the engine.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    pub fn new(sender: mpsc::Sender<EngineRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| EngineError::ActorClosed)?;
        response.await.map_err(|_| EngineError::ActorDropped)?
    }

    pub async fn get(&self, kind: RefType, key: Key) -> Result<Option<Value>, EngineError> {
        self.request(|respond_to| EngineRequest::Get { kind, key, respond_to })
            .await
    }

    pub async fn get_all(&self, kind: RefType) -> Result<Vec<Value>, EngineError> {
        self.request(|respond_to| EngineRequest::GetAll { kind, respond_to })
            .await
    }

    pub async fn put(&self, entity: Value) -> Result<Ref, EngineError> {
        self.request(|respond_to| EngineRequest::Put { entity, respond_to })
            .await
    }

    pub async fn delete(&self, target: Ref) -> Result<(), EngineError> {
        self.request(|respond_to| EngineRequest::Delete { target, respond_to })
            .await
    }

    pub async fn create_product_system(
        &self,
        process: Ref,
        config: LinkingConfig,
    ) -> Result<Ref, EngineError> {
        self.request(|respond_to| EngineRequest::CreateProductSystem {
            process,
            config,
            respond_to,
        })
        .await
    }

    pub async fn calculate(&self, setup: CalculationSetup) -> Result<ResultState, EngineError> {
        self.request(|respond_to| EngineRequest::Calculate { setup, respond_to })
            .await
    }

    pub async fn result_state(&self, result_id: &str) -> Result<ResultState, EngineError> {
        let result_id = result_id.to_string();
        self.request(|respond_to| EngineRequest::ResultState { result_id, respond_to })
            .await
    }

    pub async fn total_impacts(&self, result_id: &str) -> Result<Vec<ImpactValue>, EngineError> {
        let result_id = result_id.to_string();
        self.request(|respond_to| EngineRequest::TotalImpacts { result_id, respond_to })
            .await
    }

    pub async fn total_requirements(
        &self,
        result_id: &str,
    ) -> Result<Vec<TechFlowValue>, EngineError> {
        let result_id = result_id.to_string();
        self.request(|respond_to| EngineRequest::TotalRequirements { result_id, respond_to })
            .await
    }

    pub async fn total_impacts_of(
        &self,
        result_id: &str,
        tech_flow: TechFlow,
    ) -> Result<Vec<ImpactValue>, EngineError> {
        let result_id = result_id.to_string();
        self.request(|respond_to| EngineRequest::TotalImpactsOf {
            result_id,
            tech_flow,
            respond_to,
        })
        .await
    }

    pub async fn dispose(&self, result_id: &str) -> Result<(), EngineError> {
        let result_id = result_id.to_string();
        self.request(|respond_to| EngineRequest::Dispose { result_id, respond_to })
            .await
    }
}
