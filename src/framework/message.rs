//! # Engine Messages
//!
//! The requests an [`EngineHandle`](super::EngineHandle) sends to the
//! [`EngineActor`](super::EngineActor). There is one variant per [`Engine`](super::Engine)
//! operation, each carrying a oneshot sender for the reply.

use serde_json::Value;
use tokio::sync::oneshot;

use super::error::EngineError;
use crate::model::{
    CalculationSetup, ImpactValue, Key, LinkingConfig, Ref, RefType, ResultState, TechFlow,
    TechFlowValue,
};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, EngineError>>;

#[derive(Debug)]
pub enum EngineRequest {
    Get {
        kind: RefType,
        key: Key,
        respond_to: Response<Option<Value>>,
    },
    GetAll {
        kind: RefType,
        respond_to: Response<Vec<Value>>,
    },
    Put {
        entity: Value,
        respond_to: Response<Ref>,
    },
    Delete {
        target: Ref,
        respond_to: Response<()>,
    },
    CreateProductSystem {
        process: Ref,
        config: LinkingConfig,
        respond_to: Response<Ref>,
    },
    Calculate {
        setup: CalculationSetup,
        respond_to: Response<ResultState>,
    },
    ResultState {
        result_id: String,
        respond_to: Response<ResultState>,
    },
    TotalImpacts {
        result_id: String,
        respond_to: Response<Vec<ImpactValue>>,
    },
    TotalRequirements {
        result_id: String,
        respond_to: Response<Vec<TechFlowValue>>,
    },
    TotalImpactsOf {
        result_id: String,
        tech_flow: TechFlow,
        respond_to: Response<Vec<ImpactValue>>,
    },
    Dispose {
        result_id: String,
        respond_to: Response<()>,
    },
}

impl EngineRequest {
    /// Short operation name used in logs.
    pub fn operation(&self) -> &'static str {
        match self {
            EngineRequest::Get { .. } => "get",
            EngineRequest::GetAll { .. } => "get_all",
            EngineRequest::Put { .. } => "put",
            EngineRequest::Delete { .. } => "delete",
            EngineRequest::CreateProductSystem { .. } => "create_product_system",
            EngineRequest::Calculate { .. } => "calculate",
            EngineRequest::ResultState { .. } => "result_state",
            EngineRequest::TotalImpacts { .. } => "total_impacts",
            EngineRequest::TotalRequirements { .. } => "total_requirements",
            EngineRequest::TotalImpactsOf { .. } => "total_impacts_of",
            EngineRequest::Dispose { .. } => "dispose",
        }
    }
}
