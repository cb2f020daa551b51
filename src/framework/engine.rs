//! # The Engine Boundary
//!
//! [`Engine`] is the contract the rest of the crate relies on for talking to the
//! external calculation engine. Stored objects cross it as JSON values; typing
//! happens one layer up in [`Repository`](crate::clients::Repository).
//!
//! Two implementations ship with the crate:
//! - [`IpcEngine`](crate::ipc::IpcEngine): JSON-RPC over HTTP to a running engine.
//! - [`FakeEngine`](crate::framework::mock::FakeEngine): in-memory, for tests and demos.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::EngineError;
use crate::model::{
    CalculationSetup, EngineEntity, ImpactValue, Key, LinkingConfig, Ref, RefType, ResultState,
    TechFlow, TechFlowValue,
};

/// Operations the calculation engine exposes.
///
/// Lookups that miss return `Ok(None)`; turning that into a
/// [`EngineError::LookupMiss`] is up to the caller, which knows what it asked for.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    async fn get(&self, kind: RefType, key: &Key) -> Result<Option<Value>, EngineError>;

    async fn get_all(&self, kind: RefType) -> Result<Vec<Value>, EngineError>;

    /// Inserts or overwrites (by `@id`) a complete object.
    async fn put(&self, entity: Value) -> Result<Ref, EngineError>;

    async fn delete(&self, target: &Ref) -> Result<(), EngineError>;

    /// Builds and stores a product system rooted at `process`.
    async fn create_product_system(
        &self,
        process: &Ref,
        config: &LinkingConfig,
    ) -> Result<Ref, EngineError>;

    /// Schedules a calculation. The returned state names the result.
    async fn calculate(&self, setup: &CalculationSetup) -> Result<ResultState, EngineError>;

    async fn result_state(&self, result_id: &str) -> Result<ResultState, EngineError>;

    async fn total_impacts(&self, result_id: &str) -> Result<Vec<ImpactValue>, EngineError>;

    async fn total_requirements(&self, result_id: &str)
        -> Result<Vec<TechFlowValue>, EngineError>;

    async fn total_impacts_of(
        &self,
        result_id: &str,
        tech_flow: &TechFlow,
    ) -> Result<Vec<ImpactValue>, EngineError>;

    /// Releases engine-side memory held by a result.
    async fn dispose(&self, result_id: &str) -> Result<(), EngineError>;
}

/// Decodes an engine payload, naming `context` in the error.
pub fn decode<T: DeserializeOwned>(context: &str, value: Value) -> Result<T, EngineError> {
    serde_json::from_value(value).map_err(|e| EngineError::Decode {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

/// Decodes a stored entity. The `@type` tag is dropped first so it does not end
/// up among the entity's passthrough fields.
pub fn decode_entity<T: EngineEntity>(mut value: Value) -> Result<T, EngineError> {
    if let Value::Object(map) = &mut value {
        map.remove("@type");
    }
    let context = match value["@id"].as_str() {
        Some(id) => format!("{} {id}", T::KIND),
        None => T::KIND.to_string(),
    };
    decode(&context, value)
}
